// Board rendering capability. Implementations own all presentation: a JS board widget in the
// browser, a text grid in the terminal, a call recorder in tests.

use crate::coord::Coord;
use crate::force::Force;


#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum SquareHighlight {
    Hover,   // movable piece under cursor or one of its destinations
    Check,   // king in check
}

pub trait BoardRenderer {
    fn set_orientation(&mut self, force: Force);
    fn set_position(&mut self, fen: &str, animate: bool);
    fn set_status_text(&mut self, text: &str);
    fn set_opponent_name(&mut self, display_name: &str);

    fn highlight_square(&mut self, coord: Coord, highlight: SquareHighlight);
    // Removes highlights from all squares except `keep`.
    fn clear_highlights(&mut self, keep: Option<Coord>);
    // Replaces the set of outlined squares (last move markers).
    fn outline_squares(&mut self, squares: &[Coord]);

    // Called once when the session halts. Input should be disabled afterwards.
    fn show_fatal_error(&mut self, message: &str);
}
