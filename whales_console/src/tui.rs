use std::collections::HashMap;

use crossterm::style::{Color, Stylize};
use itertools::Itertools;

use whales_chess::board_view::{BoardRenderer, SquareHighlight};
use whales_chess::coord::{Col, Coord, Row};
use whales_chess::force::Force;
use whales_chess::piece::{Piece, piece_to_pictogram};


// Piece placement from the first FEN field. Malformed input yields whatever could be parsed.
pub fn parse_placement(fen: &str) -> HashMap<Coord, Piece> {
    let mut pieces = HashMap::new();
    let placement = fen.split_whitespace().next().unwrap_or("");
    for (rank_index, rank) in placement.split('/').enumerate().take(8) {
        let row = Row::from_zero_based(7 - rank_index as u8);
        let mut col = 0u8;
        for ch in rank.chars() {
            if let Some(skip) = ch.to_digit(10) {
                col = col.saturating_add(skip as u8);
            } else if let Some(piece) = Piece::from_fen_char(ch) {
                if col < 8 {
                    pieces.insert(Coord::new(row, Col::from_zero_based(col)), piece);
                }
                col = col.saturating_add(1);
            }
        }
    }
    pieces
}

#[derive(Default)]
pub struct TerminalView {
    orientation: Option<Force>,
    fen: String,
    status: String,
    opponent_name: Option<String>,
    highlights: HashMap<Coord, SquareHighlight>,
    outlines: Vec<Coord>,
    fatal_error: Option<String>,
}

impl TerminalView {
    pub fn new() -> Self { Self::default() }

    pub fn render(&self) -> String {
        let pieces = parse_placement(&self.fen);
        let orientation = self.orientation.unwrap_or(Force::White);
        let rows = match orientation {
            Force::White => Row::all().rev().collect_vec(),
            Force::Black => Row::all().collect_vec(),
        };
        let cols = match orientation {
            Force::White => Col::all().collect_vec(),
            Force::Black => Col::all().collect_vec().into_iter().rev().collect_vec(),
        };
        let mut ret = String::new();
        if let Some(name) = &self.opponent_name {
            ret.push_str(&format!("Opponent: {name}\n"));
        }
        for &row in &rows {
            ret.push_str(&format!(" {} ", row.to_algebraic()));
            for &col in &cols {
                let coord = Coord::new(row, col);
                let symbol = match pieces.get(&coord) {
                    Some(piece) => piece_to_pictogram(piece.kind, piece.force),
                    None => ' ',
                };
                let is_light = (row.to_zero_based() + col.to_zero_based()) % 2 == 1;
                let background = match self.highlights.get(&coord) {
                    Some(SquareHighlight::Check) => Color::Red,
                    Some(SquareHighlight::Hover) => Color::Green,
                    None if is_light => Color::AnsiValue(230),
                    None => Color::AnsiValue(222),
                };
                let square = if self.outlines.contains(&coord) {
                    format!("[{symbol}]")
                } else {
                    format!(" {symbol} ")
                };
                ret.push_str(&square.with(Color::AnsiValue(233)).on(background).to_string());
            }
            ret.push('\n');
        }
        ret.push_str("   ");
        for &col in &cols {
            ret.push_str(&format!(" {} ", col.to_algebraic()));
        }
        ret.push('\n');
        ret.push('\n');
        match &self.fatal_error {
            Some(message) => ret.push_str(&message.clone().with(Color::Red).to_string()),
            None => ret.push_str(&self.status),
        }
        ret.push('\n');
        ret
    }
}

impl BoardRenderer for TerminalView {
    fn set_orientation(&mut self, force: Force) { self.orientation = Some(force); }
    // Terminal redraws the whole board after each event, so there is nothing to animate.
    fn set_position(&mut self, fen: &str, _animate: bool) { self.fen = fen.to_owned(); }
    fn set_status_text(&mut self, text: &str) { self.status = text.to_owned(); }
    fn set_opponent_name(&mut self, display_name: &str) {
        self.opponent_name = Some(display_name.to_owned());
    }
    fn highlight_square(&mut self, coord: Coord, highlight: SquareHighlight) {
        self.highlights.insert(coord, highlight);
    }
    fn clear_highlights(&mut self, keep: Option<Coord>) {
        self.highlights.retain(|&coord, _| Some(coord) == keep);
    }
    fn outline_squares(&mut self, squares: &[Coord]) { self.outlines = squares.to_vec(); }
    fn show_fatal_error(&mut self, message: &str) { self.fatal_error = Some(message.to_owned()); }
}
