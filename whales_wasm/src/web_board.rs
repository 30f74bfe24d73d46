// Board view backed by the page: the board widget draws pieces, highlights and texts live in
// the DOM. Squares are `#board .square-<coord>` elements created by the widget.

use log::warn;
use wasm_bindgen::prelude::*;

use whales_chess::board_view::{BoardRenderer, SquareHighlight};
use whales_chess::coord::Coord;
use whales_chess::force::Force;

use crate::web_document::web_document;
use crate::web_error_handling::JsResult;


const HOVER_CLASS: &str = "highlight-hover";
const CHECK_CLASS: &str = "highlight-check";
const OUTLINE_CLASS: &str = "last-move";
const FATAL_ERROR_CLASS: &str = "fatal-error";

#[wasm_bindgen(js_namespace = whalesBoard)]
extern "C" {
    #[wasm_bindgen(js_name = setPosition)]
    fn widget_set_position(fen: &str, animate: bool);
    #[wasm_bindgen(js_name = setOrientation)]
    fn widget_set_orientation(color: &str);
}

fn highlight_class(highlight: SquareHighlight) -> &'static str {
    match highlight {
        SquareHighlight::Hover => HOVER_CLASS,
        SquareHighlight::Check => CHECK_CLASS,
    }
}

fn square_class(coord: Coord) -> String { format!("square-{coord}") }

fn square_selector(coord: Coord) -> String { format!("#board .{}", square_class(coord)) }

fn set_text(element_id: &str, text: &str) -> JsResult<()> {
    web_document()?.get_existing_element_by_id(element_id)?.set_text_content(Some(text));
    Ok(())
}

fn clear_highlights(keep: Option<Coord>) -> JsResult<()> {
    let document = web_document()?;
    let keep_class = keep.map(square_class);
    for class_name in [HOVER_CLASS, CHECK_CLASS] {
        for element in document.query_selector_all(&format!("#board .{class_name}"))? {
            let class_list = element.class_list();
            if keep_class.as_ref().is_some_and(|keep| class_list.contains(keep)) {
                continue;
            }
            class_list.remove_1(class_name)?;
        }
    }
    Ok(())
}

fn outline_squares(squares: &[Coord]) -> JsResult<()> {
    let document = web_document()?;
    document.purge_class_name(&format!("#board .{OUTLINE_CLASS}"), OUTLINE_CLASS)?;
    for &coord in squares {
        document.add_class_name(&square_selector(coord), OUTLINE_CLASS)?;
    }
    Ok(())
}

fn show_fatal_error(message: &str) -> JsResult<()> {
    let status = web_document()?.get_existing_element_by_id("status")?;
    status.set_text_content(Some(message));
    status.class_list().add_1(FATAL_ERROR_CLASS)?;
    Ok(())
}

// DOM failures are not fatal for the game: the next refresh will redraw everything.
fn report(operation: &str, result: JsResult<()>) {
    if let Err(err) = result {
        warn!("Board {operation} failed: {err:?}");
    }
}

#[derive(Default)]
pub struct WebBoardView {}

impl WebBoardView {
    pub fn new() -> Self { WebBoardView {} }
}

impl BoardRenderer for WebBoardView {
    fn set_orientation(&mut self, force: Force) { widget_set_orientation(force.to_name()); }
    fn set_position(&mut self, fen: &str, animate: bool) { widget_set_position(fen, animate); }
    fn set_status_text(&mut self, text: &str) { report("status update", set_text("status", text)); }
    fn set_opponent_name(&mut self, display_name: &str) {
        report("opponent update", set_text("opponent", display_name));
    }

    fn highlight_square(&mut self, coord: Coord, highlight: SquareHighlight) {
        let result = web_document().and_then(|document| {
            document.add_class_name(&square_selector(coord), highlight_class(highlight))
        });
        report("highlight", result);
    }
    fn clear_highlights(&mut self, keep: Option<Coord>) {
        report("highlight reset", clear_highlights(keep));
    }
    fn outline_squares(&mut self, squares: &[Coord]) { report("outline", outline_squares(squares)); }

    fn show_fatal_error(&mut self, message: &str) {
        report("error display", show_fatal_error(message));
    }
}
