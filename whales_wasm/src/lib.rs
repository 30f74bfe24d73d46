// Browser front-end. The page owns the board widget and performs `fetch` calls; everything else
// happens in Rust:
//   - user input goes to `WebClient` methods;
//   - the page polls `next_outgoing_request` and posts each request body to the API;
//   - responses come back through `process_api_body` or `process_transport_error`.

extern crate console_error_panic_hook;
extern crate serde_json;
extern crate wasm_bindgen;
extern crate whales_chess;

mod web_board;
mod web_document;
mod web_error_handling;
mod web_hash_store;

use std::sync::mpsc;

use serde_json::json;
use wasm_bindgen::prelude::*;

use whales_chess::api::ApiError;
use whales_chess::coord::Coord;
use whales_chess::coordinator::{GameSessionCoordinator, MoveAttempt};
use whales_chess::force::Force;
use whales_chess::move_client::{ChannelMoveClient, ClientTraffic, RequestId};
use whales_chess::piece::PieceKind;
use whales_chess::shakmaty_rules::ShakmatyRules;

use web_board::WebBoardView;
use web_error_handling::JsResult;
use web_hash_store::LocationHashStore;

pub use web_error_handling::{RustError, last_panic, set_panic_hook};


// Routes library `log` output to the developer console. Repeated calls keep the first logger.
fn init_logging() { _ = console_log::init_with_level(log::Level::Info); }

type Coordinator =
    GameSessionCoordinator<ShakmatyRules, WebBoardView, ChannelMoveClient, LocationHashStore>;

#[wasm_bindgen]
#[derive(Clone, Copy)]
pub struct JsMoveAttempt {
    pub accepted: bool,
    pub needs_promotion_choice: bool,
}

impl From<MoveAttempt> for JsMoveAttempt {
    fn from(attempt: MoveAttempt) -> Self {
        JsMoveAttempt {
            accepted: attempt.accepted,
            needs_promotion_choice: attempt.needs_promotion_choice,
        }
    }
}

fn parse_square(square: &str) -> JsResult<Coord> {
    Coord::from_algebraic(square).ok_or_else(|| rust_error!("Invalid square: \"{}\"", square))
}

// Serializes traffic for the page. Requests carry the body to POST; cancellations only the id.
fn traffic_to_json(traffic: &ClientTraffic) -> String {
    match traffic {
        ClientTraffic::Send(request) => {
            json!({ "id": request.id.0, "body": request.command.to_json() }).to_string()
        }
        ClientTraffic::Cancel(id) => json!({ "id": id.0, "cancel": true }).to_string(),
    }
}

#[wasm_bindgen]
pub struct WebClient {
    coordinator: Coordinator,
    traffic_rx: mpsc::Receiver<ClientTraffic>,
}

#[wasm_bindgen]
impl WebClient {
    // Restores the session from `window.location.hash` and starts it.
    pub fn new_client() -> JsResult<WebClient> {
        init_logging();
        let (traffic_tx, traffic_rx) = mpsc::channel();
        let coordinator = Coordinator::new(
            WebBoardView::new(),
            ChannelMoveClient::new(traffic_tx),
            LocationHashStore::new(),
        );
        Ok(WebClient { coordinator, traffic_rx })
    }

    // `promotion` is a piece letter ("q", "n", ...) or an empty string if none was chosen yet.
    pub fn attempt_move(&mut self, from: &str, to: &str, promotion: &str) -> JsResult<JsMoveAttempt> {
        let from = parse_square(from)?;
        let to = parse_square(to)?;
        let promote_to = PieceKind::from_promotion_choice(promotion).map_err(|err| rust_error!("{err}"))?;
        Ok(self.coordinator.attempt_move(from, to, promote_to).into())
    }

    pub fn can_drag_from(&self, square: &str) -> JsResult<bool> {
        Ok(self.coordinator.can_drag_from(parse_square(square)?))
    }
    pub fn hover_square(&mut self, square: &str) -> JsResult<()> {
        self.coordinator.hover_square(parse_square(square)?);
        Ok(())
    }
    pub fn hover_exit(&mut self) { self.coordinator.hover_exit(); }

    pub fn undo(&mut self) -> bool { self.coordinator.undo() }
    pub fn new_game(&mut self) { self.coordinator.new_game(); }

    pub fn change_settings(&mut self, color: &str, opponent: &str) -> JsResult<()> {
        let force = Force::from_letter(color).ok_or_else(|| rust_error!("Unexpected color: {}", color))?;
        self.coordinator.change_settings(force, opponent.to_owned());
        Ok(())
    }
    // Shareable hash for the current settings and game, without the leading '#'.
    pub fn settings_fragment(&self) -> String { self.coordinator.session_state().to_fragment() }

    pub fn next_outgoing_request(&mut self) -> JsResult<Option<String>> {
        match self.traffic_rx.try_recv() {
            Ok(traffic) => Ok(Some(traffic_to_json(&traffic))),
            Err(mpsc::TryRecvError::Empty) => Ok(None),
            Err(mpsc::TryRecvError::Disconnected) => Err(rust_error!("Request channel disconnected")),
        }
    }

    pub fn process_api_body(&mut self, id: u32, body: String) {
        self.coordinator.process_api_response(RequestId(id), Ok(body));
    }
    // `message` describes the failure: HTTP status text, "timeout", etc.
    pub fn process_transport_error(&mut self, id: u32, message: String) {
        self.coordinator.process_api_response(RequestId(id), Err(ApiError::Transport(message)));
    }

    pub fn status_text(&self) -> String { self.coordinator.status_text() }
    pub fn is_halted(&self) -> bool { self.coordinator.is_halted() }
}
