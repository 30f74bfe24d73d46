// Rust-upgrade (https://github.com/rust-lang/rust/issues/46379):
//   remove `#[allow(dead_code)]` before public functions.

use std::collections::HashMap;
use std::sync::mpsc;

use itertools::Itertools;
use rand::{Rng, SeedableRng};
use serde_json::json;
use whales_chess::api::ApiCommand;
use whales_chess::board_view::{BoardRenderer, SquareHighlight};
use whales_chess::coordinator::{GameSessionCoordinator, MoveAttempt, SessionPhase};
use whales_chess::coord::Coord;
use whales_chess::force::Force;
use whales_chess::move_client::{ChannelMoveClient, ClientTraffic, OutgoingRequest, RequestId};
use whales_chess::rules::MoveInput;
use whales_chess::session_store::FragmentStore;
use whales_chess::shakmaty_rules::ShakmatyRules;


pub type TestCoordinator =
    GameSessionCoordinator<ShakmatyRules, RecordingView, ChannelMoveClient, FragmentStore>;

pub const SAMPLE_MODELS: [(&str, &str); 2] = [("Easy", "random"), ("Hard", "minimax")];

// Coordinator plus the far end of its request channel, playing the role of the server.
pub struct Session {
    pub coordinator: TestCoordinator,
    traffic_rx: mpsc::Receiver<ClientTraffic>,
    sent: Vec<OutgoingRequest>,
    cancelled: Vec<RequestId>,
}

impl Session {
    // Restores a session from the fragment. The model list request is answered immediately.
    #[allow(dead_code)]
    pub fn new(fragment: &str) -> Self {
        let mut session = Session::without_models(fragment);
        session.answer_models(&list_models_response(&SAMPLE_MODELS));
        session
    }

    #[allow(dead_code)]
    pub fn without_models(fragment: &str) -> Self {
        let (client, traffic_rx) = channel_client();
        let coordinator =
            TestCoordinator::new(RecordingView::new(), client, FragmentStore::from_fragment(fragment));
        Session { coordinator, traffic_rx, sent: Vec::new(), cancelled: Vec::new() }
    }

    fn poll(&mut self) {
        for traffic in drain_traffic(&self.traffic_rx) {
            match traffic {
                ClientTraffic::Send(request) => self.sent.push(request),
                ClientTraffic::Cancel(id) => {
                    self.sent.retain(|r| r.id != id);
                    self.cancelled.push(id);
                }
            }
        }
    }

    fn take_request(&mut self, is_move: bool) -> Option<OutgoingRequest> {
        self.poll();
        let index = self
            .sent
            .iter()
            .position(|r| matches!(r.command, ApiCommand::GetMove { .. }) == is_move)?;
        Some(self.sent.remove(index))
    }

    #[allow(dead_code)]
    pub fn take_move_request(&mut self) -> Option<OutgoingRequest> { self.take_request(true) }
    #[allow(dead_code)]
    pub fn take_models_request(&mut self) -> Option<OutgoingRequest> { self.take_request(false) }

    // Requests issued and neither answered by the test nor cancelled.
    #[allow(dead_code)]
    pub fn num_outstanding(&mut self) -> usize {
        self.poll();
        self.sent.len()
    }

    #[allow(dead_code)]
    pub fn cancelled(&mut self) -> Vec<RequestId> {
        self.poll();
        self.cancelled.clone()
    }

    #[allow(dead_code)]
    pub fn answer_models(&mut self, body: &str) {
        let request = self.take_models_request().expect("no list_models request");
        self.coordinator.process_api_response(request.id, Ok(body.to_owned()));
    }

    // Answers the outstanding move request with the given body. Returns the request.
    #[allow(dead_code)]
    pub fn answer_move(&mut self, body: &str) -> OutgoingRequest {
        let request = self.take_move_request().expect("no get_move request");
        self.coordinator.process_api_response(request.id, Ok(body.to_owned()));
        request
    }

    #[allow(dead_code)]
    pub fn opponent_replies(&mut self, pgn: &str) -> OutgoingRequest {
        self.answer_move(&get_move_response(pgn))
    }

    // Makes a move given in long algebraic form, e.g. "e2e4" or "e7e8q".
    #[allow(dead_code)]
    pub fn player_moves(&mut self, notation: &str) -> MoveAttempt {
        let input: MoveInput = notation.parse().unwrap();
        self.coordinator.attempt_move(input.from, input.to, input.promote_to)
    }

    #[allow(dead_code)]
    pub fn pgn(&self) -> String { self.coordinator.session().transcript.to_pgn() }
    #[allow(dead_code)]
    pub fn phase(&self) -> SessionPhase { self.coordinator.phase() }
    #[allow(dead_code)]
    pub fn view(&self) -> &RecordingView { self.coordinator.view() }
    #[allow(dead_code)]
    pub fn fragment(&self) -> &str { self.coordinator.store().fragment() }
}

#[allow(dead_code)]
pub fn coord(s: &str) -> Coord { Coord::from_algebraic(s).unwrap() }

#[allow(dead_code)]
pub fn request_pgn(request: &OutgoingRequest) -> &str {
    match &request.command {
        ApiCommand::GetMove { pgn, .. } => pgn.as_str(),
        ApiCommand::ListModels => panic!("not a get_move request"),
    }
}

// In theory random tests verify statistical properties that should always hold, but let's fix
// the seed to avoid sporadic failures.
#[allow(dead_code)]
pub fn deterministic_rng() -> impl Rng { rand::rngs::StdRng::from_seed([0; 32]) }

// Board view that remembers what it was told to show.
#[allow(dead_code)]
#[derive(Clone, Default, Debug)]
pub struct RecordingView {
    pub orientation: Option<Force>,
    pub fen: String,
    pub num_position_updates: usize,
    pub status: String,
    pub opponent_name: Option<String>,
    pub highlights: HashMap<Coord, SquareHighlight>,
    pub outlines: Vec<Coord>,
    pub fatal_error: Option<String>,
}

#[allow(dead_code)]
impl RecordingView {
    pub fn new() -> Self { Self::default() }

    pub fn highlighted(&self, highlight: SquareHighlight) -> Vec<String> {
        self.highlights
            .iter()
            .filter(|(_, h)| **h == highlight)
            .map(|(coord, _)| coord.to_algebraic())
            .sorted()
            .collect()
    }

    pub fn outlined(&self) -> Vec<String> { self.outlines.iter().map(|c| c.to_algebraic()).collect() }
}

impl BoardRenderer for RecordingView {
    fn set_orientation(&mut self, force: Force) { self.orientation = Some(force); }
    fn set_position(&mut self, fen: &str, _animate: bool) {
        self.fen = fen.to_owned();
        self.num_position_updates += 1;
    }
    fn set_status_text(&mut self, text: &str) { self.status = text.to_owned(); }
    fn set_opponent_name(&mut self, display_name: &str) {
        self.opponent_name = Some(display_name.to_owned());
    }
    fn highlight_square(&mut self, coord: Coord, highlight: SquareHighlight) {
        self.highlights.insert(coord, highlight);
    }
    fn clear_highlights(&mut self, keep: Option<Coord>) {
        self.highlights.retain(|coord, _| Some(*coord) == keep);
    }
    fn outline_squares(&mut self, squares: &[Coord]) { self.outlines = squares.to_vec(); }
    fn show_fatal_error(&mut self, message: &str) { self.fatal_error = Some(message.to_owned()); }
}

#[allow(dead_code)]
pub fn channel_client() -> (ChannelMoveClient, mpsc::Receiver<ClientTraffic>) {
    let (tx, rx) = mpsc::channel();
    (ChannelMoveClient::new(tx), rx)
}

#[allow(dead_code)]
pub fn drain_traffic(rx: &mpsc::Receiver<ClientTraffic>) -> Vec<ClientTraffic> { rx.try_iter().collect() }

#[allow(dead_code)]
pub fn get_move_response(pgn: &str) -> String { json!({ "error": null, "pgn": pgn }).to_string() }

#[allow(dead_code)]
pub fn list_models_response(models: &[(&str, &str)]) -> String {
    let models = models
        .iter()
        .map(|(display_name, internal_name)| {
            json!({ "displayName": display_name, "internalName": internal_name })
        })
        .collect_vec();
    json!({ "error": null, "models": models }).to_string()
}

#[allow(dead_code)]
pub fn error_response(message: &str) -> String { json!({ "error": message }).to_string() }
