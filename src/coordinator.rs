// Game session coordinator: the single owner of session state. Mediates between user input, the
// rules engine, the board view, the move suggestion service and session persistence.
//
// Everything runs on one logical thread. The only asynchronous piece is the network: requests go
// out through `MoveSuggestionClient` and their outcomes come back via `process_api_response`.

use log::{debug, error, info, warn};

use crate::api::{self, ApiCommand, ApiError, ModelInfo};
use crate::board_view::{BoardRenderer, SquareHighlight};
use crate::coord::Coord;
use crate::force::Force;
use crate::move_client::{MoveSuggestionClient, RequestId};
use crate::piece::{Piece, PieceKind};
use crate::rules::{GameStatus, MoveInput, RulesEngine, RulesError};
use crate::session_state::SessionState;
use crate::session_store::SessionStore;
use crate::status::status_text;
use crate::transcript::Transcript;


#[derive(Clone, PartialEq, Eq, Debug)]
pub enum SessionPhase {
    PlayerToMove,
    AwaitingOpponent,
    GameOver,
    // A remote error occurred. The session is frozen: all operations are no-ops.
    Halted { message: String },
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct GameSession {
    pub transcript: Transcript,
    pub player_force: Force,
    pub opponent_id: String,
    // Outstanding `get_move` request. Present iff we are waiting for the opponent.
    pub pending: Option<RequestId>,
}

#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub struct MoveAttempt {
    pub accepted: bool,
    pub needs_promotion_choice: bool,
}

impl MoveAttempt {
    pub const REJECTED: MoveAttempt = MoveAttempt { accepted: false, needs_promotion_choice: false };
    pub const ACCEPTED: MoveAttempt = MoveAttempt { accepted: true, needs_promotion_choice: false };
    pub const NEEDS_PROMOTION_CHOICE: MoveAttempt =
        MoveAttempt { accepted: false, needs_promotion_choice: true };
}

pub struct GameSessionCoordinator<R, V, C, S> {
    rules: R,
    view: V,
    client: C,
    store: S,
    session: GameSession,
    halted: Option<String>,
    models: Option<Vec<ModelInfo>>,
    pending_models: Option<RequestId>,
    // King square highlighted as being in check.
    check_square: Option<Coord>,
}

impl<R, V, C, S> GameSessionCoordinator<R, V, C, S>
where
    R: RulesEngine + Default,
    V: BoardRenderer,
    C: MoveSuggestionClient,
    S: SessionStore,
{
    // Restores the session persisted in `store`, falling back to defaults.
    pub fn new(view: V, client: C, store: S) -> Self {
        let state = SessionState::from_entries::<R>(&store.load());
        Self::with_state(R::default(), view, client, store, state)
    }
}

impl<R, V, C, S> GameSessionCoordinator<R, V, C, S>
where
    R: RulesEngine,
    V: BoardRenderer,
    C: MoveSuggestionClient,
    S: SessionStore,
{
    pub fn with_state(mut rules: R, view: V, client: C, store: S, state: SessionState) -> Self {
        let SessionState { player_force, opponent_id, mut transcript } = state;
        if let Err(err) = rules.load_transcript(&transcript) {
            warn!("Discarding game '{transcript}': {err}");
            rules.reset();
            transcript.clear();
        }
        let mut coordinator = GameSessionCoordinator {
            rules,
            view,
            client,
            store,
            session: GameSession { transcript, player_force, opponent_id, pending: None },
            halted: None,
            models: None,
            pending_models: None,
            check_square: None,
        };
        info!(
            "Starting session: {} vs '{}', {} plies",
            player_force.to_name(),
            coordinator.session.opponent_id,
            coordinator.session.transcript.len()
        );
        coordinator.view.set_orientation(player_force);
        coordinator.request_models();
        coordinator.refresh(false);
        coordinator.request_opponent_move();
        coordinator
    }

    pub fn session(&self) -> &GameSession { &self.session }
    pub fn rules(&self) -> &R { &self.rules }
    pub fn view(&self) -> &V { &self.view }
    pub fn store(&self) -> &S { &self.store }
    pub fn models(&self) -> Option<&[ModelInfo]> { self.models.as_deref() }
    pub fn is_halted(&self) -> bool { self.halted.is_some() }

    pub fn session_state(&self) -> SessionState {
        SessionState::new(
            self.session.player_force,
            self.session.opponent_id.clone(),
            self.session.transcript.clone(),
        )
    }

    pub fn phase(&self) -> SessionPhase {
        if let Some(message) = &self.halted {
            SessionPhase::Halted { message: message.clone() }
        } else if self.rules.status().is_terminal() {
            SessionPhase::GameOver
        } else if self.rules.turn() == self.session.player_force {
            SessionPhase::PlayerToMove
        } else {
            SessionPhase::AwaitingOpponent
        }
    }

    pub fn status_text(&self) -> String {
        match &self.halted {
            Some(message) => api::friendly_error_message(message),
            None => status_text(&self.rules, self.session.player_force).to_owned(),
        }
    }

    fn owns_piece_at(&self, coord: Coord) -> bool {
        matches!(self.rules.piece_at(coord), Some(Piece { force, .. }) if force == self.session.player_force)
    }

    pub fn can_drag_from(&self, coord: Coord) -> bool {
        self.phase() == SessionPhase::PlayerToMove && self.owns_piece_at(coord)
    }

    pub fn attempt_move(&mut self, from: Coord, to: Coord, promote_to: Option<PieceKind>) -> MoveAttempt {
        if self.phase() != SessionPhase::PlayerToMove {
            return MoveAttempt::REJECTED;
        }
        self.view.clear_highlights(self.check_square);
        if !self.owns_piece_at(from) {
            return MoveAttempt::REJECTED;
        }
        match self.rules.try_move(MoveInput::new(from, to, promote_to)) {
            Ok(san) => {
                debug!("Player move {from}{to}: {san}");
                self.session.transcript.push(san);
                self.refresh(true);
                self.request_opponent_move();
                MoveAttempt::ACCEPTED
            }
            Err(RulesError::PromotionChoiceRequired) => MoveAttempt::NEEDS_PROMOTION_CHOICE,
            Err(_) => MoveAttempt::REJECTED,
        }
    }

    pub fn hover_square(&mut self, coord: Coord) {
        if self.phase() != SessionPhase::PlayerToMove || !self.owns_piece_at(coord) {
            return;
        }
        let destinations = self.rules.legal_destinations(coord);
        if destinations.is_empty() {
            return;
        }
        for square in std::iter::once(coord).chain(destinations) {
            if Some(square) != self.check_square {
                self.view.highlight_square(square, SquareHighlight::Hover);
            }
        }
    }

    pub fn hover_exit(&mut self) {
        if self.is_halted() {
            return;
        }
        self.view.clear_highlights(self.check_square);
    }

    // Issues a `get_move` request if it's the opponent's turn and there is none in flight yet.
    pub fn request_opponent_move(&mut self) {
        if self.phase() != SessionPhase::AwaitingOpponent || self.session.pending.is_some() {
            return;
        }
        let command = ApiCommand::GetMove {
            model: self.session.opponent_id.clone(),
            pgn: self.session.transcript.to_pgn(),
        };
        let id = self.client.send(command);
        info!("Requested opponent move {id} from '{}'", self.session.opponent_id);
        self.session.pending = Some(id);
    }

    // Takes back the last player move (and the opponent's reply, if any). Returns whether
    // anything was undone.
    pub fn undo(&mut self) -> bool {
        let last_is_players = |transcript: &Transcript| {
            !transcript.is_empty()
                && Transcript::ply_force(transcript.len() - 1) == self.session.player_force
        };
        let num_plies = match self.phase() {
            SessionPhase::Halted { .. } => 0,
            SessionPhase::AwaitingOpponent => {
                if self.session.transcript.is_empty() { 0 } else { 1 }
            }
            SessionPhase::PlayerToMove => {
                if self.session.transcript.len() >= 2 { 2 } else { 0 }
            }
            SessionPhase::GameOver => {
                if last_is_players(&self.session.transcript) {
                    1
                } else if self.session.transcript.len() >= 2 {
                    2
                } else {
                    0
                }
            }
        };
        if num_plies == 0 {
            return false;
        }
        self.cancel_pending_move();
        for _ in 0..num_plies {
            self.rules.undo();
            self.session.transcript.pop();
        }
        info!("Undid {num_plies} plies");
        self.refresh(true);
        true
    }

    pub fn new_game(&mut self) {
        if self.is_halted() {
            return;
        }
        info!("New game");
        self.cancel_pending_move();
        self.session.transcript.clear();
        self.rules.reset();
        self.refresh(false);
        self.request_opponent_move();
    }

    pub fn change_settings(&mut self, player_force: Force, opponent_id: String) {
        if self.is_halted() {
            return;
        }
        info!("New settings: {} vs '{opponent_id}'", player_force.to_name());
        self.cancel_pending_move();
        self.session = GameSession {
            transcript: Transcript::new(),
            player_force,
            opponent_id,
            pending: None,
        };
        self.rules.reset();
        self.view.set_orientation(player_force);
        self.show_opponent_name();
        self.request_models();
        self.refresh(false);
        self.request_opponent_move();
    }

    // Delivers the outcome of a request: response body or transport failure.
    pub fn process_api_response(&mut self, id: RequestId, response: Result<String, ApiError>) {
        if self.is_halted() {
            debug!("Dropping response {id}: session halted");
            return;
        }
        if self.session.pending == Some(id) {
            self.session.pending = None;
            match response.and_then(|body| api::parse_get_move(&body)) {
                Ok(transcript) => self.apply_opponent_transcript(&transcript),
                Err(err) => self.halt(err.to_string()),
            }
        } else if self.pending_models == Some(id) {
            self.pending_models = None;
            match response.and_then(|body| api::parse_list_models(&body)) {
                Ok(models) => {
                    self.models = Some(models);
                    self.show_opponent_name();
                }
                Err(err) => self.halt(err.to_string()),
            }
        } else {
            debug!("Dropping stale response {id}");
        }
    }

    fn apply_opponent_transcript(&mut self, returned: &Transcript) {
        let Some(ply) = self.session.transcript.one_ply_extension(returned) else {
            self.halt(format!(
                "API response for 'get_move' does not extend the game by one move: '{returned}'"
            ));
            return;
        };
        match self.rules.play_san(ply) {
            Ok(san) => {
                debug!("Opponent move: {san}");
                self.session.transcript.push(san);
                self.refresh(true);
            }
            Err(err) => {
                self.halt(format!("API response for 'get_move' has illegal move '{ply}': {err}"))
            }
        }
    }

    fn request_models(&mut self) {
        if self.models.is_none() && self.pending_models.is_none() {
            self.pending_models = Some(self.client.send(ApiCommand::ListModels));
        }
    }

    fn show_opponent_name(&mut self) {
        let Some(models) = &self.models else {
            return;
        };
        let opponent_id = &self.session.opponent_id;
        match models.iter().find(|m| &m.internal_name == opponent_id) {
            Some(model) => self.view.set_opponent_name(&model.display_name),
            None => {
                warn!("Unknown opponent '{opponent_id}'");
                self.view.set_opponent_name(opponent_id);
            }
        }
    }

    fn cancel_pending_move(&mut self) {
        if let Some(id) = self.session.pending.take() {
            info!("Cancelling opponent move request {id}");
            self.client.cancel(id);
        }
    }

    fn halt(&mut self, message: String) {
        error!("Session halted: {message}");
        self.cancel_pending_move();
        if let Some(id) = self.pending_models.take() {
            self.client.cancel(id);
        }
        self.view.show_fatal_error(&api::friendly_error_message(&message));
        self.halted = Some(message);
    }

    fn refresh(&mut self, animate: bool) {
        self.view.set_position(&self.rules.fen(), animate);

        if self.check_square.take().is_some() {
            self.view.clear_highlights(None);
        }
        if self.rules.status() == GameStatus::Active && self.rules.is_check() {
            self.check_square = self.rules.square_of(self.rules.turn(), PieceKind::King);
            if let Some(king) = self.check_square {
                self.view.highlight_square(king, SquareHighlight::Check);
            }
        }

        self.view.set_status_text(status_text(&self.rules, self.session.player_force));

        let outline = match self.rules.last_move() {
            Some((from, to)) if self.rules.turn() == self.session.player_force => vec![from, to],
            _ => Vec::new(),
        };
        self.view.outline_squares(&outline);

        let entries = self.session_state().to_entries();
        self.store.save(&entries);
    }
}
