// Chess rules capability. The coordinator never inspects positions directly: everything it needs
// to know about the board goes through `RulesEngine`.

use std::str::FromStr;

use derive_new::new;
use thiserror::Error;

use crate::coord::Coord;
use crate::force::Force;
use crate::piece::{Piece, PieceKind};
use crate::transcript::{Transcript, TranscriptError};


#[derive(Clone, Copy, PartialEq, Eq, Debug, new)]
pub struct MoveInput {
    pub from: Coord,
    pub to: Coord,
    pub promote_to: Option<PieceKind>,
}

// Long algebraic form as typed in the terminal: "e2e4", "e7e8q".
impl FromStr for MoveInput {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || format!("Invalid move: '{s}'");
        if !s.is_ascii() || !(4..=5).contains(&s.len()) {
            return Err(bad());
        }
        let from = Coord::from_algebraic(&s[0..2]).ok_or_else(bad)?;
        let to = Coord::from_algebraic(&s[2..4]).ok_or_else(bad)?;
        let promote_to = PieceKind::from_promotion_choice(&s[4..])?;
        Ok(MoveInput { from, to, promote_to })
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DrawReason {
    Stalemate,
    InsufficientMaterial,
    FiftyMoveRule,
    ThreefoldRepetition,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameStatus {
    Active,
    Checkmate { loser: Force },
    Draw(DrawReason),
}

impl GameStatus {
    pub fn is_terminal(self) -> bool { self != GameStatus::Active }
}

#[derive(Clone, PartialEq, Eq, Debug, Error)]
pub enum RulesError {
    #[error("illegal move")]
    IllegalMove,
    #[error("promotion piece must be chosen")]
    PromotionChoiceRequired,
    #[error("cannot promote to {0:?}")]
    InvalidPromotionTarget(PieceKind),
    #[error("game is over")]
    GameOver,
    #[error("cannot parse move '{0}'")]
    BadNotation(String),
    #[error("illegal ply #{index} '{ply}'")]
    IllegalPly { index: usize, ply: String },
    #[error("invalid transcript: {0}")]
    Transcript(#[from] TranscriptError),
}

pub trait RulesEngine {
    // Back to the initial position.
    fn reset(&mut self);

    // Replaces current game with the given one. All-or-nothing: on error the engine state is
    // unchanged.
    fn load_transcript(&mut self, transcript: &Transcript) -> Result<(), RulesError>;

    // Applies the move if legal and returns its SAN. A pawn move to the last rank without
    // `promote_to` fails with `PromotionChoiceRequired` and changes nothing.
    fn try_move(&mut self, input: MoveInput) -> Result<String, RulesError>;

    // Applies a move given in SAN; returns the canonical SAN of the move played.
    fn play_san(&mut self, san: &str) -> Result<String, RulesError>;

    // Reverts the last move. Returns false if there is nothing to revert.
    fn undo(&mut self) -> bool;

    fn num_plies(&self) -> usize;
    fn turn(&self) -> Force;
    fn is_check(&self) -> bool;
    fn status(&self) -> GameStatus;
    fn piece_at(&self, coord: Coord) -> Option<Piece>;
    fn legal_destinations(&self, from: Coord) -> Vec<Coord>;
    fn last_move(&self) -> Option<(Coord, Coord)>;
    fn fen(&self) -> String;

    // Finds a piece on the board. Engines are expected to override this with a direct query;
    // the fallback scans every square.
    fn square_of(&self, force: Force, kind: PieceKind) -> Option<Coord> {
        let target = Piece::new(kind, force);
        Coord::all().find(|&coord| self.piece_at(coord) == Some(target))
    }
}
