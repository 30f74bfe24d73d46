// `RulesEngine` backed by the `shakmaty` crate.

use std::iter;
use std::mem;

use itertools::Itertools;
use shakmaty::fen::Fen;
use shakmaty::san::SanPlus;
use shakmaty::{Chess, Color, EnPassantMode, File, Move, Position, Rank, Role, Square};

use crate::coord::{Col, Coord, Row};
use crate::force::Force;
use crate::piece::{Piece, PieceKind};
use crate::rules::{DrawReason, GameStatus, MoveInput, RulesEngine, RulesError};
use crate::transcript::Transcript;


#[derive(Clone, Debug, Default)]
pub struct ShakmatyRules {
    current: Chess,
    // Positions before each move, together with the move. Used for undo and repetition draws.
    history: Vec<(Chess, Move)>,
}

fn to_square(coord: Coord) -> Square {
    Square::from_coords(
        File::new(u32::from(coord.col.to_zero_based())),
        Rank::new(u32::from(coord.row.to_zero_based())),
    )
}

fn to_coord(square: Square) -> Coord {
    Coord::new(
        Row::from_zero_based(u32::from(square.rank()) as u8),
        Col::from_zero_based(u32::from(square.file()) as u8),
    )
}

fn to_color(force: Force) -> Color {
    match force {
        Force::White => Color::White,
        Force::Black => Color::Black,
    }
}

fn from_color(color: Color) -> Force {
    match color {
        Color::White => Force::White,
        Color::Black => Force::Black,
    }
}

fn to_role(kind: PieceKind) -> Role {
    match kind {
        PieceKind::Pawn => Role::Pawn,
        PieceKind::Knight => Role::Knight,
        PieceKind::Bishop => Role::Bishop,
        PieceKind::Rook => Role::Rook,
        PieceKind::Queen => Role::Queen,
        PieceKind::King => Role::King,
    }
}

fn from_role(role: Role) -> PieceKind {
    match role {
        Role::Pawn => PieceKind::Pawn,
        Role::Knight => PieceKind::Knight,
        Role::Bishop => PieceKind::Bishop,
        Role::Rook => PieceKind::Rook,
        Role::Queen => PieceKind::Queen,
        Role::King => PieceKind::King,
    }
}

// Source and destination as the user drags them. Castling is a king move by two files.
fn move_squares(m: &Move) -> Option<(Square, Square)> {
    match *m {
        Move::Normal { from, to, .. } | Move::EnPassant { from, to } => Some((from, to)),
        Move::Castle { king, rook } => {
            let king_side = u32::from(rook.file()) > u32::from(king.file());
            let file = if king_side { File::G } else { File::C };
            Some((king, Square::from_coords(file, king.rank())))
        }
        Move::Put { .. } => None,
    }
}

fn same_position(a: &Chess, b: &Chess) -> bool {
    a.board() == b.board()
        && a.turn() == b.turn()
        && a.castles().castling_rights() == b.castles().castling_rights()
        && a.ep_square(EnPassantMode::Legal) == b.ep_square(EnPassantMode::Legal)
}

impl ShakmatyRules {
    pub fn new() -> Self { Self::default() }

    fn play(&mut self, m: Move) -> String {
        let mut next = self.current.clone();
        let san = SanPlus::from_move_and_play_unchecked(&mut next, m);
        let before = mem::replace(&mut self.current, next);
        self.history.push((before, m));
        san.to_string()
    }

    fn repetition_count(&self) -> usize {
        self.history
            .iter()
            .map(|(pos, _)| pos)
            .chain(iter::once(&self.current))
            .filter(|pos| same_position(pos, &self.current))
            .count()
    }
}

impl RulesEngine for ShakmatyRules {
    fn reset(&mut self) { *self = Self::default(); }

    fn load_transcript(&mut self, transcript: &Transcript) -> Result<(), RulesError> {
        let mut scratch = Self::default();
        for (index, ply) in transcript.plies().iter().enumerate() {
            scratch
                .play_san(ply)
                .map_err(|_| RulesError::IllegalPly { index, ply: ply.clone() })?;
        }
        *self = scratch;
        Ok(())
    }

    fn try_move(&mut self, input: MoveInput) -> Result<String, RulesError> {
        if self.status().is_terminal() {
            return Err(RulesError::GameOver);
        }
        if let Some(kind) = input.promote_to {
            if !kind.can_be_promotion_target() {
                return Err(RulesError::InvalidPromotionTarget(kind));
            }
        }
        let squares = Some((to_square(input.from), to_square(input.to)));
        let candidates: Vec<Move> = self
            .current
            .legal_moves()
            .into_iter()
            .filter(|m| move_squares(m) == squares)
            .collect();
        if candidates.is_empty() {
            return Err(RulesError::IllegalMove);
        }
        let plain_move = candidates.iter().find(|m| m.promotion().is_none()).cloned();
        let chosen = match input.promote_to {
            // Promotion choice for a non-promoting move is ignored.
            Some(kind) => candidates
                .iter()
                .find(|m| m.promotion() == Some(to_role(kind)))
                .cloned()
                .or(plain_move),
            None => Some(plain_move.ok_or(RulesError::PromotionChoiceRequired)?),
        };
        let m = chosen.ok_or(RulesError::IllegalMove)?;
        Ok(self.play(m))
    }

    fn play_san(&mut self, san: &str) -> Result<String, RulesError> {
        if self.status().is_terminal() {
            return Err(RulesError::GameOver);
        }
        let san_plus: SanPlus =
            san.parse().map_err(|_| RulesError::BadNotation(san.to_owned()))?;
        let m = san_plus.san.to_move(&self.current).map_err(|_| RulesError::IllegalMove)?;
        Ok(self.play(m))
    }

    fn undo(&mut self) -> bool {
        match self.history.pop() {
            Some((before, _)) => {
                self.current = before;
                true
            }
            None => false,
        }
    }

    fn num_plies(&self) -> usize { self.history.len() }
    fn turn(&self) -> Force { from_color(self.current.turn()) }
    fn is_check(&self) -> bool { self.current.is_check() }

    fn status(&self) -> GameStatus {
        let pos = &self.current;
        if pos.is_checkmate() {
            GameStatus::Checkmate { loser: from_color(pos.turn()) }
        } else if pos.is_stalemate() {
            GameStatus::Draw(DrawReason::Stalemate)
        } else if pos.is_insufficient_material() {
            GameStatus::Draw(DrawReason::InsufficientMaterial)
        } else if pos.halfmoves() >= 100 {
            GameStatus::Draw(DrawReason::FiftyMoveRule)
        } else if self.repetition_count() >= 3 {
            GameStatus::Draw(DrawReason::ThreefoldRepetition)
        } else {
            GameStatus::Active
        }
    }

    fn piece_at(&self, coord: Coord) -> Option<Piece> {
        self.current
            .board()
            .piece_at(to_square(coord))
            .map(|p| Piece::new(from_role(p.role), from_color(p.color)))
    }

    fn legal_destinations(&self, from: Coord) -> Vec<Coord> {
        let from = to_square(from);
        // Promotions produce one move per target piece, hence `unique`.
        self.current
            .legal_moves()
            .iter()
            .filter_map(move_squares)
            .filter(|&(source, _)| source == from)
            .map(|(_, to)| to_coord(to))
            .unique()
            .collect()
    }

    fn last_move(&self) -> Option<(Coord, Coord)> {
        let (_, m) = self.history.last()?;
        move_squares(m).map(|(from, to)| (to_coord(from), to_coord(to)))
    }

    fn fen(&self) -> String {
        Fen::from_position(&self.current, EnPassantMode::Legal).to_string()
    }

    fn square_of(&self, force: Force, kind: PieceKind) -> Option<Coord> {
        let piece = shakmaty::Piece { color: to_color(force), role: to_role(kind) };
        self.current.board().by_piece(piece).first().map(to_coord)
    }
}
