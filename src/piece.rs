use crate::force::Force;
use crate::util::as_single_char;


#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Piece {
    pub kind: PieceKind,
    pub force: Force,
}

impl PieceKind {
    pub fn from_algebraic_char(notation: char) -> Option<Self> {
        match notation {
            'P' => Some(PieceKind::Pawn),
            'N' => Some(PieceKind::Knight),
            'B' => Some(PieceKind::Bishop),
            'R' => Some(PieceKind::Rook),
            'Q' => Some(PieceKind::Queen),
            'K' => Some(PieceKind::King),
            _ => None,
        }
    }

    pub fn can_be_promotion_target(self) -> bool {
        matches!(self, PieceKind::Knight | PieceKind::Bishop | PieceKind::Rook | PieceKind::Queen)
    }

    // Parses promotion choices as typed by users or sent by board widgets: "q", "N", etc.
    // Empty string means "no choice".
    pub fn from_promotion_choice(s: &str) -> Result<Option<Self>, String> {
        if s.is_empty() {
            return Ok(None);
        }
        as_single_char(s)
            .and_then(|ch| Self::from_algebraic_char(ch.to_ascii_uppercase()))
            .filter(|kind| kind.can_be_promotion_target())
            .map(Some)
            .ok_or_else(|| format!("Invalid promotion choice: '{s}'"))
    }
}

impl Piece {
    pub fn new(kind: PieceKind, force: Force) -> Self { Piece { kind, force } }

    // FEN piece placement letter: uppercase for White, lowercase for Black.
    pub fn from_fen_char(ch: char) -> Option<Self> {
        let kind = PieceKind::from_algebraic_char(ch.to_ascii_uppercase())?;
        let force = if ch.is_ascii_uppercase() { Force::White } else { Force::Black };
        Some(Piece { kind, force })
    }
}

pub fn piece_to_pictogram(piece_kind: PieceKind, force: Force) -> char {
    use self::Force::*;
    use self::PieceKind::*;
    match (force, piece_kind) {
        (White, Pawn) => '♙',
        (White, Knight) => '♘',
        (White, Bishop) => '♗',
        (White, Rook) => '♖',
        (White, Queen) => '♕',
        (White, King) => '♔',
        (Black, Pawn) => '♟',
        (Black, Knight) => '♞',
        (Black, Bishop) => '♝',
        (Black, Rook) => '♜',
        (Black, Queen) => '♛',
        (Black, King) => '♚',
    }
}
