#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Force {
    White,
    Black,
}

impl Force {
    pub fn opponent(self) -> Force {
        match self {
            Force::White => Force::Black,
            Force::Black => Force::White,
        }
    }

    // Side to move after `num_plies` half-moves from the initial position.
    pub fn to_move_after(num_plies: usize) -> Force {
        if num_plies % 2 == 0 { Force::White } else { Force::Black }
    }

    // Single-letter form used in session fragments and by board widgets.
    pub fn to_letter(self) -> char {
        match self {
            Force::White => 'w',
            Force::Black => 'b',
        }
    }
    pub fn from_letter(s: &str) -> Option<Self> {
        match s {
            "w" => Some(Force::White),
            "b" => Some(Force::Black),
            _ => None,
        }
    }

    pub fn to_name(self) -> &'static str {
        match self {
            Force::White => "white",
            Force::Black => "black",
        }
    }
}
