use std::fmt;
use std::str::FromStr;

use itertools::Itertools;


pub const NUM_ROWS: u8 = 8;
pub const NUM_COLS: u8 = 8;


#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Row {
    idx: u8, // 0-based, rank 1 is 0
}

impl Row {
    pub const fn from_zero_based(idx: u8) -> Self {
        assert!(idx < NUM_ROWS);
        Self { idx }
    }
    pub fn from_algebraic(ch: char) -> Option<Self> {
        let idx = (ch as u32).checked_sub('1' as u32)?;
        (idx < NUM_ROWS as u32).then(|| Self::from_zero_based(idx as u8))
    }
    pub const fn to_zero_based(self) -> u8 { self.idx }
    pub const fn to_algebraic(self) -> char { (self.idx + b'1') as char }
    pub fn all() -> impl DoubleEndedIterator<Item = Self> + Clone {
        (0..NUM_ROWS).map(Self::from_zero_based)
    }
}


#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Col {
    idx: u8, // 0-based, file a is 0
}

impl Col {
    pub const fn from_zero_based(idx: u8) -> Col {
        assert!(idx < NUM_COLS);
        Col { idx }
    }
    pub fn from_algebraic(ch: char) -> Option<Self> {
        let idx = (ch as u32).checked_sub('a' as u32)?;
        (idx < NUM_COLS as u32).then(|| Self::from_zero_based(idx as u8))
    }
    pub const fn to_zero_based(self) -> u8 { self.idx }
    pub const fn to_algebraic(self) -> char { (self.idx + b'a') as char }
    pub fn all() -> impl Iterator<Item = Self> + Clone { (0..NUM_COLS).map(Self::from_zero_based) }
}


#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coord {
    pub row: Row,
    pub col: Col,
}

impl Coord {
    pub const fn new(row: Row, col: Col) -> Self { Self { row, col } }

    pub fn from_algebraic(s: &str) -> Option<Self> {
        let (col, row) = s.chars().collect_tuple()?;
        Some(Coord { row: Row::from_algebraic(row)?, col: Col::from_algebraic(col)? })
    }
    pub fn to_algebraic(self) -> String {
        format!("{}{}", self.col.to_algebraic(), self.row.to_algebraic())
    }

    // All squares in reading order as seen by White: a8, b8, ..., h8, a7, ..., h1.
    pub fn all() -> impl Iterator<Item = Coord> {
        Row::all().rev().cartesian_product(Col::all()).map(|(row, col)| Coord { row, col })
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.col.to_algebraic(), self.row.to_algebraic())
    }
}

impl fmt::Debug for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Coord({}{})", self.col.to_algebraic(), self.row.to_algebraic())
    }
}

impl FromStr for Coord {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Coord::from_algebraic(s).ok_or_else(|| format!("Invalid square: '{s}'"))
    }
}
