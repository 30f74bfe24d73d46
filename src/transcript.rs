// Game transcript: the ordered list of plies played so far, in SAN.
//
// Text form is PGN movetext without headers, e.g. "1. e4 e5 2. Nf3". Parsing is lenient towards
// what PGN writers usually produce (move numbers, result markers, comments, NAGs, variations and
// even tag pairs are skipped), but it doesn't check legality: that's the rules engine's job.

use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use regex_lite::Regex;
use thiserror::Error;

use crate::force::Force;


#[derive(Clone, PartialEq, Eq, Debug, Error)]
pub enum TranscriptError {
    #[error("unterminated comment")]
    UnterminatedComment,
    #[error("unterminated variation")]
    UnterminatedVariation,
    #[error("unterminated tag pair")]
    UnterminatedTag,
    #[error("unexpected '{0}'")]
    UnexpectedChar(char),
}

#[derive(Clone, PartialEq, Eq, Default, Debug)]
pub struct Transcript {
    plies: Vec<String>,
}

const RESULT_MARKERS: [&str; 4] = ["1-0", "0-1", "1/2-1/2", "*"];

// Strips check and annotation suffixes: "Qxf7#" -> "Qxf7", "e4!?" -> "e4".
pub fn san_core(ply: &str) -> &str { ply.trim_end_matches(['+', '#', '!', '?']) }

impl Transcript {
    pub fn new() -> Self { Transcript { plies: Vec::new() } }
    pub fn from_plies(plies: Vec<String>) -> Self { Transcript { plies } }

    pub fn plies(&self) -> &[String] { &self.plies }
    pub fn len(&self) -> usize { self.plies.len() }
    pub fn is_empty(&self) -> bool { self.plies.is_empty() }
    pub fn last(&self) -> Option<&str> { self.plies.last().map(String::as_str) }

    pub fn side_to_move(&self) -> Force { Force::to_move_after(self.plies.len()) }
    // Force that made the ply with the given zero-based index.
    pub fn ply_force(index: usize) -> Force { Force::to_move_after(index) }

    pub fn push(&mut self, ply: String) { self.plies.push(ply); }
    pub fn pop(&mut self) -> Option<String> { self.plies.pop() }
    pub fn clear(&mut self) { self.plies.clear(); }

    pub fn parse(text: &str) -> Result<Self, TranscriptError> {
        lazy_static! {
            static ref MOVE_NUMBER_RE: Regex = Regex::new(r"^[0-9]+\.+").unwrap();
        }
        let movetext = strip_non_moves(text)?;
        let mut plies = Vec::new();
        for token in movetext.split_whitespace() {
            let token = MOVE_NUMBER_RE.replace(token, "");
            let token = token.trim_end_matches(['!', '?']);
            if token.is_empty() || token == "-" || token.starts_with('$') {
                continue;
            }
            if RESULT_MARKERS.contains(&token) {
                continue;
            }
            plies.push(token.to_owned());
        }
        Ok(Transcript { plies })
    }

    pub fn to_pgn(&self) -> String {
        let mut words = Vec::with_capacity(self.plies.len() * 3 / 2 + 1);
        for (index, ply) in self.plies.iter().enumerate() {
            if index % 2 == 0 {
                words.push(format!("{}.", index / 2 + 1));
            }
            words.push(ply.clone());
        }
        words.join(" ")
    }

    // If `extended` is this transcript plus exactly one more ply, returns that ply.
    // Plies are compared ignoring check and annotation marks.
    pub fn one_ply_extension<'a>(&self, extended: &'a Transcript) -> Option<&'a str> {
        if extended.len() != self.len() + 1 {
            return None;
        }
        let prefix_matches = self
            .plies
            .iter()
            .zip(extended.plies.iter())
            .all(|(a, b)| san_core(a) == san_core(b));
        if prefix_matches { extended.last() } else { None }
    }
}

// Removes comments, variations, tag pairs and rest-of-line comments, leaving only movetext.
fn strip_non_moves(text: &str) -> Result<String, TranscriptError> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '{' => {
                chars.by_ref().find(|&c| c == '}').ok_or(TranscriptError::UnterminatedComment)?;
                out.push(' ');
            }
            ';' => {
                chars.by_ref().find(|&c| c == '\n');
                out.push(' ');
            }
            '(' => {
                let mut depth = 1;
                while depth > 0 {
                    match chars.next() {
                        Some('(') => depth += 1,
                        Some(')') => depth -= 1,
                        Some('{') => {
                            chars
                                .by_ref()
                                .find(|&c| c == '}')
                                .ok_or(TranscriptError::UnterminatedComment)?;
                        }
                        Some(_) => {}
                        None => return Err(TranscriptError::UnterminatedVariation),
                    }
                }
                out.push(' ');
            }
            '[' => {
                let mut in_string = false;
                loop {
                    match chars.next() {
                        Some('"') => in_string = !in_string,
                        Some('\\') if in_string => {
                            chars.next();
                        }
                        Some(']') if !in_string => break,
                        Some(_) => {}
                        None => return Err(TranscriptError::UnterminatedTag),
                    }
                }
                out.push(' ');
            }
            '}' | ')' | ']' => return Err(TranscriptError::UnexpectedChar(ch)),
            _ => out.push(ch),
        }
    }
    Ok(out)
}

impl fmt::Display for Transcript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.to_pgn()) }
}

impl FromStr for Transcript {
    type Err = TranscriptError;
    fn from_str(s: &str) -> Result<Self, Self::Err> { Transcript::parse(s) }
}
