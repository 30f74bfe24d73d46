// Persisted session configuration and its URL fragment form.
//
// Fragment format is a flat list of URI-encoded `key:value` pairs joined by commas, e.g.
// `playerColor:w,backendModel:random,pgn:1.%20e4%20e5`. Commas inside keys and values are
// escaped as `%2C`, colons inside keys as `%3A`. The same entries are written to any
// `SessionStore`, so the fragment doubles as a shareable link to the game.

use log::warn;
use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};

use crate::force::Force;
use crate::rules::RulesEngine;
use crate::transcript::Transcript;


pub const DEFAULT_OPPONENT: &str = "random";

pub const PLAYER_COLOR_KEY: &str = "playerColor";
pub const OPPONENT_KEY: &str = "backendModel";
pub const PGN_KEY: &str = "pgn";

// Characters escaped by JS `encodeURI`. Everything else in ASCII, including the reserved
// `;,/?:@&=+$#`, is kept as is; non-ASCII is always escaped.
const URI_ESCAPED: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');
const VALUE_ESCAPED: &AsciiSet = &URI_ESCAPED.add(b',');
const KEY_ESCAPED: &AsciiSet = &VALUE_ESCAPED.add(b':');

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SessionState {
    pub player_force: Force,
    pub opponent_id: String,
    pub transcript: Transcript,
}

impl Default for SessionState {
    fn default() -> Self {
        SessionState {
            player_force: Force::White,
            opponent_id: DEFAULT_OPPONENT.to_owned(),
            transcript: Transcript::new(),
        }
    }
}

impl SessionState {
    pub fn new(player_force: Force, opponent_id: String, transcript: Transcript) -> Self {
        SessionState { player_force, opponent_id, transcript }
    }

    pub fn to_entries(&self) -> Vec<(String, String)> {
        vec![
            (PLAYER_COLOR_KEY.to_owned(), self.player_force.to_letter().to_string()),
            (OPPONENT_KEY.to_owned(), self.opponent_id.clone()),
            (PGN_KEY.to_owned(), self.transcript.to_pgn()),
        ]
    }

    // Builds state from persisted entries. Never fails: missing or malformed values fall back to
    // defaults. The transcript is replayed from the initial position with `R` and stored in the
    // engine's canonical notation; if any ply is illegal the whole transcript is discarded.
    pub fn from_entries<R: RulesEngine + Default>(entries: &[(String, String)]) -> Self {
        let mut state = SessionState::default();
        for (key, value) in entries {
            match key.as_str() {
                PLAYER_COLOR_KEY => match Force::from_letter(value) {
                    Some(force) => state.player_force = force,
                    None => warn!("Ignoring persisted player color '{value}'"),
                },
                OPPONENT_KEY => {
                    if !value.is_empty() {
                        state.opponent_id = value.clone();
                    }
                }
                PGN_KEY => {
                    state.transcript = if value.is_empty() {
                        Transcript::new()
                    } else {
                        match canonical_transcript::<R>(value) {
                            Ok(transcript) => transcript,
                            Err(err) => {
                                warn!("Discarding persisted game '{value}': {err}");
                                Transcript::new()
                            }
                        }
                    };
                }
                _ => {}
            }
        }
        state
    }

    pub fn to_fragment(&self) -> String { encode_fragment(&self.to_entries()) }

    pub fn from_fragment<R: RulesEngine + Default>(fragment: &str) -> Self {
        SessionState::from_entries::<R>(&decode_fragment(fragment))
    }
}

fn canonical_transcript<R: RulesEngine + Default>(pgn: &str) -> Result<Transcript, String> {
    let parsed = Transcript::parse(pgn).map_err(|err| err.to_string())?;
    let mut rules = R::default();
    let mut plies = Vec::with_capacity(parsed.len());
    for (index, ply) in parsed.plies().iter().enumerate() {
        let san = rules
            .play_san(ply)
            .map_err(|err| format!("ply #{} '{}': {}", index + 1, ply, err))?;
        plies.push(san);
    }
    Ok(Transcript::from_plies(plies))
}

pub fn encode_fragment(entries: &[(String, String)]) -> String {
    entries
        .iter()
        .map(|(key, value)| {
            format!("{}:{}", utf8_percent_encode(key, KEY_ESCAPED), utf8_percent_encode(value, VALUE_ESCAPED))
        })
        .collect::<Vec<_>>()
        .join(",")
}

// Inverse of `encode_fragment`. A leading '#' is ignored. Components without ':' are dropped.
pub fn decode_fragment(fragment: &str) -> Vec<(String, String)> {
    let fragment = fragment.strip_prefix('#').unwrap_or(fragment);
    let decode = |s: &str| percent_decode_str(s).decode_utf8_lossy().into_owned();
    fragment
        .split(',')
        .filter_map(|component| component.split_once(':'))
        .map(|(key, value)| (decode(key), decode(value)))
        .collect()
}
