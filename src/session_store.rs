// Key-value persistence for `SessionState`. The coordinator only sees entries; where they end up
// (URL hash, local file, memory) is up to the store.

use crate::session_state::{decode_fragment, encode_fragment};


pub type SessionEntries = Vec<(String, String)>;

pub trait SessionStore {
    fn load(&self) -> SessionEntries;
    fn save(&mut self, entries: &[(String, String)]);
}

// Keeps the session as an encoded URL fragment.
#[derive(Default)]
pub struct FragmentStore {
    fragment: String,
}

impl FragmentStore {
    pub fn new() -> Self { Self::default() }
    pub fn from_fragment(fragment: &str) -> Self {
        FragmentStore {
            fragment: fragment.strip_prefix('#').unwrap_or(fragment).to_owned(),
        }
    }

    pub fn fragment(&self) -> &str { &self.fragment }
}

impl SessionStore for FragmentStore {
    fn load(&self) -> SessionEntries { decode_fragment(&self.fragment) }

    fn save(&mut self, entries: &[(String, String)]) { self.fragment = encode_fragment(entries); }
}
