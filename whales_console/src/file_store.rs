use std::fs;
use std::io;
use std::path::PathBuf;

use log::warn;

use whales_chess::session_state::{decode_fragment, encode_fragment};
use whales_chess::session_store::{FragmentStore, SessionEntries, SessionStore};


// Keeps the session as a URL fragment in a text file. Session persistence is best-effort: I/O
// errors are logged and otherwise ignored.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self { FileStore { path: path.into() } }
}

impl SessionStore for FileStore {
    fn load(&self) -> SessionEntries {
        match fs::read_to_string(&self.path) {
            Ok(contents) => decode_fragment(contents.trim()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(err) => {
                warn!("Cannot read session from {}: {err}", self.path.display());
                Vec::new()
            }
        }
    }

    fn save(&mut self, entries: &[(String, String)]) {
        if let Err(err) = fs::write(&self.path, encode_fragment(entries) + "\n") {
            warn!("Cannot save session to {}: {err}", self.path.display());
        }
    }
}

pub enum ConsoleStore {
    File(FileStore),
    Memory(FragmentStore),
}

impl SessionStore for ConsoleStore {
    fn load(&self) -> SessionEntries {
        match self {
            ConsoleStore::File(store) => store.load(),
            ConsoleStore::Memory(store) => store.load(),
        }
    }

    fn save(&mut self, entries: &[(String, String)]) {
        match self {
            ConsoleStore::File(store) => store.save(entries),
            ConsoleStore::Memory(store) => store.save(entries),
        }
    }
}
