use log::warn;

use whales_chess::session_state::{decode_fragment, encode_fragment};
use whales_chess::session_store::{SessionEntries, SessionStore};

use crate::web_document::web_window;
use crate::web_error_handling::JsResult;


fn current_hash() -> JsResult<String> { web_window()?.location().hash() }

// Persists the session in `window.location.hash`, so that the page URL can be shared.
pub struct LocationHashStore {}

impl LocationHashStore {
    pub fn new() -> Self { LocationHashStore {} }
}

impl SessionStore for LocationHashStore {
    fn load(&self) -> SessionEntries {
        match current_hash() {
            Ok(hash) => decode_fragment(&hash),
            Err(err) => {
                warn!("Cannot read location hash: {err:?}");
                Vec::new()
            }
        }
    }

    fn save(&mut self, entries: &[(String, String)]) {
        let fragment = encode_fragment(entries);
        let result = web_window().and_then(|window| {
            let location = window.location();
            // Assigning an identical hash would still fire `hashchange` in some browsers.
            if location.hash()?.trim_start_matches('#') != fragment {
                location.set_hash(&fragment)?;
            }
            Ok(())
        });
        if let Err(err) = result {
            warn!("Cannot save location hash: {err:?}");
        }
    }
}
