// Wire format of the move suggestion service: `POST /api/v1/http` with a JSON command.
//
// The service is trusted to be well-behaved, but not blindly: every response is checked for
// shape before use and any deviation is reported as `ApiError::Malformed`.

use derive_new::new;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::transcript::Transcript;
use crate::util::capitalize;


pub const API_PATH: &str = "/api/v1/http";

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum ApiCommand {
    ListModels,
    GetMove { model: String, pgn: String },
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize, new)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    pub display_name: String,
    pub internal_name: String,
}

#[derive(Clone, PartialEq, Eq, Debug, Error)]
pub enum ApiError {
    // Request did not produce a response body. Message is derived from transport status.
    #[error("{0}")]
    Transport(String),
    // Response carried a non-null `error`.
    #[error("{0}")]
    Server(String),
    // Response has unexpected shape.
    #[error("{0}")]
    Malformed(String),
}

impl ApiCommand {
    pub fn name(&self) -> &'static str {
        match self {
            ApiCommand::ListModels => "list_models",
            ApiCommand::GetMove { .. } => "get_move",
        }
    }

    pub fn to_json(&self) -> String {
        // Serializing a plain enum with string fields cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }
}

pub fn friendly_error_message(raw_message: &str) -> String {
    format!(
        "W.H.A.L.E.S. encountered an unexpected error: \"{}\". Unfortunately, we don't know how \
         to fix it. Sorry! Your best bet is to reload the page and see if things are fixed.",
        capitalize(raw_message)
    )
}

// Checks the envelope shared by all commands: a JSON object with `error` key which must be null.
fn parse_envelope(body: &str) -> Result<serde_json::Map<String, Value>, ApiError> {
    let Ok(Value::Object(object)) = serde_json::from_str::<Value>(body) else {
        return Err(ApiError::Malformed("API response is not an object".to_owned()));
    };
    match object.get("error") {
        None => Err(ApiError::Malformed("API response missing 'error' key".to_owned())),
        Some(Value::Null) => Ok(object),
        Some(Value::String(message)) => Err(ApiError::Server(message.clone())),
        Some(other) => Err(ApiError::Server(other.to_string())),
    }
}

pub fn parse_list_models(body: &str) -> Result<Vec<ModelInfo>, ApiError> {
    let object = parse_envelope(body)?;
    let malformed = |what: String| ApiError::Malformed(format!("API response for 'list_models' {what}"));
    let Some(Value::Array(models)) = object.get("models") else {
        return Err(malformed("was not an array".to_owned()));
    };
    let mut result = Vec::with_capacity(models.len());
    for model in models {
        let Value::Object(model) = model else {
            return Err(malformed("contained non-object".to_owned()));
        };
        let field = |key: &str| match model.get(key) {
            None => Err(malformed(format!("missing key '{key}'"))),
            Some(Value::String(s)) => Ok(s.clone()),
            Some(_) => Err(malformed(format!("has non-string for key '{key}'"))),
        };
        let display_name = field("displayName")?;
        let internal_name = field("internalName")?;
        result.push(ModelInfo { display_name, internal_name });
    }
    Ok(result)
}

pub fn parse_get_move(body: &str) -> Result<Transcript, ApiError> {
    let object = parse_envelope(body)?;
    let Some(Value::String(pgn)) = object.get("pgn") else {
        return Err(ApiError::Malformed("API response for 'get_move' has no 'pgn' string".to_owned()));
    };
    Transcript::parse(pgn).map_err(|err| {
        ApiError::Malformed(format!("API response for 'get_move' has invalid 'pgn': {err}"))
    })
}
