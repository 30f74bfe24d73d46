use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};


pub const DEFAULT_API_URL: &str = "http://localhost:5000";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub api_url: String,
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    // Session is not persisted between runs if absent.
    pub state_file: Option<String>,
}

// Command line flags. Take precedence over the config file.
#[derive(Clone, Default, Debug)]
pub struct ConfigOverrides {
    pub api_url: Option<String>,
    pub request_timeout: Option<Duration>,
    pub state_file: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            api_url: DEFAULT_API_URL.to_owned(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            state_file: None,
        }
    }
}

impl ClientConfig {
    pub fn from_yaml(contents: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(contents).context("Parsing config file")
    }

    pub fn load(config_file: Option<&str>, overrides: ConfigOverrides) -> anyhow::Result<Self> {
        let mut config = match config_file {
            Some(filename) => {
                let contents = std::fs::read_to_string(filename)
                    .with_context(|| format!("Reading config file '{filename}'"))?;
                Self::from_yaml(&contents)?
            }
            None => ClientConfig::default(),
        };
        config.apply(overrides);
        Ok(config)
    }

    fn apply(&mut self, overrides: ConfigOverrides) {
        let ConfigOverrides { api_url, request_timeout, state_file } = overrides;
        if let Some(api_url) = api_url {
            self.api_url = api_url;
        }
        if let Some(request_timeout) = request_timeout {
            self.request_timeout = request_timeout;
        }
        if state_file.is_some() {
            self.state_file = state_file;
        }
    }
}
