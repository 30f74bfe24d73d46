use anyhow::anyhow;
use itertools::Itertools;

use whales_chess::api::{self, ApiCommand};

use crate::client_config::ClientConfig;
use crate::network::HttpTransport;


pub fn run(config: ClientConfig) -> anyhow::Result<()> {
    let transport = HttpTransport::new(&config)?;
    let models = transport
        .post(&ApiCommand::ListModels)
        .and_then(|body| api::parse_list_models(&body))
        .map_err(|err| anyhow!(api::friendly_error_message(&err.to_string())))?;
    let width = models.iter().map(|m| m.internal_name.len()).max().unwrap_or(0);
    println!(
        "{}",
        models
            .iter()
            .map(|m| format!("{:width$}  {}", m.internal_name, m.display_name))
            .join("\n")
    );
    Ok(())
}
