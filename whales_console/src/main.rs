// Legend for various fix-this comments:
//   * "TODO" - bug or missing crucial feature.
//   * "Improvement potential" - missing nice-to-have feature or an opportunity
//       to make code better or faster.

#![forbid(unsafe_code)]
#![cfg_attr(feature = "strict", deny(warnings))]

mod client_config;
mod client_main;
mod file_store;
mod models_main;
mod network;
mod tui;

use std::time::Duration;

use clap::{Arg, ArgMatches, Command, arg};
use client_config::{ClientConfig, ConfigOverrides};


fn common_args(command: Command) -> Command {
    command
        .arg(arg!(--"config" <file> "Path to the configuration file: yaml-serialized ClientConfig."))
        .arg(arg!(--"api-url" <url> "Move suggestion service address, e.g. http://localhost:5000"))
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .value_name("duration")
                .help("Request timeout, e.g. 30s")
                .value_parser(humantime::parse_duration),
        )
}

fn read_config(matches: &ArgMatches) -> anyhow::Result<ClientConfig> {
    let overrides = ConfigOverrides {
        api_url: matches.get_one::<String>("api-url").cloned(),
        request_timeout: matches.get_one::<Duration>("timeout").copied(),
        state_file: matches.try_get_one::<String>("state-file").ok().flatten().cloned(),
    };
    ClientConfig::load(matches.get_one::<String>("config").map(String::as_str), overrides)
}

fn main() -> anyhow::Result<()> {
    // Log to stderr: stdout is occupied by the board.
    env_logger::Builder::new()
        .target(env_logger::Target::Stderr)
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let matches = Command::new("W.H.A.L.E.S.")
        .author(clap::crate_authors!())
        .version(clap::crate_version!())
        .about("Play chess against the W.H.A.L.E.S. move suggestion service")
        .subcommand_required(true)
        .subcommand(
            common_args(Command::new("play").about("Play a game in the terminal"))
                .arg(arg!(--"state-file" <file> "Where to keep the session between runs"))
                .arg(arg!(--"fragment" <text> "Start from a shared session, e.g. 'playerColor:b,backendModel:random'")),
        )
        .subcommand(common_args(Command::new("models").about("List available opponents")))
        .get_matches();

    match matches.subcommand() {
        Some(("play", sub_matches)) => client_main::run(
            read_config(sub_matches)?,
            sub_matches.get_one::<String>("fragment").cloned(),
        ),
        Some(("models", sub_matches)) => models_main::run(read_config(sub_matches)?),
        _ => unreachable!("Exhausted list of subcommands and subcommand_required prevents `None`"),
    }
}
