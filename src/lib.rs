#![forbid(unsafe_code)]
#![cfg_attr(feature = "strict", deny(warnings))]

pub mod api;
pub mod board_view;
pub mod coord;
pub mod coordinator;
pub mod force;
pub mod move_client;
pub mod piece;
pub mod rules;
pub mod session_state;
pub mod session_store;
pub mod shakmaty_rules;
pub mod status;
pub mod transcript;
pub mod util;
