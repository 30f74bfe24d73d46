use crate::force::Force;
use crate::rules::{GameStatus, RulesEngine};


pub fn status_text(rules: &impl RulesEngine, player_force: Force) -> &'static str {
    let player_turn = rules.turn() == player_force;
    match rules.status() {
        GameStatus::Checkmate { .. } => {
            if player_turn {
                "Checkmate! You have lost."
            } else {
                "Checkmate! You have won!"
            }
        }
        GameStatus::Draw(_) => "Draw!",
        GameStatus::Active => match (player_turn, rules.is_check()) {
            (true, true) => "Check! Your move.",
            (true, false) => "Your move!",
            (false, true) => "Check! The computer is thinking...",
            (false, false) => "The computer is thinking...",
        },
    }
}
