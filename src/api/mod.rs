pub mod game_api;
pub mod odds_api;
