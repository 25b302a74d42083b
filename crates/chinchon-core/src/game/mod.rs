pub mod config;
pub mod events;
pub mod match_state;
