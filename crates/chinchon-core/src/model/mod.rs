pub mod card;
pub mod closing;
pub mod deck;
pub mod discard;
pub mod hand;
pub mod meld;
pub mod player;
pub mod rank;
pub mod round;
pub mod score;
pub mod suit;
