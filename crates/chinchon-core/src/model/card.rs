use crate::model::rank::Rank;
use crate::model::suit::Suit;
use core::cmp::Ordering;
use core::fmt;
use serde::{Deserialize, Serialize};

pub const WILDCARD_POINTS: u32 = 20;

/// A physical card. Wildcards carry no suit or rank, only a tag that tells
/// the individual wildcards of a deck apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Card {
    Suited { rank: Rank, suit: Suit },
    Wildcard(u8),
}

impl Card {
    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Card::Suited { rank, suit }
    }

    pub const fn wildcard(tag: u8) -> Self {
        Card::Wildcard(tag)
    }

    pub const fn is_wildcard(self) -> bool {
        matches!(self, Card::Wildcard(_))
    }

    pub const fn rank(self) -> Option<Rank> {
        match self {
            Card::Suited { rank, .. } => Some(rank),
            Card::Wildcard(_) => None,
        }
    }

    pub const fn suit(self) -> Option<Suit> {
        match self {
            Card::Suited { suit, .. } => Some(suit),
            Card::Wildcard(_) => None,
        }
    }

    pub const fn points(self) -> u32 {
        match self {
            Card::Suited { rank, .. } => rank.points(),
            Card::Wildcard(_) => WILDCARD_POINTS,
        }
    }

    /// Suited cards below five may be left loose when closing with two groups.
    pub fn is_low(self) -> bool {
        matches!(self.rank(), Some(rank) if rank.value() < 5)
    }
}

impl Ord for Card {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Card::Wildcard(a), Card::Wildcard(b)) => a.cmp(b),
            (Card::Wildcard(_), Card::Suited { .. }) => Ordering::Greater,
            (Card::Suited { .. }, Card::Wildcard(_)) => Ordering::Less,
            (
                Card::Suited { rank: ra, suit: sa },
                Card::Suited { rank: rb, suit: sb },
            ) => sa.cmp(sb).then(ra.cmp(rb)),
        }
    }
}

impl PartialOrd for Card {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Card::Suited { rank, suit } => write!(f, "{rank}{suit}"),
            Card::Wildcard(tag) => write!(f, "W{tag}"),
        }
    }
}
