use core::fmt;
use serde::{Deserialize, Serialize};

/// Ranks of the 40-card deck. There are no eights or nines, so a run from
/// Seven to the Jack has two missing positions to fill.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum Rank {
    One = 1,
    Two = 2,
    Three = 3,
    Four = 4,
    Five = 5,
    Six = 6,
    Seven = 7,
    Jack = 10,
    Knight = 11,
    King = 12,
}

impl Rank {
    pub const ORDERED: [Rank; 10] = [
        Rank::One,
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Jack,
        Rank::Knight,
        Rank::King,
    ];

    pub const fn from_value(value: u8) -> Option<Self> {
        match value {
            1 => Some(Rank::One),
            2 => Some(Rank::Two),
            3 => Some(Rank::Three),
            4 => Some(Rank::Four),
            5 => Some(Rank::Five),
            6 => Some(Rank::Six),
            7 => Some(Rank::Seven),
            10 => Some(Rank::Jack),
            11 => Some(Rank::Knight),
            12 => Some(Rank::King),
            _ => None,
        }
    }

    pub const fn value(self) -> u8 {
        self as u8
    }

    pub const fn points(self) -> u32 {
        let value = self as u32;
        if value >= 10 { 10 } else { value }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rank::Jack => f.write_str("J"),
            Rank::Knight => f.write_str("N"),
            Rank::King => f.write_str("K"),
            other => write!(f, "{}", other.value()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Rank;

    #[test]
    fn values_leave_a_gap_after_seven() {
        assert_eq!(Rank::Jack.value() - Rank::Seven.value(), 3);
        assert!(Rank::ORDERED.windows(2).all(|pair| pair[0].value() < pair[1].value()));
    }

    #[test]
    fn from_value_rejects_eight_and_nine() {
        assert_eq!(Rank::from_value(8), None);
        assert_eq!(Rank::from_value(9), None);
        assert_eq!(Rank::from_value(11), Some(Rank::Knight));
    }

    #[test]
    fn court_cards_are_worth_ten() {
        assert_eq!(Rank::King.points(), 10);
        assert_eq!(Rank::Jack.points(), 10);
        assert_eq!(Rank::Four.points(), 4);
    }

    #[test]
    fn display_uses_short_labels() {
        assert_eq!(Rank::Knight.to_string(), "N");
        assert_eq!(Rank::Three.to_string(), "3");
    }
}
