use crate::model::hand::Hand;
use core::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    name: String,
    score: u32,
    hand: Hand,
    rebought: bool,
    rebuy_offered: bool,
    eliminated: bool,
}

impl Player {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            score: 0,
            hand: Hand::new(),
            rebought: false,
            rebuy_offered: false,
            eliminated: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn hand(&self) -> &Hand {
        &self.hand
    }

    pub(crate) fn hand_mut(&mut self) -> &mut Hand {
        &mut self.hand
    }

    pub fn add_points(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
    }

    /// Scores never go below zero.
    pub fn subtract_points(&mut self, points: u32) {
        self.score = self.score.saturating_sub(points);
    }

    pub(crate) fn set_score(&mut self, score: u32) {
        self.score = score;
    }

    pub fn has_rebought(&self) -> bool {
        self.rebought
    }

    pub(crate) fn mark_rebought(&mut self) {
        self.rebought = true;
        self.rebuy_offered = false;
    }

    /// Set while the player sits above the limit with a re-buy still open.
    pub fn rebuy_offered(&self) -> bool {
        self.rebuy_offered
    }

    pub(crate) fn set_rebuy_offered(&mut self, offered: bool) {
        self.rebuy_offered = offered;
    }

    pub fn is_eliminated(&self) -> bool {
        self.eliminated
    }

    pub fn is_active(&self) -> bool {
        !self.eliminated
    }

    pub(crate) fn eliminate(&mut self) {
        self.eliminated = true;
        self.rebuy_offered = false;
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} pts)", self.name, self.score)?;
        if self.rebought {
            f.write_str(" [rebought]")?;
        }
        if self.eliminated {
            f.write_str(" [eliminated]")?;
        }
        Ok(())
    }
}
