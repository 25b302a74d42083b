use crate::model::card::Card;
use crate::model::rank::Rank;
use crate::model::suit::Suit;
use serde::Serialize;
use std::collections::BTreeMap;

pub const MIN_MELD_LEN: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MeldKind {
    /// Same rank, any suits.
    Set,
    /// Same suit, consecutive ranks.
    Run,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Meld {
    kind: MeldKind,
    cards: Vec<Card>,
}

impl Meld {
    pub fn new(kind: MeldKind, cards: Vec<Card>) -> Self {
        Self { kind, cards }
    }

    pub fn kind(&self) -> MeldKind {
        self.kind
    }

    pub fn is_run(&self) -> bool {
        self.kind == MeldKind::Run
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn contains(&self, card: Card) -> bool {
        self.cards.contains(&card)
    }

    pub fn wildcard_count(&self) -> usize {
        self.cards.iter().filter(|card| card.is_wildcard()).count()
    }
}

/// Hand-ordered wildcards with a consumed flag each. Allocation always hands
/// out the first unused one.
struct WildcardPool {
    cards: Vec<Card>,
    used: Vec<bool>,
}

impl WildcardPool {
    fn new(cards: &[Card]) -> Self {
        let cards: Vec<Card> = cards.iter().copied().filter(|c| c.is_wildcard()).collect();
        let used = vec![false; cards.len()];
        Self { cards, used }
    }

    fn available(&self) -> usize {
        self.used.iter().filter(|used| !**used).count()
    }

    fn take_one(&mut self) -> Option<Card> {
        let index = self.used.iter().position(|used| !used)?;
        self.used[index] = true;
        Some(self.cards[index])
    }

    /// Takes exactly `count` wildcards or none at all.
    fn take(&mut self, count: usize) -> Option<Vec<Card>> {
        if self.available() < count {
            return None;
        }
        (0..count).map(|_| self.take_one()).collect()
    }
}

/// Finds every set and run in `cards`.
///
/// Sets are resolved before runs, so they get first pick of the wildcards.
/// Runs are scanned from every starting card of a suit; runs from different
/// starting points may share suited cards, but a wildcard is never placed in
/// two melds of the result. Picking a consistent combination is left to the
/// caller.
pub fn find_melds(cards: &[Card]) -> Vec<Meld> {
    let mut pool = WildcardPool::new(cards);
    let mut melds = Vec::new();

    let mut by_rank: BTreeMap<Rank, Vec<Card>> = BTreeMap::new();
    let mut by_suit: BTreeMap<Suit, Vec<(Rank, Card)>> = BTreeMap::new();
    for card in cards.iter().copied() {
        if let Card::Suited { rank, suit } = card {
            by_rank.entry(rank).or_default().push(card);
            by_suit.entry(suit).or_default().push((rank, card));
        }
    }

    for (_, mut group) in by_rank {
        if group.len() < 2 {
            continue;
        }
        let needed = MIN_MELD_LEN.saturating_sub(group.len());
        let Some(fill) = pool.take(needed) else {
            continue;
        };
        group.extend(fill);
        melds.push(Meld::new(MeldKind::Set, group));
    }

    for (_, mut suited) in by_suit {
        suited.sort_by_key(|(rank, _)| rank.value());
        for start in 0..suited.len() {
            if let Some(run) = scan_run(&suited[start..], &mut pool) {
                melds.push(run);
            }
        }
    }

    melds
}

/// Extends a run from the first card of `suited`. A wildcard taken for a gap
/// or as padding stays consumed even when the run ends up too short.
fn scan_run(suited: &[(Rank, Card)], pool: &mut WildcardPool) -> Option<Meld> {
    let (first_rank, first_card) = *suited.first()?;
    let mut run = vec![first_card];
    let mut expected = first_rank.value() + 1;

    let mut index = 1;
    while index < suited.len() {
        let (rank, card) = suited[index];
        let value = rank.value();
        if value == expected {
            run.push(card);
            expected += 1;
            index += 1;
        } else if value > expected {
            // Fill one missing value and look at the same card again.
            let Some(wildcard) = pool.take_one() else {
                break;
            };
            run.push(wildcard);
            expected += 1;
        } else {
            index += 1;
        }
    }

    while run.len() < MIN_MELD_LEN {
        let Some(wildcard) = pool.take_one() else {
            break;
        };
        run.push(wildcard);
    }

    (run.len() >= MIN_MELD_LEN).then(|| Meld::new(MeldKind::Run, run))
}
