use crate::game::match_state::MatchState;
use crate::model::card::Card;
use crate::model::closing::ClosingResult;
use crate::model::round::DrawSource;
use core::fmt;
use serde::Serialize;

/// What a successful operation changed. Exactly one event follows each
/// successful mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum MatchEvent {
    CardDrawn {
        seat: usize,
        source: DrawSource,
    },
    CardDiscarded {
        seat: usize,
        card: Card,
    },
    /// A discard that closed the round. Scoring has already been applied
    /// unless the closing was an instant win.
    RoundClosed {
        seat: usize,
        card: Card,
        closing: ClosingResult,
    },
    MeldsPlaced {
        seat: usize,
        melds: usize,
        round_settled: bool,
    },
    Rebought {
        seat: usize,
        score: u32,
    },
    RoundRedealt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&MatchState, &MatchEvent)>;

#[derive(Default)]
pub struct Listeners {
    next_id: u64,
    entries: Vec<(ListenerId, Listener)>,
}

impl Listeners {
    pub fn subscribe(&mut self, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, listener));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != before
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Calls every listener in subscription order.
    pub fn notify(&mut self, state: &MatchState, event: &MatchEvent) {
        for (_, listener) in self.entries.iter_mut() {
            listener(state, event);
        }
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.entries.len())
            .finish()
    }
}
