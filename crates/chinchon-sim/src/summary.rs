use std::fs;
use std::path::Path;

use chinchon_core::model::closing::ClosingType;
use serde::Serialize;

use crate::simulator::MatchRecord;

/// Closings seen in a match, by shape.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClosingTally {
    pub seven_run: usize,
    pub three_and_four: usize,
    pub two_groups_and_low_card: usize,
}

impl ClosingTally {
    pub fn record(&mut self, closing: ClosingType) {
        match closing {
            ClosingType::SevenRun => self.seven_run += 1,
            ClosingType::ThreeAndFour => self.three_and_four += 1,
            ClosingType::TwoGroupsAndLowCard => self.two_groups_and_low_card += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.seven_run + self.three_and_four + self.two_groups_and_low_card
    }

    fn absorb(&mut self, other: &ClosingTally) {
        self.seven_run += other.seven_run;
        self.three_and_four += other.three_and_four;
        self.two_groups_and_low_card += other.two_groups_and_low_card;
    }
}

#[derive(Debug, Clone)]
struct SeatSummary {
    name: String,
    wins: usize,
    total_score: u64,
}

/// Aggregates per-match records into the run's Markdown report.
#[derive(Debug, Clone)]
pub struct SummaryCollector {
    seats: Vec<SeatSummary>,
    matches: usize,
    finished: usize,
    truncated: usize,
    rounds: usize,
    voided_rounds: usize,
    instant_wins: usize,
    rebuys: usize,
    eliminations: usize,
    closings: ClosingTally,
}

impl SummaryCollector {
    pub fn new(names: Vec<String>) -> Self {
        Self {
            seats: names
                .into_iter()
                .map(|name| SeatSummary {
                    name,
                    wins: 0,
                    total_score: 0,
                })
                .collect(),
            matches: 0,
            finished: 0,
            truncated: 0,
            rounds: 0,
            voided_rounds: 0,
            instant_wins: 0,
            rebuys: 0,
            eliminations: 0,
            closings: ClosingTally::default(),
        }
    }

    pub fn record(&mut self, record: &MatchRecord) {
        self.matches += 1;
        if record.truncated {
            self.truncated += 1;
        } else {
            self.finished += 1;
        }
        self.rounds += record.rounds;
        self.voided_rounds += record.voided_rounds;
        self.rebuys += record.rebuys;
        self.eliminations += record.eliminations;
        if record.instant_win {
            self.instant_wins += 1;
        }
        self.closings.absorb(&record.closings);

        if let Some(seat) = record.winner_seat.and_then(|seat| self.seats.get_mut(seat)) {
            seat.wins += 1;
        }
        for (seat, score) in self.seats.iter_mut().zip(&record.final_scores) {
            seat.total_score += u64::from(*score);
        }
    }

    pub fn matches(&self) -> usize {
        self.matches
    }

    pub fn finished(&self) -> usize {
        self.finished
    }

    pub fn to_markdown(&self, run_id: &str) -> String {
        let mut out = String::new();
        out.push_str(&format!("# Simulation Summary: {run_id}\n\n"));
        out.push_str(&format!(
            "Matches: {} ({} finished, {} truncated)\n\n",
            self.matches, self.finished, self.truncated
        ));

        out.push_str("| Seat | Player | Wins | Win % | Avg final score |\n");
        out.push_str("|------|--------|------|-------|-----------------|\n");
        for (index, seat) in self.seats.iter().enumerate() {
            let win_rate = ratio(seat.wins, self.matches);
            let avg_score = if self.matches == 0 {
                0.0
            } else {
                seat.total_score as f64 / self.matches as f64
            };
            out.push_str(&format!(
                "| {index} | {name} | {wins} | {win:.1}% | {avg:.1} |\n",
                name = seat.name,
                wins = seat.wins,
                win = win_rate * 100.0,
                avg = avg_score,
            ));
        }

        out.push_str("\n| Metric | Total | Per match |\n");
        out.push_str("|--------|-------|-----------|\n");
        for (label, total) in [
            ("Rounds", self.rounds),
            ("Voided rounds", self.voided_rounds),
            ("Seven-card runs", self.closings.seven_run),
            ("Three and four", self.closings.three_and_four),
            ("Two groups and low card", self.closings.two_groups_and_low_card),
            ("Instant wins", self.instant_wins),
            ("Re-buys", self.rebuys),
            ("Eliminations", self.eliminations),
        ] {
            let per_match = if self.matches == 0 {
                0.0
            } else {
                total as f64 / self.matches as f64
            };
            out.push_str(&format!("| {label} | {total} | {per_match:.2} |\n"));
        }
        out
    }

    pub fn write_markdown(&self, path: impl AsRef<Path>, run_id: &str) -> std::io::Result<()> {
        fs::write(path.as_ref(), self.to_markdown(run_id))
    }
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(winner_seat: Option<usize>, final_scores: Vec<u32>) -> MatchRecord {
        let mut closings = ClosingTally::default();
        closings.record(ClosingType::ThreeAndFour);
        closings.record(ClosingType::TwoGroupsAndLowCard);
        MatchRecord {
            run_id: "unit".to_string(),
            match_index: 0,
            seed: 1,
            players: final_scores.len(),
            winner_seat,
            winner: None,
            rounds: 3,
            voided_rounds: 1,
            turns: 40,
            closings,
            instant_win: false,
            eliminations: 1,
            rebuys: 0,
            final_scores,
            truncated: false,
        }
    }

    #[test]
    fn tally_counts_each_shape() {
        let mut tally = ClosingTally::default();
        tally.record(ClosingType::SevenRun);
        tally.record(ClosingType::SevenRun);
        tally.record(ClosingType::ThreeAndFour);
        assert_eq!(tally.seven_run, 2);
        assert_eq!(tally.total(), 3);
    }

    #[test]
    fn markdown_reports_wins_per_seat() {
        let mut collector = SummaryCollector::new(vec!["Ana".into(), "Bruno".into()]);
        collector.record(&record(Some(1), vec![104, 30]));
        collector.record(&record(Some(1), vec![120, 0]));
        assert_eq!(collector.matches(), 2);
        assert_eq!(collector.finished(), 2);

        let markdown = collector.to_markdown("unit");
        assert!(markdown.contains("# Simulation Summary: unit"));
        assert!(markdown.contains("| 1 | Bruno | 2 | 100.0% | 15.0 |"));
        assert!(markdown.contains("| Three and four | 2 | 1.00 |"));
    }
}
