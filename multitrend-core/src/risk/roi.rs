//! Minimal-ROI ladder: required profit that decays with time in the trade.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoiRung {
    /// Minutes since entry after which the rung applies.
    pub minutes: u32,
    /// Return (fraction) required to take profit on this rung.
    pub required: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoiLadder {
    rungs: Vec<RoiRung>,
}

impl Default for RoiLadder {
    fn default() -> Self {
        Self::new(vec![
            RoiRung { minutes: 0, required: 0.08 },
            RoiRung { minutes: 30, required: 0.05 },
            RoiRung { minutes: 60, required: 0.03 },
            RoiRung { minutes: 120, required: 0.01 },
        ])
    }
}

impl RoiLadder {
    /// Rungs are kept in ascending time order.
    pub fn new(mut rungs: Vec<RoiRung>) -> Self {
        rungs.sort_by_key(|r| r.minutes);
        Self { rungs }
    }

    pub fn rungs(&self) -> &[RoiRung] {
        &self.rungs
    }

    /// First rung, in ascending time order, whose time has passed and whose
    /// required return is met.
    pub fn take_profit(&self, elapsed_minutes: u32, unrealized_return: f64) -> Option<RoiRung> {
        self.rungs
            .iter()
            .find(|r| r.minutes <= elapsed_minutes && unrealized_return >= r.required)
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forty_five_minutes_six_percent_hits_thirty_minute_rung() {
        let rung = RoiLadder::default().take_profit(45, 0.06).unwrap();
        assert_eq!(rung.minutes, 30);
        assert_eq!(rung.required, 0.05);
    }

    #[test]
    fn ten_minutes_nine_percent_hits_entry_rung() {
        let rung = RoiLadder::default().take_profit(10, 0.09).unwrap();
        assert_eq!(rung.minutes, 0);
    }

    #[test]
    fn earliest_satisfied_rung_wins() {
        // all four time thresholds passed, all met: the tightest rung wins
        let rung = RoiLadder::default().take_profit(500, 0.20).unwrap();
        assert_eq!(rung.minutes, 0);
    }

    #[test]
    fn no_rung_before_its_time() {
        assert_eq!(RoiLadder::default().take_profit(10, 0.06), None);
        assert_eq!(RoiLadder::default().take_profit(119, 0.02), None);
        assert_eq!(RoiLadder::default().take_profit(120, 0.02).unwrap().minutes, 120);
    }

    #[test]
    fn unsorted_input_is_sorted() {
        let ladder = RoiLadder::new(vec![
            RoiRung { minutes: 60, required: 0.01 },
            RoiRung { minutes: 0, required: 0.05 },
        ]);
        assert_eq!(ladder.rungs()[0].minutes, 0);
    }
}
