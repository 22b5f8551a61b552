use std::fmt;

use crate::fmt::{money, round_cents};
use crate::models::Goal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressBand {
    /// More is needed now than when the goal was set.
    Regressed,
    NotStarted,
    /// Under half way.
    EarlyProgress,
    /// Half way or more, not yet done.
    NearCompletion,
    Completed,
}

impl ProgressBand {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Regressed => "regressed",
            Self::NotStarted => "not started",
            Self::EarlyProgress => "early progress",
            Self::NearCompletion => "near completion",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for ProgressBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Standing {
    pub band: ProgressBand,
    pub target: f64,
    pub remaining: f64,
    /// Distance between target and remaining, in either direction.
    pub difference: f64,
    /// `difference` as a percentage of the target, one decimal place.
    pub percent: f64,
}

/// Classify how far a goal has come. Amounts are compared in whole cents.
pub fn describe(original_target: f64, remaining_amount: f64) -> Standing {
    let target = round_cents(original_target);
    let remaining = round_cents(remaining_amount);
    let difference = round_cents((target - remaining).abs());
    let percent = if target > 0.0 {
        (difference / target * 1000.0).round() / 10.0
    } else {
        0.0
    };

    // A goal with nothing to save is complete from the start.
    let band = if target <= 0.0 {
        ProgressBand::Completed
    } else if remaining > target {
        ProgressBand::Regressed
    } else if remaining == target {
        ProgressBand::NotStarted
    } else if remaining <= 0.0 {
        ProgressBand::Completed
    } else if (target - remaining) / target < 0.5 {
        ProgressBand::EarlyProgress
    } else {
        ProgressBand::NearCompletion
    };

    Standing {
        band,
        target,
        remaining,
        difference,
        percent,
    }
}

/// Narrative paragraph about one goal's standing.
pub fn message(goal: &Goal, standing: &Standing, symbol: &str) -> String {
    let date = goal.start_date;
    let target = money(standing.target, symbol);
    let saved = money(standing.difference, symbol);
    let pct = standing.percent;
    match standing.band {
        ProgressBand::Regressed => format!(
            "Spending has outpaced saving. This goal was set on {date} at {target}, \
             but {} is now needed. There is still time to get back on track.",
            money(standing.remaining, symbol)
        ),
        ProgressBand::NotStarted => format!(
            "Just getting started. This goal was set on {date} to save {target}. \
             Nothing saved yet, but every bit counts."
        ),
        ProgressBand::EarlyProgress => format!(
            "Off to a strong start. Since {date} you have saved {saved} of {target}, \
             {pct}% of the way there."
        ),
        ProgressBand::NearCompletion => format!(
            "Almost there. Since {date} you have saved {pct}%, that is {saved} of {target}. \
             The end is in sight."
        ),
        ProgressBand::Completed => format!(
            "Done! The full {target} set aside since {date} has been saved."
        ),
    }
}
