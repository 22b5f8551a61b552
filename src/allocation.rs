//! Goal progress allocation.
//!
//! Time is cut into segments at each distinct goal start date. Every segment's
//! net profit is split equally between the goals that have started and are not
//! yet complete. When a share covers what a goal still needs, the goal
//! completes and the leftover is re-split between the goals still short, within
//! the same segment. Progress is rebuilt from the ledger on every call.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::debug;

use crate::error::{Result, StashError};
use crate::fmt::round_cents;
use crate::ledger::LedgerQuery;
use crate::models::Goal;
use crate::profit::period_profit;

/// Remaining amount per goal identity.
pub type ProgressMap = BTreeMap<i64, f64>;

#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub net_profit: f64,
    /// Goals started by `start` and still incomplete when the segment began.
    pub active_goal_count: usize,
    /// Profit no goal absorbed: no active goals, or surplus left after every
    /// active goal completed.
    pub unallocated: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Allocation {
    pub remaining: ProgressMap,
    pub segments: Vec<Segment>,
}

struct GoalProgress {
    id: i64,
    start_date: NaiveDate,
    remaining: f64,
}

/// Inclusive `(start, end)` ranges for every segment that has begun by
/// `today`. Each segment ends the day before the next distinct start date,
/// the last one ends on `today`.
pub fn segment_bounds(goals: &[Goal], today: NaiveDate) -> Vec<(NaiveDate, NaiveDate)> {
    let mut dates: Vec<NaiveDate> = goals
        .iter()
        .map(|g| g.start_date)
        .filter(|d| *d <= today)
        .collect();
    dates.sort();
    dates.dedup();

    dates
        .iter()
        .enumerate()
        .map(|(i, start)| {
            let end = match dates.get(i + 1) {
                Some(next) => next.pred_opt().unwrap_or(*start),
                None => today,
            };
            (*start, end)
        })
        .collect()
}

/// Split `pool` equally over `active`, cascading the surplus of goals that
/// complete onto the rest. Returns whatever no goal could absorb.
///
/// A goal completes once less than half a cent would be left, and its
/// remaining amount is then exactly zero.
fn distribute(progress: &mut [GoalProgress], mut active: Vec<usize>, mut pool: f64) -> f64 {
    while pool > 0.0 && !active.is_empty() {
        let share = pool / active.len() as f64;
        let mut surplus = 0.0;
        active.retain(|&i| {
            let goal = &mut progress[i];
            if round_cents(goal.remaining - share) <= 0.0 {
                surplus += (share - goal.remaining).max(0.0);
                goal.remaining = 0.0;
                false
            } else {
                goal.remaining -= share;
                true
            }
        });
        pool = surplus;
    }
    pool
}

fn validate(goals: &[Goal]) -> Result<()> {
    match goals
        .iter()
        .find(|g| !g.target_amount.is_finite() || g.target_amount <= 0.0)
    {
        Some(bad) => Err(StashError::InvalidGoal {
            id: bad.id,
            target: bad.target_amount,
        }),
        None => Ok(()),
    }
}

/// Allocate ledger profit to `goals` as of `today`, keeping the per-segment
/// breakdown.
pub fn allocate<L: LedgerQuery + ?Sized>(goals: &[Goal], ledger: &L, today: NaiveDate) -> Result<Allocation> {
    validate(goals)?;

    let mut progress: Vec<GoalProgress> = goals
        .iter()
        .map(|g| GoalProgress {
            id: g.id,
            start_date: g.start_date,
            remaining: g.target_amount,
        })
        .collect();

    let mut segments = Vec::new();
    for (start, end) in segment_bounds(goals, today) {
        let net_profit = period_profit(ledger, start, end)?;
        let active: Vec<usize> = progress
            .iter()
            .enumerate()
            .filter(|(_, p)| p.start_date <= start && p.remaining > 0.0)
            .map(|(i, _)| i)
            .collect();
        let active_goal_count = active.len();

        // Losses never push a goal back up.
        let unallocated = if net_profit <= 0.0 {
            0.0
        } else if active.is_empty() {
            net_profit
        } else {
            distribute(&mut progress, active, net_profit)
        };

        debug!(%start, %end, net_profit, active_goal_count, unallocated, "allocated segment");
        segments.push(Segment {
            start,
            end,
            net_profit,
            active_goal_count,
            unallocated,
        });
    }

    Ok(Allocation {
        remaining: progress.into_iter().map(|p| (p.id, p.remaining)).collect(),
        segments,
    })
}

/// Remaining amount of every goal as of `today`.
pub fn compute_progress<L: LedgerQuery + ?Sized>(goals: &[Goal], ledger: &L, today: NaiveDate) -> Result<ProgressMap> {
    Ok(allocate(goals, ledger, today)?.remaining)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EntryKind, LedgerEntry};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn goal(id: i64, start: &str, target: f64) -> Goal {
        Goal {
            id,
            start_date: date(start),
            target_amount: target,
            description: format!("goal {id}"),
        }
    }

    #[derive(Default)]
    struct MemLedger {
        income: Vec<LedgerEntry>,
        expenses: Vec<LedgerEntry>,
    }

    impl MemLedger {
        fn with(mut self, kind: EntryKind, d: &str, amount: f64) -> Self {
            let rows = match kind {
                EntryKind::Income => &mut self.income,
                EntryKind::Expenses => &mut self.expenses,
            };
            rows.push(LedgerEntry {
                id: rows.len() as i64 + 1,
                date: date(d),
                amount,
                category: "Misc".into(),
                description: String::new(),
            });
            self
        }
    }

    impl LedgerQuery for MemLedger {
        fn query_range(
            &self,
            kind: EntryKind,
            start: NaiveDate,
            end: NaiveDate,
            category: Option<&str>,
        ) -> Result<Vec<LedgerEntry>> {
            let rows = match kind {
                EntryKind::Income => &self.income,
                EntryKind::Expenses => &self.expenses,
            };
            Ok(rows
                .iter()
                .filter(|e| e.date >= start && e.date <= end)
                .filter(|e| category.map_or(true, |c| e.category == c))
                .cloned()
                .collect())
        }
    }

    struct BrokenLedger;

    impl LedgerQuery for BrokenLedger {
        fn query_range(&self, _: EntryKind, _: NaiveDate, _: NaiveDate, _: Option<&str>) -> Result<Vec<LedgerEntry>> {
            Err(StashError::unavailable(rusqlite::Error::InvalidQuery))
        }
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < 1e-9, "expected {expected}, got {actual}");
    }

    #[test]
    fn test_completion_cascade() {
        let goals = vec![goal(1, "2025-01-01", 100.0), goal(2, "2025-01-01", 300.0)];
        let ledger = MemLedger::default().with(EntryKind::Income, "2025-01-01", 250.0);
        let progress = compute_progress(&goals, &ledger, date("2025-01-31")).unwrap();
        assert_close(progress[&1], 0.0);
        assert_close(progress[&2], 150.0);
    }

    #[test]
    fn test_exactly_funded_goal_completes_despite_float_residue() {
        // 286.85 = 271.88 + 29.94 / 2, which leaves ~2.7e-14 in plain f64 arithmetic.
        let goals = vec![
            goal(1, "2025-01-01", 286.85),
            goal(2, "2025-02-01", 1000.0),
            goal(3, "2025-03-01", 1000.0),
        ];
        let ledger = MemLedger::default()
            .with(EntryKind::Income, "2025-01-05", 271.88)
            .with(EntryKind::Income, "2025-02-05", 29.94);
        let allocation = allocate(&goals, &ledger, date("2025-03-10")).unwrap();
        assert_eq!(allocation.remaining[&1], 0.0);
        assert_close(allocation.remaining[&2], 1000.0 - 14.97);
        assert_eq!(allocation.remaining[&3], 1000.0);
        assert_eq!(allocation.segments[2].active_goal_count, 2);
    }

    #[test]
    fn test_cascade_across_several_completions() {
        let goals = vec![
            goal(1, "2025-01-01", 10.0),
            goal(2, "2025-01-01", 60.0),
            goal(3, "2025-01-01", 1000.0),
        ];
        let ledger = MemLedger::default().with(EntryKind::Income, "2025-01-02", 150.0);
        let progress = compute_progress(&goals, &ledger, date("2025-01-31")).unwrap();
        // 50 each, then goal 1's 40 over split 20/20, then goal 2's 10 over.
        assert_close(progress[&1], 0.0);
        assert_close(progress[&2], 0.0);
        assert_close(progress[&3], 1000.0 - 50.0 - 20.0 - 10.0);
    }

    #[test]
    fn test_single_goal_scenario_discards_surplus() {
        let goals = vec![goal(1, "2025-01-01", 200.0)];
        let ledger = MemLedger::default()
            .with(EntryKind::Income, "2025-01-01", 300.0)
            .with(EntryKind::Expenses, "2025-01-02", 50.0);
        let allocation = allocate(&goals, &ledger, date("2025-01-10")).unwrap();
        assert_close(allocation.remaining[&1], 0.0);
        assert_eq!(allocation.segments.len(), 1);
        assert_close(allocation.segments[0].net_profit, 250.0);
        assert_close(allocation.segments[0].unallocated, 50.0);
    }

    #[test]
    fn test_future_goals_untouched() {
        let goals = vec![goal(1, "2025-01-01", 500.0), goal(2, "2025-06-01", 80.0)];
        let ledger = MemLedger::default()
            .with(EntryKind::Income, "2025-01-05", 100.0)
            .with(EntryKind::Income, "2025-07-01", 100.0);
        let progress = compute_progress(&goals, &ledger, date("2025-03-01")).unwrap();
        assert_close(progress[&1], 400.0);
        assert_eq!(progress[&2], 80.0);
    }

    #[test]
    fn test_segments_split_at_start_dates() {
        let goals = vec![goal(1, "2025-01-01", 1000.0), goal(2, "2025-01-10", 1000.0)];
        let ledger = MemLedger::default()
            .with(EntryKind::Income, "2025-01-09", 100.0)
            .with(EntryKind::Income, "2025-01-10", 100.0);
        let allocation = allocate(&goals, &ledger, date("2025-01-20")).unwrap();
        assert_close(allocation.remaining[&1], 850.0);
        assert_close(allocation.remaining[&2], 950.0);
        let bounds: Vec<_> = allocation.segments.iter().map(|s| (s.start, s.end)).collect();
        assert_eq!(
            bounds,
            vec![
                (date("2025-01-01"), date("2025-01-09")),
                (date("2025-01-10"), date("2025-01-20")),
            ]
        );
        assert_eq!(allocation.segments[1].active_goal_count, 2);
    }

    #[test]
    fn test_segment_bounds_stop_at_today() {
        let goals = vec![
            goal(1, "2025-01-01", 1.0),
            goal(2, "2025-01-01", 1.0),
            goal(3, "2025-02-01", 1.0),
            goal(4, "2025-03-01", 1.0),
        ];
        assert_eq!(
            segment_bounds(&goals, date("2025-02-15")),
            vec![
                (date("2025-01-01"), date("2025-01-31")),
                (date("2025-02-01"), date("2025-02-15")),
            ]
        );
        assert!(segment_bounds(&goals, date("2024-12-31")).is_empty());
    }

    #[test]
    fn test_goal_starting_today_gets_a_segment() {
        let goals = vec![goal(1, "2025-01-01", 100.0), goal(2, "2025-02-01", 100.0)];
        let ledger = MemLedger::default().with(EntryKind::Income, "2025-02-01", 60.0);
        let progress = compute_progress(&goals, &ledger, date("2025-02-01")).unwrap();
        assert_close(progress[&1], 70.0);
        assert_close(progress[&2], 70.0);
    }

    #[test]
    fn test_losses_are_clamped() {
        let goals = vec![goal(1, "2025-01-01", 100.0), goal(2, "2025-02-01", 100.0)];
        let ledger = MemLedger::default()
            .with(EntryKind::Income, "2025-01-05", 40.0)
            .with(EntryKind::Expenses, "2025-02-05", 500.0);
        let progress = compute_progress(&goals, &ledger, date("2025-03-01")).unwrap();
        assert_close(progress[&1], 60.0);
        assert_close(progress[&2], 100.0);
    }

    #[test]
    fn test_profit_without_active_goals_is_not_carried() {
        let goals = vec![goal(1, "2025-01-01", 100.0), goal(2, "2025-02-01", 100.0)];
        let ledger = MemLedger::default()
            .with(EntryKind::Income, "2025-01-02", 120.0)
            .with(EntryKind::Income, "2025-01-20", 500.0);
        let allocation = allocate(&goals, &ledger, date("2025-03-01")).unwrap();
        assert_close(allocation.remaining[&1], 0.0);
        assert_close(allocation.remaining[&2], 100.0);
        assert_close(allocation.segments[0].unallocated, 520.0);
    }

    #[test]
    fn test_completed_goal_excluded_from_later_segments() {
        let goals = vec![goal(1, "2025-01-01", 50.0), goal(2, "2025-02-01", 100.0)];
        let ledger = MemLedger::default()
            .with(EntryKind::Income, "2025-01-02", 50.0)
            .with(EntryKind::Income, "2025-02-02", 60.0);
        let allocation = allocate(&goals, &ledger, date("2025-03-01")).unwrap();
        assert_eq!(allocation.segments[1].active_goal_count, 1);
        assert_close(allocation.remaining[&2], 40.0);
    }

    #[test]
    fn test_conservation_without_completion() {
        let goals = vec![
            goal(1, "2025-01-01", 1000.0),
            goal(2, "2025-01-01", 700.0),
            goal(3, "2025-01-01", 400.0),
        ];
        let ledger = MemLedger::default()
            .with(EntryKind::Income, "2025-01-03", 500.0)
            .with(EntryKind::Expenses, "2025-01-04", 200.0);
        let progress = compute_progress(&goals, &ledger, date("2025-01-31")).unwrap();
        let before: f64 = goals.iter().map(|g| g.target_amount).sum();
        let after: f64 = progress.values().sum();
        assert_close(before - after, 300.0);
    }

    #[test]
    fn test_zero_profit_is_idempotent() {
        let goals = vec![goal(1, "2025-01-01", 100.0), goal(2, "2025-01-01", 30.0)];
        let ledger = MemLedger::default()
            .with(EntryKind::Income, "2025-01-03", 75.0)
            .with(EntryKind::Expenses, "2025-01-04", 75.0);
        let first = compute_progress(&goals, &ledger, date("2025-01-31")).unwrap();
        let second = compute_progress(&goals, &ledger, date("2025-01-31")).unwrap();
        assert_eq!(first, second);
        assert_eq!(first[&1], 100.0);
        assert_eq!(first[&2], 30.0);
    }

    #[test]
    fn test_remaining_is_monotonic_and_bounded() {
        let goals = vec![
            goal(1, "2025-01-01", 120.0),
            goal(2, "2025-01-05", 90.0),
            goal(3, "2025-01-12", 400.0),
        ];
        let ledger = MemLedger::default()
            .with(EntryKind::Income, "2025-01-02", 40.0)
            .with(EntryKind::Expenses, "2025-01-06", 70.0)
            .with(EntryKind::Income, "2025-01-07", 130.0)
            .with(EntryKind::Income, "2025-01-13", 90.0)
            .with(EntryKind::Expenses, "2025-01-15", 300.0)
            .with(EntryKind::Income, "2025-01-18", 250.0);

        // Processed segments grow as each start date passes.
        let checkpoints = ["2025-01-04", "2025-01-11", "2025-01-20"];
        let mut previous: Option<ProgressMap> = None;
        for today in checkpoints {
            let progress = compute_progress(&goals, &ledger, date(today)).unwrap();
            for g in &goals {
                let r = progress[&g.id];
                assert!(r >= 0.0 && r <= g.target_amount, "goal {} out of bounds: {r}", g.id);
                if let Some(prev) = &previous {
                    assert!(r <= prev[&g.id] + 1e-9, "goal {} went up on {today}", g.id);
                }
            }
            previous = Some(progress);
        }
    }

    #[test]
    fn test_invalid_goal_rejected() {
        let goals = vec![goal(1, "2025-01-01", 100.0), goal(2, "2025-01-01", 0.0)];
        let err = compute_progress(&goals, &MemLedger::default(), date("2025-02-01")).unwrap_err();
        assert!(matches!(err, StashError::InvalidGoal { id: 2, .. }));
    }

    #[test]
    fn test_storage_failure_surfaces() {
        let goals = vec![goal(1, "2025-01-01", 100.0)];
        let err = compute_progress(&goals, &BrokenLedger, date("2025-02-01")).unwrap_err();
        assert!(matches!(err, StashError::StorageUnavailable(_)));
    }

    #[test]
    fn test_no_goals() {
        let progress = compute_progress(&[], &MemLedger::default(), date("2025-02-01")).unwrap();
        assert!(progress.is_empty());
    }

    #[test]
    fn test_against_sqlite_ledger() {
        use crate::db::test_db;
        use crate::ledger::Ledger;
        use crate::models::NewEntry;

        let (_dir, conn) = test_db();
        let ledger = Ledger::new(&conn);
        ledger
            .insert_entry(
                EntryKind::Income,
                NewEntry {
                    date: date("2025-01-01"),
                    amount: 250.0,
                    category: "Salary".into(),
                    description: "Pay".into(),
                },
            )
            .unwrap();
        let goals = vec![goal(1, "2025-01-01", 100.0), goal(2, "2025-01-01", 300.0)];
        let progress = compute_progress(&goals, &ledger, date("2025-01-10")).unwrap();
        assert_close(progress[&2], 150.0);
    }
}
