use chrono::NaiveDate;

use crate::error::Result;
use crate::ledger::{calculate_total, LedgerQuery};
use crate::models::EntryKind;

/// Income minus expenses over the inclusive range `[start, end]`.
pub fn period_profit<L: LedgerQuery + ?Sized>(ledger: &L, start: NaiveDate, end: NaiveDate) -> Result<f64> {
    EntryKind::ALL.iter().try_fold(0.0, |acc, kind| -> Result<f64> {
        let entries = ledger.query_range(*kind, start, end, None)?;
        Ok(acc + kind.sign() * calculate_total(&entries))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_db;
    use crate::ledger::Ledger;
    use crate::models::NewEntry;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn add(ledger: &Ledger<'_>, kind: EntryKind, d: &str, amount: f64) {
        ledger
            .insert_entry(
                kind,
                NewEntry {
                    date: date(d),
                    amount,
                    category: "Misc".into(),
                    description: String::new(),
                },
            )
            .unwrap();
    }

    #[test]
    fn test_empty_range_is_zero() {
        let (_dir, conn) = test_db();
        let ledger = Ledger::new(&conn);
        assert_eq!(period_profit(&ledger, date("2025-01-01"), date("2025-01-31")).unwrap(), 0.0);
    }

    #[test]
    fn test_income_minus_expenses_inclusive() {
        let (_dir, conn) = test_db();
        let ledger = Ledger::new(&conn);
        add(&ledger, EntryKind::Income, "2025-01-01", 300.0);
        add(&ledger, EntryKind::Expenses, "2025-01-02", 50.0);
        add(&ledger, EntryKind::Expenses, "2025-01-10", 25.0);
        add(&ledger, EntryKind::Income, "2025-01-11", 1000.0);
        assert_eq!(period_profit(&ledger, date("2025-01-01"), date("2025-01-10")).unwrap(), 225.0);
        assert_eq!(period_profit(&ledger, date("2025-01-02"), date("2025-01-02")).unwrap(), -50.0);
    }
}
