use rusqlite::{Connection, OptionalExtension, Row};
use tracing::info;

use crate::db::in_transaction;
use crate::error::{Result, StashError};
use crate::models::{Goal, NewGoal};

/// Store handle over the goals table.
pub struct Goals<'a> {
    conn: &'a Connection,
}

fn goal_from_row(row: &Row<'_>) -> rusqlite::Result<Goal> {
    Ok(Goal {
        id: row.get(0)?,
        start_date: row.get(1)?,
        target_amount: row.get(2)?,
        description: row.get(3)?,
    })
}

impl<'a> Goals<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Insert goals in one transaction, returning them with their identities.
    pub fn insert_goals(&self, goals: Vec<NewGoal>) -> Result<Vec<Goal>> {
        if let Some(bad) = goals.iter().find(|g| !g.target_amount.is_finite() || g.target_amount <= 0.0) {
            return Err(StashError::Validation(format!(
                "goal target must be greater than zero, got {}",
                bad.target_amount
            )));
        }
        let stored = in_transaction(self.conn, |conn| {
            let mut stmt = conn.prepare(
                "INSERT INTO goals (start_date, target_amount, description) VALUES (?1, ?2, ?3)",
            )?;
            let mut stored = Vec::with_capacity(goals.len());
            for goal in goals {
                let id = stmt.insert(rusqlite::params![goal.start_date, goal.target_amount, goal.description])?;
                stored.push(Goal::from_new(id, goal));
            }
            Ok(stored)
        })?;
        info!(count = stored.len(), "inserted goals");
        Ok(stored)
    }

    pub fn insert_goal(&self, goal: NewGoal) -> Result<Goal> {
        let mut stored = self.insert_goals(vec![goal])?;
        stored
            .pop()
            .ok_or_else(|| StashError::Validation("nothing was inserted".into()))
    }

    /// All goals, ordered by start date then identity.
    pub fn list_goals(&self) -> Result<Vec<Goal>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, start_date, target_amount, description FROM goals ORDER BY start_date, id")
            .map_err(StashError::unavailable)?;
        let rows = stmt
            .query_map([], goal_from_row)
            .map_err(StashError::unavailable)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StashError::unavailable)
    }

    pub fn get_goal(&self, id: i64) -> Result<Option<Goal>> {
        let goal = self
            .conn
            .query_row(
                "SELECT id, start_date, target_amount, description FROM goals WHERE id = ?1",
                [id],
                goal_from_row,
            )
            .optional()?;
        Ok(goal)
    }

    pub fn delete_goal(&self, id: i64) -> Result<Goal> {
        let goal = self
            .get_goal(id)?
            .ok_or(StashError::UnknownRecord { kind: "Goals", id })?;
        self.conn.execute("DELETE FROM goals WHERE id = ?1", [id])?;
        info!(id, "deleted goal");
        Ok(goal)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::db::test_db;

    fn goal(d: &str, target: f64, description: &str) -> NewGoal {
        NewGoal {
            start_date: NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap(),
            target_amount: target,
            description: description.to_string(),
        }
    }

    #[test]
    fn test_list_goals_ordered_by_start_date() {
        let (_dir, conn) = test_db();
        let goals = Goals::new(&conn);
        goals
            .insert_goals(vec![
                goal("2025-03-01", 100.0, "Bike"),
                goal("2025-01-01", 500.0, "Holiday"),
                goal("2025-03-01", 50.0, "Shoes"),
            ])
            .unwrap();
        let listed: Vec<String> = goals.list_goals().unwrap().into_iter().map(|g| g.description).collect();
        assert_eq!(listed, vec!["Holiday", "Bike", "Shoes"]);
    }

    #[test]
    fn test_ids_are_not_reused_after_delete() {
        let (_dir, conn) = test_db();
        let goals = Goals::new(&conn);
        let first = goals.insert_goal(goal("2025-01-01", 10.0, "a")).unwrap();
        goals.delete_goal(first.id).unwrap();
        let second = goals.insert_goal(goal("2025-01-01", 10.0, "b")).unwrap();
        assert!(second.id > first.id);
    }

    #[test]
    fn test_rejects_non_positive_target() {
        let (_dir, conn) = test_db();
        let goals = Goals::new(&conn);
        let err = goals
            .insert_goals(vec![goal("2025-01-01", 10.0, "ok"), goal("2025-01-01", 0.0, "zero")])
            .unwrap_err();
        assert!(matches!(err, StashError::Validation(_)));
        assert!(goals.list_goals().unwrap().is_empty());
    }

    #[test]
    fn test_delete_unknown_goal() {
        let (_dir, conn) = test_db();
        assert!(matches!(
            Goals::new(&conn).delete_goal(7),
            Err(StashError::UnknownRecord { id: 7, .. })
        ));
    }
}
