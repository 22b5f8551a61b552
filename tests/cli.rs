use assert_cmd::Command;
use predicates::prelude::*;
use std::error::Error;
use tempfile::TempDir;

fn stash(home: &TempDir) -> Result<Command, Box<dyn Error>> {
    let mut cmd = Command::cargo_bin("stash")?;
    cmd.env("HOME", home.path())
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    Ok(cmd)
}

fn initialized() -> Result<TempDir, Box<dyn Error>> {
    let home = TempDir::new()?;
    let data_dir = home.path().join("data");
    stash(&home)?
        .args(["init", "--data-dir"])
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized stash"));
    Ok(home)
}

#[test]
fn init_creates_database_and_status_reports_it() -> Result<(), Box<dyn Error>> {
    let home = initialized()?;
    assert!(home.path().join("data").join("stash.db").exists());
    stash(&home)?
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Income:    0").and(predicate::str::contains("Goals:     0")));
    Ok(())
}

#[test]
fn goal_is_completed_by_profit() -> Result<(), Box<dyn Error>> {
    let home = initialized()?;
    stash(&home)?
        .args(["goals", "add", "200", "--description", "Bike", "--date", "2025-01-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added goal 1"));
    stash(&home)?
        .args(["income", "add", "300", "--category", "salary", "--date", "2025-01-02"])
        .assert()
        .success();
    stash(&home)?
        .args(["expenses", "add", "50", "--category", "food", "--date", "2025-01-03"])
        .assert()
        .success();

    stash(&home)?
        .args(["goals", "progress", "--as-of", "2025-01-31", "--breakdown"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("completed")
                .and(predicate::str::contains("£0.00"))
                .and(predicate::str::contains("Segments")),
        );
    Ok(())
}

#[test]
fn future_goal_is_not_started() -> Result<(), Box<dyn Error>> {
    let home = initialized()?;
    stash(&home)?
        .args(["goals", "add", "100", "--date", "2025-06-01"])
        .assert()
        .success();
    stash(&home)?
        .args(["income", "add", "500", "--date", "2025-07-01"])
        .assert()
        .success();
    stash(&home)?
        .args(["goals", "progress", "--as-of", "2025-05-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("starts 2025-06-01"));
    Ok(())
}

#[test]
fn list_filters_by_category_with_budget_verdict() -> Result<(), Box<dyn Error>> {
    let home = initialized()?;
    stash(&home)?.args(["budget", "set", "food", "70"]).assert().success();
    stash(&home)?
        .args(["expenses", "add", "60", "--category", "Food", "--date", "2025-01-03"])
        .assert()
        .success();
    stash(&home)?
        .args(["expenses", "add", "9.99", "--category", "Rent", "--date", "2025-01-03"])
        .assert()
        .success();

    stash(&home)?
        .args(["expenses", "list", "--from", "2025-01-01", "--days", "7", "--category", "food"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Total expenses: £60.00")
                .and(predicate::str::contains("Under budget"))
                .and(predicate::str::contains("Rent").not()),
        );

    stash(&home)?
        .args(["budget", "check", "Food", "--from", "2025-01-01", "--days", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Over budget"));
    Ok(())
}

#[test]
fn import_skips_repeated_file() -> Result<(), Box<dyn Error>> {
    let home = initialized()?;
    let file = home.path().join("sample.csv");
    std::fs::write(
        &file,
        "2025-01-01,1500.00,Salary,January pay,Income\n\
         2025-01-03,45.20,Groceries,Weekly shop,Expenses\n\
         Groceries,60,Budget\n\
         2025-01-01,500,Holiday fund,Goals\n",
    )?;

    stash(&home)?
        .arg("import")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 income, 1 expenses, 1 budgets, 1 goals imported"));
    stash(&home)?
        .arg("import")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("already been imported"));
    Ok(())
}

#[test]
fn unknown_record_and_bad_input_fail() -> Result<(), Box<dyn Error>> {
    let home = initialized()?;
    stash(&home)?
        .args(["expenses", "delete", "99"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No Expenses record with I.D. 99"));
    stash(&home)?
        .args(["income", "add", "12.345"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("at most two decimal places"));
    stash(&home)?
        .args(["expenses", "list", "--days", "31"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("between 1 and 30"));
    stash(&home)?
        .args(["goals", "add", "0"])
        .assert()
        .failure();
    Ok(())
}

#[test]
fn rename_and_delete_category() -> Result<(), Box<dyn Error>> {
    let home = initialized()?;
    stash(&home)?
        .args(["expenses", "add", "5", "--category", "snacks", "--date", "2025-01-01"])
        .assert()
        .success();
    stash(&home)?
        .args(["expenses", "rename-category", "snacks", "treats"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Renamed Snacks to Treats (1 records)"));
    stash(&home)?
        .args(["expenses", "delete-category", "treats"])
        .assert()
        .success();
    stash(&home)?
        .args(["expenses", "categories"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Misc").and(predicate::str::contains("Treats").not()));
    Ok(())
}
