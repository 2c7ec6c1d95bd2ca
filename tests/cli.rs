use assert_cmd::Command;
use predicates::{prelude::PredicateBooleanExt, str::contains};
use tempfile::TempDir;

const BIN_NAME: &str = "walletbook";

fn walletbook(data_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin(BIN_NAME).expect("binary exists");
    cmd.env("WALLETBOOK_DATA_DIR", data_dir.path());
    cmd.env_remove("WALLETBOOK_LOG");
    cmd
}

fn run(data_dir: &TempDir, args: &[&str]) {
    walletbook(data_dir).args(args).assert().success();
}

#[test]
fn init_creates_data_files() {
    let dir = TempDir::new().unwrap();

    walletbook(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(contains("Initialization complete!"));

    assert!(dir.path().join("config.json").exists());
    assert!(dir.path().join("data").join("cards.json").exists());

    walletbook(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(contains("Already initialized"));
}

#[test]
fn card_spending_is_capped_by_the_monthly_limit() {
    let dir = TempDir::new().unwrap();
    run(&dir, &["card", "create", "Visa", "--limit", "500", "--rebate", "1.5"]);

    walletbook(&dir)
        .args(["card", "spend", "Visa", "Lunch", "300", "--date", "2024-03-05"])
        .assert()
        .success()
        .stdout(contains("Remaining limit for 2024-03: $200.00"));

    walletbook(&dir)
        .args(["card", "spend", "Visa", "TV", "250", "--date", "2024-03-06"])
        .assert()
        .failure()
        .stderr(contains("cannot exceed the remaining limit of $200.00"));

    walletbook(&dir)
        .args(["card", "remaining", "Visa", "--month", "2024-03"])
        .assert()
        .success()
        .stdout(contains("$200.00"));

    // Another month has its own limit
    run(&dir, &["card", "spend", "Visa", "TV", "250", "--date", "05/04/2024"]);
}

#[test]
fn expense_edit_and_delete_by_number() {
    let dir = TempDir::new().unwrap();
    run(&dir, &["card", "create", "Visa", "--limit", "500"]);
    run(&dir, &["card", "spend", "Visa", "Lunch", "100", "--date", "2024-03-05"]);
    run(&dir, &["card", "spend", "Visa", "Dinner", "40", "--date", "2024-03-06"]);

    walletbook(&dir)
        .args(["card", "edit-expense", "Visa", "2", "--amount", "150"])
        .assert()
        .success()
        .stdout(contains("Updated expenditure #2: Lunch $150.00"));

    walletbook(&dir)
        .args(["card", "remaining", "Visa", "--month", "2024-03"])
        .assert()
        .success()
        .stdout(contains("$310.00"));

    walletbook(&dir)
        .args(["card", "delete-expense", "Visa", "5"])
        .assert()
        .failure()
        .stderr(contains("Invalid transaction number 5"));

    run(&dir, &["card", "delete-expense", "Visa", "1"]);

    walletbook(&dir)
        .args(["card", "expenses", "Visa"])
        .assert()
        .success()
        .stdout(contains("Lunch").and(contains("Dinner").not()));
}

#[test]
fn bill_payment_moves_the_month_and_debits_the_bank() {
    let dir = TempDir::new().unwrap();
    run(&dir, &["card", "create", "Visa", "--limit", "500", "--rebate", "1.5"]);
    run(&dir, &["bank", "create", "DBS", "--balance", "1000"]);
    run(&dir, &["card", "spend", "Visa", "Groceries", "300", "--date", "2024-03-05"]);

    walletbook(&dir)
        .args(["card", "bill", "Visa", "--bank", "DBS", "--month", "2024-03"])
        .assert()
        .success()
        .stdout(contains("Paid Visa bill of $300.00 for 2024-03 from DBS."))
        .stdout(contains("Rebate of $4.50 credited to DBS."));

    walletbook(&dir)
        .args(["bank", "list"])
        .assert()
        .success()
        .stdout(contains("$704.50"));

    walletbook(&dir)
        .args(["card", "expenses", "Visa", "--paid"])
        .assert()
        .success()
        .stdout(contains("Groceries"));

    walletbook(&dir)
        .args(["card", "unbill", "Visa", "--bank", "DBS", "--month", "2024-03"])
        .assert()
        .success()
        .stdout(contains("Reversed Visa bill"));

    walletbook(&dir)
        .args(["bank", "list"])
        .assert()
        .success()
        .stdout(contains("$1000.00"));
}

#[test]
fn bill_payment_needs_enough_funds() {
    let dir = TempDir::new().unwrap();
    run(&dir, &["card", "create", "Visa", "--limit", "500"]);
    run(&dir, &["bank", "create", "DBS", "--balance", "10"]);
    run(&dir, &["card", "spend", "Visa", "Groceries", "300", "--date", "2024-03-05"]);

    walletbook(&dir)
        .args(["card", "bill", "Visa", "--bank", "DBS", "--month", "2024-03"])
        .assert()
        .failure()
        .stderr(contains("Insufficient funds in 'DBS'"));

    walletbook(&dir)
        .args(["card", "expenses", "Visa"])
        .assert()
        .success()
        .stdout(contains("Groceries"));
}

#[test]
fn bank_history_find_and_export() {
    let dir = TempDir::new().unwrap();
    run(&dir, &["bank", "create", "DBS", "--balance", "100"]);
    run(&dir, &["bank", "deposit", "DBS", "Salary", "2000", "--date", "2024-03-01", "--category", "Income"]);
    run(&dir, &["bank", "spend", "DBS", "Rent", "800", "--date", "2024-03-02", "--category", "Housing"]);

    walletbook(&dir)
        .args(["bank", "history", "DBS"])
        .assert()
        .success()
        .stdout(contains("balance $1300.00"))
        .stdout(contains("+$2000.00"));

    walletbook(&dir)
        .args(["bank", "find", "DBS", "--category", "hous"])
        .assert()
        .success()
        .stdout(contains("Rent").and(contains("Salary").not()));

    walletbook(&dir)
        .args(["bank", "spend", "DBS", "Car", "5000"])
        .assert()
        .failure()
        .stderr(contains("Insufficient funds"));

    let output = dir.path().join("dbs.csv");
    walletbook(&dir)
        .args(["bank", "export", "DBS"])
        .arg(&output)
        .assert()
        .success()
        .stdout(contains("Exported 2 transaction(s)"));

    let csv = std::fs::read_to_string(&output).unwrap();
    assert!(csv.starts_with("Index,Date,Description,Category,Kind,Amount"));
    assert!(csv.contains("1,2024-03-02,Rent,Housing,Expenditure,800.00"));
}

#[test]
fn goals_track_a_saving_account() {
    let dir = TempDir::new().unwrap();
    run(&dir, &["bank", "create", "DBS", "--balance", "400"]);

    walletbook(&dir)
        .args(["goal", "add", "Trip", "--target", "1000", "--in", "30", "--saving", "DBS"])
        .assert()
        .success()
        .stdout(contains("Added goal: Trip ($1000.00"));

    walletbook(&dir)
        .args(["goal", "list"])
        .assert()
        .success()
        .stdout(contains("$600.00 to go"));

    walletbook(&dir)
        .args(["bank", "delete", "DBS"])
        .assert()
        .failure()
        .stderr(contains("tracked by goal(s): Trip"));

    run(&dir, &["goal", "delete", "Trip"]);

    walletbook(&dir)
        .args(["goal", "delete", "Trip"])
        .assert()
        .failure()
        .stderr(contains("there are no goals set"));
}

#[test]
fn config_set_is_applied_and_audited() {
    let dir = TempDir::new().unwrap();

    walletbook(&dir)
        .args(["config", "set", "currency_symbol", "S$"])
        .assert()
        .success();
    run(&dir, &["bank", "create", "DBS", "--balance", "12.5"]);

    walletbook(&dir)
        .args(["bank", "list"])
        .assert()
        .success()
        .stdout(contains("S$12.50"));

    walletbook(&dir)
        .args(["config", "set", "ledger_capacity", "0"])
        .assert()
        .failure();

    walletbook(&dir)
        .args(["audit", "--count", "5"])
        .assert()
        .success()
        .stdout(contains("UPDATE Settings"))
        .stdout(contains("CREATE BankAccount"));
}

#[test]
fn unbill_refunds_every_payment_of_the_month() {
    let dir = TempDir::new().unwrap();
    run(&dir, &["card", "create", "Visa", "--limit", "500", "--rebate", "1.5"]);
    run(&dir, &["bank", "create", "DBS", "--balance", "1000"]);
    run(&dir, &["card", "spend", "Visa", "Groceries", "80", "--date", "2024-03-01"]);
    run(&dir, &["card", "bill", "Visa", "--bank", "DBS", "--month", "2024-03"]);
    run(&dir, &["card", "spend", "Visa", "Snacks", "20", "--date", "2024-03-02"]);
    run(&dir, &["card", "bill", "Visa", "--bank", "DBS", "--month", "2024-03"]);

    walletbook(&dir)
        .args(["bank", "list"])
        .assert()
        .success()
        .stdout(contains("$901.50"));

    run(&dir, &["card", "unbill", "Visa", "--bank", "DBS", "--month", "2024-03"]);

    walletbook(&dir)
        .args(["bank", "list"])
        .assert()
        .success()
        .stdout(contains("$1000.00"));

    walletbook(&dir)
        .args(["card", "expenses", "Visa"])
        .assert()
        .success()
        .stdout(contains("Groceries").and(contains("Snacks")));
}

#[test]
fn recurring_expenditures_are_posted_until_funds_run_out() {
    let dir = TempDir::new().unwrap();
    run(&dir, &["bank", "create", "DBS", "--balance", "100"]);

    walletbook(&dir)
        .args(["bank", "recurring", "add", "DBS", "Netflix", "15", "--category", "Fun", "--start", "2024-01-05"])
        .assert()
        .success()
        .stdout(contains("Added recurring expenditure: Netflix $15.00 monthly from 2024-01-05"));

    // January to June fit in the balance; July waits for money
    walletbook(&dir)
        .args(["bank", "list"])
        .assert()
        .success()
        .stdout(contains("$10.00"));

    walletbook(&dir)
        .args(["bank", "recurring", "list", "DBS"])
        .assert()
        .success()
        .stdout(contains("Netflix").and(contains("2024-07-05")));

    walletbook(&dir)
        .args(["bank", "history", "DBS", "-n", "0"])
        .assert()
        .success()
        .stdout(contains("2024-06-05"));

    walletbook(&dir)
        .args(["bank", "recurring", "delete", "DBS", "2"])
        .assert()
        .failure()
        .stderr(contains("Invalid transaction number 2"));

    run(&dir, &["bank", "recurring", "delete", "DBS", "1"]);

    walletbook(&dir)
        .args(["bank", "recurring", "list", "DBS"])
        .assert()
        .success()
        .stdout(contains("No recurring expenditures on DBS."));
}
