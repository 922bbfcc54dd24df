use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::{prelude::PredicateBooleanExt, str::contains};
use tempfile::TempDir;

const BIN_NAME: &str = "carnet";

struct Sandbox {
    home: TempDir,
}

impl Sandbox {
    /// Fresh HOME with `carnet init` already run against `<home>/data`.
    fn new() -> Self {
        let sandbox = Self {
            home: tempfile::tempdir().expect("tempdir"),
        };
        sandbox
            .cmd()
            .args(["init", "--data-dir"])
            .arg(sandbox.data_dir())
            .assert()
            .success()
            .stdout(contains("Initialized carnet"));
        sandbox
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin(BIN_NAME).expect("binary exists");
        cmd.env("HOME", self.home.path()).env("NO_COLOR", "1");
        cmd
    }

    fn data_dir(&self) -> PathBuf {
        self.home.path().join("data")
    }

    fn live(&self) -> PathBuf {
        self.data_dir().join("Expenses").join("expenses_working.csv")
    }

    fn write_live(&self, body: &str) {
        std::fs::write(
            self.live(),
            format!("Date,Compte,Categorie,Description,Montant\n{body}"),
        )
        .expect("write live file");
    }
}

fn read(path: &Path) -> String {
    std::fs::read_to_string(path).expect("readable file")
}

#[test]
fn init_creates_layout_and_settings() {
    let sb = Sandbox::new();
    assert_eq!(read(&sb.live()), "Date,Compte,Categorie,Description,Montant\n");
    assert!(sb.data_dir().join("History").is_dir());
    assert!(sb.data_dir().join("Summary").is_dir());
    assert!(sb.data_dir().join("budget").join("initial_budget.json").is_file());
    assert!(sb.home.path().join(".config/carnet/settings.json").is_file());
}

#[test]
fn add_then_recent() {
    let sb = Sandbox::new();
    sb.cmd()
        .args(["add", "12,5", "--date", "03/02/2024", "--account", "Luc"])
        .args(["--category", "Courses", "--description", "pain, lait"])
        .assert()
        .success()
        .stdout(contains("Expense added."));

    assert_eq!(
        read(&sb.live()),
        "Date,Compte,Categorie,Description,Montant\n03/02/2024,Luc,Courses,pain lait,12.50\n"
    );

    sb.cmd()
        .arg("recent")
        .assert()
        .success()
        .stdout(contains("03/02/2024").and(contains("€12.50")));
}

#[test]
fn add_rejects_invalid_amount() {
    let sb = Sandbox::new();
    sb.cmd()
        .args(["add", "douze"])
        .assert()
        .failure()
        .code(1)
        .stderr(contains("Error:").and(contains("Invalid amount")));
}

#[test]
fn malformed_rows_are_skipped_with_warning() {
    let sb = Sandbox::new();
    sb.write_live(
        "01/01/2024,Commun,Courses,a,50.00\n\
         not-a-date,Commun,Courses\n\
         01/02/2024,Commun,Courses,b,30.00\n",
    );
    sb.cmd()
        .args(["report", "monthly"])
        .assert()
        .success()
        .stdout(
            contains("Monthly summary - 2024-01 to 2024-02")
                .and(contains("€80.00"))
                .and(contains("100.0%")),
        )
        .stderr(contains("skipped 1 malformed row"));
}

#[test]
fn budget_report_resolves_account_number() {
    let sb = Sandbox::new();
    sb.write_live(
        "05/03/2024,Luc,Transport,bus,20.00
         06/03/2024,Commun,Courses,marché,50.00
",
    );
    sb.cmd()
        .args(["report", "budget", "--account", "2", "--month", "2024-03"])
        .assert()
        .success()
        .stdout(contains("Budget (Luc, 2024-03)").and(contains("€20.00")).and(contains("€50.00").not()));
}

#[test]
fn trends_with_huge_window_does_not_crash() {
    let sb = Sandbox::new();
    sb.write_live("05/03/2024,Commun,Courses,a,12.00\n");
    sb.cmd()
        .args(["report", "trends", "--months", "4000000"])
        .assert()
        .success()
        .stdout(contains("€12.00"));
}

#[test]
fn summary_json_keeps_accents() {
    let sb = Sandbox::new();
    sb.write_live("05/03/2024,Commun,Santé,pharmacie,12.00\n");
    sb.cmd()
        .args(["summary", "json", "--month", "2024-03"])
        .assert()
        .success()
        .stdout(contains("Summary saved to"));

    let json = read(&sb.data_dir().join("Summary").join("summary_all_2024-03.json"));
    assert!(json.contains("\"Santé\""));
    assert!(json.contains("12.0"));
}

#[test]
fn archive_twice_never_overwrites() {
    let sb = Sandbox::new();
    sb.write_live("01/01/2024,Commun,Courses,a,50.00\n");
    sb.cmd().arg("archive").assert().success().stdout(contains("Month archived"));
    assert_eq!(read(&sb.live()), "Date,Compte,Categorie,Description,Montant\n");

    sb.cmd()
        .arg("archive")
        .assert()
        .success()
        .stdout(contains("No expenses to archive."));

    sb.write_live("02/01/2024,Luc,Transport,b,20.00\n");
    sb.cmd().arg("archive").assert().success();
    let archives: Vec<_> = std::fs::read_dir(sb.data_dir().join("History"))
        .expect("history dir")
        .collect();
    assert_eq!(archives.len(), 2);
}

#[test]
fn archiving_a_repeated_expense_keeps_both() {
    let sb = Sandbox::new();
    for _ in 0..2 {
        sb.write_live("01/03/2024,Commun,Courses,loyer,900.00\n");
        sb.cmd().arg("archive").assert().success().stdout(contains("Month archived"));
    }
    sb.cmd()
        .args(["report", "categories"])
        .assert()
        .success()
        .stdout(contains("€1,800.00"));
}

#[test]
fn import_legacy_file() {
    let sb = Sandbox::new();
    let legacy = sb.home.path().join("old.csv");
    std::fs::write(
        &legacy,
        "Date,Account,Category,Amount\n01/01/2023,Luc,Courses,10.00\n02/01/2023,Paul,Jeux,5.00\n",
    )
    .expect("write legacy file");

    sb.cmd()
        .arg("import")
        .arg(&legacy)
        .assert()
        .success()
        .stdout(contains("2 imported"));

    let live = read(&sb.live());
    assert!(live.contains("01/01/2023,Luc,Courses,,10.00"));
    assert!(live.contains("02/01/2023,Commun,Autre,,5.00"));
}

#[test]
fn unknown_header_is_an_error() {
    let sb = Sandbox::new();
    std::fs::write(sb.live(), "foo,bar\n1,2\n").expect("write live file");
    sb.cmd()
        .arg("recent")
        .assert()
        .failure()
        .stderr(contains("Unrecognized header"));
}

#[test]
fn shell_script_adds_expense_and_exits() {
    let sb = Sandbox::new();
    sb.cmd()
        .write_stdin("1\n04/03/2024\n1\n5\ncourses\n42\n2\n11\n")
        .assert()
        .success()
        .stdout(contains("Expense added.").and(contains("€42.00")).and(contains("Goodbye!")));

    assert!(read(&sb.live()).ends_with("04/03/2024,Commun,Courses,courses,42.00\n"));
}

#[test]
fn shell_end_of_input_says_goodbye() {
    let sb = Sandbox::new();
    sb.cmd()
        .write_stdin("")
        .assert()
        .success()
        .stdout(contains("Goodbye!"));
}

#[test]
fn status_reports_counts() {
    let sb = Sandbox::new();
    sb.write_live("01/01/2024,Commun,Courses,a,50.00\n");
    sb.cmd()
        .arg("status")
        .assert()
        .success()
        .stdout(contains("Live records:    1").and(contains("Archives:        0")));
}
