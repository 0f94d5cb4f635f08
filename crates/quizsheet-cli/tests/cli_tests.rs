//! CLI integration tests using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const SAMPLE: &str = "../../sheets/sample.toml";

fn quizsheet() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("quizsheet").unwrap()
}

#[test]
fn validate_sample_sheet() {
    quizsheet()
        .arg("validate")
        .arg("--sheet")
        .arg(SAMPLE)
        .assert()
        .success()
        .stdout(predicate::str::contains("3 questions"))
        .stdout(predicate::str::contains("All sheets valid"));
}

#[test]
fn validate_directory() {
    quizsheet()
        .arg("validate")
        .arg("--sheet")
        .arg("../../sheets")
        .assert()
        .success()
        .stdout(predicate::str::contains("Sheet: Question Options"));
}

#[test]
fn validate_reports_warnings() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(
        &path,
        r#"
[[questions]]
options = [
  { id = "A", text = "costs $5" },
  { id = "A", text = "fine" },
]
"#,
    )
    .unwrap();

    quizsheet()
        .arg("validate")
        .arg("--sheet")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("[Q1 A] WARNING: unclosed math delimiter"))
        .stdout(predicate::str::contains("duplicate option id"))
        .stdout(predicate::str::contains("2 warning(s) found"));
}

#[test]
fn validate_uses_configured_delimiters() {
    let dir = TempDir::new().unwrap();
    let sheet = dir.path().join("sheet.toml");
    std::fs::write(
        &sheet,
        r#"
[[questions]]
options = [
  { id = "A", text = "costs $5" },
  { id = "B", text = "\\(x" },
]
"#,
    )
    .unwrap();
    let config = dir.path().join("quizsheet.toml");
    std::fs::write(
        &config,
        r#"
[typeset]
inline_math = [["\\(", "\\)"]]
display_math = []
"#,
    )
    .unwrap();

    quizsheet()
        .arg("validate")
        .arg("--sheet")
        .arg(&sheet)
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("[Q1 B] WARNING: unclosed math delimiter"))
        .stdout(predicate::str::contains("[Q1 A]").not())
        .stdout(predicate::str::contains("1 warning(s) found"));
}

#[test]
fn validate_nonexistent_file() {
    quizsheet()
        .arg("validate")
        .arg("--sheet")
        .arg("nonexistent.toml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn render_text_page() {
    quizsheet()
        .arg("render")
        .arg("--sheet")
        .arg(SAMPLE)
        .assert()
        .success()
        .stdout(predicate::str::contains("Answer Space"))
        .stdout(predicate::str::contains("Question 3"))
        .stdout(predicate::str::contains("A. n ∝ u²    B. n ∝ u"));
}

#[test]
fn render_html_to_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out").join("sheet.html");

    quizsheet()
        .arg("render")
        .arg("--sheet")
        .arg(SAMPLE)
        .arg("--format")
        .arg("html")
        .arg("--output")
        .arg(&path)
        .assert()
        .success();

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("data-option-id=\"D\""));
    assert!(content.contains("mode-stacked"));
    assert!(content.contains("$n \\propto {u^2}$"));
    assert!(content.contains("window.QUIZSHEET_LAYOUT"));
    assert!(content.contains("addEventListener('resize', relayout)"));
}

#[test]
fn render_rejects_unknown_format() {
    quizsheet()
        .arg("render")
        .arg("--sheet")
        .arg(SAMPLE)
        .arg("--format")
        .arg("pdf")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown format"));
}

#[test]
fn layout_table_walks_widths() {
    quizsheet()
        .arg("layout")
        .arg("--sheet")
        .arg(SAMPLE)
        .arg("--widths")
        .arg("80,60,40")
        .assert()
        .success()
        .stdout(predicate::str::contains("@80"))
        .stdout(predicate::str::contains("@40"))
        .stdout(predicate::str::contains("48"))
        .stdout(predicate::str::contains("72"))
        .stdout(predicate::str::contains("stacked"));
}

#[test]
fn layout_rejects_bad_widths() {
    quizsheet()
        .arg("layout")
        .arg("--sheet")
        .arg(SAMPLE)
        .arg("--widths")
        .arg("80,wide")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid width"));
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    quizsheet()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created quizsheet.toml"))
        .stdout(predicate::str::contains("Created sheets/example.toml"));

    assert!(dir.path().join("quizsheet.toml").exists());
    assert!(dir.path().join("sheets/example.toml").exists());

    // The starter files work with the other commands.
    quizsheet()
        .current_dir(dir.path())
        .arg("render")
        .arg("--sheet")
        .arg("sheets/example.toml")
        .assert()
        .success()
        .stdout(predicate::str::contains("Question 2"));
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();

    quizsheet()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success();

    quizsheet()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn help_output() {
    quizsheet()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("adaptive option layout"));
}

#[test]
fn version_output() {
    quizsheet()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("quizsheet"));
}
