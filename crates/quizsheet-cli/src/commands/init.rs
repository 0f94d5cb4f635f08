//! The `quizsheet init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create quizsheet.toml
    if std::path::Path::new("quizsheet.toml").exists() {
        println!("quizsheet.toml already exists, skipping.");
    } else {
        std::fs::write("quizsheet.toml", SAMPLE_CONFIG)?;
        println!("Created quizsheet.toml");
    }

    // Create example sheet
    std::fs::create_dir_all("sheets")?;
    let example_path = std::path::Path::new("sheets/example.toml");
    if example_path.exists() {
        println!("sheets/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_SHEET)?;
        println!("Created sheets/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Run: quizsheet validate --sheet sheets/example.toml");
    println!("  2. Run: quizsheet layout --sheet sheets/example.toml --widths 80,60,40");
    println!("  3. Run: quizsheet render --sheet sheets/example.toml --format html --output sheet.html");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# quizsheet configuration

page_width = 96
pane_ratio = [2, 1]
pane_gutter = 3
option_gap = 4
label_gap = 1

# Typeset marker probing
poll_interval_ms = 100
max_poll_attempts = 10

[typeset]
packages = ["html"]
inline_math = [["$", "$"]]
display_math = [["$$", "$$"]]
show_processing_messages = false
show_math_menu = false
automatic_linebreaks = true
"#;

const EXAMPLE_SHEET: &str = r#"[sheet]
title = "Question Options"

[[questions]]
options = [
  { id = "A", text = "$n \\propto {u^2}$" },
  { id = "B", text = "$n \\propto u$" },
  { id = "C", text = "$n \\propto \\sqrt u $" },
  { id = "D", text = "$n \\propto \\cfrac{1}{u}$" },
]

[[questions]]
options = [
  { id = "A", text = "30 m towards West" },
  { id = "B", text = "10 m towards East" },
  { id = "C", text = "10 m towards West" },
  { id = "D", text = "30 m towards East" },
]
"#;
