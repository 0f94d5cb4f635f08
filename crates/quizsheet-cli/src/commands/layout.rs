//! The `quizsheet layout` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use quizsheet_core::adaptive::{LayoutState, Viewport};
use quizsheet_core::config::load_config_from;
use quizsheet_core::parser;

pub async fn execute(
    sheet_path: PathBuf,
    widths_str: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let widths: Vec<f32> = widths_str
        .split(',')
        .map(|s| {
            s.trim()
                .parse::<f32>()
                .map_err(|_| anyhow::anyhow!("invalid width: '{}'", s.trim()))
        })
        .collect::<Result<Vec<_>>>()?;
    anyhow::ensure!(!widths.is_empty(), "at least one width is required");
    anyhow::ensure!(
        widths.iter().all(|w| w.is_finite() && *w > 0.0),
        "widths must be positive"
    );

    let config = load_config_from(config_path.as_deref())?;
    let sheet = parser::parse_sheet(&sheet_path)?;

    // One mount per question, resized through every width.
    let viewport = Viewport::new(widths[0]);
    let mut mounted = super::sheet_layout(&config).mount(&sheet, &viewport);
    let mut columns = vec![mounted.settled().await];
    for &width in &widths[1..] {
        columns.push(mounted.resize(width).await);
    }
    mounted.unmount();

    let mut table = Table::new();
    let mut header = vec![
        "Question".to_string(),
        "Options".to_string(),
        "Single".to_string(),
        "Widest pair".to_string(),
    ];
    header.extend(widths.iter().map(|w| format!("@{w}")));
    table.set_header(header);

    for (index, question) in sheet.questions.iter().enumerate() {
        let measurement = columns
            .iter()
            .find_map(|states| states.get(index).and_then(LayoutState::measurement));
        let (single, double) = match measurement {
            Some(m) => (
                format!("{:.0}", m.single_line_width),
                format!("{:.0}", m.max_double_width),
            ),
            None => ("-".to_string(), "-".to_string()),
        };

        let mut row = vec![
            Cell::new(index + 1),
            Cell::new(question.options.len()),
            Cell::new(single),
            Cell::new(double),
        ];
        for states in &columns {
            let cell = match states.get(index) {
                Some(state @ LayoutState::Settled { .. }) => state.displayed_mode().to_string(),
                Some(state) => format!("{} (unmeasured)", state.displayed_mode()),
                None => "-".to_string(),
            };
            row.push(Cell::new(cell));
        }
        table.add_row(row);
    }

    println!("{}", sheet.title);
    println!("{table}");

    Ok(())
}
