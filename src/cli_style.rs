/*!
 * QueryDesk terminal style system
 *
 * Themed text, status lines and tables for the search and admin panels.
 */

use comfy_table::{presets, Attribute, Cell, Color, ContentArrangement, Table};
use console::{style, StyledObject};
use querydesk_core_audit::{LookupRecord, QueryEvent};

// ============================================================================
// THEME COLORS
// ============================================================================

/// Brand colors for consistent styling
pub struct Theme;

impl Theme {
    /// Primary accent color (cyan)
    pub fn primary<D: std::fmt::Display>(text: D) -> StyledObject<D> {
        style(text).cyan()
    }

    pub fn success<D: std::fmt::Display>(text: D) -> StyledObject<D> {
        style(text).green()
    }

    pub fn warning<D: std::fmt::Display>(text: D) -> StyledObject<D> {
        style(text).yellow()
    }

    pub fn error<D: std::fmt::Display>(text: D) -> StyledObject<D> {
        style(text).red()
    }

    pub fn muted<D: std::fmt::Display>(text: D) -> StyledObject<D> {
        style(text).dim()
    }

    /// Header style (bold cyan)
    pub fn header<D: std::fmt::Display>(text: D) -> StyledObject<D> {
        style(text).cyan().bold()
    }

    /// Admin mode accent (bold red)
    pub fn admin<D: std::fmt::Display>(text: D) -> StyledObject<D> {
        style(text).red().bold()
    }
}

// ============================================================================
// ICONS
// ============================================================================

/// Unicode icons for visual feedback
pub struct Icons;

impl Icons {
    pub const SUCCESS: &'static str = "✓";
    pub const ERROR: &'static str = "✗";
    pub const WARNING: &'static str = "⚠";
    pub const INFO: &'static str = "ℹ";
    pub const LOCK: &'static str = "🔒";
    pub const SEARCH: &'static str = "🔍";
    pub const SHIELD: &'static str = "🛡";
}

// ============================================================================
// BOX DRAWING
// ============================================================================

/// Draw a styled header box
pub fn header_box(title: &str, subtitle: Option<&str>) {
    let width: usize = 56;
    println!("{}", Theme::primary(format!("╔{}╗", "═".repeat(width))));

    let title_len = title.chars().count().min(width);
    let padding = (width - title_len) / 2;
    println!(
        "{}{}{}{}{}",
        Theme::primary("║"),
        " ".repeat(padding),
        Theme::header(title),
        " ".repeat(width - padding - title_len),
        Theme::primary("║")
    );

    if let Some(sub) = subtitle {
        let sub_len = sub.chars().count().min(width);
        let sub_padding = (width - sub_len) / 2;
        println!(
            "{}{}{}{}{}",
            Theme::primary("║"),
            " ".repeat(sub_padding),
            Theme::muted(sub),
            " ".repeat(width - sub_padding - sub_len),
            Theme::primary("║")
        );
    }

    println!("{}", Theme::primary(format!("╚{}╝", "═".repeat(width))));
}

/// Draw a section header with a line
pub fn section_header(title: &str) {
    let line_len = 50 - title.chars().count().min(40);
    println!(
        "\n{} {}",
        Theme::header(title),
        Theme::muted("─".repeat(line_len))
    );
}

// ============================================================================
// STATUS MESSAGES
// ============================================================================

pub fn print_success(msg: &str) {
    println!("{} {}", Theme::success(Icons::SUCCESS), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", Theme::error(Icons::ERROR), Theme::error(msg));
}

pub fn print_warning(msg: &str) {
    println!("{} {}", Theme::warning(Icons::WARNING), Theme::warning(msg));
}

pub fn print_info(msg: &str) {
    println!("{} {}", Theme::primary(Icons::INFO), msg);
}

// ============================================================================
// TABLES
// ============================================================================

fn base_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Lookup results, one row per record
pub fn results_table(records: &[LookupRecord]) -> Table {
    let mut table = base_table();
    table.set_header(vec![
        Cell::new("#").add_attribute(Attribute::Bold),
        Cell::new("Name").add_attribute(Attribute::Bold),
        Cell::new("Mobile").add_attribute(Attribute::Bold),
        Cell::new("CNIC").add_attribute(Attribute::Bold),
        Cell::new("Address").add_attribute(Attribute::Bold),
        Cell::new("Tbl/Row").add_attribute(Attribute::Bold),
    ]);

    for (index, record) in records.iter().enumerate() {
        let address = if record.address.trim().is_empty() {
            "N/A"
        } else {
            record.address.as_str()
        };
        table.add_row(vec![
            Cell::new(index + 1),
            Cell::new(&record.name).fg(Color::Cyan),
            Cell::new(&record.mobile),
            Cell::new(&record.cnic),
            Cell::new(address),
            Cell::new(format!("{}/{}", record.table_index, record.row_index)).fg(Color::DarkGrey),
        ]);
    }

    table
}

/// Audit log overview, newest first
pub fn audit_table(events: &[QueryEvent]) -> Table {
    let mut table = base_table();
    table.set_header(vec![
        Cell::new("#").add_attribute(Attribute::Bold),
        Cell::new("Time").add_attribute(Attribute::Bold),
        Cell::new("Query").add_attribute(Attribute::Bold),
        Cell::new("Status").add_attribute(Attribute::Bold),
        Cell::new("Results").add_attribute(Attribute::Bold),
    ]);

    for (index, event) in events.iter().enumerate() {
        let status = if event.success {
            Cell::new("200 OK").fg(Color::Green)
        } else {
            Cell::new("ERR").fg(Color::Red)
        };
        table.add_row(vec![
            Cell::new(index + 1),
            Cell::new(
                event
                    .timestamp
                    .with_timezone(&chrono::Local)
                    .format("%Y-%m-%d %H:%M:%S"),
            ),
            Cell::new(&event.query),
            status,
            Cell::new(event.results_count),
        ]);
    }

    table
}

/// One-line label for an audit entry in selection menus
pub fn audit_entry_label(event: &QueryEvent, expanded: bool) -> String {
    format!(
        "{} {}  {}  {}",
        if expanded { "▾" } else { "▸" },
        event
            .timestamp
            .with_timezone(&chrono::Local)
            .format("%H:%M:%S"),
        event.query,
        if event.success { "SUCCESS" } else { "FAILED" }
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_results_table_renders_rows() {
        let records = vec![LookupRecord {
            mobile: "923001234567".into(),
            name: "Test Subject".into(),
            cnic: "3440112345670".into(),
            address: String::new(),
            table_index: 2,
            row_index: 9,
        }];
        let rendered = results_table(&records).to_string();
        assert!(rendered.contains("Test Subject"));
        assert!(rendered.contains("N/A"));
        assert!(rendered.contains("2/9"));
    }

    #[test]
    fn test_audit_table_marks_status() {
        let events = vec![
            QueryEvent::new("ok-query", true, 3, "[]".into()),
            QueryEvent::from_failure("bad-query", "boom"),
        ];
        let rendered = audit_table(&events).to_string();
        assert!(rendered.contains("ok-query"));
        assert!(rendered.contains("200 OK"));
        assert!(rendered.contains("ERR"));
    }

    #[test]
    fn test_audit_entry_label() {
        let event = QueryEvent::from_failure("923001234567", "boom");
        let label = audit_entry_label(&event, true);
        assert!(label.starts_with('▾'));
        assert!(label.contains("923001234567"));
        assert!(label.contains("FAILED"));
    }
}
