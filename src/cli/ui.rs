use crate::core::pacing::PaceStatus;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    TotalLabel,
    Good,
    Caution,
    Error,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::TotalLabel => style(text).bold(),
        StyleType::Good => style(text).green().bold(),
        StyleType::Caution => style(text).yellow().bold(),
        StyleType::Error => style(text).red(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
}

/// Creates a new `comfy_table::Table` with standard styling.
pub fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Creates a styled header cell for a table.
pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

/// Right-aligned cell for a numeric value.
pub fn value_cell(text: impl Into<String>) -> Cell {
    Cell::new(text.into()).set_alignment(CellAlignment::Right)
}

/// Right-aligned, bold, colored cell.
pub fn colored_value_cell(text: impl Into<String>, color: Color) -> Cell {
    value_cell(text).fg(color).add_attribute(Attribute::Bold)
}

/// Placeholder shown for metrics that are not meaningful yet.
pub fn empty_cell() -> Cell {
    Cell::new("—")
        .fg(Color::DarkGrey)
        .set_alignment(CellAlignment::Right)
}

pub fn status_color(status: PaceStatus) -> Color {
    match status {
        PaceStatus::Green => Color::Green,
        PaceStatus::Yellow => Color::Yellow,
        PaceStatus::Red => Color::Red,
    }
}

/// Cell rendering a pacing status as a colored badge.
pub fn status_cell(status: PaceStatus) -> Cell {
    Cell::new(format!("● {}", status.label().to_uppercase()))
        .fg(status_color(status))
        .add_attribute(Attribute::Bold)
}

/// Green at or above `good`, yellow at or above `fair`, red otherwise.
pub fn tier_style(value: f64, good: f64, fair: f64) -> StyleType {
    if value >= good {
        StyleType::Good
    } else if value >= fair {
        StyleType::Caution
    } else {
        StyleType::Error
    }
}

pub fn tier_color(value: f64, good: f64, fair: f64) -> Color {
    match tier_style(value, good, fair) {
        StyleType::Good => Color::Green,
        StyleType::Caution => Color::Yellow,
        _ => Color::Red,
    }
}

/// Compact dollar amount: `$3.50M`, `$350K`, `$900`.
pub fn money(value: f64) -> String {
    if value == 0.0 || !value.is_finite() {
        return "$0".to_string();
    }
    let sign = if value < 0.0 { "-" } else { "" };
    let abs = value.abs();
    if abs >= 1e6 {
        format!("{sign}${:.2}M", abs / 1e6)
    } else if abs >= 1e3 {
        format!("{sign}${:.0}K", abs / 1e3)
    } else {
        format!("{sign}${abs:.0}")
    }
}

/// Formats a ratio as a percentage with one decimal, `0.2` -> `20.0%`.
pub fn percent(ratio: f64) -> String {
    format!("{:.1}%", ratio * 100.0)
}

/// Horizontal bar scaled against `max`.
pub fn bar(count: usize, max: usize, width: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let filled = ((count as f64 / max as f64) * width as f64).round() as usize;
    "█".repeat(filled.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_formatting() {
        assert_eq!(money(0.0), "$0");
        assert_eq!(money(f64::NAN), "$0");
        assert_eq!(money(3_500_000.0), "$3.50M");
        assert_eq!(money(350_000.0), "$350K");
        assert_eq!(money(37_781.8), "$38K");
        assert_eq!(money(900.0), "$900");
        assert_eq!(money(-700_000.0), "-$700K");
    }

    #[test]
    fn test_percent_formatting() {
        assert_eq!(percent(0.2), "20.0%");
        assert_eq!(percent(1.3298), "133.0%");
    }

    #[test]
    fn test_bar_scaling() {
        assert_eq!(bar(4, 4, 10).chars().count(), 10);
        assert_eq!(bar(2, 4, 10).chars().count(), 5);
        assert_eq!(bar(1, 100, 10).chars().count(), 1);
        assert_eq!(bar(0, 0, 10), "");
    }
}
