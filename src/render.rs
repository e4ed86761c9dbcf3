//! Terminal output: comfy-table tables, text bar charts and JSON.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use statboard::metric::Metric;
use statboard::rank::RankingResult;
use statboard::record::NormalizedRecord;
use statboard::regression::RegressionReport;
use statboard::stats::Distribution;

/// Width of the longest bar in the text chart.
const BAR_WIDTH: usize = 40;

pub fn ranking_table(result: &RankingResult) -> Table {
    let metric = result.metric();
    let with_tag = result.records().iter().any(|r| r.tag.is_some());

    let mut header = vec![header_cell("#"), header_cell("Player")];
    if with_tag {
        header.push(header_cell("Tag"));
    }
    header.push(header_cell(metric.label()));

    let mut table = new_table();
    table.set_header(header);
    for (pos, record, value) in result.entries() {
        let mut row = vec![dim_cell(pos), Cell::new(&record.name)];
        if with_tag {
            row.push(Cell::new(record.tag.as_deref().unwrap_or("-")));
        }
        row.push(Cell::new(format_value(value)));
        table.add_row(row);
    }
    let value_col = table.column_count() - 1;
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, value_col, CellAlignment::Right);
    table
}

/// Horizontal bar chart, one line per `(label, value)`.
///
/// Bars are scaled to the largest value; non-positive values draw no bar.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn bar_chart(series: &[(String, f64)]) -> String {
    let max = series.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);
    let label_width = series.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);

    let mut out = String::new();
    for (label, value) in series {
        let len = if max > 0.0 && *value > 0.0 {
            ((value / max) * BAR_WIDTH as f64).round() as usize
        } else {
            0
        };
        out.push_str(&format!(
            "{label:>label_width$} │{} {}\n",
            "█".repeat(len),
            format_value(*value)
        ));
    }
    out
}

pub fn distribution_table(dist: &Distribution) -> Table {
    let mut table = new_table();
    table.set_header(vec![header_cell(dist.metric.label()), header_cell("Value")]);
    let rows = [
        ("Count", dist.count.to_string()),
        ("Mean", format_value(dist.mean)),
        ("Min", format_value(dist.min)),
        ("Q1", format_value(dist.q1)),
        ("Median", format_value(dist.median)),
        ("Q3", format_value(dist.q3)),
        ("Max", format_value(dist.max)),
        ("IQR", format_value(dist.iqr())),
    ];
    for (label, value) in rows {
        table.add_row(vec![Cell::new(label), Cell::new(value)]);
    }
    align_column(&mut table, 1, CellAlignment::Right);
    table
}

pub fn regression_table(report: &RegressionReport) -> Table {
    let mut table = new_table();
    table.set_header(vec![
        header_cell(&format!("{} ~", report.target.label())),
        header_cell("Estimate"),
    ]);
    table.add_row(vec![dim_cell("(intercept)"), Cell::new(format!("{:.4}", report.intercept))]);
    for (feature, weight) in report.features.iter().zip(&report.coefficients) {
        table.add_row(vec![Cell::new(feature.label()), Cell::new(format!("{weight:.4}"))]);
    }
    table.add_row(vec![
        Cell::new("R² (test)").add_attribute(Attribute::Bold),
        Cell::new(format!("{:.4}", report.r_squared)).add_attribute(Attribute::Bold),
    ]);
    table.add_row(vec![
        dim_cell("rows train/test/dropped"),
        dim_cell(format!(
            "{}/{}/{}",
            report.train_rows, report.test_rows, report.dropped_rows
        )),
    ]);
    align_column(&mut table, 1, CellAlignment::Right);
    table
}

pub fn preview_table(records: &[NormalizedRecord], metrics: &[Metric]) -> Table {
    let mut header = vec![header_cell("Player"), header_cell("Tag")];
    header.extend(metrics.iter().map(|m| header_cell(m.label())));

    let mut table = new_table();
    table.set_header(header);
    for record in records {
        let mut row = vec![
            Cell::new(&record.name),
            Cell::new(record.tag.as_deref().unwrap_or("-")),
        ];
        row.extend(metrics.iter().map(|&m| match record.value(m) {
            Some(v) => Cell::new(format_value(v)),
            None => dim_cell("-"),
        }));
        table.add_row(row);
    }
    for col in 2..table.column_count() {
        align_column(&mut table, col, CellAlignment::Right);
    }
    table
}

pub fn metrics_table(metrics: &[Metric]) -> Table {
    let mut table = new_table();
    table.set_header(vec![header_cell("Column"), header_cell("Label")]);
    for metric in metrics {
        table.add_row(vec![Cell::new(metric.column()), Cell::new(metric.label())]);
    }
    table
}

/// Whole numbers without decimals, everything else to two places.
fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(5.0), "5");
        assert_eq!(format_value(1.256), "1.26");
    }

    #[test]
    fn test_bar_chart_scales_to_max() {
        let chart = bar_chart(&[("A".to_string(), 4.0), ("Bob".to_string(), 2.0)]);
        let lines: Vec<&str> = chart.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].matches('█').count(), BAR_WIDTH);
        assert_eq!(lines[1].matches('█').count(), BAR_WIDTH / 2);
        assert!(lines[0].starts_with("  A │"));
    }

    #[test]
    fn test_distribution_table_lists_iqr() {
        let dist = Distribution {
            metric: Metric::KdRatio,
            count: 4,
            mean: 1.0,
            min: 0.5,
            q1: 0.75,
            median: 1.0,
            q3: 1.25,
            max: 1.5,
        };
        let rendered = distribution_table(&dist).to_string();
        let iqr_line = rendered.lines().find(|l| l.contains("IQR")).unwrap();
        assert!(iqr_line.contains("0.50"));
    }

    #[test]
    fn test_bar_chart_empty() {
        assert!(bar_chart(&[]).is_empty());
    }
}
