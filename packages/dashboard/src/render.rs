//! Renderer sinks for an assembled [`DashboardView`].

use std::io::Write;

use shelter_stats_record_models::AnimalRecord;
use strum_macros::{AsRefStr, Display, EnumString};

use crate::DashboardView;

/// Maximum bar length in the text report.
const BAR_WIDTH: u64 = 40;

/// Errors that can occur while rendering.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Writing to the output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A sink that accepts finished dashboard views.
pub trait Renderer {
    /// Renders one view.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] if the output cannot be written.
    fn render(&mut self, view: &DashboardView) -> Result<(), RenderError>;
}

/// Output format selectable from the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum OutputFormat {
    /// Plain-text report.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

impl OutputFormat {
    /// Creates the renderer for this format writing to `writer`.
    pub fn renderer<'a, W: Write + 'a>(self, writer: W) -> Box<dyn Renderer + 'a> {
        match self {
            Self::Text => Box::new(TextRenderer::new(writer)),
            Self::Json => Box::new(JsonRenderer::new(writer)),
        }
    }
}

/// Writes the view as pretty-printed JSON.
#[derive(Debug)]
pub struct JsonRenderer<W: Write> {
    writer: W,
}

impl<W: Write> JsonRenderer<W> {
    /// Creates a renderer writing to `writer`.
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Renderer for JsonRenderer<W> {
    fn render(&mut self, view: &DashboardView) -> Result<(), RenderError> {
        serde_json::to_writer_pretty(&mut self.writer, view)?;
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Writes the view as a plain-text report.
#[derive(Debug)]
pub struct TextRenderer<W: Write> {
    writer: W,
}

impl<W: Write> TextRenderer<W> {
    /// Creates a renderer writing to `writer`.
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn heading(&mut self, text: &str) -> std::io::Result<()> {
        writeln!(self.writer)?;
        writeln!(self.writer, "{text}")?;
        writeln!(self.writer, "{}", "-".repeat(text.chars().count()))
    }

    fn categories(&mut self, view: &DashboardView) -> std::io::Result<()> {
        self.heading("Animals by type")?;
        let counts = &view.views.category_counts;
        if counts.is_empty() {
            return writeln!(self.writer, "  (no records)");
        }

        let label_width = counts.iter().map(|c| c.category.len()).max().unwrap_or(0);
        let max = counts.iter().map(|c| c.count).max().unwrap_or(0);
        for c in counts {
            writeln!(
                self.writer,
                "  {:<label_width$}  {:>6}  {}",
                c.category,
                c.count,
                bar(c.count, max)
            )?;
        }
        Ok(())
    }

    fn outcomes(&mut self, view: &DashboardView) -> std::io::Result<()> {
        self.heading("Outcomes")?;
        let dist = &view.views.outcome_distribution;
        if dist.is_empty() {
            return writeln!(self.writer, "  (no known outcomes)");
        }

        let label_width = dist.outcomes.iter().map(|o| o.outcome.len()).max().unwrap_or(0);
        for share in &dist.outcomes {
            writeln!(
                self.writer,
                "  {:<label_width$}  {:>6}  {:>6}",
                share.outcome,
                share.count,
                share.percent_label()
            )?;
        }
        writeln!(self.writer, "  {} record(s) with a known outcome", dist.total_known)
    }

    fn monthly(&mut self, view: &DashboardView) -> std::io::Result<()> {
        self.heading("Monthly intakes")?;
        let series = &view.views.monthly_series;
        if series.is_empty() {
            return writeln!(self.writer, "  (no dated records)");
        }

        let max = series.iter().map(|p| p.count).max().unwrap_or(0);
        for point in series {
            writeln!(
                self.writer,
                "  {}  {:>6}  {}",
                point.period,
                point.count,
                bar(point.count, max)
            )?;
        }
        Ok(())
    }

    fn ages(&mut self, view: &DashboardView) -> std::io::Result<()> {
        self.heading("Age distribution (months)")?;
        let hist = &view.views.age_histogram;
        if hist.is_empty() {
            return writeln!(self.writer, "  (no known ages)");
        }

        let ranges: Vec<String> = hist
            .buckets
            .iter()
            .map(|b| format!("{:.1}-{:.1}", b.lower, b.upper))
            .collect();
        let range_width = ranges.iter().map(String::len).max().unwrap_or(0);
        let max = hist.buckets.iter().map(|b| b.count).max().unwrap_or(0);
        for (range, bucket) in ranges.iter().zip(&hist.buckets) {
            writeln!(
                self.writer,
                "  {range:>range_width$}  {:>6}  {}",
                bucket.count,
                bar(bucket.count, max)
            )?;
        }
        Ok(())
    }

    fn records(&mut self, view: &DashboardView) -> std::io::Result<()> {
        self.heading(&format!(
            "Records ({} of {})",
            view.filtered_records.len(),
            view.record_count
        ))?;
        let selected = if view.selected_categories.is_empty() {
            "(none)".to_string()
        } else {
            view.selected_categories.join(", ")
        };
        writeln!(self.writer, "  Selected types: {selected}")?;
        if view.filtered_records.is_empty() {
            return Ok(());
        }

        let header = [
            "Animal ID",
            "Type",
            "Intake",
            "Outcome date",
            "Outcome",
            "Age (months)",
            "Month",
        ];
        let rows: Vec<[String; 7]> = view.filtered_records.iter().map(table_row).collect();

        let mut widths = header.map(str::len);
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.len());
            }
        }

        writeln!(self.writer)?;
        self.table_line(&header.map(str::to_string), &widths)?;
        self.table_line(&widths.map(|w| "-".repeat(w)), &widths)?;
        for row in &rows {
            self.table_line(row, &widths)?;
        }
        Ok(())
    }

    fn table_line(&mut self, cells: &[String; 7], widths: &[usize; 7]) -> std::io::Result<()> {
        let line: Vec<String> = cells
            .iter()
            .zip(widths)
            .map(|(cell, &width)| format!("{cell:<width$}"))
            .collect();
        writeln!(self.writer, "  {}", line.join("  ").trim_end())
    }
}

impl<W: Write> Renderer for TextRenderer<W> {
    fn render(&mut self, view: &DashboardView) -> Result<(), RenderError> {
        writeln!(self.writer, "{}", view.title)?;
        writeln!(self.writer, "{}", "=".repeat(view.title.chars().count()))?;
        writeln!(
            self.writer,
            "Source: {} ({} records, fetched {})",
            view.query_key,
            view.record_count,
            view.fetched_at.format("%Y-%m-%d %H:%M:%S UTC")
        )?;

        self.categories(view)?;
        self.outcomes(view)?;
        self.monthly(view)?;
        self.ages(view)?;
        self.records(view)?;
        self.writer.flush()?;
        Ok(())
    }
}

fn bar(count: u64, max: u64) -> String {
    if max == 0 {
        return String::new();
    }
    let len = (count * BAR_WIDTH).div_ceil(max);
    "#".repeat(usize::try_from(len).unwrap_or(0))
}

fn table_row(record: &AnimalRecord) -> [String; 7] {
    fn or_dash<T: ToString>(value: Option<T>) -> String {
        value.map_or_else(|| "-".to_string(), |v| v.to_string())
    }

    [
        record.animal_id.clone(),
        record.animal_type.clone(),
        or_dash(record.intake_date),
        or_dash(record.outcome_date),
        or_dash(record.outcome_type.as_deref()),
        or_dash(record.age_months),
        or_dash(record.month),
    ]
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn bar_scales_to_max() {
        assert_eq!(bar(10, 10).len(), 40);
        assert_eq!(bar(5, 10).len(), 20);
        assert_eq!(bar(1, 1000).len(), 1);
        assert_eq!(bar(0, 10), "");
        assert_eq!(bar(0, 0), "");
    }

    #[test]
    fn output_format_parses() {
        assert_eq!(OutputFormat::from_str("json").unwrap(), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str("text").unwrap(), OutputFormat::Text);
        assert!(OutputFormat::from_str("html").is_err());
        assert_eq!(OutputFormat::Json.to_string(), "json");
    }

    #[test]
    fn output_format_parse_error_is_a_std_error() {
        let err: Box<dyn std::error::Error + Send + Sync> =
            OutputFormat::from_str("html").unwrap_err().into();
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn table_row_marks_unknowns() {
        let record = AnimalRecord {
            animal_id: "A1".to_string(),
            animal_type: "Cat".to_string(),
            intake_date: None,
            outcome_date: None,
            outcome_type: None,
            age_months: Some(6.5),
            month: "2024-01".parse().ok(),
        };
        assert_eq!(
            table_row(&record),
            ["A1", "Cat", "-", "-", "-", "6.5", "2024-01"].map(str::to_string)
        );
    }
}
