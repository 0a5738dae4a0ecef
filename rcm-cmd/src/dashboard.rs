//! Dashboard output: notices, the raw table view and one chart per parameter.
//!
//! Charts are emitted as data plus configuration (title, axis labels,
//! x-domain, colour field, trend points) for a plotting front end to draw.

use chrono::NaiveDate;
use rcm_data::{DateBounds, Notice, ParameterPanel, Trendline};
use rcm_db::models::{FilterCatalog, ObservationRecord};
use rcm_db::selection::FilterSelection;
use rcm_utils::dates::{date_from_day_number, day_number, format_date_short};
use rcm_utils::labels::to_display;
use serde::Serialize;
use std::io::Write;

/// Field the scatter points are coloured by.
pub const COLOR_FIELD: &str = "acquisition";

/// Rows shown in the text table preview.
const TABLE_PREVIEW_ROWS: usize = 20;

/// A scatter point.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChartPoint {
    pub date: NaiveDate,
    pub value: f64,
    pub acquisition: String,
    pub fid: i64,
}

/// A point on the trend line.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Everything needed to draw one parameter's chart.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChartSpec {
    pub parameter: String,
    pub title: String,
    pub x_axis_label: &'static str,
    pub y_axis_label: &'static str,
    pub domain: DateBounds,
    pub color_field: &'static str,
    pub trendline: Trendline,
    pub points: Vec<ChartPoint>,
    pub trend: Vec<TrendPoint>,
}

impl ChartSpec {
    pub fn from_panel(panel: &ParameterPanel, trendline: Trendline) -> Self {
        let points: Vec<ChartPoint> = panel
            .records
            .rows()
            .iter()
            .map(|r| ChartPoint {
                date: r.date,
                value: r.record.value,
                acquisition: r.record.acquisition.clone(),
                fid: r.record.fid,
            })
            .collect();

        let xy: Vec<(f64, f64)> = points.iter().map(|p| (day_number(&p.date), p.value)).collect();
        let trend = trendline
            .fit(&xy)
            .into_iter()
            .filter_map(|(x, y)| {
                date_from_day_number(x).map(|date| TrendPoint { date, value: y })
            })
            .collect();

        Self {
            parameter: panel.parameter.clone(),
            title: panel.title.clone(),
            x_axis_label: "Date",
            y_axis_label: panel.y_axis_label,
            domain: panel.domain,
            color_field: COLOR_FIELD,
            trendline,
            points,
            trend,
        }
    }
}

/// Catalog with display labels applied, for the selection widgets.
pub fn display_catalog(catalog: &FilterCatalog) -> FilterCatalog {
    FilterCatalog {
        aois: catalog.aois.iter().map(|v| to_display(v)).collect(),
        acquisitions: catalog.acquisitions.iter().map(|v| to_display(v)).collect(),
        ..catalog.clone()
    }
}

/// The result of one render.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Dashboard {
    pub catalog: FilterCatalog,
    pub selection: FilterSelection,
    pub notices: Vec<Notice>,
    /// Date extent of the full query result.
    pub extent: Option<DateBounds>,
    /// Date range the table and charts are limited to.
    pub active_range: Option<DateBounds>,
    pub table: Vec<ObservationRecord>,
    pub charts: Vec<ChartSpec>,
}

impl Dashboard {
    /// Human readable summary: notices, a table preview and the charts.
    pub fn render_text<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        for notice in &self.notices {
            writeln!(out, "[{}] {}", notice.level().as_str().to_uppercase(), notice)?;
        }

        if let Some(range) = &self.active_range {
            writeln!(
                out,
                "Date range: {} - {}",
                format_date_short(&range.start),
                format_date_short(&range.end)
            )?;
        }

        if !self.table.is_empty() {
            writeln!(out)?;
            writeln!(
                out,
                "{:>6}  {:<10}  {:<8}  {:<9}  {:<11}  {:>9}  {}",
                "fid", "date", "time", "parameter", "acquisition", "value", "crop_type"
            )?;
            for r in self.table.iter().take(TABLE_PREVIEW_ROWS) {
                writeln!(
                    out,
                    "{:>6}  {:<10}  {:<8}  {:<9}  {:<11}  {:>9.2}  {}",
                    r.fid,
                    r.date.as_deref().unwrap_or("-"),
                    r.time.as_deref().unwrap_or("-"),
                    r.parameter,
                    to_display(&r.acquisition),
                    r.value,
                    r.crop_type
                )?;
            }
            if self.table.len() > TABLE_PREVIEW_ROWS {
                writeln!(out, "... {} more rows", self.table.len() - TABLE_PREVIEW_ROWS)?;
            }
        }

        for chart in &self.charts {
            writeln!(out)?;
            writeln!(
                out,
                "{}: {} points, y-axis '{}', {} - {}",
                chart.title,
                chart.points.len(),
                chart.y_axis_label,
                format_date_short(&chart.domain.start),
                format_date_short(&chart.domain.end)
            )?;
            if chart.trendline != Trendline::None {
                writeln!(
                    out,
                    "  trendline {:?}: {} points",
                    chart.trendline,
                    chart.trend.len()
                )?;
            }
        }
        Ok(())
    }

    /// Write the raw table view as CSV.
    pub fn write_csv<W: Write>(&self, out: W) -> anyhow::Result<()> {
        let mut wtr = csv::Writer::from_writer(out);
        for record in &self.table {
            wtr.serialize(record)?;
        }
        wtr.flush()?;
        log::info!("[RCM Debug] dashboard: wrote {} table rows", self.table.len());
        Ok(())
    }
}
