//! Request-scoped render context.
//!
//! One [`RenderContext`] exists per render. It owns the store handle and the
//! resolved filter selection, runs exactly one observation query, and
//! releases the handle when the render ends, whether it succeeded or not.

use crate::dashboard::{display_catalog, ChartSpec, Dashboard};
use crate::filters::FilterArgs;
use chrono::NaiveDate;
use rcm_data::{collect_panels, DateBounds, Notice, ShapedRecords, Trendline};
use rcm_db::models::FilterCatalog;
use rcm_db::selection::FilterSelection;
use rcm_db::Database;
use std::path::Path;

/// Presentation choices that do not affect the query.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ViewOptions {
    /// Start of the date range; defaults to the earliest result date.
    pub start: Option<NaiveDate>,
    /// End of the date range; defaults to the latest result date.
    pub end: Option<NaiveDate>,
    pub trendline: Trendline,
}

pub struct RenderContext {
    db: Database,
    catalog: FilterCatalog,
    selection: FilterSelection,
}

impl RenderContext {
    /// Open the store, load the catalog and resolve the filters against it.
    pub fn open(path: &Path, filters: &FilterArgs) -> anyhow::Result<Self> {
        let db = Database::open(path)?;
        let catalog = db.query_catalog()?;
        let selection = filters.resolve(&catalog);
        log::info!("[RCM Debug] render: selection {:?}", selection);
        Ok(Self::from_parts(db, catalog, selection))
    }

    pub fn from_parts(db: Database, catalog: FilterCatalog, selection: FilterSelection) -> Self {
        Self {
            db,
            catalog,
            selection,
        }
    }

    /// Run the render and close the store.
    pub fn render(self, view: &ViewOptions) -> anyhow::Result<Dashboard> {
        let RenderContext {
            db,
            catalog,
            selection,
        } = self;
        let dashboard = build_dashboard(&db, catalog, selection, view);
        if let Err(e) = db.close() {
            log::warn!("[RCM Debug] render: closing the store failed: {}", e);
        }
        dashboard
    }
}

fn build_dashboard(
    db: &Database,
    catalog: FilterCatalog,
    selection: FilterSelection,
    view: &ViewOptions,
) -> anyhow::Result<Dashboard> {
    let outcome = db.query_observations(&selection)?;
    let mut notices: Vec<Notice> = Notice::for_status(outcome.status()).into_iter().collect();

    let shaped = ShapedRecords::from_records(outcome.into_records());
    let extent = shaped.date_bounds();

    let (active_range, in_range) = match extent {
        Some(extent) => {
            let requested = DateBounds::new(
                view.start.unwrap_or(extent.start),
                view.end.unwrap_or(extent.end),
            );
            let active = match requested.clamp_to(&extent) {
                Some(active) => active,
                None => {
                    log::warn!(
                        "[RCM Debug] render: requested range {:?} lies outside {:?}",
                        requested,
                        extent
                    );
                    notices.push(Notice::DateRangeOutsideData);
                    extent
                }
            };
            (Some(active), shaped.apply_range(active))
        }
        None => {
            notices.push(Notice::DateRangeUnavailable);
            (None, shaped)
        }
    };

    let statistic = selection.statistic.as_deref().unwrap_or_default();
    let (panels, panel_notices) = collect_panels(&in_range, selection.parameters.values(), statistic);
    notices.extend(panel_notices);

    let charts = panels
        .iter()
        .map(|panel| ChartSpec::from_panel(panel, view.trendline))
        .collect();

    Ok(Dashboard {
        catalog: display_catalog(&catalog),
        selection,
        notices,
        extent,
        active_range,
        table: in_range.records().cloned().collect(),
        charts,
    })
}
