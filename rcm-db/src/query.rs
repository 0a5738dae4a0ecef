//! Observation query builder.
//!
//! Turns a [`FilterSelection`] into one parameterized query over the
//! observation table joined with the field boundary and crop legend tables.
//! Every user-chosen value is bound as a parameter; IN lists get one
//! placeholder per value.
//!
//! # Join key
//!
//! An observation belongs to a field boundary when the field id, the area
//! of interest and the calendar year of the observation timestamp all
//! match. Field boundaries and crop assignments change from year to year,
//! so an observation is never attributed to a boundary from another year.
//! Observations without a matching boundary are dropped (inner join).

use crate::models::ObservationRecord;
use crate::selection::FilterSelection;
use crate::{Database, Result, StoreError};
use rusqlite::types::{ToSql, ValueRef};
use rusqlite::Row;
use serde::Serialize;
use std::fmt;

const SELECT_JOINED: &str = "SELECT
    round(s1.value, 2) AS value,
    CAST(s1.mask_label AS INTEGER) AS mask_label,
    s1.unit,
    s1.aoi,
    s1.datetime,
    strftime('%Y-%m-%d', s1.datetime) AS date,
    strftime('%H:%M:%S', s1.datetime) AS time,
    s1.polarization AS parameter,
    s1.acquisition,
    s1.product,
    s1.statistic,
    CAST(area.fid AS INTEGER) AS fid,
    CAST(area.year AS INTEGER) AS year,
    area.sl_nr,
    area.crop_type_code,
    area.crop_type,
    area.field_geom
FROM s1fieldstatistic AS s1
INNER JOIN (
    SELECT
        field.fid,
        field.year,
        field.aoi,
        field.sl_nr,
        field.crop_type_code,
        crop.crop_type,
        field.field_geom
    FROM areaofinterest AS field
    INNER JOIN croplegend AS crop ON crop.crop_type_code = field.crop_type_code
) AS area
ON s1.mask_label = area.fid
    AND CAST(strftime('%Y', s1.datetime) AS INTEGER) = area.year
    AND s1.aoi = area.aoi";

/// A ready-to-run observation query: SQL text plus its bound values.
pub struct ObservationQuery {
    sql: String,
    params: Vec<Box<dyn ToSql>>,
}

/// What [`ObservationQuery::build`] decided to do with a selection.
#[derive(Debug)]
pub enum QueryPlan {
    /// At least one dependent filter is empty; nothing can match, so no query is built.
    Unselected(Vec<&'static str>),
    Ready(ObservationQuery),
}

impl ObservationQuery {
    /// Build the query for a selection.
    ///
    /// Fails with [`StoreError::MissingSelection`] when a main filter has no
    /// value.
    pub fn build(selection: &FilterSelection) -> Result<QueryPlan> {
        let aoi = selection
            .aoi
            .clone()
            .ok_or(StoreError::MissingSelection("aoi"))?;
        let year = selection.year.ok_or(StoreError::MissingSelection("year"))?;
        let crop_type = selection
            .crop_type
            .clone()
            .ok_or(StoreError::MissingSelection("crop_type"))?;
        let statistic = selection
            .statistic
            .clone()
            .ok_or(StoreError::MissingSelection("statistic"))?;

        let unselected = selection.unselected_filters();
        if !unselected.is_empty() {
            return Ok(QueryPlan::Unselected(unselected));
        }

        let mut query = ObservationQuery {
            sql: String::from(SELECT_JOINED),
            params: Vec::new(),
        };

        let p = query.bind(aoi);
        query.clause("WHERE", &format!("s1.aoi = {}", p));
        let p = query.bind(crop_type);
        query.clause("AND", &format!("area.crop_type = {}", p));
        let p = query.bind(year);
        query.clause("AND", &format!("area.year = {}", p));
        let p = query.bind_list(selection.products.values());
        query.clause("AND", &format!("s1.product IN ({})", p));
        let p = query.bind_list(selection.acquisitions.values());
        query.clause("AND", &format!("s1.acquisition IN ({})", p));
        let p = query.bind_list(selection.parameters.values());
        query.clause("AND", &format!("s1.polarization IN ({})", p));
        let p = query.bind_list(selection.fids.values());
        query.clause("AND", &format!("area.fid IN ({})", p));
        let p = query.bind(statistic);
        query.clause("AND", &format!("s1.statistic = {}", p));
        query.sql.push_str("\nORDER BY s1.mask_label, s1.datetime ASC");

        Ok(QueryPlan::Ready(query))
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    fn clause(&mut self, keyword: &str, predicate: &str) {
        self.sql.push_str(&format!("\n{} {}", keyword, predicate));
    }

    /// Bind one value and return its numbered placeholder.
    fn bind<T: ToSql + 'static>(&mut self, value: T) -> String {
        self.params.push(Box::new(value));
        format!("?{}", self.params.len())
    }

    /// Bind every value of a list and return the comma separated placeholders.
    fn bind_list<T: ToSql + Clone + 'static>(&mut self, values: &[T]) -> String {
        values
            .iter()
            .map(|v| self.bind(v.clone()))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn param_refs(&self) -> Vec<&dyn ToSql> {
        self.params.iter().map(|p| &**p).collect()
    }
}

impl fmt::Debug for ObservationQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservationQuery")
            .field("sql", &self.sql)
            .field("params", &self.params.len())
            .finish()
    }
}

/// Whether a query result has rows, and if not, why.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultStatus {
    /// A dependent filter is still empty.
    NoSelection,
    /// Every filter has a value but nothing matched.
    NoData,
    Data,
}

/// Result of running a selection against the store.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    NoSelection { unselected: Vec<&'static str> },
    Records(Vec<ObservationRecord>),
}

impl QueryOutcome {
    /// Matching rows; always empty for an incomplete selection.
    pub fn records(&self) -> &[ObservationRecord] {
        match self {
            QueryOutcome::NoSelection { .. } => &[],
            QueryOutcome::Records(records) => records,
        }
    }

    pub fn into_records(self) -> Vec<ObservationRecord> {
        match self {
            QueryOutcome::NoSelection { .. } => Vec::new(),
            QueryOutcome::Records(records) => records,
        }
    }

    pub fn status(&self) -> ResultStatus {
        match self {
            QueryOutcome::NoSelection { .. } => ResultStatus::NoSelection,
            QueryOutcome::Records(records) if records.is_empty() => ResultStatus::NoData,
            QueryOutcome::Records(_) => ResultStatus::Data,
        }
    }
}

/// Read a pass-through column as text regardless of its storage class.
///
/// Blobs (binary geometries) come back as lowercase hex.
fn opaque_text(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<String>> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Text(t) => Some(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Some(b.iter().map(|byte| format!("{:02x}", byte)).collect()),
    })
}

fn map_record(row: &Row<'_>) -> rusqlite::Result<ObservationRecord> {
    Ok(ObservationRecord {
        value: row.get(0)?,
        mask_label: row.get(1)?,
        unit: row.get(2)?,
        aoi: row.get(3)?,
        datetime: row.get(4)?,
        date: row.get(5)?,
        time: row.get(6)?,
        parameter: row.get(7)?,
        acquisition: row.get(8)?,
        product: row.get(9)?,
        statistic: row.get(10)?,
        fid: row.get(11)?,
        year: row.get(12)?,
        sl_nr: opaque_text(row, 13)?,
        crop_type_code: row.get(14)?,
        crop_type: row.get(15)?,
        field_geom: opaque_text(row, 16)?,
    })
}

impl Database {
    /// Run the observation query for a selection.
    ///
    /// Rows are ordered by field id, then timestamp, so each field's
    /// time series reads left to right. An incomplete selection returns
    /// [`QueryOutcome::NoSelection`] without touching the store.
    pub fn query_observations(&self, selection: &FilterSelection) -> Result<QueryOutcome> {
        let query = match ObservationQuery::build(selection)? {
            QueryPlan::Unselected(unselected) => {
                log::info!(
                    "[RCM Debug] query: no selection for {:?}, skipping query",
                    unselected
                );
                return Ok(QueryOutcome::NoSelection { unselected });
            }
            QueryPlan::Ready(query) => query,
        };

        log::debug!("[RCM Debug] query: {:?}", query);
        let mut stmt = self.conn.prepare(query.sql())?;
        let rows = stmt
            .query_map(query.param_refs().as_slice(), map_record)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        log::info!(
            "[RCM Debug] query: query_observations returned {} records",
            rows.len()
        );
        Ok(QueryOutcome::Records(rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::sample_db;
    use crate::selection::DependentFilter;

    fn strings(values: &[&str]) -> DependentFilter<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    /// The single-row scenario: field 36, FRIEN, 2017, Winter Wheat, median VV ascending GRD.
    fn frien_2017() -> FilterSelection {
        FilterSelection {
            aoi: Some("FRIEN".into()),
            year: Some(2017),
            crop_type: Some("Winter Wheat".into()),
            statistic: Some("median".into()),
            acquisitions: strings(&["A"]),
            products: strings(&["GRD"]),
            parameters: strings(&["VV"]),
            fids: [36].into_iter().collect(),
        }
    }

    #[test]
    fn single_selection_returns_exactly_one_row() {
        let db = sample_db();
        let outcome = db.query_observations(&frien_2017()).unwrap();
        assert_eq!(outcome.status(), ResultStatus::Data);
        let records = outcome.records();
        assert_eq!(records.len(), 1);

        let r = &records[0];
        assert_eq!(r.value, -12.35);
        assert_eq!(r.fid, 36);
        assert_eq!(r.mask_label, 36);
        assert_eq!(r.year, 2017);
        assert_eq!(r.parameter, "VV");
        assert_eq!(r.acquisition, "A");
        assert_eq!(r.crop_type, "Winter Wheat");
        assert_eq!(r.crop_type_code, "WW");
        assert_eq!(r.unit.as_deref(), Some("dB"));
        assert_eq!(r.date.as_deref(), Some("2017-05-04"));
        assert_eq!(r.time.as_deref(), Some("05:47:12"));
        assert_eq!(r.sl_nr.as_deref(), Some("1"));
        assert_eq!(r.field_geom.as_deref(), Some("POLYGON((0 0,1 0,1 1,0 0))"));
    }

    #[test]
    fn single_element_lists_match_only_that_element() {
        let db = sample_db();

        let mut vh = frien_2017();
        vh.parameters = strings(&["VH"]);
        let records = db.query_observations(&vh).unwrap().into_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].parameter, "VH");
        assert_eq!(records[0].value, -18.11);

        let mut both = frien_2017();
        both.parameters = strings(&["VV", "VH"]);
        assert_eq!(db.query_observations(&both).unwrap().records().len(), 2);
    }

    #[test]
    fn rows_are_ordered_by_field_then_time() {
        let db = sample_db();
        let mut selection = frien_2017();
        selection.acquisitions = strings(&["D", "A"]);
        selection.fids = [40, 36].into_iter().collect();
        let records = db.query_observations(&selection).unwrap().into_records();

        let keys: Vec<(i64, &str)> = records
            .iter()
            .map(|r| (r.fid, r.datetime.as_str()))
            .collect();
        assert_eq!(
            keys,
            vec![
                (36, "2017-03-10 17:20:00"),
                (36, "2017-05-04 05:47:12"),
                (40, "2017-06-01 05:47:12"),
            ]
        );
    }

    #[test]
    fn join_requires_matching_year() {
        let db = sample_db();
        // Field 40 only has a 2017 boundary; its 2018 observation must not
        // attach to the 2017 boundary.
        let mut selection = frien_2017();
        selection.fids = [40].into_iter().collect();
        let records = db.query_observations(&selection).unwrap().into_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].date.as_deref(), Some("2017-06-01"));

        // Field 36 changed crop in 2018; the 2018 observation carries the 2018 crop.
        let mut maize = frien_2017();
        maize.year = Some(2018);
        maize.crop_type = Some("Silage Maize".into());
        let records = db.query_observations(&maize).unwrap().into_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].value, -9.75);
        assert_eq!(records[0].crop_type_code, "SM");

        // Field 36 has no boundary in 2019, so its 2019 observation never shows up.
        for year in [2017, 2018, 2019] {
            let mut any = frien_2017();
            any.year = Some(year);
            any.crop_type = Some(if year == 2018 { "Silage Maize" } else { "Winter Wheat" }.into());
            let records = db.query_observations(&any).unwrap().into_records();
            assert!(records.iter().all(|r| !r.datetime.starts_with("2019")));
        }
    }

    #[test]
    fn crop_from_another_year_matches_nothing() {
        let db = sample_db();
        let mut selection = frien_2017();
        selection.crop_type = Some("Silage Maize".into());
        let outcome = db.query_observations(&selection).unwrap();
        assert_eq!(outcome.status(), ResultStatus::NoData);
    }

    #[test]
    fn any_unselected_filter_yields_no_selection() {
        let db = sample_db();
        let mut selection = frien_2017();
        selection.fids = DependentFilter::Unselected;
        let outcome = db.query_observations(&selection).unwrap();
        assert_eq!(outcome.status(), ResultStatus::NoSelection);
        assert!(outcome.records().is_empty());
        assert_eq!(
            outcome,
            QueryOutcome::NoSelection {
                unselected: vec!["fid"]
            }
        );
    }

    #[test]
    fn complete_selection_without_matches_is_no_data() {
        let db = sample_db();
        let mut selection = frien_2017();
        selection.products = strings(&["SLC"]);
        let outcome = db.query_observations(&selection).unwrap();
        assert_eq!(outcome.status(), ResultStatus::NoData);
    }

    #[test]
    fn missing_main_filter_is_an_error() {
        let mut selection = frien_2017();
        selection.statistic = None;
        let err = ObservationQuery::build(&selection).unwrap_err();
        assert!(matches!(err, StoreError::MissingSelection("statistic")));

        selection.aoi = None;
        let err = ObservationQuery::build(&selection).unwrap_err();
        assert!(matches!(err, StoreError::MissingSelection("aoi")));
    }

    #[test]
    fn values_are_bound_not_spliced() {
        let mut selection = frien_2017();
        selection.aoi = Some("FRIEN\" OR 1=1 --".into());
        selection.products = strings(&["GRD", "x'); DROP TABLE croplegend; --"]);
        let plan = ObservationQuery::build(&selection).unwrap();
        let query = match plan {
            QueryPlan::Ready(query) => query,
            other => panic!("expected a query, got {:?}", other),
        };
        assert!(!query.sql().contains("FRIEN"));
        assert!(!query.sql().contains("DROP"));
        assert!(query.sql().contains("s1.product IN (?4, ?5)"));
        assert_eq!(query.param_count(), 9);

        let db = sample_db();
        let outcome = db.query_observations(&selection).unwrap();
        assert_eq!(outcome.status(), ResultStatus::NoData);
        assert_eq!(db.query_catalog().unwrap().crop_types.len(), 2);
    }

    #[test]
    fn single_values_get_single_placeholders() {
        let plan = ObservationQuery::build(&frien_2017()).unwrap();
        let QueryPlan::Ready(query) = plan else {
            panic!("expected a query");
        };
        assert_eq!(query.param_count(), 8);
        assert!(query.sql().contains("s1.product IN (?4)"));
        assert!(query.sql().contains("area.fid IN (?7)"));
        assert!(query.sql().ends_with("ORDER BY s1.mask_label, s1.datetime ASC"));
    }
}
