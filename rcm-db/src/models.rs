//! Query result model structs.
//!
//! All structs derive `Serialize` so the rendering host can emit them as
//! JSON.

use serde::Serialize;

/// One observation joined with its field boundary and crop type.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ObservationRecord {
    /// Measured value, rounded to 2 decimal digits.
    pub value: f64,
    /// Field id the observation was computed for.
    pub mask_label: i64,
    pub unit: Option<String>,
    pub aoi: String,
    /// Timestamp exactly as stored.
    pub datetime: String,
    /// Date part of `datetime` (`YYYY-MM-DD`), `None` if SQLite could not read the timestamp.
    pub date: Option<String>,
    /// Time part of `datetime` (`HH:MM:SS`).
    pub time: Option<String>,
    /// Polarization or index (VV, VH, NDVI).
    pub parameter: String,
    /// Pass direction code (A, D).
    pub acquisition: String,
    pub product: String,
    pub statistic: String,
    pub fid: i64,
    pub year: i32,
    pub sl_nr: Option<String>,
    pub crop_type_code: String,
    pub crop_type: String,
    /// Field geometry, passed through untouched.
    pub field_geom: Option<String>,
}

/// Distinct values of every filterable column, used to populate selection widgets.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct FilterCatalog {
    pub aois: Vec<String>,
    pub years: Vec<i32>,
    pub crop_types: Vec<String>,
    pub products: Vec<String>,
    pub acquisitions: Vec<String>,
    pub parameters: Vec<String>,
    pub statistics: Vec<String>,
    pub fids: Vec<i64>,
}
