//! Result shaping for observation time series.
//!
//! This crate turns the rows returned by the store into forms suitable for
//! charting: calendar dates for slicing, date range bounds, per-parameter
//! subsets with axis labels, user notices, and trendlines.

pub mod notice;
pub mod panels;
pub mod shaper;
pub mod trend;

pub use notice::{Notice, NoticeLevel};
pub use panels::{collect_panels, ParameterPanel};
pub use shaper::{DateBounds, DatedRecord, ShapedRecords};
pub use trend::Trendline;

#[cfg(test)]
pub(crate) mod fixtures {
    use rcm_db::models::ObservationRecord;

    /// A joined row for field 36 in FRIEN with the given timestamp, parameter and value.
    pub fn record(datetime: &str, parameter: &str, value: f64) -> ObservationRecord {
        ObservationRecord {
            value,
            mask_label: 36,
            unit: Some("dB".to_string()),
            aoi: "FRIEN".to_string(),
            datetime: datetime.to_string(),
            date: datetime.get(0..10).map(str::to_string),
            time: datetime.get(11..19).map(str::to_string),
            parameter: parameter.to_string(),
            acquisition: "A".to_string(),
            product: "GRD".to_string(),
            statistic: "median".to_string(),
            fid: 36,
            year: 2019,
            sl_nr: Some("1".to_string()),
            crop_type_code: "WW".to_string(),
            crop_type: "Winter Wheat".to_string(),
            field_geom: None,
        }
    }
}
