//! SQL schema definitions for the radar crop monitoring store.
//!
//! Real stores are produced elsewhere; this schema is applied to the
//! in-memory databases used for fixtures and tests.

/// Name of the observation table (per-field SAR and NDVI statistics).
pub const OBSERVATION_TABLE: &str = "s1fieldstatistic";
/// Name of the field boundary table.
pub const AREA_OF_INTEREST_TABLE: &str = "areaofinterest";
/// Name of the crop type legend table.
pub const CROP_LEGEND_TABLE: &str = "croplegend";

/// Tables a valid store must contain at least one of.
pub const KNOWN_TABLES: [&str; 3] = [OBSERVATION_TABLE, AREA_OF_INTEREST_TABLE, CROP_LEGEND_TABLE];

/// Returns the full SQL schema as a single batch string.
///
/// This creates the following tables:
///
/// - `s1fieldstatistic` - One statistic of one parameter (VV, VH, NDVI) for
///   one field at one acquisition time
/// - `areaofinterest` - Field boundaries per area of interest and year
/// - `croplegend` - Crop type code to crop type name
pub fn create_schema() -> &'static str {
    r#"
    CREATE TABLE IF NOT EXISTS s1fieldstatistic (
        value REAL NOT NULL,
        mask_label INTEGER NOT NULL,
        unit TEXT,
        aoi TEXT NOT NULL,
        datetime TEXT NOT NULL,
        polarization TEXT NOT NULL,
        acquisition TEXT NOT NULL,
        product TEXT NOT NULL,
        statistic TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_s1_mask_label ON s1fieldstatistic(mask_label, aoi);
    CREATE INDEX IF NOT EXISTS idx_s1_datetime ON s1fieldstatistic(datetime);

    CREATE TABLE IF NOT EXISTS areaofinterest (
        fid INTEGER NOT NULL,
        year INTEGER NOT NULL,
        aoi TEXT NOT NULL,
        sl_nr INTEGER,
        crop_type_code TEXT NOT NULL,
        field_geom TEXT,
        PRIMARY KEY (fid, year, aoi)
    );

    CREATE TABLE IF NOT EXISTS croplegend (
        crop_type_code TEXT PRIMARY KEY,
        crop_type TEXT NOT NULL
    );
    "#
}
