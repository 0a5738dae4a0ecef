//! CSV data loading functions for populating a fixture store.
//!
//! Each loader method parses headered CSV from a string slice and inserts
//! rows into the corresponding table with bound parameters.
//!
//! # CSV Formats
//!
//! - **Observations**: `value,mask_label,unit,aoi,datetime,polarization,acquisition,product,statistic`
//! - **Areas of interest**: `fid,year,aoi,sl_nr,crop_type_code,field_geom`
//! - **Crop legend**: `crop_type_code,crop_type`

use crate::Database;
use rusqlite::params;

fn reader(csv_data: &str) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(csv_data.as_bytes())
}

fn optional(field: Option<&str>) -> Option<&str> {
    field.map(str::trim).filter(|s| !s.is_empty())
}

impl Database {
    /// Load observations from CSV string.
    ///
    /// Rows with a non-numeric value or field id are skipped. An empty
    /// `unit` is stored as NULL.
    ///
    /// # Example CSV
    /// ```text
    /// value,mask_label,unit,aoi,datetime,polarization,acquisition,product,statistic
    /// -12.3456,36,dB,FRIEN,2017-05-04 05:47:12,VV,A,GRD,median
    /// ```
    pub fn load_observations(&self, csv_data: &str) -> anyhow::Result<()> {
        let mut rdr = reader(csv_data);

        let mut count = 0u32;
        let mut skipped = 0u32;
        for result in rdr.records() {
            let r = result?;
            let value: f64 = match r.get(0).unwrap_or("").trim().parse() {
                Ok(v) => v,
                Err(_) => {
                    skipped += 1;
                    continue;
                }
            };
            let mask_label: i64 = match r.get(1).unwrap_or("").trim().parse() {
                Ok(v) => v,
                Err(_) => {
                    skipped += 1;
                    continue;
                }
            };
            let unit = optional(r.get(2));
            let aoi = r.get(3).unwrap_or("").trim();
            let datetime = r.get(4).unwrap_or("").trim();
            let polarization = r.get(5).unwrap_or("").trim();
            let acquisition = r.get(6).unwrap_or("").trim();
            let product = r.get(7).unwrap_or("").trim();
            let statistic = r.get(8).unwrap_or("").trim();

            self.conn.execute(
                "INSERT INTO s1fieldstatistic
                 (value, mask_label, unit, aoi, datetime, polarization, acquisition, product, statistic)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    value,
                    mask_label,
                    unit,
                    aoi,
                    datetime,
                    polarization,
                    acquisition,
                    product,
                    statistic
                ],
            )?;
            count += 1;
        }
        log::info!(
            "[RCM Debug] loader: Loaded {} observations, skipped {} invalid",
            count,
            skipped
        );
        Ok(())
    }

    /// Load field boundaries from CSV string.
    ///
    /// `sl_nr` and `field_geom` may be empty and are then stored as NULL.
    ///
    /// # Example CSV
    /// ```text
    /// fid,year,aoi,sl_nr,crop_type_code,field_geom
    /// 36,2017,FRIEN,1,WW,"POLYGON((0 0,1 0,1 1,0 0))"
    /// ```
    pub fn load_areas_of_interest(&self, csv_data: &str) -> anyhow::Result<()> {
        let mut rdr = reader(csv_data);

        let mut count = 0u32;
        for result in rdr.records() {
            let r = result?;
            let fid: i64 = r.get(0).unwrap_or("").trim().parse()?;
            let year: i32 = r.get(1).unwrap_or("").trim().parse()?;
            let aoi = r.get(2).unwrap_or("").trim();
            let sl_nr: Option<i64> = optional(r.get(3)).and_then(|s| s.parse().ok());
            let crop_type_code = r.get(4).unwrap_or("").trim();
            let field_geom = optional(r.get(5));

            self.conn.execute(
                "INSERT OR REPLACE INTO areaofinterest
                 (fid, year, aoi, sl_nr, crop_type_code, field_geom)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![fid, year, aoi, sl_nr, crop_type_code, field_geom],
            )?;
            count += 1;
        }
        log::info!("[RCM Debug] loader: Loaded {} areas of interest", count);
        Ok(())
    }

    /// Load the crop type legend from CSV string.
    ///
    /// # Example CSV
    /// ```text
    /// crop_type_code,crop_type
    /// WW,Winter Wheat
    /// ```
    pub fn load_crop_legend(&self, csv_data: &str) -> anyhow::Result<()> {
        let mut rdr = reader(csv_data);

        let mut count = 0u32;
        for result in rdr.records() {
            let r = result?;
            let code = r.get(0).unwrap_or("").trim();
            let crop_type = r.get(1).unwrap_or("").trim();
            if code.is_empty() {
                continue;
            }

            self.conn.execute(
                "INSERT OR REPLACE INTO croplegend (crop_type_code, crop_type) VALUES (?1, ?2)",
                params![code, crop_type],
            )?;
            count += 1;
        }
        log::info!("[RCM Debug] loader: Loaded {} crop types", count);
        Ok(())
    }
}
