//! SQLite store layer for radar crop monitoring data.
//!
//! This crate owns everything that talks to the store: opening and
//! validating the database file, loading the distinct values that populate
//! the selection widgets, and turning a filter selection into a single
//! parameterized query over the joined observation, field and crop tables.
//!
//! # Usage
//!
//! ```rust
//! use rcm_db::Database;
//! use rcm_db::selection::{DependentFilter, FilterSelection};
//!
//! let db = Database::new().unwrap();
//! db.load_crop_legend("crop_type_code,crop_type\nWW,Winter Wheat\n").unwrap();
//! db.load_areas_of_interest("fid,year,aoi,sl_nr,crop_type_code,field_geom\n36,2017,FRIEN,1,WW,\n").unwrap();
//! db.load_observations(
//!     "value,mask_label,unit,aoi,datetime,polarization,acquisition,product,statistic\n\
//!      -12.3456,36,dB,FRIEN,2017-05-04 05:47:12,VV,A,GRD,median\n",
//! )
//! .unwrap();
//!
//! let selection = FilterSelection {
//!     aoi: Some("FRIEN".into()),
//!     year: Some(2017),
//!     crop_type: Some("Winter Wheat".into()),
//!     statistic: Some("median".into()),
//!     acquisitions: DependentFilter::from_iter(["A".to_string()]),
//!     products: DependentFilter::from_iter(["GRD".to_string()]),
//!     parameters: DependentFilter::from_iter(["VV".to_string()]),
//!     fids: DependentFilter::from_iter([36]),
//! };
//! let outcome = db.query_observations(&selection).unwrap();
//! assert_eq!(outcome.records().len(), 1);
//! assert_eq!(outcome.records()[0].value, -12.35);
//! ```
//!
//! # Tables
//!
//! See [`schema::create_schema`] for the SQL schema.
//!
//! - `s1fieldstatistic` - Observations (value, mask_label, unit, aoi, datetime,
//!   polarization, acquisition, product, statistic)
//! - `areaofinterest` - Field boundaries (fid, year, aoi, sl_nr, crop_type_code, field_geom)
//! - `croplegend` - Crop type names (crop_type_code, crop_type)

pub mod catalog;
pub mod error;
mod loader;
pub mod models;
pub mod query;
pub mod schema;
pub mod selection;

pub use error::{Result, StoreError};

use rusqlite::{Connection, OpenFlags};
use std::path::{Path, PathBuf};

/// File extension a store path must carry.
pub const STORE_EXTENSION: &str = ".db";

/// Handle to one SQLite store.
///
/// A handle is owned by a single render and released when it is dropped or
/// closed; it is never shared between renders.
pub struct Database {
    conn: Connection,
    path: Option<PathBuf>,
}

impl Database {
    /// Create a new in-memory database with the full schema applied.
    ///
    /// The database is empty after creation; use the `load_*` methods
    /// to populate it with CSV fixtures.
    pub fn new() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(schema::create_schema())?;
        Ok(Self { conn, path: None })
    }

    /// Open an existing store read-only and check that it is one of ours.
    ///
    /// Paths that do not end in `.db` are rejected before any connection is
    /// attempted. A missing file is a connection failure, not a new database.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !is_store_path(path) {
            log::error!("[RCM Debug] store: rejected path {}", path.display());
            return Err(StoreError::InvalidPath(path.to_path_buf()));
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|source| {
            log::error!("Error while connecting to database {}: {}", path.display(), source);
            StoreError::Connection {
                path: path.to_path_buf(),
                source,
            }
        })?;

        let db = Self {
            conn,
            path: Some(path.to_path_buf()),
        };
        db.validate()?;
        log::info!("Successfully connected to database {}", path.display());
        Ok(db)
    }

    /// Confirm that at least one of the known tables exists.
    pub fn validate(&self) -> Result<()> {
        let found: std::result::Result<i64, rusqlite::Error> = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN (?1, ?2, ?3)",
            schema::KNOWN_TABLES,
            |row| row.get(0),
        );
        match found {
            Ok(count) if count > 0 => Ok(()),
            Ok(_) => Err(StoreError::InvalidStore(self.source_path())),
            Err(e) => {
                log::error!("[RCM Debug] store: validation query failed: {}", e);
                Err(StoreError::InvalidStore(self.source_path()))
            }
        }
    }

    /// Close the handle, reporting any error SQLite raises while closing.
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, e)| StoreError::Query(e))?;
        log::debug!("[RCM Debug] store: connection closed");
        Ok(())
    }

    fn source_path(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| PathBuf::from(":memory:"))
    }
}

/// True if `path` names a database file.
pub fn is_store_path(path: &Path) -> bool {
    path.to_string_lossy().ends_with(STORE_EXTENSION)
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Shared fixture data for store tests.

    use crate::Database;

    pub const CROP_LEGEND_CSV: &str = "\
crop_type_code,crop_type
WW,Winter Wheat
SM,Silage Maize
";

    /// Field 36 exists in 2017 and 2018 (with different crops), field 40 only in 2017.
    /// Observations exist for years without a matching field record (36 in 2019, 40 in 2018).
    pub const AREAS_CSV: &str = r#"fid,year,aoi,sl_nr,crop_type_code,field_geom
36,2017,FRIEN,1,WW,"POLYGON((0 0,1 0,1 1,0 0))"
36,2018,FRIEN,1,SM,"POLYGON((0 0,1 0,1 1,0 0))"
40,2017,FRIEN,2,WW,"POLYGON((2 2,3 2,3 3,2 2))"
"#;

    pub const OBSERVATIONS_CSV: &str = "\
value,mask_label,unit,aoi,datetime,polarization,acquisition,product,statistic
-12.3456,36,dB,FRIEN,2017-05-04 05:47:12,VV,A,GRD,median
-18.111,36,dB,FRIEN,2017-05-04 05:47:12,VH,A,GRD,median
-11.5,36,dB,FRIEN,2017-03-10 17:20:00,VV,D,GRD,median
-10.0,36,dB,FRIEN,2017-05-04 05:47:12,VV,A,GRD,mean
-13.25,40,dB,FRIEN,2017-06-01 05:47:12,VV,A,GRD,median
-8.0,40,dB,FRIEN,2018-06-01 05:47:12,VV,A,GRD,median
-9.75,36,dB,FRIEN,2018-04-01 05:47:12,VV,A,GRD,median
-14.0,36,dB,FRIEN,2019-04-01 05:47:12,VV,A,GRD,median
";

    /// In-memory store loaded with the fixtures above.
    pub fn sample_db() -> Database {
        let db = Database::new().unwrap();
        db.load_crop_legend(CROP_LEGEND_CSV).unwrap();
        db.load_areas_of_interest(AREAS_CSV).unwrap();
        db.load_observations(OBSERVATIONS_CSV).unwrap();
        db
    }
}
