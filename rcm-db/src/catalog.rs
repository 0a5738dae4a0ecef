//! Filter catalog: the distinct legal values of every filterable column.
//!
//! The catalog is read fresh on every render; nothing is cached.

use crate::models::FilterCatalog;
use crate::{Database, Result};
use rusqlite::types::FromSql;

impl Database {
    /// Distinct non-NULL values of one column, sorted ascending.
    ///
    /// `table` and `column` are always compile-time names from this crate,
    /// never user input.
    fn query_distinct<T: FromSql>(&self, table: &str, column: &str) -> Result<Vec<T>> {
        self.query_distinct_as(table, column, column)
    }

    /// Distinct integer values of one column, whatever its declared type.
    fn query_distinct_integer<T: FromSql>(&self, table: &str, column: &str) -> Result<Vec<T>> {
        self.query_distinct_as(table, column, &format!("CAST({column} AS INTEGER)"))
    }

    fn query_distinct_as<T: FromSql>(
        &self,
        table: &str,
        column: &str,
        select: &str,
    ) -> Result<Vec<T>> {
        let sql = format!(
            "SELECT DISTINCT {select} FROM {table} WHERE {column} IS NOT NULL ORDER BY 1"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let values = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<T>, _>>()?;
        log::debug!(
            "[RCM Debug] catalog: {}.{} has {} distinct values",
            table,
            column,
            values.len()
        );
        Ok(values)
    }

    /// Load the distinct values for all eight filters.
    ///
    /// Any store error aborts the whole catalog; a partial catalog is never
    /// returned.
    pub fn query_catalog(&self) -> Result<FilterCatalog> {
        let catalog = FilterCatalog {
            aois: self.query_distinct("areaofinterest", "aoi")?,
            years: self.query_distinct_integer("areaofinterest", "year")?,
            crop_types: self.query_distinct("croplegend", "crop_type")?,
            products: self.query_distinct("s1fieldstatistic", "product")?,
            acquisitions: self.query_distinct("s1fieldstatistic", "acquisition")?,
            parameters: self.query_distinct("s1fieldstatistic", "polarization")?,
            statistics: self.query_distinct("s1fieldstatistic", "statistic")?,
            fids: self.query_distinct_integer("areaofinterest", "fid")?,
        };
        log::info!(
            "[RCM Debug] catalog: {} aois, {} years, {} crop types, {} fields",
            catalog.aois.len(),
            catalog.years.len(),
            catalog.crop_types.len(),
            catalog.fids.len()
        );
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use crate::fixtures::sample_db;
    use crate::{Database, StoreError};

    #[test]
    fn catalog_lists_distinct_values() {
        let db = sample_db();
        let catalog = db.query_catalog().unwrap();
        assert_eq!(catalog.aois, vec!["FRIEN"]);
        assert_eq!(catalog.years, vec![2017, 2018]);
        assert_eq!(catalog.crop_types, vec!["Silage Maize", "Winter Wheat"]);
        assert_eq!(catalog.products, vec!["GRD"]);
        assert_eq!(catalog.acquisitions, vec!["A", "D"]);
        assert_eq!(catalog.parameters, vec!["VH", "VV"]);
        assert_eq!(catalog.statistics, vec!["mean", "median"]);
        assert_eq!(catalog.fids, vec![36, 40]);
    }

    #[test]
    fn empty_store_gives_empty_catalog() {
        let db = Database::new().unwrap();
        let catalog = db.query_catalog().unwrap();
        assert!(catalog.aois.is_empty());
        assert!(catalog.fids.is_empty());
    }

    #[test]
    fn integer_columns_stored_as_text_are_read_as_numbers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("text_columns.db");
        let conn = rusqlite::Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE areaofinterest (fid TEXT, year TEXT, aoi TEXT, sl_nr TEXT,
                                          crop_type_code TEXT, field_geom TEXT);
             CREATE TABLE croplegend (crop_type_code TEXT, crop_type TEXT);
             CREATE TABLE s1fieldstatistic (value REAL, mask_label TEXT, unit TEXT, aoi TEXT,
                                            datetime TEXT, polarization TEXT, acquisition TEXT,
                                            product TEXT, statistic TEXT);
             INSERT INTO areaofinterest VALUES ('36', '2017', 'FRIEN', '1', 'WW', NULL);
             INSERT INTO areaofinterest VALUES ('9', '2018', 'FRIEN', '2', 'WW', NULL);
             INSERT INTO croplegend VALUES ('WW', 'Winter Wheat');
             INSERT INTO s1fieldstatistic VALUES
                 (-12.3456, '36', 'dB', 'FRIEN', '2017-05-04 05:47:12', 'VV', 'A', 'GRD', 'median');",
        )
        .unwrap();
        conn.close().unwrap();

        let db = Database::open(&path).unwrap();
        let catalog = db.query_catalog().unwrap();
        assert_eq!(catalog.years, vec![2017, 2018]);
        assert_eq!(catalog.fids, vec![9, 36]);
        db.close().unwrap();
    }

    #[test]
    fn missing_table_fails_whole_catalog() {
        let db = Database::new().unwrap();
        db.conn.execute_batch("DROP TABLE croplegend;").unwrap();
        let err = db.query_catalog().unwrap_err();
        assert!(matches!(err, StoreError::Query(_)));
    }
}
