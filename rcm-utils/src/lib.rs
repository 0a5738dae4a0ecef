//! Shared utility functions for RCM crates.

/// Date utility functions
pub mod dates {
    use chrono::{NaiveDate, NaiveDateTime};

    /// Format a NaiveDate as "YYYY-MM-DD"
    pub fn format_date(date: &NaiveDate) -> String {
        date.format("%Y-%m-%d").to_string()
    }

    /// Format a NaiveDate the way the date range control shows it ("DD.MM.YY")
    pub fn format_date_short(date: &NaiveDate) -> String {
        date.format("%d.%m.%y").to_string()
    }

    /// Parse a date string in "YYYY-MM-DD" format
    pub fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
        Ok(NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")?)
    }

    /// Parse a stored observation timestamp and drop the time of day.
    ///
    /// Accepts the timestamp layouts SQLite's date functions understand:
    /// `YYYY-MM-DD`, `YYYY-MM-DD HH:MM[:SS[.fff]]` and the same with a `T`
    /// separator.
    pub fn parse_timestamp_date(s: &str) -> anyhow::Result<NaiveDate> {
        let s = s.trim();
        const LAYOUTS: [&str; 4] = [
            "%Y-%m-%d %H:%M:%S%.f",
            "%Y-%m-%dT%H:%M:%S%.f",
            "%Y-%m-%d %H:%M",
            "%Y-%m-%dT%H:%M",
        ];
        for layout in LAYOUTS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, layout) {
                return Ok(dt.date());
            }
        }
        parse_date(s)
    }

    /// Day number of a date, counted from 1970-01-01.
    ///
    /// Used as the numeric x coordinate for trendline fitting.
    pub fn day_number(date: &NaiveDate) -> f64 {
        (*date - NaiveDate::default()).num_days() as f64
    }

    /// Inverse of [`day_number`], rounding to the nearest whole day.
    pub fn date_from_day_number(day: f64) -> Option<NaiveDate> {
        NaiveDate::default().checked_add_signed(chrono::Duration::days(day.round() as i64))
    }

}

/// Display labels for raw catalog codes.
///
/// Some codes stored in the database are abbreviations (acquisition pass
/// direction, area of interest names). Selection widgets show the long
/// label; the raw code is restored before it is bound into a query.
pub mod labels {
    /// Raw code to display label. Both columns must stay free of duplicates
    /// and no label may equal another entry's code.
    pub const DISPLAY_LABELS: &[(&str, &str)] = &[
        ("A", "Ascending"),
        ("D", "Descending"),
        ("FRIEN", "Frienstedt"),
    ];

    /// Label shown for a raw code. Codes without an entry are shown as is.
    pub fn to_display(raw: &str) -> String {
        DISPLAY_LABELS
            .iter()
            .find(|(code, _)| *code == raw)
            .map(|(_, label)| label.to_string())
            .unwrap_or_else(|| raw.to_string())
    }

    /// Raw code for a label chosen by the user. Raw codes pass through.
    pub fn to_raw(display: &str) -> String {
        DISPLAY_LABELS
            .iter()
            .find(|(_, label)| *label == display)
            .map(|(code, _)| code.to_string())
            .unwrap_or_else(|| display.to_string())
    }

}
