//! User-facing notices for conditions that do not abort a render.

use rcm_db::query::ResultStatus;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

impl NoticeLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoticeLevel::Info => "info",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// A dependent filter is still empty.
    NoSelection,
    /// Every filter has a value but the combination matched no rows.
    NoData,
    /// A requested parameter has no rows while other parameters do.
    ParameterUnavailable(String),
    /// There is no result yet to derive a date range from.
    DateRangeUnavailable,
    /// The requested date range does not overlap the result; the full range is shown.
    DateRangeOutsideData,
}

impl Notice {
    pub fn level(&self) -> NoticeLevel {
        match self {
            Notice::NoSelection => NoticeLevel::Warning,
            Notice::NoData => NoticeLevel::Error,
            Notice::ParameterUnavailable(_) => NoticeLevel::Warning,
            Notice::DateRangeUnavailable => NoticeLevel::Info,
            Notice::DateRangeOutsideData => NoticeLevel::Warning,
        }
    }

    /// The notice explaining an empty result, if the result is empty.
    pub fn for_status(status: ResultStatus) -> Option<Notice> {
        match status {
            ResultStatus::NoSelection => Some(Notice::NoSelection),
            ResultStatus::NoData => Some(Notice::NoData),
            ResultStatus::Data => None,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Notice::NoSelection => "no_selection",
            Notice::NoData => "no_data",
            Notice::ParameterUnavailable(_) => "parameter_unavailable",
            Notice::DateRangeUnavailable => "date_range_unavailable",
            Notice::DateRangeOutsideData => "date_range_outside_data",
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::NoSelection => {
                write!(f, "No selection has been made. Please select filter combinations.")
            }
            Notice::NoData => write!(
                f,
                "No data is available for this filter combination. Please select other filter combinations."
            ),
            Notice::ParameterUnavailable(parameter) => {
                write!(f, "No data available for parameter {}", parameter)
            }
            Notice::DateRangeUnavailable => write!(
                f,
                "Date range slider is only available after a valid filter combination has been selected"
            ),
            Notice::DateRangeOutsideData => write!(
                f,
                "The selected date range contains no data. Showing the full date range instead."
            ),
        }
    }
}

impl Serialize for Notice {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Notice", 3)?;
        s.serialize_field("kind", self.kind())?;
        s.serialize_field("level", &self.level())?;
        s.serialize_field("message", &self.to_string())?;
        s.end()
    }
}
