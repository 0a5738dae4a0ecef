//! Store location configuration.
//!
//! The location comes from `--db`, then `RCM_DB_PATH`, then
//! [`PERMANENT_DB_PATH`]. While the permanent path is left at its
//! sentinel value the user is asked for a path on every run.

use std::io::{BufRead, Write};
use std::path::PathBuf;

/// Sentinel meaning "no permanent path configured".
pub const UNSET_DB_PATH: &str = "Enter path here";

/// Permanent database path. Set this to skip the path prompt on every run;
/// leave it at [`UNSET_DB_PATH`] to keep prompting.
pub const PERMANENT_DB_PATH: &str = UNSET_DB_PATH;

/// Where the store for this run comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    Path(PathBuf),
    /// Nothing configured; ask the user.
    Prompt,
}

/// Pick the store location from an explicit value or the permanent path.
pub fn resolve_location(explicit: Option<&str>) -> StoreLocation {
    let configured = explicit
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(PERMANENT_DB_PATH);
    if configured == UNSET_DB_PATH {
        StoreLocation::Prompt
    } else {
        StoreLocation::Path(PathBuf::from(configured))
    }
}

/// Ask for a database path. An empty answer means the user has not chosen yet.
pub fn prompt_for_path<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> anyhow::Result<Option<PathBuf>> {
    write!(output, "Please enter path to database: ")?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    let answer = line.trim();
    if answer.is_empty() {
        Ok(None)
    } else {
        Ok(Some(PathBuf::from(answer)))
    }
}
