//! Filter selection state produced by the selection widgets on every render.
//!
//! Main filters are single-valued. Dependent filters are multi-valued and
//! may be empty; an empty dependent filter is the explicit
//! [`DependentFilter::Unselected`] state, which matches nothing.

use serde::Serialize;

/// A multi-valued filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DependentFilter<T> {
    /// Nothing chosen yet. Matches no rows.
    Unselected,
    /// Non-empty set of accepted values, in the order they were chosen.
    Selected(Vec<T>),
}

impl<T> Default for DependentFilter<T> {
    fn default() -> Self {
        DependentFilter::Unselected
    }
}

impl<T: PartialEq> FromIterator<T> for DependentFilter<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut values: Vec<T> = Vec::new();
        for value in iter {
            if !values.contains(&value) {
                values.push(value);
            }
        }
        if values.is_empty() {
            DependentFilter::Unselected
        } else {
            DependentFilter::Selected(values)
        }
    }
}

impl<T> DependentFilter<T> {
    /// Accepted values; empty when unselected.
    pub fn values(&self) -> &[T] {
        match self {
            DependentFilter::Unselected => &[],
            DependentFilter::Selected(values) => values,
        }
    }

    pub fn is_selected(&self) -> bool {
        matches!(self, DependentFilter::Selected(_))
    }
}

impl<T: PartialEq> DependentFilter<T> {
    pub fn contains(&self, value: &T) -> bool {
        self.values().contains(value)
    }
}

/// The complete set of filter values for one render.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterSelection {
    pub aoi: Option<String>,
    pub year: Option<i32>,
    pub crop_type: Option<String>,
    pub statistic: Option<String>,
    pub acquisitions: DependentFilter<String>,
    pub products: DependentFilter<String>,
    pub parameters: DependentFilter<String>,
    pub fids: DependentFilter<i64>,
}

impl FilterSelection {
    /// Names of the dependent filters that have nothing selected.
    pub fn unselected_filters(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if !self.acquisitions.is_selected() {
            names.push("acquisition");
        }
        if !self.products.is_selected() {
            names.push("product");
        }
        if !self.parameters.is_selected() {
            names.push("parameter");
        }
        if !self.fids.is_selected() {
            names.push("fid");
        }
        names
    }

    /// A selection is complete once every dependent filter has at least one value.
    ///
    /// One empty dependent filter is enough to make the whole selection
    /// incomplete, because its membership test can never match.
    pub fn is_complete(&self) -> bool {
        self.unselected_filters().is_empty()
    }
}
