//! Command line filter selection.

use clap::Args;
use rcm_db::models::FilterCatalog;
use rcm_db::selection::FilterSelection;
use rcm_utils::labels::to_raw;

/// Filter values as given on the command line.
///
/// Main filters left out default to the first catalog value, the way a
/// select box starts on its first option. Codes may be given as display
/// labels (`Ascending`, `Frienstedt`).
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Area of interest
    #[arg(long)]
    pub aoi: Option<String>,

    /// Year of the field boundaries
    #[arg(long)]
    pub year: Option<i32>,

    /// Crop type name
    #[arg(long = "crop-type")]
    pub crop_type: Option<String>,

    /// Statistic (mean, median, std, ...)
    #[arg(long)]
    pub statistic: Option<String>,

    /// Acquisition mode(s); repeat or separate with commas
    #[arg(long = "acquisition", value_delimiter = ',')]
    pub acquisitions: Vec<String>,

    /// Product(s)
    #[arg(long = "product", value_delimiter = ',')]
    pub products: Vec<String>,

    /// Parameter(s): VV, VH, NDVI
    #[arg(long = "parameter", value_delimiter = ',')]
    pub parameters: Vec<String>,

    /// Field id(s)
    #[arg(long = "fid", value_delimiter = ',')]
    pub fids: Vec<i64>,
}

fn raw_codes(values: &[String]) -> impl Iterator<Item = String> + '_ {
    values.iter().map(|v| to_raw(v.trim()))
}

impl FilterArgs {
    /// Turn the arguments into a selection, filling main filters from the catalog.
    pub fn resolve(&self, catalog: &FilterCatalog) -> FilterSelection {
        FilterSelection {
            aoi: self
                .aoi
                .as_deref()
                .map(to_raw)
                .or_else(|| catalog.aois.first().cloned()),
            year: self.year.or_else(|| catalog.years.first().copied()),
            crop_type: self
                .crop_type
                .clone()
                .or_else(|| catalog.crop_types.first().cloned()),
            statistic: self
                .statistic
                .clone()
                .or_else(|| catalog.statistics.first().cloned()),
            acquisitions: raw_codes(&self.acquisitions).collect(),
            products: raw_codes(&self.products).collect(),
            parameters: raw_codes(&self.parameters).collect(),
            fids: self.fids.iter().copied().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rcm_db::selection::DependentFilter;

    fn catalog() -> FilterCatalog {
        FilterCatalog {
            aois: vec!["FRIEN".into()],
            years: vec![2017, 2018],
            crop_types: vec!["Silage Maize".into(), "Winter Wheat".into()],
            products: vec!["GRD".into()],
            acquisitions: vec!["A".into(), "D".into()],
            parameters: vec!["VH".into(), "VV".into()],
            statistics: vec!["mean".into(), "median".into()],
            fids: vec![36, 40],
        }
    }

    #[test]
    fn main_filters_default_to_first_catalog_value() {
        let selection = FilterArgs::default().resolve(&catalog());
        assert_eq!(selection.aoi.as_deref(), Some("FRIEN"));
        assert_eq!(selection.year, Some(2017));
        assert_eq!(selection.crop_type.as_deref(), Some("Silage Maize"));
        assert_eq!(selection.statistic.as_deref(), Some("mean"));
        assert!(!selection.is_complete());
    }

    #[test]
    fn display_labels_map_back_to_codes() {
        let args = FilterArgs {
            aoi: Some("Frienstedt".into()),
            acquisitions: vec!["Ascending".into(), "D".into()],
            products: vec!["GRD".into()],
            parameters: vec!["VV".into()],
            fids: vec![36],
            ..FilterArgs::default()
        };
        let selection = args.resolve(&catalog());
        assert_eq!(selection.aoi.as_deref(), Some("FRIEN"));
        assert_eq!(
            selection.acquisitions,
            DependentFilter::Selected(vec!["A".to_string(), "D".to_string()])
        );
        assert!(selection.is_complete());
    }

    #[test]
    fn empty_catalog_leaves_main_filters_unset() {
        let selection = FilterArgs::default().resolve(&FilterCatalog::default());
        assert_eq!(selection.aoi, None);
        assert_eq!(selection.year, None);
    }
}
