//! Per-parameter chart panels and their axis labels.

use crate::notice::Notice;
use crate::shaper::{DateBounds, ShapedRecords};

/// Statistics whose values are physical backscatter or index values.
pub const PHYSICAL_STATISTICS: [&str; 4] = ["mean", "median", "std", "mode_value_1"];

/// Parameter name of the vegetation index.
pub const NDVI: &str = "NDVI";

/// Y-axis label for a parameter under the selected statistic.
pub fn axis_label(statistic: &str, parameter: &str) -> &'static str {
    if !PHYSICAL_STATISTICS.iter().any(|s| *s == statistic) {
        "Value"
    } else if parameter == NDVI {
        "NDVI value"
    } else {
        "Backscatter [dB]"
    }
}

/// Chart title for a parameter.
pub fn chart_title(parameter: &str) -> String {
    match parameter {
        "VV" => "VV Polarisation".to_string(),
        "VH" => "VH Polarisation".to_string(),
        other => other.to_string(),
    }
}

/// One chart's worth of data: a single parameter over the active date range.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterPanel {
    pub parameter: String,
    pub title: String,
    pub y_axis_label: &'static str,
    /// X-axis extent, taken from the whole range-filtered result so all panels line up.
    pub domain: DateBounds,
    pub records: ShapedRecords,
}

/// Split the (range-filtered) result into one panel per requested parameter.
///
/// A requested parameter without rows gets a [`Notice::ParameterUnavailable`]
/// when other rows exist; an empty result produces neither panels nor
/// notices, since the empty result already has its own notice.
pub fn collect_panels(
    records: &ShapedRecords,
    requested: &[String],
    statistic: &str,
) -> (Vec<ParameterPanel>, Vec<Notice>) {
    let mut panels = Vec::new();
    let mut notices = Vec::new();

    let Some(domain) = records.date_bounds() else {
        return (panels, notices);
    };

    for parameter in requested {
        let subset = records.partition(parameter);
        if subset.is_empty() {
            log::info!("[RCM Debug] panels: no rows for parameter {}", parameter);
            notices.push(Notice::ParameterUnavailable(parameter.clone()));
            continue;
        }
        panels.push(ParameterPanel {
            parameter: parameter.clone(),
            title: chart_title(parameter),
            y_axis_label: axis_label(statistic, parameter),
            domain,
            records: subset,
        });
    }

    (panels, notices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::record;
    use chrono::NaiveDate;

    fn requested(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn axis_labels_follow_statistic() {
        assert_eq!(axis_label("median", "VV"), "Backscatter [dB]");
        assert_eq!(axis_label("mode_value_1", "VH"), "Backscatter [dB]");
        assert_eq!(axis_label("mean", "NDVI"), "NDVI value");
        assert_eq!(axis_label("count", "VV"), "Value");
        assert_eq!(axis_label("count", "NDVI"), "Value");
    }

    #[test]
    fn titles_for_known_and_other_parameters() {
        assert_eq!(chart_title("VV"), "VV Polarisation");
        assert_eq!(chart_title("VH"), "VH Polarisation");
        assert_eq!(chart_title("NDVI"), "NDVI");
        assert_eq!(chart_title("HH"), "HH");
    }

    #[test]
    fn unavailable_parameter_warns_while_others_render() {
        let records = ShapedRecords::from_records(vec![
            record("2017-05-04 05:47:12", "VV", -12.35),
            record("2017-06-01 05:47:12", "VV", -11.0),
        ]);
        let (panels, notices) = collect_panels(&records, &requested(&["VV", "NDVI"]), "median");

        assert_eq!(panels.len(), 1);
        assert_eq!(panels[0].parameter, "VV");
        assert_eq!(panels[0].title, "VV Polarisation");
        assert_eq!(panels[0].y_axis_label, "Backscatter [dB]");
        assert_eq!(panels[0].records.len(), 2);
        assert_eq!(
            panels[0].domain,
            DateBounds::new(
                NaiveDate::from_ymd_opt(2017, 5, 4).unwrap(),
                NaiveDate::from_ymd_opt(2017, 6, 1).unwrap()
            )
        );
        assert_eq!(notices, vec![Notice::ParameterUnavailable("NDVI".to_string())]);
    }

    #[test]
    fn panels_share_the_overall_domain() {
        let records = ShapedRecords::from_records(vec![
            record("2017-03-01 05:47:12", "VH", -18.0),
            record("2017-05-04 05:47:12", "VV", -12.35),
            record("2017-09-01 05:47:12", "VH", -17.0),
        ]);
        let (panels, notices) = collect_panels(&records, &requested(&["VV", "VH"]), "mean");
        assert!(notices.is_empty());
        assert_eq!(panels.len(), 2);
        assert_eq!(panels[0].domain, panels[1].domain);
        assert_eq!(panels[0].domain, records.date_bounds().unwrap());
    }

    #[test]
    fn empty_result_has_no_panels_and_no_warnings() {
        let (panels, notices) =
            collect_panels(&ShapedRecords::default(), &requested(&["VV", "NDVI"]), "median");
        assert!(panels.is_empty());
        assert!(notices.is_empty());
    }
}
