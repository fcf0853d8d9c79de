use ndarray::Array2;
use serde::{Deserialize, Serialize};

use super::frame;

/// Which scalar gets extracted from each cropped frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryKind {
    /// Total counts; proportional to atom number for a fixed exposure
    PixelSum,
    /// Pixels above the brightness threshold
    BrightPixels,
}

/// Extract the configured scalar from a cropped frame
pub fn summarize(cropped: &Array2<u16>, kind: SummaryKind, threshold: u16) -> f64 {
    match kind {
        SummaryKind::PixelSum => frame::pixel_sum(cropped) as f64,
        SummaryKind::BrightPixels => frame::bright_pixel_count(cropped, threshold) as f64,
    }
}

/// One shot's scalar summary and its place on the x axis.
#[derive(Debug, Clone)]
pub struct ShotSummary {
    /// Title text, shown in grids and logs
    pub title: String,
    /// The sort parameter (wait time, field value); None sorts last
    pub parameter: Option<f64>,
    /// The extracted scalar
    pub value: f64,
}

/// Summaries ordered by parameter, ready to scatter.
#[derive(Debug, Clone, Default)]
pub struct AnalysisSeries {
    summaries: Vec<ShotSummary>,
}

impl AnalysisSeries {
    /// Sort the summaries by parameter ascending. Shots without a parameter
    /// keep their relative order at the end.
    pub fn new(mut summaries: Vec<ShotSummary>) -> Self {
        summaries.sort_by(|a, b| {
            let a_key = a.parameter.unwrap_or(f64::INFINITY);
            let b_key = b.parameter.unwrap_or(f64::INFINITY);
            a_key.partial_cmp(&b_key).unwrap_or(std::cmp::Ordering::Equal)
        });
        Self { summaries }
    }

    /// The (parameter, value) points that can actually be plotted
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.summaries
            .iter()
            .filter_map(|s| s.parameter.map(|p| (p, s.value)))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ShotSummary> {
        self.summaries.iter()
    }

    pub fn len(&self) -> usize {
        self.summaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_summarize_kinds() {
        let cropped = array![[0u16, 250], [300, 10]];
        assert_eq!(summarize(&cropped, SummaryKind::PixelSum, 0), 560.0);
        assert_eq!(summarize(&cropped, SummaryKind::BrightPixels, 200), 2.0);
    }

    #[test]
    fn test_series_sorting() {
        let series = AnalysisSeries::new(vec![
            ShotSummary {
                title: String::from("t=2s"),
                parameter: Some(2.0),
                value: 10.0,
            },
            ShotSummary {
                title: String::from("no param"),
                parameter: None,
                value: 99.0,
            },
            ShotSummary {
                title: String::from("t=1/2"),
                parameter: Some(0.5),
                value: 40.0,
            },
        ]);
        let titles: Vec<&str> = series.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["t=1/2", "t=2s", "no param"]);
        assert_eq!(series.points(), vec![(0.5, 40.0), (2.0, 10.0)]);
    }
}
