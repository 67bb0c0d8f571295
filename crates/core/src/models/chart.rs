use serde::{Deserialize, Serialize};

/// Which allocation grouping a chart depicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    /// Equity / mutual funds / others split
    Total,
    /// Top equity holdings
    Equity,
    /// Mutual fund holdings
    Mf,
}

impl ChartKind {
    pub fn title(&self) -> &'static str {
        match self {
            ChartKind::Total => "Total Portfolio Allocation",
            ChartKind::Equity => "Equity Holdings Breakdown",
            ChartKind::Mf => "Mutual Fund Holdings Breakdown",
        }
    }

    /// Key used for this chart in the upload response.
    pub fn key(&self) -> &'static str {
        match self {
            ChartKind::Total => "total",
            ChartKind::Equity => "equity",
            ChartKind::Mf => "mf",
        }
    }
}

/// A single wedge of a pie chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieSlice {
    pub label: String,

    pub amount: f64,

    /// Share of the chart total, in percent
    pub percent: f64,

    /// Pulled out from the centre; set on the largest wedge(s)
    pub exploded: bool,
}

/// Renderer-agnostic pie chart description.
///
/// The core computes the numbers; a [`crate::providers::traits::ChartRenderer`]
/// turns them into an image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieChart {
    pub kind: ChartKind,
    pub title: String,
    pub slices: Vec<PieSlice>,
}

impl PieChart {
    pub fn total(&self) -> f64 {
        self.slices.iter().map(|s| s.amount).sum()
    }
}

/// An encoded chart image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedChart {
    /// e.g. `image/svg+xml`
    pub mime_type: String,

    /// Base64 (standard alphabet, padded) image bytes
    pub data: String,
}
