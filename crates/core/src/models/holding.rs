use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Substrings (matched case-insensitively) that mark an instrument as a mutual fund
/// when the export carries no `type` column.
pub const MUTUAL_FUND_MARKERS: [&str; 3] = ["MF", "MUTUAL", "FUND"];

/// Allocation bucket a holding falls into.
///
/// Derived from the row's type label; labels other than `EQUITY` and `MF`
/// (compared case-insensitively) land in `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HoldingCategory {
    Equity,
    MutualFund,
    Other,
}

impl HoldingCategory {
    /// Map a type label (supplied or derived) onto a category.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_uppercase().as_str() {
            "EQUITY" => HoldingCategory::Equity,
            "MF" => HoldingCategory::MutualFund,
            _ => HoldingCategory::Other,
        }
    }

    /// Canonical type label written into rows whose type was derived.
    pub fn label(&self) -> &'static str {
        match self {
            HoldingCategory::Equity => "EQUITY",
            HoldingCategory::MutualFund => "MF",
            HoldingCategory::Other => "OTHER",
        }
    }
}

impl std::fmt::Display for HoldingCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify an instrument by name: mutual fund if the upper-cased name contains
/// any of [`MUTUAL_FUND_MARKERS`], equity otherwise.
pub fn classify_instrument(instrument: &str) -> HoldingCategory {
    let upper = instrument.to_uppercase();
    if MUTUAL_FUND_MARKERS.iter().any(|m| upper.contains(m)) {
        HoldingCategory::MutualFund
    } else {
        HoldingCategory::Equity
    }
}

/// One line of the holdings export, with its derived metrics.
///
/// `N` is the numeric leaf type: `f64` while computing, `Option<f64>` once the
/// row has been sanitized for transport (`None` marks an absent value).
/// Field names follow the normalized export columns so the serialized row reads
/// like the table the user uploaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingRow<N = f64> {
    pub instrument: String,

    pub qty: N,

    #[serde(rename = "avg cost")]
    pub avg_cost: N,

    /// Last traded price per unit
    pub ltp: N,

    /// `qty * avg cost`
    pub invested: N,

    /// `qty * ltp`
    pub current_value: N,

    /// `current_value - invested`
    pub pnl: N,

    /// `pnl / invested * 100`; non-finite whenever `invested` is zero
    pub pnl_percent: N,

    /// Type label as supplied by the export, or derived from the instrument name
    #[serde(rename = "type")]
    pub holding_type: String,

    /// Any other export columns, carried through untouched
    #[serde(flatten, default)]
    pub extra: BTreeMap<String, String>,
}

impl HoldingRow<f64> {
    /// Build a row and compute its derived fields.
    ///
    /// A `holding_type` of `None` is derived from the instrument name; a supplied
    /// label is trusted and kept verbatim.
    pub fn new(
        instrument: impl Into<String>,
        qty: f64,
        avg_cost: f64,
        ltp: f64,
        holding_type: Option<String>,
    ) -> Self {
        let instrument = instrument.into();
        let holding_type = holding_type
            .unwrap_or_else(|| classify_instrument(&instrument).label().to_string());

        let invested = qty * avg_cost;
        let current_value = qty * ltp;
        let pnl = current_value - invested;

        Self {
            instrument,
            qty,
            avg_cost,
            ltp,
            invested,
            current_value,
            pnl,
            pnl_percent: pnl / invested * 100.0,
            holding_type,
            extra: BTreeMap::new(),
        }
    }

    /// Attach passthrough columns.
    pub fn with_extra(mut self, extra: BTreeMap<String, String>) -> Self {
        self.extra = extra;
        self
    }
}

impl<N> HoldingRow<N> {
    pub fn category(&self) -> HoldingCategory {
        HoldingCategory::from_label(&self.holding_type)
    }
}
