use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::holding::HoldingRow;

/// Portfolio-level totals over every row.
///
/// Fields default when missing so partial totals sent back by a client still
/// deserialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioTotals<N = f64> {
    /// Σ invested
    #[serde(default)]
    pub total_investment: N,

    /// Σ current_value
    #[serde(default)]
    pub current_value: N,

    /// Σ pnl
    #[serde(default)]
    pub total_pnl: N,

    /// total_pnl / total_investment × 100 (undefined when nothing was invested)
    #[serde(default)]
    pub pnl_percent: N,
}

/// The `total` allocation: invested amounts per broad category.
///
/// `others` is computed as the remainder so the three buckets always add up to
/// the portfolio's total investment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TotalAllocation<N = f64> {
    #[serde(rename = "EQUITY")]
    pub equity: N,

    #[serde(rename = "MUTUAL_FUNDS")]
    pub mutual_funds: N,

    #[serde(rename = "OTHERS")]
    pub others: N,
}

/// One labelled amount in an allocation breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationSlice<N = f64> {
    pub label: String,
    pub amount: N,
}

impl<N> AllocationSlice<N> {
    pub fn new(label: impl Into<String>, amount: N) -> Self {
        Self {
            label: label.into(),
            amount,
        }
    }
}

/// Label → amount mapping that remembers insertion order.
///
/// Serializes as a JSON object with entries in insertion order. Inserting an
/// existing label replaces its amount and keeps its original position.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationMap<N = f64> {
    entries: Vec<AllocationSlice<N>>,
}

impl<N> AllocationMap<N> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Insert or overwrite `label`, returning the amount it replaced.
    pub fn insert(&mut self, label: impl Into<String>, amount: N) -> Option<N> {
        let label = label.into();
        match self.entries.iter_mut().find(|e| e.label == label) {
            Some(entry) => Some(std::mem::replace(&mut entry.amount, amount)),
            None => {
                self.entries.push(AllocationSlice::new(label, amount));
                None
            }
        }
    }

    pub fn get(&self, label: &str) -> Option<&N> {
        self.entries
            .iter()
            .find(|e| e.label == label)
            .map(|e| &e.amount)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn slices(&self) -> &[AllocationSlice<N>] {
        &self.entries
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.label.as_str())
    }
}

impl<N> Default for AllocationMap<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N, L: Into<String>> FromIterator<(L, N)> for AllocationMap<N> {
    fn from_iter<I: IntoIterator<Item = (L, N)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (label, amount) in iter {
            map.insert(label, amount);
        }
        map
    }
}

impl<N> IntoIterator for AllocationMap<N> {
    type Item = AllocationSlice<N>;
    type IntoIter = std::vec::IntoIter<AllocationSlice<N>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<N: Serialize> Serialize for AllocationMap<N> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.label, &entry.amount)?;
        }
        map.end()
    }
}

impl<'de, N: Deserialize<'de>> Deserialize<'de> for AllocationMap<N> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::{MapAccess, Visitor};
        use std::marker::PhantomData;

        struct AllocationMapVisitor<N>(PhantomData<N>);

        impl<'de, N: Deserialize<'de>> Visitor<'de> for AllocationMapVisitor<N> {
            type Value = AllocationMap<N>;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a map of labels to amounts")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut map = AllocationMap::new();
                while let Some((label, amount)) = access.next_entry::<String, N>()? {
                    map.insert(label, amount);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(AllocationMapVisitor(PhantomData))
    }
}

/// Grouped allocation breakdowns ready for charting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "N: Serialize",
    deserialize = "N: Deserialize<'de> + Default"
))]
pub struct AllocationGroups<N = f64> {
    pub total: TotalAllocation<N>,

    /// Largest equity holdings by invested amount, largest first; a repeated
    /// instrument keeps its first position and its later row's amount.
    /// `None` when the portfolio holds no equity rows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equity: Option<AllocationMap<N>>,

    /// Every mutual fund holding in file order, last row winning for a
    /// repeated instrument.
    /// `None` unless at least one fund row exists and their invested sum is positive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mf: Option<AllocationMap<N>>,
}

impl TotalAllocation<Option<f64>> {
    /// Slices in display order, labelled for the allocation chart.
    pub fn slices(&self) -> Vec<AllocationSlice<Option<f64>>> {
        vec![
            AllocationSlice::new("EQUITY", self.equity),
            AllocationSlice::new("MUTUAL FUNDS", self.mutual_funds),
            AllocationSlice::new("OTHERS", self.others),
        ]
    }
}

/// Everything the pipeline produces for one uploaded file.
///
/// `PortfolioResult<f64>` is the raw computation; [`PortfolioReport`] is the same
/// structure after sanitizing, with `None` wherever a value was NaN or infinite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "N: Serialize",
    deserialize = "N: Deserialize<'de> + Default"
))]
pub struct PortfolioResult<N = f64> {
    /// Every input row with its derived fields, in file order
    pub table_data: Vec<HoldingRow<N>>,

    pub totals: PortfolioTotals<N>,

    pub allocation: AllocationGroups<N>,

    /// Upper-cased instrument name → invested amount
    pub holdings: BTreeMap<String, N>,
}

/// Sanitized pipeline output, safe to hand to any serializer.
pub type PortfolioReport = PortfolioResult<Option<f64>>;
