use std::collections::BTreeMap;

use crate::errors::CoreError;
use crate::models::analytics::{AllocationGroups, AllocationSlice};
use crate::models::chart::{ChartKind, EncodedChart, PieChart, PieSlice};
use crate::providers::traits::ChartRenderer;

/// Generates chart-ready data from the sanitized allocation groups.
///
/// The core computes every number; a [`ChartRenderer`] only draws.
/// One chart is produced per grouping that is present and has a positive total:
/// - `total`: equity / mutual funds / others
/// - `equity`: top equity holdings
/// - `mf`: mutual fund holdings
pub struct ChartService;

impl ChartService {
    pub fn new() -> Self {
        Self
    }

    /// Build a pie chart from labelled amounts.
    ///
    /// Absent and non-positive amounts are left out since they cannot form a
    /// wedge. Returns `None` when nothing with a positive amount remains.
    pub fn pie_chart(
        &self,
        kind: ChartKind,
        slices: &[AllocationSlice<Option<f64>>],
    ) -> Option<PieChart> {
        let usable: Vec<(&str, f64)> = slices
            .iter()
            .filter_map(|s| match s.amount {
                Some(amount) if amount.is_finite() && amount > 0.0 => {
                    Some((s.label.as_str(), amount))
                }
                _ => None,
            })
            .collect();

        let total: f64 = usable.iter().map(|(_, amount)| amount).sum();
        if usable.is_empty() || !total.is_finite() {
            return None;
        }

        let largest = usable
            .iter()
            .map(|(_, amount)| *amount)
            .fold(f64::NEG_INFINITY, f64::max);

        Some(PieChart {
            kind,
            title: kind.title().to_string(),
            slices: usable
                .into_iter()
                .map(|(label, amount)| PieSlice {
                    label: label.to_string(),
                    amount,
                    percent: amount / total * 100.0,
                    exploded: amount == largest,
                })
                .collect(),
        })
    }

    /// All charts worth drawing for these groups, in `total`, `equity`, `mf` order.
    pub fn pie_charts(&self, groups: &AllocationGroups<Option<f64>>) -> Vec<PieChart> {
        let mut charts = Vec::new();

        if let Some(chart) = self.pie_chart(ChartKind::Total, &groups.total.slices()) {
            charts.push(chart);
        }
        if let Some(equity) = &groups.equity {
            if let Some(chart) = self.pie_chart(ChartKind::Equity, equity.slices()) {
                charts.push(chart);
            }
        }
        if let Some(mf) = &groups.mf {
            if let Some(chart) = self.pie_chart(ChartKind::Mf, mf.slices()) {
                charts.push(chart);
            }
        }

        charts
    }

    /// Render every chart, keyed by chart key (`total`, `equity`, `mf`).
    ///
    /// A chart that fails to render is logged and left out; the others still
    /// come back.
    pub fn render_all(
        &self,
        groups: &AllocationGroups<Option<f64>>,
        renderer: &dyn ChartRenderer,
    ) -> BTreeMap<String, EncodedChart> {
        let mut rendered = BTreeMap::new();
        for chart in self.pie_charts(groups) {
            match renderer.render(&chart) {
                Ok(image) => {
                    rendered.insert(chart.kind.key().to_string(), image);
                }
                Err(e) => log::error!("Failed to render '{}' chart: {e}", chart.kind.key()),
            }
        }
        rendered
    }

    /// Render a single chart kind if its grouping is present.
    pub fn render(
        &self,
        groups: &AllocationGroups<Option<f64>>,
        kind: ChartKind,
        renderer: &dyn ChartRenderer,
    ) -> Result<Option<EncodedChart>, CoreError> {
        self.pie_charts(groups)
            .into_iter()
            .find(|c| c.kind == kind)
            .map(|chart| renderer.render(&chart))
            .transpose()
    }
}

impl Default for ChartService {
    fn default() -> Self {
        Self::new()
    }
}
