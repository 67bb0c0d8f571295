use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::models::analytics::{
    AllocationGroups, AllocationMap, PortfolioResult, PortfolioTotals, TotalAllocation,
};
use crate::models::holding::{HoldingCategory, HoldingRow};
use crate::models::settings::DEFAULT_TOP_EQUITY_HOLDINGS;

/// Sum that skips NaN, so a single unparseable-as-finite row does not blank
/// out a whole aggregate. Infinities still propagate.
///
/// Folds from `+0.0`, so an empty sum is never `-0.0`.
fn nan_sum<I: IntoIterator<Item = f64>>(values: I) -> f64 {
    values
        .into_iter()
        .filter(|v| !v.is_nan())
        .fold(0.0, |acc, v| acc + v)
}

/// Computes portfolio aggregates: totals, allocation groups, holdings map.
///
/// Pure business logic over already-derived rows. No I/O.
pub struct AnalyticsService {
    top_equity_holdings: usize,
}

impl AnalyticsService {
    pub fn new() -> Self {
        Self::with_top_equity_holdings(DEFAULT_TOP_EQUITY_HOLDINGS)
    }

    /// Keep `limit` entries in the equity breakdown instead of the default ten.
    pub fn with_top_equity_holdings(limit: usize) -> Self {
        Self {
            top_equity_holdings: limit,
        }
    }

    /// Sum invested, current value and P&L over every row.
    ///
    /// `pnl_percent` is left as the raw quotient; with nothing invested it is
    /// NaN or infinite and becomes absent once sanitized.
    pub fn totals(&self, rows: &[HoldingRow]) -> PortfolioTotals {
        let total_investment = nan_sum(rows.iter().map(|r| r.invested));
        let current_value = nan_sum(rows.iter().map(|r| r.current_value));
        let total_pnl = nan_sum(rows.iter().map(|r| r.pnl));

        PortfolioTotals {
            total_investment,
            current_value,
            total_pnl,
            pnl_percent: total_pnl / total_investment * 100.0,
        }
    }

    /// Build the `total`, `equity` and `mf` groupings.
    ///
    /// - `total.others` is the remainder after equity and funds, so the three
    ///   buckets always add up to `total_investment`.
    /// - `equity` maps the largest holdings by invested amount; ties keep file order.
    /// - `mf` maps every fund row, but only if their invested sum is positive.
    ///
    /// Both are keyed by instrument; when an instrument repeats, the later row's
    /// amount replaces the earlier one in place.
    pub fn allocation(&self, rows: &[HoldingRow], totals: &PortfolioTotals) -> AllocationGroups {
        let equity_rows: Vec<&HoldingRow> = rows
            .iter()
            .filter(|r| r.category() == HoldingCategory::Equity)
            .collect();
        let mf_rows: Vec<&HoldingRow> = rows
            .iter()
            .filter(|r| r.category() == HoldingCategory::MutualFund)
            .collect();

        let equity_sum = nan_sum(equity_rows.iter().map(|r| r.invested));
        let mf_sum = nan_sum(mf_rows.iter().map(|r| r.invested));

        let total = TotalAllocation {
            equity: equity_sum,
            mutual_funds: mf_sum,
            others: totals.total_investment - equity_sum - mf_sum,
        };

        let equity = if equity_rows.is_empty() {
            None
        } else {
            Some(self.top_equity(&equity_rows))
        };

        let mf = if !mf_rows.is_empty() && mf_sum > 0.0 {
            Some(
                mf_rows
                    .iter()
                    .map(|r| (r.instrument.clone(), r.invested))
                    .collect(),
            )
        } else {
            None
        };

        AllocationGroups { total, equity, mf }
    }

    fn top_equity(&self, equity_rows: &[&HoldingRow]) -> AllocationMap {
        let mut ranked: Vec<&HoldingRow> = equity_rows
            .iter()
            .copied()
            .filter(|r| !r.invested.is_nan())
            .collect();
        // sort_by is stable: equal amounts stay in file order
        ranked.sort_by(|a, b| b.invested.partial_cmp(&a.invested).unwrap_or(Ordering::Equal));
        ranked.truncate(self.top_equity_holdings);
        ranked
            .into_iter()
            .map(|r| (r.instrument.clone(), r.invested))
            .collect()
    }

    /// Upper-cased instrument → invested amount. Repeated instruments are summed.
    pub fn holdings_map(&self, rows: &[HoldingRow]) -> BTreeMap<String, f64> {
        let mut holdings = BTreeMap::new();
        for row in rows {
            *holdings.entry(row.instrument.to_uppercase()).or_insert(0.0) += row.invested;
        }
        holdings
    }

    /// Aggregate a full set of rows into the pipeline result.
    pub fn summarize(&self, rows: Vec<HoldingRow>) -> PortfolioResult {
        let totals = self.totals(&rows);
        let allocation = self.allocation(&rows, &totals);
        let holdings = self.holdings_map(&rows);

        log::debug!(
            "Summarized {} holdings: invested {:.2}, current {:.2}, {} equity / {} fund slices",
            rows.len(),
            totals.total_investment,
            totals.current_value,
            allocation.equity.as_ref().map_or(0, AllocationMap::len),
            allocation.mf.as_ref().map_or(0, AllocationMap::len),
        );

        PortfolioResult {
            table_data: rows,
            totals,
            allocation,
            holdings,
        }
    }
}

impl Default for AnalyticsService {
    fn default() -> Self {
        Self::new()
    }
}
