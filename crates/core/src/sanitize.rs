//! Transport sanitizing: every NaN or infinite number becomes an absent value.
//!
//! Implemented as a type-changing walk. `f64` leaves become `Option<f64>`,
//! containers map their elements, and the report structures map every numeric
//! field. `Option<f64>` sanitizes to itself (minus any non-finite payload), so
//! applying the walk twice yields the same value as applying it once.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use crate::models::analytics::{
    AllocationGroups, AllocationMap, AllocationSlice, PortfolioResult, PortfolioTotals,
    TotalAllocation,
};
use crate::models::holding::HoldingRow;

pub trait Sanitize {
    type Output;

    fn sanitize(self) -> Self::Output;
}

/// Sanitize any supported structure.
pub fn sanitize<T: Sanitize>(value: T) -> T::Output {
    value.sanitize()
}

impl Sanitize for f64 {
    type Output = Option<f64>;

    fn sanitize(self) -> Option<f64> {
        self.is_finite().then_some(self)
    }
}

impl Sanitize for Option<f64> {
    type Output = Option<f64>;

    fn sanitize(self) -> Option<f64> {
        self.filter(|v| v.is_finite())
    }
}

impl<T: Sanitize> Sanitize for Vec<T> {
    type Output = Vec<T::Output>;

    fn sanitize(self) -> Self::Output {
        self.into_iter().map(Sanitize::sanitize).collect()
    }
}

impl<K: Ord, V: Sanitize> Sanitize for BTreeMap<K, V> {
    type Output = BTreeMap<K, V::Output>;

    fn sanitize(self) -> Self::Output {
        self.into_iter().map(|(k, v)| (k, v.sanitize())).collect()
    }
}

impl<K: Eq + Hash, V: Sanitize> Sanitize for HashMap<K, V> {
    type Output = HashMap<K, V::Output>;

    fn sanitize(self) -> Self::Output {
        self.into_iter().map(|(k, v)| (k, v.sanitize())).collect()
    }
}

impl<N: Sanitize> Sanitize for HoldingRow<N> {
    type Output = HoldingRow<N::Output>;

    fn sanitize(self) -> Self::Output {
        HoldingRow {
            instrument: self.instrument,
            qty: self.qty.sanitize(),
            avg_cost: self.avg_cost.sanitize(),
            ltp: self.ltp.sanitize(),
            invested: self.invested.sanitize(),
            current_value: self.current_value.sanitize(),
            pnl: self.pnl.sanitize(),
            pnl_percent: self.pnl_percent.sanitize(),
            holding_type: self.holding_type,
            extra: self.extra,
        }
    }
}

impl<N: Sanitize> Sanitize for PortfolioTotals<N> {
    type Output = PortfolioTotals<N::Output>;

    fn sanitize(self) -> Self::Output {
        PortfolioTotals {
            total_investment: self.total_investment.sanitize(),
            current_value: self.current_value.sanitize(),
            total_pnl: self.total_pnl.sanitize(),
            pnl_percent: self.pnl_percent.sanitize(),
        }
    }
}

impl<N: Sanitize> Sanitize for TotalAllocation<N> {
    type Output = TotalAllocation<N::Output>;

    fn sanitize(self) -> Self::Output {
        TotalAllocation {
            equity: self.equity.sanitize(),
            mutual_funds: self.mutual_funds.sanitize(),
            others: self.others.sanitize(),
        }
    }
}

impl<N: Sanitize> Sanitize for AllocationSlice<N> {
    type Output = AllocationSlice<N::Output>;

    fn sanitize(self) -> Self::Output {
        AllocationSlice {
            label: self.label,
            amount: self.amount.sanitize(),
        }
    }
}

impl<N: Sanitize> Sanitize for AllocationMap<N> {
    type Output = AllocationMap<N::Output>;

    fn sanitize(self) -> Self::Output {
        self.into_iter()
            .map(|slice| (slice.label, slice.amount.sanitize()))
            .collect()
    }
}

impl<N: Sanitize> Sanitize for AllocationGroups<N> {
    type Output = AllocationGroups<N::Output>;

    fn sanitize(self) -> Self::Output {
        AllocationGroups {
            total: self.total.sanitize(),
            equity: self.equity.map(Sanitize::sanitize),
            mf: self.mf.map(Sanitize::sanitize),
        }
    }
}

impl<N: Sanitize> Sanitize for PortfolioResult<N> {
    type Output = PortfolioResult<N::Output>;

    fn sanitize(self) -> Self::Output {
        PortfolioResult {
            table_data: self.table_data.sanitize(),
            totals: self.totals.sanitize(),
            allocation: self.allocation.sanitize(),
            holdings: self.holdings.sanitize(),
        }
    }
}
