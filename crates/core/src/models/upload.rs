use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::errors::CoreError;

use super::analytics::{AllocationGroups, PortfolioTotals};
use super::chart::EncodedChart;
use super::holding::HoldingRow;

/// Body returned for a successfully processed upload.
///
/// Every numeric leaf has already been sanitized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub success: bool,

    /// Identifier for this upload, also attached to log lines
    pub report_id: Uuid,

    pub processed_at: chrono::DateTime<chrono::Utc>,

    pub table_data: Vec<HoldingRow<Option<f64>>>,

    /// Chart key (`total`, `equity`, `mf`) → encoded image
    pub pie_charts: BTreeMap<String, EncodedChart>,

    pub totals: PortfolioTotals<Option<f64>>,

    pub holdings: BTreeMap<String, Option<f64>>,

    pub allocation: AllocationGroups<Option<f64>>,
}

/// Body returned when a request fails.
///
/// `error` is always safe to show; full detail only goes to the log under
/// `reference`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// HTTP-style status code
    pub status: u16,

    pub error: String,

    pub reference: Uuid,
}

impl ErrorResponse {
    pub fn from_error(error: &CoreError, reference: Uuid) -> Self {
        Self {
            status: error.status_code(),
            error: error.user_message(),
            reference,
        }
    }
}
