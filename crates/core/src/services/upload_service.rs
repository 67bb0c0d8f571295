use chrono::Utc;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::settings::Settings;
use crate::models::upload::{ErrorResponse, UploadResponse};
use crate::providers::svg_chart::SvgPieRenderer;
use crate::providers::traits::ChartRenderer;
use crate::sanitize::Sanitize;
use crate::services::analytics_service::AnalyticsService;
use crate::services::chart_service::ChartService;
use crate::services::import_service::ImportService;

/// Accepted upload extension (compared case-insensitively).
pub const CSV_EXTENSION: &str = ".csv";

/// Handles one uploaded holdings file end to end: validate, parse, aggregate,
/// sanitize, chart.
///
/// Transport-agnostic: the HTTP layer hands over the file name and bytes and
/// serializes whatever comes back.
pub struct UploadService {
    import_service: ImportService,
    analytics_service: AnalyticsService,
    chart_service: ChartService,
    renderer: Box<dyn ChartRenderer>,
    max_upload_bytes: usize,
}

impl UploadService {
    pub fn new(settings: &Settings) -> Self {
        Self::with_renderer(settings, Box::new(SvgPieRenderer::new()))
    }

    pub fn with_renderer(settings: &Settings, renderer: Box<dyn ChartRenderer>) -> Self {
        Self {
            import_service: ImportService::new(),
            analytics_service: AnalyticsService::with_top_equity_holdings(
                settings.top_equity_holdings,
            ),
            chart_service: ChartService::new(),
            renderer,
            max_upload_bytes: settings.max_upload_bytes,
        }
    }

    /// Reject uploads that are missing, not CSV, or too large.
    pub fn validate(&self, filename: Option<&str>, bytes: &[u8]) -> Result<(), CoreError> {
        let filename = filename.ok_or(CoreError::NoFile)?;
        if filename.trim().is_empty() {
            return Err(CoreError::NoFilename);
        }
        if !filename.to_lowercase().ends_with(CSV_EXTENSION) {
            return Err(CoreError::InvalidFileType(filename.to_string()));
        }
        if bytes.len() > self.max_upload_bytes {
            return Err(CoreError::FileTooLarge {
                size: bytes.len(),
                limit: self.max_upload_bytes,
            });
        }
        Ok(())
    }

    /// Process an upload into the success body.
    ///
    /// A chart that fails to render is dropped from `pie_charts`; every other
    /// failure is returned.
    pub fn process(
        &self,
        filename: Option<&str>,
        bytes: &[u8],
    ) -> Result<UploadResponse, CoreError> {
        self.validate(filename, bytes)?;

        let rows = self.import_service.import(bytes)?;
        let report = self.analytics_service.summarize(rows).sanitize();
        let pie_charts = self
            .chart_service
            .render_all(&report.allocation, self.renderer.as_ref());

        Ok(UploadResponse {
            success: true,
            report_id: Uuid::new_v4(),
            processed_at: Utc::now(),
            table_data: report.table_data,
            pie_charts,
            totals: report.totals,
            holdings: report.holdings,
            allocation: report.allocation,
        })
    }

    /// Like [`UploadService::process`], but failures come back as a caller-safe
    /// [`ErrorResponse`]. The full error is logged under the response's reference.
    pub fn respond(
        &self,
        filename: Option<&str>,
        bytes: &[u8],
    ) -> Result<UploadResponse, ErrorResponse> {
        match self.process(filename, bytes) {
            Ok(response) => {
                log::info!(
                    "[{}] Processed {} ({} rows, {} charts)",
                    response.report_id,
                    filename.unwrap_or_default(),
                    response.table_data.len(),
                    response.pie_charts.len()
                );
                Ok(response)
            }
            Err(e) => {
                let reference = Uuid::new_v4();
                if e.is_client_error() {
                    log::warn!("[{reference}] Rejected upload {filename:?}: {e}");
                } else {
                    log::error!("[{reference}] Processing error for {filename:?}: {e}");
                }
                Err(ErrorResponse::from_error(&e, reference))
            }
        }
    }
}
