use std::sync::Arc;

use healthvitals_core::pdf::PdfRenderer;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: healthvitals_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// PDF renderer built from the configured binary and timeout.
    pub fn pdf_renderer(&self) -> PdfRenderer {
        PdfRenderer::new(self.config.pdf.renderer_bin.clone(), self.config.pdf.timeout())
    }
}
