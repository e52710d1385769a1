use std::sync::Arc;

use crate::workflow_client::ShiftGenerator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Source of raw shift text. Default: the streaming `WorkflowClient`.
    pub generator: Arc<dyn ShiftGenerator>,
}
