use admission_engine::scoring::ReferenceData;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) reference_data: Arc<dyn ReferenceData>,
}

impl AppState {
    /// Ready once the listener is bound and the reference database answers.
    pub(crate) async fn is_ready(&self) -> bool {
        if !self.readiness.load(Ordering::Acquire) {
            return false;
        }
        match self.reference_data.ping().await {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(error = %err, "readiness probe could not reach the database");
                false
            }
        }
    }
}
