use metrics_exporter_prometheus::PrometheusHandle;
use redacai::config::AppConfig;
use redacai::workflows::correction::{
    EvaluationController, FileQuotaStore, HttpEvaluationClient, StaticSession,
};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type AppController =
    EvaluationController<FileQuotaStore, HttpEvaluationClient, StaticSession>;

/// Wires the controller to the configured data directory, webhook and session identity.
pub(crate) fn build_controller(config: &AppConfig) -> AppController {
    let store = Arc::new(FileQuotaStore::new(&config.quota.storage_dir));
    let client = Arc::new(HttpEvaluationClient::new(
        config.evaluation.endpoint.clone(),
    ));
    let sessions = Arc::new(StaticSession::new(config.session.user.clone()));
    EvaluationController::new(store, client, sessions, &config.quota)
}
