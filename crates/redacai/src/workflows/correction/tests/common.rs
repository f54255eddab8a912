use std::collections::VecDeque;
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use chrono::{Duration, NaiveDate};
use serde_json::Value;
use tokio::sync::Notify;

use crate::config::QuotaConfig;
use crate::workflows::correction::client::{EvaluationError, EvaluationGateway};
use crate::workflows::correction::domain::{EvaluationRequest, EvaluationResult, UsageRecord};
use crate::workflows::correction::quota::{Clock, MemoryQuotaStore, QuotaStore, QuotaStoreError};
use crate::workflows::correction::session::{Session, SessionProvider};
use crate::workflows::correction::EvaluationController;

pub(super) fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 5, d).expect("valid date")
}

pub(super) fn quota_config(limit: u32) -> QuotaConfig {
    QuotaConfig::with_daily_limit(NonZeroU32::new(limit).expect("positive limit"))
}

pub(super) fn sample_result() -> EvaluationResult {
    EvaluationResult::compose(
        Some(860),
        Some("Tese clara logo na introdução.".to_string()),
        Some("Varie o vocabulário.".to_string()),
        None,
    )
}

pub(super) struct ManualClock {
    today: Mutex<NaiveDate>,
}

impl ManualClock {
    pub(super) fn new(today: NaiveDate) -> Self {
        Self {
            today: Mutex::new(today),
        }
    }

    pub(super) fn advance_days(&self, days: i64) {
        let mut guard = self.today.lock().expect("clock mutex poisoned");
        *guard += Duration::days(days);
    }
}

impl Clock for ManualClock {
    fn today(&self) -> NaiveDate {
        *self.today.lock().expect("clock mutex poisoned")
    }
}

/// Replays queued outcomes; succeeds with [`sample_result`] once the queue is drained.
#[derive(Default)]
pub(super) struct ScriptedGateway {
    outcomes: Mutex<VecDeque<Result<EvaluationResult, EvaluationError>>>,
    requests: Mutex<Vec<String>>,
}

impl ScriptedGateway {
    pub(super) fn failing(error: EvaluationError) -> Self {
        let gateway = Self::default();
        gateway.push(Err(error));
        gateway
    }

    pub(super) fn push(&self, outcome: Result<EvaluationResult, EvaluationError>) {
        self.outcomes
            .lock()
            .expect("outcomes mutex poisoned")
            .push_back(outcome);
    }

    pub(super) fn calls(&self) -> usize {
        self.requests.lock().expect("requests mutex poisoned").len()
    }

    pub(super) fn requests(&self) -> Vec<String> {
        self.requests.lock().expect("requests mutex poisoned").clone()
    }
}

#[async_trait]
impl EvaluationGateway for ScriptedGateway {
    async fn submit(
        &self,
        request: &EvaluationRequest,
    ) -> Result<EvaluationResult, EvaluationError> {
        self.requests
            .lock()
            .expect("requests mutex poisoned")
            .push(request.essay_text().to_string());
        self.outcomes
            .lock()
            .expect("outcomes mutex poisoned")
            .pop_front()
            .unwrap_or_else(|| Ok(sample_result()))
    }
}

/// Holds every call open until released.
#[derive(Default)]
pub(super) struct GatedGateway {
    release: Notify,
    calls: AtomicUsize,
}

impl GatedGateway {
    pub(super) fn release(&self) {
        self.release.notify_one();
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EvaluationGateway for GatedGateway {
    async fn submit(
        &self,
        _request: &EvaluationRequest,
    ) -> Result<EvaluationResult, EvaluationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.release.notified().await;
        Ok(sample_result())
    }
}

#[derive(Default)]
pub(super) struct RecordingSession {
    user: Option<String>,
    sign_in_requests: AtomicUsize,
}

impl RecordingSession {
    pub(super) fn signed_in(user: &str) -> Self {
        Self {
            user: Some(user.to_string()),
            sign_in_requests: AtomicUsize::new(0),
        }
    }

    pub(super) fn sign_in_requests(&self) -> usize {
        self.sign_in_requests.load(Ordering::SeqCst)
    }
}

impl SessionProvider for RecordingSession {
    fn current_session(&self) -> Option<Session> {
        self.user.clone().map(|user_id| Session { user_id })
    }

    fn request_sign_in(&self) {
        self.sign_in_requests.fetch_add(1, Ordering::SeqCst);
    }
}

pub(super) struct ReadOnlyStore {
    record: Option<UsageRecord>,
}

impl ReadOnlyStore {
    pub(super) fn new(record: Option<UsageRecord>) -> Self {
        Self { record }
    }
}

impl QuotaStore for ReadOnlyStore {
    fn read(&self) -> Option<UsageRecord> {
        self.record
    }

    fn write(&self, _record: UsageRecord) -> Result<(), QuotaStoreError> {
        Err(QuotaStoreError::Unavailable("storage is read-only".to_string()))
    }
}

/// Blocks its first read until released, after signalling that the read has started.
pub(super) struct StallingStore {
    inner: MemoryQuotaStore,
    armed: AtomicBool,
    entered: Mutex<mpsc::Sender<()>>,
    release: Mutex<mpsc::Receiver<()>>,
}

impl StallingStore {
    pub(super) fn new(
        inner: MemoryQuotaStore,
    ) -> (Self, mpsc::Receiver<()>, mpsc::Sender<()>) {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let store = Self {
            inner,
            armed: AtomicBool::new(true),
            entered: Mutex::new(entered_tx),
            release: Mutex::new(release_rx),
        };
        (store, entered_rx, release_tx)
    }
}

impl QuotaStore for StallingStore {
    fn read(&self) -> Option<UsageRecord> {
        let record = self.inner.read();
        if self.armed.swap(false, Ordering::SeqCst) {
            let _ = self.entered.lock().expect("entered mutex poisoned").send(());
            let _ = self.release.lock().expect("release mutex poisoned").recv();
        }
        record
    }

    fn write(&self, record: UsageRecord) -> Result<(), QuotaStoreError> {
        self.inner.write(record)
    }
}

pub(super) type TestController<E> = EvaluationController<MemoryQuotaStore, E, RecordingSession>;

pub(super) struct Harness<E> {
    pub(super) controller: Arc<TestController<E>>,
    pub(super) store: Arc<MemoryQuotaStore>,
    pub(super) gateway: Arc<E>,
    pub(super) sessions: Arc<RecordingSession>,
    pub(super) clock: Arc<ManualClock>,
}

pub(super) fn harness<E>(limit: u32, gateway: E, sessions: RecordingSession) -> Harness<E>
where
    E: EvaluationGateway + 'static,
{
    harness_with_store(limit, gateway, sessions, MemoryQuotaStore::default())
}

pub(super) fn harness_with_store<E>(
    limit: u32,
    gateway: E,
    sessions: RecordingSession,
    store: MemoryQuotaStore,
) -> Harness<E>
where
    E: EvaluationGateway + 'static,
{
    let store = Arc::new(store);
    let gateway = Arc::new(gateway);
    let sessions = Arc::new(sessions);
    let clock = Arc::new(ManualClock::new(day(12)));
    let controller = Arc::new(EvaluationController::with_clock(
        store.clone(),
        gateway.clone(),
        sessions.clone(),
        &quota_config(limit),
        clock.clone(),
    ));

    Harness {
        controller,
        store,
        gateway,
        sessions,
        clock,
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
