use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{watch, Mutex};
use tracing::{error, info, warn};

use super::client::{EvaluationError, EvaluationGateway};
use super::domain::{
    EvaluationRequest, EvaluationResult, EvaluationState, UsageRecord, ValidationError,
};
use super::notice::Notice;
use super::quota::{Clock, LocalClock, QuotaPolicy, QuotaSnapshot, QuotaStore, QuotaStoreError};
use super::session::SessionProvider;
use crate::config::QuotaConfig;

/// Anchor of the plan selection section offered once the free allowance is spent.
pub const PLANS_ANCHOR: &str = "#planos";

/// Paths the presentation layer can offer when the daily limit is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GateOption {
    BonusGrant,
    PlanSelection,
}

/// Gating interaction raised instead of an evaluation when no allowance remains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LimitReached {
    pub daily_limit: u32,
    pub options: Vec<GateOption>,
    pub sign_in_required: bool,
    pub plans_anchor: &'static str,
}

#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("daily free limit of {} evaluations reached", .0.daily_limit)]
    QuotaExceeded(LimitReached),
    #[error("an evaluation is already in progress")]
    InFlight,
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
    #[error("a signed-in session is required")]
    AuthenticationRequired,
    #[error(transparent)]
    Storage(#[from] QuotaStoreError),
}

impl ControllerError {
    pub fn notice(&self) -> Notice {
        Notice::from_error(self)
    }
}

/// Orchestrates validation, quota gating, the scoring call and usage bookkeeping for one
/// client. At most one evaluation is in flight per controller.
pub struct EvaluationController<S, E, P> {
    store: Arc<S>,
    gateway: Arc<E>,
    sessions: Arc<P>,
    policy: QuotaPolicy,
    clock: Arc<dyn Clock>,
    state: watch::Sender<EvaluationState>,
    admission: Mutex<()>,
}

impl<S, E, P> EvaluationController<S, E, P>
where
    S: QuotaStore + 'static,
    E: EvaluationGateway + 'static,
    P: SessionProvider + 'static,
{
    pub fn new(store: Arc<S>, gateway: Arc<E>, sessions: Arc<P>, config: &QuotaConfig) -> Self {
        Self::with_clock(store, gateway, sessions, config, Arc::new(LocalClock))
    }

    pub fn with_clock(
        store: Arc<S>,
        gateway: Arc<E>,
        sessions: Arc<P>,
        config: &QuotaConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (state, _) = watch::channel(EvaluationState::Idle);
        Self {
            store,
            gateway,
            sessions,
            policy: QuotaPolicy::new(config.daily_limit),
            clock,
            state,
            admission: Mutex::new(()),
        }
    }

    pub fn state(&self) -> EvaluationState {
        self.state.borrow().clone()
    }

    /// Observers receive every state transition.
    pub fn subscribe(&self) -> watch::Receiver<EvaluationState> {
        self.state.subscribe()
    }

    pub fn quota(&self) -> QuotaSnapshot {
        let stored = self.store.read();
        self.policy.snapshot(stored.as_ref(), self.clock.today())
    }

    pub fn limit_reached(&self) -> LimitReached {
        LimitReached {
            daily_limit: self.policy.daily_limit(),
            options: vec![GateOption::BonusGrant, GateOption::PlanSelection],
            sign_in_required: self.sessions.current_session().is_none(),
            plans_anchor: PLANS_ANCHOR,
        }
    }

    /// Evaluates an essay, charging one unit of today's allowance only on success.
    pub async fn submit(&self, raw_essay: &str) -> Result<EvaluationResult, ControllerError> {
        let request = EvaluationRequest::new(raw_essay)?;

        // Reading usage, checking it and entering Pending happen as one step, so a
        // concurrent submit either sees Pending or the count its predecessor wrote.
        let (today, used, pending) = {
            let _admission = self.admission.lock().await;

            if self.state.borrow().is_pending() {
                return Err(ControllerError::InFlight);
            }

            let today = self.clock.today();
            let stored = self.store.read();
            let used = self.policy.effective_count(stored.as_ref(), today);
            if !self.policy.can_consume(used) {
                info!(
                    daily_limit = self.policy.daily_limit(),
                    used, "daily free quota exhausted"
                );
                return Err(ControllerError::QuotaExceeded(self.limit_reached()));
            }

            let previous = self.state.send_replace(EvaluationState::Pending);
            info!(%today, used, "evaluation admitted");
            let pending = PendingGuard {
                state: &self.state,
                previous: Some(previous),
            };
            (today, used, pending)
        };
        let outcome = self.gateway.submit(&request).await;
        pending.complete();

        match outcome {
            Ok(result) => {
                let record = UsageRecord::new(today, self.policy.consume(used));
                if let Err(err) = self.store.write(record) {
                    error!(error = %err, "evaluation succeeded but usage was not recorded");
                }
                info!(score = ?result.score, used = record.count, "evaluation succeeded");
                self.state
                    .send_replace(EvaluationState::Succeeded(result.clone()));
                Ok(result)
            }
            Err(err) => {
                warn!(error = %err, "evaluation failed; quota untouched");
                self.state
                    .send_replace(EvaluationState::Failed(err.failure_reason()));
                Err(err.into())
            }
        }
    }

    /// Resets today's usage to one below the limit for a signed-in user.
    pub fn grant_bonus(&self) -> Result<QuotaSnapshot, ControllerError> {
        let Some(session) = self.sessions.current_session() else {
            info!("bonus grant refused without a session");
            self.sessions.request_sign_in();
            return Err(ControllerError::AuthenticationRequired);
        };

        let today = self.clock.today();
        let stored = self.store.read();
        let used = self.policy.effective_count(stored.as_ref(), today);
        let record = UsageRecord::new(today, self.policy.grant_bonus(used));
        self.store.write(record)?;

        info!(user = %session.user_id, previous = used, count = record.count, "bonus evaluation granted");
        Ok(self.policy.snapshot(Some(&record), today))
    }
}

/// Restores the pre-submit state if the submit future is dropped mid-flight.
struct PendingGuard<'a> {
    state: &'a watch::Sender<EvaluationState>,
    previous: Option<EvaluationState>,
}

impl PendingGuard<'_> {
    fn complete(mut self) {
        self.previous = None;
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            warn!("evaluation abandoned before completion");
            self.state.send_replace(previous);
        }
    }
}
