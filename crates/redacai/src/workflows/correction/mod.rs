//! Free-tier essay correction: daily quota metering, the scoring boundary client, and the
//! controller that reconciles both around each evaluation.

pub mod client;
pub mod controller;
pub mod domain;
pub mod notice;
pub mod quota;
pub mod router;
pub mod session;

#[cfg(test)]
mod tests;

pub use client::{EvaluationError, EvaluationGateway, HttpEvaluationClient};
pub use controller::{ControllerError, EvaluationController, GateOption, LimitReached};
pub use domain::{
    EvaluationRequest, EvaluationResult, EvaluationState, FailureReason, UsageRecord,
    ValidationError,
};
pub use notice::{Notice, NoticeVariant};
pub use quota::{
    Clock, FileQuotaStore, LocalClock, MemoryQuotaStore, QuotaPolicy, QuotaSnapshot, QuotaStore,
    QuotaStoreError,
};
pub use router::correction_router;
pub use session::{AnonymousSession, Session, SessionProvider, StaticSession};
