use crate::workflows::correction::client::EvaluationError;
use crate::workflows::correction::controller::{GateOption, LimitReached, PLANS_ANCHOR};
use crate::workflows::correction::domain::ValidationError;
use crate::workflows::correction::quota::QuotaStoreError;
use crate::workflows::correction::{ControllerError, NoticeVariant};

fn limit(daily_limit: u32) -> LimitReached {
    LimitReached {
        daily_limit,
        options: vec![GateOption::BonusGrant, GateOption::PlanSelection],
        sign_in_required: true,
        plans_anchor: PLANS_ANCHOR,
    }
}

#[test]
fn empty_essay_notice_matches_product_copy() {
    let notice = ControllerError::Validation(ValidationError::EmptyEssay).notice();
    assert_eq!(notice.title, "Redação vazia");
    assert_eq!(
        notice.description,
        "Cole ou escreva sua redação antes de pedir a correção."
    );
    assert_eq!(notice.variant, NoticeVariant::Destructive);
    assert!(!notice.retryable);
}

#[test]
fn limit_notice_mentions_configured_limit() {
    let notice = ControllerError::QuotaExceeded(limit(3)).notice();
    assert_eq!(notice.title, "Limite diário atingido");
    assert!(notice
        .description
        .starts_with("Você já usou suas 3 correções gratuitas de hoje."));
}

#[test]
fn service_faults_are_retryable() {
    let network = ControllerError::Evaluation(EvaluationError::Network("timeout".into())).notice();
    let protocol = ControllerError::Evaluation(EvaluationError::Protocol("shape".into())).notice();
    assert!(network.retryable);
    assert!(protocol.retryable);
    assert_ne!(network.title, protocol.title);

    let storage = ControllerError::Storage(QuotaStoreError::Unavailable("disk".into())).notice();
    assert!(storage.retryable);
}

#[test]
fn in_flight_and_sign_in_notices_are_informational() {
    assert_eq!(
        ControllerError::InFlight.notice().variant,
        NoticeVariant::Default
    );
    assert_eq!(
        ControllerError::AuthenticationRequired.notice().variant,
        NoticeVariant::Default
    );
}
