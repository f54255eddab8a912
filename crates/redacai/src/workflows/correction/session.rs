use serde::Serialize;

/// Authenticated identity reported by the sign-in collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub user_id: String,
}

/// Inbound dependency answering whether someone is signed in.
pub trait SessionProvider: Send + Sync {
    fn current_session(&self) -> Option<Session>;

    /// Hands control to the sign-in flow after an operation was refused for lack of a session.
    fn request_sign_in(&self) {}
}

/// Provider that never reports a session.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnonymousSession;

impl SessionProvider for AnonymousSession {
    fn current_session(&self) -> Option<Session> {
        None
    }
}

/// Provider with a fixed identity, configured at startup.
#[derive(Debug, Clone, Default)]
pub struct StaticSession {
    user_id: Option<String>,
}

impl StaticSession {
    pub fn new(user_id: Option<String>) -> Self {
        Self { user_id }
    }

    pub fn signed_in(user_id: impl Into<String>) -> Self {
        Self::new(Some(user_id.into()))
    }
}

impl SessionProvider for StaticSession {
    fn current_session(&self) -> Option<Session> {
        self.user_id.clone().map(|user_id| Session { user_id })
    }
}
