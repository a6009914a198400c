use ulid::Ulid;

use crate::store::StoreError;

#[derive(Debug)]
pub enum EngineError {
    SessionNotFound(Ulid),
    WindowNotFound(Ulid),
    /// Player action on a session the user is not part of.
    NotAParticipant { session: Ulid, user: Ulid },
    /// Window mutation by someone other than its owner.
    NotWindowOwner { window: Ulid, user: Ulid },
    Store(StoreError),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::SessionNotFound(id) => write!(f, "session not found: {id}"),
            EngineError::WindowNotFound(id) => write!(f, "window not found: {id}"),
            EngineError::NotAParticipant { session, user } => {
                write!(f, "user {user} is not part of session {session}")
            }
            EngineError::NotWindowOwner { window, user } => {
                write!(f, "window {window} is not owned by user {user}")
            }
            EngineError::Store(e) => write!(f, "store error: {e}"),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<StoreError> for EngineError {
    fn from(e: StoreError) -> Self {
        EngineError::Store(e)
    }
}
