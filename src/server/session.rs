use crate::error::{ServiceError, NO_TOKEN};
use crate::user::{Role, Subject};

use axum::{extract::FromRequestParts, http::request::Parts};

/// The authenticated identity of a request, attached by the access control
/// layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub user_id: usize,
    pub role: Role,
}

impl Session {
    pub fn subject(&self) -> Subject {
        Subject {
            user_id: self.user_id,
            role: self.role,
        }
    }
}

impl From<Subject> for Session {
    fn from(subject: Subject) -> Self {
        Session {
            user_id: subject.user_id,
            role: subject.role,
        }
    }
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .copied()
            .ok_or(ServiceError::Unauthenticated(NO_TOKEN))
    }
}
