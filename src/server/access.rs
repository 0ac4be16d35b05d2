//! Bearer token verification and role gating for routes.

use super::session::Session;
use crate::error::{ServiceError, ACCESS_DENIED, NO_TOKEN};
use crate::user::{Role, TokenService};

use axum::{
    extract::{Request, State},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    Router,
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};
use tracing::debug;

/// Decides whether a bearer token grants access to a route allowing
/// `allowed` roles. An empty allow-list admits any valid token.
pub fn authorize(
    tokens: &TokenService,
    bearer: Option<&str>,
    allowed: &[Role],
) -> Result<Session, ServiceError> {
    let token = bearer.ok_or(ServiceError::Unauthenticated(NO_TOKEN))?;
    let subject = tokens.verify(token)?;
    if !allowed.is_empty() && !allowed.contains(&subject.role) {
        debug!(
            "User {} with role {} denied, allowed {:?}",
            subject.user_id, subject.role, allowed
        );
        return Err(ServiceError::Forbidden(ACCESS_DENIED));
    }
    Ok(Session::from(subject))
}

#[derive(Clone)]
pub struct AccessPolicy {
    tokens: TokenService,
    allowed: &'static [Role],
}

impl AccessPolicy {
    pub fn new(tokens: TokenService, allowed: &'static [Role]) -> Self {
        AccessPolicy { tokens, allowed }
    }

    /// Requires every route of `router` to pass [authorize].
    pub fn guard<S>(self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        router.route_layer(middleware::from_fn_with_state(self, require_roles))
    }
}

async fn require_roles(
    State(policy): State<AccessPolicy>,
    mut request: Request,
    next: Next,
) -> Response {
    let bearer = request.headers().typed_get::<Authorization<Bearer>>();
    match authorize(
        &policy.tokens,
        bearer.as_ref().map(|header| header.token()),
        policy.allowed,
    ) {
        Ok(session) => {
            request.extensions_mut().insert(session);
            next.run(request).await
        }
        Err(err) => err.into_response(),
    }
}
