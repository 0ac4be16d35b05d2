use super::{
    auth::VidshareHasher,
    token::TokenService,
    user_models::{LoginRequest, RegisterRequest, User},
    Role, UserStore,
};
use crate::error::{ServiceError, ServiceResult};
use anyhow::Context;
use std::sync::Arc;
use tracing::{debug, info};

pub const USER_EXISTS: &str = "User already exists";

pub struct UserManager {
    user_store: Arc<dyn UserStore>,
    tokens: TokenService,
    hasher: VidshareHasher,
}

impl UserManager {
    pub fn new(user_store: Arc<dyn UserStore>, tokens: TokenService) -> Self {
        Self {
            user_store,
            tokens,
            hasher: VidshareHasher::default(),
        }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Creates an account and returns a token for it.
    pub fn register(&self, request: &RegisterRequest) -> ServiceResult<String> {
        let email = request.email.trim();
        if email.is_empty() || request.password.is_empty() {
            return Err(ServiceError::Validation(
                "Email and password are required".to_string(),
            ));
        }
        let role = match request.role.as_deref() {
            None => Role::default(),
            Some(value) => Role::from_str(value)
                .ok_or_else(|| ServiceError::Validation(format!("Invalid role {}", value)))?,
        };

        if self.user_store.get_user_id(email)?.is_some() {
            return Err(ServiceError::Conflict(USER_EXISTS));
        }

        let credentials = self
            .hasher
            .create_credentials(&request.password)
            .context("Failed to hash password")?;
        let user_id = self
            .user_store
            .create_user(email, role, &credentials)?
            .ok_or(ServiceError::Conflict(USER_EXISTS))?;
        info!("Registered user {} as {}", user_id, role);

        Ok(self.tokens.issue(user_id, role)?)
    }

    pub fn login(&self, request: &LoginRequest) -> ServiceResult<String> {
        let Some((user_id, credentials)) = self
            .user_store
            .get_user_credentials(request.email.trim())?
        else {
            debug!("Login attempt for unknown email");
            return Err(ServiceError::InvalidCredentials);
        };
        if !credentials.matches(&request.password)? {
            debug!("Wrong password for user {}", user_id);
            return Err(ServiceError::InvalidCredentials);
        }

        let user = self
            .user_store
            .get_user(user_id)?
            .ok_or(ServiceError::InvalidCredentials)?;
        Ok(self.tokens.issue(user.id, user.role)?)
    }

    pub fn get_user(&self, user_id: usize) -> ServiceResult<User> {
        self.user_store
            .get_user(user_id)?
            .ok_or(ServiceError::NotFound("User not found"))
    }
}
