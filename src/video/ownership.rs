//! Per-video ownership policy, applied after role gating.

use crate::error::{ServiceError, NOT_OWNER};
use crate::user::{Role, Subject};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoAction {
    Update,
    Delete,
    /// Like, dislike and view.
    React,
}

pub fn is_allowed(action: VideoAction, role: Role, is_owner: bool) -> bool {
    match (action, role) {
        (VideoAction::React, _) => true,
        (VideoAction::Update, Role::Creator | Role::Viewer | Role::Admin) => is_owner,
        (VideoAction::Delete, Role::Admin) => true,
        (VideoAction::Delete, Role::Creator | Role::Viewer) => is_owner,
    }
}

pub fn check(action: VideoAction, actor: &Subject, creator: usize) -> Result<(), ServiceError> {
    if is_allowed(action, actor.role, actor.user_id == creator) {
        Ok(())
    } else {
        Err(ServiceError::Forbidden(NOT_OWNER))
    }
}
