use super::auth::PasswordCredentials;
use super::user_models::User;
use super::Role;
use anyhow::Result;
use std::collections::HashMap;

pub trait UserAuthCredentialsStore: Send + Sync {
    /// Returns the id and password credentials of the user with the given email.
    /// Returns Ok(None) if the user does not exist.
    /// Returns Err if there is a database error.
    fn get_user_credentials(&self, email: &str) -> Result<Option<(usize, PasswordCredentials)>>;
}

pub trait UserStore: UserAuthCredentialsStore + Send + Sync {
    /// Creates a new user together with its credentials and returns the user id.
    /// Returns Ok(None) if the email is already taken.
    fn create_user(
        &self,
        email: &str,
        role: Role,
        credentials: &PasswordCredentials,
    ) -> Result<Option<usize>>;

    /// Returns the user with the given id.
    /// Returns Ok(None) if the user does not exist.
    fn get_user(&self, user_id: usize) -> Result<Option<User>>;

    /// Returns the id of the user with the given email.
    fn get_user_id(&self, email: &str) -> Result<Option<usize>>;

    /// Returns the emails of the given users, users that do not exist are
    /// missing from the map.
    fn get_user_emails(&self, user_ids: &[usize]) -> Result<HashMap<usize, String>>;

    /// Appends a video to the user's watch-later list.
    /// Returns false if it was already in the list.
    fn add_to_watch_later(&self, user_id: usize, video_id: &str) -> Result<bool>;

    /// Removes a video from the user's watch-later list.
    /// Returns false if it was not in the list.
    fn remove_from_watch_later(&self, user_id: usize, video_id: &str) -> Result<bool>;

    /// Returns the video ids of the user's watch-later list, in insertion order.
    fn get_watch_later(&self, user_id: usize) -> Result<Vec<String>>;

    /// Moves (or appends) a video to the end of the user's watch history.
    fn record_watch(&self, user_id: usize, video_id: &str) -> Result<()>;

    /// Returns the video ids of the user's watch history, least recent first.
    fn get_watch_history(&self, user_id: usize) -> Result<Vec<String>>;
}
