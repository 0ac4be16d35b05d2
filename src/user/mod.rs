pub mod auth;
mod role;
mod sqlite_user_store;
pub mod token;
mod user_manager;
pub mod user_models;
mod user_store;

pub use auth::{PasswordCredentials, VidshareHasher};
pub use role::{Role, ANY_ROLE, CREATOR_ONLY, CREATOR_OR_ADMIN, VIEWER_ONLY};
pub use sqlite_user_store::SqliteUserStore;
pub use token::{Subject, TokenError, TokenService};
pub use user_manager::UserManager;
pub use user_models::{LoginRequest, RegisterRequest, User, UserSummary};
pub use user_store::{UserAuthCredentialsStore, UserStore};
