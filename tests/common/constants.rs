//! Shared constants for end-to-end tests
//!
//! When test credentials or sample data change, update only this file.

// ============================================================================
// Test User Credentials
// ============================================================================

pub const CREATOR_EMAIL: &str = "creator@example.com";
pub const OTHER_CREATOR_EMAIL: &str = "other.creator@example.com";
pub const VIEWER_EMAIL: &str = "viewer@example.com";
pub const ADMIN_EMAIL: &str = "admin@example.com";

/// Shared by every test user
pub const TEST_PASS: &str = "testpass123";

// ============================================================================
// Sample Videos
// ============================================================================

pub const RUST_VIDEO_TITLE: &str = "Rust Basics";
pub const SQL_VIDEO_TITLE: &str = "SQL Joins Explained";
pub const SAMPLE_EMBED_LINK: &str = "https://www.youtube.com/embed/abc123";

/// Well-formed id that no video has
pub const MISSING_VIDEO_ID: &str = "00000000-0000-4000-8000-000000000000";

// ============================================================================
// Test Timeouts and Configuration
// ============================================================================

/// Secret the test server signs tokens with
pub const TEST_JWT_SECRET: &str = "e2e-test-secret";

/// Lifetime of tokens issued by the test server (seconds)
pub const TEST_TOKEN_TTL_SECS: u64 = 3600;

/// Maximum time to wait for server to become ready (milliseconds)
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Timeout for individual HTTP requests (seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Polling interval when waiting for server ready (milliseconds)
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 50;
