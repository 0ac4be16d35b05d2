//! Password hashing

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

mod vidshare_argon2 {
    use anyhow::{anyhow, Result};
    use argon2::{
        password_hash::{
            rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
        },
        Argon2,
    };

    pub fn generate_b64_salt() -> String {
        SaltString::generate(&mut OsRng).to_string()
    }

    pub fn hash(plain: &[u8], b64_salt: &str) -> Result<String> {
        let salt = SaltString::from_b64(b64_salt).map_err(|err| anyhow!("{}", err))?;
        Ok(Argon2::default()
            .hash_password(plain, &salt)
            .map_err(|err| anyhow!("{}", err))?
            .to_string())
    }

    pub fn verify(plain: &[u8], target_hash: &str) -> Result<bool> {
        let password_hash = PasswordHash::new(target_hash).map_err(|err| anyhow!("{}", err))?;
        Ok(Argon2::default()
            .verify_password(plain, &password_hash)
            .is_ok())
    }
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub enum VidshareHasher {
    Argon2,
    /// Fast test-only hasher - DO NOT use in production!
    #[cfg(feature = "test-fast-hasher")]
    TestFast,
}

impl FromStr for VidshareHasher {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "argon2" => Ok(VidshareHasher::Argon2),
            #[cfg(feature = "test-fast-hasher")]
            "test_fast" => Ok(VidshareHasher::TestFast),
            _ => bail!("Unknown hasher {}", s),
        }
    }
}

impl std::fmt::Display for VidshareHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VidshareHasher::Argon2 => write!(f, "argon2"),
            #[cfg(feature = "test-fast-hasher")]
            VidshareHasher::TestFast => write!(f, "test_fast"),
        }
    }
}

impl Default for VidshareHasher {
    #[cfg(not(feature = "test-fast-hasher"))]
    fn default() -> Self {
        VidshareHasher::Argon2
    }

    #[cfg(feature = "test-fast-hasher")]
    fn default() -> Self {
        VidshareHasher::TestFast
    }
}

impl VidshareHasher {
    pub fn generate_b64_salt(&self) -> String {
        match self {
            VidshareHasher::Argon2 => vidshare_argon2::generate_b64_salt(),
            #[cfg(feature = "test-fast-hasher")]
            VidshareHasher::TestFast => "test_salt".to_string(),
        }
    }

    pub fn hash(&self, plain: &[u8], b64_salt: &str) -> Result<String> {
        match self {
            VidshareHasher::Argon2 => vidshare_argon2::hash(plain, b64_salt),
            #[cfg(feature = "test-fast-hasher")]
            VidshareHasher::TestFast => {
                let hex: String = plain.iter().map(|b| format!("{:02x}", b)).collect();
                Ok(format!("$testfast${}${}", b64_salt, hex))
            }
        }
    }

    pub fn verify(&self, plain: &str, target_hash: &str) -> Result<bool> {
        match self {
            VidshareHasher::Argon2 => vidshare_argon2::verify(plain.as_bytes(), target_hash),
            #[cfg(feature = "test-fast-hasher")]
            VidshareHasher::TestFast => {
                let hex: String = plain.bytes().map(|b| format!("{:02x}", b)).collect();
                Ok(target_hash
                    .strip_prefix("$testfast$")
                    .and_then(|s| s.split('$').nth(1))
                    .map(|stored| stored == hex)
                    .unwrap_or(false))
            }
        }
    }

    /// Hashes `password` with a freshly generated salt.
    pub fn create_credentials(&self, password: &str) -> Result<PasswordCredentials> {
        let salt = self.generate_b64_salt();
        let hash = self.hash(password.as_bytes(), &salt)?;
        Ok(PasswordCredentials {
            salt,
            hash,
            hasher: *self,
        })
    }
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct PasswordCredentials {
    pub salt: String,
    pub hash: String,
    pub hasher: VidshareHasher,
}

impl PasswordCredentials {
    pub fn matches(&self, password: &str) -> Result<bool> {
        self.hasher.verify(password, &self.hash)
    }
}
