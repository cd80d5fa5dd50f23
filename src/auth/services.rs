use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{error, info, warn};

use crate::auth::password::{hash_password, verify_password};
use crate::auth::store::{CredentialStore, StoreError};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

lazy_static! {
    // Verified when a username lookup misses, so a miss costs exactly one
    // Argon2 verification like a mismatch does.
    static ref DUMMY_HASH: String =
        hash_password("vault-dummy-password").expect("hash dummy password");
}

/// Stateless registration/validation logic over an injected credential
/// store. Every store or hashing failure folds to `false` here; callers
/// never see backend detail.
#[derive(Clone)]
pub struct AuthCore {
    store: Arc<dyn CredentialStore>,
}

impl AuthCore {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    /// Hash `password` and insert the new record. Returns `true` on
    /// success. The plaintext is dropped as soon as the hash exists.
    pub async fn register(&self, username: &str, password: &str, email: &str) -> bool {
        let hash = match hash_password(password) {
            Ok(h) => h,
            Err(e) => {
                error!(error = %e, "hash_password failed");
                return false;
            }
        };

        match self.store.insert(username, &hash, email).await {
            Ok(id) => {
                info!(user_id = id, user = %username, "user registered");
                true
            }
            Err(StoreError::DuplicateKey(constraint)) => {
                warn!(user = %username, %constraint, "registration collision");
                false
            }
            Err(e) => {
                error!(error = %e, "insert user failed");
                false
            }
        }
    }

    /// Check `password` against the stored hash for `username`. Unknown
    /// usernames and store errors both come back `false`.
    pub async fn validate(&self, username: &str, password: &str) -> bool {
        let stored = match self.store.find_by_username(username).await {
            Ok(s) => s,
            Err(e) => {
                error!(error = %e, "find_by_username failed");
                return false;
            }
        };

        match stored {
            Some(hash) => match verify_password(password, &hash) {
                Ok(ok) => {
                    if !ok {
                        warn!(user = %username, "password mismatch");
                    }
                    ok
                }
                Err(e) => {
                    error!(error = %e, user = %username, "verify_password failed");
                    false
                }
            },
            None => {
                let _ = verify_password(password, &DUMMY_HASH);
                warn!(user = %username, "unknown username");
                false
            }
        }
    }
}
