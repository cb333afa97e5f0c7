//! Who is calling: the signed-in user, if any.

use crate::auth::{CryptResult, verify_id_token};

/// Source of the current user id. `None` means signed out.
pub trait AuthProvider: Send + Sync {
    fn current_user_id(&self) -> Option<&str>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    user_id: String,
}

impl AuthenticatedUser {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}

/// Snapshot of the auth state, passed explicitly into every service call.
#[derive(Debug, Clone, Default)]
pub struct Session {
    maybe_user: Option<AuthenticatedUser>,
}

impl Session {
    pub fn new(maybe_user: Option<AuthenticatedUser>) -> Self {
        Self { maybe_user }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn signed_in(user_id: impl Into<String>) -> Self {
        Self::new(Some(AuthenticatedUser::new(user_id)))
    }

    /// Verifies an ID token with the shared `key` and takes its subject as the
    /// user id.
    pub fn from_token<K: AsRef<[u8]>>(token: &str, key: K) -> CryptResult<Self> {
        let claims = verify_id_token(token, key)?;
        tracing::debug!("session restored for user {}", claims.sub);
        Ok(Self::signed_in(claims.sub))
    }

    pub fn maybe_user(&self) -> Option<&AuthenticatedUser> {
        self.maybe_user.as_ref()
    }
}

impl AuthProvider for Session {
    fn current_user_id(&self) -> Option<&str> {
        self.maybe_user.as_ref().map(AuthenticatedUser::user_id)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::auth::{CryptError, IdTokenClaims, issue_id_token};

    const KEY: &[u8] = b"test-secret";

    fn token(sub: &str, expires_in: i64) -> String {
        let exp = chrono::Utc::now().timestamp() + expires_in;
        issue_id_token(&IdTokenClaims::new(sub, exp), KEY).unwrap()
    }

    #[test]
    fn test_token_roundtrip() {
        let session = Session::from_token(&token("8hzRnSqWVZXH1zEIvm2Ayrps9442", 3600), KEY).unwrap();
        assert_eq!(session.current_user_id(), Some("8hzRnSqWVZXH1zEIvm2Ayrps9442"));
    }

    #[test]
    fn test_rejects_wrong_key_and_expired() {
        assert!(Session::from_token(&token("u1", 3600), b"other").is_err());
        assert!(matches!(
            Session::from_token(&token("u1", -3600), KEY),
            Err(CryptError::JwtError(_))
        ));
    }

    #[test]
    fn test_rejects_empty_subject() {
        assert!(matches!(
            Session::from_token(&token("", 3600), KEY),
            Err(CryptError::EmptySubject)
        ));
    }

    #[test]
    fn test_anonymous_has_no_user() {
        assert_eq!(Session::anonymous().current_user_id(), None);
        assert!(Session::anonymous().maybe_user().is_none());
    }
}
