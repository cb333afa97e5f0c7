use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::auth::{CryptError, CryptResult};

/// Claims of an ID token issued by the auth provider. `sub` is the user id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdTokenClaims {
    pub sub: String,
    pub exp: i64,
}

impl IdTokenClaims {
    pub fn new(user_id: impl Into<String>, exp: i64) -> Self {
        Self {
            sub: user_id.into(),
            exp,
        }
    }
}

/// Signs `claims` with the shared HS256 secret. Used by seeding tools and
/// tests; real tokens come from the auth provider.
pub fn issue_id_token<K: AsRef<[u8]>>(claims: &IdTokenClaims, key: K) -> CryptResult<String> {
    let key = EncodingKey::from_secret(key.as_ref());
    Ok(jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &key)?)
}

/// Checks signature and expiry and returns the claims. A token without a
/// subject is rejected.
pub fn verify_id_token<K: AsRef<[u8]>>(token: &str, key: K) -> CryptResult<IdTokenClaims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_required_spec_claims(&["exp", "sub"]);
    let key = DecodingKey::from_secret(key.as_ref());

    let claims = jsonwebtoken::decode::<IdTokenClaims>(token, &key, &validation)?.claims;
    if claims.sub.is_empty() {
        return Err(CryptError::EmptySubject);
    }
    Ok(claims)
}
