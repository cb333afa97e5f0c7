mod jwt;
pub use jwt::{IdTokenClaims, issue_id_token, verify_id_token};
mod error;
pub use error::{CryptError, CryptResult};
mod session;
pub use session::{AuthProvider, AuthenticatedUser, Session};
