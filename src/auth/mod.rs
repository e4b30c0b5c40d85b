mod password;
pub use password::{hash_password, verify_password};
mod jwt;
pub use jwt::{UserClaims, generate_token, process_token};
mod token;
mod session;
pub use session::{IssuedToken, TokenIssuer};
mod validate;
pub use validate::{MIN_PASSWORD_LENGTH, is_valid_email, is_valid_password};
mod error;
pub use error::{CryptError, CryptResult, SessionError, SessionResult};
