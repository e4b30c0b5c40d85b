mod auth;
pub use auth::{BEARER_PREFIX, bearer_token, extract_context_fn, require_admin_fn};

mod details;
pub use details::expose_details_fn;
