pub mod auth;
pub mod response;

pub use auth::{authenticate_jwt, ensure_admin, ensure_self_or_admin, CurrentUser};
pub use response::{ApiResponse, ApiResult};
