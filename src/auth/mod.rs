pub mod claims;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod utils;

pub use claims::Claims;
pub use jwt::JwtService;
pub use middleware::{AuthMiddleware, AuthenticatedUser, OptionalClaims, RoleGuard};
pub use password::{hash_password, verify_password};
pub use utils::{extract_claims_from_context, prefers_html, require_role, ACCESS_TOKEN_COOKIE};
