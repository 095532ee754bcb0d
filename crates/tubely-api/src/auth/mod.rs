pub mod jwt;
pub mod middleware;
pub mod models;

pub use jwt::{AuthError, JwtService};
pub use middleware::{auth_middleware, AuthState};
pub use models::{JwtClaims, UserContext};
