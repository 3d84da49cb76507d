pub mod claims;
pub mod middleware;

pub use claims::{UserClaims, UserContext};
pub use middleware::JwtVerifier;
