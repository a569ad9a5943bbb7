//! `stockroom-auth`: authentication and authorization boundary.
//!
//! Decoupled from HTTP and storage: token handling, password hashing, the
//! role → permission policy and user-account validation live here; the API
//! crate wires them to requests and the infra crate persists accounts.

pub mod authz;
pub mod claims;
pub mod jwt;
pub mod password;
pub mod permissions;
pub mod principal;
pub mod roles;
pub mod user;

pub use authz::{AuthzError, authorize};
pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use jwt::{Hs256Jwt, JwtError, JwtValidator};
pub use password::{PasswordError, hash_password, verify_password};
pub use permissions::Permission;
pub use principal::Principal;
pub use roles::Role;
pub use user::{NewUser, UserAccount};
