//! `fixit-auth`: authentication/authorization guard chain.
//!
//! The chain is three stages, each of which may reject the request:
//! token verification ([`JwtVerifier`]), identity resolution against the
//! backing store ([`resolve`]), and the role gate ([`authorize`]).
//!
//! No HTTP types here; storage is reached only
//! through the [`IdentityStore`] trait.

pub mod authorize;
pub mod claims;
pub mod error;
pub mod guard;
pub mod identity;
pub mod jwt;
pub mod password;
pub mod roles;

pub use authorize::{authorize, RoleGate};
pub use claims::{Claims, TokenClaims};
pub use error::{AuthError, ConfigError};
pub use guard::GuardChain;
pub use identity::{effective_role, resolve, Identity, IdentityStore, UserRecord};
pub use jwt::{JwtIssuer, JwtVerifier, SigningConfig, TokenVerifier};
pub use password::{hash_password, verify_password, PasswordError};
pub use roles::Role;
