use crate::{AuthError, Identity, Role};

/// Third stage of the guard chain: role membership.
///
/// - No IO
/// - No panics
/// - Pass-through on success so handlers reuse the resolved identity
pub fn authorize(identity: Identity, permitted: &[Role]) -> Result<Identity, AuthError> {
    if permitted.contains(&identity.role) {
        Ok(identity)
    } else {
        Err(AuthError::Forbidden {
            permitted: permitted.to_vec(),
        })
    }
}

/// Static permitted-role set declared by a gated endpoint.
///
/// Built in const context so an empty declaration fails the build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleGate {
    roles: &'static [Role],
}

impl RoleGate {
    pub const USER: RoleGate = RoleGate::new(&[Role::User]);
    pub const AUTHORITIES: RoleGate = RoleGate::new(&[Role::Authorities]);
    pub const ANY: RoleGate = RoleGate::new(&Role::ALL);

    pub const fn new(roles: &'static [Role]) -> Self {
        assert!(!roles.is_empty(), "a role gate must permit at least one role");
        Self { roles }
    }

    pub fn roles(&self) -> &'static [Role] {
        self.roles
    }

    pub fn check(&self, identity: Identity) -> Result<Identity, AuthError> {
        authorize(identity, self.roles)
    }
}
