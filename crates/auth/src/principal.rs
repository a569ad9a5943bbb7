use stockroom_core::{CompanyId, UserId};

use crate::roles::permissions_for;
use crate::{JwtClaims, Permission, Role};

/// A fully resolved principal for authorization decisions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: UserId,
    pub company_id: CompanyId,
    pub roles: Vec<Role>,
    pub permissions: Vec<Permission>,
}

impl Principal {
    /// Resolve effective permissions from the roles carried by a token.
    pub fn from_claims(claims: &JwtClaims) -> Self {
        Self::new(claims.sub, claims.company_id, claims.roles.clone())
    }

    pub fn new(user_id: UserId, company_id: CompanyId, roles: Vec<Role>) -> Self {
        let mut permissions: Vec<Permission> = roles.iter().flat_map(permissions_for).collect();
        permissions.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        permissions.dedup();
        Self {
            user_id,
            company_id,
            roles,
            permissions,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(Role::is_admin)
    }
}
