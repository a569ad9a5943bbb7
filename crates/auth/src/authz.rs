use thiserror::Error;

use stockroom_core::CompanyId;

use crate::{Permission, Principal};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("company mismatch")]
    CompanyMismatch,

    #[error("forbidden: missing permission '{0}'")]
    Forbidden(String),
}

/// Authorize a principal for `required` within `company_id`.
///
/// Pure policy check: no IO, no panics.
pub fn authorize(principal: &Principal, company_id: CompanyId, required: &str) -> Result<(), AuthzError> {
    if principal.company_id != company_id {
        return Err(AuthzError::CompanyMismatch);
    }

    let granted = principal
        .permissions
        .iter()
        .any(|p: &Permission| p.is_wildcard() || p.as_str() == required);

    if granted {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(required.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Role, permissions};
    use stockroom_core::UserId;

    #[test]
    fn admin_is_allowed_everything_in_own_company() {
        let company = CompanyId::new();
        let admin = Principal::new(UserId::new(), company, vec![Role::admin()]);
        assert_eq!(authorize(&admin, company, permissions::USERS_MANAGE), Ok(()));
        assert_eq!(
            authorize(&admin, CompanyId::new(), permissions::ITEMS_READ),
            Err(AuthzError::CompanyMismatch)
        );
    }

    #[test]
    fn operator_is_limited() {
        let company = CompanyId::new();
        let op = Principal::new(UserId::new(), company, vec![Role::operator()]);
        assert_eq!(authorize(&op, company, permissions::MOVEMENTS_WRITE), Ok(()));
        assert_eq!(
            authorize(&op, company, permissions::USERS_MANAGE),
            Err(AuthzError::Forbidden(permissions::USERS_MANAGE.to_string()))
        );
    }

    #[test]
    fn no_roles_no_access() {
        let company = CompanyId::new();
        let nobody = Principal::new(UserId::new(), company, vec![]);
        assert!(authorize(&nobody, company, permissions::ITEMS_READ).is_err());
    }
}
