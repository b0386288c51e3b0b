//! Role and permission checks against token claims.

use gatekeeper_core::error::AppError;
use gatekeeper_entity::AccountRole;
use tracing::debug;

use super::permission::Permission;
use super::policies::RbacPolicies;
use crate::jwt::Claims;

/// Enforces role and permission requirements on authenticated callers.
#[derive(Debug, Clone, Default)]
pub struct RbacEnforcer {
    policies: RbacPolicies,
}

impl RbacEnforcer {
    /// Creates an enforcer with the built-in policies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an enforcer with custom policies.
    pub fn with_policies(policies: RbacPolicies) -> Self {
        Self { policies }
    }

    /// Allow the caller only if its role is one of `allowed`.
    pub fn require_role(&self, claims: &Claims, allowed: &[AccountRole]) -> Result<(), AppError> {
        if allowed.contains(&claims.role) {
            Ok(())
        } else {
            debug!(account_id = %claims.sub, role = %claims.role, "Role not allowed");
            Err(AppError::forbidden())
        }
    }

    /// Allow the caller only if its token carries `permission`.
    pub fn require_permission(
        &self,
        claims: &Claims,
        permission: Permission,
    ) -> Result<(), AppError> {
        if claims.has_permission(permission) {
            Ok(())
        } else {
            debug!(account_id = %claims.sub, %permission, "Permission missing");
            Err(AppError::forbidden())
        }
    }

    /// Returns the underlying policies.
    pub fn policies(&self) -> &RbacPolicies {
        &self.policies
    }
}

#[cfg(test)]
mod tests {
    use gatekeeper_core::error::ErrorKind;
    use gatekeeper_core::types::AccountId;
    use uuid::Uuid;

    use super::*;
    use crate::jwt::TokenType;

    fn claims_for(role: AccountRole) -> Claims {
        Claims {
            jti: Uuid::new_v4(),
            sub: AccountId::new(),
            email: "x@example.com".to_string(),
            role,
            operator_status: None,
            is_available: false,
            permissions: RbacPolicies::new().permissions_for(role).to_vec(),
            iat: 0,
            exp: 0,
            token_type: TokenType::Access,
        }
    }

    #[test]
    fn require_role_forbids_other_roles() {
        let enforcer = RbacEnforcer::new();
        let client = claims_for(AccountRole::Client);
        assert!(enforcer.require_role(&client, &[AccountRole::Client]).is_ok());

        let err = enforcer
            .require_role(&client, &[AccountRole::Operator, AccountRole::Admin])
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);
        assert_eq!(err.public_message(), "forbidden");
        assert_eq!(err.status().http_code(), 403);
    }

    #[test]
    fn require_permission_reads_token_snapshot() {
        let enforcer = RbacEnforcer::new();
        let admin = claims_for(AccountRole::Admin);
        assert!(enforcer.require_permission(&admin, Permission::OperatorVerify).is_ok());

        let operator = claims_for(AccountRole::Operator);
        assert!(enforcer.require_permission(&operator, Permission::OperatorVerify).is_err());

        // A stripped snapshot is honoured even for admins.
        let mut stale = claims_for(AccountRole::Admin);
        stale.permissions.clear();
        assert!(enforcer.require_permission(&stale, Permission::OperatorStats).is_err());
    }
}
