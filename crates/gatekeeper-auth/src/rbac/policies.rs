//! Role-to-permission mapping.

use std::collections::HashMap;

use gatekeeper_entity::AccountRole;

use super::permission::Permission;

const CLIENT: &[Permission] = &[
    Permission::StreamCreate,
    Permission::StreamJoin,
    Permission::ChatSend,
    Permission::FileUpload,
];

const OPERATOR: &[Permission] = &[
    Permission::StreamJoin,
    Permission::ChatSend,
    Permission::FileUpload,
    Permission::ConsultationJoin,
];

const ADMIN: &[Permission] = &[
    Permission::StreamCreate,
    Permission::StreamJoin,
    Permission::ChatSend,
    Permission::FileUpload,
    Permission::ConsultationJoin,
    Permission::OperatorVerify,
    Permission::OperatorStats,
];

/// Permission sets per role.
#[derive(Debug, Clone)]
pub struct RbacPolicies {
    by_role: HashMap<AccountRole, Vec<Permission>>,
}

impl RbacPolicies {
    /// The built-in policy set.
    pub fn new() -> Self {
        let by_role = HashMap::from([
            (AccountRole::Client, CLIENT.to_vec()),
            (AccountRole::Operator, OPERATOR.to_vec()),
            (AccountRole::Admin, ADMIN.to_vec()),
        ]);
        Self { by_role }
    }

    /// Permissions granted to `role`, in a stable order.
    pub fn permissions_for(&self, role: AccountRole) -> &[Permission] {
        self.by_role
            .get(&role)
            .or_else(|| self.by_role.get(&AccountRole::Client))
            .map(Vec::as_slice)
            .unwrap_or(CLIENT)
    }

    /// Whether `role` holds `permission`.
    pub fn has_permission(&self, role: AccountRole, permission: Permission) -> bool {
        self.permissions_for(role).contains(&permission)
    }

    /// Resolve a role name from an untrusted source. Unknown names resolve
    /// to the client role and therefore to the client permission set.
    pub fn resolve_role(name: &str) -> AccountRole {
        name.parse().unwrap_or_else(|_| {
            tracing::warn!(role = name, "Unknown role name, using client");
            AccountRole::Client
        })
    }
}

impl Default for RbacPolicies {
    fn default() -> Self {
        Self::new()
    }
}
