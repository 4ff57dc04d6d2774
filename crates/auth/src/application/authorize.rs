//! Authorization Policy Evaluator
//!
//! Checks a capability string against a user's resolved permission set:
//! direct grants plus grants derived from group membership. Group
//! resolution is an external collaborator behind the `GroupProvider` trait.
//!
//! Used by the login path to decide the post-login redirect: holders of the
//! admin capability land in the admin area, everyone else at the configured
//! default.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::entity::user::User;
use crate::error::AuthResult;

/// Capability gating the admin area
pub const ADMIN_ACCESS: &str = "admin.access";

/// External collaborator resolving group-derived permissions
#[trait_variant::make(GroupProvider: Send)]
pub trait LocalGroupProvider {
    /// Capability strings granted to members of the named group
    async fn permissions_for_group(&self, group: &str) -> AuthResult<Vec<String>>;
}

/// Group provider for deployments without groups
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGroups;

impl GroupProvider for NoGroups {
    async fn permissions_for_group(&self, _group: &str) -> AuthResult<Vec<String>> {
        Ok(Vec::new())
    }
}

/// Whether a granted permission string covers a capability
///
/// Exact match, or a trailing-`*` wildcard grant: `admin.*` covers
/// `admin.access`, and a bare `*` covers everything.
fn grants(granted: &str, capability: &str) -> bool {
    if granted == capability || granted == "*" {
        return true;
    }
    match granted.strip_suffix(".*") {
        Some(prefix) => {
            capability.len() > prefix.len() + 1
                && capability.starts_with(prefix)
                && capability.as_bytes()[prefix.len()] == b'.'
        }
        None => false,
    }
}

/// Authorization policy evaluator
pub struct Authorizer<G>
where
    G: GroupProvider + Send + Sync,
{
    config: Arc<AuthConfig>,
    groups: G,
}

impl<G> Authorizer<G>
where
    G: GroupProvider + Send + Sync,
{
    pub fn new(config: Arc<AuthConfig>, groups: G) -> Self {
        Self { config, groups }
    }

    /// Check a capability against direct and group-derived grants
    pub async fn can(&self, user: &User, capability: &str) -> AuthResult<bool> {
        if user.permissions.iter().any(|p| grants(p, capability)) {
            return Ok(true);
        }

        for group in &user.groups {
            let permissions = self.groups.permissions_for_group(group).await?;
            if permissions.iter().any(|p| grants(p, capability)) {
                return Ok(true);
            }
        }

        Ok(false)
    }

    /// Post-login redirect for the given user
    pub async fn login_redirect(&self, user: &User) -> AuthResult<String> {
        if self.can(user, ADMIN_ACCESS).await? {
            Ok(self.config.admin_redirect.clone())
        } else {
            Ok(self.config.login_redirect.clone())
        }
    }
}
