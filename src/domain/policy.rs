//! Authorization policy
//!
//! Decisions are a pure function of `(actor, action, resource)`. The rule
//! to apply is looked up by `(role, action, resource kind)`; any triple not
//! listed in [`RULES`] is denied.

use super::api_key::ApiKey;
use super::user::UserRole;
use crate::shared::{DomainError, DomainResult};

/// The authenticated caller, reduced to what policy needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: String,
    pub team_id: String,
    pub role: UserRole,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CreateApiKey,
    Delete,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::CreateApiKey => "createApiKey",
            Action::Delete => "delete",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Team,
    ApiKey,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Team => "team",
            ResourceKind::ApiKey => "apiKey",
        }
    }
}

/// The subject of an authorization decision.
#[derive(Debug, Clone, Copy)]
pub enum Resource<'a> {
    Team {
        id: &'a str,
    },
    ApiKey {
        key: &'a ApiKey,
        /// Team of the key's owner, if the owner row could be resolved.
        owner_team_id: Option<&'a str>,
    },
}

impl Resource<'_> {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Resource::Team { .. } => ResourceKind::Team,
            Resource::ApiKey { .. } => ResourceKind::ApiKey,
        }
    }

    fn team_id(&self) -> Option<&str> {
        match self {
            Resource::Team { id } => Some(*id),
            Resource::ApiKey { owner_team_id, .. } => *owner_team_id,
        }
    }

    fn is_owned_by(&self, user_id: &str) -> bool {
        matches!(self, Resource::ApiKey { key, .. } if key.is_owned_by(user_id))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rule {
    Deny,
    /// Resource belongs to the actor's team.
    SameTeam,
    /// Actor owns the resource.
    Owner,
    /// Actor owns the resource, or it belongs to the actor's team.
    OwnerOrTeamAdmin,
}

const RULES: &[(UserRole, Action, ResourceKind, Rule)] = &[
    (UserRole::Admin, Action::CreateApiKey, ResourceKind::Team, Rule::SameTeam),
    (UserRole::Member, Action::CreateApiKey, ResourceKind::Team, Rule::SameTeam),
    (UserRole::Viewer, Action::CreateApiKey, ResourceKind::Team, Rule::Deny),
    (UserRole::Admin, Action::Delete, ResourceKind::ApiKey, Rule::OwnerOrTeamAdmin),
    (UserRole::Member, Action::Delete, ResourceKind::ApiKey, Rule::Owner),
    (UserRole::Viewer, Action::Delete, ResourceKind::ApiKey, Rule::Owner),
];

fn rule_for(role: UserRole, action: Action, kind: ResourceKind) -> Rule {
    RULES
        .iter()
        .find(|(r, a, k, _)| *r == role && *a == action && *k == kind)
        .map(|(_, _, _, rule)| *rule)
        .unwrap_or(Rule::Deny)
}

/// Whether `actor` may perform `action` on `resource`.
pub fn can(actor: &Actor, action: Action, resource: &Resource<'_>) -> bool {
    let same_team = resource.team_id() == Some(actor.team_id.as_str());
    let owner = resource.is_owned_by(&actor.user_id);

    match rule_for(actor.role, action, resource.kind()) {
        Rule::Deny => false,
        Rule::SameTeam => same_team,
        Rule::Owner => owner,
        Rule::OwnerOrTeamAdmin => owner || same_team,
    }
}

/// Like [`can`], but returns `DomainError::Forbidden` on denial.
pub fn authorize(actor: &Actor, action: Action, resource: &Resource<'_>) -> DomainResult<()> {
    if can(actor, action, resource) {
        Ok(())
    } else {
        Err(DomainError::Forbidden(format!(
            "not allowed to {} this {}",
            action.as_str(),
            resource.kind().as_str()
        )))
    }
}
