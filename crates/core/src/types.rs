use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A per-domain discussion space, created lazily on first reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Community {
    pub id: String,
    pub name: String,
    /// Unique key; at most one community exists per slug.
    pub domain_slug: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// Binds a user to a community. Keyed by `(user_id, community_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub user_id: String,
    pub community_id: String,
    pub role: MembershipRole,
    pub joined_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Role held by a member inside a community.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MembershipRole {
    #[default]
    Member,
    Moderator,
    Admin,
}

impl MembershipRole {
    /// Returns the canonical database representation for the role.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Moderator => "moderator",
            Self::Admin => "admin",
        }
    }

    /// Parses the database representation, returning `None` for unknown values.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "member" => Some(Self::Member),
            "moderator" => Some(Self::Moderator),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}
