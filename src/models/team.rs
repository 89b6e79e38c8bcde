use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A team member as stored in the `team_members` collection.
///
/// `id` is the internal key tasks point at; `user_id` is the external,
/// unique identifier clients use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMemberRow {
    pub id: i32,
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A team member as clients see it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMember {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl From<TeamMemberRow> for TeamMember {
    fn from(row: TeamMemberRow) -> Self {
        TeamMember {
            id: row.user_id,
            name: row.name,
            avatar: row.avatar.filter(|a| !a.is_empty()),
        }
    }
}
