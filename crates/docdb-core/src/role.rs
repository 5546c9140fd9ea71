//! Access roles.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The authorization level a user holds for a collection.
///
/// Variants are declared in ascending order, so `role >= AccessRole::Editor`
/// reads as "at least editor".
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum AccessRole {
    #[default]
    None,
    Viewer,
    Editor,
    Owner,
}

impl AccessRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessRole::None => "none",
            AccessRole::Viewer => "viewer",
            AccessRole::Editor => "editor",
            AccessRole::Owner => "owner",
        }
    }
}

impl fmt::Display for AccessRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessRole {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(AccessRole::None),
            "viewer" => Ok(AccessRole::Viewer),
            "editor" => Ok(AccessRole::Editor),
            "owner" => Ok(AccessRole::Owner),
            other => anyhow::bail!(
                "Unknown access role: '{}'. Must be none, viewer, editor, or owner.",
                other
            ),
        }
    }
}
