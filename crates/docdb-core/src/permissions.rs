//! Per-collection permission metadata.
//!
//! Each collection carries a [`CollectionPermissions`] record mapping user
//! ids and access codes to roles. The record is persisted as JSON alongside
//! the collection and is only changed through explicit grants.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::role::AccessRole;

/// Settings for one user on one collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionUserSettings {
    #[serde(default)]
    pub access_role: AccessRole,
}

impl CollectionUserSettings {
    pub fn with_role(access_role: AccessRole) -> Self {
        Self { access_role }
    }
}

/// Settings for one access code on one collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessCodeSettings {
    #[serde(default)]
    pub access_role: AccessRole,
}

impl AccessCodeSettings {
    pub fn with_role(access_role: AccessRole) -> Self {
        Self { access_role }
    }
}

/// Permission metadata of a single collection.
///
/// Lookups for unknown users, unknown codes, an anonymous user, or a
/// missing code all yield default settings (role [`AccessRole::None`]).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionPermissions {
    #[serde(default)]
    pub user_id_to_settings: BTreeMap<String, CollectionUserSettings>,
    #[serde(default)]
    pub access_code_to_settings: BTreeMap<String, AccessCodeSettings>,
}

impl CollectionPermissions {
    pub fn from_json(json: &str) -> Result<Self> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(json).context("Failed to parse collection permissions")
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).context("Failed to serialize collection permissions")
    }

    pub fn get_user_settings(&self, user_id: Option<&str>) -> CollectionUserSettings {
        user_id
            .and_then(|id| self.user_id_to_settings.get(id))
            .cloned()
            .unwrap_or_default()
    }

    pub fn get_access_code_settings(&self, access_code: Option<&str>) -> AccessCodeSettings {
        access_code
            .and_then(|code| self.access_code_to_settings.get(code))
            .cloned()
            .unwrap_or_default()
    }

    pub fn user_role(&self, user_id: Option<&str>) -> AccessRole {
        self.get_user_settings(user_id).access_role
    }

    pub fn access_code_role(&self, access_code: Option<&str>) -> AccessRole {
        self.get_access_code_settings(access_code).access_role
    }

    pub fn set_user_settings(&mut self, user_id: &str, settings: CollectionUserSettings) {
        self.user_id_to_settings.insert(user_id.to_string(), settings);
    }

    pub fn set_access_code_settings(&mut self, access_code: &str, settings: AccessCodeSettings) {
        self.access_code_to_settings
            .insert(access_code.to_string(), settings);
    }
}
