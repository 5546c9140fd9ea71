//! Per-session state and admin configuration.
//!
//! A [`ChatSession`] belongs to exactly one user interaction. It holds the
//! active collection and a [`SessionRoleCache`]; neither is shared across
//! sessions. The backing store is shared and lives outside the session.

use std::collections::HashMap;

use crate::naming::DEFAULT_COLLECTION_NAME;
use crate::role::AccessRole;

/// Highest role computed so far per (collection, user) within a session.
///
/// Entries only ever move up: [`ratchet`](SessionRoleCache::ratchet)
/// ignores roles that do not exceed the cached one.
#[derive(Debug, Clone, Default)]
pub struct SessionRoleCache {
    roles: HashMap<(String, Option<String>), AccessRole>,
}

impl SessionRoleCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, collection: &str, user_id: Option<&str>) -> AccessRole {
        self.roles
            .get(&(collection.to_string(), user_id.map(str::to_string)))
            .copied()
            .unwrap_or_default()
    }

    /// Record `role` if it exceeds the cached one. Returns whether it did.
    pub fn ratchet(&mut self, collection: &str, user_id: Option<&str>, role: AccessRole) -> bool {
        let entry = self
            .roles
            .entry((collection.to_string(), user_id.map(str::to_string)))
            .or_default();
        if role > *entry {
            *entry = role;
            true
        } else {
            false
        }
    }

    pub fn len(&self) -> usize {
        self.roles.values().filter(|r| **r != AccessRole::None).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// State of one chat session.
#[derive(Debug, Clone)]
pub struct ChatSession {
    /// Acting user. `None` means console mode with no user separation.
    pub user_id: Option<String>,
    active_collection: String,
    pub role_cache: SessionRoleCache,
}

impl ChatSession {
    pub fn new(user_id: Option<String>, active_collection: impl Into<String>) -> Self {
        Self {
            user_id,
            active_collection: active_collection.into(),
            role_cache: SessionRoleCache::new(),
        }
    }

    /// A session bound to the default collection.
    pub fn with_default_collection(user_id: Option<String>) -> Self {
        Self::new(user_id, DEFAULT_COLLECTION_NAME)
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// Canonical name of the active collection.
    pub fn active_collection(&self) -> &str {
        &self.active_collection
    }

    pub fn switch_to(&mut self, collection: impl Into<String>) {
        self.active_collection = collection.into();
    }
}

/// Admin configuration, resolved once at startup.
///
/// An empty password counts as unset, so admin directives are rejected.
#[derive(Debug, Clone, Default)]
pub struct AdminConfig {
    password: Option<String>,
}

impl AdminConfig {
    pub fn new(password: Option<String>) -> Self {
        Self {
            password: password.filter(|p| !p.is_empty()),
        }
    }

    /// Read the admin password from the environment variable `var`.
    pub fn from_env(var: &str) -> Self {
        Self::new(std::env::var(var).ok())
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    pub fn is_configured(&self) -> bool {
        self.password.is_some()
    }

    /// Whether `candidate` is exactly the configured password.
    pub fn matches(&self, candidate: Option<&str>) -> bool {
        self.is_configured() && self.password() == candidate
    }

    /// Whether `value` is the `--default <password>` directive.
    pub fn is_default_directive(&self, value: &str) -> bool {
        value
            .strip_prefix("--default ")
            .is_some_and(|pwd| self.matches(Some(pwd)))
    }

    /// Strip a trailing ` <password>` from `value`, if present.
    pub fn strip_password_suffix<'a>(&self, value: &'a str) -> Option<&'a str> {
        let pwd = self.password()?;
        value.strip_suffix(pwd)?.strip_suffix(' ')
    }
}
