use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::client::Hydrate;

/// Allow/deny pair of permission bit sets.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PermissionOverride {
    #[serde(rename = "a")]
    pub allow: u64,

    #[serde(rename = "d")]
    pub deny: u64,
}

impl PermissionOverride {
    /// Applies this override on top of `base`.
    pub const fn apply(self, base: u64) -> u64 {
        (base | self.allow) & !self.deny
    }
}

/// Permissions granted to everyone. Older servers send a
/// `[server, channel]` pair instead of a single bit set.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(untagged)]
pub enum DefaultPermissions {
    Bits(u64),
    Legacy(u32, u32),
}

impl Default for DefaultPermissions {
    fn default() -> Self {
        Self::Bits(0)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Role {
    pub name: String,

    #[serde(default)]
    pub permissions: PermissionOverride,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colour: Option<String>,

    #[serde(default)]
    pub hoist: bool,

    /// Lower ranks take priority
    #[serde(default)]
    pub rank: i64,

    /// Keys this client does not model.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct CreateRole {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<i64>,
}

impl CreateRole {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rank: None,
        }
    }

    #[must_use]
    pub const fn rank(mut self, rank: i64) -> Self {
        self.rank = Some(rank);
        self
    }
}

/// Response to role creation.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct NewRole {
    pub id: String,
    pub role: Role,
}

impl Hydrate for NewRole {
    fn hydrate(&mut self) {}
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldsRole {
    Colour,
}

/// Sparse role edit. Unset fields are left untouched on the server.
#[derive(Serialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct EditRole {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub colour: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub hoist: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<i64>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub remove: Vec<FieldsRole>,
}

impl EditRole {
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn colour(mut self, colour: impl Into<String>) -> Self {
        self.colour = Some(colour.into());
        self
    }

    #[must_use]
    pub const fn hoist(mut self, hoist: bool) -> Self {
        self.hoist = Some(hoist);
        self
    }

    #[must_use]
    pub const fn rank(mut self, rank: i64) -> Self {
        self.rank = Some(rank);
        self
    }

    #[must_use]
    pub fn remove(mut self, field: FieldsRole) -> Self {
        self.remove.push(field);
        self
    }
}
