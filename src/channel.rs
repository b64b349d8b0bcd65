use std::collections::HashMap;

use chrono::{DateTime, Utc};
use derive_more::Display;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use strum_macros::EnumString;

use crate::{
    attachment::Attachment,
    client::{hydrate_created, Client, Hydrate},
    error::Result,
    role::PermissionOverride,
    ulid::{self, Created},
};

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelType {
    SavedMessages,
    DirectMessage,
    Group,
    TextChannel,
    VoiceChannel,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Channel {
    #[serde(skip)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(rename = "_id")]
    pub id: String,

    pub channel_type: ChannelType,

    /// Owning server, for text and voice channels
    #[serde(default)]
    pub server: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub icon: Option<Attachment>,

    #[serde(default)]
    pub nsfw: bool,

    #[serde(default)]
    pub default_permissions: Option<PermissionOverride>,

    #[serde(default)]
    pub role_permissions: HashMap<String, PermissionOverride>,

    #[serde(default)]
    pub last_message_id: Option<String>,

    /// Group and direct message participants
    #[serde(default)]
    pub recipients: Vec<String>,

    /// Group owner
    #[serde(default)]
    pub owner: Option<String>,

    /// Saved messages owner
    #[serde(default)]
    pub user: Option<String>,
}

/// Kind of channel that can be created inside a server.
#[derive(Display, EnumString, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[strum(ascii_case_insensitive)]
pub enum ChannelKind {
    Text,
    Voice,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct CreateChannel {
    #[serde(rename = "type")]
    pub kind: ChannelKind,

    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub nsfw: Option<bool>,

    pub nonce: String,
}

impl CreateChannel {
    /// A fresh nonce is generated for every payload.
    pub fn new(kind: ChannelKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            description: None,
            nsfw: None,
            nonce: ulid::nonce(),
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub const fn nsfw(mut self, nsfw: bool) -> Self {
        self.nsfw = Some(nsfw);
        self
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldsChannel {
    Description,
    Icon,
    DefaultPermissions,
}

/// Sparse channel edit. Unset fields are left untouched on the server.
#[derive(Serialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct EditChannel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Id of an uploaded icon
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub nsfw: Option<bool>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub remove: Vec<FieldsChannel>,
}

impl EditChannel {
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    #[must_use]
    pub const fn nsfw(mut self, nsfw: bool) -> Self {
        self.nsfw = Some(nsfw);
        self
    }

    #[must_use]
    pub fn remove(mut self, field: FieldsChannel) -> Self {
        self.remove.push(field);
        self
    }
}

impl Channel {
    pub fn path(&self) -> String {
        format!("/channels/{}", self.id)
    }

    pub async fn edit(&self, client: &Client, edit: &EditChannel) -> Result<Self> {
        client.fetch(Method::PATCH, &self.path(), Some(edit)).await
    }

    /// Deletes a server channel, closes a direct message or leaves a group.
    /// Which one happens is up to the server.
    pub async fn delete(&self, client: &Client) -> Result<()> {
        client
            .request::<()>(Method::DELETE, &self.path(), None)
            .await?;
        Ok(())
    }
}

impl Created for Channel {
    fn ulid(&self) -> &str {
        &self.id
    }

    fn created_at_mut(&mut self) -> &mut Option<DateTime<Utc>> {
        &mut self.created_at
    }
}

impl Hydrate for Channel {
    fn hydrate(&mut self) {
        hydrate_created(self);
    }
}
