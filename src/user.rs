use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    attachment::Attachment,
    client::{hydrate_created, Hydrate},
    ulid::Created,
};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct UserStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// `Online`, `Idle`, `Focus`, `Busy` or `Invisible`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presence: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct BotInformation {
    pub owner: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct User {
    #[serde(skip)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(rename = "_id")]
    pub id: String,

    pub username: String,

    /// Missing on older accounts
    #[serde(default)]
    pub discriminator: Option<String>,

    #[serde(default)]
    pub display_name: Option<String>,

    #[serde(default)]
    pub avatar: Option<Attachment>,

    #[serde(default)]
    pub badges: Option<u32>,

    #[serde(default)]
    pub status: Option<UserStatus>,

    #[serde(default)]
    pub flags: Option<u32>,

    /// Only present for bot accounts
    #[serde(default)]
    pub bot: Option<BotInformation>,

    /// Relationship with the authenticated user, e.g. `Friend`
    #[serde(default)]
    pub relationship: Option<String>,

    #[serde(default)]
    pub online: Option<bool>,
}

impl User {
    pub fn display_name(&self) -> &str {
        match &self.display_name {
            Some(name) if !name.is_empty() => name,
            _ => &self.username,
        }
    }

    pub fn tag(&self) -> String {
        self.discriminator.as_ref().map_or_else(
            || self.username.clone(),
            |discriminator| format!("{}#{discriminator}", self.username),
        )
    }

    pub const fn is_bot(&self) -> bool {
        self.bot.is_some()
    }
}

impl Created for User {
    fn ulid(&self) -> &str {
        &self.id
    }

    fn created_at_mut(&mut self) -> &mut Option<DateTime<Utc>> {
        &mut self.created_at
    }
}

impl Hydrate for User {
    fn hydrate(&mut self) {
        hydrate_created(self);
    }
}
