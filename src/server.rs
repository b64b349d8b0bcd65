use std::collections::HashMap;

use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::{
    attachment::Attachment,
    ban::{BanList, BanRequest},
    channel::{Channel, ChannelKind, CreateChannel},
    client::{hydrate_created, Client, Hydrate},
    error::Result,
    member::{AllMembers, Member},
    role::{CreateRole, DefaultPermissions, EditRole, NewRole, Role},
    ulid::{self, Created},
};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Server {
    #[serde(skip)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(rename = "_id")]
    pub id: String,

    #[serde(rename = "owner")]
    pub owner_id: String,

    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(rename = "channels", default)]
    pub channel_ids: Vec<String>,

    #[serde(default)]
    pub categories: Vec<ServerCategory>,

    #[serde(default)]
    pub system_messages: Option<SystemMessages>,

    /// Role id to role
    #[serde(default)]
    pub roles: HashMap<String, Role>,

    #[serde(default)]
    pub default_permissions: DefaultPermissions,

    #[serde(default)]
    pub icon: Option<Attachment>,

    #[serde(default)]
    pub banner: Option<Attachment>,

    #[serde(default)]
    pub nsfw: bool,

    #[serde(default)]
    pub flags: Option<u32>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ServerCategory {
    pub id: String,
    pub title: String,
    #[serde(rename = "channels")]
    pub channel_ids: Vec<String>,
}

/// Channels that receive system notices. Unset entries are not sent.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct SystemMessages {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_joined: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_left: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_kicked: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_banned: Option<String>,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldsServer {
    Description,
    Categories,
    SystemMessages,
    Icon,
    Banner,
}

/// Sparse server edit. Unset fields are left untouched on the server.
#[derive(Serialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct EditServer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Id of an uploaded icon
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    /// Id of an uploaded banner
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<ServerCategory>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_messages: Option<SystemMessages>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub nsfw: Option<bool>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub remove: Vec<FieldsServer>,
}

impl EditServer {
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
    pub fn banner(mut self, banner: impl Into<String>) -> Self {
        self.banner = Some(banner.into());
        self
    }

    #[must_use]
    pub fn categories(mut self, categories: Vec<ServerCategory>) -> Self {
        self.categories = Some(categories);
        self
    }

    #[must_use]
    pub fn system_messages(mut self, system_messages: SystemMessages) -> Self {
        self.system_messages = Some(system_messages);
        self
    }

    #[must_use]
    pub const fn nsfw(mut self, nsfw: bool) -> Self {
        self.nsfw = Some(nsfw);
        self
    }

    #[must_use]
    pub fn remove(mut self, field: FieldsServer) -> Self {
        self.remove.push(field);
        self
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct CreateServer {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub nsfw: Option<bool>,

    pub nonce: String,
}

impl CreateServer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
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

impl Server {
    pub fn path(&self) -> String {
        format!("/servers/{}", self.id)
    }

    fn member_path(&self, user_id: &str) -> String {
        format!("/servers/{}/members/{user_id}", self.id)
    }

    fn ban_path(&self, user_id: &str) -> String {
        format!("/servers/{}/bans/{user_id}", self.id)
    }

    fn role_path(&self, role_id: &str) -> String {
        format!("/servers/{}/roles/{role_id}", self.id)
    }

    pub async fn edit(&self, client: &Client, edit: &EditServer) -> Result<()> {
        client.request(Method::PATCH, &self.path(), Some(edit)).await?;
        Ok(())
    }

    /// Deletes the server if the authenticated user owns it, leaves it
    /// otherwise.
    ///
    /// Both go through the same request and the server makes the call; there
    /// is no way to tell beforehand which one will happen.
    pub async fn delete(&self, client: &Client) -> Result<()> {
        client
            .request::<()>(Method::DELETE, &self.path(), None)
            .await?;
        Ok(())
    }

    pub async fn create_channel(&self, client: &Client, create: &CreateChannel) -> Result<Channel> {
        client
            .fetch(
                Method::POST,
                &format!("{}/channels", self.path()),
                Some(create),
            )
            .await
    }

    pub async fn create_text_channel(
        &self,
        client: &Client,
        name: &str,
        description: Option<&str>,
    ) -> Result<Channel> {
        let mut create = CreateChannel::new(ChannelKind::Text, name);
        create.description = description.map(ToString::to_string);
        self.create_channel(client, &create).await
    }

    pub async fn create_voice_channel(
        &self,
        client: &Client,
        name: &str,
        description: Option<&str>,
    ) -> Result<Channel> {
        let mut create = CreateChannel::new(ChannelKind::Voice, name);
        create.description = description.map(ToString::to_string);
        self.create_channel(client, &create).await
    }

    /// Every member along with their user records.
    pub async fn fetch_members(&self, client: &Client) -> Result<AllMembers> {
        client.get(&format!("{}/members", self.path())).await
    }

    pub async fn fetch_member(&self, client: &Client, user_id: &str) -> Result<Member> {
        client.get(&self.member_path(user_id)).await
    }

    /// Removes a member. They may rejoin with an invite.
    pub async fn kick(&self, client: &Client, user_id: &str) -> Result<()> {
        client
            .request::<()>(Method::DELETE, &self.member_path(user_id), None)
            .await?;
        Ok(())
    }

    pub async fn ban(&self, client: &Client, user_id: &str, reason: Option<&str>) -> Result<()> {
        let ban = BanRequest::new(reason);
        client
            .request(Method::PUT, &self.ban_path(user_id), Some(&ban))
            .await?;
        Ok(())
    }

    pub async fn unban(&self, client: &Client, user_id: &str) -> Result<()> {
        client
            .request::<()>(Method::DELETE, &self.ban_path(user_id), None)
            .await?;
        Ok(())
    }

    pub async fn fetch_bans(&self, client: &Client) -> Result<BanList> {
        client.get(&format!("{}/bans", self.path())).await
    }

    pub async fn create_role(&self, client: &Client, create: &CreateRole) -> Result<NewRole> {
        client
            .fetch(Method::POST, &format!("{}/roles", self.path()), Some(create))
            .await
    }

    pub async fn edit_role(&self, client: &Client, role_id: &str, edit: &EditRole) -> Result<()> {
        client
            .request(Method::PATCH, &self.role_path(role_id), Some(edit))
            .await?;
        Ok(())
    }

    pub async fn delete_role(&self, client: &Client, role_id: &str) -> Result<()> {
        client
            .request::<()>(Method::DELETE, &self.role_path(role_id), None)
            .await?;
        Ok(())
    }
}

impl Created for Server {
    fn ulid(&self) -> &str {
        &self.id
    }

    fn created_at_mut(&mut self) -> &mut Option<DateTime<Utc>> {
        &mut self.created_at
    }
}

impl Hydrate for Server {
    fn hydrate(&mut self) {
        hydrate_created(self);
    }
}
