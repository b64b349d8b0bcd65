use chrono::{DateTime, Utc};
use derive_more::Display;
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::{
    attachment::Attachment,
    client::{Client, Hydrate},
    error::Result,
    user::User,
};

/// Members are keyed by the pair of server and user.
#[derive(Display, Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Hash)]
#[display(fmt = "{}/{}", server, user)]
pub struct MemberId {
    pub server: String,
    pub user: String,
}

impl MemberId {
    pub fn path(&self) -> String {
        format!("/servers/{}/members/{}", self.server, self.user)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Member {
    #[serde(rename = "_id")]
    pub id: MemberId,

    #[serde(default)]
    pub joined_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub nickname: Option<String>,

    #[serde(default)]
    pub avatar: Option<Attachment>,

    #[serde(default)]
    pub roles: Vec<String>,

    /// Member cannot interact with the server until then
    #[serde(default)]
    pub timeout: Option<DateTime<Utc>>,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldsMember {
    Nickname,
    Avatar,
    Roles,
    Timeout,
}

/// Sparse member edit. Unset fields are left untouched on the server.
#[derive(Serialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct EditMember {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,

    /// Id of an uploaded avatar
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,

    /// Replaces the member's roles
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub remove: Vec<FieldsMember>,
}

impl EditMember {
    #[must_use]
    pub fn nickname(mut self, nickname: impl Into<String>) -> Self {
        self.nickname = Some(nickname.into());
        self
    }

    #[must_use]
    pub fn avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = Some(avatar.into());
        self
    }

    #[must_use]
    pub fn roles(mut self, roles: Vec<String>) -> Self {
        self.roles = Some(roles);
        self
    }

    #[must_use]
    pub const fn timeout(mut self, until: DateTime<Utc>) -> Self {
        self.timeout = Some(until);
        self
    }

    #[must_use]
    pub fn remove(mut self, field: FieldsMember) -> Self {
        self.remove.push(field);
        self
    }
}

impl Member {
    pub fn display_name<'a>(&'a self, user: &'a User) -> &'a str {
        self.nickname
            .as_deref()
            .filter(|nickname| !nickname.is_empty())
            .unwrap_or_else(|| user.display_name())
    }

    pub async fn edit(&self, client: &Client, edit: &EditMember) -> Result<Self> {
        client.fetch(Method::PATCH, &self.id.path(), Some(edit)).await
    }

    /// Removes the member from the server.
    pub async fn kick(&self, client: &Client) -> Result<()> {
        client
            .request::<()>(Method::DELETE, &self.id.path(), None)
            .await?;
        Ok(())
    }

    pub async fn fetch_user(&self, client: &Client) -> Result<User> {
        client.fetch_user(&self.id.user).await
    }
}

impl Hydrate for Member {
    fn hydrate(&mut self) {}
}

/// Members of a server together with their user records.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct AllMembers {
    pub members: Vec<Member>,
    pub users: Vec<User>,
}

impl AllMembers {
    pub fn user(&self, member: &Member) -> Option<&User> {
        self.users.iter().find(|user| user.id == member.id.user)
    }

    /// Each member paired with its user, skipping members whose user was
    /// not included.
    pub fn iter(&self) -> impl Iterator<Item = (&Member, &User)> {
        self.members
            .iter()
            .filter_map(|member| self.user(member).map(|user| (member, user)))
    }
}

impl Hydrate for AllMembers {
    fn hydrate(&mut self) {
        self.members.hydrate();
        self.users.hydrate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        client::tests::{sent, server_json, SERVER_ID, USER_ID},
        http::MockTransport,
        server::Server,
    };
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    const OTHER_USER_ID: &str = "01FHGJ3NPP7XANQQH8C2BE44ZZ";

    fn member_json(user: &str) -> Value {
        json!({
            "_id": {"server": SERVER_ID, "user": user},
            "joined_at": "2022-03-01T12:00:00Z",
            "roles": []
        })
    }

    fn members_json() -> Value {
        json!({
            "members": [member_json(USER_ID), member_json(OTHER_USER_ID)],
            "users": [
                {"_id": USER_ID, "username": "ferris"},
                {"_id": OTHER_USER_ID, "username": "corro"}
            ]
        })
    }

    #[test]
    fn member_id_displays_as_pair() {
        let id = MemberId {
            server: "s".to_string(),
            user: "u".to_string(),
        };
        assert_eq!(id.to_string(), "s/u");
        assert_eq!(id.path(), "/servers/s/members/u");
    }

    #[tokio::test]
    async fn every_fetched_user_is_hydrated() {
        let mut transport = MockTransport::new();
        transport
            .expect_request()
            .withf(|method, path, _| {
                *method == Method::GET && path == format!("/servers/{SERVER_ID}/members")
            })
            .times(1)
            .returning(|_, _, _| Ok(serde_json::to_vec(&members_json()).unwrap()));

        let client = Client::with_transport(transport);
        let server: Server = serde_json::from_value(server_json()).unwrap();
        let all = server.fetch_members(&client).await.unwrap();

        assert_eq!(all.members.len(), 2);
        assert!(all.users.iter().all(|user| user.created_at.is_some()));

        let pairs: Vec<_> = all
            .iter()
            .map(|(member, user)| (member.id.user.as_str(), user.username.as_str()))
            .collect();
        assert_eq!(pairs, vec![(USER_ID, "ferris"), (OTHER_USER_ID, "corro")]);
    }

    #[tokio::test]
    async fn fetched_member_can_be_edited_and_kicked() {
        let mut transport = MockTransport::new();
        transport
            .expect_request()
            .withf(|method, path, _| {
                *method == Method::GET && path == format!("/servers/{SERVER_ID}/members/{USER_ID}")
            })
            .times(1)
            .returning(|_, _, _| Ok(serde_json::to_vec(&member_json(USER_ID)).unwrap()));
        transport
            .expect_request()
            .withf(|method, path, body| {
                *method == Method::PATCH
                    && path == format!("/servers/{SERVER_ID}/members/{USER_ID}")
                    && sent(body) == Some(json!({"nickname": "crab", "remove": ["Avatar"]}))
            })
            .times(1)
            .returning(|_, _, _| {
                let mut member = member_json(USER_ID);
                member["nickname"] = json!("crab");
                Ok(serde_json::to_vec(&member).unwrap())
            });
        transport
            .expect_request()
            .withf(|method, path, body| {
                *method == Method::DELETE
                    && path == format!("/servers/{SERVER_ID}/members/{USER_ID}")
                    && body.is_none()
            })
            .times(1)
            .returning(|_, _, _| Ok(Vec::new()));

        let client = Client::with_transport(transport);
        let server: Server = serde_json::from_value(server_json()).unwrap();

        let member = server.fetch_member(&client, USER_ID).await.unwrap();
        assert_eq!(
            member.joined_at,
            Some(Utc.with_ymd_and_hms(2022, 3, 1, 12, 0, 0).unwrap())
        );

        let edited = member
            .edit(
                &client,
                &EditMember::default()
                    .nickname("crab")
                    .remove(FieldsMember::Avatar),
            )
            .await
            .unwrap();
        assert_eq!(edited.nickname.as_deref(), Some("crab"));

        edited.kick(&client).await.unwrap();
    }

    #[test]
    fn nickname_overrides_user_name() {
        let all: AllMembers = serde_json::from_value(members_json()).unwrap();
        let mut member = all.members[0].clone();
        let user = all.user(&member).unwrap();

        assert_eq!(member.display_name(user), "ferris");
        member.nickname = Some("crab".to_string());
        assert_eq!(member.display_name(user), "crab");
    }

    #[test]
    fn edit_member_timeout_serializes_as_timestamp() {
        let until = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        let value = serde_json::to_value(EditMember::default().timeout(until)).unwrap();
        assert_eq!(value, json!({"timeout": "2030-01-01T00:00:00Z"}));
    }
}
