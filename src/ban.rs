use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::{
    attachment::Attachment,
    client::{hydrate_created, Client, Hydrate},
    error::Result,
    member::MemberId,
    ulid::{self, Created},
};

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct BanRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    pub nonce: String,
}

impl BanRequest {
    pub fn new(reason: Option<&str>) -> Self {
        Self {
            reason: reason.map(ToString::to_string),
            nonce: ulid::nonce(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Ban {
    #[serde(rename = "_id")]
    pub id: MemberId,

    #[serde(default)]
    pub reason: Option<String>,
}

impl Ban {
    pub fn path(&self) -> String {
        format!("/servers/{}/bans/{}", self.id.server, self.id.user)
    }

    /// Lifts the ban.
    pub async fn revoke(&self, client: &Client) -> Result<()> {
        client
            .request::<()>(Method::DELETE, &self.path(), None)
            .await?;
        Ok(())
    }
}

/// The subset of a user visible in a ban list.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct BannedUser {
    #[serde(skip)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(rename = "_id")]
    pub id: String,

    pub username: String,

    #[serde(default)]
    pub discriminator: Option<String>,

    #[serde(default)]
    pub avatar: Option<Attachment>,
}

impl Created for BannedUser {
    fn ulid(&self) -> &str {
        &self.id
    }

    fn created_at_mut(&mut self) -> &mut Option<DateTime<Utc>> {
        &mut self.created_at
    }
}

impl Hydrate for BannedUser {
    fn hydrate(&mut self) {
        hydrate_created(self);
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct BanList {
    pub users: Vec<BannedUser>,
    pub bans: Vec<Ban>,
}

impl BanList {
    pub fn user(&self, ban: &Ban) -> Option<&BannedUser> {
        self.users.iter().find(|user| user.id == ban.id.user)
    }
}

impl Hydrate for BanList {
    fn hydrate(&mut self) {
        self.users.hydrate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        client::tests::{server_json, SERVER_ID, USER_ID},
        http::MockTransport,
        server::Server,
    };
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[tokio::test]
    async fn fetched_bans_are_hydrated_and_revocable() {
        let mut transport = MockTransport::new();
        transport
            .expect_request()
            .withf(|method, path, _| {
                *method == Method::GET && path == format!("/servers/{SERVER_ID}/bans")
            })
            .times(1)
            .returning(|_, _, _| {
                Ok(serde_json::to_vec(&json!({
                    "users": [
                        {"_id": USER_ID, "username": "spammer"},
                        {"_id": "not-a-ulid", "username": "legacy"}
                    ],
                    "bans": [
                        {"_id": {"server": SERVER_ID, "user": USER_ID}, "reason": "spam"},
                        {"_id": {"server": SERVER_ID, "user": "not-a-ulid"}}
                    ]
                }))
                .unwrap())
            });
        transport
            .expect_request()
            .withf(|method, path, body| {
                *method == Method::DELETE
                    && path == format!("/servers/{SERVER_ID}/bans/{USER_ID}")
                    && body.is_none()
            })
            .times(1)
            .returning(|_, _, _| Ok(Vec::new()));

        let client = Client::with_transport(transport);
        let server: Server = serde_json::from_value(server_json()).unwrap();
        let list = server.fetch_bans(&client).await.unwrap();

        assert!(list.users[0].created_at.is_some());
        // A bad id only leaves its own timestamp unset.
        assert_eq!(list.users[1].created_at, None);
        assert_eq!(list.users[1].username, "legacy");

        let ban = &list.bans[0];
        assert_eq!(ban.reason.as_deref(), Some("spam"));
        assert_eq!(list.user(ban).map(|user| user.username.as_str()), Some("spammer"));

        ban.revoke(&client).await.unwrap();
    }
}
