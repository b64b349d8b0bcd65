use std::{fmt, sync::Arc};

use reqwest::Method;
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    channel::Channel,
    config::Config,
    error::{Error, Result},
    http::{HttpTransport, Transport},
    server::{CreateServer, Server},
    ulid::Created,
    user::User,
};

/// Authenticated session against the API.
///
/// Cloning is cheap and every clone shares the same transport. Entities do
/// not keep a reference to it; pass it to each operation instead.
#[derive(Clone)]
pub struct Client {
    transport: Arc<dyn Transport>,
}

impl Client {
    pub fn new(config: &Config, token: &str) -> Result<Self> {
        let transport = HttpTransport::from_config(config, token)?;
        Ok(Self::with_transport(transport))
    }

    pub fn with_transport(transport: impl Transport + 'static) -> Self {
        Self {
            transport: Arc::new(transport),
        }
    }

    /// Sends an already-encoded body.
    pub async fn request_raw(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<Vec<u8>> {
        Ok(self.transport.request(method, path, body).await?)
    }

    /// Serializes `body`, then sends it. A body that fails to serialize is
    /// reported before anything goes over the wire.
    pub async fn request<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<Vec<u8>>
    where
        B: Serialize + ?Sized,
    {
        let body = body
            .map(serde_json::to_vec)
            .transpose()
            .map_err(Error::Serialize)?;

        self.request_raw(method, path, body).await
    }

    /// Sends a request and decodes the response into `T`, hydrating it.
    pub async fn fetch<T, B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T>
    where
        T: DeserializeOwned + Hydrate,
        B: Serialize + ?Sized,
    {
        let data = self.request(method, path, body).await?;
        let mut value: T = serde_json::from_slice(&data).map_err(Error::Deserialize)?;
        value.hydrate();
        Ok(value)
    }

    pub async fn get<T>(&self, path: &str) -> Result<T>
    where
        T: DeserializeOwned + Hydrate,
    {
        self.fetch::<T, ()>(Method::GET, path, None).await
    }

    /// The user the token belongs to.
    pub async fn fetch_self(&self) -> Result<User> {
        self.get("/users/@me").await
    }

    pub async fn fetch_user(&self, id: &str) -> Result<User> {
        self.get(&format!("/users/{id}")).await
    }

    pub async fn fetch_server(&self, id: &str) -> Result<Server> {
        self.get(&format!("/servers/{id}")).await
    }

    pub async fn fetch_channel(&self, id: &str) -> Result<Channel> {
        self.get(&format!("/channels/{id}")).await
    }

    /// Creates a server owned by the authenticated user.
    pub async fn create_server(&self, create: &CreateServer) -> Result<Server> {
        #[derive(serde::Deserialize)]
        struct CreatedServer {
            server: Server,
        }

        impl Hydrate for CreatedServer {
            fn hydrate(&mut self) {
                self.server.hydrate();
            }
        }

        let created: CreatedServer = self
            .fetch(Method::POST, "/servers/create", Some(create))
            .await?;
        Ok(created.server)
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client").finish_non_exhaustive()
    }
}

/// Post-fetch fix-ups applied to every decoded response.
///
/// Collections hydrate each element, so nothing in a fetched list is left
/// half-initialised.
pub trait Hydrate {
    fn hydrate(&mut self);
}

impl<T: Hydrate> Hydrate for Vec<T> {
    fn hydrate(&mut self) {
        for item in self {
            item.hydrate();
        }
    }
}

impl<T: Hydrate> Hydrate for Option<T> {
    fn hydrate(&mut self) {
        if let Some(item) = self {
            item.hydrate();
        }
    }
}

impl Hydrate for serde_json::Value {
    fn hydrate(&mut self) {}
}

/// Fills in the creation date, logging ids that are not ULIDs.
pub(crate) fn hydrate_created<T: Created>(entity: &mut T) {
    if let Err(error) = entity.calculate_creation_date() {
        tracing::warn!(id = entity.ulid(), %error, "could not derive creation date");
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{
        error::{ErrorKind, TransportError},
        http::MockTransport,
    };
    use pretty_assertions::assert_eq;
    use reqwest::StatusCode;
    use serde_json::{json, Value};

    pub const SERVER_ID: &str = "01FHGJ3NPP7XANQQH8C2BE44ZY";
    pub const USER_ID: &str = "01ARZ3NDEKTSV4RRFFQ69G5FAV";
    pub const CHANNEL_ID: &str = "01FHGJ3NPP6DNXHVQMK0HSPGY9";

    /// Parses a sent body for comparison.
    pub fn sent(body: &Option<Vec<u8>>) -> Option<Value> {
        body.as_deref()
            .and_then(|bytes| serde_json::from_slice(bytes).ok())
    }

    pub fn server_json() -> Value {
        json!({
            "_id": SERVER_ID,
            "owner": USER_ID,
            "name": "Rustaceans",
            "description": "crabs only",
            "channels": [CHANNEL_ID],
            "categories": [{"id": "cat", "title": "General", "channels": [CHANNEL_ID]}],
            "system_messages": {"user_joined": CHANNEL_ID},
            "roles": {},
            "default_permissions": 4_000_000_u64
        })
    }

    pub fn not_found() -> TransportError {
        TransportError::Status {
            status: StatusCode::NOT_FOUND,
            body: r#"{"type":"NotFound"}"#.to_string(),
        }
    }

    #[tokio::test]
    async fn fetch_decodes_and_hydrates() {
        let mut transport = MockTransport::new();
        transport
            .expect_request()
            .withf(|method, path, body| {
                *method == Method::GET && path == format!("/servers/{SERVER_ID}") && body.is_none()
            })
            .times(1)
            .returning(|_, _, _| Ok(serde_json::to_vec(&server_json()).unwrap()));

        let client = Client::with_transport(transport);
        let server = client.fetch_server(SERVER_ID).await.unwrap();

        assert_eq!(server.name, "Rustaceans");
        assert!(server.created_at.is_some());
    }

    #[tokio::test]
    async fn malformed_body_is_a_decode_error() {
        let mut transport = MockTransport::new();
        transport
            .expect_request()
            .returning(|_, _, _| Ok(br#"{"unexpected": true}"#.to_vec()));

        let client = Client::with_transport(transport);
        let error = client.fetch_user(USER_ID).await.unwrap_err();

        assert_eq!(error.kind(), ErrorKind::Decode);
        assert!(matches!(error, Error::Deserialize(_)));
    }

    #[tokio::test]
    async fn transport_errors_pass_through() {
        let mut transport = MockTransport::new();
        transport
            .expect_request()
            .returning(|_, _, _| Err(not_found()));

        let client = Client::with_transport(transport);
        let error = client.fetch_channel(CHANNEL_ID).await.unwrap_err();

        assert!(matches!(
            error,
            Error::Transport(TransportError::Status { status, .. }) if status == StatusCode::NOT_FOUND
        ));
    }

    #[tokio::test]
    async fn unserializable_body_never_reaches_transport() {
        struct Broken;

        impl Serialize for Broken {
            fn serialize<S: serde::Serializer>(&self, _: S) -> std::result::Result<S::Ok, S::Error> {
                Err(serde::ser::Error::custom("cannot encode"))
            }
        }

        let mut transport = MockTransport::new();
        transport.expect_request().never();

        let client = Client::with_transport(transport);
        let error = client
            .request(Method::POST, "/anywhere", Some(&Broken))
            .await
            .unwrap_err();

        assert_eq!(error.kind(), ErrorKind::Serialization);
    }

    #[tokio::test]
    async fn create_server_sends_nonce_and_unwraps_server() {
        let mut transport = MockTransport::new();
        transport
            .expect_request()
            .withf(|method, path, body| {
                let Some(sent) = sent(body) else {
                    return false;
                };
                *method == Method::POST
                    && path == "/servers/create"
                    && sent["name"] == "Rustaceans"
                    && sent.get("description").is_none()
                    && sent["nonce"].as_str().is_some_and(|n| n.len() == 26)
            })
            .times(1)
            .returning(|_, _, _| {
                Ok(serde_json::to_vec(&json!({"server": server_json(), "channels": []})).unwrap())
            });

        let client = Client::with_transport(transport);
        let server = client
            .create_server(&CreateServer::new("Rustaceans"))
            .await
            .unwrap();

        assert_eq!(server.id, SERVER_ID);
    }
}
