//! Client for the Revolt chat REST API.
//!
//! Entities are plain snapshots of what the API returned. Operations on them
//! take the [`Client`] explicitly:
//!
//! ```no_run
//! # async fn run() -> revolt_client::Result<()> {
//! use revolt_client::{Client, Config};
//!
//! let client = Client::new(&Config::default(), "bot-token")?;
//! let server = client.fetch_server("01FHGJ3NPP7XANQQH8C2BE44ZY").await?;
//! let channel = server.create_text_channel(&client, "general", None).await?;
//! println!("created #{} at {:?}", channel.id, channel.created_at);
//! # Ok(())
//! # }
//! ```

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_possible_truncation)]

pub mod attachment;
pub mod auth;
pub mod ban;
pub mod channel;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod member;
pub mod role;
pub mod server;
pub mod ulid;
pub mod user;

pub use client::{Client, Hydrate};
pub use config::Config;
pub use error::{Error, ErrorKind, Result, TransportError};
pub use ulid::{DecodeError, Ulid};
