use crate::{
    client::Client,
    config::Config,
    error::{Error, Result, TransportError},
    user::User,
};

/// Checks the token by fetching the account it belongs to.
pub async fn validate_token(client: &Client) -> Result<User> {
    let user = client.fetch_self().await?;
    tracing::info!(user = %user.tag(), bot = user.is_bot(), "validated token");
    Ok(user)
}

/// Builds a client for `token` and validates it in one go.
pub async fn authenticate(config: &Config, token: &str) -> Result<(Client, User)> {
    let client = Client::new(config, token)?;
    let user = validate_token(&client).await?;
    Ok((client, user))
}

/// Whether the API turned the token down.
pub fn is_rejected_token(error: &Error) -> bool {
    match error {
        Error::Transport(TransportError::InvalidToken) => true,
        Error::Transport(e) => e.status().is_some_and(|status| status.as_u16() == 401),
        _ => false,
    }
}
