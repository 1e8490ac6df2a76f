//! Scoped store connections

use murmur_core::{AccessToken, MurmurError, Result, SearchContext, StoreSettings, SQL_SCOPE};
use sqlx::postgres::{PgConnectOptions, PgConnection, PgSslMode};
use sqlx::Connection;
use std::str::FromStr;
use tracing::{debug, info};

/// `application_name` reported by store sessions
pub const APPLICATION_NAME: &str = "murmur";

/// One live connection to the feedback store.
///
/// Opened right before a query and closed right after it. Dropping a session
/// without calling [`StoreSession::close`] still releases the socket.
pub struct StoreSession {
    conn: PgConnection,
}

impl StoreSession {
    /// Connection options for the store; the access token is the password
    pub fn connect_options(settings: &StoreSettings, token: &AccessToken) -> Result<PgConnectOptions> {
        let ssl_mode = PgSslMode::from_str(&settings.ssl_mode).map_err(|_| {
            MurmurError::config(format!("Invalid sslmode '{}'", settings.ssl_mode))
        })?;

        Ok(PgConnectOptions::new()
            .host(&settings.server)
            .port(settings.port)
            .database(&settings.database)
            .username(&settings.user)
            .password(token.secret())
            .ssl_mode(ssl_mode)
            .application_name(APPLICATION_NAME))
    }

    /// Open a session with a fresh store token from the context credential
    pub async fn open(context: &SearchContext) -> Result<Self> {
        let settings = &context.settings().store;
        let token = context.credential().get_token(SQL_SCOPE).await?;
        let options = Self::connect_options(settings, &token)?;

        info!(
            "Connecting to {}:{}/{} as {}",
            settings.server, settings.port, settings.database, settings.user
        );
        let conn = PgConnection::connect_with(&options).await?;
        Ok(Self { conn })
    }

    /// Open a session from a connection URL
    pub async fn connect(url: &str) -> Result<Self> {
        let conn = PgConnection::connect(url).await?;
        Ok(Self { conn })
    }

    /// Underlying connection
    pub fn connection(&mut self) -> &mut PgConnection {
        &mut self.conn
    }

    /// Close the session gracefully
    pub async fn close(self) -> Result<()> {
        self.conn.close().await?;
        debug!("Store session closed");
        Ok(())
    }
}
