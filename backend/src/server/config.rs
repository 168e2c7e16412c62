//! HTTP server configuration object.

use std::net::SocketAddr;

use actix_web::cookie::{Key, SameSite};

use masseurpro::inbound::http::session_config::SessionSettings;
use masseurpro::settings::{AppSettings, SettingsError};

/// Session and binding settings for [`super::create_server`].
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
}

impl ServerConfig {
    /// Combine validated session settings with the configured listen address.
    ///
    /// # Errors
    /// Returns [`SettingsError::BindAddr`] when the address does not parse.
    pub fn from_settings(
        session: SessionSettings,
        settings: &AppSettings,
    ) -> Result<Self, SettingsError> {
        let SessionSettings {
            key,
            cookie_secure,
            same_site,
        } = session;
        Ok(Self {
            key,
            cookie_secure,
            same_site,
            bind_addr: settings.bind_addr()?,
        })
    }

    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
