//! Telegram bot login flow.
//!
//! Authentication is delegated to a Telegram bot: the user opens a deep
//! link, the bot verifies their identity and redirects back with a
//! one-time code, and the code is exchanged for a bearer token.
//!
//! Whether the integration is available is decided once at startup: if no
//! bot URL is configured the capability check yields an explicit demo
//! fallback instead of a runtime-conditional path.

use anyhow::Result;
use tracing::{info, warn};

use crate::api::ApiClient;
use crate::config::Config;
use crate::models::User;

use super::SessionStore;

/// Start parameter the bot turns into a login callback
const LOGIN_START_PARAM: &str = "login";

/// Login capability resolved at startup.
pub enum LoginCapability {
    /// Bot integration configured; real logins go through it.
    Telegram(TelegramLogin),
    /// Bot integration unavailable. Callers get a disabled login surface
    /// with an explicit local demo session path.
    Demo,
}

impl LoginCapability {
    pub fn detect(config: &Config) -> Self {
        match config.bot_url() {
            Some(url) => LoginCapability::Telegram(TelegramLogin {
                bot_url: url.to_string(),
            }),
            None => {
                warn!("Telegram bot URL not configured; login limited to demo sessions");
                LoginCapability::Demo
            }
        }
    }
}

pub struct TelegramLogin {
    bot_url: String,
}

impl TelegramLogin {
    /// Deep link that sends the user to the bot for identity verification.
    pub fn login_url(&self) -> String {
        format!("{}?start={}", self.bot_url, LOGIN_START_PARAM)
    }

    /// Complete the flow: exchange the one-time code returned by the bot
    /// and start the session.
    pub async fn complete(
        &self,
        client: &ApiClient,
        store: &SessionStore,
        code: &str,
    ) -> Result<()> {
        let exchange = client.exchange_code(code).await?;
        let user = User::from_exchange(exchange.user, exchange.access_token);
        info!(username = %user.username, "Telegram login complete");
        store.login(user);
        Ok(())
    }
}

/// Start a local demo session. No network, no real credential; the
/// synchronizer stays quiet because demo setups have no API URL either.
pub fn demo_login(store: &SessionStore) {
    store.login(demo_user());
}

fn demo_user() -> User {
    User {
        id: "demo".to_string(),
        username: "ghost_runner".to_string(),
        telegram_id: 0,
        role: "runner".to_string(),
        clan: "UNAFFILIATED".to_string(),
        up_coins: 100,
        ref_code: "UP-DEMO0".to_string(),
        avatar_url: None,
        is_verified: false,
        membership_level: None,
        token: "demo-token".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_without_bot_url_is_demo() {
        let config = Config::default();
        assert!(matches!(LoginCapability::detect(&config), LoginCapability::Demo));
    }

    #[test]
    fn test_detect_with_bot_url_builds_deep_link() {
        let config = Config {
            bot_url: Some("https://t.me/UPCworld_bot".to_string()),
            ..Default::default()
        };
        match LoginCapability::detect(&config) {
            LoginCapability::Telegram(login) => {
                assert_eq!(login.login_url(), "https://t.me/UPCworld_bot?start=login");
            }
            LoginCapability::Demo => panic!("expected Telegram capability"),
        }
    }
}
