use dotenvy::dotenv;
use serde::Deserialize;
use std::env;

#[derive(Clone, Deserialize)]
pub struct Config {
    pub discord_token: String,
    pub database_path: String,
    pub status_message: String,
    /// fanart.tv API key; backdrop lookup is skipped when unset.
    pub fanart_api_key: Option<String>,
    pub welcome_banner_url: String,
    pub dev_guild_id: Option<u64>,
    pub register_commands: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok();
        Self::build()
    }

    fn build() -> anyhow::Result<Self> {
        Ok(Config {
            discord_token: env::var("DISCORD_TOKEN")
                .map_err(|_| anyhow::anyhow!("DISCORD_TOKEN must be set"))?,
            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "data/cinesquad.db".to_string()),
            status_message: env::var("STATUS_MESSAGE")
                .unwrap_or_else(|_| "Now showing on Bigscreen".to_string()),
            fanart_api_key: env::var("FANART_API_KEY").ok(),
            welcome_banner_url: env::var("WELCOME_BANNER_URL")
                .unwrap_or_else(|_| "https://share.valhalladev.org/u/welcome.jpg".to_string()),
            dev_guild_id: env::var("DEV_GUILD_ID").ok().and_then(|id| id.parse().ok()),
            register_commands: env::var("REGISTER_COMMANDS")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(true),
        })
    }
}

// Keep tokens and API keys out of log output.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("discord_token", &"[REDACTED]")
            .field("database_path", &self.database_path)
            .field("status_message", &self.status_message)
            .field(
                "fanart_api_key",
                &self.fanart_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("welcome_banner_url", &self.welcome_banner_url)
            .field("dev_guild_id", &self.dev_guild_id)
            .field("register_commands", &self.register_commands)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_config_logic() {
        // 1. Test missing vars
        env::remove_var("DISCORD_TOKEN");
        let result = Config::build();
        assert!(
            result.is_err(),
            "Should fail when required vars are missing"
        );

        // 2. Test defaults
        env::set_var("DISCORD_TOKEN", "test_token");
        let config = Config::build().unwrap();
        assert_eq!(config.discord_token, "test_token");
        assert_eq!(config.database_path, "data/cinesquad.db");
        assert!(config.register_commands);

        // 3. Test debug redaction
        env::set_var("FANART_API_KEY", "secret_api_key");
        let config_redacted = Config::build().unwrap();
        let debug_output = format!("{:?}", config_redacted);
        assert!(!debug_output.contains("test_token"));
        assert!(!debug_output.contains("secret_api_key"));
        assert!(debug_output.contains("[REDACTED]"));

        // Cleanup
        env::remove_var("DISCORD_TOKEN");
        env::remove_var("FANART_API_KEY");
    }
}
