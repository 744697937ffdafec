//! Integration tests for layered configuration.
//!
//! Uses figment::Jail for sandboxed files and env vars.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment, Jail,
};
use wealthsync_core::{ConfigError, WealthConfig};

#[test]
fn loads_ai_section_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[ai]
provider = "openai"
api_key = "sk-test"
model = "gpt-4o"
max_tokens = 4096
max_attempts = 2

[storage]
data_dir = "/var/lib/wealthsync"
"#,
        )?;

        let config: WealthConfig = Figment::from(Serialized::defaults(WealthConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.ai.provider, "openai");
        assert_eq!(config.ai.model, "gpt-4o");
        assert_eq!(config.ai.max_tokens, 4096);
        assert_eq!(config.ai.attempts(), 2);
        assert_eq!(config.ai.timeout_secs, 120);
        assert!(config.ai.is_configured());
        assert_eq!(
            config.storage.resolved_data_dir(),
            std::path::PathBuf::from("/var/lib/wealthsync")
        );
        Ok(())
    });
}

#[test]
fn env_beats_toml() {
    Jail::expect_with(|jail| {
        jail.create_file("config.toml", "[ai]\napi_key = \"from-toml\"\n")?;
        jail.set_env("WEALTHSYNC_AI__API_KEY", "from-env");
        jail.set_env("WEALTHSYNC_NOTIFICATIONS__FEED_CAPACITY", "10");

        let config: WealthConfig = Figment::from(Serialized::defaults(WealthConfig::default()))
            .merge(Toml::file("config.toml"))
            .merge(Env::prefixed("WEALTHSYNC_").split("__"))
            .extract()?;

        assert_eq!(config.ai.api_key, "from-env");
        assert_eq!(config.notifications.feed_capacity, 10);
        Ok(())
    });
}

#[test]
fn project_file_is_picked_up_by_load() {
    Jail::expect_with(|jail| {
        jail.create_dir(".wealthsync")?;
        jail.create_file(".wealthsync/config.toml", "[ai]\nprovider = \"ollama\"\nmodel = \"llama3\"\n")?;

        let config = WealthConfig::load().expect("config loads");
        assert_eq!(config.ai.provider, "ollama");
        assert!(config.ai.is_configured());
        Ok(())
    });
}

#[test]
fn zero_timeout_is_rejected() {
    Jail::expect_with(|jail| {
        jail.set_env("WEALTHSYNC_AI__TIMEOUT_SECS", "0");
        let err = WealthConfig::load().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "ai.timeout_secs"));
        Ok(())
    });
}
