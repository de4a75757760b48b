use config::{Config, Environment, File};
use once_cell::sync::OnceCell;
use serde_json::Value;
use std::env;
use std::path::PathBuf;
use thiserror::Error;
use tracing::warn;

pub mod models;
pub use models::*;

/// Marker used in config files for values that must come from the environment.
pub const SECRET_MARKER: &str = "secret_from_env";

#[derive(Error, Debug)]
pub enum ConfigLoadError {
    #[error("failed to read configuration: {0}")]
    Source(#[from] config::ConfigError),
    #[error("failed to resolve secrets in configuration: {0}")]
    Secrets(#[from] serde_json::Error),
}

/// Loads the application configuration.
///
/// Layers, later ones winning:
/// 1. `{CONFIG_DIR}/default.*`
/// 2. `{CONFIG_DIR}/{RUN_ENV}.*` (RUN_ENV defaults to `debug`)
/// 3. environment variables `{PREFIX}__SECTION__KEY` (PREFIX defaults to `CABINET`)
///
/// Afterwards every `secret_from_env` value is replaced from the environment.
pub fn load_config() -> Result<AppConfig, ConfigLoadError> {
    ensure_dotenv_loaded();

    let run_env = env::var("RUN_ENV").unwrap_or_else(|_| "debug".to_string());
    let prefix = env::var("PREFIX").unwrap_or_else(|_| "CABINET".to_string());
    let config_dir = PathBuf::from(env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string()));

    let default_path = config_dir.join("default");
    let env_path = config_dir.join(&run_env);

    let builder = Config::builder()
        .add_source(File::with_name(&default_path.to_string_lossy()).required(false))
        .add_source(File::with_name(&env_path.to_string_lossy()).required(false))
        .add_source(
            Environment::with_prefix(&prefix)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

    let raw_config: AppConfig = builder.build()?.try_deserialize()?;
    apply_env_overrides_from_marker(raw_config)
}

/// Replaces all `secret_from_env` string values with environment variable values.
///
/// The variable name is the value's path joined with `_` and uppercased,
/// so `stripe.webhook_secret` reads `STRIPE_WEBHOOK_SECRET`.
pub fn apply_env_overrides_from_marker(config: AppConfig) -> Result<AppConfig, ConfigLoadError> {
    let mut json = serde_json::to_value(&config)?;
    inject_env_secrets(&mut json);
    Ok(serde_json::from_value(json)?)
}

fn inject_env_secrets(value: &mut Value) {
    fn walk(path: &mut Vec<String>, obj: &mut Value) {
        match obj {
            Value::Object(map) => {
                for (k, v) in map.iter_mut() {
                    path.push(k.to_string());
                    walk(path, v);
                    path.pop();
                }
            }
            Value::String(s) if s == SECRET_MARKER => {
                let env_key = path.join("_").to_uppercase();
                match env::var(&env_key) {
                    Ok(env_val) => *s = env_val,
                    Err(_) => warn!("env var {} not found for {}", env_key, SECRET_MARKER),
                }
            }
            _ => {}
        }
    }

    walk(&mut Vec::new(), value);
}

static INIT_DOTENV: OnceCell<()> = OnceCell::new();

/// Loads the dotenv file once per process.
///
/// `DOTENV_OVERRIDE` selects another file; otherwise `.env` in the working directory.
/// Returns the path that was tried.
pub fn ensure_dotenv_loaded() -> String {
    let dotenv_path = env::var("DOTENV_OVERRIDE").unwrap_or_else(|_| ".env".to_string());

    INIT_DOTENV.get_or_init(|| {
        dotenv::from_filename(&dotenv_path).ok();
    });

    dotenv_path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_describe_the_reference_policy() {
        let config = AppConfig::default();
        assert_eq!(config.booking.timezone, "Europe/Paris");
        assert_eq!(config.booking.cabinet_lead_hours, 24);
        assert_eq!(config.booking.remote_lead_hours, 2);
        assert_eq!(config.booking.remote_window_start, "07:00");
        assert_eq!(config.booking.remote_window_end, "23:30");
        assert_eq!(config.store.path, "reservations.json");
        assert_eq!(config.calendar.event_minutes, 60);
        assert!(!config.use_stripe);
    }

    #[test]
    fn test_secret_marker_is_resolved_from_env() {
        env::set_var("STRIPE_WEBHOOK_SECRET", "whsec_from_env");
        let config = AppConfig {
            stripe: Some(StripeConfig {
                success_url: "https://example.com/success".to_string(),
                cancel_url: "https://example.com/cancel".to_string(),
                secret_key: Some("sk_inline".to_string()),
                webhook_secret: Some(SECRET_MARKER.to_string()),
                signature_tolerance_secs: 300,
            }),
            ..AppConfig::default()
        };

        let resolved = apply_env_overrides_from_marker(config).unwrap();
        let stripe = resolved.stripe.unwrap();
        assert_eq!(stripe.webhook_secret.as_deref(), Some("whsec_from_env"));
        assert_eq!(stripe.secret_key.as_deref(), Some("sk_inline"));
    }

    #[test]
    fn test_missing_secret_keeps_marker() {
        let config = AppConfig {
            mailer: Some(MailerConfig {
                smtp_host: "smtp.example.com".to_string(),
                smtp_port: 587,
                smtp_username: "user".to_string(),
                smtp_password: SECRET_MARKER.to_string(),
                from: None,
                admin_email: None,
            }),
            ..AppConfig::default()
        };
        env::remove_var("MAILER_SMTP_PASSWORD");

        let resolved = apply_env_overrides_from_marker(config).unwrap();
        assert_eq!(resolved.mailer.unwrap().smtp_password, SECRET_MARKER);
    }

    #[test]
    fn test_partial_sections_fall_back_to_defaults() {
        let config: AppConfig = serde_json::from_str(
            r#"{ "server": { "host": "0.0.0.0", "port": 8080 }, "booking": { "remote_lead_hours": 3 } }"#,
        )
        .unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.booking.remote_lead_hours, 3);
        assert_eq!(config.booking.cabinet_lead_hours, 24);
        assert!(config.stripe.is_none());
    }
}
