//! Runtime feature flag handling.
//!
//! Integrations are switched on twice: at compile time through cargo features
//! of the backend (`stripe`, `mailer`, `database`, `openapi`) and at runtime
//! through `use_*` flags in the configuration. An integration is active only
//! when its flag is set and its config section is present.

/// Check if a feature is enabled at runtime based on configuration.
pub fn is_feature_enabled<T>(use_feature: bool, feature_config: Option<&T>) -> bool {
    use_feature && feature_config.is_some()
}
