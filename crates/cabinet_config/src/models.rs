// --- File: crates/cabinet_config/src/models.rs ---

use serde::{Deserialize, Serialize};

// --- General Server Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 4242,
        }
    }
}

// --- Booking Policy Config ---
/// Business rules applied to every candidate slot, at checkout and again at confirmation.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct BookingConfig {
    /// IANA zone in which the practitioner's wall-clock times are expressed.
    pub timezone: String,
    /// Minimum hours between now and an in-person (cabinet) appointment.
    pub cabinet_lead_hours: i64,
    /// Minimum hours between now and a visio/telephone appointment.
    pub remote_lead_hours: i64,
    pub enforce_remote_window: bool,
    /// "HH:MM", inclusive.
    pub remote_window_start: String,
    /// "HH:MM", inclusive.
    pub remote_window_end: String,
    /// Price in the smallest currency unit (e.g. cents).
    pub unit_amount: i64,
    pub currency: String,
    /// Prefix of the line-item label, the service type is appended.
    pub product_label: String,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            timezone: "Europe/Paris".to_string(),
            cabinet_lead_hours: 24,
            remote_lead_hours: 2,
            enforce_remote_window: true,
            remote_window_start: "07:00".to_string(),
            remote_window_end: "23:30".to_string(),
            unit_amount: 8000,
            currency: "eur".to_string(),
            product_label: "Consultation".to_string(),
        }
    }
}

// --- Reservation file store ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StoreConfig {
    pub path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: "reservations.json".to_string(),
        }
    }
}

// --- Database Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub url: String, // e.g. sqlite://reservations.db, loaded via CABINET__DATABASE__URL
}

// --- Stripe Config ---
// Secrets are written as "secret_from_env" and resolved from
// STRIPE_SECRET_KEY / STRIPE_WEBHOOK_SECRET at load time.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StripeConfig {
    pub success_url: String, // Mandatory
    pub cancel_url: String,  // Mandatory
    #[serde(default)]
    pub secret_key: Option<String>,
    #[serde(default)]
    pub webhook_secret: Option<String>,
    /// Maximum age of a signed webhook timestamp; 0 disables the check.
    #[serde(default = "default_signature_tolerance")]
    pub signature_tolerance_secs: i64,
}

fn default_signature_tolerance() -> i64 {
    300
}

// --- SMTP Mailer Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MailerConfig {
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String, // secret_from_env -> MAILER_SMTP_PASSWORD
    /// Sender address; falls back to the SMTP username when absent.
    #[serde(default)]
    pub from: Option<String>,
    /// Recipient of new-reservation notices. No address, no notices.
    #[serde(default)]
    pub admin_email: Option<String>,
}

fn default_smtp_port() -> u16 {
    587
}

// --- Calendar Feed Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct CalendarConfig {
    pub name: String,
    pub location: Option<String>,
    pub url: Option<String>,
    pub event_minutes: i64,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            name: "Cabinet".to_string(),
            location: None,
            url: None,
            event_minutes: 60,
        }
    }
}

// --- Logging Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Directory for daily-rolling log files; stderr only when absent.
    pub dir: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: None,
        }
    }
}

// --- Unified App Configuration ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    // --- Runtime Flags (optional in config file, default to false) ---
    #[serde(default)]
    pub use_stripe: bool,
    #[serde(default)]
    pub use_mailer: bool,

    #[serde(default)]
    pub booking: BookingConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub calendar: CalendarConfig,
    #[serde(default)]
    pub logging: LoggingConfig,

    // --- Optional Feature Configurations ---
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
    #[serde(default)]
    pub stripe: Option<StripeConfig>,
    #[serde(default)]
    pub mailer: Option<MailerConfig>,
}
