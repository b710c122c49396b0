use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub airtable_api_key: String,
    pub airtable_base_id: String,
    pub airtable_api_url: String,
    pub deepl_auth_key: String,
    pub deepl_api_url: String,
    pub azure_translator_key: String,
    pub azure_translator_endpoint: String,
    pub azure_translator_region: String,
    pub firebase_project_id: String,
    pub smtp_host: String,
    pub smtp_user: String,
    pub smtp_pass: String,
    pub mail_from: String,
    pub mail_from_name: String,
    pub public_base_url: String,
    pub contact_rate_limit_max: u32,
    pub contact_rate_limit_window_secs: u64,
    /// Honour `x-forwarded-for` for client IPs. Only safe behind a proxy that overwrites it.
    pub trust_proxy: bool,
    /// When set, Airtable automation endpoints require a matching `x-webhook-secret`.
    pub sync_webhook_secret: Option<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |key: &str| -> Result<String> {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .with_context(|| format!("Required environment variable '{key}' is not set"))
        };
        let or_default = |key: &str, default: &str| -> String {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Ok(Config {
            database_url: require("DATABASE_URL")?,
            airtable_api_key: require("AIRTABLE_API_KEY")?,
            airtable_base_id: require("AIRTABLE_BASE_ID")?,
            airtable_api_url: or_default("AIRTABLE_API_URL", "https://api.airtable.com"),
            deepl_auth_key: require("DEEPL_AUTH_KEY")?,
            deepl_api_url: or_default("DEEPL_API_URL", "https://api-free.deepl.com"),
            azure_translator_key: require("AZURE_TRANSLATOR_KEY")?,
            azure_translator_endpoint: require("AZURE_TRANSLATOR_ENDPOINT")?,
            azure_translator_region: or_default("AZURE_TRANSLATOR_REGION", "global"),
            firebase_project_id: require("FIREBASE_PROJECT_ID")?,
            smtp_host: require("SMTP_HOST")?,
            smtp_user: require("SMTP_USER")?,
            smtp_pass: require("SMTP_PASS")?,
            mail_from: require("MAIL_FROM")?,
            mail_from_name: or_default("MAIL_FROM_NAME", "LinkIT"),
            public_base_url: or_default("PUBLIC_BASE_URL", "https://www.linkit-hr.com")
                .trim_end_matches('/')
                .to_string(),
            contact_rate_limit_max: or_default("CONTACT_RATE_LIMIT_MAX", "5")
                .parse::<u32>()
                .context("CONTACT_RATE_LIMIT_MAX must be a positive integer")?,
            contact_rate_limit_window_secs: or_default("CONTACT_RATE_LIMIT_WINDOW_SECS", "900")
                .parse::<u64>()
                .context("CONTACT_RATE_LIMIT_WINDOW_SECS must be a positive integer")?,
            trust_proxy: or_default("TRUST_PROXY", "false")
                .parse::<bool>()
                .context("TRUST_PROXY must be true or false")?,
            sync_webhook_secret: lookup("SYNC_WEBHOOK_SECRET").filter(|v| !v.is_empty()),
            port: or_default("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: or_default("RUST_LOG", "info"),
        })
    }
}
