use anyhow::{Context, anyhow};
use directories::ProjectDirs;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::error::{Error, Result};

pub const DEFAULT_SYNOPTIC_URL: &str = "https://api.synopticdata.com/v2/stations/timeseries";
pub const DEFAULT_TWILIO_URL: &str = "https://api.twilio.com";
pub const DEFAULT_STATION: &str = "klnk";
pub const DEFAULT_TIMEZONE: &str = "America/Chicago";
pub const DEFAULT_COUNTRY_CODE: &str = "+1";

/// Weather provider settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SynopticConfig {
    pub api_token: Option<String>,
    pub base_url: String,
    pub station_id: String,
    /// IANA timezone the station's calendar day is computed in.
    pub timezone: String,
    pub timeout_secs: u64,
}

impl Default for SynopticConfig {
    fn default() -> Self {
        Self {
            api_token: None,
            base_url: DEFAULT_SYNOPTIC_URL.to_string(),
            station_id: DEFAULT_STATION.to_string(),
            timezone: DEFAULT_TIMEZONE.to_string(),
            timeout_secs: 10,
        }
    }
}

impl SynopticConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// SMS provider credentials and routing.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TwilioConfig {
    pub account_sid: Option<String>,
    pub auth_token: Option<String>,
    pub messaging_service_sid: Option<String>,
    pub base_url: String,
}

impl Default for TwilioConfig {
    fn default() -> Self {
        Self {
            account_sid: None,
            auth_token: None,
            messaging_service_sid: None,
            base_url: DEFAULT_TWILIO_URL.to_string(),
        }
    }
}

/// Everything the job needs, built once at startup.
///
/// Example TOML:
/// ```toml
/// recipients = ["4025551234"]
///
/// [synoptic]
/// api_token = "..."
/// station_id = "klnk"
///
/// [twilio]
/// account_sid = "AC..."
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub synoptic: SynopticConfig,
    pub twilio: TwilioConfig,
    /// Phone numbers without country code.
    pub recipients: Vec<String>,
    pub country_code: String,
    /// Abort the run after this many seconds.
    pub deadline_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            synoptic: SynopticConfig::default(),
            twilio: TwilioConfig::default(),
            recipients: Vec::new(),
            country_code: DEFAULT_COUNTRY_CODE.to_string(),
            deadline_secs: None,
        }
    }
}

impl Config {
    /// Load the optional config file, then overlay the process environment.
    pub fn load() -> anyhow::Result<Self> {
        let path = match std::env::var_os("DIGEST_CONFIG") {
            Some(p) => PathBuf::from(p),
            None => Self::config_file_path()?,
        };

        Self::load_with(&path, |key| std::env::var(key).ok())
    }

    /// Same as [`Config::load`] with an explicit file path and variable lookup.
    pub fn load_with<F>(path: &Path, lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;

            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            Self::default()
        };

        cfg.apply_env(lookup)?;
        Ok(cfg)
    }

    /// Overlay environment-style variables onto this config. Blank values are ignored,
    /// except for the recipient list where an empty value clears it.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(v) = get("SYNOPTIC_API_TOKEN") {
            self.synoptic.api_token = Some(v);
        }
        if let Some(v) = get("SYNOPTIC_API_URL") {
            self.synoptic.base_url = v;
        }
        if let Some(v) = get("SYNOPTIC_STATION_ID") {
            self.synoptic.station_id = v;
        }
        if let Some(v) = get("SYNOPTIC_TIMEZONE") {
            self.synoptic.timezone = v;
        }
        if let Some(v) = get("TWILIO_ACCOUNT_SID") {
            self.twilio.account_sid = Some(v);
        }
        if let Some(v) = get("TWILIO_API_TOKEN") {
            self.twilio.auth_token = Some(v);
        }
        if let Some(v) = get("TWILIO_MESSAGING_SERVICE_SID") {
            self.twilio.messaging_service_sid = Some(v);
        }
        if let Some(v) = lookup("TB_PHONE_NUMBERS") {
            self.recipients = parse_recipients(&v);
        }
        if let Some(v) = get("TB_COUNTRY_CODE") {
            self.country_code = v;
        }
        if let Some(v) = get("DIGEST_DEADLINE_SECS") {
            let secs = v
                .parse()
                .map_err(|_| Error::config(format!("DIGEST_DEADLINE_SECS is not a number: '{v}'")))?;
            self.deadline_secs = Some(secs);
        }

        Ok(())
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_secs.map(Duration::from_secs)
    }

    /// Weather API token, required before any fetch.
    pub fn synoptic_token(&self) -> Result<&str> {
        self.synoptic
            .api_token
            .as_deref()
            .ok_or_else(|| Error::config("SYNOPTIC_API_TOKEN is not set"))
    }

    /// Account SID, auth token and messaging service SID, in that order.
    pub fn twilio_credentials(&self) -> Result<(&str, &str, &str)> {
        fn require<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str> {
            value.as_deref().ok_or_else(|| Error::config(format!("{name} is not set")))
        }

        let twilio = &self.twilio;

        Ok((
            require(&twilio.account_sid, "TWILIO_ACCOUNT_SID")?,
            require(&twilio.auth_token, "TWILIO_API_TOKEN")?,
            require(&twilio.messaging_service_sid, "TWILIO_MESSAGING_SERVICE_SID")?,
        ))
    }

    /// Path to the config file.
    pub fn config_file_path() -> anyhow::Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-digest", "weather-digest")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

/// Split a comma-separated number list, dropping blank entries.
pub fn parse_recipients(raw: &str) -> Vec<String> {
    raw.split(',').map(str::trim).filter(|n| !n.is_empty()).map(String::from).collect()
}
