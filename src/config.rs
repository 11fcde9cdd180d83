use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File};
use serde_aux::field_attributes::deserialize_number_from_string;
use std::path::{Path, PathBuf};
use std::time;

use crate::domain::email_address::EmailAddress;
use crate::notice::NoticeAddress;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub email_client: EmailClientSettings,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct ApplicationSettings {
    pub roster_path: PathBuf,
    pub certificate_dir: PathBuf,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_days: i64,
    pub really_send: bool,
    pub verbose: bool,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct EmailClientSettings {
    pub smtp_host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub smtp_port: u16,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_seconds: u64,
    pub sender_name: String,
    pub sender_email: String,
    pub ticket_tracker_host: String,
}

/// Values given on the command line; they win over every other source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub roster_path: Option<PathBuf>,
    pub certificate_dir: Option<PathBuf>,
    pub max_days: Option<i64>,
    pub really_send: Option<bool>,
    pub verbose: Option<bool>,
}

impl Settings {
    pub fn get_roster_path(&self) -> &Path {
        &self.application.roster_path
    }

    pub fn get_certificate_dir(&self) -> &Path {
        &self.application.certificate_dir
    }

    pub fn get_max_days(&self) -> i64 {
        self.application.max_days
    }

    pub fn is_really_send(&self) -> bool {
        self.application.really_send
    }

    pub fn is_verbose(&self) -> bool {
        self.application.verbose
    }

    pub fn get_email_client_sender(&self) -> Result<NoticeAddress, String> {
        self.email_client.get_sender()
    }
}

impl EmailClientSettings {
    pub fn get_sender(&self) -> Result<NoticeAddress, String> {
        let email = EmailAddress::parse(self.sender_email.clone())?;

        Ok(NoticeAddress::new(Some(self.sender_name.clone()), email))
    }

    pub fn get_timeout(&self) -> time::Duration {
        time::Duration::from_secs(self.timeout_seconds)
    }
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "development" => Ok(Self::Development),
            "production" => Ok(Self::Production),
            unknown_env => Err(format!(
                "{} is not supported environment. Use either 'development' or 'production'.",
                unknown_env
            )),
        }
    }
}

/// Builds the settings from defaults, `<config_dir>/base.*`,
/// `<config_dir>/<environment>.*`, `APP_*` variables and `overrides`.
pub fn get_configuration(
    config_dir: &Path,
    overrides: &ConfigOverrides,
) -> Result<Settings, ConfigError> {
    // Uses development environment by default
    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "development".into())
        .try_into()
        .map_err(ConfigError::Message)?;

    tracing::info!("Application environment = {:?}", environment);

    build_configuration(environment, config_dir, overrides)
}

fn build_configuration(
    environment: Environment,
    config_dir: &Path,
    overrides: &ConfigOverrides,
) -> Result<Settings, ConfigError> {
    let config_base_filepath = config_dir.join("base");
    let config_env_filepath = config_dir.join(environment.as_str());

    let builder = with_defaults(Config::builder())?
        .add_source(File::from(config_base_filepath).required(false))
        .add_source(File::from(config_env_filepath).required(false))
        // Merge settings from environment variables with a prefix of APP and "__" separator
        // E.g APP_APPLICATION__MAX_DAYS would set Settings.application.max_days
        .add_source(config::Environment::with_prefix("app").separator("__"));

    with_overrides(builder, overrides)?
        .build()?
        .try_deserialize()
}

fn with_defaults(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    builder
        .set_default("application.roster_path", "/home/ansible/clientlist.yaml")?
        .set_default(
            "application.certificate_dir",
            "/home/ansible/data/easyrsa3/pki/issued",
        )?
        .set_default("application.max_days", 31_i64)?
        .set_default("application.really_send", false)?
        .set_default("application.verbose", true)?
        .set_default("email_client.smtp_host", "localhost")?
        .set_default("email_client.smtp_port", 25_i64)?
        .set_default("email_client.timeout_seconds", 10_i64)?
        .set_default("email_client.sender_name", "vpsFree.cz IPv6 tunely")?
        .set_default("email_client.sender_email", "ipv6tun@vpsfree.cz")?
        .set_default("email_client.ticket_tracker_host", "rt.vpsfree.cz")
}

fn with_overrides(
    mut builder: ConfigBuilder<DefaultState>,
    overrides: &ConfigOverrides,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    if let Some(roster_path) = &overrides.roster_path {
        builder = builder.set_override(
            "application.roster_path",
            roster_path.to_string_lossy().into_owned(),
        )?;
    }
    if let Some(certificate_dir) = &overrides.certificate_dir {
        builder = builder.set_override(
            "application.certificate_dir",
            certificate_dir.to_string_lossy().into_owned(),
        )?;
    }
    if let Some(max_days) = overrides.max_days {
        builder = builder.set_override("application.max_days", max_days)?;
    }
    if let Some(really_send) = overrides.really_send {
        builder = builder.set_override("application.really_send", really_send)?;
    }
    if let Some(verbose) = overrides.verbose {
        builder = builder.set_override("application.verbose", verbose)?;
    }

    Ok(builder)
}
