//! Application Configuration
//!
//! This is the rust representation of the application configuration that
//! drives the native Android synchronization. Applications describe which
//! native integrations they want (Google Maps, Google Mobile Ads, Google
//! Services, Facebook) via optional fields. Every field is optional and an
//! absent field means the integration is disabled.
//!
//! The configuration is usually stored as `app.json`, either as a plain
//! object or wrapped in a top-level `expo` object. A TOML rendition with the
//! same keys is supported as well and selected by the `.toml` file extension.

use crate::android::metadata::MetaDataItemMap;
use serde;
use serde_json;
use toml;

/// Configuration Errors
///
/// This is the exhaustive list of possible errors raised while loading the
/// application configuration. See each error for details.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Reading the configuration file at the specified path failed.
    #[error("cannot read configuration {0:?}: {1}")]
    Read(std::path::PathBuf, std::io::Error),
    /// The content is not valid JSON or does not match the expected types.
    #[error("invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),
    /// The content is not valid TOML or does not match the expected types.
    #[error("invalid TOML configuration: {0}")]
    Toml(#[from] toml::de::Error),
    /// The specified key holds a value that is syntactically correct, but
    /// semantically invalid.
    #[error("invalid value for '{0}'")]
    InvalidValue(&'static str),
}

/// Configuration Format
///
/// Serialization format of a configuration source. Use `from_path()` to
/// derive it from a file-name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Json,
    Toml,
}

impl Format {
    /// Derive format from path
    ///
    /// Files with a `.toml` extension are TOML, everything else is treated
    /// as JSON.
    pub fn from_path(path: &std::path::Path) -> Self {
        match path.extension() {
            Some(v) if v.eq_ignore_ascii_case("toml") => Self::Toml,
            _ => Self::Json,
        }
    }
}

/// Google Maps Table
#[derive(Clone, Debug, Default, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleMapsConfig {
    /// API key handed to the Maps SDK via manifest meta-data.
    pub api_key: Option<String>,
}

/// Native Android Configuration Table
///
/// Sub-type of `AndroidConfig` with settings that are forwarded to native
/// SDKs.
#[derive(Clone, Debug, Default, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AndroidNativeConfig {
    pub google_maps: Option<GoogleMapsConfig>,
    pub google_mobile_ads_app_id: Option<String>,
    pub google_mobile_ads_auto_init: Option<bool>,
}

/// Android Configuration Table
///
/// Sub-type of `AppConfig` with all Android specific settings.
#[derive(Clone, Debug, Default, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AndroidConfig {
    /// Path to `google-services.json` relative to the project directory.
    pub google_services_file: Option<String>,
    /// Additional meta-data entries to place in the main application.
    pub metadata: Option<MetaDataItemMap>,
    /// Settings forwarded to native SDKs.
    pub config: Option<AndroidNativeConfig>,
}

/// Application Configuration
///
/// This type contains the configuration as parsed from its source and
/// converted into rust types via `serde`. It is verified for semantic
/// correctness by `parse_str()` and `parse_path()`, but can also be
/// constructed directly.
///
/// The configuration is treated as an immutable snapshot. All handlers only
/// ever borrow it.
#[derive(Clone, Debug, Default, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    pub facebook_scheme: Option<String>,
    pub facebook_app_id: Option<String>,
    pub facebook_display_name: Option<String>,
    pub facebook_auto_init_enabled: Option<bool>,
    pub facebook_auto_log_app_events_enabled: Option<bool>,
    #[serde(rename = "facebookAdvertiserIDCollectionEnabled")]
    pub facebook_advertiser_id_collection_enabled: Option<bool>,

    pub android: Option<AndroidConfig>,
}

impl AppConfig {
    /// Return the native Android table, if any.
    pub fn android_native(&self) -> Option<&AndroidNativeConfig> {
        self.android.as_ref().and_then(|v| v.config.as_ref())
    }

    /// Return user supplied meta-data
    ///
    /// Return a copy of `android.metadata`, or an empty map if none was
    /// configured.
    pub fn metadata(&self) -> MetaDataItemMap {
        self.android
            .as_ref()
            .and_then(|v| v.metadata.clone())
            .unwrap_or_default()
    }

    // Check whether a string is a valid URI scheme
    //
    // A scheme starts with an ASCII letter, followed by any number of ASCII
    // letters, digits, `+`, `-` or `.`.
    fn is_scheme(s: &str) -> bool {
        let mut chars = s.chars();
        match chars.next() {
            Some(v) if v.is_ascii_alphabetic() => chars.all(
                |v| v.is_ascii_alphanumeric() || v == '+' || v == '-' || v == '.'
            ),
            _ => false,
        }
    }

    fn validate(self) -> Result<Self, Error> {
        // The scheme ends up verbatim in an intent-filter, so restrict it to
        // what Android accepts as URI scheme. Empty means unset.
        if let Some(v) = self.facebook_scheme.as_deref().filter(|v| !v.is_empty()) {
            if !Self::is_scheme(v) {
                return Err(Error::InvalidValue("facebookScheme"));
            }
        }

        if let Some(metadata) = self.android.as_ref().and_then(|v| v.metadata.as_ref()) {
            if metadata.keys().any(|v| v.trim().is_empty()) {
                return Err(Error::InvalidValue("android.metadata"));
            }
        }

        Ok(self)
    }

    fn parse_json(content: &str) -> Result<Self, Error> {
        let mut value: serde_json::Value = serde_json::from_str(content)?;

        // `app.json` usually nests the configuration in an `expo` object.
        // Unwrap it if present.
        if let Some(inner) = value.as_object_mut().and_then(|v| v.remove("expo")) {
            value = inner;
        }

        Ok(<Self as serde::Deserialize>::deserialize(value)?)
    }

    /// Parse configuration from string
    ///
    /// Parse the given string in the specified format. Content is verified
    /// and invalid configurations are refused.
    pub fn parse_str(content: &str, format: Format) -> Result<Self, Error> {
        let raw = match format {
            Format::Json => Self::parse_json(content)?,
            Format::Toml => toml::from_str::<Self>(content)?,
        };

        raw.validate()
    }

    /// Parse configuration from file-system
    ///
    /// Open the specified file and parse it as configuration. The format is
    /// derived from the file extension. The file is completely read into
    /// memory and closed again before the function returns.
    pub fn parse_path(path: &std::path::Path) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path)
            .map_err(|v| Error::Read(path.to_path_buf(), v))?;

        Self::parse_str(&content, Format::from_path(path))
    }
}
