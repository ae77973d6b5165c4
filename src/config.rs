//! Site configuration.
//!
//! Every field has a default matching the live site, so an empty JSON object
//! (or no file at all) is a valid configuration.

use serde::{Deserialize, Serialize};
#[cfg(not(target_arch = "wasm32"))]
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Result, SiteError};
use crate::state::session::SESSION_KEY;

/// Top-level settings shared by the browser bundle and the CLI tools
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SiteConfig {
    /// Shop name used in message headers and gallery descriptions
    pub business_name: String,
    /// Messaging deep-link target
    pub messaging: MessagingConfig,
    /// How long status banners stay on screen (milliseconds)
    pub banner_delay_ms: u64,
    /// Unit appended to measurements when the form does not pick one
    pub default_unit: String,
    /// Target of the injected admin nav link and floating button
    pub admin_page: String,
    /// Session storage key holding the admin login flag
    pub session_key: String,
    /// Remote media upload settings, handed to page scripts untouched
    pub media: MediaConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            business_name: "Rudransh Tailoring".to_string(),
            messaging: MessagingConfig::default(),
            banner_delay_ms: 5_000,
            default_unit: "inches".to_string(),
            admin_page: "admin.html".to_string(),
            session_key: SESSION_KEY.to_string(),
            media: MediaConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Parse from a JSON document; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(SiteError::Config)
    }

    pub fn banner_delay(&self) -> Duration {
        Duration::from_millis(self.banner_delay_ms)
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| SiteError::io(path, e))?;
        Self::from_json(&json)
    }

    /// `<config dir>/tailor-site/site.json`
    #[cfg(not(target_arch = "wasm32"))]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tailor-site").join("site.json"))
    }

    /// Load `path` if given, else the default file if it exists, else defaults
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => match Self::default_path().filter(|p| p.is_file()) {
                Some(path) => Self::load(&path),
                None => Ok(Self::default()),
            },
        }
    }
}

/// Where booking messages are handed off
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct MessagingConfig {
    /// Deep-link base, without trailing slash
    pub base_url: String,
    /// Recipient identifier (international number, digits only)
    pub recipient: String,
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://wa.me".to_string(),
            recipient: "918840586403".to_string(),
        }
    }
}

/// Remote media account settings.
///
/// Serialized with camelCase keys because page scripts read it as
/// `window.CLOUDINARY_CONFIG`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct MediaConfig {
    pub cloud_name: String,
    pub upload_preset: String,
    pub folder: String,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            cloud_name: "YOUR_CLOUD_NAME".to_string(),
            upload_preset: "rudransh_uploads".to_string(),
            folder: "rudransh_gallery".to_string(),
        }
    }
}

impl MediaConfig {
    /// Render the browser script that publishes this config on `window`
    pub fn to_script(&self) -> Result<String> {
        let body = serde_json::to_string_pretty(self)?;
        Ok(format!(
            "/**\n * Media upload configuration (generated)\n */\n\nconst CLOUDINARY_CONFIG = {};\n\nwindow.CLOUDINARY_CONFIG = CLOUDINARY_CONFIG;\n",
            body
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_is_default() {
        let config = SiteConfig::from_json("{}").unwrap();
        assert_eq!(config, SiteConfig::default());
        assert_eq!(config.banner_delay(), Duration::from_secs(5));
    }

    #[test]
    fn test_partial_override() {
        let config =
            SiteConfig::from_json(r#"{"messaging": {"recipient": "919999999999"}, "default_unit": "cm"}"#)
                .unwrap();
        assert_eq!(config.messaging.recipient, "919999999999");
        assert_eq!(config.messaging.base_url, "https://wa.me");
        assert_eq!(config.default_unit, "cm");
        assert_eq!(config.session_key, "adminLoggedIn");
    }

    #[test]
    fn test_bad_json_is_config_error() {
        let err = SiteConfig::from_json("{not json").unwrap_err();
        assert!(matches!(err, SiteError::Config(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("site.json");
        std::fs::write(&path, r#"{"business_name": "Stitch & Co", "banner_delay_ms": 1500}"#).unwrap();

        let config = SiteConfig::load_or_default(Some(&path)).unwrap();
        assert_eq!(config.business_name, "Stitch & Co");
        assert_eq!(config.banner_delay(), Duration::from_millis(1500));

        let err = SiteConfig::load(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, SiteError::Io { .. }));
    }

    #[test]
    fn test_media_script_uses_camel_case() {
        let script = MediaConfig::default().to_script().unwrap();
        assert!(script.contains("\"cloudName\": \"YOUR_CLOUD_NAME\""));
        assert!(script.contains("\"uploadPreset\": \"rudransh_uploads\""));
        assert!(script.contains("window.CLOUDINARY_CONFIG = CLOUDINARY_CONFIG;"));
    }
}
