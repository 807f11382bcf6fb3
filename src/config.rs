use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Error;
use crate::model::Organization;

/// Engine settings loaded from `.orgref.toml`.
/// Defaults apply when the file is absent; a file that exists but is
/// malformed is a hard error, never a silent fallback to defaults.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Path to the platform configuration (organization tree) JSON.
    pub config_path: PathBuf,
    /// Directory the file-backed fetcher resolves widget URLs under.
    pub data_dir: PathBuf,
    /// Path segment of the plugin's pages under the site URL.
    pub default_path: String,
    /// Side-panel scope, when messages are composed next to an object.
    pub side_panel: Option<SidePanelSettings>,
    /// Base URL links are built against.
    pub site_url: String,
    /// Symbol that starts a reference in a message.
    pub symbol: String,
}

/// Side-panel scope as configured: the channel and the object it
/// discusses.
#[derive(Debug, Clone, Deserialize)]
pub struct SidePanelSettings {
    /// Channel the message is posted in.
    pub channel_name: String,
    /// Id of the object the side panel is focused on.
    pub object_id: String,
    /// Name of the object the side panel is focused on.
    pub object_name: String,
    /// Organization owning the focused object's section.
    pub organization_name: String,
    /// Section owning the focused object.
    pub section_name: String,
    /// Team the channel belongs to.
    pub team_name: String,
}

/// Raw TOML structure for `.orgref.toml`.
#[derive(Deserialize)]
struct OrgrefTomlConfig {
    config: Option<PathBuf>,
    data: Option<PathBuf>,
    default_path: Option<String>,
    side_panel: Option<SidePanelSettings>,
    site_url: Option<String>,
    symbol: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        return Self {
            config_path: PathBuf::from("platform.json"),
            data_dir: PathBuf::from("data"),
            default_path: "orgref".to_string(),
            side_panel: None,
            site_url: "http://localhost".to_string(),
            symbol: "#".to_string(),
        };
    }
}

impl Settings {
    /// Load settings from `.orgref.toml` in the given root directory.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading fails (other than not-found),
    /// or `Error::TomlDe` if the TOML is malformed.
    pub fn load(root: &Path) -> Result<Self, Error> {
        let path = root.join(".orgref.toml");
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(Error::Io(e)),
        };

        let raw: OrgrefTomlConfig = toml::from_str(&content)?;
        let defaults = Self::default();
        return Ok(Self {
            config_path: raw.config.unwrap_or(defaults.config_path),
            data_dir: raw.data.unwrap_or(defaults.data_dir),
            default_path: raw.default_path.unwrap_or(defaults.default_path),
            side_panel: raw.side_panel,
            site_url: raw.site_url.unwrap_or(defaults.site_url),
            symbol: raw.symbol.unwrap_or(defaults.symbol),
        });
    }
}

/// Wire structure of the platform configuration file.
#[derive(Deserialize)]
struct PlatformConfig {
    #[serde(default)]
    organizations: Vec<Organization>,
}

/// Load the organization tree from the platform configuration JSON.
///
/// # Errors
///
/// Returns `Error::ConfigNotFound` if the file does not exist,
/// `Error::Io` for other read failures, or `Error::ConfigInvalid` if
/// the JSON does not describe an organization tree.
pub fn load_organizations(path: &Path) -> Result<Vec<Organization>, Error> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::ConfigNotFound { path: path.to_path_buf() });
        },
        Err(e) => return Err(Error::Io(e)),
    };

    let config: PlatformConfig =
        serde_json::from_str(&content).map_err(|e| Error::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    return Ok(config.organizations);
}
