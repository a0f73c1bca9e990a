use color_eyre::{eyre::eyre, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Top-level configuration, mirroring the dotted keys of the platform
/// (`catalog/lists/size`, `account/watch/maxitems`, ...). Every behavioral
/// threshold has a built-in default, so a missing file is not an error.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
  /// Active locale for translated messages
  pub locale: String,
  /// Message catalog overrides for the active locale
  pub messages: HashMap<String, String>,
  pub catalog: CatalogConfig,
  pub account: AccountConfig,
  pub cache: CacheConfig,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      locale: "en".to_string(),
      messages: HashMap::new(),
      catalog: CatalogConfig::default(),
      account: AccountConfig::default(),
      cache: CacheConfig::default(),
    }
  }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CatalogConfig {
  pub lists: CatalogListsConfig,
  pub session: CatalogSessionConfig,
}

/// How many category tree levels a listing includes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogLevels {
  /// Only the requested category
  #[serde(rename = "self")]
  SelfOnly,
  /// The requested category and its direct children
  Children,
  /// The whole subtree below the requested category
  #[default]
  Subtree,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CatalogListsConfig {
  /// Default page size, kept within [1,100]
  pub size: u32,
  /// Upper bound for the requested page number
  pub pages: u32,
  pub levels: CatalogLevels,
  /// Ordered subpart clients composed into the list body
  pub subparts: Vec<String>,
  /// Domain entities whose changes invalidate cached list fragments
  pub domains: Vec<String>,
  /// Fragment lifetime in seconds; unset means "until tag invalidation"
  pub cache_seconds: Option<i64>,
}

impl Default for CatalogListsConfig {
  fn default() -> Self {
    Self {
      size: 48,
      pages: 100,
      levels: CatalogLevels::Subtree,
      subparts: vec!["items".to_string()],
      domains: vec!["product".to_string(), "catalog".to_string()],
      cache_seconds: None,
    }
  }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CatalogSessionConfig {
  pub pinned: PinnedConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PinnedConfig {
  /// Maximum number of pinned products per visitor
  pub maxitems: u32,
}

impl Default for PinnedConfig {
  fn default() -> Self {
    Self { maxitems: 50 }
  }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AccountConfig {
  pub watch: AccountWatchConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AccountWatchConfig {
  /// Maximum number of watched products per customer
  pub maxitems: u32,
  /// Default watch period in days when the request carries none
  pub timeframe: i64,
}

impl Default for AccountWatchConfig {
  fn default() -> Self {
    Self {
      maxitems: 100,
      timeframe: 7,
    }
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
  #[default]
  Memory,
  Sqlite,
  None,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
  pub enabled: bool,
  pub backend: CacheBackend,
  /// Listing parameters a cached render may vary by. Any other `f_`/`l_`
  /// prefixed parameter in the request bypasses the cache entirely.
  pub allow_params: Vec<String>,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      backend: CacheBackend::Memory,
      allow_params: vec![
        "f_catid".to_string(),
        "f_supid".to_string(),
        "f_sort".to_string(),
        "l_page".to_string(),
        "l_size".to_string(),
        "l_type".to_string(),
      ],
    }
  }
}

/// Stable digest of a config section. Mixed into every cache key so a
/// config change implicitly invalidates the affected fragments.
pub fn fingerprint<T: Serialize>(section: &T) -> String {
  let json = serde_json::to_string(section).unwrap_or_default();
  let mut hasher = Sha256::new();
  hasher.update(json.as_bytes());
  hex::encode(hasher.finalize())
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./shopfront.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/shopfront/config.yaml
  ///
  /// Without a file, the built-in defaults apply.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Ok(Self::default()),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("shopfront.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("shopfront").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    let config: Config = serde_yaml::from_str(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))?;

    Ok(config)
  }
}
