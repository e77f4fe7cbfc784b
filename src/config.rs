//! Configuration management for sync tuning and paths.

use std::{
   fs,
   path::{Path, PathBuf},
   sync::OnceLock,
};

use directories::BaseDirs;
use figment::{
   Figment,
   providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

static CONFIG: OnceLock<Config> = OnceLock::new();

/// Application configuration loaded from config file and environment variables
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
   /// Vault-relative folder that receives newly created documents.
   pub media_folder: String,
   /// How long a save waits on a contended identifier lock before giving up.
   pub lock_timeout_ms: u64,
   /// Processed items between cooperative yields during a batch run.
   pub yield_every: usize,
}

impl Default for Config {
   fn default() -> Self {
      Self {
         media_folder:    "Media".to_string(),
         lock_timeout_ms: 10_000,
         yield_every:     crate::sync::DEFAULT_YIELD_EVERY,
      }
   }
}

impl Config {
   pub fn load() -> Self {
      Self::load_with_vault_path(None)
   }

   pub fn load_with_vault(root: &Path) -> Self {
      Self::load_with_vault_path(Some(root))
   }

   fn load_with_vault_path(vault_root: Option<&Path>) -> Self {
      let config_path = ensure_global_config();

      let mut figment =
         Figment::from(Serialized::defaults(Self::default())).merge(Toml::file(config_path));

      if let Some(root) = vault_root {
         let vault_path = vault_config_path(root);
         if vault_path.exists() {
            figment = figment.merge(Toml::file(vault_path));
         }
      }

      figment
         .merge(Env::prefixed("MALSYNC_").lowercase(true))
         .extract()
         .inspect_err(|e| tracing::warn!("failed to parse config: {e}"))
         .unwrap_or_default()
   }

   fn create_default_config(path: &Path) {
      if let Some(parent) = path.parent() {
         let _ = fs::create_dir_all(parent);
      }
      let default_config = Self::default();
      if let Ok(toml) = toml::to_string_pretty(&default_config) {
         let _ = fs::write(path, toml);
      }
   }

   pub fn lock_timeout(&self) -> std::time::Duration {
      std::time::Duration::from_millis(self.lock_timeout_ms)
   }
}

/// Returns the global configuration instance
pub fn get() -> &'static Config {
   CONFIG.get_or_init(Config::load)
}

/// Initializes config using a vault-root `.malsync.toml` if present.
pub fn init_for_vault(root: &Path) -> &'static Config {
   let root = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
   CONFIG.get_or_init(|| Config::load_with_vault(&root))
}

/// Returns the base directory for malsync data and configuration
pub fn base_dir() -> &'static PathBuf {
   static ONCE: OnceLock<PathBuf> = OnceLock::new();
   ONCE.get_or_init(|| resolve_base_dir(".malsync"))
}

fn ensure_global_config() -> PathBuf {
   let config_path = config_file_path();
   if !config_path.exists() {
      Config::create_default_config(config_path);
   }
   config_path.to_path_buf()
}

pub fn vault_config_path(root: &Path) -> PathBuf {
   root.join(".malsync.toml")
}

fn resolve_base_dir(dir_name: &str) -> PathBuf {
   BaseDirs::new()
      .map(|d| d.home_dir().join(dir_name))
      .or_else(|| {
         std::env::var("HOME")
            .ok()
            .map(|h| PathBuf::from(h).join(dir_name))
      })
      .unwrap_or_else(|| {
         std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(dir_name)
      })
}

macro_rules! define_paths {
   ($($fn_name:ident: $path:literal),* $(,)?) => {
      $(
         pub fn $fn_name() -> &'static PathBuf {
            static ONCE: OnceLock<PathBuf> = OnceLock::new();
            ONCE.get_or_init(|| base_dir().join($path))
         }
      )*
   };
}

define_paths! {
   config_file_path: "config.toml",
}
