mod colors;
mod keys;

use std::{
    env,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use serde::Deserialize;
use tracing::warn;

pub use crate::config::{colors::Styles, keys::KeyBindings};

const DEFAULT_CONFIG: &str = include_str!("../../.config/config.json5");

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub data_dir: PathBuf,
    #[serde(default)]
    pub config_dir: PathBuf,
}

#[derive(Clone, Debug, Deserialize)]
pub struct PickerConfig {
    /// List directories whose name starts with a dot.
    #[serde(default = "default_show_hidden")]
    pub show_hidden: bool,
    /// Seconds a notice stays in the footer.
    #[serde(default = "default_notice_secs")]
    pub notice_secs: f64,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            show_hidden: default_show_hidden(),
            notice_secs: default_notice_secs(),
        }
    }
}

fn default_show_hidden() -> bool {
    true
}

fn default_notice_secs() -> f64 {
    2.0
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default, flatten)]
    pub config: AppConfig,
    #[serde(default)]
    pub picker: PickerConfig,
    #[serde(default)]
    pub keybindings: KeyBindings,
    #[serde(default)]
    pub styles: Styles,
}

impl Config {
    pub fn new() -> Result<Self, config::ConfigError> {
        Self::load(&get_config_dir(), &get_data_dir())
    }

    /// Layers the config files found in `config_dir` over the built-in defaults.
    pub fn load(config_dir: &Path, data_dir: &Path) -> Result<Self, config::ConfigError> {
        let default_config: Config = json5::from_str(DEFAULT_CONFIG)
            .map_err(|e| config::ConfigError::Message(format!("invalid default config: {e}")))?;
        let mut builder = config::Config::builder()
            .set_default("data_dir", data_dir.to_string_lossy().to_string())?
            .set_default("config_dir", config_dir.to_string_lossy().to_string())?;

        let config_files = [
            ("config.json5", config::FileFormat::Json5),
            ("config.json", config::FileFormat::Json),
            ("config.yaml", config::FileFormat::Yaml),
            ("config.toml", config::FileFormat::Toml),
            ("config.ini", config::FileFormat::Ini),
        ];
        let mut found_config = false;
        for (file, format) in &config_files {
            let source = config::File::from(config_dir.join(file))
                .format(*format)
                .required(false);
            builder = builder.add_source(source);
            if config_dir.join(file).exists() {
                found_config = true
            }
        }
        if !found_config {
            warn!(
                "no configuration file in {}, using built-in defaults",
                config_dir.display()
            );
        }

        let mut cfg: Self = builder.build()?.try_deserialize()?;

        for (mode, default_bindings) in default_config.keybindings.iter() {
            let user_bindings = cfg.keybindings.entry(*mode).or_default();
            for (key, cmd) in default_bindings.iter() {
                user_bindings
                    .entry(key.clone())
                    .or_insert_with(|| cmd.clone());
            }
        }
        for (mode, default_styles) in default_config.styles.iter() {
            let user_styles = cfg.styles.entry(*mode).or_default();
            for (style_key, style) in default_styles.iter() {
                user_styles.entry(style_key.clone()).or_insert(*style);
            }
        }

        Ok(cfg)
    }
}

pub fn get_data_dir() -> PathBuf {
    let data_folder = env::var("DIRPICK_DATA").ok().map(PathBuf::from);

    if let Some(data_folder) = data_folder {
        data_folder
    } else if let Some(proj_dirs) = project_directory() {
        proj_dirs.data_local_dir().to_path_buf()
    } else {
        PathBuf::from(".").join(".data")
    }
}

pub fn get_config_dir() -> PathBuf {
    let config_folder = env::var("DIRPICK_CONFIG").ok().map(PathBuf::from);

    if let Some(config_folder) = config_folder {
        config_folder
    } else if let Some(proj_dirs) = project_directory() {
        proj_dirs.config_local_dir().to_path_buf()
    } else {
        PathBuf::from(".").join(".config")
    }
}

fn project_directory() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "dirpick", env!("CARGO_PKG_NAME"))
}
