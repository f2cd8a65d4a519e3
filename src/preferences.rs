//! Media library folder preferences.

use std::{
    collections::BTreeSet,
    fs,
    path::{Path, PathBuf},
};

use color_eyre::{Result, eyre::WrapErr};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::browser::TriState;

const PREFERENCES_FILE: &str = "media_folders.json";

/// Folders the media scanner walks and folders it skips.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaFolders {
    #[serde(default)]
    pub media_folders: BTreeSet<PathBuf>,
    #[serde(default)]
    pub excluded_folders: BTreeSet<PathBuf>,
    /// Where the folder browser opens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browse_start: Option<PathBuf>,
}

impl MediaFolders {
    pub fn tri_state(&self) -> TriState {
        TriState::new(
            self.media_folders.iter().cloned(),
            self.excluded_folders.iter().cloned(),
        )
    }

    pub fn apply(&mut self, tri_state: &TriState) {
        self.media_folders = tri_state.included.clone();
        self.excluded_folders = tri_state.excluded.clone();
    }
}

pub trait PreferencesStore {
    fn load(&self) -> Result<MediaFolders>;
    fn save(&self, folders: &MediaFolders) -> Result<()>;
}

/// Preferences kept in a JSON file.
#[derive(Debug, Clone)]
pub struct JsonPreferences {
    path: PathBuf,
}

impl JsonPreferences {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The preferences file inside `data_dir`.
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(PREFERENCES_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PreferencesStore for JsonPreferences {
    fn load(&self) -> Result<MediaFolders> {
        if !self.path.exists() {
            debug!("no preferences at {}, using defaults", self.path.display());
            return Ok(MediaFolders::default());
        }
        let content = fs::read_to_string(&self.path)
            .wrap_err_with(|| format!("failed to read {}", self.path.display()))?;
        let folders = serde_json::from_str(&content)
            .wrap_err_with(|| format!("failed to parse {}", self.path.display()))?;
        Ok(folders)
    }

    fn save(&self, folders: &MediaFolders) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .wrap_err_with(|| format!("failed to create {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(folders)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content).wrap_err_with(|| format!("failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .wrap_err_with(|| format!("failed to replace {}", self.path.display()))?;
        info!(
            "saved {} included and {} excluded folders to {}",
            folders.media_folders.len(),
            folders.excluded_folders.len(),
            self.path.display()
        );
        Ok(())
    }
}
