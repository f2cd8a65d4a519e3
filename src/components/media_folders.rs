use std::path::{Path, PathBuf};

use color_eyre::Result;
use directories::BaseDirs;
use tracing::info;

use super::picker::PickerDelegate;
use crate::{
    action::AppAction,
    app::Mode,
    browser::{Browser, TriState},
    preferences::{MediaFolders, PreferencesStore},
};

/// Marks the folders the media library scans or skips.
pub struct MediaFoldersSelection<P> {
    store: P,
    folders: MediaFolders,
    start: Option<PathBuf>,
}

impl<P: PreferencesStore> MediaFoldersSelection<P> {
    /// `start` overrides the stored browse start.
    pub fn new(store: P, start: Option<PathBuf>) -> Self {
        Self {
            store,
            folders: MediaFolders::default(),
            start,
        }
    }
}

impl<P: PreferencesStore> PickerDelegate for MediaFoldersSelection<P> {
    fn title(&self) -> &str {
        " Media folders "
    }

    fn mode(&self) -> Mode {
        Mode::TriState
    }

    fn prepare(&mut self, browser: &mut Browser) -> Result<()> {
        self.folders = self.store.load()?;
        let start = browse_start(self.start.as_deref(), &self.folders);
        info!(
            "editing {} included and {} excluded folders from {}",
            self.folders.media_folders.len(),
            self.folders.excluded_folders.len(),
            start.display()
        );
        browser.set_current_path(start);
        browser.enable_tri_state(self.folders.tri_state());
        Ok(())
    }

    fn on_folder_selected(
        &mut self,
        directory: &Path,
        tri_state: Option<&TriState>,
    ) -> Result<AppAction> {
        if let Some(tri_state) = tri_state {
            self.folders.apply(tri_state);
        }
        self.folders.browse_start = Some(directory.to_path_buf());
        self.store.save(&self.folders)?;
        Ok(AppAction::Finish(None))
    }
}

/// Where browsing begins: the explicit start, the stored one, home, then `/`.
pub fn browse_start(explicit: Option<&Path>, folders: &MediaFolders) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| folders.browse_start.clone())
        .or_else(|| BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("/"))
}
