use std::{
    collections::BTreeSet,
    ffi::OsString,
    path::{self, Component, Path, PathBuf},
};

use tracing::{debug, warn};

use crate::listing::{FileSystem, LocalFs, list_subdirectories};

/// Name of the synthetic row that navigates to the parent directory.
pub const UP_ROW_NAME: &str = "../";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Highlight {
    #[default]
    None,
    Included,
    Excluded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowItem {
    /// Directory name as the filesystem returned it.
    pub name: OsString,
    /// `name` for display, with invalid UTF-8 replaced.
    pub label: String,
    pub highlight: Highlight,
}

impl RowItem {
    fn up() -> Self {
        Self {
            name: OsString::from(UP_ROW_NAME),
            label: UP_ROW_NAME.to_string(),
            highlight: Highlight::None,
        }
    }

    fn child(name: OsString, highlight: Highlight) -> Self {
        Self {
            label: name.to_string_lossy().into_owned(),
            name,
            highlight,
        }
    }
}

/// Included and excluded directories, by absolute path.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TriState {
    pub included: BTreeSet<PathBuf>,
    pub excluded: BTreeSet<PathBuf>,
}

impl TriState {
    pub fn new(
        included: impl IntoIterator<Item = PathBuf>,
        excluded: impl IntoIterator<Item = PathBuf>,
    ) -> Self {
        Self {
            included: included.into_iter().collect(),
            excluded: excluded.into_iter().collect(),
        }
    }

    /// An excluded path wins over an included one.
    pub fn highlight_for(&self, path: &Path) -> Highlight {
        if self.excluded.contains(path) {
            Highlight::Excluded
        } else if self.included.contains(path) {
            Highlight::Included
        } else {
            Highlight::None
        }
    }

    /// Moves `path` to its next state: none, included, excluded, none.
    pub fn cycle(&mut self, path: &Path) -> Highlight {
        match self.highlight_for(path) {
            Highlight::None => {
                self.included.insert(path.to_path_buf());
            }
            Highlight::Included => {
                self.included.remove(path);
                self.excluded.insert(path.to_path_buf());
            }
            Highlight::Excluded => {
                self.included.remove(path);
                self.excluded.remove(path);
            }
        }
        self.highlight_for(path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Refresh {
    Listed,
    Failed(PathBuf),
}

/// Navigation state of a folder picker: the current directory and its rows.
#[derive(Debug)]
pub struct Browser<F = LocalFs> {
    fs: F,
    current: PathBuf,
    rows: Vec<RowItem>,
    tri_state: Option<TriState>,
    show_hidden: bool,
}

impl<F: FileSystem> Browser<F> {
    /// Creates a browser at `start`. Nothing is listed until [`Browser::refresh`].
    pub fn new(fs: F, start: impl AsRef<Path>) -> Self {
        Self {
            fs,
            current: absolute(start.as_ref()),
            rows: vec![RowItem::up()],
            tri_state: None,
            show_hidden: true,
        }
    }

    pub fn set_show_hidden(&mut self, show_hidden: bool) {
        self.show_hidden = show_hidden;
    }

    pub fn current_path(&self) -> &Path {
        &self.current
    }

    pub fn rows(&self) -> &[RowItem] {
        &self.rows
    }

    pub fn tri_state(&self) -> Option<&TriState> {
        self.tri_state.as_ref()
    }

    pub fn is_tri_state(&self) -> bool {
        self.tri_state.is_some()
    }

    pub fn enable_tri_state(&mut self, tri_state: TriState) {
        self.tri_state = Some(tri_state);
    }

    /// Moves to `directory` without listing it.
    pub fn set_current_path(&mut self, directory: impl AsRef<Path>) {
        self.current = absolute(directory.as_ref());
    }

    pub fn set_current_directory(&mut self, directory: impl AsRef<Path>) -> Refresh {
        self.set_current_path(directory);
        self.refresh()
    }

    /// Lists the current directory and rebuilds every row.
    pub fn refresh(&mut self) -> Refresh {
        let mut rows = vec![RowItem::up()];

        let result = match list_subdirectories(&self.fs, &self.current, self.show_hidden) {
            Ok(names) => {
                rows.extend(names.into_iter().map(|name| {
                    let highlight = self.highlight_for(&self.current.join(&name));
                    RowItem::child(name, highlight)
                }));
                Refresh::Listed
            }
            Err(err) => {
                warn!("failed to list {}: {}", self.current.display(), err);
                Refresh::Failed(self.current.clone())
            }
        };

        debug!("{} rows for {}", rows.len(), self.current.display());
        self.rows = rows;
        result
    }

    /// Taps the row at `index`.
    ///
    /// Row 0 goes to the parent, any other row to the named child. Returns
    /// `None` when the current directory stays the same.
    pub fn activate(&mut self, index: usize) -> Option<Refresh> {
        let target = if index == 0 {
            self.current.parent()?.to_path_buf()
        } else {
            let row = self.rows.get(index)?;
            self.current.join(&row.name)
        };
        Some(self.set_current_directory(target))
    }

    /// Cycles the tri-state mark of the row at `index`.
    pub fn toggle_mark(&mut self, index: usize) -> Option<Highlight> {
        if index == 0 {
            return None;
        }
        let path = self.current.join(&self.rows.get(index)?.name);
        let highlight = self.tri_state.as_mut()?.cycle(&path);
        if let Some(row) = self.rows.get_mut(index) {
            row.highlight = highlight;
        }
        Some(highlight)
    }

    fn highlight_for(&self, path: &Path) -> Highlight {
        self.tri_state
            .as_ref()
            .map(|tri_state| tri_state.highlight_for(path))
            .unwrap_or_default()
    }
}

/// Makes `path` absolute and folds away `.` and `..` without touching the
/// filesystem. `..` never climbs above the root.
fn absolute(path: &Path) -> PathBuf {
    let path = path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut normal = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normal.pop();
            }
            other => normal.push(other),
        }
    }
    normal
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::listing::{DirEntryInfo, tests::MemoryFs};

    fn music_fs() -> MemoryFs {
        MemoryFs::default()
            .with_dir(
                "/",
                vec![DirEntryInfo::dir("music"), DirEntryInfo::file("vmlinuz")],
            )
            .with_dir(
                "/music",
                vec![
                    DirEntryInfo::dir("b"),
                    DirEntryInfo::dir("a"),
                    DirEntryInfo::file(".hidden"),
                ],
            )
            .with_dir("/music/a", vec![])
            .with_dir("/music/b", vec![DirEntryInfo::dir("live")])
    }

    fn names<F: FileSystem>(browser: &Browser<F>) -> Vec<&str> {
        browser.rows().iter().map(|row| row.label.as_str()).collect()
    }

    #[test]
    fn test_rows_are_up_then_sorted_directories() {
        let mut browser = Browser::new(music_fs(), "/music");
        assert_eq!(browser.refresh(), Refresh::Listed);
        assert_eq!(names(&browser), vec!["../", "a", "b"]);
    }

    #[test]
    fn test_first_row_navigates_to_parent() {
        let mut browser = Browser::new(music_fs(), "/music");
        browser.refresh();

        assert_eq!(browser.activate(0), Some(Refresh::Listed));
        assert_eq!(browser.current_path(), Path::new("/"));
        assert_eq!(names(&browser), vec!["../", "music"]);
    }

    #[test]
    fn test_first_row_at_root_stays() {
        let mut browser = Browser::new(music_fs(), "/");
        browser.refresh();

        assert_eq!(browser.activate(0), None);
        assert_eq!(browser.current_path(), Path::new("/"));
    }

    #[test]
    fn test_other_row_navigates_to_child() {
        let mut browser = Browser::new(music_fs(), "/music");
        browser.refresh();

        assert_eq!(browser.activate(2), Some(Refresh::Listed));
        assert_eq!(browser.current_path(), Path::new("/music/b"));
        assert_eq!(names(&browser), vec!["../", "live"]);
    }

    #[test]
    fn test_out_of_range_row_is_ignored() {
        let mut browser = Browser::new(music_fs(), "/music");
        browser.refresh();

        assert_eq!(browser.activate(7), None);
        assert_eq!(browser.current_path(), Path::new("/music"));
    }

    #[test]
    fn test_listing_failure_leaves_only_up_row() {
        let mut browser = Browser::new(music_fs(), "/music");
        browser.refresh();

        let refresh = browser.set_current_directory("/forbidden");
        assert_eq!(refresh, Refresh::Failed(PathBuf::from("/forbidden")));
        assert_eq!(names(&browser), vec!["../"]);
        assert_eq!(browser.current_path(), Path::new("/forbidden"));
    }

    #[test]
    fn test_tri_state_highlights() {
        let fs = MemoryFs::default().with_dir(
            "/music",
            vec![
                DirEntryInfo::dir("in"),
                DirEntryInfo::dir("out"),
                DirEntryInfo::dir("plain"),
            ],
        );
        let mut browser = Browser::new(fs, "/music");
        browser.enable_tri_state(TriState::new(
            [PathBuf::from("/music/in")],
            [PathBuf::from("/music/out")],
        ));
        browser.refresh();

        let highlights: Vec<Highlight> = browser.rows().iter().map(|row| row.highlight).collect();
        assert_eq!(
            highlights,
            vec![
                Highlight::None,
                Highlight::Included,
                Highlight::Excluded,
                Highlight::None
            ]
        );
    }

    #[test]
    fn test_no_highlight_without_tri_state() {
        let mut browser = Browser::new(music_fs(), "/music");
        browser.refresh();
        assert!(
            browser
                .rows()
                .iter()
                .all(|row| row.highlight == Highlight::None)
        );
    }

    #[test]
    fn test_toggle_mark_cycles() {
        let mut browser = Browser::new(music_fs(), "/music");
        browser.enable_tri_state(TriState::default());
        browser.refresh();

        assert_eq!(browser.toggle_mark(1), Some(Highlight::Included));
        assert_eq!(browser.rows()[1].highlight, Highlight::Included);
        assert_eq!(browser.toggle_mark(1), Some(Highlight::Excluded));
        assert_eq!(browser.toggle_mark(1), Some(Highlight::None));

        let tri_state = browser.tri_state().unwrap();
        assert!(tri_state.included.is_empty());
        assert!(tri_state.excluded.is_empty());
    }

    #[test]
    fn test_toggle_mark_ignores_up_row_and_plain_mode() {
        let mut browser = Browser::new(music_fs(), "/music");
        browser.refresh();
        assert_eq!(browser.toggle_mark(1), None);

        browser.enable_tri_state(TriState::default());
        assert_eq!(browser.toggle_mark(0), None);
    }

    #[test]
    fn test_marks_survive_navigation() {
        let mut browser = Browser::new(music_fs(), "/music");
        browser.enable_tri_state(TriState::default());
        browser.refresh();
        browser.toggle_mark(2);

        browser.activate(2);
        browser.activate(0);
        assert_eq!(browser.rows()[2].highlight, Highlight::Included);
    }

    #[test]
    fn test_excluded_wins_when_in_both_sets() {
        let path = PathBuf::from("/music/a");
        let tri_state = TriState::new([path.clone()], [path.clone()]);
        assert_eq!(tri_state.highlight_for(&path), Highlight::Excluded);
    }

    #[test]
    fn test_real_directory_tree() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("albums/2024")).unwrap();
        std::fs::write(tmp.path().join("notes.txt"), b"").unwrap();

        let mut browser = Browser::new(LocalFs, tmp.path());
        browser.refresh();
        assert_eq!(
            browser.rows().iter().map(|r| r.label.as_str()).collect::<Vec<_>>(),
            vec!["../", "albums"]
        );

        browser.activate(1);
        assert_eq!(browser.current_path(), tmp.path().join("albums"));
        assert_eq!(browser.rows().len(), 2);
    }

    #[test]
    fn test_dot_dot_in_start_is_folded() {
        let mut browser = Browser::new(music_fs(), "/music/b/../.");
        assert_eq!(browser.current_path(), Path::new("/music"));
        assert_eq!(browser.refresh(), Refresh::Listed);

        assert_eq!(browser.activate(0), Some(Refresh::Listed));
        assert_eq!(browser.current_path(), Path::new("/"));
    }

    #[test]
    fn test_dot_dot_never_climbs_above_root() {
        let browser = Browser::new(music_fs(), "/../../music");
        assert_eq!(browser.current_path(), Path::new("/music"));
    }

    #[test]
    fn test_tri_state_matches_after_folding() {
        let mut browser = Browser::new(music_fs(), "/music");
        browser.enable_tri_state(TriState {
            included: [PathBuf::from("/music/b")].into(),
            ..TriState::default()
        });
        browser.set_current_directory("/music/b/..");

        assert_eq!(browser.rows()[2].label, "b");
        assert_eq!(browser.rows()[2].highlight, Highlight::Included);

        browser.toggle_mark(1);
        let tri_state = browser.tri_state().unwrap();
        assert!(tri_state.included.contains(Path::new("/music/a")));
    }

    #[test]
    fn test_real_tree_with_dot_dot_start() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("a/b")).unwrap();

        let mut browser = Browser::new(LocalFs, tmp.path().join("a/b/.."));
        browser.enable_tri_state(TriState {
            included: [tmp.path().join("a/b")].into(),
            ..TriState::default()
        });
        browser.refresh();
        assert_eq!(browser.current_path(), tmp.path().join("a"));
        assert_eq!(browser.rows()[1].highlight, Highlight::Included);

        browser.activate(0);
        assert_eq!(browser.current_path(), tmp.path());
    }

    // APFS rejects names that are not UTF-8
    #[cfg(target_os = "linux")]
    #[test]
    fn test_non_utf8_directory_names() {
        use std::os::unix::ffi::OsStringExt;

        let tmp = tempfile::tempdir().unwrap();
        let name = OsString::from_vec(b"caf\xe9".to_vec());
        std::fs::create_dir_all(tmp.path().join(&name).join("inner")).unwrap();

        let mut browser = Browser::new(LocalFs, tmp.path());
        browser.enable_tri_state(TriState::default());
        browser.refresh();
        assert_eq!(browser.rows()[1].name, name);
        assert_eq!(browser.rows()[1].label, "caf\u{fffd}");

        assert_eq!(browser.toggle_mark(1), Some(Highlight::Included));
        let tri_state = browser.tri_state().unwrap();
        assert!(tri_state.included.contains(&tmp.path().join(&name)));

        assert_eq!(browser.activate(1), Some(Refresh::Listed));
        assert_eq!(browser.current_path(), tmp.path().join(&name));
        assert_eq!(names(&browser), vec!["../", "inner"]);
    }
}
