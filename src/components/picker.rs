use std::{path::Path, time::Instant};

use color_eyre::Result;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect, Size},
    style::{Style, Stylize},
    text::{Line, Span},
    widgets::{Block, HighlightSpacing, List, ListItem, ListState, Paragraph},
};
use tracing::{error, info};

use super::Component;
use crate::{
    action::{AppAction, GlobalAction, PickerAction},
    app::Mode,
    browser::{Browser, Highlight, Refresh, TriState},
    config::Config,
    listing::LocalFs,
};

/// What a concrete picker screen adds on top of the folder browser.
pub trait PickerDelegate {
    fn title(&self) -> &str;

    fn mode(&self) -> Mode {
        Mode::Select
    }

    /// Seeds the browser before the first listing.
    fn prepare(&mut self, browser: &mut Browser) -> Result<()> {
        let _ = browser;
        Ok(())
    }

    /// Called when the select/save button is pressed on `directory`.
    fn on_folder_selected(
        &mut self,
        directory: &Path,
        tri_state: Option<&TriState>,
    ) -> Result<AppAction>;
}

/// Reports the chosen directory and finishes the app.
#[derive(Debug, Default)]
pub struct PlainSelection;

impl PickerDelegate for PlainSelection {
    fn title(&self) -> &str {
        " Select folder "
    }

    fn on_folder_selected(
        &mut self,
        directory: &Path,
        _tri_state: Option<&TriState>,
    ) -> Result<AppAction> {
        info!("selected {}", directory.display());
        Ok(AppAction::Finish(Some(directory.to_path_buf())))
    }
}

#[derive(Debug)]
struct Notice {
    message: String,
    shown_at: Instant,
}

/// A one-directory-at-a-time folder browser screen.
pub struct FolderPicker {
    browser: Browser,
    delegate: Box<dyn PickerDelegate>,
    state: ListState,
    notice: Option<Notice>,
    config: Config,
}

impl FolderPicker {
    pub fn new(start: impl AsRef<Path>, delegate: Box<dyn PickerDelegate>) -> Self {
        Self {
            browser: Browser::new(LocalFs, start),
            delegate,
            state: ListState::default().with_selected(Some(0)),
            notice: None,
            config: Config::default(),
        }
    }

    pub fn mode(&self) -> Mode {
        self.delegate.mode()
    }

    pub fn browser(&self) -> &Browser {
        &self.browser
    }

    pub fn selected(&self) -> Option<usize> {
        self.state.selected()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_ref().map(|notice| notice.message.as_str())
    }

    fn refresh(&mut self) {
        let refresh = self.browser.refresh();
        self.after_listing(refresh);
    }

    fn after_listing(&mut self, refresh: Refresh) {
        if let Refresh::Failed(path) = refresh {
            self.show_notice(format!("Failed to display {}", path.display()));
        }
        self.state.select(Some(0));
        *self.state.offset_mut() = 0;
    }

    fn show_notice(&mut self, message: String) {
        info!("notice: {message}");
        self.notice = Some(Notice {
            message,
            shown_at: Instant::now(),
        });
    }

    fn expire_notice(&mut self) {
        if let Some(notice) = &self.notice
            && notice.shown_at.elapsed().as_secs_f64() >= self.config.picker.notice_secs
        {
            self.notice = None;
        }
    }

    fn activate(&mut self, index: usize) {
        if let Some(refresh) = self.browser.activate(index) {
            self.after_listing(refresh);
        }
    }

    fn last_index(&self) -> usize {
        self.browser.rows().len().saturating_sub(1)
    }

    fn select_next(&mut self) {
        let next = self
            .state
            .selected()
            .map_or(0, |i| i.saturating_add(1).min(self.last_index()));
        self.state.select(Some(next));
    }

    fn select_previous(&mut self) {
        let previous = self.state.selected().map_or(0, |i| i.saturating_sub(1));
        self.state.select(Some(previous));
    }

    fn confirm(&mut self) -> Option<AppAction> {
        let directory = self.browser.current_path().to_path_buf();
        match self
            .delegate
            .on_folder_selected(&directory, self.browser.tri_state())
        {
            Ok(action) => Some(action),
            Err(err) => {
                error!("{err:?}");
                self.show_notice(err.to_string());
                None
            }
        }
    }

    fn handle_picker_action(&mut self, action: PickerAction) -> Option<AppAction> {
        match action {
            PickerAction::SelectNext => self.select_next(),
            PickerAction::SelectPrevious => self.select_previous(),
            PickerAction::SelectFirst => self.state.select(Some(0)),
            PickerAction::SelectLast => self.state.select(Some(self.last_index())),
            PickerAction::Open => self.activate(self.state.selected().unwrap_or(0)),
            PickerAction::Parent => self.activate(0),
            PickerAction::ToggleMark => {
                if let Some(index) = self.state.selected() {
                    self.browser.toggle_mark(index);
                }
            }
            PickerAction::Refresh => self.refresh(),
            PickerAction::Confirm => return self.confirm(),
        }
        None
    }

    fn style(&self, name: &str) -> Style {
        self.config.styles.get_or_default(self.mode(), name)
    }

    fn render_path(&self, frame: &mut Frame, area: Rect) {
        let path = self.browser.current_path().display().to_string();
        frame.render_widget(Paragraph::new(Span::styled(path, self.style("path"))), area);
    }

    fn render_list(&mut self, frame: &mut Frame, area: Rect) {
        let title = Line::from(self.delegate.title().bold()).left_aligned();
        let block = Block::bordered().title(title);

        let items: Vec<ListItem> = self
            .browser
            .rows()
            .iter()
            .enumerate()
            .map(|(index, row)| {
                let style = match (index, row.highlight) {
                    (0, _) => self.style("up"),
                    (_, Highlight::Included) => self.style("included"),
                    (_, Highlight::Excluded) => self.style("excluded"),
                    (_, Highlight::None) => Style::default(),
                };
                ListItem::new(Line::from(Span::styled(row.label.as_str(), style)))
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(self.style("selected"))
            .highlight_symbol(">  ")
            .highlight_spacing(HighlightSpacing::Always);

        frame.render_stateful_widget(list, area, &mut self.state);
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect) {
        let footer = match &self.notice {
            Some(notice) => Paragraph::new(Span::styled(
                notice.message.as_str(),
                self.style("notice"),
            )),
            None => {
                let hints = if self.browser.is_tri_state() {
                    "↓↑: move | →/Enter: open | ←: up | space: mark | s: save | q: back"
                } else {
                    "↓↑: move | →/Enter: open | ←: up | s: select | q: back"
                };
                Paragraph::new(hints)
            }
        };
        frame.render_widget(footer.centered(), area);
    }
}

impl Component for FolderPicker {
    fn register_config_handler(&mut self, config: Config) -> Result<()> {
        self.browser.set_show_hidden(config.picker.show_hidden);
        self.config = config;
        Ok(())
    }

    fn init(&mut self, _area: Size) -> Result<()> {
        self.delegate.prepare(&mut self.browser)?;
        self.refresh();
        Ok(())
    }

    fn update(&mut self, action: AppAction) -> Result<Option<AppAction>> {
        let next = match action {
            AppAction::Global(GlobalAction::Tick) => {
                self.expire_notice();
                None
            }
            AppAction::Global(GlobalAction::Resume) => {
                self.refresh();
                None
            }
            AppAction::Picker(action) => self.handle_picker_action(action),
            _ => None,
        };
        Ok(next)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let [path_area, list_area, footer_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(area);

        self.render_path(frame, path_area);
        self.render_list(frame, list_area);
        self.render_footer(frame, footer_area);
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;
    use ratatui::{Terminal, backend::TestBackend};

    use super::*;

    pub(crate) fn buffer_text(picker: &mut FolderPicker, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal
            .draw(|frame| picker.draw(frame, frame.area()).unwrap())
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn row_names(picker: &FolderPicker) -> Vec<String> {
        picker
            .browser()
            .rows()
            .iter()
            .map(|row| row.label.clone())
            .collect()
    }

    fn started(start: &Path) -> FolderPicker {
        let mut picker = FolderPicker::new(start, Box::new(PlainSelection));
        picker.register_config_handler(Config::default()).unwrap();
        picker.init(Size::new(100, 20)).unwrap();
        picker
    }

    fn send(picker: &mut FolderPicker, action: PickerAction) -> Option<AppAction> {
        picker.update(action.into()).unwrap()
    }

    fn music_tree() -> tempfile::TempDir {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("b/live")).unwrap();
        fs::create_dir_all(tmp.path().join("a")).unwrap();
        fs::write(tmp.path().join("cover.jpg"), b"").unwrap();
        tmp
    }

    #[test]
    fn test_init_lists_start_directory() {
        let tmp = music_tree();
        let picker = started(tmp.path());

        assert_eq!(row_names(&picker), vec!["../", "a", "b"]);
        assert_eq!(picker.selected(), Some(0));
        assert_eq!(picker.notice(), None);
    }

    #[test]
    fn test_open_child_then_parent() {
        let tmp = music_tree();
        let mut picker = started(tmp.path());

        send(&mut picker, PickerAction::SelectLast);
        send(&mut picker, PickerAction::Open);
        assert_eq!(picker.browser().current_path(), tmp.path().join("b"));
        assert_eq!(row_names(&picker), vec!["../", "live"]);
        assert_eq!(picker.selected(), Some(0));

        send(&mut picker, PickerAction::Open);
        assert_eq!(picker.browser().current_path(), tmp.path());
    }

    #[test]
    fn test_selection_is_clamped() {
        let tmp = music_tree();
        let mut picker = started(tmp.path());

        for _ in 0..10 {
            send(&mut picker, PickerAction::SelectNext);
        }
        assert_eq!(picker.selected(), Some(2));

        for _ in 0..10 {
            send(&mut picker, PickerAction::SelectPrevious);
        }
        assert_eq!(picker.selected(), Some(0));
    }

    #[test]
    fn test_parent_at_root_stays() {
        let mut picker = started(Path::new("/"));
        send(&mut picker, PickerAction::Parent);
        assert_eq!(picker.browser().current_path(), Path::new("/"));
    }

    #[test]
    fn test_listing_failure_shows_notice() {
        let tmp = music_tree();
        let missing = tmp.path().join("gone");
        let picker = started(&missing);

        assert_eq!(row_names(&picker), vec!["../"]);
        assert_eq!(
            picker.notice(),
            Some(format!("Failed to display {}", missing.display()).as_str())
        );
    }

    #[test]
    fn test_notice_expires_on_tick() {
        let tmp = music_tree();
        let mut picker = FolderPicker::new(tmp.path().join("gone"), Box::new(PlainSelection));
        let mut config = Config::default();
        config.picker.notice_secs = 0.0;
        picker.register_config_handler(config).unwrap();
        picker.init(Size::new(100, 20)).unwrap();
        assert!(picker.notice().is_some());

        picker.update(GlobalAction::Tick.into()).unwrap();
        assert_eq!(picker.notice(), None);
    }

    #[test]
    fn test_resume_relists() {
        let tmp = music_tree();
        let mut picker = started(tmp.path());
        fs::create_dir(tmp.path().join("c")).unwrap();

        picker.update(GlobalAction::Resume.into()).unwrap();
        assert_eq!(row_names(&picker), vec!["../", "a", "b", "c"]);
    }

    #[test]
    fn test_confirm_reports_current_directory() {
        let tmp = music_tree();
        let mut picker = started(tmp.path());

        let action = send(&mut picker, PickerAction::Confirm);
        assert_eq!(action, Some(AppAction::Finish(Some(tmp.path().to_path_buf()))));
    }

    #[test]
    fn test_toggle_mark_is_ignored_in_select_mode() {
        let tmp = music_tree();
        let mut picker = started(tmp.path());

        send(&mut picker, PickerAction::SelectNext);
        send(&mut picker, PickerAction::ToggleMark);
        assert!(
            picker
                .browser()
                .rows()
                .iter()
                .all(|row| row.highlight == Highlight::None)
        );
    }

    #[test]
    fn test_hidden_directories_follow_config() {
        let tmp = music_tree();
        fs::create_dir(tmp.path().join(".thumbnails")).unwrap();

        let picker = started(tmp.path());
        assert_eq!(row_names(&picker), vec!["../", ".thumbnails", "a", "b"]);

        let mut picker = FolderPicker::new(tmp.path(), Box::new(PlainSelection));
        let mut config = Config::default();
        config.picker.show_hidden = false;
        picker.register_config_handler(config).unwrap();
        picker.init(Size::new(100, 20)).unwrap();
        assert_eq!(row_names(&picker), vec!["../", "a", "b"]);
    }

    #[test]
    fn test_draw_shows_path_rows_and_hints() {
        let tmp = music_tree();
        let mut picker = started(tmp.path());

        let text = buffer_text(&mut picker, 120, 10);
        assert!(text.contains(&tmp.path().display().to_string()));
        assert!(text.contains("Select folder"));
        assert!(text.contains("../"));
        assert!(text.contains("s: select"));
    }
}
