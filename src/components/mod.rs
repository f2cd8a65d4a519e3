use color_eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::{
    Frame,
    layout::{Rect, Size},
};
use tokio::sync::mpsc::UnboundedSender;

use crate::{action::AppAction, config::Config, terminal::events::TermEvent};

pub mod media_folders;
pub mod picker;

/// A piece of the screen that reacts to events and actions and draws itself.
pub trait Component {
    fn register_action_handler(&mut self, tx: UnboundedSender<AppAction>) -> Result<()> {
        let _ = tx;
        Ok(())
    }

    fn register_config_handler(&mut self, config: Config) -> Result<()> {
        let _ = config;
        Ok(())
    }

    /// Called once, after the handlers are registered and before the first frame.
    fn init(&mut self, area: Size) -> Result<()> {
        let _ = area;
        Ok(())
    }

    fn handle_events(&mut self, event: Option<TermEvent>) -> Result<Option<AppAction>> {
        let action = match event {
            Some(TermEvent::Key(key_event)) => self.handle_key_event(key_event)?,
            _ => None,
        };
        Ok(action)
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<AppAction>> {
        let _ = key;
        Ok(None)
    }

    fn update(&mut self, action: AppAction) -> Result<Option<AppAction>> {
        let _ = action;
        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()>;
}
