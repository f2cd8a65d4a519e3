use std::path::PathBuf;

use color_eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::layout::Rect;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info};

use crate::{
    action::{AppAction, GlobalAction},
    components::Component,
    config::Config,
    terminal::{Terminal, events::TermEvent},
};

/// Selects the keybindings and styles in effect.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    #[default]
    Select,
    TriState,
}

pub struct App {
    config: Config,
    tick_rate: f64,
    frame_rate: f64,
    components: Vec<Box<dyn Component>>,
    should_quit: bool,
    should_suspend: bool,
    mode: Mode,
    last_tick_key_events: Vec<KeyEvent>,
    action_tx: UnboundedSender<AppAction>,
    action_rx: UnboundedReceiver<AppAction>,
    chosen: Option<PathBuf>,
}

impl App {
    pub fn new(
        config: Config,
        tick_rate: f64,
        frame_rate: f64,
        mode: Mode,
        components: Vec<Box<dyn Component>>,
    ) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        Self {
            config,
            tick_rate,
            frame_rate,
            components,
            should_quit: false,
            should_suspend: false,
            mode,
            last_tick_key_events: Vec::new(),
            action_tx,
            action_rx,
            chosen: None,
        }
    }

    /// Runs until a component finishes the app. Returns the chosen directory, if any.
    pub async fn run(&mut self) -> Result<Option<PathBuf>> {
        let mut terminal = Terminal::new(self.tick_rate, self.frame_rate)?;
        terminal.enter()?;

        for component in self.components.iter_mut() {
            component.register_action_handler(self.action_tx.clone())?;
        }
        for component in self.components.iter_mut() {
            component.register_config_handler(self.config.clone())?;
        }
        let size = terminal.size()?;
        for component in self.components.iter_mut() {
            component.init(size)?;
        }

        let action_tx = self.action_tx.clone();
        loop {
            self.handle_events(&mut terminal).await?;
            self.handle_actions(&mut terminal)?;
            if self.should_suspend {
                terminal.suspend()?;
                action_tx.send(GlobalAction::Resume.into())?;
                action_tx.send(GlobalAction::ClearScreen.into())?;
                terminal.resume()?;
            } else if self.should_quit {
                terminal.stop()?;
                break;
            }
        }
        terminal.exit()?;
        Ok(self.chosen.take())
    }

    async fn handle_events(&mut self, terminal: &mut Terminal) -> Result<()> {
        let Some(event) = terminal.next_event().await else {
            return Ok(());
        };
        let action_tx = self.action_tx.clone();
        match event {
            TermEvent::Tick => action_tx.send(GlobalAction::Tick.into())?,
            TermEvent::Render => action_tx.send(GlobalAction::Render.into())?,
            TermEvent::Resize(x, y) => action_tx.send(GlobalAction::Resize(x, y).into())?,
            // coming back to the picker relists the directory
            TermEvent::FocusGained => action_tx.send(GlobalAction::Resume.into())?,
            TermEvent::Error => {
                action_tx.send(GlobalAction::Error("terminal input error".to_string()).into())?
            }
            TermEvent::Key(key) => self.handle_key_event(key)?,
            _ => {}
        }
        for component in self.components.iter_mut() {
            if let Some(action) = component.handle_events(Some(event.clone()))? {
                action_tx.send(action)?;
            }
        }
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<()> {
        let action_tx = self.action_tx.clone();
        let Some(keymap) = self.config.keybindings.get(&self.mode) else {
            return Ok(());
        };
        match keymap.get(&vec![key]) {
            Some(action) => {
                info!("Got action: {action:?}");
                action_tx.send(action.clone())?;
            }
            _ => {
                // multi-key sequences like <g><g>
                self.last_tick_key_events.push(key);

                if let Some(action) = keymap.get(&self.last_tick_key_events) {
                    info!("Got action: {action:?}");
                    action_tx.send(action.clone())?;
                    self.last_tick_key_events.clear();
                }
            }
        }
        Ok(())
    }

    fn handle_actions(&mut self, terminal: &mut Terminal) -> Result<()> {
        while let Ok(action) = self.action_rx.try_recv() {
            if !matches!(
                action,
                AppAction::Global(GlobalAction::Tick | GlobalAction::Render)
            ) {
                debug!("{action:?}");
            }
            match &action {
                AppAction::Global(global) => match global {
                    GlobalAction::Tick => {
                        self.last_tick_key_events.drain(..);
                    }
                    GlobalAction::Quit => self.should_quit = true,
                    GlobalAction::Suspend => self.should_suspend = true,
                    GlobalAction::Resume => self.should_suspend = false,
                    GlobalAction::ClearScreen => terminal.clear()?,
                    GlobalAction::Resize(w, h) => self.handle_resize(terminal, *w, *h)?,
                    GlobalAction::Render => self.render(terminal)?,
                    GlobalAction::Error(message) => error!("{message}"),
                },
                AppAction::Finish(chosen) => {
                    self.chosen = chosen.clone();
                    self.should_quit = true;
                }
                AppAction::Picker(_) => {}
            }
            for component in self.components.iter_mut() {
                if let Some(action) = component.update(action.clone())? {
                    self.action_tx.send(action)?
                };
            }
        }
        Ok(())
    }

    fn handle_resize(&mut self, terminal: &mut Terminal, w: u16, h: u16) -> Result<()> {
        terminal.resize(Rect::new(0, 0, w, h))?;
        self.render(terminal)?;
        Ok(())
    }

    fn render(&mut self, terminal: &mut Terminal) -> Result<()> {
        terminal.draw(|frame| {
            for component in self.components.iter_mut() {
                if let Err(err) = component.draw(frame, frame.area()) {
                    let _ = self
                        .action_tx
                        .send(GlobalAction::Error(format!("Failed to draw: {:?}", err)).into());
                }
            }
        })?;
        Ok(())
    }
}
