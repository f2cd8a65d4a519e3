use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use strum::Display;

#[derive(Debug, Clone, PartialEq, Eq, Display, Serialize, Deserialize)]
pub enum GlobalAction {
    Tick,
    Render,
    Resize(u16, u16),
    Suspend,
    Resume,
    Quit,
    ClearScreen,
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
pub enum PickerAction {
    SelectNext,
    SelectPrevious,
    SelectFirst,
    SelectLast,
    /// Tap the selected row.
    Open,
    /// Tap the `../` row.
    Parent,
    /// Long press on the selected row.
    ToggleMark,
    /// The select/save button.
    Confirm,
    Refresh,
}

/// Everything that travels through the action channel.
///
/// Keybindings deserialize into the global and picker variants by name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum AppAction {
    Global(GlobalAction),
    Picker(PickerAction),
    /// Finishes the app, optionally reporting a chosen directory.
    #[serde(skip)]
    Finish(Option<PathBuf>),
}

impl From<GlobalAction> for AppAction {
    fn from(action: GlobalAction) -> Self {
        AppAction::Global(action)
    }
}

impl From<PickerAction> for AppAction {
    fn from(action: PickerAction) -> Self {
        AppAction::Picker(action)
    }
}
