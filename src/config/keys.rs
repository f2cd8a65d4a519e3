use std::collections::HashMap;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use derive_deref::{Deref, DerefMut};
use serde::{Deserialize, Deserializer, de};

use crate::{action::AppAction, app::Mode};

/// Key sequences bound to actions, per mode.
#[derive(Clone, Debug, Default, Deref, DerefMut)]
pub struct KeyBindings(pub HashMap<Mode, HashMap<Vec<KeyEvent>, AppAction>>);

impl<'de> Deserialize<'de> for KeyBindings {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let parsed_map = HashMap::<Mode, HashMap<String, AppAction>>::deserialize(deserializer)?;

        let mut keybindings = HashMap::new();
        for (mode, inner_map) in parsed_map {
            let mut bindings = HashMap::new();
            for (key_str, action) in inner_map {
                let sequence = parse_key_sequence(&key_str).map_err(de::Error::custom)?;
                bindings.insert(sequence, action);
            }
            keybindings.insert(mode, bindings);
        }

        Ok(KeyBindings(keybindings))
    }
}

/// Parses `<ctrl-c>` or `<g><g>` into key events.
pub fn parse_key_sequence(raw: &str) -> Result<Vec<KeyEvent>, String> {
    let raw = raw.trim();
    if !raw.starts_with('<') || !raw.ends_with('>') {
        return Err(format!("key sequence must look like <key>: {raw}"));
    }

    raw[1..raw.len() - 1]
        .split("><")
        .map(parse_key_event)
        .collect()
}

pub fn parse_key_event(raw: &str) -> Result<KeyEvent, String> {
    let (code, modifiers) = extract_modifiers(raw);
    parse_key_code(code).map(|code| KeyEvent::new(code, modifiers))
}

fn extract_modifiers(raw: &str) -> (&str, KeyModifiers) {
    let mut modifiers = KeyModifiers::empty();
    let mut current = raw;

    loop {
        let lower = current.to_ascii_lowercase();
        if lower.starts_with("ctrl-") {
            modifiers.insert(KeyModifiers::CONTROL);
            current = &current[5..];
        } else if lower.starts_with("alt-") {
            modifiers.insert(KeyModifiers::ALT);
            current = &current[4..];
        } else if lower.starts_with("shift-") {
            modifiers.insert(KeyModifiers::SHIFT);
            current = &current[6..];
        } else {
            break;
        }
    }

    (current, modifiers)
}

fn parse_key_code(raw: &str) -> Result<KeyCode, String> {
    let code = match raw.to_ascii_lowercase().as_str() {
        "esc" => KeyCode::Esc,
        "enter" => KeyCode::Enter,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pageup" => KeyCode::PageUp,
        "pagedown" => KeyCode::PageDown,
        "backspace" => KeyCode::Backspace,
        "delete" => KeyCode::Delete,
        "tab" => KeyCode::Tab,
        "space" => KeyCode::Char(' '),
        "hyphen" | "minus" => KeyCode::Char('-'),
        _ => {
            let mut chars = raw.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => KeyCode::Char(c),
                _ => return Err(format!("unable to parse key: {raw}")),
            }
        }
    };
    Ok(code)
}
