use std::collections::HashMap;

use derive_deref::{Deref, DerefMut};
use ratatui::style::{Color, Modifier, Style};
use serde::{Deserialize, Deserializer, de};

use crate::app::Mode;

/// Named styles, per mode.
#[derive(Clone, Debug, Default, Deref, DerefMut)]
pub struct Styles(pub HashMap<Mode, HashMap<String, Style>>);

impl<'de> Deserialize<'de> for Styles {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let parsed_map = HashMap::<Mode, HashMap<String, String>>::deserialize(deserializer)?;

        let mut styles = HashMap::new();
        for (mode, inner_map) in parsed_map {
            let mut mode_styles = HashMap::new();
            for (name, raw) in inner_map {
                mode_styles.insert(name, parse_style(&raw).map_err(de::Error::custom)?);
            }
            styles.insert(mode, mode_styles);
        }

        Ok(Styles(styles))
    }
}

impl Styles {
    pub fn get_or_default(&self, mode: Mode, name: &str) -> Style {
        self.get(&mode)
            .and_then(|styles| styles.get(name))
            .copied()
            .unwrap_or_default()
    }
}

/// Parses `"bold #88cece on black"` style strings.
pub fn parse_style(raw: &str) -> Result<Style, String> {
    let (foreground, background) = match raw.split_once(" on ") {
        Some((fg, bg)) => (fg, Some(bg)),
        None => (raw, None),
    };

    let mut style = Style::default();
    for word in foreground.split_whitespace() {
        style = match parse_modifier(word) {
            Some(modifier) => style.add_modifier(modifier),
            None => style.fg(parse_color(word)?),
        };
    }
    if let Some(background) = background {
        style = style.bg(parse_color(background.trim())?);
    }

    Ok(style)
}

fn parse_modifier(word: &str) -> Option<Modifier> {
    let modifier = match word.to_ascii_lowercase().as_str() {
        "bold" => Modifier::BOLD,
        "dim" => Modifier::DIM,
        "italic" => Modifier::ITALIC,
        "underlined" => Modifier::UNDERLINED,
        "reversed" => Modifier::REVERSED,
        _ => return None,
    };
    Some(modifier)
}

fn parse_color(word: &str) -> Result<Color, String> {
    word.parse::<Color>()
        .map_err(|_| format!("unknown color: {word}"))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_hex_foreground() {
        assert_eq!(
            parse_style("#88cece").unwrap(),
            Style::default().fg(Color::Rgb(0x88, 0xce, 0xce))
        );
    }

    #[test]
    fn test_modifiers_and_background() {
        assert_eq!(
            parse_style("bold white on darkgray").unwrap(),
            Style::default()
                .fg(Color::White)
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD)
        );
    }

    #[test]
    fn test_unknown_color() {
        assert!(parse_style("sparkly").is_err());
    }
}
