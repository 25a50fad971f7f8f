//! Palette and class stylesheet
//!
//! Colours start from built-in defaults and can be overridden per entry in
//! the `[palette]` table of the config file.

use ratatui::style::{Color, Modifier, Style};

use crate::config::PaletteConfig;
use crate::dom::Element;

/// Theme colors for the UI
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub accent: Color,      // Focus borders, title
    pub gained: Color,      // "+" records
    pub burned: Color,      // "-" records
    pub danger: Color,      // Errors, delete buttons
    pub text: Color,        // Primary text
    pub text_dim: Color,    // Placeholders, hints
    pub inactive: Color,    // Unfocused borders
    pub bg_selected: Color, // Focused element background
}

impl Default for Theme {
    fn default() -> Self {
        // Catppuccin-inspired
        Self {
            accent: Color::Rgb(250, 179, 135),
            gained: Color::Rgb(166, 218, 149),
            burned: Color::Rgb(137, 180, 250),
            danger: Color::Rgb(243, 139, 168),
            text: Color::Rgb(205, 214, 244),
            text_dim: Color::Rgb(147, 153, 178),
            inactive: Color::Rgb(88, 91, 112),
            bg_selected: Color::Rgb(69, 71, 90),
        }
    }
}

impl Theme {
    /// Defaults with every parseable override from `palette` applied
    pub fn from_palette(palette: &PaletteConfig) -> Self {
        let mut theme = Self::default();
        let overrides: [(&Option<String>, &mut Color); 8] = [
            (&palette.accent, &mut theme.accent),
            (&palette.gained, &mut theme.gained),
            (&palette.burned, &mut theme.burned),
            (&palette.danger, &mut theme.danger),
            (&palette.text, &mut theme.text),
            (&palette.text_dim, &mut theme.text_dim),
            (&palette.inactive, &mut theme.inactive),
            (&palette.bg_selected, &mut theme.bg_selected),
        ];

        for (value, slot) in overrides {
            if let Some(raw) = value {
                match Self::parse_hex_color(raw) {
                    Some(color) => *slot = color,
                    None => tracing::warn!("Ignoring invalid palette colour '{}'", raw),
                }
            }
        }
        theme
    }

    /// Parse a hex color string (#RRGGBB or #RGB)
    pub fn parse_hex_color(s: &str) -> Option<Color> {
        let s = s.trim().trim_start_matches('#');
        if !s.is_ascii() {
            return None;
        }

        if s.len() == 6 {
            let r = u8::from_str_radix(&s[0..2], 16).ok()?;
            let g = u8::from_str_radix(&s[2..4], 16).ok()?;
            let b = u8::from_str_radix(&s[4..6], 16).ok()?;
            Some(Color::Rgb(r, g, b))
        } else if s.len() == 3 {
            let r = u8::from_str_radix(&s[0..1], 16).ok()? * 17;
            let g = u8::from_str_radix(&s[1..2], 16).ok()? * 17;
            let b = u8::from_str_radix(&s[2..3], 16).ok()? * 17;
            Some(Color::Rgb(r, g, b))
        } else {
            None
        }
    }

    /// Style for an element from its class list; the first known class wins
    pub fn style_for<A>(&self, el: &Element<A>) -> Style {
        for class in &el.classes {
            let style = match class.as_str() {
                "title-custom" => Style::default().fg(self.accent).add_modifier(Modifier::BOLD),
                "err-message" => Style::default().fg(self.danger),
                "tracker-button" => Style::default().fg(self.accent),
                "btn-edit" => Style::default().fg(self.text_dim),
                "btn-delete" => Style::default().fg(self.danger),
                "inp" => Style::default().fg(self.text),
                _ => continue,
            };
            return style;
        }
        Style::default().fg(self.text)
    }

    /// Colour of a rendered record line, keyed on its sign
    pub fn record_style(&self, text: &str) -> Style {
        if text.starts_with('+') {
            Style::default().fg(self.gained)
        } else if text.starts_with('-') {
            Style::default().fg(self.burned)
        } else {
            Style::default().fg(self.text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{Document, ElementBuilder};

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(Theme::parse_hex_color("#FFC107"), Some(Color::Rgb(255, 193, 7)));
        assert_eq!(Theme::parse_hex_color("fc0"), Some(Color::Rgb(255, 204, 0)));
        assert_eq!(Theme::parse_hex_color("#12345"), None);
        assert_eq!(Theme::parse_hex_color("#zzzzzz"), None);
        assert_eq!(Theme::parse_hex_color("#ééé"), None);
    }

    #[test]
    fn test_palette_overrides() {
        let palette = PaletteConfig {
            gained: Some("#00ff00".to_string()),
            danger: Some("not-a-colour".to_string()),
            ..PaletteConfig::default()
        };
        let theme = Theme::from_palette(&palette);
        assert_eq!(theme.gained, Color::Rgb(0, 255, 0));
        assert_eq!(theme.danger, Theme::default().danger);
        assert_eq!(theme.accent, Theme::default().accent);
    }

    #[test]
    fn test_style_for_classes() {
        let theme = Theme::default();
        let mut doc: Document<()> = Document::new();
        let delete = ElementBuilder::create(&mut doc, "button")
            .styles(&["unknown", "btn-delete"])
            .build();
        let plain = ElementBuilder::create(&mut doc, "span").build();

        assert_eq!(theme.style_for(doc.get(delete).unwrap()).fg, Some(theme.danger));
        assert_eq!(theme.style_for(doc.get(plain).unwrap()).fg, Some(theme.text));
        assert_eq!(theme.record_style("-200 calories").fg, Some(theme.burned));
    }
}
