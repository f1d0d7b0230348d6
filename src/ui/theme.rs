//! Theme color definitions for the report table

use crate::config::Theme;
use ratatui::style::Color;

/// Color palette for the report table
#[derive(Debug, Clone, Copy)]
pub struct ThemeColors {
    /// Primary foreground text
    pub fg: Color,
    /// Borders and footer text
    pub dim: Color,
    /// Header row and title
    pub cyan: Color,
    /// Steadiest key
    pub green: Color,
    /// Least steady key
    pub yellow: Color,
}

impl ThemeColors {
    /// Create a color palette for the given theme variant
    pub fn from_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self::dark(),
            Theme::Light => Self::light(),
        }
    }

    pub fn dark() -> Self {
        Self {
            fg: Color::Rgb(200, 200, 210),
            dim: Color::Rgb(90, 90, 110),
            cyan: Color::Rgb(80, 200, 220),
            green: Color::Rgb(80, 200, 120),
            yellow: Color::Rgb(240, 180, 80),
        }
    }

    /// High contrast for bright terminals
    pub fn light() -> Self {
        Self {
            fg: Color::Rgb(30, 30, 40),
            dim: Color::Rgb(130, 130, 150),
            cyan: Color::Rgb(0, 130, 160),
            green: Color::Rgb(30, 150, 70),
            yellow: Color::Rgb(180, 120, 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_theme_selects_correct_palette() {
        let dark = ThemeColors::from_theme(Theme::Dark);
        let light = ThemeColors::from_theme(Theme::Light);

        assert_eq!(dark.fg, ThemeColors::dark().fg);
        assert_ne!(dark.fg, light.fg);
    }
}
