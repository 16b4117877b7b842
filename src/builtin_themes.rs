//! Built-in themes for tunelet
//!
//! This module contains pre-defined themes for popular color schemes.

use crate::tui::Theme;
use ratatui::style::Color;

// Helper function to convert hex RGB to Color::Rgb
const fn rgb(r: u8, g: u8, b: u8) -> Color {
    Color::Rgb(r, g, b)
}

/// Catppuccin Mocha theme
///
/// A soothing pastel theme with warm, cozy colors.
/// Based on [Catppuccin](https://github.com/catppuccin/catppuccin)
pub fn catppuccin_mocha() -> Theme {
    Theme {
        background: rgb(30, 30, 46),    // #1e1e2e
        foreground: rgb(205, 214, 244), // #cdd6f4
        highlight: rgb(203, 166, 247),  // #cba6f7 (mauve)
    }
}

/// Gruvbox Dark theme
///
/// A warm, retro theme designed to be easy on the eyes.
/// Based on [Gruvbox](https://github.com/morhetz/gruvbox)
pub fn gruvbox_dark() -> Theme {
    Theme {
        background: rgb(40, 40, 40),   // #282828
        foreground: rgb(235, 219, 178), // #ebdbb2
        highlight: rgb(254, 128, 25),  // #fe8019 (orange)
    }
}

/// Nord theme
///
/// An arctic, north-bluish color palette with a cold and clean look.
/// Based on [Nord](https://github.com/arcticicestudio/nord)
pub fn nord() -> Theme {
    Theme {
        background: rgb(46, 52, 64),    // #2E3440 (nord0)
        foreground: rgb(216, 222, 233), // #D8DEE9 (nord4)
        highlight: rgb(136, 192, 208),  // #88C0D0 (nord8 - frost)
    }
}

/// One Dark theme
///
/// The popular dark theme from Atom editor, now widely used in VSCode.
/// Based on [One Dark Pro](https://github.com/binaryify/OneDark-Pro)
pub fn one_dark() -> Theme {
    Theme {
        background: rgb(40, 44, 52),    // #282C34
        foreground: rgb(171, 178, 191), // #ABB2BF
        highlight: rgb(198, 120, 221),  // #C678DD (purple)
    }
}

/// Solarized Dark theme
///
/// A precision color scheme with careful attention to color theory.
/// Designed by Ethan Schoonover.
pub fn solarized_dark() -> Theme {
    Theme {
        background: rgb(0, 43, 54),    // #002B36 (base03)
        foreground: rgb(131, 148, 150), // #839496 (base0)
        highlight: rgb(42, 161, 152),  // #2aa198 (cyan)
    }
}

/// Get a theme by name
///
/// Returns `None` if the theme name is not recognized.
pub fn get_by_name(name: &str) -> Option<Theme> {
    match name {
        "Catppuccin Mocha" => Some(catppuccin_mocha()),
        "Gruvbox Dark" => Some(gruvbox_dark()),
        "Nord" => Some(nord()),
        "One Dark" => Some(one_dark()),
        "Solarized Dark" => Some(solarized_dark()),
        _ => None,
    }
}

/// Get a list of all available theme names
pub fn list_themes() -> &'static [&'static str] {
    &[
        "Catppuccin Mocha",
        "Gruvbox Dark",
        "Nord",
        "One Dark",
        "Solarized Dark",
    ]
}

#[cfg(test)]
mod tests {
    use super::{get_by_name, gruvbox_dark, list_themes};

    #[test]
    fn every_listed_theme_resolves() {
        for name in list_themes() {
            assert!(get_by_name(name).is_some(), "missing theme: {name}");
        }
    }

    #[test]
    fn unknown_theme_is_none() {
        assert!(get_by_name("Hotdog Stand").is_none());
        // lookup is case-sensitive, like the config file
        assert!(get_by_name("gruvbox dark").is_none());
    }

    #[test]
    fn lookup_returns_the_named_palette() {
        assert_eq!(get_by_name("Gruvbox Dark"), Some(gruvbox_dark()));
    }
}
