use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::BorderType;

use crate::config::Config;

// ─── Color Palette (terminal-adaptive, transparency-friendly) ──────────

/// Background: always Reset (transparent), respects terminal background
pub const BG: Color = Color::Reset;
pub const FG: Color = Color::White;
/// Dimmed text (labels, faded elements)
pub const FG_DIM: Color = Color::DarkGray;
pub const BORDER: Color = Color::DarkGray;
pub const SUCCESS: Color = Color::Green;
pub const WARNING: Color = Color::Yellow;

/// Styles for one run of the playground; accent and borders come from config.
#[derive(Debug, Clone)]
pub struct Theme {
    pub accent: Color,
    pub border_type: BorderType,
}

impl Theme {
    pub fn from_config(config: &Config) -> Self {
        Self {
            accent: config.appearance.accent,
            border_type: config.appearance.border_style,
        }
    }

    pub fn style_default(&self) -> Style {
        Style::default().fg(FG).bg(BG)
    }

    pub fn style_dim(&self) -> Style {
        Style::default().fg(FG_DIM).bg(BG)
    }

    pub fn style_accent(&self) -> Style {
        Style::default().fg(self.accent).bg(BG)
    }

    pub fn style_accent_bold(&self) -> Style {
        self.style_accent().add_modifier(Modifier::BOLD)
    }

    pub fn style_border(&self) -> Style {
        Style::default().fg(BORDER).bg(BG)
    }

    /// Selected tab, parked sidebar
    pub fn style_border_marked(&self) -> Style {
        Style::default().fg(self.accent).bg(BG)
    }

    pub fn style_key_hint(&self) -> Style {
        self.style_accent_bold()
    }

    pub fn style_key_desc(&self) -> Style {
        Style::default().fg(FG_DIM).bg(BG)
    }

    pub fn style_running(&self) -> Style {
        Style::default().fg(SUCCESS).bg(BG).add_modifier(Modifier::BOLD)
    }

    pub fn style_paused(&self) -> Style {
        Style::default().fg(WARNING).bg(BG)
    }
}
