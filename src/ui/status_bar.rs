use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use ui_behaviors::fixer::PositionStatus;
use ui_behaviors::popup::PopupState;

use super::theme::Theme;
use crate::app::App;

/// Render the bottom status bar: widget state on the left, key hints on the right
pub fn render(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let [left, right] =
        Layout::horizontal([Constraint::Percentage(55), Constraint::Percentage(45)]).areas(area);

    frame.render_widget(Paragraph::new(Line::from(state_spans(app, theme))), left);

    let hints = if app.show_help {
        help_hints(app, theme)
    } else {
        normal_hints(app, theme)
    };
    frame.render_widget(
        Paragraph::new(Line::from(hints)).alignment(Alignment::Right),
        right,
    );
}

fn state_spans(app: &App, theme: &Theme) -> Vec<Span<'static>> {
    let w = &app.widgets;

    let popup = match w.popups.get(w.popup).map(|p| p.state()) {
        Some(PopupState::Open) => "open",
        Some(PopupState::Closed) | None => "closed",
    };
    let sprite = &w.sprite;
    let (sprite_mark, sprite_style) = if sprite.is_animating() {
        ("▶", theme.style_running())
    } else {
        ("⏸", theme.style_paused())
    };
    let tab = w.switcher.name().unwrap_or("-").to_owned();
    let fixer = match w.fixer.status() {
        Some(PositionStatus::NotStopped) => "free",
        Some(PositionStatus::StoppedOnTop) => "top",
        Some(PositionStatus::StoppedOnBottom) => "bottom",
        None => "off",
    };

    vec![
        label(" popup "),
        Span::styled(popup, theme.style_default()),
        label("  sprite "),
        Span::styled(sprite_mark, sprite_style),
        Span::styled(
            format!(" {}/{} {}ms", sprite.current_frame(), sprite.frames_count(), sprite.frames_interval()),
            theme.style_default(),
        ),
        label("  counter "),
        Span::styled(w.rolling.value().to_string(), theme.style_default()),
        label("  tab "),
        Span::styled(tab, theme.style_default()),
        label("  fixer "),
        Span::styled(fixer, theme.style_default()),
    ]
}

fn normal_hints(app: &App, theme: &Theme) -> Vec<Span<'static>> {
    let keys = &app.config.keys;
    vec![
        key(&keys.play_pause, theme),
        desc("Play ", theme),
        key(&format!("{}{}", keys.increment, keys.decrement), theme),
        desc("Count ", theme),
        key("↑↓", theme),
        desc("Scroll ", theme),
        key(&keys.help, theme),
        desc("Help ", theme),
        key(&keys.quit, theme),
        desc("Quit", theme),
    ]
}

fn help_hints(app: &App, theme: &Theme) -> Vec<Span<'static>> {
    vec![
        key(&app.config.keys.help, theme),
        desc("Close ", theme),
        key("Esc", theme),
        desc("Close", theme),
    ]
}

fn label(text: &'static str) -> Span<'static> {
    Span::raw(text)
}

fn key(k: &str, theme: &Theme) -> Span<'static> {
    Span::styled(format!(" [{k}] "), theme.style_key_hint())
}

fn desc(d: &'static str, theme: &Theme) -> Span<'static> {
    Span::styled(d, theme.style_key_desc())
}
