use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use super::theme::Theme;
use crate::app::App;

/// Keybinding entries: (key, description). Configurable keys come first.
fn keybindings(app: &App) -> Vec<(String, &'static str)> {
    let keys = &app.config.keys;
    vec![
        (keys.play_pause.clone(), "Play / pause the sprite"),
        (keys.rewind.clone(), "Rewind the sprite to frame 1"),
        (keys.reverse.clone(), "Reverse the sprite direction"),
        (keys.increment.clone(), "Roll the counter up"),
        (keys.decrement.clone(), "Roll the counter down"),
        (keys.zero.clone(), "Roll the counter to zero (fades out)"),
        ("↑ / ↓".into(), "Scroll the document"),
        ("PgUp / PgDn".into(), "Scroll by a page"),
        ("Home / End".into(), "Glide to the top / the footer"),
        ("[ / ]".into(), "Step the quantity down / up"),
        ("Click".into(), "Open a popup / pick a tab / toggle a tag"),
        ("Esc".into(), "Close open popups"),
        (keys.help.clone(), "Toggle this help"),
        (keys.quit.clone(), "Quit"),
    ]
}

/// Render the help overlay
pub fn render(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let entries = keybindings(app);
    let width = 52_u16.min(area.width.saturating_sub(4));
    let height = (entries.len() as u16 + 4).min(area.height.saturating_sub(2));

    let dialog = super::centered_rect_fixed(width, height, area);
    frame.render_widget(Clear, dialog);

    let block = Block::default()
        .title(Span::styled(" Keybindings ", theme.style_accent_bold()))
        .borders(Borders::ALL)
        .border_type(theme.border_type)
        .border_style(theme.style_accent())
        .style(theme.style_default());

    let mut lines: Vec<Line> = Vec::with_capacity(entries.len() + 2);
    lines.push(Line::from(""));
    for (key, desc) in entries {
        lines.push(Line::from(vec![
            Span::styled(format!("  {key:<12}"), theme.style_key_hint()),
            Span::styled(desc, theme.style_default()),
        ]));
    }

    frame.render_widget(Paragraph::new(lines).block(block), dialog);
}
