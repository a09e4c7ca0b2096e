use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;
use unicode_width::UnicodeWidthChar;

use super::theme::Theme;
use crate::app::App;

/// Render the widget event feed, newest line last
pub fn render(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let block = Block::default()
        .title(Span::styled(" Events ", theme.style_accent()))
        .borders(Borders::ALL)
        .border_type(theme.border_type)
        .border_style(theme.style_border());

    let inner_width = usize::from(area.width.saturating_sub(2));
    let lines: Vec<Line> = app
        .widgets
        .activity
        .lines()
        .into_iter()
        .map(|line| Line::from(Span::styled(truncate(&line, inner_width), theme.style_dim())))
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Cut `text` to at most `width` terminal columns, marking the cut with `…`.
pub fn truncate(text: &str, width: usize) -> String {
    let mut out = String::new();
    let mut used = 0;
    for (i, ch) in text.char_indices() {
        let w = ch.width().unwrap_or(0);
        if used + w > width {
            let rest: usize = text[i..].chars().map(|c| c.width().unwrap_or(0)).sum();
            if rest == 0 {
                break;
            }
            // make room for the ellipsis
            while used + 1 > width {
                match out.pop() {
                    Some(c) => used -= c.width().unwrap_or(0),
                    None => return out,
                }
            }
            out.push('…');
            return out;
        }
        used += w;
        out.push(ch);
    }
    out
}
