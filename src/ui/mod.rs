pub mod activity;
pub mod help;
pub mod scene;
pub mod status_bar;
pub mod theme;

use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::widgets::{Block, Borders};
use ratatui::Frame;

use crate::app::App;
use crate::demo::DOCUMENT_WIDTH;
use theme::Theme;

/// Minimum columns kept for the event feed beside the document.
const ACTIVITY_MIN_WIDTH: u16 = 24;

/// Top-level draw function: document on the left, event feed on the right,
/// status bar at the bottom, help on top when toggled.
pub fn draw(f: &mut Frame, app: &mut App) {
    let theme = Theme::from_config(&app.config);
    let [main, status] = Layout::vertical([Constraint::Min(3), Constraint::Length(1)]).areas(f.area());
    let [document, feed] = Layout::horizontal([
        Constraint::Length(DOCUMENT_WIDTH as u16 + 2),
        Constraint::Min(ACTIVITY_MIN_WIDTH),
    ])
    .areas(main);

    let frame_block = Block::default()
        .borders(Borders::ALL)
        .border_type(theme.border_type)
        .border_style(theme.style_border());
    let viewport = frame_block.inner(document);
    f.render_widget(frame_block, document);

    // the viewport height feeds scroll clamping, so resync the fixer on change
    if viewport != app.viewport {
        app.viewport = viewport;
        app.refit();
    }

    scene::render(f, app, &theme, viewport);
    activity::render(f, app, &theme, feed);
    status_bar::render(f, app, &theme, status);

    if app.show_help {
        help::render(f, app, &theme, f.area());
    }
}

/// A `width` x `height` rect centered in `area`, clamped to it.
pub fn centered_rect_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}
