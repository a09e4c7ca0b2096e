use ratatui::layout::Rect;
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use ui_behaviors::dom::{CLASS_SELECTED, CLASS_STOPPED};
use ui_behaviors::{Dom, NodeId, Style as InlineStyle, StyleProp};

use super::theme::Theme;
use crate::app::App;
use crate::demo::{Look, SPRITE_GLYPHS};

/// Nodes at or below this opacity are not drawn; below [`DIM_OPACITY`] they
/// are drawn dimmed.
const HIDDEN_OPACITY: f32 = 0.0;
const DIM_OPACITY: f32 = 0.5;

/// A node's box on screen after scrolling and clipping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub rect: Rect,
    /// Rows cut off above the viewport
    pub skipped_rows: u16,
}

/// Map a document box into `area`. `None` when nothing of it is visible.
pub fn place(area: Rect, left: f64, top: f64, width: f64, height: f64, scroll: f64) -> Option<Placement> {
    let x0 = f64::from(area.x) + left;
    let y0 = f64::from(area.y) + top - scroll;
    let x1 = (x0 + width).min(f64::from(area.right()));
    let y1 = (y0 + height).min(f64::from(area.bottom()));
    let cx = x0.max(f64::from(area.x));
    let cy = y0.max(f64::from(area.y));

    if x1 <= cx || y1 <= cy {
        return None;
    }
    Some(Placement {
        rect: Rect::new(cx as u16, cy as u16, (x1 - cx) as u16, (y1 - cy) as u16),
        skipped_rows: (cy - y0).max(0.0) as u16,
    })
}

/// Draw every visible scene node at its document offset.
pub fn render(f: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let dom = app.stage.memory_dom();
    let scroll = dom.scroll_top();

    for &(node, look) in &app.scene.looks {
        if !dom.is_visible(node) {
            continue;
        }
        let Some(opacity) = rendered_opacity(dom, node) else {
            continue;
        };
        if opacity <= HIDDEN_OPACITY {
            continue;
        }

        let offset = dom.offset(node);
        let size = dom.size(node);
        let Some(placement) = place(area, offset.left, offset.top, size.width, size.height, scroll) else {
            continue;
        };

        let mut text_style = theme.style_default();
        if opacity < DIM_OPACITY {
            text_style = theme.style_dim().add_modifier(Modifier::DIM);
        }

        match look {
            Look::Text => {
                let para = Paragraph::new(dom.text(node))
                    .style(text_style)
                    .scroll((placement.skipped_rows, 0));
                f.render_widget(para, placement.rect);
            }
            Look::Panel(title) => {
                let block = panel(node, title, app, theme);
                let para = Paragraph::new(dom.text(node))
                    .style(text_style)
                    .block(block)
                    .scroll((placement.skipped_rows, 0));
                f.render_widget(Clear, placement.rect);
                f.render_widget(para, placement.rect);
            }
            Look::Sprite => {
                let sprite = &app.widgets.sprite;
                let frame = sprite.current_frame();
                let glyph = SPRITE_GLYPHS
                    .get(frame.saturating_sub(1) as usize)
                    .copied()
                    .unwrap_or(' ');
                let state = if sprite.is_animating() {
                    Span::styled(" ▶ ", theme.style_running())
                } else {
                    Span::styled(" ⏸ ", theme.style_paused())
                };
                let block = Block::default()
                    .title(Line::from(vec![Span::styled(" Sprite", theme.style_accent()), state]))
                    .borders(Borders::ALL)
                    .border_type(theme.border_type)
                    .border_style(theme.style_border());
                let line = Line::from(vec![
                    Span::styled(format!(" {glyph} "), theme.style_accent_bold()),
                    Span::styled(format!("{frame}/{}", sprite.frames_count()), text_style),
                ]);
                f.render_widget(Clear, placement.rect);
                f.render_widget(Paragraph::new(line).block(block), placement.rect);
            }
        }
    }
}

/// Opacity after multiplying in every ancestor; `None` when the node or an
/// ancestor is `visibility:hidden`.
pub fn rendered_opacity<D: Dom>(dom: &D, node: NodeId) -> Option<f32> {
    let mut opacity = 1.0;
    let mut current = Some(node);
    while let Some(id) = current {
        if dom.style(id, StyleProp::Visibility).is_some() {
            return None;
        }
        if let Some(InlineStyle::Opacity(value)) = dom.style(id, StyleProp::Opacity) {
            opacity *= value;
        }
        current = dom.parent(id);
    }
    Some(opacity)
}

fn panel(node: NodeId, title: &'static str, app: &App, theme: &Theme) -> Block<'static> {
    let dom = app.stage.memory_dom();
    let marked = dom.has_class(node, CLASS_SELECTED) || dom.has_class(node, CLASS_STOPPED);
    let border = if marked {
        theme.style_border_marked()
    } else {
        theme.style_border()
    };

    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_type(theme.border_type)
        .border_style(border);
    if !title.is_empty() {
        block = block.title(Span::styled(format!(" {title} "), theme.style_accent()));
    }
    block
}
