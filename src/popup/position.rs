//! Opener-relative popup placement.

use crate::dom::{Dom, NodeId, Offset, Style, CLASS_POSITIONER};

/// Popup offset that puts its anchor on top of the opener's anchor while
/// keeping the distance between the popup box and its own anchor.
pub fn aligned_offset(opener_anchor: Offset, popup: Offset, popup_anchor: Offset) -> Offset {
    Offset::new(
        opener_anchor.left + (popup.left - popup_anchor.left),
        opener_anchor.top + (popup.top - popup_anchor.top),
    )
}

/// The opener's positioner descendant, or the opener itself.
pub fn opener_anchor<D: Dom>(dom: &D, opener: NodeId) -> NodeId {
    dom.find_class(opener, CLASS_POSITIONER).unwrap_or(opener)
}

/// Move `root` so `popup_anchor` lines up with the opener's anchor.
/// Nothing happens when the popup declares no anchor.
pub fn position_if_possible<D: Dom>(
    dom: &mut D,
    root: NodeId,
    popup_anchor: Option<NodeId>,
    opener: NodeId,
) -> Option<Offset> {
    let popup_anchor = popup_anchor?;
    let target = aligned_offset(
        dom.offset(opener_anchor(dom, opener)),
        dom.offset(root),
        dom.offset(popup_anchor),
    );
    dom.set_style(root, Style::Left(target.left));
    dom.set_style(root, Style::Top(target.top));
    Some(target)
}
