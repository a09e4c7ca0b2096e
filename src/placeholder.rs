//! Placeholder text for inputs without native support: the hint lives in the
//! input's own text while it is empty and unfocused.
//!
//! The input carries [`CLASS_EMPTY`] while it shows the hint and
//! [`CLASS_FILLED`] once the user has typed something else.

use tracing::debug;

use crate::dom::{Dom, NodeId, CLASS_EMPTY, CLASS_FILLED};

pub const PLACEHOLDER_ATTRIBUTE: &str = "placeholder";

#[derive(Debug, Clone)]
pub struct InputPlaceholder {
    root: NodeId,
    placeholder: String,
}

impl InputPlaceholder {
    /// Take over `root`. An empty input gets the hint right away.
    pub fn new<D: Dom>(dom: &mut D, root: NodeId, placeholder: &str) -> Self {
        let input = Self {
            root,
            placeholder: placeholder.trim().to_string(),
        };
        if input.value(dom).is_empty() {
            dom.set_text(root, &input.placeholder);
        }
        if !input.is_touched(dom) {
            input.mark_empty(dom);
        }
        debug!(node = root.0, placeholder = input.placeholder.as_str(), "placeholder attached");
        input
    }

    /// Every descendant of `root` with a `placeholder` attribute.
    pub fn decorate_all<D: Dom>(dom: &mut D, root: NodeId) -> Vec<Self> {
        let inputs: Vec<(NodeId, String)> = dom
            .descendants(root)
            .into_iter()
            .filter_map(|node| Some((node, dom.attribute(node, PLACEHOLDER_ATTRIBUTE)?)))
            .collect();
        inputs
            .into_iter()
            .map(|(node, placeholder)| Self::new(dom, node, &placeholder))
            .collect()
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    /// Holds typed text other than the hint.
    pub fn is_touched<D: Dom>(&self, dom: &D) -> bool {
        let value = self.value(dom);
        !value.is_empty() && value != self.placeholder
    }

    pub fn on_key_up<D: Dom>(&self, dom: &mut D) {
        if !self.value(dom).is_empty() {
            self.mark_filled(dom);
        }
    }

    pub fn on_focus<D: Dom>(&self, dom: &mut D) {
        if self.value(dom) == self.placeholder {
            dom.set_text(self.root, "");
        }
        self.mark_filled(dom);
    }

    /// Restore the hint unless the user left text behind.
    pub fn on_blur<D: Dom>(&self, dom: &mut D) {
        if self.is_touched(dom) {
            self.mark_filled(dom);
        } else {
            dom.set_text(self.root, &self.placeholder);
            self.mark_empty(dom);
        }
    }

    fn value<D: Dom>(&self, dom: &D) -> String {
        dom.text(self.root).trim().to_string()
    }

    fn mark_filled<D: Dom>(&self, dom: &mut D) {
        dom.remove_class(self.root, CLASS_EMPTY);
        dom.add_class(self.root, CLASS_FILLED);
    }

    fn mark_empty<D: Dom>(&self, dom: &mut D) {
        dom.remove_class(self.root, CLASS_FILLED);
        dom.add_class(self.root, CLASS_EMPTY);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{MemoryDom, Offset, Size};

    fn field(text: &str) -> (MemoryDom, NodeId) {
        let mut dom = MemoryDom::new(Size::new(40.0, 10.0));
        let doc = dom.document();
        let node = dom.append_with(doc, Offset::default(), Size::new(20.0, 1.0), &[], text).unwrap();
        (dom, node)
    }

    #[test]
    fn empty_input_shows_hint() {
        let (mut dom, node) = field("  ");
        let input = InputPlaceholder::new(&mut dom, node, " Your name ");
        assert_eq!(dom.text(node), "Your name");
        assert!(dom.has_class(node, CLASS_EMPTY));
        assert!(!input.is_touched(&dom));
    }

    #[test]
    fn prefilled_input_keeps_its_text() {
        let (mut dom, node) = field("Ann");
        let input = InputPlaceholder::new(&mut dom, node, "Your name");
        assert_eq!(dom.text(node), "Ann");
        assert!(!dom.has_class(node, CLASS_EMPTY));
        assert!(input.is_touched(&dom));
    }

    #[test]
    fn focus_typing_and_blur_cycle() {
        let (mut dom, node) = field("");
        let input = InputPlaceholder::new(&mut dom, node, "Search");

        input.on_focus(&mut dom);
        assert_eq!(dom.text(node), "");
        assert!(dom.has_class(node, CLASS_FILLED));
        assert!(!dom.has_class(node, CLASS_EMPTY));

        input.on_blur(&mut dom);
        assert_eq!(dom.text(node), "Search");
        assert!(dom.has_class(node, CLASS_EMPTY));
        assert!(!dom.has_class(node, CLASS_FILLED));

        input.on_focus(&mut dom);
        dom.set_text(node, "rust");
        input.on_key_up(&mut dom);
        input.on_blur(&mut dom);
        assert_eq!(dom.text(node), "rust");
        assert!(dom.has_class(node, CLASS_FILLED));
    }

    #[test]
    fn typing_the_hint_itself_counts_as_untouched() {
        let (mut dom, node) = field("");
        let input = InputPlaceholder::new(&mut dom, node, "Search");
        input.on_focus(&mut dom);
        dom.set_text(node, "Search ");
        input.on_blur(&mut dom);
        assert_eq!(dom.text(node), "Search");
        assert!(dom.has_class(node, CLASS_EMPTY));
    }

    #[test]
    fn decorate_all_finds_inputs_by_attribute() {
        let (mut dom, node) = field("");
        let doc = dom.document();
        let other = dom.append(doc, Offset::default(), Size::new(20.0, 1.0)).unwrap();
        dom.set_attribute(node, PLACEHOLDER_ATTRIBUTE, "Email");

        let inputs = InputPlaceholder::decorate_all(&mut dom, doc);
        assert_eq!(inputs.len(), 1);
        assert_eq!(inputs[0].root(), node);
        assert_eq!(inputs[0].placeholder(), "Email");
        assert_eq!(dom.text(node), "Email");
        assert_eq!(dom.text(other), "");
    }
}
