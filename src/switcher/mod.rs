//! Radio-style selection among item elements, each optionally tied to views.
//!
//! An item's name comes from a `for_<name>` class. Views are bound per item:
//!
//! - `for_all` shows every view;
//! - `for_<name>` shows views carrying the class `<name>`;
//! - an unnamed item shows the view at its position among the items that
//!   are not `for_all`.
//!
//! The selected item carries [`CLASS_SELECTED`]; views of every other item
//! carry [`CLASS_NOT_DISPLAY`]. [`MultipleSwitcher`] is the checkbox-style
//! sibling.

pub mod multiple;

pub use multiple::{MultipleSwitcher, ValueChangeEvent};

use std::fmt;

use tracing::debug;

use crate::dom::{Dom, NodeId, CLASS_NOT_DISPLAY, CLASS_PSEUDO, CLASS_SELECTED};
use crate::observer::{ListenerId, Observers};

const NAME_PREFIX: &str = "for_";
pub const NAME_ITEM_FOR_ALL: &str = "all";

/// Which element inside an item reacts to clicks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkSelector {
    /// The item element itself.
    Item,
    /// First descendant with this class.
    Class(String),
}

impl Default for LinkSelector {
    fn default() -> Self {
        LinkSelector::Class(CLASS_PSEUDO.to_string())
    }
}

#[derive(Debug, Clone, Default)]
pub struct SwitcherOptions {
    pub views: Vec<NodeId>,
    pub link: LinkSelector,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwitcherEventKind {
    Change,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub kind: SwitcherEventKind,
    pub index: usize,
    /// Who asked for the change; `None` for clicks.
    pub author: Option<String>,
}

#[derive(Debug, Clone)]
struct Item {
    root: NodeId,
    link: Option<NodeId>,
    name: Option<String>,
    views: Vec<NodeId>,
}

impl Item {
    fn select<D: Dom>(&self, dom: &mut D) {
        dom.add_class(self.root, CLASS_SELECTED);
        for &view in &self.views {
            dom.remove_class(view, CLASS_NOT_DISPLAY);
        }
    }

    fn deselect<D: Dom>(&self, dom: &mut D) {
        dom.remove_class(self.root, CLASS_SELECTED);
        for &view in &self.views {
            dom.add_class(view, CLASS_NOT_DISPLAY);
        }
    }
}

pub struct Switcher {
    items: Vec<Item>,
    selected: Option<usize>,
    prev_selected: Option<usize>,
    disabled: bool,
    observers: Observers<SwitcherEventKind, ChangeEvent>,
}

/// Name from the first `for_<name>` class.
fn parse_item_name(classes: &[String]) -> Option<String> {
    classes.iter().find_map(|class| {
        let name = class.strip_prefix(NAME_PREFIX)?;
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_alphanumeric() || c == '_' || c == '-');
        valid.then(|| name.to_string())
    })
}

impl Switcher {
    /// Bind `elements` as items. The element already carrying `selected`
    /// becomes the initial selection without a change event.
    pub fn new<D: Dom>(dom: &mut D, elements: &[NodeId], options: SwitcherOptions) -> Self {
        let all_class = format!("{NAME_PREFIX}{NAME_ITEM_FOR_ALL}");
        let positional: Vec<NodeId> = elements
            .iter()
            .copied()
            .filter(|&el| !dom.has_class(el, &all_class))
            .collect();

        let mut items = Vec::with_capacity(elements.len());
        let mut initial = None;

        for (index, &root) in elements.iter().enumerate() {
            let link = match &options.link {
                LinkSelector::Item => Some(root),
                LinkSelector::Class(class) => dom.find_class(root, class),
            };
            let name = parse_item_name(&dom.classes(root));

            let views = match name.as_deref() {
                Some(NAME_ITEM_FOR_ALL) => options.views.clone(),
                Some(name) => options
                    .views
                    .iter()
                    .copied()
                    .filter(|&view| dom.has_class(view, name))
                    .collect(),
                None => positional
                    .iter()
                    .position(|&el| el == root)
                    .and_then(|i| options.views.get(i).copied())
                    .into_iter()
                    .collect(),
            };

            if dom.has_class(root, CLASS_SELECTED) {
                initial = Some(index);
            }

            let item = Item {
                root,
                link,
                name,
                views,
            };
            item.deselect(dom);
            items.push(item);
        }

        let mut switcher = Self {
            items,
            selected: None,
            prev_selected: None,
            disabled: false,
            observers: Observers::new(),
        };
        if let Some(index) = initial {
            switcher.select(dom, index, true, None);
        }
        debug!(items = switcher.items.len(), selected = ?switcher.selected, "switcher created");
        switcher
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn index(&self) -> Option<usize> {
        self.selected
    }

    pub fn name(&self) -> Option<&str> {
        self.selected.and_then(|i| self.items[i].name.as_deref())
    }

    pub fn prev_index(&self) -> Option<usize> {
        self.prev_selected
    }

    pub fn prev_name(&self) -> Option<&str> {
        self.prev_selected.and_then(|i| self.items[i].name.as_deref())
    }

    /// Item element at `index`.
    pub fn item(&self, index: usize) -> Option<NodeId> {
        self.items.get(index).map(|item| item.root)
    }

    /// Unknown indices and the current selection are ignored.
    pub fn set_index<D: Dom>(&mut self, dom: &mut D, index: usize, author: Option<&str>) {
        if index < self.items.len() {
            self.select(dom, index, false, author);
        }
    }

    pub fn set_name<D: Dom>(&mut self, dom: &mut D, name: &str, author: Option<&str>) {
        if let Some(index) = self
            .items
            .iter()
            .position(|item| item.name.as_deref() == Some(name))
        {
            self.select(dom, index, false, author);
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Disabling only affects clicks; programmatic selection still works.
    pub fn disable(&mut self) {
        self.disabled = true;
    }

    pub fn enable(&mut self) {
        self.disabled = false;
    }

    pub fn add_event_listener<F>(&mut self, kind: SwitcherEventKind, callback: F) -> ListenerId
    where
        F: FnMut(&ChangeEvent) + 'static,
    {
        self.observers.add(kind, callback)
    }

    pub fn remove_event_listener(&mut self, id: ListenerId) -> bool {
        self.observers.remove(id)
    }

    /// Select the item whose link contains `target`. Returns `true` when the
    /// click landed on a link, even if the switcher is disabled.
    pub fn handle_click<D: Dom>(&mut self, dom: &mut D, target: NodeId) -> bool {
        let Some(index) = self
            .items
            .iter()
            .position(|item| item.link.is_some_and(|link| dom.contains(link, target)))
        else {
            return false;
        };

        if !self.disabled {
            self.select(dom, index, false, None);
        }
        true
    }

    fn select<D: Dom>(&mut self, dom: &mut D, index: usize, initial: bool, author: Option<&str>) {
        if self.selected == Some(index) {
            return;
        }

        if let Some(current) = self.selected {
            self.prev_selected = Some(current);
            self.items[current].deselect(dom);
        }
        self.items[index].select(dom);
        self.selected = Some(index);

        if !initial {
            debug!(index, author, "switcher changed");
            self.observers.emit(
                SwitcherEventKind::Change,
                &ChangeEvent {
                    kind: SwitcherEventKind::Change,
                    index,
                    author: author.map(str::to_string),
                },
            );
        }
    }
}

impl fmt::Debug for Switcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Switcher")
            .field("items", &self.items)
            .field("selected", &self.selected)
            .field("prev_selected", &self.prev_selected)
            .field("disabled", &self.disabled)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{MemoryDom, Offset, Size};
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Tabs {
        dom: MemoryDom,
        items: Vec<NodeId>,
        links: Vec<NodeId>,
        views: Vec<NodeId>,
    }

    fn tabs(item_classes: &[&[&str]], view_classes: &[&[&str]]) -> Tabs {
        let mut dom = MemoryDom::new(Size::new(100.0, 100.0));
        let doc = dom.document();
        let mut items = Vec::new();
        let mut links = Vec::new();
        for (i, classes) in item_classes.iter().enumerate() {
            let origin = Offset::new(i as f64 * 10.0, 0.0);
            let item = dom.append_with(doc, origin, Size::new(10.0, 2.0), classes, "").unwrap();
            let link = dom
                .append_with(item, Offset::default(), Size::new(6.0, 1.0), &[CLASS_PSEUDO], "tab")
                .unwrap();
            items.push(item);
            links.push(link);
        }
        let views = view_classes
            .iter()
            .map(|classes| {
                dom.append_with(doc, Offset::new(0.0, 10.0), Size::new(50.0, 20.0), classes, "")
                    .unwrap()
            })
            .collect();
        Tabs {
            dom,
            items,
            links,
            views,
        }
    }

    fn shown(t: &Tabs) -> Vec<bool> {
        t.views
            .iter()
            .map(|&v| !t.dom.has_class(v, CLASS_NOT_DISPLAY))
            .collect()
    }

    fn options(t: &Tabs) -> SwitcherOptions {
        SwitcherOptions {
            views: t.views.clone(),
            ..SwitcherOptions::default()
        }
    }

    #[test]
    fn item_names_come_from_for_classes() {
        let classes = |list: &[&str]| list.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        assert_eq!(parse_item_name(&classes(&["tab", "for_news"])), Some("news".into()));
        assert_eq!(parse_item_name(&classes(&["for_a-b_c"])), Some("a-b_c".into()));
        assert_eq!(parse_item_name(&classes(&["for_", "tab"])), None);
        assert_eq!(parse_item_name(&classes(&["format"])), None);
    }

    #[test]
    fn initial_selection_is_silent_and_hides_other_views() {
        let mut t = tabs(&[&[], &[CLASS_SELECTED], &[]], &[&[], &[], &[]]);
        let opts = options(&t);
        let switcher = Switcher::new(&mut t.dom, &t.items, opts);
        assert_eq!(switcher.index(), Some(1));
        assert_eq!(switcher.prev_index(), None);
        assert_eq!(shown(&t), [false, true, false]);
        assert!(t.dom.has_class(t.items[1], CLASS_SELECTED));
    }

    #[test]
    fn no_initial_selection_hides_every_view() {
        let mut t = tabs(&[&[], &[]], &[&[], &[]]);
        let opts = options(&t);
        let switcher = Switcher::new(&mut t.dom, &t.items, opts);
        assert_eq!(switcher.index(), None);
        assert_eq!(shown(&t), [false, false]);
    }

    #[test]
    fn clicks_select_and_emit_change() {
        let mut t = tabs(&[&[CLASS_SELECTED], &[], &[]], &[&[], &[], &[]]);
        let opts = options(&t);
        let mut switcher = Switcher::new(&mut t.dom, &t.items, opts);
        let events = Rc::new(RefCell::new(Vec::new()));
        let e = Rc::clone(&events);
        switcher.add_event_listener(SwitcherEventKind::Change, move |ev| e.borrow_mut().push(ev.clone()));

        assert!(switcher.handle_click(&mut t.dom, t.links[2]));
        assert_eq!(switcher.index(), Some(2));
        assert_eq!(switcher.prev_index(), Some(0));
        assert_eq!(shown(&t), [false, false, true]);

        assert!(switcher.handle_click(&mut t.dom, t.links[2]));
        assert!(!switcher.handle_click(&mut t.dom, t.items[1]));

        assert_eq!(events.borrow().len(), 1);
        assert_eq!(events.borrow()[0].index, 2);
        assert_eq!(events.borrow()[0].author, None);
    }

    #[test]
    fn disabled_switcher_ignores_clicks_but_not_calls() {
        let mut t = tabs(&[&[CLASS_SELECTED], &[]], &[]);
        let mut switcher = Switcher::new(&mut t.dom, &t.items, SwitcherOptions::default());
        switcher.disable();
        assert!(switcher.handle_click(&mut t.dom, t.links[1]));
        assert_eq!(switcher.index(), Some(0));

        switcher.set_index(&mut t.dom, 1, Some("script"));
        assert_eq!(switcher.index(), Some(1));
        switcher.enable();
        assert!(!switcher.is_disabled());
    }

    #[test]
    fn named_and_for_all_items_bind_views() {
        let mut t = tabs(
            &[&["for_all"], &["for_news", CLASS_SELECTED], &[]],
            &[&["news"], &["blogs"], &["news"]],
        );
        let opts = options(&t);
        let mut switcher = Switcher::new(&mut t.dom, &t.items, opts);
        assert_eq!(switcher.name(), Some("news"));
        assert_eq!(shown(&t), [true, false, true]);

        switcher.set_name(&mut t.dom, "all", Some("menu"));
        assert_eq!(shown(&t), [true, true, true]);
        assert_eq!(switcher.prev_name(), Some("news"));

        // Unnamed third item is second among non-`for_all` items.
        switcher.set_index(&mut t.dom, 2, None);
        assert_eq!(shown(&t), [false, true, false]);
        assert_eq!(switcher.name(), None);
    }

    #[test]
    fn programmatic_changes_carry_author_and_ignore_unknown_targets() {
        let mut t = tabs(&[&["for_a"], &["for_b"]], &[]);
        let mut switcher = Switcher::new(&mut t.dom, &t.items, SwitcherOptions::default());
        let events = Rc::new(RefCell::new(Vec::new()));
        let e = Rc::clone(&events);
        let id = switcher.add_event_listener(SwitcherEventKind::Change, move |ev| e.borrow_mut().push(ev.clone()));

        switcher.set_name(&mut t.dom, "b", Some("keyboard"));
        switcher.set_name(&mut t.dom, "missing", None);
        switcher.set_index(&mut t.dom, 9, None);
        assert_eq!(switcher.index(), Some(1));
        assert_eq!(events.borrow()[0].author.as_deref(), Some("keyboard"));

        assert!(switcher.remove_event_listener(id));
        switcher.set_index(&mut t.dom, 0, None);
        assert_eq!(events.borrow().len(), 1);
    }

    #[test]
    fn item_itself_can_be_the_link() {
        let mut t = tabs(&[&[], &[]], &[]);
        let options = SwitcherOptions {
            link: LinkSelector::Item,
            ..SwitcherOptions::default()
        };
        let mut switcher = Switcher::new(&mut t.dom, &t.items, options);
        assert!(switcher.handle_click(&mut t.dom, t.items[1]));
        assert_eq!(switcher.index(), Some(1));
    }
}
