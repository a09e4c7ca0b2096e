//! Checkbox-style selection: every item toggles on its own.
//!
//! An item's value is its `data-value` attribute, or its position among the
//! items when the attribute is missing. Values must be unique. Selected items
//! carry [`CLASS_SELECTED`].

use std::collections::HashSet;
use std::fmt;

use tracing::debug;

use super::{LinkSelector, SwitcherEventKind};
use crate::dom::{Dom, NodeId, CLASS_SELECTED};
use crate::error::{BehaviorError, BehaviorResult};
use crate::observer::{ListenerId, Observers};

pub const VALUE_ATTRIBUTE: &str = "data-value";

/// One value went in or out of the selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueChangeEvent {
    pub kind: SwitcherEventKind,
    pub value: String,
    pub selected: bool,
    /// Who asked for the change; `None` for clicks.
    pub author: Option<String>,
}

#[derive(Debug, Clone)]
struct Item {
    root: NodeId,
    link: Option<NodeId>,
    value: String,
}

pub struct MultipleSwitcher {
    items: Vec<Item>,
    selected: HashSet<String>,
    disabled: bool,
    observers: Observers<SwitcherEventKind, ValueChangeEvent>,
}

impl MultipleSwitcher {
    /// Bind `elements` as items. Elements already carrying `selected` start
    /// selected. Fails on duplicate values.
    pub fn new<D: Dom>(dom: &mut D, elements: &[NodeId], link: LinkSelector) -> BehaviorResult<Self> {
        let mut items = Vec::with_capacity(elements.len());
        let mut seen = HashSet::new();
        let mut selected = HashSet::new();

        for (index, &root) in elements.iter().enumerate() {
            let value = dom
                .attribute(root, VALUE_ATTRIBUTE)
                .unwrap_or_else(|| index.to_string());
            if !seen.insert(value.clone()) {
                return Err(BehaviorError::DuplicateValue(value));
            }
            if dom.has_class(root, CLASS_SELECTED) {
                selected.insert(value.clone());
            }
            let link = match &link {
                LinkSelector::Item => Some(root),
                LinkSelector::Class(class) => dom.find_class(root, class),
            };
            items.push(Item { root, link, value });
        }

        debug!(items = items.len(), selected = selected.len(), "multiple switcher created");
        Ok(Self {
            items,
            selected,
            disabled: false,
            observers: Observers::new(),
        })
    }

    /// Every value in item order.
    pub fn all_values(&self) -> Vec<&str> {
        self.items.iter().map(|item| item.value.as_str()).collect()
    }

    /// Selected values in item order.
    pub fn selected_values(&self) -> Vec<&str> {
        self.items
            .iter()
            .filter(|item| self.selected.contains(&item.value))
            .map(|item| item.value.as_str())
            .collect()
    }

    pub fn is_value_selected(&self, value: &str) -> bool {
        self.selected.contains(value)
    }

    /// Make the selection exactly `values`; unknown entries are ignored.
    /// Emits one event per value that changed.
    pub fn set_values<D: Dom>(&mut self, dom: &mut D, values: &[&str]) {
        for index in 0..self.items.len() {
            let on = values.contains(&self.items[index].value.as_str());
            self.apply(dom, index, on, None);
        }
    }

    pub fn toggle_value<D: Dom>(&mut self, dom: &mut D, value: &str, author: Option<&str>) -> BehaviorResult<()> {
        let index = self.item_index(value)?;
        self.apply(dom, index, !self.is_value_selected(value), author);
        Ok(())
    }

    /// No-op when already selected.
    pub fn select_value<D: Dom>(&mut self, dom: &mut D, value: &str, author: Option<&str>) -> BehaviorResult<()> {
        let index = self.item_index(value)?;
        self.apply(dom, index, true, author);
        Ok(())
    }

    /// No-op when not selected.
    pub fn deselect_value<D: Dom>(&mut self, dom: &mut D, value: &str, author: Option<&str>) -> BehaviorResult<()> {
        let index = self.item_index(value)?;
        self.apply(dom, index, false, author);
        Ok(())
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Disabling only affects clicks.
    pub fn disable(&mut self) {
        self.disabled = true;
    }

    pub fn enable(&mut self) {
        self.disabled = false;
    }

    pub fn add_event_listener<F>(&mut self, kind: SwitcherEventKind, callback: F) -> ListenerId
    where
        F: FnMut(&ValueChangeEvent) + 'static,
    {
        self.observers.add(kind, callback)
    }

    pub fn remove_event_listener(&mut self, id: ListenerId) -> bool {
        self.observers.remove(id)
    }

    /// Toggle the item whose link contains `target`. Returns `true` when the
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
            let on = !self.selected.contains(&self.items[index].value);
            self.apply(dom, index, on, None);
        }
        true
    }

    fn item_index(&self, value: &str) -> BehaviorResult<usize> {
        self.items
            .iter()
            .position(|item| item.value == value)
            .ok_or_else(|| BehaviorError::UnknownValue(value.to_string()))
    }

    fn apply<D: Dom>(&mut self, dom: &mut D, index: usize, on: bool, author: Option<&str>) {
        let item = &self.items[index];
        let changed = if on {
            self.selected.insert(item.value.clone())
        } else {
            self.selected.remove(&item.value)
        };
        if !changed {
            return;
        }

        dom.toggle_class(item.root, CLASS_SELECTED, on);
        debug!(value = item.value.as_str(), selected = on, author, "multiple switcher changed");
        self.observers.emit(
            SwitcherEventKind::Change,
            &ValueChangeEvent {
                kind: SwitcherEventKind::Change,
                value: item.value.clone(),
                selected: on,
                author: author.map(str::to_string),
            },
        );
    }
}

impl fmt::Debug for MultipleSwitcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultipleSwitcher")
            .field("items", &self.items)
            .field("selected", &self.selected_values())
            .field("disabled", &self.disabled)
            .finish()
    }
}
