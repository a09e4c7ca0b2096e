//! Document-wide popup registry.
//!
//! One Escape handler and one click handler per document fan out to every
//! registered popup. Popups join on [`PopupRegistry::register`] and leave on
//! [`PopupRegistry::dispose`].

use tracing::debug;

use super::{Click, Popup};
use crate::animate::{AnimationId, Host};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PopupId(u64);

#[derive(Debug, Default)]
pub struct PopupRegistry {
    next_id: u64,
    popups: Vec<(PopupId, Popup)>,
}

impl PopupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, popup: Popup) -> PopupId {
        let id = PopupId(self.next_id);
        self.next_id += 1;
        debug!(popup = id.0, root = popup.root().0, "popup registered");
        self.popups.push((id, popup));
        id
    }

    /// Remove a popup; it stops receiving document events.
    pub fn dispose(&mut self, id: PopupId) -> Option<Popup> {
        let index = self.popups.iter().position(|(pid, _)| *pid == id)?;
        debug!(popup = id.0, "popup disposed");
        Some(self.popups.remove(index).1)
    }

    pub fn get(&self, id: PopupId) -> Option<&Popup> {
        self.popups.iter().find(|(pid, _)| *pid == id).map(|(_, p)| p)
    }

    pub fn get_mut(&mut self, id: PopupId) -> Option<&mut Popup> {
        self.popups
            .iter_mut()
            .find(|(pid, _)| *pid == id)
            .map(|(_, p)| p)
    }

    pub fn iter(&self) -> impl Iterator<Item = (PopupId, &Popup)> {
        self.popups.iter().map(|(id, p)| (*id, p))
    }

    pub fn len(&self) -> usize {
        self.popups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.popups.is_empty()
    }

    /// Escape key pressed anywhere in the document.
    pub fn on_escape<H: Host>(&mut self, host: &mut H) {
        for (_, popup) in self.popups.iter_mut() {
            popup.handle_escape(host);
        }
    }

    pub fn on_click<H: Host>(&mut self, host: &mut H, click: Click) {
        for (_, popup) in self.popups.iter_mut() {
            popup.handle_click(host, click);
        }
    }

    /// Route an animation completion to its owner. Returns `true` if a
    /// registered popup owned it.
    pub fn on_animation_done<H: Host>(&mut self, host: &mut H, id: AnimationId) -> bool {
        self.popups
            .iter_mut()
            .any(|(_, popup)| popup.on_animation_done(host, id))
    }
}
