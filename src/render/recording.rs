// src/render/recording.rs
// --- Test helper ---
use std::sync::{Arc, Mutex};

use super::{BodyView, Frame, Placeholder, Renderer, Transition};
use crate::engine::TickerItem;
use crate::notify::Notice;

#[derive(Debug, Clone, PartialEq)]
pub enum RenderEvent {
    Paint {
        item: TickerItem,
        position: usize,
        total: usize,
        transition: Transition,
    },
    Placeholder(Placeholder),
    Body(BodyView),
    Notice(Notice),
    Offline(bool),
}

/// Renderer that only records what it was asked to do. Clones of the
/// returned [`RenderLog`] observe the same event list.
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    log: RenderLog,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> RenderLog {
        self.log.clone()
    }
}

#[derive(Debug, Clone, Default)]
pub struct RenderLog {
    events: Arc<Mutex<Vec<RenderEvent>>>,
}

impl RenderLog {
    fn push(&self, ev: RenderEvent) {
        self.events.lock().expect("render log mutex poisoned").push(ev);
    }

    pub fn events(&self) -> Vec<RenderEvent> {
        self.events.lock().expect("render log mutex poisoned").clone()
    }

    pub fn clear(&self) {
        self.events.lock().expect("render log mutex poisoned").clear();
    }

    /// Painted items in order: `(title, position, was_new, transition)`.
    pub fn paints(&self) -> Vec<(String, usize, bool, Transition)> {
        self.events()
            .into_iter()
            .filter_map(|ev| match ev {
                RenderEvent::Paint {
                    item,
                    position,
                    transition,
                    ..
                } => Some((item.title, position, item.is_new, transition)),
                _ => None,
            })
            .collect()
    }

    pub fn painted_titles(&self) -> Vec<String> {
        self.paints().into_iter().map(|(t, ..)| t).collect()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.events()
            .into_iter()
            .filter_map(|ev| match ev {
                RenderEvent::Notice(n) => Some(n),
                _ => None,
            })
            .collect()
    }

    pub fn placeholders(&self) -> Vec<Placeholder> {
        self.events()
            .into_iter()
            .filter_map(|ev| match ev {
                RenderEvent::Placeholder(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    pub fn bodies(&self) -> Vec<BodyView> {
        self.events()
            .into_iter()
            .filter_map(|ev| match ev {
                RenderEvent::Body(b) => Some(b),
                _ => None,
            })
            .collect()
    }

    pub fn offline_flags(&self) -> Vec<bool> {
        self.events()
            .into_iter()
            .filter_map(|ev| match ev {
                RenderEvent::Offline(o) => Some(o),
                _ => None,
            })
            .collect()
    }
}

impl Renderer for RecordingRenderer {
    fn paint(&mut self, frame: &Frame<'_>, transition: Transition) {
        self.log.push(RenderEvent::Paint {
            item: frame.item.clone(),
            position: frame.position,
            total: frame.total,
            transition,
        });
    }

    fn placeholder(&mut self, placeholder: Placeholder) {
        self.log.push(RenderEvent::Placeholder(placeholder));
    }

    fn body(&mut self, view: BodyView) {
        self.log.push(RenderEvent::Body(view));
    }

    fn notify(&mut self, notice: &Notice) {
        self.log.push(RenderEvent::Notice(*notice));
    }

    fn set_offline(&mut self, offline: bool) {
        self.log.push(RenderEvent::Offline(offline));
    }
}
