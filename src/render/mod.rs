// src/render/mod.rs
//! The renderer seam. The engine calls into a `Renderer`; a renderer never
//! calls back into the engine.

pub mod console;
pub mod recording;

pub use console::ConsoleRenderer;
pub use recording::{RecordingRenderer, RenderEvent, RenderLog};

use crate::engine::TickerItem;
use crate::feed::Failure;
use crate::notify::{failure_message, Notice};

/// How the new frame replaces the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Immediate swap (manual navigation).
    Cut,
    /// Fade out / fade in (auto-advance, first display, resume).
    Fade,
}

/// Shown in place of an item when there is nothing to rotate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    Loading,
    NoNews,
    Error(Failure),
}

impl Placeholder {
    pub fn message(&self) -> &'static str {
        match self {
            Placeholder::Loading => "Loading news...",
            Placeholder::NoNews => "No news to show",
            Placeholder::Error(f) => failure_message(*f),
        }
    }
}

/// State of the expanded article body area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyView {
    Hidden,
    Loading,
    Text(String),
    Unavailable,
}

/// One item ready to paint. `item.is_new` still holds the value it had
/// before this display cleared it.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub item: &'a TickerItem,
    /// Zero-based queue index.
    pub position: usize,
    pub total: usize,
}

impl Frame<'_> {
    /// "3 / 12"
    pub fn counter(&self) -> String {
        format!("{} / {}", self.position + 1, self.total)
    }
}

pub trait Renderer {
    fn paint(&mut self, frame: &Frame<'_>, transition: Transition);
    fn placeholder(&mut self, placeholder: Placeholder);
    fn body(&mut self, view: BodyView);
    fn notify(&mut self, notice: &Notice);
    fn set_offline(&mut self, offline: bool);
}
