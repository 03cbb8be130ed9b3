// src/render/console.rs
use std::io::Write;

use super::{BodyView, Frame, Placeholder, Renderer, Transition};
use crate::notify::Notice;

/// Line-oriented renderer for a terminal. Write errors are ignored; a closed
/// stdout must not stop the ticker.
pub struct ConsoleRenderer {
    out: Box<dyn Write + Send>,
    link: Option<String>,
    link_shown: bool,
    offline: bool,
}

impl Default for ConsoleRenderer {
    fn default() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }
}

impl ConsoleRenderer {
    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self {
            out,
            link: None,
            link_shown: false,
            offline: false,
        }
    }

    fn line(&mut self, s: &str) {
        let _ = writeln!(self.out, "{s}");
        let _ = self.out.flush();
    }
}

impl Renderer for ConsoleRenderer {
    fn paint(&mut self, frame: &Frame<'_>, transition: Transition) {
        let item = frame.item;
        self.link = item.link.clone();
        self.link_shown = false;

        let title = if item.title.is_empty() {
            "(untitled)"
        } else {
            item.title.as_str()
        };
        let marker = if item.is_new { " *NEW*" } else { "" };
        let sep = match transition {
            Transition::Fade => "",
            Transition::Cut => "> ",
        };
        let offline = if self.offline { " [offline]" } else { "" };
        let line = format!(
            "{sep}[{}]{offline} {}{marker}  {title}",
            frame.counter(),
            item.time
        );
        self.line(&line);
    }

    fn placeholder(&mut self, placeholder: Placeholder) {
        self.link = None;
        self.link_shown = false;
        self.line(&format!("-- {} --", placeholder.message()));
    }

    fn body(&mut self, view: BodyView) {
        if view == BodyView::Hidden {
            self.link_shown = false;
            return;
        }
        if !self.link_shown {
            self.link_shown = true;
            if let Some(link) = self.link.clone() {
                self.line(&format!("    source: {link}"));
            }
        }
        match view {
            BodyView::Hidden => {}
            BodyView::Loading => self.line("    (loading article...)"),
            BodyView::Unavailable => self.line("    (no body available)"),
            BodyView::Text(text) => {
                let indented = text
                    .lines()
                    .map(|l| format!("    {l}"))
                    .collect::<Vec<_>>()
                    .join("\n");
                self.line(&indented);
            }
        }
    }

    fn notify(&mut self, notice: &Notice) {
        let bang = if notice.is_error() { "!" } else { "»" };
        self.line(&format!("{bang} {}", notice.message()));
    }

    fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }
}
