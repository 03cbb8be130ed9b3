// src/article.rs
use std::collections::HashMap;

/// Session-lifetime memo of article bodies keyed by URL.
///
/// An empty string means "fetched, nothing to show" and stops the same URL
/// from being requested again. No eviction.
#[derive(Debug, Default)]
pub struct ArticleBodyCache {
    bodies: HashMap<String, String>,
}

impl ArticleBodyCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, url: &str) -> Option<&str> {
        self.bodies.get(url).map(String::as_str)
    }

    pub fn put(&mut self, url: impl Into<String>, body: impl Into<String>) {
        self.bodies.insert(url.into(), body.into());
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}
