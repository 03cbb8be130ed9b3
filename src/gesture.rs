// src/gesture.rs
//! Pointer interaction → navigation.
//!
//! Three bands by horizontal travel `dx = end_x - start_x`:
//! - `|dx| <= tap_slop`: a tap; left half → prev, right half → next
//! - `tap_slop < |dx| <= swipe_threshold`: ignored
//! - `|dx| > swipe_threshold`: swipe; leftward → next, rightward → prev

use crate::engine::Direction;

/// One completed pointer interaction over the ticker surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerGesture {
    pub start_x: f32,
    pub end_x: f32,
    /// Width of the ticker surface in device-independent pixels.
    pub width: f32,
}

impl PointerGesture {
    pub fn tap(x: f32, width: f32) -> Self {
        Self {
            start_x: x,
            end_x: x,
            width,
        }
    }

    pub fn drag(start_x: f32, end_x: f32, width: f32) -> Self {
        Self {
            start_x,
            end_x,
            width,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureThresholds {
    pub tap_slop: f32,
    pub swipe: f32,
}

impl Default for GestureThresholds {
    fn default() -> Self {
        Self {
            tap_slop: 10.0,
            swipe: 40.0,
        }
    }
}

pub fn classify(g: PointerGesture, t: GestureThresholds) -> Option<Direction> {
    let dx = g.end_x - g.start_x;
    if dx.abs() > t.swipe {
        return Some(if dx < 0.0 {
            Direction::Next
        } else {
            Direction::Prev
        });
    }
    if dx.abs() > t.tap_slop {
        return None;
    }
    if g.width <= 0.0 {
        return None;
    }
    Some(if g.end_x < g.width / 2.0 {
        Direction::Prev
    } else {
        Direction::Next
    })
}
