//! Drag and resize gestures
//!
//! A pointer-down picks a gesture from what it landed on, moves accumulate
//! millimetre deltas, and pointer-up yields exactly one [`LayoutCommit`]
//! rounded to 0.1 mm. Intermediate positions are only a preview.

use crate::geometry::PixelScale;
use crate::keys::FieldKey;
use crate::layout::{round_mm, LayoutConfig, Snap};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Pointer position in rendered pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PointerPos {
    pub x: f64,
    pub y: f64,
}

impl PointerPos {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// What a pointer-down landed on, in hit-test order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    RowHeightHandle,
    WidthHandle(FieldKey),
    Field(FieldKey),
    Nothing,
}

/// Gesture in progress
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum Gesture {
    #[default]
    Idle,
    Dragging {
        key: FieldKey,
        last: PointerPos,
        d_left: f64,
        d_top: f64,
    },
    ResizingWidth {
        key: FieldKey,
        last: PointerPos,
        delta: f64,
    },
    ResizingRowHeight {
        last: PointerPos,
        delta: f64,
    },
}

/// Incremental change reported on each pointer move (mm)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum LiveDelta {
    Move { key: FieldKey, d_left: f64, d_top: f64 },
    Width { key: FieldKey, delta: f64 },
    RowHeight { delta: f64 },
}

/// The single layout change a finished gesture produces
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum LayoutCommit {
    Move { key: FieldKey, d_left: f64, d_top: f64 },
    Resize { key: FieldKey, delta: f64 },
}

impl LayoutCommit {
    pub fn apply(&self, layout: &LayoutConfig) -> LayoutConfig {
        match *self {
            LayoutCommit::Move { key, d_left, d_top } => layout.moved(key, d_left, d_top),
            LayoutCommit::Resize { key, delta } => layout.resized(key, delta),
        }
    }

    pub fn is_zero(&self) -> bool {
        match *self {
            LayoutCommit::Move { d_left, d_top, .. } => d_left == 0.0 && d_top == 0.0,
            LayoutCommit::Resize { delta, .. } => delta == 0.0,
        }
    }
}

/// Gesture state machine for one rendered page
#[derive(Debug, Clone, Default)]
pub struct PositioningEngine {
    drag_mode: bool,
    scale: PixelScale,
    gesture: Gesture,
}

impl PositioningEngine {
    pub fn new(scale: PixelScale) -> Self {
        Self {
            drag_mode: false,
            scale,
            gesture: Gesture::Idle,
        }
    }

    pub fn drag_mode(&self) -> bool {
        self.drag_mode
    }

    /// Toggle drag mode; leaving it drops any gesture uncommitted
    pub fn set_drag_mode(&mut self, on: bool) {
        if !on && self.gesture != Gesture::Idle {
            debug!("gesture cancelled by leaving drag mode");
            self.gesture = Gesture::Idle;
        }
        self.drag_mode = on;
    }

    pub fn set_scale(&mut self, scale: PixelScale) {
        self.scale = scale;
    }

    pub fn scale(&self) -> PixelScale {
        self.scale
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub fn is_idle(&self) -> bool {
        self.gesture == Gesture::Idle
    }

    /// Start a gesture; returns whether one started
    pub fn pointer_down(&mut self, target: PointerTarget, at: PointerPos) -> bool {
        if !self.drag_mode || !self.is_idle() {
            return false;
        }

        self.gesture = match target {
            PointerTarget::RowHeightHandle | PointerTarget::WidthHandle(FieldKey::RowHeight) => {
                Gesture::ResizingRowHeight {
                    last: at,
                    delta: 0.0,
                }
            }
            PointerTarget::WidthHandle(key) => Gesture::ResizingWidth {
                key,
                last: at,
                delta: 0.0,
            },
            PointerTarget::Field(FieldKey::RowHeight) | PointerTarget::Nothing => return false,
            PointerTarget::Field(key) => Gesture::Dragging {
                key,
                last: at,
                d_left: 0.0,
                d_top: 0.0,
            },
        };

        true
    }

    /// Track a move; returns the step since the previous position
    pub fn pointer_move(&mut self, at: PointerPos) -> Option<LiveDelta> {
        let scale = self.scale;

        match &mut self.gesture {
            Gesture::Idle => None,
            Gesture::Dragging {
                key,
                last,
                d_left,
                d_top,
            } => {
                let dl = scale.px_to_mm_x(at.x - last.x);
                let dt = scale.px_to_mm_y(at.y - last.y);
                if dl == 0.0 && dt == 0.0 {
                    return None;
                }
                *d_left += dl;
                *d_top += dt;
                *last = at;
                Some(LiveDelta::Move {
                    key: *key,
                    d_left: dl,
                    d_top: dt,
                })
            }
            Gesture::ResizingWidth { key, last, delta } => {
                let dw = scale.px_to_mm_x(at.x - last.x);
                if dw == 0.0 {
                    return None;
                }
                *delta += dw;
                *last = at;
                Some(LiveDelta::Width {
                    key: *key,
                    delta: dw,
                })
            }
            Gesture::ResizingRowHeight { last, delta } => {
                let dh = scale.px_to_mm_y(at.y - last.y);
                if dh == 0.0 {
                    return None;
                }
                *delta += dh;
                *last = at;
                Some(LiveDelta::RowHeight { delta: dh })
            }
        }
    }

    /// Committed layout with the running, unrounded delta applied
    pub fn preview(&self, committed: &LayoutConfig) -> LayoutConfig {
        match self.gesture {
            Gesture::Idle => committed.clone(),
            Gesture::Dragging {
                key, d_left, d_top, ..
            } => committed.shifted(key, d_left, d_top, Snap::Exact),
            Gesture::ResizingWidth { key, delta, .. } => {
                committed.stretched(key, delta, Snap::Exact)
            }
            Gesture::ResizingRowHeight { delta, .. } => {
                committed.stretched(FieldKey::RowHeight, delta, Snap::Exact)
            }
        }
    }

    /// Finish the gesture
    pub fn pointer_up(&mut self) -> Option<LayoutCommit> {
        let commit = match std::mem::take(&mut self.gesture) {
            Gesture::Idle => return None,
            Gesture::Dragging {
                key, d_left, d_top, ..
            } => LayoutCommit::Move {
                key,
                d_left: round_mm(d_left),
                d_top: round_mm(d_top),
            },
            Gesture::ResizingWidth { key, delta, .. } => LayoutCommit::Resize {
                key,
                delta: round_mm(delta),
            },
            Gesture::ResizingRowHeight { delta, .. } => LayoutCommit::Resize {
                key: FieldKey::RowHeight,
                delta: round_mm(delta),
            },
        };

        debug!(?commit, "gesture committed");
        Some(commit)
    }
}
