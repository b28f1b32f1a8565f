// SPDX-License-Identifier: MIT OR Apache-2.0
//! Frames: labelled containers grouping nodes.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameId(pub Uuid);

impl FrameId {
    /// Create a new random frame ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for FrameId {
    fn default() -> Self {
        Self::new()
    }
}

/// A frame; membership is stored on the nodes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frame {
    /// Unique frame ID
    pub id: FrameId,
    /// Text shown in the frame header
    pub label: String,
}

impl Frame {
    /// Create a new frame
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            id: FrameId::new(),
            label: label.into(),
        }
    }
}
