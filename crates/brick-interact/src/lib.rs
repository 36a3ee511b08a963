//! Pointer/keyboard interaction over the brick scene.

use brick_core::{BrickColor, BrickType, Tool};
use brick_geom::Tolerances;
use serde::{Deserialize, Serialize};

mod controller;

pub use controller::{
    ClickOutcome, Controller, CursorState, GhostPreview, GhostSelection, InteractionState,
    GHOST_ROTATION_STEP, INVALID_GHOST_HEX, TURNTABLE_ROTATION_STEP,
};

/// Starting state of a sandbox session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    pub tolerances: Tolerances,
    pub tool: Tool,
    pub color: BrickColor,
    pub brick: BrickType,
}
