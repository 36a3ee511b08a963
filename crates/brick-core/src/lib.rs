//! Core model types: bricks, the palette, tools, and the scene that owns placed bricks.

use serde::{Deserialize, Serialize};
use std::f32::consts::{FRAC_PI_2, TAU};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub type BrickId = u64;

/// Height of every brick type, in grid units.
pub const BRICK_HEIGHT: f32 = 1.2;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("unknown brick type: {0}")]
    UnknownBrickType(String),
    #[error("unknown color: {0}")]
    UnknownColor(String),
    #[error("unknown tool: {0}")]
    UnknownTool(String),
}

/// How a brick type takes part in placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementPolicy {
    /// Grid-snapped and checked for overlap and support.
    Grid,
    /// Spins freely on top; bricks attached to it skip validation and
    /// centre on it instead of snapping to grid cells.
    FreeSpin,
}

/// Shape of a brick. On the wire it is the tag string (`"1x1"`, `"2x4"`, ...);
/// unknown tags deserialize as [`BrickType::Unit1x1`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BrickType {
    #[default]
    Unit1x1,
    Unit1x2,
    Unit2x4,
    Turntable2x2,
}

impl BrickType {
    pub const ALL: [BrickType; 4] = [
        BrickType::Unit1x1,
        BrickType::Unit1x2,
        BrickType::Unit2x4,
        BrickType::Turntable2x2,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            BrickType::Unit1x1 => "1x1",
            BrickType::Unit1x2 => "1x2",
            BrickType::Unit2x4 => "2x4",
            BrickType::Turntable2x2 => "turntable_2x2",
        }
    }

    /// Nominal `(width, length)` in grid units before any grid rotation.
    pub fn footprint(self) -> (f32, f32) {
        match self {
            BrickType::Unit1x1 => (1.0, 1.0),
            BrickType::Unit1x2 => (1.0, 2.0),
            BrickType::Unit2x4 => (2.0, 4.0),
            BrickType::Turntable2x2 => (2.0, 2.0),
        }
    }

    pub fn placement_policy(self) -> PlacementPolicy {
        match self {
            BrickType::Turntable2x2 => PlacementPolicy::FreeSpin,
            _ => PlacementPolicy::Grid,
        }
    }

    pub fn spins_freely(self) -> bool {
        self.placement_policy() == PlacementPolicy::FreeSpin
    }

    /// Resolves a tag from an event or a render object. Unknown tags degrade
    /// to the 1x1 shape instead of failing.
    pub fn from_tag_lossy(tag: &str) -> Self {
        tag.parse().unwrap_or_default()
    }
}

impl From<String> for BrickType {
    fn from(tag: String) -> Self {
        BrickType::from_tag_lossy(&tag)
    }
}

impl From<BrickType> for String {
    fn from(kind: BrickType) -> Self {
        kind.tag().to_string()
    }
}

impl fmt::Display for BrickType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for BrickType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BrickType::ALL
            .into_iter()
            .find(|kind| kind.tag() == s)
            .ok_or_else(|| CoreError::UnknownBrickType(s.to_string()))
    }
}

/// Orientation of a brick on the grid, in quarter turns about +Y.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "f32", into = "f32")]
pub enum GridRotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl GridRotation {
    pub fn quarter_turns(self) -> u8 {
        match self {
            GridRotation::Deg0 => 0,
            GridRotation::Deg90 => 1,
            GridRotation::Deg180 => 2,
            GridRotation::Deg270 => 3,
        }
    }

    pub fn from_quarter_turns(turns: i64) -> Self {
        match turns.rem_euclid(4) {
            0 => GridRotation::Deg0,
            1 => GridRotation::Deg90,
            2 => GridRotation::Deg180,
            _ => GridRotation::Deg270,
        }
    }

    /// Nearest quarter turn to an arbitrary angle.
    pub fn from_radians(radians: f32) -> Self {
        if !radians.is_finite() {
            return GridRotation::Deg0;
        }
        let turns = (radians.rem_euclid(TAU) / FRAC_PI_2).round() as i64;
        Self::from_quarter_turns(turns)
    }

    pub fn radians(self) -> f32 {
        f32::from(self.quarter_turns()) * FRAC_PI_2
    }

    /// Advances by 90 degrees, wrapping after 270.
    pub fn next(self) -> Self {
        Self::from_quarter_turns(i64::from(self.quarter_turns()) + 1)
    }
}

impl From<f32> for GridRotation {
    fn from(radians: f32) -> Self {
        GridRotation::from_radians(radians)
    }
}

impl From<GridRotation> for f32 {
    fn from(rotation: GridRotation) -> Self {
        rotation.radians()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BrickColor {
    #[default]
    Red,
    Blue,
    Yellow,
    Green,
    White,
    Black,
    LightGray,
    DarkGray,
}

impl BrickColor {
    pub const PALETTE: [BrickColor; 8] = [
        BrickColor::Red,
        BrickColor::Blue,
        BrickColor::Yellow,
        BrickColor::Green,
        BrickColor::White,
        BrickColor::Black,
        BrickColor::LightGray,
        BrickColor::DarkGray,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BrickColor::Red => "red",
            BrickColor::Blue => "blue",
            BrickColor::Yellow => "yellow",
            BrickColor::Green => "green",
            BrickColor::White => "white",
            BrickColor::Black => "black",
            BrickColor::LightGray => "lightGray",
            BrickColor::DarkGray => "darkGray",
        }
    }

    pub fn hex(self) -> &'static str {
        match self {
            BrickColor::Red => "#D90013",
            BrickColor::Blue => "#0057A8",
            BrickColor::Yellow => "#FDC400",
            BrickColor::Green => "#20852A",
            BrickColor::White => "#FFFFFF",
            BrickColor::Black => "#1B2A34",
            BrickColor::LightGray => "#A0A5A9",
            BrickColor::DarkGray => "#6C6E68",
        }
    }

    pub fn from_hex(hex: &str) -> Option<Self> {
        BrickColor::PALETTE
            .into_iter()
            .find(|color| color.hex().eq_ignore_ascii_case(hex))
    }
}

impl fmt::Display for BrickColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BrickColor {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BrickColor::PALETTE
            .into_iter()
            .find(|color| color.name().eq_ignore_ascii_case(s))
            .or_else(|| BrickColor::from_hex(s))
            .ok_or_else(|| CoreError::UnknownColor(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    #[default]
    Build,
    Delete,
    Rotate,
}

impl FromStr for Tool {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "build" => Ok(Tool::Build),
            "delete" => Ok(Tool::Delete),
            "rotate" => Ok(Tool::Rotate),
            _ => Err(CoreError::UnknownTool(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brick {
    pub id: BrickId,
    /// Centre of the brick in grid units.
    pub position: [f32; 3],
    pub color: BrickColor,
    #[serde(rename = "type")]
    pub kind: BrickType,
    pub rotation: GridRotation,
    /// Free spin of the top plate. Only meaningful on free-spin bricks;
    /// bricks attached to one inherit its value at placement time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_rotation: Option<f32>,
}

/// A brick that has passed placement and is about to enter the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBrick {
    pub position: [f32; 3],
    pub color: BrickColor,
    pub kind: BrickType,
    pub rotation: GridRotation,
    pub internal_rotation: Option<f32>,
}

/// The placed bricks, in insertion order.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Scene {
    bricks: Vec<Brick>,
    next_id: BrickId,
}

impl Scene {
    pub fn bricks(&self) -> &[Brick] {
        &self.bricks
    }

    pub fn brick(&self, id: BrickId) -> Option<&Brick> {
        self.bricks.iter().find(|brick| brick.id == id)
    }

    pub fn contains(&self, id: BrickId) -> bool {
        self.brick(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.bricks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bricks.is_empty()
    }

    pub fn add_brick(&mut self, brick: NewBrick) -> BrickId {
        let id = self.next_id;
        self.next_id = self.next_id.saturating_add(1);
        self.bricks.push(Brick {
            id,
            position: brick.position,
            color: brick.color,
            kind: brick.kind,
            rotation: brick.rotation,
            internal_rotation: brick.internal_rotation,
        });
        id
    }

    /// Removes a brick. Unknown ids leave the scene untouched.
    pub fn remove_brick(&mut self, id: BrickId) -> Option<Brick> {
        let idx = self.bricks.iter().position(|brick| brick.id == id)?;
        Some(self.bricks.remove(idx))
    }

    pub fn set_internal_rotation(&mut self, id: BrickId, radians: f32) -> bool {
        match self.bricks.iter_mut().find(|brick| brick.id == id) {
            Some(brick) => {
                brick.internal_rotation = Some(radians);
                true
            }
            None => false,
        }
    }
}
