use crate::SandboxConfig;
use brick_core::{
    Brick, BrickColor, BrickId, BrickType, GridRotation, NewBrick, Scene, Tool, BRICK_HEIGHT,
};
use brick_geom::placement::{self, Candidate};
use brick_geom::{
    pick_surface, snap_position, HitTarget, NodeId, Ray, RenderGraph, SurfaceHit, Tolerances,
};
use brick_protocol::{BrickView, GhostView, InputMsg, PointerMsg, SceneFrame};
use glam::Vec3;
use std::f32::consts::{FRAC_PI_2, PI};
use tracing::{debug, info, warn};

/// Ghost rotation per build-mode rotate gesture.
pub const GHOST_ROTATION_STEP: f32 = FRAC_PI_2;

/// Turntable spin per rotate-mode gesture (15 degrees), never wrapped.
pub const TURNTABLE_ROTATION_STEP: f32 = PI / 12.0;

pub const INVALID_GHOST_HEX: &str = "#FF0000";

const VALID_GHOST_OPACITY: f32 = 0.5;
const INVALID_GHOST_OPACITY: f32 = 0.25;

/// What the next placement would be.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GhostSelection {
    pub kind: BrickType,
    pub rotation: GridRotation,
    pub color: BrickColor,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InteractionState {
    pub tool: Tool,
    pub hovered: Option<BrickId>,
    pub cursor: Option<Vec3>,
    pub cursor_valid: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CursorState {
    Idle,
    Hovering { position: Vec3, valid: bool },
}

impl InteractionState {
    pub fn cursor_state(&self) -> CursorState {
        match self.cursor {
            Some(position) => CursorState::Hovering {
                position,
                valid: self.cursor_valid,
            },
            None => CursorState::Idle,
        }
    }

    fn valid_cursor(&self) -> Option<Vec3> {
        self.cursor.filter(|_| self.cursor_valid)
    }

    fn clear_cursor(&mut self) {
        self.cursor = None;
        self.cursor_valid = false;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    Placed(BrickId),
    Deleted(BrickId),
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GhostPreview {
    pub position: Vec3,
    pub kind: BrickType,
    pub rotation: GridRotation,
    pub hex: &'static str,
    pub opacity: f32,
    pub valid: bool,
}

/// Owns the scene and drives placement from pointer and key events.
///
/// Events are handled one at a time to completion; the scene only changes
/// through a committed click (place or delete) and the turntable spin key.
#[derive(Debug, Clone)]
pub struct Controller {
    scene: Scene,
    graph: RenderGraph,
    ghost: GhostSelection,
    state: InteractionState,
    tolerances: Tolerances,
    last_hover: Option<SurfaceHit>,
}

impl Default for Controller {
    fn default() -> Self {
        Self::new(&SandboxConfig::default())
    }
}

impl Controller {
    pub fn new(config: &SandboxConfig) -> Self {
        Self::with_scene(config, Scene::default())
    }

    pub fn with_scene(config: &SandboxConfig, scene: Scene) -> Self {
        let graph = RenderGraph::from_scene(&scene);
        Self {
            scene,
            graph,
            ghost: GhostSelection {
                kind: config.brick,
                rotation: GridRotation::Deg0,
                color: config.color,
            },
            state: InteractionState {
                tool: config.tool,
                ..InteractionState::default()
            },
            tolerances: config.tolerances,
            last_hover: None,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn graph(&self) -> &RenderGraph {
        &self.graph
    }

    pub fn ghost(&self) -> &GhostSelection {
        &self.ghost
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn set_tool(&mut self, tool: Tool) {
        if self.state.tool == tool {
            return;
        }
        debug!(?tool, "tool changed");
        self.state.tool = tool;
        self.refresh_hover();
    }

    pub fn set_color(&mut self, color: BrickColor) {
        self.ghost.color = color;
    }

    pub fn set_brick_type(&mut self, kind: BrickType) {
        if self.ghost.kind == kind {
            return;
        }
        debug!(%kind, "brick type changed");
        self.ghost.kind = kind;
        self.refresh_hover();
    }

    pub fn pointer_move(&mut self, hit: &SurfaceHit) {
        self.last_hover = Some(*hit);
        match hit.target {
            HitTarget::Ground => {
                self.state.hovered = None;
                if self.state.tool != Tool::Build {
                    self.state.clear_cursor();
                    return;
                }
                let snapped =
                    snap_position(hit.point, 0.0, None, self.ghost.kind, self.ghost.rotation);
                self.move_cursor(snapped, None);
            }
            HitTarget::Brick(node) => {
                let parent = self.owner(node).cloned();
                self.state.hovered = parent.as_ref().map(|brick| brick.id);
                if self.state.tool != Tool::Build {
                    self.state.clear_cursor();
                    return;
                }
                let (Some(parent), Some(normal)) = (parent, hit.normal) else {
                    self.state.clear_cursor();
                    return;
                };
                if normal.y.is_nan() || normal.y < self.tolerances.top_face_min_normal_y {
                    self.state.clear_cursor();
                    return;
                }
                let support_y = parent.position[1] + BRICK_HEIGHT / 2.0;
                let snapped = snap_position(
                    hit.point,
                    support_y,
                    Some(&parent),
                    self.ghost.kind,
                    self.ghost.rotation,
                );
                self.move_cursor(snapped, Some(&parent));
            }
        }
    }

    pub fn pointer_leave(&mut self) {
        self.last_hover = None;
        self.state.hovered = None;
        self.state.clear_cursor();
    }

    pub fn click(&mut self, hit: &SurfaceHit) -> ClickOutcome {
        let outcome = match hit.target {
            HitTarget::Ground => match self.state.valid_cursor() {
                Some(position) if self.state.tool == Tool::Build => {
                    ClickOutcome::Placed(self.commit(position, self.ghost.rotation, None))
                }
                _ => ClickOutcome::Ignored,
            },
            HitTarget::Brick(node) => {
                let parent = self.owner(node).cloned();
                match (self.state.tool, self.state.valid_cursor()) {
                    (Tool::Build, Some(position)) => {
                        let (rotation, internal) = match &parent {
                            Some(parent) if parent.kind.spins_freely() => {
                                (GridRotation::Deg0, parent.internal_rotation)
                            }
                            _ => (self.ghost.rotation, None),
                        };
                        ClickOutcome::Placed(self.commit(position, rotation, internal))
                    }
                    (Tool::Delete, _) => {
                        self.state.clear_cursor();
                        match parent {
                            Some(parent) => ClickOutcome::Deleted(self.delete(parent.id)),
                            None => ClickOutcome::Ignored,
                        }
                    }
                    _ => ClickOutcome::Ignored,
                }
            }
        };
        if let ClickOutcome::Placed(_) = outcome {
            self.state.clear_cursor();
        }
        outcome
    }

    /// Handles the rotate key (`r`, either case). Returns whether it did anything.
    pub fn key(&mut self, key: char) -> bool {
        if !key.eq_ignore_ascii_case(&'r') {
            return false;
        }
        match self.state.tool {
            Tool::Build => {
                self.ghost.rotation = self.ghost.rotation.next();
                debug!(rotation = ?self.ghost.rotation, "ghost rotated");
                self.refresh_hover();
                true
            }
            Tool::Rotate => {
                let Some(brick) = self
                    .state
                    .hovered
                    .and_then(|id| self.scene.brick(id))
                    .filter(|brick| brick.kind.spins_freely())
                else {
                    return false;
                };
                let id = brick.id;
                let angle = brick.internal_rotation.unwrap_or(0.0) + TURNTABLE_ROTATION_STEP;
                debug!(id, angle, "turntable spun");
                self.scene.set_internal_rotation(id, angle)
            }
            Tool::Delete => false,
        }
    }

    pub fn ghost_preview(&self) -> Option<GhostPreview> {
        if self.state.tool != Tool::Build {
            return None;
        }
        let position = self.state.cursor?;
        let valid = self.state.cursor_valid;
        Some(GhostPreview {
            position,
            kind: self.ghost.kind,
            rotation: self.ghost.rotation,
            hex: if valid {
                self.ghost.color.hex()
            } else {
                INVALID_GHOST_HEX
            },
            opacity: if valid {
                VALID_GHOST_OPACITY
            } else {
                INVALID_GHOST_OPACITY
            },
            valid,
        })
    }

    pub fn frame(&self) -> SceneFrame {
        let bricks = self
            .scene
            .bricks()
            .iter()
            .map(|brick| BrickView {
                brick: brick.clone(),
                node: self.graph.group_of(brick.id).map_or(u32::MAX, |node| node.0),
                hex: brick.color.hex().to_string(),
            })
            .collect();
        let ghost = self.ghost_preview().map(|ghost| GhostView {
            position: ghost.position.to_array(),
            kind: ghost.kind,
            rotation: ghost.rotation,
            hex: ghost.hex.to_string(),
            opacity: ghost.opacity,
            valid: ghost.valid,
            pickable: false,
        });
        SceneFrame {
            tool: self.state.tool,
            hovered: self.state.hovered,
            bricks,
            ghost,
        }
    }

    /// Dispatches one protocol event. Returns the outcome for clicks.
    pub fn apply(&mut self, msg: &InputMsg) -> Option<ClickOutcome> {
        match msg {
            InputMsg::SetTool { tool } => self.set_tool(*tool),
            InputMsg::SetColor { color } => self.set_color(*color),
            InputMsg::SetBrickType { brick } => self.set_brick_type(*brick),
            InputMsg::PointerMove { pointer } => match self.resolve_pointer(pointer) {
                Some(hit) => self.pointer_move(&hit),
                None => self.pointer_leave(),
            },
            InputMsg::PointerLeave => self.pointer_leave(),
            InputMsg::Click { pointer } => {
                let outcome = match self.resolve_pointer(pointer) {
                    Some(hit) => self.click(&hit),
                    None => ClickOutcome::Ignored,
                };
                return Some(outcome);
            }
            InputMsg::Key { key } => {
                self.key(*key);
            }
        }
        None
    }

    fn resolve_pointer(&self, pointer: &PointerMsg) -> Option<SurfaceHit> {
        match pointer {
            PointerMsg::Ray { origin, dir } => pick_surface(
                &self.scene,
                &self.graph,
                Ray {
                    origin: Vec3::from_array(*origin),
                    dir: Vec3::from_array(*dir),
                },
            ),
            PointerMsg::Hit {
                point,
                normal,
                node: Some(node),
            } => {
                if self.graph.node(NodeId(*node)).is_none() {
                    warn!(node, "hit references an unknown render node");
                }
                Some(SurfaceHit::brick(
                    Vec3::from_array(*point),
                    normal.map(Vec3::from_array),
                    NodeId(*node),
                ))
            }
            PointerMsg::Hit { point, .. } => Some(SurfaceHit::ground(Vec3::from_array(*point))),
        }
    }

    fn owner(&self, node: NodeId) -> Option<&Brick> {
        let brick = self
            .graph
            .owner_of(node)
            .and_then(|id| self.scene.brick(id));
        if brick.is_none() {
            debug!(?node, "no owning brick for render node");
        }
        brick
    }

    fn move_cursor(&mut self, snapped: Option<Vec3>, parent: Option<&Brick>) {
        let Some(position) = snapped else {
            self.state.clear_cursor();
            return;
        };
        if self.state.cursor == Some(position) {
            return;
        }
        let candidate = Candidate {
            position,
            kind: self.ghost.kind,
            rotation: self.ghost.rotation,
        };
        let verdict =
            placement::evaluate(&candidate, parent, self.scene.bricks(), &self.tolerances);
        debug!(?position, ?verdict, "cursor moved");
        self.state.cursor = Some(position);
        self.state.cursor_valid = verdict.is_valid();
    }

    /// Re-snaps the cursor after the ghost selection or tool changes.
    fn refresh_hover(&mut self) {
        self.state.clear_cursor();
        if let Some(hit) = self.last_hover {
            self.pointer_move(&hit);
        }
    }

    fn commit(
        &mut self,
        position: Vec3,
        rotation: GridRotation,
        internal_rotation: Option<f32>,
    ) -> BrickId {
        let id = self.scene.add_brick(NewBrick {
            position: position.to_array(),
            color: self.ghost.color,
            kind: self.ghost.kind,
            rotation,
            internal_rotation,
        });
        info!(id, kind = %self.ghost.kind, ?position, ?rotation, "brick placed");
        self.scene_changed();
        id
    }

    fn delete(&mut self, id: BrickId) -> BrickId {
        if self.scene.remove_brick(id).is_some() {
            info!(id, "brick deleted");
            if self.state.hovered == Some(id) {
                self.state.hovered = None;
            }
            self.scene_changed();
        }
        id
    }

    fn scene_changed(&mut self) {
        self.graph = RenderGraph::from_scene(&self.scene);
        // Node ids in a remembered hit refer to the old graph.
        self.last_hover = None;
    }
}
