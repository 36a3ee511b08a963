//! Render-side object hierarchy and ownership resolution.
//!
//! Every brick is drawn as a tagged group node with untagged mesh children.
//! A picked mesh is mapped back to its brick by walking parent links until a
//! tagged node turns up.

use brick_core::{BrickId, Scene};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRole {
    /// Tagged root of a brick.
    Group,
    /// Body, or the static base of a turntable.
    Body,
    /// Turntable sub-group that carries the free spin.
    SpinGroup,
    TopPlate,
}

#[derive(Debug, Clone)]
pub struct RenderNode {
    pub parent: Option<NodeId>,
    pub tag: Option<BrickId>,
    pub role: NodeRole,
}

/// Meshes recorded for one brick when the graph is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BrickNodes {
    group: NodeId,
    body: NodeId,
    top_plate: Option<NodeId>,
}

#[derive(Debug, Default, Clone)]
pub struct RenderGraph {
    nodes: Vec<RenderNode>,
    bricks: HashMap<BrickId, BrickNodes>,
}

impl RenderGraph {
    pub fn from_scene(scene: &Scene) -> Self {
        let mut graph = Self::default();
        for brick in scene.bricks() {
            let group = graph.insert(None, Some(brick.id), NodeRole::Group);
            let body = graph.insert(Some(group), None, NodeRole::Body);
            let top_plate = brick.kind.spins_freely().then(|| {
                let spin = graph.insert(Some(group), None, NodeRole::SpinGroup);
                graph.insert(Some(spin), None, NodeRole::TopPlate)
            });
            graph.bricks.insert(
                brick.id,
                BrickNodes {
                    group,
                    body,
                    top_plate,
                },
            );
        }
        graph
    }

    pub fn insert(
        &mut self,
        parent: Option<NodeId>,
        tag: Option<BrickId>,
        role: NodeRole,
    ) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(RenderNode { parent, tag, role });
        id
    }

    pub fn node(&self, id: NodeId) -> Option<&RenderNode> {
        self.nodes.get(id.0 as usize)
    }

    pub fn group_of(&self, brick: BrickId) -> Option<NodeId> {
        self.bricks.get(&brick).map(|nodes| nodes.group)
    }

    /// Mesh a pick on `brick` lands on: the top plate of a turntable when the
    /// hit is on its top face, otherwise the body.
    pub fn pick_leaf(&self, brick: BrickId, top_face: bool) -> Option<NodeId> {
        let nodes = self.bricks.get(&brick)?;
        match nodes.top_plate {
            Some(plate) if top_face => Some(plate),
            _ => Some(nodes.body),
        }
    }

    /// Walks upward from `node` to the first tagged ancestor (inclusive).
    pub fn owner_of(&self, node: NodeId) -> Option<BrickId> {
        let mut cursor = Some(node);
        for _ in 0..self.nodes.len() {
            let current = self.node(cursor?)?;
            if current.tag.is_some() {
                return current.tag;
            }
            cursor = current.parent;
        }
        None
    }
}
