//! Ray picking against placed bricks and the ground plane.

use crate::{Aabb, NodeId, RenderGraph};
use brick_core::Scene;
use glam::Vec3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    Ground,
    /// The render node that was struck; resolve its owner through the graph.
    Brick(NodeId),
}

/// What a pointer event reports about the surface under the cursor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    pub point: Vec3,
    pub normal: Option<Vec3>,
    pub target: HitTarget,
    pub distance: f32,
}

impl SurfaceHit {
    pub fn ground(point: Vec3) -> Self {
        Self {
            point,
            normal: Some(Vec3::Y),
            target: HitTarget::Ground,
            distance: 0.0,
        }
    }

    pub fn brick(point: Vec3, normal: Option<Vec3>, node: NodeId) -> Self {
        Self {
            point,
            normal,
            target: HitTarget::Brick(node),
            distance: 0.0,
        }
    }
}

/// Nearest surface along `ray`: a placed brick or the ground plane `y = 0`.
pub fn pick_surface(scene: &Scene, graph: &RenderGraph, ray: Ray) -> Option<SurfaceHit> {
    let dir = ray.dir.normalize_or_zero();
    if dir.length_squared() < 1.0e-12 || !ray.origin.is_finite() {
        return None;
    }

    let mut best: Option<SurfaceHit> = None;
    let mut best_t = f32::INFINITY;

    if dir.y.abs() > 1.0e-8 {
        let t = -ray.origin.y / dir.y;
        if t > 1.0e-6 {
            best_t = t;
            best = Some(SurfaceHit {
                distance: t,
                ..SurfaceHit::ground(ray.origin + dir * t)
            });
        }
    }

    for brick in scene.bricks() {
        let aabb = Aabb::of_brick(Vec3::from_array(brick.position), brick.kind, brick.rotation);
        let Some((t, normal)) = aabb.ray_intersect(ray.origin, dir) else {
            continue;
        };
        if t >= best_t {
            continue;
        }
        let Some(node) = graph.pick_leaf(brick.id, normal.y > 0.5) else {
            continue;
        };
        best_t = t;
        best = Some(SurfaceHit {
            point: ray.origin + dir * t,
            normal: Some(normal),
            target: HitTarget::Brick(node),
            distance: t,
        });
    }

    best
}
