//! Grid geometry for bricks: extents, bounding boxes, placement checks and snapping.

use brick_core::{BrickType, GridRotation, BRICK_HEIGHT};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::f32::consts::{FRAC_PI_2, PI};

pub mod hierarchy;
pub mod pick;
pub mod placement;
pub mod snap;

pub use hierarchy::{NodeId, NodeRole, RenderGraph};
pub use pick::{pick_surface, HitTarget, Ray, SurfaceHit};
pub use placement::{Candidate, Verdict};
pub use snap::snap_position;

/// Inward shrink applied to a candidate box before overlap tests, so that
/// coincident faces do not count as overlapping.
pub const COLLISION_INSET: f32 = 0.01;

/// Vertical band within which a candidate's bottom counts as resting on
/// another brick's top face.
pub const SUPPORT_CONTACT: f32 = 0.02;

/// Minimum upward normal component for a face to accept new bricks.
pub const TOP_FACE_MIN_NORMAL_Y: f32 = 0.9;

/// How close `angle mod PI` must be to `PI / 2` for width and length to swap.
pub const ROTATION_EPSILON: f32 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tolerances {
    pub collision_inset: f32,
    pub support_contact: f32,
    pub top_face_min_normal_y: f32,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            collision_inset: COLLISION_INSET,
            support_contact: SUPPORT_CONTACT,
            top_face_min_normal_y: TOP_FACE_MIN_NORMAL_Y,
        }
    }
}

/// World-aligned `(width, height, length)` of a brick type at a grid rotation.
pub fn dimensions(kind: BrickType, rotation: GridRotation) -> Vec3 {
    dimensions_at_angle(kind, rotation.radians())
}

/// Same as [`dimensions`] for a raw angle: width and length swap when the
/// angle sits on an odd quarter turn.
pub fn dimensions_at_angle(kind: BrickType, radians: f32) -> Vec3 {
    let (w, l) = kind.footprint();
    if (radians.rem_euclid(PI) - FRAC_PI_2).abs() < ROTATION_EPSILON {
        Vec3::new(l, BRICK_HEIGHT, w)
    } else {
        Vec3::new(w, BRICK_HEIGHT, l)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn of_brick(position: Vec3, kind: BrickType, rotation: GridRotation) -> Self {
        let half = dimensions(kind, rotation) * 0.5;
        Self {
            min: position - half,
            max: position + half,
        }
    }

    /// Shrinks every face inward by `eps`.
    pub fn inset(self, eps: f32) -> Self {
        Self {
            min: self.min + Vec3::splat(eps),
            max: self.max - Vec3::splat(eps),
        }
    }

    pub fn overlaps_xz(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }

    /// Strict interval overlap on all three axes. Touching faces do not overlap.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.overlaps_xz(other) && self.min.y < other.max.y && self.max.y > other.min.y
    }

    /// Ray/box slab test. Returns the entry distance and the normal of the
    /// entered face; rays starting inside the box report nothing.
    pub fn ray_intersect(&self, origin: Vec3, dir: Vec3) -> Option<(f32, Vec3)> {
        let mut t_near = f32::NEG_INFINITY;
        let mut t_far = f32::INFINITY;
        let mut normal = Vec3::ZERO;

        for axis in 0..3 {
            let (o, d) = (origin[axis], dir[axis]);
            let (lo, hi) = (self.min[axis], self.max[axis]);
            if d.abs() < 1.0e-8 {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / d;
            let (mut t0, mut t1) = ((lo - o) * inv, (hi - o) * inv);
            let mut sign = -1.0;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
                sign = 1.0;
            }
            if t0 > t_near {
                t_near = t0;
                normal = Vec3::ZERO;
                normal[axis] = sign;
            }
            t_far = t_far.min(t1);
            if t_near > t_far {
                return None;
            }
        }

        if t_near > 1.0e-6 {
            Some((t_near, normal))
        } else {
            None
        }
    }
}
