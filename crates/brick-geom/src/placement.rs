//! Placement validation: a candidate must not interpenetrate any placed brick
//! and must rest on the ground or on top of another brick.

use crate::{Aabb, Tolerances};
use brick_core::{Brick, BrickId, BrickType, GridRotation, PlacementPolicy};
use glam::Vec3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub position: Vec3,
    pub kind: BrickType,
    pub rotation: GridRotation,
}

impl Candidate {
    pub fn aabb(&self) -> Aabb {
        Aabb::of_brick(self.position, self.kind, self.rotation)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Bottom face sits on the ground plane.
    Grounded,
    /// Bottom face sits on the top face of this brick.
    RestsOn(BrickId),
    /// Attached to a free-spin parent; not checked against the grid.
    Attached(BrickId),
    Collides(BrickId),
    Unsupported,
}

impl Verdict {
    pub fn is_valid(self) -> bool {
        matches!(
            self,
            Verdict::Grounded | Verdict::RestsOn(_) | Verdict::Attached(_)
        )
    }
}

/// Checks a candidate against the placed bricks.
///
/// A free-spin `parent` short-circuits to [`Verdict::Attached`]. Otherwise
/// the candidate box is shrunk by `collision_inset` and compared with the
/// full boxes of the placed bricks in one pass: the first interpenetration
/// rejects, and support is latched by the ground or by any brick whose top
/// face is within `support_contact` of the candidate's bottom.
pub fn evaluate(
    candidate: &Candidate,
    parent: Option<&Brick>,
    bricks: &[Brick],
    tolerances: &Tolerances,
) -> Verdict {
    if let Some(parent) = parent {
        if parent.kind.placement_policy() == PlacementPolicy::FreeSpin {
            return Verdict::Attached(parent.id);
        }
    }

    let full = candidate.aabb();
    let shrunk = full.inset(tolerances.collision_inset);

    let mut support = if full.min.y.abs() < tolerances.collision_inset {
        Some(Verdict::Grounded)
    } else {
        None
    };

    for existing in bricks {
        let other = Aabb::of_brick(
            Vec3::from_array(existing.position),
            existing.kind,
            existing.rotation
        );
        if shrunk.overlaps(&other) {
            return Verdict::Collides(existing.id);
        }
        if support.is_none()
            && (shrunk.min.y - other.max.y).abs() < tolerances.support_contact
            && shrunk.overlaps_xz(&other)
        {
            support = Some(Verdict::RestsOn(existing.id));
        }
    }

    support.unwrap_or(Verdict::Unsupported)
}

pub fn is_valid(
    candidate: &Candidate,
    parent: Option<&Brick>,
    bricks: &[Brick],
    tolerances: &Tolerances,
) -> bool {
    evaluate(candidate, parent, bricks, tolerances).is_valid()
}

#[cfg(test)]
mod tests {
    use super::*;
    use brick_core::{BrickColor, NewBrick, Scene};

    fn place(
        scene: &mut Scene,
        kind: BrickType,
        rotation: GridRotation,
        position: [f32; 3],
    ) -> BrickId {
        scene.add_brick(NewBrick {
            position,
            color: BrickColor::Red,
            kind,
            rotation,
            internal_rotation: None,
        })
    }

    fn unit(position: [f32; 3]) -> Candidate {
        Candidate {
            position: Vec3::from_array(position),
            kind: BrickType::Unit1x1,
            rotation: GridRotation::Deg0,
        }
    }

    fn check(candidate: &Candidate, scene: &Scene) -> Verdict {
        evaluate(candidate, None, scene.bricks(), &Tolerances::default())
    }

    #[test]
    fn empty_floor_accepts_grounded_brick() {
        let scene = Scene::default();
        assert_eq!(check(&unit([0.5, 0.6, 0.5]), &scene), Verdict::Grounded);
    }

    #[test]
    fn same_cell_twice_collides() {
        let mut scene = Scene::default();
        let id = place(
            &mut scene,
            BrickType::Unit1x1,
            GridRotation::Deg0,
            [0.5, 0.6, 0.5],
        );
        assert_eq!(check(&unit([0.5, 0.6, 0.5]), &scene), Verdict::Collides(id));
    }

    #[test]
    fn side_by_side_bricks_are_allowed() {
        let mut scene = Scene::default();
        place(
            &mut scene,
            BrickType::Unit1x1,
            GridRotation::Deg0,
            [0.5, 0.6, 0.5],
        );
        assert_eq!(check(&unit([1.5, 0.6, 0.5]), &scene), Verdict::Grounded);
        assert_eq!(check(&unit([0.5, 0.6, -0.5]), &scene), Verdict::Grounded);
    }

    #[test]
    fn stacked_brick_rests_on_top_face() {
        let mut scene = Scene::default();
        let base = place(
            &mut scene,
            BrickType::Unit1x2,
            GridRotation::Deg0,
            [0.5, 0.6, 1.0],
        );
        assert_eq!(
            check(&unit([0.5, 1.8, 1.5]), &scene),
            Verdict::RestsOn(base)
        );
    }

    #[test]
    fn floating_brick_is_unsupported() {
        let mut scene = Scene::default();
        place(
            &mut scene,
            BrickType::Unit1x1,
            GridRotation::Deg0,
            [0.5, 0.6, 0.5],
        );
        // Right height, but beside the brick rather than on it.
        assert_eq!(check(&unit([1.5, 1.8, 0.5]), &scene), Verdict::Unsupported);
        // Above the brick, but with a gap.
        assert_eq!(check(&unit([0.5, 3.0, 0.5]), &scene), Verdict::Unsupported);
    }

    #[test]
    fn rotation_changes_the_footprint_under_test() {
        let mut scene = Scene::default();
        let long = place(
            &mut scene,
            BrickType::Unit2x4,
            GridRotation::Deg90,
            [2.0, 0.6, 1.0],
        );
        // Along X the rotated 2x4 spans 0..4, so x = 3.5 is inside it.
        assert_eq!(
            check(&unit([3.5, 0.6, 0.5]), &scene),
            Verdict::Collides(long)
        );
        assert_eq!(check(&unit([0.5, 0.6, 2.5]), &scene), Verdict::Grounded);
    }

    #[test]
    fn support_is_latched_regardless_of_order() {
        let mut scene = Scene::default();
        let left = place(
            &mut scene,
            BrickType::Unit1x1,
            GridRotation::Deg0,
            [0.5, 0.6, 0.5],
        );
        place(
            &mut scene,
            BrickType::Unit1x1,
            GridRotation::Deg0,
            [1.5, 0.6, 0.5],
        );
        let bridge = Candidate {
            position: Vec3::new(1.0, 1.8, 0.5),
            kind: BrickType::Unit1x2,
            rotation: GridRotation::Deg90,
        };
        assert_eq!(check(&bridge, &scene), Verdict::RestsOn(left));
    }

    #[test]
    fn free_spin_parent_bypasses_validation() {
        let mut scene = Scene::default();
        let table = place(
            &mut scene,
            BrickType::Turntable2x2,
            GridRotation::Deg0,
            [1.0, 0.6, 1.0],
        );
        // Deliberately overlapping the turntable itself.
        let candidate = unit([1.0, 0.6, 1.0]);
        let parent = scene.brick(table);
        let verdict = evaluate(&candidate, parent, scene.bricks(), &Tolerances::default());
        assert_eq!(verdict, Verdict::Attached(table));
        assert!(verdict.is_valid());
        assert!(
            !is_valid(&candidate, None, scene.bricks(), &Tolerances::default())
        );
    }

    #[test]
    fn accepted_bricks_never_interpenetrate() {
        let mut scene = Scene::default();
        let tolerances = Tolerances::default();
        let kinds = [BrickType::Unit1x1, BrickType::Unit1x2, BrickType::Unit2x4];
        for step in 0..60u32 {
            let kind = kinds[(step % 3) as usize];
            let rotation = GridRotation::from_quarter_turns(i64::from(step % 4));
            let level = (step % 3) as f32;
            let candidate = Candidate {
                position: Vec3::new(
                    (step * 7 % 5) as f32 + 0.5 * (step % 2) as f32,
                    0.6 + level * brick_core::BRICK_HEIGHT,
                    (step * 3 % 4) as f32,
                ),
                kind,
                rotation,
            };
            if is_valid(&candidate, None, scene.bricks(), &tolerances) {
                place(&mut scene, kind, rotation, candidate.position.to_array());
            }
        }
        assert!(!scene.is_empty());

        let boxes: Vec<_> = scene
            .bricks()
            .iter()
            .map(|b| Aabb::of_brick(Vec3::from_array(b.position), b.kind, b.rotation))
            .collect();
        for (i, a) in boxes.iter().enumerate() {
            // Support: on the ground or on some other brick's top face.
            let grounded = a.min.y.abs() < 1.0e-4;
            let rests = boxes.iter().enumerate().any(|(j, b)| {
                i != j && (a.min.y - b.max.y).abs() < SUPPORT_TOLERANCE && a.overlaps_xz(b)
            });
            assert!(grounded || rests, "brick {i} is unsupported");
            for b in boxes.iter().skip(i + 1) {
                let overlap = (a.max.min(b.max) - a.min.max(b.min)).max(Vec3::ZERO);
                assert!(
                    overlap.x * overlap.y * overlap.z < 1.0e-4,
                    "{a:?} overlaps {b:?}"
                );
            }
        }
    }

    const SUPPORT_TOLERANCE: f32 = crate::SUPPORT_CONTACT + crate::COLLISION_INSET;
}
