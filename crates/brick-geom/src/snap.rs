//! Grid snapping for the brick about to be placed.

use crate::dimensions;
use brick_core::{Brick, BrickType, GridRotation, PlacementPolicy};
use glam::Vec3;

/// Snaps a surface hit to the centre of the brick that would be placed there.
///
/// The footprint's low corner lands on the grid cell containing the hit and
/// the bottom face lands on `support_y`. Bricks attached to a free-spin
/// parent centre on the parent in X and Z instead. Returns `None` when the
/// hit is not a usable point.
pub fn snap_position(
    hit: Vec3,
    support_y: f32,
    parent: Option<&Brick>,
    kind: BrickType,
    rotation: GridRotation,
) -> Option<Vec3> {
    if !hit.is_finite() || !support_y.is_finite() {
        return None;
    }
    let dims = dimensions(kind, rotation);
    let y = support_y + dims.y / 2.0;

    if let Some(parent) = parent {
        if parent.kind.placement_policy() == PlacementPolicy::FreeSpin {
            let [px, _, pz] = parent.position;
            return Some(Vec3::new(px, y, pz));
        }
    }

    Some(Vec3::new(
        hit.x.floor() + dims.x / 2.0,
        y,
        hit.z.floor() + dims.z / 2.0,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use brick_core::{BrickColor, BRICK_HEIGHT};

    fn brick(kind: BrickType, position: [f32; 3]) -> Brick {
        Brick {
            id: 7,
            position,
            color: BrickColor::Green,
            kind,
            rotation: GridRotation::Deg0,
            internal_rotation: Some(1.0),
        }
    }

    #[test]
    fn unit_brick_centres_in_its_cell() {
        let pos = snap_position(
            Vec3::new(0.3, 0.0, 0.8),
            0.0,
            None,
            BrickType::Unit1x1,
            GridRotation::Deg0,
        )
        .unwrap();
        assert_abs_diff_eq!(pos.x, 0.5);
        assert_abs_diff_eq!(pos.y, 0.6);
        assert_abs_diff_eq!(pos.z, 0.5);
    }

    #[test]
    fn negative_coordinates_floor_downward() {
        let pos = snap_position(
            Vec3::new(-0.2, 0.0, -1.7),
            0.0,
            None,
            BrickType::Unit1x1,
            GridRotation::Deg0,
        )
        .unwrap();
        assert_abs_diff_eq!(pos.x, -0.5);
        assert_abs_diff_eq!(pos.z, -1.5);
    }

    #[test]
    fn rotated_footprint_extends_from_hit_cell() {
        let pos = snap_position(
            Vec3::new(3.9, 0.0, 1.1),
            0.0,
            None,
            BrickType::Unit2x4,
            GridRotation::Deg90,
        )
        .unwrap();
        assert_abs_diff_eq!(pos.x, 5.0);
        assert_abs_diff_eq!(pos.z, 2.0);
    }

    #[test]
    fn support_surface_sets_height() {
        let parent = brick(BrickType::Unit2x4, [1.0, 0.6, 2.0]);
        let support_y = parent.position[1] + BRICK_HEIGHT / 2.0;
        let pos = snap_position(
            Vec3::new(1.4, support_y, 3.2),
            support_y,
            Some(&parent),
            BrickType::Unit1x1,
            GridRotation::Deg0,
        )
        .unwrap();
        assert_abs_diff_eq!(pos.x, 1.5);
        assert_abs_diff_eq!(pos.y, 1.8, epsilon = 1.0e-5);
        assert_abs_diff_eq!(pos.z, 3.5);
    }

    #[test]
    fn free_spin_parent_centres_the_brick() {
        let parent = brick(BrickType::Turntable2x2, [3.0, 0.6, -1.0]);
        let pos = snap_position(
            Vec3::new(3.8, 1.2, -0.1),
            1.2,
            Some(&parent),
            BrickType::Unit1x2,
            GridRotation::Deg90,
        )
        .unwrap();
        assert_eq!((pos.x, pos.z), (3.0, -1.0));
        assert_abs_diff_eq!(pos.y, 1.8, epsilon = 1.0e-5);
    }

    #[test]
    fn unusable_hit_yields_nothing() {
        let hit = Vec3::new(f32::NAN, 0.0, 0.0);
        let snapped = snap_position(hit, 0.0, None, BrickType::Unit1x1, GridRotation::Deg0);
        assert!(snapped.is_none());
    }
}
