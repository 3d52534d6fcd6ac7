//! Rotation orders and transform decomposition

use glam::{DMat3, DMat4, DVec3};
use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Euler rotation order of a transform.
///
/// The discriminants are the FBX `EFbxRotationOrder` members, which the
/// host-side order strings (`"xyz"`, `"xzy"`, ...) map onto 1:1. An order
/// names the application sequence: `Xyz` rotates about X first, then Y,
/// then Z.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(i32)]
pub enum RotationOrder {
    /// X, then Y, then Z.
    Xyz = 0,
    /// X, then Z, then Y.
    Xzy = 1,
    /// Y, then Z, then X.
    Yzx = 2,
    /// Y, then X, then Z.
    Yxz = 3,
    /// Z, then X, then Y.
    Zxy = 4,
    /// Z, then Y, then X.
    Zyx = 5,
}

impl Default for RotationOrder {
    fn default() -> Self {
        RotationOrder::Xyz
    }
}

/// A local transform split into its keyable components.
///
/// Euler angles are stored as per-axis degrees `(rx, ry, rz)` regardless of
/// the order they apply in.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Trs {
    /// Local translation.
    pub translation: DVec3,
    /// Per-axis euler angles in degrees.
    pub euler_degrees: DVec3,
    /// Local scale.
    pub scale: DVec3,
}

impl Trs {
    /// The identity transform.
    pub fn identity() -> Self {
        Trs {
            translation: DVec3::ZERO,
            euler_degrees: DVec3::ZERO,
            scale: DVec3::ONE,
        }
    }
}

fn axis_rotation(axis: usize, radians: f64) -> DMat3 {
    match axis {
        0 => DMat3::from_rotation_x(radians),
        1 => DMat3::from_rotation_y(radians),
        _ => DMat3::from_rotation_z(radians),
    }
}

/// Application order of the three axes (0 = X, 1 = Y, 2 = Z).
fn axes_of(order: RotationOrder) -> [usize; 3] {
    match order {
        RotationOrder::Xyz => [0, 1, 2],
        RotationOrder::Xzy => [0, 2, 1],
        RotationOrder::Yzx => [1, 2, 0],
        RotationOrder::Yxz => [1, 0, 2],
        RotationOrder::Zxy => [2, 0, 1],
        RotationOrder::Zyx => [2, 1, 0],
    }
}

/// Builds a local matrix from keyable components.
///
/// The rotation composite is `R(last) * R(mid) * R(first)` for column
/// vectors, matching how the supported hosts apply rotate orders.
pub fn compose(trs: &Trs, order: RotationOrder) -> DMat4 {
    let [a, b, c] = axes_of(order);
    let radians = [
        trs.euler_degrees.x.to_radians(),
        trs.euler_degrees.y.to_radians(),
        trs.euler_degrees.z.to_radians(),
    ];

    let rotation = axis_rotation(c, radians[c]) * axis_rotation(b, radians[b]) * axis_rotation(a, radians[a]);

    let mut basis = rotation;
    basis.x_axis *= trs.scale.x;
    basis.y_axis *= trs.scale.y;
    basis.z_axis *= trs.scale.z;

    let mut matrix = DMat4::from_mat3(basis);
    matrix.w_axis = trs.translation.extend(1.0);
    matrix
}

/// Splits a local matrix into translation, per-axis euler degrees in the
/// given order, and scale.
///
/// Shear is not preserved and negative scale is not untangled; the source
/// transforms this pipeline consumes carry neither.
pub fn decompose(matrix: &DMat4, order: RotationOrder) -> Trs {
    let translation = matrix.w_axis.truncate();

    let basis = DMat3::from_mat4(*matrix);
    let scale = DVec3::new(
        basis.x_axis.length(),
        basis.y_axis.length(),
        basis.z_axis.length(),
    );

    let r = DMat3::from_cols(
        if scale.x != 0.0 { basis.x_axis / scale.x } else { DVec3::X },
        if scale.y != 0.0 { basis.y_axis / scale.y } else { DVec3::Y },
        if scale.z != 0.0 { basis.z_axis / scale.z } else { DVec3::Z },
    );

    // Column-major access: r(row, col) with columns x/y/z_axis.
    let (r00, r10, r20) = (r.x_axis.x, r.x_axis.y, r.x_axis.z);
    let (r01, r11, r21) = (r.y_axis.x, r.y_axis.y, r.y_axis.z);
    let (r02, r12, r22) = (r.z_axis.x, r.z_axis.y, r.z_axis.z);

    let asin = |v: f64| v.clamp(-1.0, 1.0).asin();

    let (rx, ry, rz) = match order {
        RotationOrder::Xyz => (r21.atan2(r22), asin(-r20), r10.atan2(r00)),
        RotationOrder::Xzy => ((-r12).atan2(r11), (-r20).atan2(r00), asin(r10)),
        RotationOrder::Yzx => (r21.atan2(r11), r02.atan2(r00), asin(-r01)),
        RotationOrder::Yxz => (asin(r21), (-r20).atan2(r22), (-r01).atan2(r11)),
        RotationOrder::Zxy => (asin(-r12), r02.atan2(r22), r10.atan2(r11)),
        RotationOrder::Zyx => ((-r12).atan2(r22), asin(r02), (-r01).atan2(r00)),
    };

    Trs {
        translation,
        euler_degrees: DVec3::new(rx.to_degrees(), ry.to_degrees(), rz.to_degrees()),
        scale,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORDERS: [RotationOrder; 6] = [
        RotationOrder::Xyz,
        RotationOrder::Xzy,
        RotationOrder::Yzx,
        RotationOrder::Yxz,
        RotationOrder::Zxy,
        RotationOrder::Zyx,
    ];

    #[test]
    fn euler_round_trips_in_every_order() {
        let source = Trs {
            translation: DVec3::new(1.0, -2.0, 3.0),
            euler_degrees: DVec3::new(20.0, -35.0, 50.0),
            scale: DVec3::new(1.0, 2.0, 0.5),
        };

        for order in ORDERS {
            let matrix = compose(&source, order);
            let result = decompose(&matrix, order);

            assert!(
                (result.translation - source.translation).length() < 1e-9,
                "translation drifted for {order:?}"
            );
            assert!(
                (result.euler_degrees - source.euler_degrees).length() < 1e-9,
                "euler angles drifted for {order:?}: {:?}",
                result.euler_degrees
            );
            assert!(
                (result.scale - source.scale).length() < 1e-9,
                "scale drifted for {order:?}"
            );
        }
    }

    #[test]
    fn identity_decomposes_to_zero() {
        let result = decompose(&DMat4::IDENTITY, RotationOrder::Xyz);
        assert_eq!(result.translation, DVec3::ZERO);
        assert_eq!(result.euler_degrees, DVec3::ZERO);
        assert_eq!(result.scale, DVec3::ONE);
    }

    #[test]
    fn order_ordinals_match_the_wire_values() {
        assert_eq!(i32::from(RotationOrder::Xyz), 0);
        assert_eq!(i32::from(RotationOrder::Zyx), 5);
    }
}
