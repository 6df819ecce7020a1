//! Rotation matrices in the protocol's left-handed frames.
//!
//! Aircraft axes are X right, Y up, Z front; world axes are X east, Y up,
//! Z north. A full attitude is `yaw(track) * pitch(θ) * roll(φ)`, flattened
//! row-major into [`RemoteSensorData::attitude`](crate::RemoteSensorData).

/// A 3×3 matrix, `m[row][col]`.
pub type Matrix3 = [[f64; 3]; 3];

/// Rotation about the vertical axis by `phi` radians.
pub fn yaw(phi: f64) -> Matrix3 {
    let (s, c) = phi.sin_cos();
    [[c, 0.0, s], [0.0, 1.0, 0.0], [-s, 0.0, c]]
}

/// Rotation about the lateral axis by `phi` radians.
pub fn pitch(phi: f64) -> Matrix3 {
    let (s, c) = phi.sin_cos();
    [[1.0, 0.0, 0.0], [0.0, c, -s], [0.0, s, c]]
}

/// Rotation about the longitudinal axis by `phi` radians.
pub fn roll(phi: f64) -> Matrix3 {
    let (s, c) = phi.sin_cos();
    [[c, -s, 0.0], [s, c, 0.0], [0.0, 0.0, 1.0]]
}

/// Matrix product `a * b`.
pub fn mul(a: &Matrix3, b: &Matrix3) -> Matrix3 {
    let mut out = [[0.0; 3]; 3];
    for (r, row) in out.iter_mut().enumerate() {
        for (c, cell) in row.iter_mut().enumerate() {
            *cell = (0..3).map(|k| a[r][k] * b[k][c]).sum();
        }
    }
    out
}

/// Matrix-vector product `m * v`.
pub fn transform(m: &Matrix3, v: [f64; 3]) -> [f64; 3] {
    let mut out = [0.0; 3];
    for (r, cell) in out.iter_mut().enumerate() {
        *cell = (0..3).map(|k| m[r][k] * v[k]).sum();
    }
    out
}

/// Flatten row-major.
pub fn to_row_major(m: &Matrix3) -> [f64; 9] {
    let mut out = [0.0; 9];
    for (i, cell) in out.iter_mut().enumerate() {
        *cell = m[i / 3][i % 3];
    }
    out
}

/// Attitude for a groundtrack, pitch and roll given in degrees.
pub fn from_euler_degrees(track: f64, pitch_deg: f64, roll_deg: f64) -> [f64; 9] {
    let r = mul(
        &mul(&yaw(track.to_radians()), &pitch(pitch_deg.to_radians())),
        &roll(roll_deg.to_radians()),
    );
    to_row_major(&r)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::IDENTITY_ATTITUDE;

    fn close(a: &[f64], b: &[f64]) -> bool {
        a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-9)
    }

    #[test]
    fn zero_angles_are_identity() {
        assert!(close(&from_euler_degrees(0.0, 0.0, 0.0), &IDENTITY_ATTITUDE));
    }

    #[test]
    fn yaw_east_maps_front_to_east() {
        // Heading 090: the aircraft's front (Z) points to world X (east).
        let m = yaw(90f64.to_radians());
        assert!(close(&transform(&m, [0.0, 0.0, 1.0]), &[1.0, 0.0, 0.0]));
    }

    #[test]
    fn rotation_is_orthonormal() {
        let r = from_euler_degrees(123.0, 15.0, -30.0);
        let m = [[r[0], r[1], r[2]], [r[3], r[4], r[5]], [r[6], r[7], r[8]]];
        let mt = [
            [m[0][0], m[1][0], m[2][0]],
            [m[0][1], m[1][1], m[2][1]],
            [m[0][2], m[1][2], m[2][2]],
        ];
        assert!(close(&to_row_major(&mul(&m, &mt)), &IDENTITY_ATTITUDE));
    }
}
