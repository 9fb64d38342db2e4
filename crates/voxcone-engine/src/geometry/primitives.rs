//! Procedural stand-ins for the model files, so a scene still renders when
//! its asset directory is missing.

use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};

use super::MeshData;

/// Texel layout of [`cornell_palette`], left to right.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CornellWall {
    Red,
    Green,
    White,
}

impl CornellWall {
    /// Texture coordinate at the center of this wall's texel.
    pub fn uv(self) -> Vec2 {
        let column = match self {
            CornellWall::Red => 0.0,
            CornellWall::Green => 1.0,
            CornellWall::White => 2.0,
        };
        Vec2::new((column + 0.5) / 3.0, 0.5)
    }
}

/// 3x1 RGBA8 texture with the red, green and white wall colors.
pub fn cornell_palette() -> (u32, u32, Vec<u8>) {
    let texels = [
        [191, 26, 26, 255],   // red
        [26, 166, 38, 255],   // green
        [230, 230, 222, 255], // white
    ];
    (3, 1, texels.concat())
}

/// Open box spanning `[-1, 1]^3` with inward-facing walls and no wall at +Z.
///
/// Seen from +Z the -X wall is red and the +X wall is green. Every vertex
/// maps to the center of its wall's texel in [`cornell_palette`].
pub fn cornell_box() -> MeshData {
    let mut mesh = MeshData::new();
    let c = |x: f32, y: f32, z: f32| Vec3::new(x, y, z);

    let walls: [([Vec3; 4], CornellWall); 5] = [
        // floor, facing +Y
        ([c(-1., -1., -1.), c(-1., -1., 1.), c(1., -1., 1.), c(1., -1., -1.)], CornellWall::White),
        // ceiling, facing -Y
        ([c(-1., 1., -1.), c(1., 1., -1.), c(1., 1., 1.), c(-1., 1., 1.)], CornellWall::White),
        // back, facing +Z
        ([c(-1., -1., -1.), c(1., -1., -1.), c(1., 1., -1.), c(-1., 1., -1.)], CornellWall::White),
        // left, facing +X
        ([c(-1., -1., -1.), c(-1., 1., -1.), c(-1., 1., 1.), c(-1., -1., 1.)], CornellWall::Red),
        // right, facing -X
        ([c(1., -1., -1.), c(1., -1., 1.), c(1., 1., 1.), c(1., 1., -1.)], CornellWall::Green),
    ];

    for (corners, wall) in walls {
        mesh.push_quad(corners, [wall.uv(); 4]);
    }
    mesh
}

/// Axis-aligned cube centered on the origin with outward faces.
pub fn cube(half_extent: f32) -> MeshData {
    let mut mesh = MeshData::new();
    let uv = [Vec2::new(0., 1.), Vec2::new(1., 1.), Vec2::new(1., 0.), Vec2::new(0., 0.)];

    for axis in [Vec3::X, Vec3::Y, Vec3::Z] {
        for sign in [1.0f32, -1.0] {
            let n = axis * sign;
            // Two tangents forming a right-handed frame with n.
            let reference = if axis == Vec3::Y { Vec3::Z } else { Vec3::Y };
            let t = reference.cross(n);
            let b = n.cross(t);
            let center = n * half_extent;
            let (t, b) = (t * half_extent, b * half_extent);
            mesh.push_quad(
                [center - t - b, center + t - b, center + t + b, center - t + b],
                uv,
            );
        }
    }
    mesh
}

/// Latitude/longitude sphere with outward faces and smooth normals.
pub fn uv_sphere(radius: f32, stacks: u32, slices: u32) -> MeshData {
    let stacks = stacks.max(2);
    let slices = slices.max(3);

    let point = |stack: u32, slice: u32| {
        let theta = PI * stack as f32 / stacks as f32;
        let phi = TAU * slice as f32 / slices as f32;
        let n = Vec3::new(theta.sin() * phi.cos(), theta.cos(), -theta.sin() * phi.sin());
        let uv = Vec2::new(slice as f32 / slices as f32, stack as f32 / stacks as f32);
        (n * radius, n, uv)
    };

    let mut mesh = MeshData::new();
    for stack in 0..stacks {
        for slice in 0..slices {
            let a = point(stack, slice);
            let b = point(stack + 1, slice);
            let c = point(stack + 1, slice + 1);
            let d = point(stack, slice + 1);

            // Pole rows collapse one corner; skip the degenerate half.
            if stack != 0 {
                mesh.push_triangle([a.0, b.0, d.0], Some([a.1, b.1, d.1]), [a.2, b.2, d.2]);
            }
            if stack != stacks - 1 {
                mesh.push_triangle([b.0, c.0, d.0], Some([b.1, c.1, d.1]), [b.2, c.2, d.2]);
            }
        }
    }
    mesh
}
