//! Procedural stand-in geometry for when no model file is supplied.

use crate::mesh::{MeshGeometry, Model};
use glam::Vec3;
use std::f32::consts::{PI, TAU};

/// UV sphere vertex grid: `(rings + 1) * (segments + 1)` vertices.
pub fn uv_sphere(radius: f32, segments: u32, rings: u32) -> MeshGeometry {
    let segments = segments.max(3);
    let rings = rings.max(2);
    let mut positions = Vec::with_capacity(((rings + 1) * (segments + 1)) as usize);

    for ring in 0..=rings {
        let v = ring as f32 / rings as f32;
        let theta = v * PI;
        for segment in 0..=segments {
            let u = segment as f32 / segments as f32;
            let phi = u * TAU;
            positions.push(Vec3::new(
                -radius * phi.cos() * theta.sin(),
                radius * theta.cos(),
                radius * phi.sin() * theta.sin(),
            ));
        }
    }

    MeshGeometry::new("sphere", positions)
}

/// Axis-aligned cube with four vertices per face.
pub fn cube(size: f32) -> MeshGeometry {
    let h = size * 0.5;
    let faces: [(Vec3, Vec3, Vec3); 6] = [
        (Vec3::X, Vec3::Y, Vec3::Z),
        (Vec3::NEG_X, Vec3::Y, Vec3::NEG_Z),
        (Vec3::Y, Vec3::Z, Vec3::X),
        (Vec3::NEG_Y, Vec3::Z, Vec3::NEG_X),
        (Vec3::Z, Vec3::Y, Vec3::NEG_X),
        (Vec3::NEG_Z, Vec3::Y, Vec3::X),
    ];

    let mut positions = Vec::with_capacity(24);
    for (normal, up, right) in faces {
        let center = normal * h;
        for (su, sr) in [(-1.0, -1.0), (-1.0, 1.0), (1.0, 1.0), (1.0, -1.0)] {
            positions.push(center + up * (su * h) + right * (sr * h));
        }
    }

    MeshGeometry::new("cube", positions)
}

/// Default showcase object: a sphere resting on a cube plinth.
pub fn placeholder_model() -> Model {
    let mut plinth = cube(1.0);
    for p in &mut plinth.positions {
        p.y -= 1.0;
    }
    Model::new(vec![uv_sphere(0.5, 32, 16), plinth])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sphere_vertices_lie_on_radius() {
        let sphere = uv_sphere(2.0, 8, 4);
        assert_eq!(sphere.vertex_count(), 5 * 9);
        for p in &sphere.positions {
            assert!((p.length() - 2.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_cube_vertices_on_surface() {
        let c = cube(2.0);
        assert_eq!(c.vertex_count(), 24);
        for p in &c.positions {
            assert!((p.abs().max_element() - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_placeholder_has_two_meshes() {
        let model = placeholder_model();
        assert_eq!(model.meshes.len(), 2);
        assert!(model.meshes[1].positions.iter().all(|p| p.y <= -0.5 + 1e-6));
    }
}
