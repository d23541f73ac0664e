//! Ray casting against scene meshes
//!
//! Each mesh is first rejected by its world bounds, then tested triangle by
//! triangle in its local space. Meshes loaded without triangles fall back to
//! their bounds.

use glam::{Mat4, Vec3};

use super::{MeshGeometry, MeshInfo, NodeId, SceneGraph};

/// Smallest determinant treated as a non-parallel triangle
const PARALLEL_EPSILON: f32 = 1e-12;

/// A half-line in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit direction
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    pub fn from_center_half_extents(center: Vec3, half: Vec3) -> Self {
        Self::new(center - half, center + half)
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Bounds of this box after transformation, enclosing all eight corners
    pub fn transformed(&self, matrix: &Mat4) -> Self {
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for i in 0..8 {
            let corner = Vec3::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
            );
            let p = matrix.transform_point3(corner);
            min = min.min(p);
            max = max.max(p);
        }
        Self { min, max }
    }

    /// Slab test. Returns the entry distance along the ray, or the exit
    /// distance when the origin is inside the box.
    pub fn intersect(&self, ray: &Ray) -> Option<f32> {
        let inv = ray.direction.recip();
        let t0 = (self.min - ray.origin) * inv;
        let t1 = (self.max - ray.origin) * inv;
        let near = t0.min(t1).max_element();
        let far = t0.max(t1).min_element();

        if far < 0.0 || near > far || near.is_nan() || far.is_nan() {
            return None;
        }
        Some(if near >= 0.0 { near } else { far })
    }
}

/// Möller-Trumbore ray/triangle test. Returns the ray parameter of the hit,
/// which is a distance when `ray.direction` is unit length.
pub fn intersect_triangle(ray: &Ray, [a, b, c]: [Vec3; 3], cull_back_faces: bool) -> Option<f32> {
    let edge1 = b - a;
    let edge2 = c - a;
    let p = ray.direction.cross(edge2);
    let det = edge1.dot(p);
    if cull_back_faces {
        if det <= PARALLEL_EPSILON {
            return None;
        }
    } else if det.abs() <= PARALLEL_EPSILON {
        return None;
    }

    let inv_det = 1.0 / det;
    let s = ray.origin - a;
    let u = s.dot(p) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    let q = s.cross(edge1);
    let v = ray.direction.dot(q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = edge2.dot(q) * inv_det;
    (t > 0.0).then_some(t)
}

impl MeshGeometry {
    /// Nearest triangle hit of a ray given in this geometry's space
    pub fn intersect(&self, ray: &Ray) -> Option<f32> {
        self.triangles
            .iter()
            .filter_map(|[a, b, c]| {
                let corners = [
                    self.positions[*a as usize],
                    self.positions[*b as usize],
                    self.positions[*c as usize],
                ];
                intersect_triangle(ray, corners, !self.double_sided)
            })
            .min_by(f32::total_cmp)
    }
}

/// Distance from the ray origin to the first surface of `mesh`
fn intersect_mesh(mesh: &MeshInfo, world: &Mat4, ray: &Ray) -> Option<f32> {
    let world_bounds = mesh.bounds.transformed(world);
    let bounds_hit = world_bounds.intersect(ray)?;
    if !mesh.has_geometry() {
        return Some(bounds_hit);
    }

    // Affine maps keep the ray parameter, so local hits are world distances
    let inverse = world.inverse();
    let local = Ray {
        origin: inverse.transform_point3(ray.origin),
        direction: inverse.transform_vector3(ray.direction),
    };
    mesh.primitives
        .iter()
        .filter_map(|p| p.geometry.as_ref()?.intersect(&local))
        .min_by(f32::total_cmp)
}

/// One ray/object intersection
#[derive(Debug, Clone, PartialEq)]
pub struct PickHit {
    pub node: NodeId,
    pub name: String,
    pub distance: f32,
}

/// Intersect a ray with every mesh node, nearest hit first
pub fn raycast(scene: &SceneGraph, ray: &Ray) -> Vec<PickHit> {
    let mut hits: Vec<PickHit> = scene
        .mesh_nodes()
        .filter_map(|id| {
            let node = scene.node(id)?;
            let world = scene.world_matrix(id)?;
            let distance = intersect_mesh(node.mesh.as_ref()?, &world, ray)?;
            Some(PickHit {
                node: id,
                name: node.name.clone(),
                distance,
            })
        })
        .collect();

    hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    hits
}
