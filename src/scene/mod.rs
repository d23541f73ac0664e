//! Scene management
//!
//! The viewer keeps the loaded model as a flat arena of named nodes. The
//! renderer reads world matrices from it every frame; the controller writes
//! door and wheel poses into it.

mod camera;
mod camera_controller;
mod picking;
mod transform;

pub use camera::*;
pub use camera_controller::*;
pub use picking::*;
pub use transform::*;

use glam::{Mat4, Vec3};

use crate::resources::MaterialSlot;

/// Index of a node inside a [`SceneGraph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Local-space triangles of a primitive, kept for picking
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeshGeometry {
    pub positions: Vec<Vec3>,
    /// Counter-clockwise front faces
    pub triangles: Vec<[u32; 3]>,
    /// Back faces are pickable too
    pub double_sided: bool,
}

impl MeshGeometry {
    /// Build from an index list, dropping incomplete or out-of-range triangles
    pub fn from_indices(positions: Vec<Vec3>, indices: &[u32]) -> Self {
        let count = positions.len();
        let triangles = indices
            .chunks_exact(3)
            .filter(|t| t.iter().all(|&i| (i as usize) < count))
            .map(|t| [t[0], t[1], t[2]])
            .collect();
        Self {
            positions,
            triangles,
            double_sided: false,
        }
    }

    /// Closed box with outward-facing triangles
    pub fn cuboid(bounds: Aabb) -> Self {
        let positions = (0..8)
            .map(|i| {
                Vec3::new(
                    if i & 1 == 0 { bounds.min.x } else { bounds.max.x },
                    if i & 2 == 0 { bounds.min.y } else { bounds.max.y },
                    if i & 4 == 0 { bounds.min.z } else { bounds.max.z },
                )
            })
            .collect();
        #[rustfmt::skip]
        let indices = [
            0, 4, 6, 0, 6, 2, // -X
            1, 3, 7, 1, 7, 5, // +X
            0, 1, 5, 0, 5, 4, // -Y
            2, 6, 7, 2, 7, 3, // +Y
            0, 2, 3, 0, 3, 1, // -Z
            4, 5, 7, 4, 7, 6, // +Z
        ];
        Self::from_indices(positions, &indices)
    }

    pub fn bounds(&self) -> Option<Aabb> {
        let first = *self.positions.first()?;
        let (min, max) = self
            .positions
            .iter()
            .fold((first, first), |(min, max), p| (min.min(*p), max.max(*p)));
        Some(Aabb::new(min, max))
    }
}

/// One primitive of a mesh and the material it was authored with
#[derive(Debug, Clone, PartialEq)]
pub struct Primitive {
    pub material_name: Option<String>,
    /// Viewer-owned material that replaces the authored one, if bound
    pub slot: Option<MaterialSlot>,
    /// Triangles for picking. Without them the mesh is picked by its bounds.
    pub geometry: Option<MeshGeometry>,
}

/// Renderable payload attached to a node
#[derive(Debug, Clone, PartialEq)]
pub struct MeshInfo {
    /// Local-space bounds
    pub bounds: Aabb,
    pub primitives: Vec<Primitive>,
    /// Depth bias (factor, units) for decals that z-fight the body
    pub polygon_offset: Option<(f32, f32)>,
}

impl MeshInfo {
    pub fn new(bounds: Aabb) -> Self {
        Self {
            bounds,
            primitives: Vec::new(),
            polygon_offset: None,
        }
    }

    /// Solid box mesh filling `bounds`
    pub fn cuboid(bounds: Aabb) -> Self {
        Self::new(bounds).with_geometry(MeshGeometry::cuboid(bounds))
    }

    pub fn with_material(mut self, name: &str) -> Self {
        self.primitives.push(Primitive {
            material_name: Some(name.to_string()),
            slot: None,
            geometry: None,
        });
        self
    }

    pub fn with_geometry(mut self, geometry: MeshGeometry) -> Self {
        self.primitives.push(Primitive {
            material_name: None,
            slot: None,
            geometry: Some(geometry),
        });
        self
    }

    /// Whether any primitive carries triangles
    pub fn has_geometry(&self) -> bool {
        self.primitives.iter().any(|p| p.geometry.is_some())
    }
}

/// A named, transformable node
#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub transform: Transform,
    pub mesh: Option<MeshInfo>,
}

/// Hierarchy of named nodes
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node under `parent` (or as a root) and return its id
    pub fn add_node(&mut self, name: &str, parent: Option<NodeId>, transform: Transform) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            name: name.to_string(),
            parent,
            children: Vec::new(),
            transform,
            mesh: None,
        });

        match parent.and_then(|p| self.nodes.get_mut(p.0)) {
            Some(parent_node) => parent_node.children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    pub fn set_mesh(&mut self, id: NodeId, mesh: MeshInfo) {
        if let Some(node) = self.nodes.get_mut(id.0) {
            node.mesh = Some(mesh);
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    /// All node ids in depth-first order, roots first
    pub fn depth_first(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            order.push(id);
            if let Some(node) = self.nodes.get(id.0) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        order
    }

    /// First node with the given name in depth-first order
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.depth_first()
            .into_iter()
            .find(|id| self.nodes[id.0].name == name)
    }

    /// Ids of nodes carrying a mesh
    pub fn mesh_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes()
            .filter(|(_, n)| n.mesh.is_some())
            .map(|(id, _)| id)
    }

    /// Node-to-world matrix, composed through all ancestors
    pub fn world_matrix(&self, id: NodeId) -> Option<Mat4> {
        let mut node = self.nodes.get(id.0)?;
        let mut matrix = node.transform.matrix();
        while let Some(parent) = node.parent {
            node = self.nodes.get(parent.0)?;
            matrix = node.transform.matrix() * matrix;
        }
        Some(matrix)
    }

    /// World-space bounds of a mesh node
    pub fn world_bounds(&self, id: NodeId) -> Option<Aabb> {
        let mesh = self.nodes.get(id.0)?.mesh.as_ref()?;
        let world = self.world_matrix(id)?;
        Some(mesh.bounds.transformed(&world))
    }

    /// World matrices of every node, indexed like [`SceneGraph::nodes`]
    pub fn world_matrices(&self) -> Vec<Mat4> {
        let mut out = vec![Mat4::IDENTITY; self.nodes.len()];
        for id in self.depth_first() {
            let node = &self.nodes[id.0];
            let local = node.transform.matrix();
            out[id.0] = match node.parent {
                Some(p) => out[p.0] * local,
                None => local,
            };
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Quat, Vec3};

    fn sample() -> (SceneGraph, NodeId, NodeId) {
        let mut scene = SceneGraph::new();
        let body = scene.add_node("Body", None, Transform::from_position(Vec3::new(0.0, 1.0, 0.0)));
        let hinge = scene.add_node(
            "DoorFLAxes",
            Some(body),
            Transform::from_position(Vec3::new(1.0, 0.0, 0.0)),
        );
        (scene, body, hinge)
    }

    #[test]
    fn find_by_name_walks_children() {
        let (scene, body, hinge) = sample();
        assert_eq!(scene.find_by_name("Body"), Some(body));
        assert_eq!(scene.find_by_name("DoorFLAxes"), Some(hinge));
        assert_eq!(scene.find_by_name("DoorRRAxes"), None);
    }

    #[test]
    fn find_by_name_returns_first_in_depth_first_order() {
        let (mut scene, body, _) = sample();
        let nested = scene.add_node("Dup", Some(body), Transform::default());
        scene.add_node("Dup", None, Transform::default());
        assert_eq!(scene.find_by_name("Dup"), Some(nested));
    }

    #[test]
    fn world_matrix_composes_parents() {
        let (mut scene, body, hinge) = sample();
        scene.node_mut(body).unwrap().transform.rotation = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);

        let world = scene.world_matrix(hinge).unwrap();
        let origin = world.transform_point3(Vec3::ZERO);
        assert!(origin.abs_diff_eq(Vec3::new(0.0, 1.0, -1.0), 1e-5));

        let all = scene.world_matrices();
        assert!(all[hinge.index()].abs_diff_eq(world, 1e-6));
    }

    #[test]
    fn world_bounds_only_for_meshes() {
        let (mut scene, body, hinge) = sample();
        scene.set_mesh(hinge, MeshInfo::new(Aabb::new(Vec3::ZERO, Vec3::ONE)));
        assert!(scene.world_bounds(body).is_none());
        let bounds = scene.world_bounds(hinge).unwrap();
        assert!(bounds.min.abs_diff_eq(Vec3::new(1.0, 1.0, 0.0), 1e-6));
        assert_eq!(scene.mesh_nodes().collect::<Vec<_>>(), vec![hinge]);
    }

    #[test]
    fn cuboid_faces_point_outward() {
        let bounds = Aabb::new(Vec3::new(-1.0, 0.0, -2.0), Vec3::new(1.0, 2.0, 2.0));
        let geometry = MeshGeometry::cuboid(bounds);
        assert_eq!(geometry.triangles.len(), 12);
        assert_eq!(geometry.bounds(), Some(bounds));

        let center = bounds.center();
        for [a, b, c] in &geometry.triangles {
            let (a, b, c) = (
                geometry.positions[*a as usize],
                geometry.positions[*b as usize],
                geometry.positions[*c as usize],
            );
            let normal = (b - a).cross(c - a);
            let outward = (a + b + c) / 3.0 - center;
            assert!(normal.dot(outward) > 0.0);
        }
    }

    #[test]
    fn out_of_range_indices_are_dropped() {
        let positions = vec![Vec3::ZERO, Vec3::X, Vec3::Y];
        let geometry = MeshGeometry::from_indices(positions, &[0, 1, 2, 0, 2, 9, 1]);
        assert_eq!(geometry.triangles, vec![[0, 1, 2]]);
    }
}
