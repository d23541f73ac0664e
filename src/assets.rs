//! Car model loading
//!
//! Parses glTF (`.gltf` JSON or `.glb`) into a [`SceneGraph`]. Only the
//! structure the viewer needs is read: node names, hierarchy, local
//! transforms, mesh bounds, per-primitive material names and the triangles
//! used for picking. Shading data stays with the renderer.
//!
//! A `.gltf` usually references a `.bin` next to it. Callers fetch those with
//! [`external_buffer_uris`] and pass them to [`load_gltf_with_buffers`].

use std::collections::HashMap;

use glam::Vec3;

use crate::error::{ViewerError, ViewerResult};
use crate::scene::{Aabb, MeshGeometry, MeshInfo, NodeId, Primitive, SceneGraph, Transform};

fn asset_error(path: &str, reason: impl Into<String>) -> ViewerError {
    ViewerError::AssetLoad {
        path: path.to_string(),
        reason: reason.into(),
    }
}

fn parse(path: &str, data: &[u8]) -> ViewerResult<gltf::Gltf> {
    gltf::Gltf::from_slice(data).map_err(|e| asset_error(path, e.to_string()))
}

/// URIs of the buffers a document keeps outside itself, relative to it
pub fn external_buffer_uris(path: &str, data: &[u8]) -> ViewerResult<Vec<String>> {
    let gltf = parse(path, data)?;
    Ok(gltf
        .document
        .buffers()
        .filter_map(|buffer| match buffer.source() {
            gltf::buffer::Source::Uri(uri) if !uri.starts_with("data:") => Some(uri.to_string()),
            _ => None,
        })
        .collect())
}

/// Resolve buffer contents in document order. The GLB blob backs the
/// binary buffer and `external` supplies URI buffers.
fn resolve_buffers(
    path: &str,
    document: &gltf::Document,
    blob: Option<&[u8]>,
    external: &HashMap<String, Vec<u8>>,
) -> ViewerResult<Vec<Vec<u8>>> {
    let mut buffers = Vec::new();
    for buffer in document.buffers() {
        let data = match buffer.source() {
            gltf::buffer::Source::Bin => blob
                .ok_or_else(|| asset_error(path, "binary buffer referenced but no blob present"))?,
            gltf::buffer::Source::Uri(uri) if uri.starts_with("data:") => {
                return Err(asset_error(path, "embedded data URI buffers are not supported"));
            }
            gltf::buffer::Source::Uri(uri) => external
                .get(uri)
                .map(Vec::as_slice)
                .ok_or_else(|| asset_error(path, format!("buffer '{uri}' was not provided")))?,
        };
        if data.len() < buffer.length() {
            return Err(asset_error(
                path,
                format!(
                    "buffer {} holds {} bytes, {} declared",
                    buffer.index(),
                    data.len(),
                    buffer.length()
                ),
            ));
        }
        buffers.push(data.to_vec());
    }
    Ok(buffers)
}

/// Parse a self-contained glTF document (GLB, or JSON without buffers)
pub fn load_gltf_slice(path: &str, data: &[u8]) -> ViewerResult<SceneGraph> {
    load_gltf_with_buffers(path, data, &HashMap::new())
}

/// Parse a glTF document whose external buffers are supplied by URI.
/// `path` is only used in errors.
pub fn load_gltf_with_buffers(
    path: &str,
    data: &[u8],
    external: &HashMap<String, Vec<u8>>,
) -> ViewerResult<SceneGraph> {
    let gltf = parse(path, data)?;
    let buffers = resolve_buffers(path, &gltf.document, gltf.blob.as_deref(), external)?;
    let document = gltf.document;

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or_else(|| ViewerError::AssetLoad {
            path: path.to_string(),
            reason: "document contains no scenes".to_string(),
        })?;

    let mut graph = SceneGraph::new();
    for node in scene.nodes() {
        load_node(&mut graph, &node, None, &buffers);
    }

    log::info!(
        "Loaded '{}': {} nodes, {} meshes",
        path,
        graph.len(),
        graph.mesh_nodes().count()
    );
    Ok(graph)
}

/// Read and parse a glTF file from disk, with its buffers from the same directory
#[cfg(not(target_arch = "wasm32"))]
pub fn load_gltf_file(path: &str) -> ViewerResult<SceneGraph> {
    let read = |file: &std::path::Path| {
        std::fs::read(file).map_err(|e| asset_error(&file.display().to_string(), e.to_string()))
    };
    let data = read(std::path::Path::new(path))?;
    let base = std::path::Path::new(path)
        .parent()
        .unwrap_or_else(|| std::path::Path::new(""));

    let mut external = HashMap::new();
    for uri in external_buffer_uris(path, &data)? {
        let bytes = read(base.join(&uri).as_path())?;
        external.insert(uri, bytes);
    }
    load_gltf_with_buffers(path, &data, &external)
}

/// Stand-in shown when the model cannot be loaded: a car-sized box
pub fn placeholder_model() -> SceneGraph {
    let mut graph = SceneGraph::new();
    let id = graph.add_node("Placeholder", None, Transform::default());
    graph.set_mesh(
        id,
        MeshInfo::cuboid(Aabb::from_center_half_extents(
            Vec3::new(0.0, 0.7, 0.0),
            Vec3::new(2.4, 0.7, 0.95),
        )),
    );
    graph
}

fn load_node(
    graph: &mut SceneGraph,
    node: &gltf::Node<'_>,
    parent: Option<NodeId>,
    buffers: &[Vec<u8>],
) {
    let (translation, rotation, scale) = node.transform().decomposed();
    let name = node
        .name()
        .map(String::from)
        .unwrap_or_else(|| format!("node{}", node.index()));

    let id = graph.add_node(
        &name,
        parent,
        Transform::from_decomposed(translation, rotation, scale),
    );

    if let Some(mesh) = node.mesh() {
        if let Some(info) = mesh_info(&mesh, buffers) {
            graph.set_mesh(id, info);
        } else {
            log::warn!("Mesh on node '{}' has no position bounds, it cannot be picked", name);
        }
    }

    for child in node.children() {
        load_node(graph, &child, Some(id), buffers);
    }
}

/// Bounds are the union of every primitive's POSITION min/max, or of its
/// vertices when the accessor omits them
fn mesh_info(mesh: &gltf::Mesh<'_>, buffers: &[Vec<u8>]) -> Option<MeshInfo> {
    let mut bounds: Option<Aabb> = None;
    let mut primitives = Vec::new();

    for primitive in mesh.primitives() {
        let geometry = read_geometry(&primitive, buffers);
        let declared = primitive.get(&gltf::Semantic::Positions).and_then(|positions| {
            let min = positions.min().as_ref().and_then(json_vec3)?;
            let max = positions.max().as_ref().and_then(json_vec3)?;
            Some(Aabb::new(min, max))
        });

        if let Some(b) = declared.or_else(|| geometry.as_ref().and_then(MeshGeometry::bounds)) {
            bounds = Some(match bounds {
                Some(acc) => Aabb::new(acc.min.min(b.min), acc.max.max(b.max)),
                None => b,
            });
        }

        primitives.push(Primitive {
            material_name: primitive.material().name().map(String::from),
            slot: None,
            geometry,
        });
    }

    bounds.map(|bounds| MeshInfo {
        bounds,
        primitives,
        polygon_offset: None,
    })
}

/// Whether every element an accessor addresses lies inside its buffer
fn accessor_in_bounds(accessor: &gltf::Accessor<'_>, buffers: &[Vec<u8>]) -> bool {
    if accessor.sparse().is_some() {
        return false;
    }
    let Some(view) = accessor.view() else {
        return false;
    };
    let Some(buffer) = buffers.get(view.buffer().index()) else {
        return false;
    };
    let view_end = view.offset() + view.length();
    if view_end > buffer.len() {
        return false;
    }
    if accessor.count() == 0 {
        return true;
    }
    let stride = view.stride().unwrap_or(accessor.size());
    let last = accessor.offset() + stride * (accessor.count() - 1) + accessor.size();
    last <= view.length()
}

/// Triangles of a primitive, if it is a triangle list with readable data
fn read_geometry(primitive: &gltf::Primitive<'_>, buffers: &[Vec<u8>]) -> Option<MeshGeometry> {
    if primitive.mode() != gltf::mesh::Mode::Triangles {
        return None;
    }
    let positions = primitive.get(&gltf::Semantic::Positions)?;
    if !accessor_in_bounds(&positions, buffers) {
        return None;
    }
    if let Some(indices) = primitive.indices() {
        if !accessor_in_bounds(&indices, buffers) {
            log::warn!("Primitive {} has unreadable indices", primitive.index());
            return None;
        }
    }

    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));
    let positions: Vec<Vec3> = reader.read_positions()?.map(Vec3::from).collect();
    let indices: Vec<u32> = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..positions.len() as u32).collect(),
    };

    let mut geometry = MeshGeometry::from_indices(positions, &indices);
    geometry.double_sided = primitive.material().double_sided();
    Some(geometry)
}

fn json_vec3(value: &gltf::json::Value) -> Option<Vec3> {
    let values = value.as_array()?;
    if values.len() != 3 {
        return None;
    }
    let x = values[0].as_f64()? as f32;
    let y = values[1].as_f64()? as f32;
    let z = values[2].as_f64()? as f32;
    Some(Vec3::new(x, y, z))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOOR_MODEL: &str = r#"{
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [ { "nodes": [0] } ],
        "nodes": [
            { "name": "Body", "children": [1], "mesh": 0 },
            { "name": "DoorFLAxes", "translation": [1.0, 0.5, 0.9], "children": [2] },
            { "name": "Plane023", "mesh": 1 }
        ],
        "meshes": [
            { "primitives": [
                { "attributes": { "POSITION": 0 }, "material": 0 },
                { "attributes": { "POSITION": 1 }, "material": 1 }
            ] },
            { "primitives": [ { "attributes": { "POSITION": 1 } } ] }
        ],
        "materials": [ { "name": "Car Paint" }, { "name": "Glass" } ],
        "accessors": [
            { "componentType": 5126, "count": 3, "type": "VEC3",
              "min": [-2.0, 0.0, -1.0], "max": [2.0, 1.0, 1.0] },
            { "componentType": 5126, "count": 3, "type": "VEC3",
              "min": [-0.5, 0.0, -0.1], "max": [0.5, 1.4, 0.1] }
        ]
    }"#;

    #[test]
    fn loads_names_hierarchy_and_materials() {
        let graph = load_gltf_slice("door.gltf", DOOR_MODEL.as_bytes()).unwrap();
        assert_eq!(graph.len(), 3);

        let hinge = graph.find_by_name("DoorFLAxes").unwrap();
        let handle = graph.find_by_name("Plane023").unwrap();
        assert_eq!(graph.node(handle).unwrap().parent, Some(hinge));
        assert_eq!(
            graph.node(hinge).unwrap().transform.position,
            Vec3::new(1.0, 0.5, 0.9)
        );

        let body = graph.find_by_name("Body").unwrap();
        let mesh = graph.node(body).unwrap().mesh.as_ref().unwrap();
        let materials: Vec<_> = mesh
            .primitives
            .iter()
            .map(|p| p.material_name.as_deref())
            .collect();
        assert_eq!(materials, vec![Some("Car Paint"), Some("Glass")]);
        assert_eq!(mesh.bounds.min, Vec3::new(-2.0, 0.0, -1.0));
        assert_eq!(mesh.bounds.max, Vec3::new(2.0, 1.4, 1.0));
    }

    const TRIANGLE_MODEL: &str = r#"{
        "asset": { "version": "2.0" },
        "scenes": [ { "nodes": [0] } ],
        "nodes": [ { "name": "Plane023", "mesh": 0 } ],
        "meshes": [ { "primitives": [ { "attributes": { "POSITION": 0 }, "indices": 1 } ] } ],
        "buffers": [ { "uri": "handle.bin", "byteLength": 42 } ],
        "bufferViews": [
            { "buffer": 0, "byteOffset": 0, "byteLength": 36 },
            { "buffer": 0, "byteOffset": 36, "byteLength": 6 }
        ],
        "accessors": [
            { "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
              "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] },
            { "bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR" }
        ]
    }"#;

    fn triangle_buffer() -> Vec<u8> {
        let positions: [f32; 9] = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        let indices: [u16; 3] = [0, 1, 2];
        let mut bytes: Vec<u8> = positions.iter().flat_map(|v| v.to_le_bytes()).collect();
        bytes.extend(indices.iter().flat_map(|i| i.to_le_bytes()));
        bytes
    }

    #[test]
    fn lists_external_buffers() {
        let uris = external_buffer_uris("handle.gltf", TRIANGLE_MODEL.as_bytes()).unwrap();
        assert_eq!(uris, vec!["handle.bin".to_string()]);
        assert!(external_buffer_uris("door.gltf", DOOR_MODEL.as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn reads_triangles_from_external_buffer() {
        let external = HashMap::from([("handle.bin".to_string(), triangle_buffer())]);
        let graph =
            load_gltf_with_buffers("handle.gltf", TRIANGLE_MODEL.as_bytes(), &external).unwrap();

        let handle = graph.find_by_name("Plane023").unwrap();
        let mesh = graph.node(handle).unwrap().mesh.as_ref().unwrap();
        let geometry = mesh.primitives[0].geometry.as_ref().unwrap();
        assert_eq!(geometry.triangles, vec![[0, 1, 2]]);
        assert_eq!(geometry.positions[1], Vec3::X);
        assert!(!geometry.double_sided);
        assert!(mesh.has_geometry());
    }

    #[test]
    fn missing_external_buffer_is_asset_error() {
        let err = load_gltf_slice("handle.gltf", TRIANGLE_MODEL.as_bytes()).unwrap_err();
        assert!(matches!(err, ViewerError::AssetLoad { ref reason, .. } if reason.contains("handle.bin")));
    }

    #[test]
    fn truncated_buffer_is_asset_error() {
        let mut bytes = triangle_buffer();
        bytes.truncate(30);
        let external = HashMap::from([("handle.bin".to_string(), bytes)]);
        let result = load_gltf_with_buffers("handle.gltf", TRIANGLE_MODEL.as_bytes(), &external);
        assert!(matches!(result, Err(ViewerError::AssetLoad { .. })));
    }

    #[test]
    fn malformed_document_is_asset_error() {
        let err = load_gltf_slice("broken.gltf", b"{ not json").unwrap_err();
        assert!(matches!(err, ViewerError::AssetLoad { ref path, .. } if path == "broken.gltf"));
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn missing_file_is_asset_error() {
        let err = load_gltf_file("does/not/exist.gltf").unwrap_err();
        assert!(matches!(err, ViewerError::AssetLoad { .. }));
    }

    #[test]
    fn placeholder_is_pickable() {
        let graph = placeholder_model();
        assert_eq!(graph.mesh_nodes().count(), 1);
        let id = graph.find_by_name("Placeholder").unwrap();
        assert!(graph.node(id).unwrap().mesh.as_ref().unwrap().has_geometry());
    }
}
