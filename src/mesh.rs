//! Stone template mesh.
//!
//! Every stone is drawn with the same mesh, instanced per stone. The mesh is
//! either a procedural rock or a Wavefront OBJ file, built off the render
//! thread by [`MeshLoad`]. The simulation never waits on it.

use crate::error::MeshError;
use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

const MAX_SUBDIVISIONS: u32 = 4;

/// Vertex layout shared with the render shader (locations 0 and 1).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// Flat-shaded triangle mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct StoneMesh {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl StoneMesh {
    /// Lumpy, slightly flattened icosphere of roughly unit radius.
    ///
    /// `subdivisions` is clamped to 4. `roughness` is the fraction of the
    /// radius each corner may move in or out.
    pub fn rock(subdivisions: u32, roughness: f32, seed: u64) -> Self {
        let (mut positions, mut triangles) = icosahedron();
        for _ in 0..subdivisions.min(MAX_SUBDIVISIONS) {
            subdivide(&mut positions, &mut triangles);
        }

        let mut rng = SmallRng::seed_from_u64(seed);
        let roughness = roughness.clamp(0.0, 0.9);
        for p in &mut positions {
            let radius = 1.0 + roughness * (rng.gen::<f32>() * 2.0 - 1.0);
            *p = p.normalize() * radius * Vec3::new(1.0, 0.7, 1.0);
        }

        flat_shaded(&positions, &triangles)
    }

    /// Parse OBJ text. Only `v` and `f` records are used; others are skipped.
    pub fn from_obj_str(source: &str) -> Result<Self, MeshError> {
        let mut positions: Vec<Vec3> = Vec::new();
        let mut triangles: Vec<[u32; 3]> = Vec::new();

        for (n, line) in source.lines().enumerate() {
            let line_no = n + 1;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut parts = line.split_whitespace();
            match parts.next() {
                Some("v") => {
                    let coords = parts
                        .take(3)
                        .map(|s| parse_f32(s, line_no))
                        .collect::<Result<Vec<_>, _>>()?;
                    if coords.len() < 3 {
                        return Err(parse_error(line_no, "vertex needs three coordinates"));
                    }
                    positions.push(Vec3::new(coords[0], coords[1], coords[2]));
                }
                Some("f") => {
                    let corners = parts
                        .map(|s| parse_face_index(s, positions.len(), line_no))
                        .collect::<Result<Vec<_>, _>>()?;
                    if corners.len() < 3 {
                        return Err(parse_error(line_no, "face needs at least three vertices"));
                    }
                    // Fan triangulation; fine for the convex faces exporters write.
                    for i in 1..corners.len() - 1 {
                        triangles.push([corners[0], corners[i], corners[i + 1]]);
                    }
                }
                _ => {}
            }
        }

        if triangles.is_empty() {
            return Err(MeshError::Empty);
        }
        Ok(flat_shaded(&positions, &triangles))
    }

    /// Read and parse an OBJ file.
    pub fn load_obj(path: impl AsRef<Path>) -> Result<Self, MeshError> {
        let source = fs::read_to_string(path)?;
        Self::from_obj_str(&source)
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

fn parse_error(line: usize, message: impl Into<String>) -> MeshError {
    MeshError::Parse {
        line,
        message: message.into(),
    }
}

fn parse_f32(s: &str, line: usize) -> Result<f32, MeshError> {
    match s.parse::<f32>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(parse_error(line, format!("bad number '{}'", s))),
    }
}

/// Resolve `i`, `i/t`, `i//n` or `i/t/n` to a zero-based position index.
/// Negative indices count back from the last vertex seen so far.
fn parse_face_index(token: &str, vertex_count: usize, line: usize) -> Result<u32, MeshError> {
    let raw = token.split('/').next().unwrap_or("");
    let index: i64 = raw
        .parse()
        .map_err(|_| parse_error(line, format!("bad face index '{}'", token)))?;

    let resolved = if index > 0 {
        index - 1
    } else if index < 0 {
        vertex_count as i64 + index
    } else {
        -1
    };

    if resolved < 0 || resolved >= vertex_count as i64 {
        return Err(parse_error(
            line,
            format!("face index {} out of range ({} vertices)", index, vertex_count),
        ));
    }
    Ok(resolved as u32)
}

fn icosahedron() -> (Vec<Vec3>, Vec<[u32; 3]>) {
    let t = (1.0 + 5.0_f32.sqrt()) / 2.0;
    let positions = vec![
        Vec3::new(-1.0, t, 0.0),
        Vec3::new(1.0, t, 0.0),
        Vec3::new(-1.0, -t, 0.0),
        Vec3::new(1.0, -t, 0.0),
        Vec3::new(0.0, -1.0, t),
        Vec3::new(0.0, 1.0, t),
        Vec3::new(0.0, -1.0, -t),
        Vec3::new(0.0, 1.0, -t),
        Vec3::new(t, 0.0, -1.0),
        Vec3::new(t, 0.0, 1.0),
        Vec3::new(-t, 0.0, -1.0),
        Vec3::new(-t, 0.0, 1.0),
    ]
    .into_iter()
    .map(Vec3::normalize)
    .collect();

    let triangles = vec![
        [0, 11, 5], [0, 5, 1], [0, 1, 7], [0, 7, 10], [0, 10, 11],
        [1, 5, 9], [5, 11, 4], [11, 10, 2], [10, 7, 6], [7, 1, 8],
        [3, 9, 4], [3, 4, 2], [3, 2, 6], [3, 6, 8], [3, 8, 9],
        [4, 9, 5], [2, 4, 11], [6, 2, 10], [8, 6, 7], [9, 8, 1],
    ];

    (positions, triangles)
}

/// Split every triangle into four, sharing midpoints between neighbors.
fn subdivide(positions: &mut Vec<Vec3>, triangles: &mut Vec<[u32; 3]>) {
    let mut cache: HashMap<(u32, u32), u32> = HashMap::new();
    let mut next = Vec::with_capacity(triangles.len() * 4);
    for &[a, b, c] in triangles.iter() {
        let ab = midpoint(&mut cache, positions, a, b);
        let bc = midpoint(&mut cache, positions, b, c);
        let ca = midpoint(&mut cache, positions, c, a);
        next.push([a, ab, ca]);
        next.push([b, bc, ab]);
        next.push([c, ca, bc]);
        next.push([ab, bc, ca]);
    }
    *triangles = next;
}

fn midpoint(cache: &mut HashMap<(u32, u32), u32>, positions: &mut Vec<Vec3>, a: u32, b: u32) -> u32 {
    *cache.entry((a.min(b), a.max(b))).or_insert_with(|| {
        let mid = ((positions[a as usize] + positions[b as usize]) * 0.5).normalize();
        positions.push(mid);
        (positions.len() - 1) as u32
    })
}

/// Unshared vertices with one face normal per triangle.
fn flat_shaded(positions: &[Vec3], triangles: &[[u32; 3]]) -> StoneMesh {
    let mut vertices = Vec::with_capacity(triangles.len() * 3);
    for tri in triangles {
        let [a, b, c] = tri.map(|i| positions[i as usize]);
        let normal = (b - a).cross(c - a).normalize_or_zero();
        for p in [a, b, c] {
            vertices.push(MeshVertex {
                position: p.to_array(),
                normal: normal.to_array(),
            });
        }
    }
    let indices = (0..vertices.len() as u32).collect();
    StoneMesh { vertices, indices }
}

/// Where the stone template comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum MeshSource {
    Procedural { subdivisions: u32, roughness: f32, seed: u64 },
    Obj(PathBuf),
}

impl MeshSource {
    /// OBJ file when a path is given, otherwise the default procedural rock.
    pub fn from_path(path: Option<&Path>) -> Self {
        match path {
            Some(path) => MeshSource::Obj(path.to_path_buf()),
            None => MeshSource::Procedural {
                subdivisions: 1,
                roughness: 0.25,
                seed: 7,
            },
        }
    }

    pub fn build(&self) -> Result<StoneMesh, MeshError> {
        match self {
            MeshSource::Procedural {
                subdivisions,
                roughness,
                seed,
            } => Ok(StoneMesh::rock(*subdivisions, *roughness, *seed)),
            MeshSource::Obj(path) => StoneMesh::load_obj(path),
        }
    }
}

/// Result of polling a [`MeshLoad`].
#[derive(Debug)]
pub enum LoadState {
    /// Still building.
    Pending,
    /// Finished; the mesh is handed over exactly once.
    Ready(StoneMesh),
    /// Failed; reported exactly once.
    Failed(MeshError),
    /// The result was already taken by an earlier poll.
    Done,
}

/// Background build of the stone template.
pub struct MeshLoad {
    receiver: Option<Receiver<Result<StoneMesh, MeshError>>>,
    failed_to_start: Option<MeshError>,
}

impl MeshLoad {
    /// Start building `source` on a worker thread.
    pub fn spawn(source: MeshSource) -> Self {
        let (tx, rx) = mpsc::channel();
        let spawned = thread::Builder::new()
            .name("stone-mesh".into())
            .spawn(move || {
                // The receiver may be gone if the window closed first.
                let _ = tx.send(source.build());
            });

        match spawned {
            Ok(_) => Self {
                receiver: Some(rx),
                failed_to_start: None,
            },
            Err(e) => Self {
                receiver: None,
                failed_to_start: Some(MeshError::Io(e)),
            },
        }
    }

    /// Check for a result without blocking.
    pub fn poll(&mut self) -> LoadState {
        if let Some(err) = self.failed_to_start.take() {
            return LoadState::Failed(err);
        }
        let Some(rx) = &self.receiver else {
            return LoadState::Done;
        };
        match rx.try_recv() {
            Err(TryRecvError::Empty) => LoadState::Pending,
            Err(TryRecvError::Disconnected) => {
                self.receiver = None;
                LoadState::Failed(MeshError::Disconnected)
            }
            Ok(result) => {
                self.receiver = None;
                match result {
                    Ok(mesh) => LoadState::Ready(mesh),
                    Err(e) => LoadState::Failed(e),
                }
            }
        }
    }

    /// Block until the result arrives.
    pub fn wait(mut self) -> Result<StoneMesh, MeshError> {
        if let Some(err) = self.failed_to_start.take() {
            return Err(err);
        }
        match self.receiver.take() {
            Some(rx) => rx.recv().map_err(|_| MeshError::Disconnected)?,
            None => Err(MeshError::Disconnected),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CUBE_OBJ: &str = "\
# unit cube
v -1 -1 -1
v 1 -1 -1
v 1 1 -1
v -1 1 -1
v -1 -1 1
v 1 -1 1
v 1 1 1
v -1 1 1
vn 0 0 1
f 1 4 3 2
f 5 6 7 8
f 1 2 6 5
f 2 3 7 6
f 3 4 8 7
f 4//1 1//1 5//1 8//1
";

    #[test]
    fn test_rock_triangle_counts() {
        assert_eq!(StoneMesh::rock(0, 0.2, 1).triangle_count(), 20);
        assert_eq!(StoneMesh::rock(1, 0.2, 1).triangle_count(), 80);
        // Clamped.
        assert_eq!(StoneMesh::rock(9, 0.2, 1).triangle_count(), 20 * 4usize.pow(4));
    }

    #[test]
    fn test_rock_is_seeded() {
        assert_eq!(StoneMesh::rock(1, 0.3, 5), StoneMesh::rock(1, 0.3, 5));
        assert_ne!(StoneMesh::rock(1, 0.3, 5), StoneMesh::rock(1, 0.3, 6));
    }

    #[test]
    fn test_rock_normals_point_outward() {
        let mesh = StoneMesh::rock(1, 0.2, 3);
        for tri in mesh.vertices.chunks(3) {
            let centroid = tri
                .iter()
                .map(|v| Vec3::from_array(v.position))
                .sum::<Vec3>()
                / 3.0;
            let normal = Vec3::from_array(tri[0].normal);
            assert!(normal.dot(centroid) > 0.0);
        }
    }

    #[test]
    fn test_obj_cube() {
        let mesh = StoneMesh::from_obj_str(CUBE_OBJ).unwrap();
        assert_eq!(mesh.triangle_count(), 12);
        assert_eq!(mesh.vertices.len(), 36);
    }

    #[test]
    fn test_obj_negative_indices() {
        let mesh = StoneMesh::from_obj_str("v 0 0 0\nv 1 0 0\nv 0 1 0\nf -3 -2 -1\n").unwrap();
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.vertices[1].position, [1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_obj_errors() {
        assert!(matches!(StoneMesh::from_obj_str("v 0 0 0\n"), Err(MeshError::Empty)));
        assert!(matches!(
            StoneMesh::from_obj_str("v 0 0 0\nv 1 0 0\nf 1 2 3\n"),
            Err(MeshError::Parse { line: 3, .. })
        ));
        assert!(matches!(
            StoneMesh::from_obj_str("v 0 zero 0\n"),
            Err(MeshError::Parse { line: 1, .. })
        ));
        assert!(matches!(
            StoneMesh::from_obj_str("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2\n"),
            Err(MeshError::Parse { line: 4, .. })
        ));
    }

    #[test]
    fn test_load_in_background() {
        let load = MeshLoad::spawn(MeshSource::from_path(None));
        let mesh = load.wait().unwrap();
        assert_eq!(mesh.triangle_count(), 80);
    }

    #[test]
    fn test_poll_reports_failure_once() {
        let mut load = MeshLoad::spawn(MeshSource::Obj(PathBuf::from("/definitely/not/here.obj")));
        let state = loop {
            match load.poll() {
                LoadState::Pending => thread::yield_now(),
                other => break other,
            }
        };
        assert!(matches!(state, LoadState::Failed(MeshError::Io(_))));
        assert!(matches!(load.poll(), LoadState::Done));
    }
}
