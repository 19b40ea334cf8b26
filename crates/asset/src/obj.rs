//! OBJ text loader: positions, texture coordinates, normals and polygonal
//! faces. Materials, groups and smoothing directives are skipped.

use std::{
    collections::HashMap,
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
};

use anyhow::{Context, Result, anyhow, bail};

use crate::mesh::{MeshData, MeshVertex};

const DEFAULT_NORMAL: [f32; 3] = [0.0, 0.0, 1.0];
const DEFAULT_UV: [f32; 2] = [0.0, 0.0];

/// Load an OBJ mesh from a file path.
pub fn load_obj_from_path(path: impl AsRef<Path>) -> Result<MeshData> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open OBJ file: {}", path.display()))?;
    let mesh = load_obj_from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse OBJ file: {}", path.display()))?;
    log::info!(
        "Loaded mesh {:?}: {} vertices, {} triangles",
        path,
        mesh.vertices.len(),
        mesh.triangle_count()
    );
    Ok(mesh)
}

/// Load an OBJ mesh from any buffered reader.
pub fn load_obj_from_reader<R: BufRead>(reader: R) -> Result<MeshData> {
    let mut builder = ObjBuilder::default();
    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.with_context(|| format!("Failed to read line {line_no}"))?;
        builder.feed(&line, line_no)?;
    }
    builder.finish()
}

/// Parse OBJ source held in memory.
pub fn load_obj_from_str(contents: &str) -> Result<MeshData> {
    load_obj_from_reader(io::Cursor::new(contents))
}

/// Resolved `(position, texcoord, normal)` attribute indices of one face corner.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
struct Corner {
    position: usize,
    uv: Option<usize>,
    normal: Option<usize>,
}

#[derive(Default)]
struct ObjBuilder {
    positions: Vec<[f32; 3]>,
    uvs: Vec<[f32; 2]>,
    normals: Vec<[f32; 3]>,
    // corners seen so far -> output vertex index
    welded: HashMap<Corner, u32>,
    vertices: Vec<MeshVertex>,
    indices: Vec<u32>,
}

impl ObjBuilder {
    fn feed(&mut self, line: &str, line_no: usize) -> Result<()> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(());
        }

        let mut fields = trimmed.split_whitespace();
        let Some(tag) = fields.next() else {
            return Ok(());
        };

        match tag {
            "v" => {
                let p = floats::<3>(&mut fields, line_no, "vertex position")?;
                self.positions.push(p);
            }
            "vt" => {
                // a third (w) component is allowed and ignored
                let t = floats::<2>(&mut fields, line_no, "texture coordinate")?;
                self.uvs.push(t);
            }
            "vn" => {
                let n = floats::<3>(&mut fields, line_no, "vertex normal")?;
                self.normals.push(n);
            }
            "f" => self.face(fields, line_no)?,
            other => log::trace!("Skipping OBJ directive '{other}' on line {line_no}"),
        }
        Ok(())
    }

    fn face<'a>(&mut self, fields: impl Iterator<Item = &'a str>, line_no: usize) -> Result<()> {
        let mut polygon: Vec<u32> = Vec::with_capacity(4);
        for field in fields {
            let corner = self.corner(field, line_no)?;
            polygon.push(self.weld(corner, line_no)?);
        }

        if polygon.len() < 3 {
            bail!(
                "Face on line {line_no} has {} vertices, need at least 3",
                polygon.len()
            );
        }

        // fan around the first corner
        for pair in polygon[1..].windows(2) {
            self.indices.extend_from_slice(&[polygon[0], pair[0], pair[1]]);
        }
        Ok(())
    }

    fn corner(&self, field: &str, line_no: usize) -> Result<Corner> {
        let mut parts = field.split('/');
        let position = match parts.next() {
            Some(p) if !p.is_empty() => resolve(p, self.positions.len(), line_no)?,
            _ => bail!("Face element '{field}' on line {line_no} has no position index"),
        };
        let uv = match parts.next() {
            Some(t) if !t.is_empty() => Some(resolve(t, self.uvs.len(), line_no)?),
            _ => None,
        };
        let normal = match parts.next() {
            Some(n) if !n.is_empty() => Some(resolve(n, self.normals.len(), line_no)?),
            _ => None,
        };
        if parts.next().is_some() {
            bail!("Face element '{field}' on line {line_no} has too many components");
        }
        Ok(Corner {
            position,
            uv,
            normal,
        })
    }

    fn weld(&mut self, corner: Corner, line_no: usize) -> Result<u32> {
        if let Some(&index) = self.welded.get(&corner) {
            return Ok(index);
        }
        let index = u32::try_from(self.vertices.len())
            .map_err(|_| anyhow!("Too many vertices (line {line_no})"))?;
        self.vertices.push(MeshVertex::new(
            self.positions[corner.position],
            corner.normal.map_or(DEFAULT_NORMAL, |i| self.normals[i]),
            corner.uv.map_or(DEFAULT_UV, |i| self.uvs[i]),
        ));
        self.welded.insert(corner, index);
        Ok(index)
    }

    fn finish(self) -> Result<MeshData> {
        if self.indices.is_empty() {
            bail!("OBJ contained no faces");
        }
        Ok(MeshData::new(self.vertices, self.indices))
    }
}

fn floats<'a, const N: usize>(
    fields: &mut impl Iterator<Item = &'a str>,
    line_no: usize,
    what: &str,
) -> Result<[f32; N]> {
    let mut out = [0.0; N];
    for (axis, slot) in out.iter_mut().enumerate() {
        let token = fields
            .next()
            .ok_or_else(|| anyhow!("Missing {what} component {axis} on line {line_no}"))?;
        *slot = token
            .parse::<f32>()
            .with_context(|| format!("Invalid {what} component '{token}' on line {line_no}"))?;
    }
    Ok(out)
}

/// Turn a 1-based (or negative, relative) OBJ index into a 0-based one.
fn resolve(token: &str, len: usize, line_no: usize) -> Result<usize> {
    let raw: i64 = token
        .parse()
        .with_context(|| format!("Invalid index '{token}' on line {line_no}"))?;
    let resolved = match raw {
        0 => bail!("OBJ indices are 1-based; found 0 on line {line_no}"),
        r if r > 0 => r - 1,
        r => len as i64 + r,
    };
    if resolved < 0 || resolved as usize >= len {
        bail!("OBJ index {raw} out of range (have {len}) on line {line_no}");
    }
    Ok(resolved as usize)
}
