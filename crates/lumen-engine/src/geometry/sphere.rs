use std::f32::consts::PI;

use super::{Mesh, MeshError, Vertex};

/// Builds a unit UV-sphere.
///
/// The polar angle φ runs from the north pole (+Y) to the south pole in `stacks`
/// steps; the azimuth θ runs a full turn in `slices` steps. The seam column is
/// duplicated (j = 0 and j = slices share a position) so UVs never wrap.
///
/// Produces `(stacks + 1) * (slices + 1)` vertices and `stacks * slices * 6`
/// indices. Triangles touching the poles are degenerate and kept as-is.
pub fn uv_sphere(stacks: u32, slices: u32) -> Result<Mesh, MeshError> {
    if stacks == 0 {
        return Err(MeshError::ZeroStacks);
    }
    if slices == 0 {
        return Err(MeshError::ZeroSlices);
    }

    let ring = slices as u64 + 1;
    let vertex_count = (stacks as u64 + 1)
        .checked_mul(ring)
        .filter(|&n| n <= u32::MAX as u64)
        .ok_or(MeshError::TooManyVertices { stacks, slices })?;
    let index_count = (stacks as u64 * slices as u64)
        .checked_mul(6)
        .filter(|&n| n <= u32::MAX as u64)
        .ok_or(MeshError::TooManyIndices { stacks, slices })?;

    let mut vertices = Vec::with_capacity(vertex_count as usize);
    for i in 0..=stacks {
        let t = i as f32 / stacks as f32;
        let phi = t * PI;
        let (sin_phi, cos_phi) = phi.sin_cos();

        for j in 0..=slices {
            let s = j as f32 / slices as f32;
            let theta = s * 2.0 * PI;
            let (sin_theta, cos_theta) = theta.sin_cos();

            let position = [sin_phi * cos_theta, cos_phi, sin_phi * sin_theta];

            vertices.push(Vertex {
                position,
                normal: normalize(position),
                uv: [s, 1.0 - t],
            });
        }
    }

    let ring = ring as u32;
    let mut indices = Vec::with_capacity(index_count as usize);
    for i in 0..stacks {
        for j in 0..slices {
            let a = i * ring + j;
            let b = (i + 1) * ring + j;
            let c = b + 1;
            let d = a + 1;
            // Counter-clockwise seen from outside.
            indices.extend_from_slice(&[a, c, b, a, d, c]);
        }
    }

    log::debug!(
        "built uv sphere {stacks}x{slices}: {} vertices, {} indices",
        vertices.len(),
        indices.len()
    );

    Ok(Mesh::from_parts(vertices, indices))
}

/// Unit sphere positions have length 1 analytically; renormalizing absorbs
/// the rounding of `sin`/`cos` so normals are exactly unit length.
fn normalize(v: [f32; 3]) -> [f32; 3] {
    let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    if len <= f32::EPSILON {
        return v;
    }
    [v[0] / len, v[1] / len, v[2] / len]
}
