use crate::galaxy::ParticleBuffer;
use bevy::{
    prelude::*,
    render::{mesh::Indices, render_asset::RenderAssetUsages, render_resource::PrimitiveTopology},
};
use rayon::prelude::*;

// Billboard corners, expanded around the particle position in the vertex shader
const CORNERS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

/// Packs a particle buffer into a vertex buffer of camera-facing quads.
pub fn particle_mesh(buffer: &ParticleBuffer) -> Mesh {
    let positions: Vec<[f32; 3]> = buffer
        .positions
        .par_iter()
        .flat_map_iter(|p| [*p; 4])
        .collect();
    let corners = CORNERS.repeat(buffer.len());
    let indices: Vec<u32> = (0..buffer.len() as u32)
        .into_par_iter()
        .flat_map_iter(|i| {
            let v = i * 4;
            [v, v + 1, v + 2, v, v + 2, v + 3]
        })
        .collect();

    let mut mesh = Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::RENDER_WORLD,
    )
    .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
    .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, corners)
    .with_inserted_indices(Indices::U32(indices));

    if let Some(colors) = &buffer.colors {
        let colors: Vec<[f32; 4]> = colors
            .par_iter()
            .flat_map_iter(|&[r, g, b]| [[r, g, b, 1.0]; 4])
            .collect();
        mesh.insert_attribute(Mesh::ATTRIBUTE_COLOR, colors);
    }

    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::render::mesh::VertexAttributeValues;

    #[test]
    fn every_particle_becomes_a_quad() {
        let buffer = ParticleBuffer {
            positions: vec![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]],
            colors: Some(vec![[1.0, 0.0, 0.0], [0.0, 0.0, 1.0]]),
        };
        let mesh = particle_mesh(&buffer);

        assert_eq!(mesh.count_vertices(), 8);
        assert_eq!(mesh.indices().map(Indices::len), Some(12));

        let Some(VertexAttributeValues::Float32x3(positions)) =
            mesh.attribute(Mesh::ATTRIBUTE_POSITION)
        else {
            panic!("missing positions");
        };
        assert!(positions[..4].iter().all(|p| *p == [1.0, 2.0, 3.0]));
        assert!(positions[4..].iter().all(|p| *p == [4.0, 5.0, 6.0]));

        let Some(VertexAttributeValues::Float32x4(colors)) = mesh.attribute(Mesh::ATTRIBUTE_COLOR)
        else {
            panic!("missing colors");
        };
        assert_eq!(colors[7], [0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn flat_buffers_have_no_color_attribute() {
        let buffer = ParticleBuffer {
            positions: vec![[0.0; 3]; 3],
            colors: None,
        };
        let mesh = particle_mesh(&buffer);
        assert!(mesh.attribute(Mesh::ATTRIBUTE_COLOR).is_none());
        assert_eq!(mesh.count_vertices(), 12);
    }
}
