use ember_engine::render::Vertex2;

/// Unit quad centered at the origin.
pub const QUAD_VERTICES: [Vertex2; 4] = [
    Vertex2 { pos: [-0.5, -0.5] },
    Vertex2 { pos: [0.5, -0.5] },
    Vertex2 { pos: [0.5, 0.5] },
    Vertex2 { pos: [-0.5, 0.5] },
];

/// Two triangles covering the quad.
pub const QUAD_INDICES: [u16; 6] = [0, 1, 2, 2, 3, 0];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draws_exactly_six_indices() {
        assert_eq!(QUAD_INDICES.len(), 6);
    }

    #[test]
    fn indices_reference_every_vertex() {
        for v in 0..QUAD_VERTICES.len() as u16 {
            assert!(QUAD_INDICES.contains(&v));
        }
    }

    #[test]
    fn quad_is_a_unit_square_centered_at_origin() {
        for v in QUAD_VERTICES {
            assert_eq!(v.pos[0].abs(), 0.5);
            assert_eq!(v.pos[1].abs(), 0.5);
        }
    }
}
