//! Vertex sets of the five regular polyhedra.
//!
//! Purpose
//! - Exact, symmetric microphone layouts for the counts 4, 6, 8, 12 and 20.
//! - Raw coordinates are the textbook closed forms (golden ratio `φ` for the
//!   icosahedron and dodecahedron); `calc_coordinates` projects them to the
//!   sphere of the requested radius.

use nalgebra::Vector3;

/// Golden ratio.
const PHI: f64 = 1.618_033_988_749_895;
/// `1/φ = φ − 1`.
const INV_PHI: f64 = PHI - 1.0;

/// Catalog entry, keyed by vertex count.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlatonicSolid {
    Tetrahedron,
    Octahedron,
    Cube,
    Icosahedron,
    Dodecahedron,
}

impl PlatonicSolid {
    pub const ALL: [PlatonicSolid; 5] = [
        PlatonicSolid::Tetrahedron,
        PlatonicSolid::Octahedron,
        PlatonicSolid::Cube,
        PlatonicSolid::Icosahedron,
        PlatonicSolid::Dodecahedron,
    ];

    /// Lookup by microphone count.
    pub fn from_vertex_count(n: usize) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.vertex_count() == n)
    }

    pub fn vertex_count(self) -> usize {
        match self {
            Self::Tetrahedron => 4,
            Self::Octahedron => 6,
            Self::Cube => 8,
            Self::Icosahedron => 12,
            Self::Dodecahedron => 20,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Tetrahedron => "tetrahedron",
            Self::Octahedron => "octahedron",
            Self::Cube => "cube",
            Self::Icosahedron => "icosahedron",
            Self::Dodecahedron => "dodecahedron",
        }
    }

    /// Unnormalized vertex coordinates.
    pub fn raw_vertices(self) -> Vec<Vector3<f64>> {
        let rows: &[[f64; 3]] = match self {
            Self::Tetrahedron => &[
                [1.0, 1.0, 1.0],
                [1.0, -1.0, -1.0],
                [-1.0, 1.0, -1.0],
                [-1.0, -1.0, 1.0],
            ],
            Self::Octahedron => &[
                [1.0, 0.0, 0.0],
                [0.0, 1.0, 0.0],
                [-1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0],
                [0.0, -1.0, 0.0],
                [0.0, 0.0, -1.0],
            ],
            Self::Cube => &[
                [1.0, 1.0, 1.0],
                [1.0, 1.0, -1.0],
                [1.0, -1.0, -1.0],
                [1.0, -1.0, 1.0],
                [-1.0, -1.0, 1.0],
                [-1.0, -1.0, -1.0],
                [-1.0, 1.0, -1.0],
                [-1.0, 1.0, 1.0],
            ],
            Self::Icosahedron => &[
                [0.0, 1.0, PHI],
                [0.0, 1.0, -PHI],
                [0.0, -1.0, PHI],
                [0.0, -1.0, -PHI],
                [1.0, PHI, 0.0],
                [1.0, -PHI, 0.0],
                [-1.0, PHI, 0.0],
                [-1.0, -PHI, 0.0],
                [PHI, 0.0, 1.0],
                [PHI, 0.0, -1.0],
                [-PHI, 0.0, 1.0],
                [-PHI, 0.0, -1.0],
            ],
            Self::Dodecahedron => &[
                [1.0, 1.0, 1.0],
                [1.0, 1.0, -1.0],
                [1.0, -1.0, 1.0],
                [1.0, -1.0, -1.0],
                [-1.0, 1.0, 1.0],
                [-1.0, 1.0, -1.0],
                [-1.0, -1.0, 1.0],
                [-1.0, -1.0, -1.0],
                [0.0, INV_PHI, PHI],
                [0.0, INV_PHI, -PHI],
                [0.0, -INV_PHI, PHI],
                [0.0, -INV_PHI, -PHI],
                [INV_PHI, PHI, 0.0],
                [INV_PHI, -PHI, 0.0],
                [-INV_PHI, PHI, 0.0],
                [-INV_PHI, -PHI, 0.0],
                [PHI, 0.0, INV_PHI],
                [PHI, 0.0, -INV_PHI],
                [-PHI, 0.0, INV_PHI],
                [-PHI, 0.0, -INV_PHI],
            ],
        };
        rows.iter().map(|r| Vector3::new(r[0], r[1], r[2])).collect()
    }

    /// Vertices projected onto the sphere of radius `radius`.
    pub fn calc_coordinates(self, radius: f64) -> Vec<Vector3<f64>> {
        self.raw_vertices()
            .into_iter()
            .map(|v| v.normalize() * radius)
            .collect()
    }
}

/// True for the counts that have an exact regular layout.
pub fn is_platonic_number(n: usize) -> bool {
    PlatonicSolid::from_vertex_count(n).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Sorted pairwise distances; invariant under rotation.
    fn distance_profile(pts: &[Vector3<f64>]) -> Vec<f64> {
        let mut d = Vec::new();
        for i in 0..pts.len() {
            for j in i + 1..pts.len() {
                d.push((pts[i] - pts[j]).norm());
            }
        }
        d.sort_by(|a, b| a.partial_cmp(b).unwrap());
        d
    }

    #[test]
    fn lookup_by_count() {
        for n in 0..30 {
            let expected = matches!(n, 4 | 6 | 8 | 12 | 20);
            assert_eq!(is_platonic_number(n), expected, "n = {n}");
        }
        assert_eq!(
            PlatonicSolid::from_vertex_count(12),
            Some(PlatonicSolid::Icosahedron)
        );
        assert_eq!(PlatonicSolid::from_vertex_count(5), None);
    }

    #[test]
    fn vertices_lie_on_requested_sphere() {
        for solid in PlatonicSolid::ALL {
            for r in [0.08, 1.0, 3.5] {
                let pts = solid.calc_coordinates(r);
                assert_eq!(pts.len(), solid.vertex_count(), "{}", solid.name());
                for p in &pts {
                    assert!((p.norm() - r).abs() < 1e-12, "{}", solid.name());
                }
            }
        }
    }

    #[test]
    fn layouts_are_centered() {
        for solid in PlatonicSolid::ALL {
            let c: Vector3<f64> = solid.calc_coordinates(1.0).iter().sum();
            assert!(c.norm() < 1e-12, "{}", solid.name());
        }
    }

    #[test]
    fn edges_are_regular() {
        // Number of shortest pairwise distances equals the edge count.
        let edges = [
            (PlatonicSolid::Tetrahedron, 6),
            (PlatonicSolid::Octahedron, 12),
            (PlatonicSolid::Cube, 12),
            (PlatonicSolid::Icosahedron, 30),
            (PlatonicSolid::Dodecahedron, 30),
        ];
        for (solid, count) in edges {
            let d = distance_profile(&solid.calc_coordinates(1.0));
            let shortest = d[0];
            let n_short = d.iter().filter(|&&x| (x - shortest).abs() < 1e-9).count();
            assert_eq!(n_short, count, "{}", solid.name());
        }
    }
}
