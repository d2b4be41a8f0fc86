use crate::error::StructuralDefect;

/// Face adjacency in compressed form: `neighbors[offsets[f]..offsets[f + 1]]`
/// lists the faces sharing at least one vertex with `f`, sorted, excluding `f`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Adjacency {
    offsets: Vec<u32>,
    neighbors: Vec<u32>,
}

impl Adjacency {
    /// Build from triangle faces: two faces are adjacent when they share a vertex.
    pub fn from_faces(faces: &[[u32; 3]], vertex_count: usize) -> Self {
        // vertex -> incident faces, also compressed
        let mut counts = vec![0u32; vertex_count + 1];
        for tri in faces {
            for &v in tri {
                counts[v as usize + 1] += 1;
            }
        }
        for i in 1..counts.len() {
            counts[i] += counts[i - 1];
        }
        let mut fill = counts.clone();
        let mut incident = vec![0u32; counts[vertex_count] as usize];
        for (f, tri) in faces.iter().enumerate() {
            for &v in tri {
                let slot = &mut fill[v as usize];
                incident[*slot as usize] = f as u32;
                *slot += 1;
            }
        }

        let mut offsets = Vec::with_capacity(faces.len() + 1);
        let mut neighbors = Vec::with_capacity(faces.len() * 12);
        let mut scratch: Vec<u32> = Vec::with_capacity(16);
        offsets.push(0);
        for (f, tri) in faces.iter().enumerate() {
            scratch.clear();
            for &v in tri {
                let lo = counts[v as usize] as usize;
                let hi = counts[v as usize + 1] as usize;
                scratch.extend(incident[lo..hi].iter().copied().filter(|&n| n != f as u32));
            }
            scratch.sort_unstable();
            scratch.dedup();
            neighbors.extend_from_slice(&scratch);
            offsets.push(neighbors.len() as u32);
        }

        Self { offsets, neighbors }
    }

    /// Build from explicit neighbor lists (e.g. from an external mesh provider).
    /// Lists are sorted and deduplicated; no validation is done here.
    pub fn from_lists(lists: &[Vec<u32>]) -> Self {
        let mut offsets = Vec::with_capacity(lists.len() + 1);
        let mut neighbors = Vec::new();
        offsets.push(0);
        for list in lists {
            let mut l = list.clone();
            l.sort_unstable();
            l.dedup();
            neighbors.extend(l);
            offsets.push(neighbors.len() as u32);
        }
        Self { offsets, neighbors }
    }

    /// Number of faces.
    pub fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn neighbors(&self, face: usize) -> &[u32] {
        let lo = self.offsets[face] as usize;
        let hi = self.offsets[face + 1] as usize;
        &self.neighbors[lo..hi]
    }

    #[inline]
    pub fn contains(&self, face: usize, other: u32) -> bool {
        self.neighbors(face).binary_search(&other).is_ok()
    }

    /// Number of directed (face, neighbor) entries.
    pub fn entry_count(&self) -> usize {
        self.neighbors.len()
    }

    /// First structural problem found, if any: out-of-range index, self loop,
    /// isolated face, or a one-sided neighbor relation.
    pub fn validate(&self) -> Result<(), StructuralDefect> {
        let n = self.len() as u32;
        for f in 0..self.len() {
            let list = self.neighbors(f);
            if list.is_empty() {
                return Err(StructuralDefect::IsolatedFace { face: f as u32 });
            }
            for &nb in list {
                if nb >= n {
                    return Err(StructuralDefect::NeighborOutOfRange {
                        face: f as u32,
                        neighbor: nb,
                    });
                }
                if nb == f as u32 {
                    return Err(StructuralDefect::SelfNeighbor { face: f as u32 });
                }
                if !self.contains(nb as usize, f as u32) {
                    return Err(StructuralDefect::AsymmetricAdjacency {
                        face: f as u32,
                        neighbor: nb,
                    });
                }
            }
        }
        Ok(())
    }

    /// Connected components, labelled `0..count` in order of lowest face index.
    pub fn components(&self) -> (Vec<u32>, usize) {
        let mut label = vec![u32::MAX; self.len()];
        let mut count = 0u32;
        let mut stack = Vec::new();
        for start in 0..self.len() {
            if label[start] != u32::MAX {
                continue;
            }
            label[start] = count;
            stack.push(start as u32);
            while let Some(f) = stack.pop() {
                for &nb in self.neighbors(f as usize) {
                    let slot = &mut label[nb as usize];
                    if *slot == u32::MAX {
                        *slot = count;
                        stack.push(nb);
                    }
                }
            }
            count += 1;
        }
        (label, count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::Mesh;

    #[test]
    fn icosphere_adjacency_is_symmetric_and_connected() {
        let mesh = Mesh::icosphere(1.0, 2);
        let adj = Adjacency::from_faces(&mesh.faces, mesh.vertices.len());
        assert_eq!(adj.len(), mesh.faces.len());
        assert_eq!(adj.validate(), Ok(()));
        for a in 0..adj.len() {
            for &b in adj.neighbors(a) {
                assert!(adj.contains(b as usize, a as u32));
            }
        }
        assert_eq!(adj.components().1, 1);
    }

    #[test]
    fn vertex_sharing_neighbor_counts() {
        // Each icosahedron face touches 3 edge neighbors + 6 vertex-only neighbors.
        let mesh = Mesh::icosahedron(1.0);
        let adj = Adjacency::from_faces(&mesh.faces, mesh.vertices.len());
        for f in 0..adj.len() {
            assert_eq!(adj.neighbors(f).len(), 9);
        }
    }

    #[test]
    fn detects_asymmetry() {
        let adj = Adjacency::from_lists(&[vec![1], vec![0, 2], vec![0]]);
        assert_eq!(
            adj.validate(),
            Err(StructuralDefect::AsymmetricAdjacency { face: 1, neighbor: 2 })
        );
    }

    #[test]
    fn detects_isolated_face_and_components() {
        let adj = Adjacency::from_lists(&[vec![1], vec![0], vec![]]);
        assert_eq!(adj.validate(), Err(StructuralDefect::IsolatedFace { face: 2 }));
        let (labels, count) = adj.components();
        assert_eq!(count, 2);
        assert_eq!(labels, vec![0, 0, 1]);
    }
}
