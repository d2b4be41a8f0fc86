use std::collections::VecDeque;

use crate::adjacency::Adjacency;

/// Faces grouped by craton: `members[c]` lists the faces assigned to craton `c`
/// in ascending order.
pub fn craton_members(assignment: &[u32], craton_count: usize) -> Vec<Vec<u32>> {
    let mut members = vec![Vec::new(); craton_count];
    for (face, &cid) in assignment.iter().enumerate() {
        if let Some(list) = members.get_mut(cid as usize) {
            list.push(face as u32);
        }
    }
    members
}

/// True if `face` has a neighbor owned by a different craton.
#[inline]
pub fn is_edge_face(adjacency: &Adjacency, assignment: &[u32], face: usize) -> bool {
    let cid = assignment[face];
    adjacency
        .neighbors(face)
        .iter()
        .any(|&nb| assignment[nb as usize] != cid)
}

/// Graph distance of each member face from the nearest edge face of its craton.
///
/// Multi-source BFS from every edge face, never leaving the craton. Returned
/// distances line up with `members`. Faces the BFS cannot reach (the craton has
/// no edge, or an interior pocket is cut off) get `None`.
pub fn edge_distances(
    adjacency: &Adjacency,
    assignment: &[u32],
    cid: u32,
    members: &[u32],
) -> Vec<Option<u32>> {
    // Members are sorted, so a face's local index is a binary search away.
    let local = |face: u32| members.binary_search(&face).ok();

    let mut dist: Vec<Option<u32>> = vec![None; members.len()];
    let mut queue = VecDeque::new();
    for (i, &face) in members.iter().enumerate() {
        if is_edge_face(adjacency, assignment, face as usize) {
            dist[i] = Some(0);
            queue.push_back(i);
        }
    }

    while let Some(i) = queue.pop_front() {
        let Some(d) = dist[i] else {
            continue;
        };
        for &nb in adjacency.neighbors(members[i] as usize) {
            if assignment[nb as usize] != cid {
                continue;
            }
            let Some(j) = local(nb) else {
                continue;
            };
            if dist[j].is_none() {
                dist[j] = Some(d + 1);
                queue.push_back(j);
            }
        }
    }

    dist
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Path graph 0-1-2-3-4-5, faces 0..=1 in craton 0, 2..=5 in craton 1.
    fn path() -> (Adjacency, Vec<u32>) {
        let lists: Vec<Vec<u32>> = (0..6u32)
            .map(|i| {
                let mut l = Vec::new();
                if i > 0 {
                    l.push(i - 1);
                }
                if i < 5 {
                    l.push(i + 1);
                }
                l
            })
            .collect();
        (Adjacency::from_lists(&lists), vec![0, 0, 1, 1, 1, 1])
    }

    #[test]
    fn members_are_grouped() {
        let (_, assignment) = path();
        let members = craton_members(&assignment, 2);
        assert_eq!(members, vec![vec![0, 1], vec![2, 3, 4, 5]]);
    }

    #[test]
    fn distances_grow_away_from_the_edge() {
        let (adj, assignment) = path();
        let members = craton_members(&assignment, 2);
        let d = edge_distances(&adj, &assignment, 1, &members[1]);
        assert_eq!(d, vec![Some(0), Some(1), Some(2), Some(3)]);
        let d = edge_distances(&adj, &assignment, 0, &members[0]);
        assert_eq!(d, vec![Some(1), Some(0)]);
    }

    #[test]
    fn whole_mesh_craton_has_no_edge() {
        let (adj, _) = path();
        let assignment = vec![0; 6];
        let members = craton_members(&assignment, 1);
        let d = edge_distances(&adj, &assignment, 0, &members[0]);
        assert!(d.iter().all(Option::is_none));
    }
}
