#![allow(dead_code)]

use itertools::Itertools;
use proptest::prelude::*;
use steenroder::filtration::Vertex;

/// All faces of the given simplices, ordered by dimension and then lexicographically.
pub fn closure(tops: &[&[Vertex]]) -> Vec<Vec<Vertex>> {
    let mut all: Vec<Vec<Vertex>> = Vec::new();
    for t in tops {
        let mut t = t.to_vec();
        t.sort_unstable();
        for r in 1..=t.len() {
            all.extend(t.iter().copied().combinations(r));
        }
    }
    all.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
    all.dedup();
    all
}

pub fn edge() -> Vec<Vec<Vertex>> {
    vec![vec![0], vec![1], vec![0, 1]]
}

pub fn circle() -> Vec<Vec<Vertex>> {
    closure(&[&[0, 1], &[1, 2], &[0, 2]])
}

/// The minimal triangulation of the real projective plane, with 6 vertices and 10 triangles.
pub fn rp2() -> Vec<Vec<Vertex>> {
    closure(&[
        &[0, 1, 2],
        &[0, 2, 3],
        &[0, 3, 4],
        &[0, 4, 5],
        &[0, 1, 5],
        &[1, 2, 4],
        &[2, 3, 5],
        &[1, 3, 4],
        &[1, 3, 5],
        &[2, 4, 5],
    ])
}

/// The boundary of a tetrahedron with a triangle attached at a vertex. This has the same Betti
/// numbers as the real projective plane over $\mathbb{F}_2$.
pub fn wedge() -> Vec<Vec<Vertex>> {
    closure(&[
        &[0, 1, 2],
        &[0, 1, 3],
        &[0, 2, 3],
        &[1, 2, 3],
        &[0, 4],
        &[4, 5],
        &[0, 5],
    ])
}

/// Random simplicial complexes on at most 7 vertices, up to dimension 3. The simplices of each
/// dimension are shuffled, so the filtrations are not in lexicographic order.
pub fn arb_filtration() -> impl Strategy<Value = Vec<Vec<Vertex>>> {
    let simplex = prop::sample::subsequence((0..7).collect::<Vec<Vertex>>(), 1..=4);
    (prop::collection::vec(simplex, 1..10), any::<u64>()).prop_map(|(tops, seed)| {
        let tops: Vec<&[Vertex]> = tops.iter().map(Vec::as_slice).collect();
        let all = closure(&tops);
        let mut result = Vec::with_capacity(all.len());
        for (_, group) in &all.into_iter().chunk_by(Vec::len) {
            let mut group: Vec<Vec<Vertex>> = group.collect();
            shuffle(&mut group, seed);
            result.extend(group);
        }
        result
    })
}

/// A deterministic Fisher-Yates shuffle driven by a linear congruential generator.
fn shuffle<T>(v: &mut [T], seed: u64) {
    let mut state = seed | 1;
    for i in (1..v.len()).rev() {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let j = (state >> 33) as usize % (i + 1);
        v.swap(i, j);
    }
}
