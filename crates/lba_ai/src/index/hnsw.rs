use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashSet};

use lba_core::error::AppError;

/// Hierarchical navigable small-world graph over squared-L2 distance.
///
/// `m` bounds per-node connectivity above level 0 (level 0 allows `2*m`),
/// `ef_construction` is the search breadth while building, and the per-query
/// `ef_search` is the breadth while querying. Insertion ordinal `i` always
/// corresponds to input vector `i`, which is what keeps the graph aligned
/// with the caller's parallel chunk list.
#[derive(Debug)]
pub struct HnswGraph {
    dimension: usize,
    m: usize,
    m0: usize,
    ef_construction: usize,
    level_mult: f64,
    vectors: Vec<Vec<f32>>,
    /// neighbors[node][level] -> adjacent node ids.
    neighbors: Vec<Vec<Vec<u32>>>,
    entry_point: Option<u32>,
    max_level: usize,
}

/// Max-heap entry ordered by distance.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Candidate {
    dist: f32,
    id: u32,
}

impl Eq for Candidate {}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.dist
            .total_cmp(&other.dist)
            .then(self.id.cmp(&other.id))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

const MAX_LEVEL_CAP: usize = 16;

impl HnswGraph {
    pub fn new(dimension: usize, m: usize, ef_construction: usize) -> Self {
        let m = m.max(2);
        Self {
            dimension,
            m,
            m0: m * 2,
            ef_construction: ef_construction.max(m),
            level_mult: 1.0 / (m as f64).ln(),
            vectors: Vec::new(),
            neighbors: Vec::new(),
            entry_point: None,
            max_level: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn add(&mut self, vectors: Vec<Vec<f32>>) -> Result<(), AppError> {
        for v in vectors {
            if v.len() != self.dimension {
                return Err(AppError::new(
                    "INDEX_ADD_FAILED",
                    "Vector dimension does not match index dimension",
                )
                .with_details(format!("expected={}; got={}", self.dimension, v.len())));
            }
            self.insert(v);
        }
        Ok(())
    }

    /// Approximate k-nearest-neighbor search returning `(squared_l2, ordinal)`
    /// pairs in ascending distance order, at most `k` of them.
    pub fn search(
        &self,
        query: &[f32],
        k: usize,
        ef_search: usize,
    ) -> Result<Vec<(f32, usize)>, AppError> {
        if query.len() != self.dimension {
            return Err(AppError::new(
                "SEARCH_FAILED",
                "Query dimension does not match index dimension",
            )
            .with_details(format!("expected={}; got={}", self.dimension, query.len())));
        }
        let Some(entry) = self.entry_point else {
            return Ok(Vec::new());
        };
        if k == 0 {
            return Ok(Vec::new());
        }

        let mut ep = entry;
        for level in (1..=self.max_level).rev() {
            ep = self.greedy_closest(query, ep, level);
        }

        let ef = ef_search.max(k);
        let mut found = self.search_layer(query, ep, ef, 0);
        found.truncate(k);
        Ok(found
            .into_iter()
            .map(|c| (c.dist, c.id as usize))
            .collect())
    }

    fn insert(&mut self, vector: Vec<f32>) {
        let id = self.vectors.len() as u32;
        let level = self.assign_level(id as u64);
        self.vectors.push(vector);
        self.neighbors.push(vec![Vec::new(); level + 1]);

        let Some(entry) = self.entry_point else {
            self.entry_point = Some(id);
            self.max_level = level;
            return;
        };

        let query = self.vectors[id as usize].clone();
        let mut ep = entry;

        // Greedy descent through levels above the new node's top level.
        if self.max_level > level {
            for l in ((level + 1)..=self.max_level).rev() {
                ep = self.greedy_closest(&query, ep, l);
            }
        }

        // Build links on each level the node participates in.
        for l in (0..=level.min(self.max_level)).rev() {
            let found = self.search_layer(&query, ep, self.ef_construction, l);
            if let Some(best) = found.first() {
                ep = best.id;
            }

            let cap = if l == 0 { self.m0 } else { self.m };
            let selected: Vec<u32> = found.iter().take(cap).map(|c| c.id).collect();
            self.neighbors[id as usize][l] = selected.clone();

            for n in selected {
                self.neighbors[n as usize][l].push(id);
                if self.neighbors[n as usize][l].len() > cap {
                    self.prune_neighbors(n, l, cap);
                }
            }
        }

        if level > self.max_level {
            self.max_level = level;
            self.entry_point = Some(id);
        }
    }

    /// Keep the `cap` closest links of `node` at `level`.
    fn prune_neighbors(&mut self, node: u32, level: usize, cap: usize) {
        let base = self.vectors[node as usize].clone();
        let mut scored: Vec<Candidate> = self.neighbors[node as usize][level]
            .iter()
            .map(|&n| Candidate {
                dist: squared_l2(&base, &self.vectors[n as usize]),
                id: n,
            })
            .collect();
        scored.sort();
        scored.dedup_by_key(|c| c.id);
        self.neighbors[node as usize][level] = scored.into_iter().take(cap).map(|c| c.id).collect();
    }

    /// Hill-climb to the locally closest node on one level.
    fn greedy_closest(&self, query: &[f32], start: u32, level: usize) -> u32 {
        let mut current = start;
        let mut current_dist = squared_l2(query, &self.vectors[current as usize]);
        loop {
            let mut improved = false;
            for &n in self.neighbors_at(current, level) {
                let d = squared_l2(query, &self.vectors[n as usize]);
                if d < current_dist {
                    current = n;
                    current_dist = d;
                    improved = true;
                }
            }
            if !improved {
                return current;
            }
        }
    }

    /// Best-first search on one level; returns up to `ef` candidates in
    /// ascending distance order.
    fn search_layer(&self, query: &[f32], entry: u32, ef: usize, level: usize) -> Vec<Candidate> {
        let entry_dist = squared_l2(query, &self.vectors[entry as usize]);
        let mut visited: HashSet<u32> = HashSet::new();
        visited.insert(entry);

        // Min-heap of nodes to expand, max-heap of the best `ef` found so far.
        let mut to_expand: BinaryHeap<Reverse<Candidate>> = BinaryHeap::new();
        let mut found: BinaryHeap<Candidate> = BinaryHeap::new();
        to_expand.push(Reverse(Candidate {
            dist: entry_dist,
            id: entry,
        }));
        found.push(Candidate {
            dist: entry_dist,
            id: entry,
        });

        while let Some(Reverse(current)) = to_expand.pop() {
            let worst = found.peek().map(|c| c.dist).unwrap_or(f32::INFINITY);
            if current.dist > worst && found.len() >= ef {
                break;
            }
            for &n in self.neighbors_at(current.id, level) {
                if !visited.insert(n) {
                    continue;
                }
                let d = squared_l2(query, &self.vectors[n as usize]);
                let worst = found.peek().map(|c| c.dist).unwrap_or(f32::INFINITY);
                if found.len() < ef || d < worst {
                    to_expand.push(Reverse(Candidate { dist: d, id: n }));
                    found.push(Candidate { dist: d, id: n });
                    if found.len() > ef {
                        found.pop();
                    }
                }
            }
        }

        let mut out = found.into_vec();
        out.sort();
        out
    }

    fn neighbors_at(&self, node: u32, level: usize) -> &[u32] {
        self.neighbors[node as usize]
            .get(level)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Deterministic geometric level assignment derived from the insertion
    /// ordinal, so identical inputs always build identical graphs.
    fn assign_level(&self, ordinal: u64) -> usize {
        let h = splitmix64(ordinal.wrapping_add(1));
        let uniform = ((h >> 11) as f64 + 1.0) / ((1u64 << 53) as f64 + 1.0);
        let level = (-uniform.ln() * self.level_mult).floor() as usize;
        level.min(MAX_LEVEL_CAP)
    }
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    let mut sum = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        let d = x - y;
        sum += d * d;
    }
    sum
}

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_has_zero_distance() {
        let mut graph = HnswGraph::new(2, 8, 32);
        graph
            .add(vec![vec![0.0, 0.0], vec![1.0, 0.0], vec![0.0, 1.0]])
            .expect("add");
        let hits = graph.search(&[1.0, 0.0], 1, 16).expect("search");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].1, 1);
        assert_eq!(hits[0].0, 0.0);
    }

    #[test]
    fn empty_graph_returns_no_hits() {
        let graph = HnswGraph::new(4, 8, 32);
        assert!(graph.search(&[0.0; 4], 5, 16).expect("search").is_empty());
    }

    #[test]
    fn rejects_mismatched_dimensions() {
        let mut graph = HnswGraph::new(3, 8, 32);
        assert!(graph.add(vec![vec![0.0, 0.0]]).is_err());
        assert!(graph.search(&[0.0, 0.0], 1, 16).is_err());
    }
}
