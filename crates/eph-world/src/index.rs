//! Uniform bucket grid over the torus for neighbour queries.
//!
//! Rebuilt from scratch every tick (O(N)); queries visit only the buckets
//! overlapping the query disc, with wrap-around.

use eph_core::{AgentId, Torus, Vec2};

#[cfg(feature = "fx-hash")]
type BucketMap = rustc_hash::FxHashMap<usize, Vec<AgentId>>;
#[cfg(not(feature = "fx-hash"))]
type BucketMap = std::collections::HashMap<usize, Vec<AgentId>>;

pub struct SpatialIndex {
    torus:     Torus,
    nx:        usize,
    ny:        usize,
    cell_w:    f64,
    cell_h:    f64,
    positions: Vec<Vec2>,
    buckets:   BucketMap,
}

impl SpatialIndex {
    /// Index `positions` (one per agent, in id order) with buckets of roughly
    /// `cell_size` on a side.
    pub fn build(torus: Torus, positions: &[Vec2], cell_size: f64) -> Self {
        let cell = if cell_size.is_finite() && cell_size > 0.0 { cell_size } else { torus.width.max(torus.height) };
        let nx = ((torus.width / cell).floor() as usize).max(1);
        let ny = ((torus.height / cell).floor() as usize).max(1);
        let mut index = Self {
            torus,
            nx,
            ny,
            cell_w: torus.width / nx as f64,
            cell_h: torus.height / ny as f64,
            positions: positions.to_vec(),
            buckets: BucketMap::default(),
        };
        for (i, &p) in positions.iter().enumerate() {
            let key = index.bucket_of(p);
            index.buckets.entry(key).or_default().push(AgentId(i as u32));
        }
        index
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    fn bucket_of(&self, p: Vec2) -> usize {
        let p = self.torus.wrap(p);
        let i = ((p.x / self.cell_w) as usize).min(self.nx - 1);
        let j = ((p.y / self.cell_h) as usize).min(self.ny - 1);
        j * self.nx + i
    }

    /// Wrapped bucket indices along one axis within `reach` buckets of `c`,
    /// each visited once.
    fn axis_span(c: usize, reach: usize, n: usize) -> Vec<usize> {
        if 2 * reach + 1 >= n {
            return (0..n).collect();
        }
        (0..=2 * reach)
            .map(|k| (c + n + k - reach) % n)
            .collect()
    }

    /// Agents within toroidal distance `radius` of `p`, ascending id.
    pub fn query(&self, p: Vec2, radius: f64) -> Vec<AgentId> {
        if !(radius >= 0.0) {
            return Vec::new();
        }
        let p = self.torus.wrap(p);
        let ci = ((p.x / self.cell_w) as usize).min(self.nx - 1);
        let cj = ((p.y / self.cell_h) as usize).min(self.ny - 1);
        let reach_x = ((radius / self.cell_w).ceil() as usize).min(self.nx);
        let reach_y = ((radius / self.cell_h).ceil() as usize).min(self.ny);

        let mut found = Vec::new();
        for j in Self::axis_span(cj, reach_y, self.ny) {
            for i in Self::axis_span(ci, reach_x, self.nx) {
                if let Some(bucket) = self.buckets.get(&(j * self.nx + i)) {
                    found.extend(
                        bucket
                            .iter()
                            .copied()
                            .filter(|a| self.torus.distance(p, self.positions[a.index()]) <= radius),
                    );
                }
            }
        }
        found.sort_unstable();
        found
    }

    /// Like [`query`](Self::query) around an indexed agent, excluding it.
    pub fn neighbors_of(&self, agent: AgentId, radius: f64) -> Vec<AgentId> {
        let Some(&p) = self.positions.get(agent.index()) else {
            return Vec::new();
        };
        let mut found = self.query(p, radius);
        found.retain(|&a| a != agent);
        found
    }
}
