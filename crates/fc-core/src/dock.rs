//! Docking registry between polygon edges
//!
//! Buckets are keyed by [`PolyId`] through a two-level index: polygon
//! index first, then position. Position `-1` holds the edge-level bucket of a
//! polygon; positions `>= 0` hold multi-dock (T-joint) buckets.

use std::collections::BTreeMap;

use fc_geom::{Edge, Point, PolyShape, Tolerance};
use glam::DVec2;
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::bar::Bar;
use crate::poly_id::{DockData, PolyId};

/// Dock manager errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DockError {
    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type DockResult<T> = Result<T, DockError>;

/// Outcome of one [`DockManager::for_do_task`] callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskFlow {
    /// Keep iterating
    Continue,
    /// Abort the walk without a result
    Return,
    /// Stop and report the current key
    Ok,
}

/// Resolves polygon indices to live shapes
pub trait ShapeLookup {
    fn shape(&self, idx: i32) -> Option<&PolyShape>;
}

impl ShapeLookup for [PolyShape] {
    fn shape(&self, idx: i32) -> Option<&PolyShape> {
        usize::try_from(idx).ok().and_then(|i| self.get(i))
    }
}

impl ShapeLookup for Vec<PolyShape> {
    fn shape(&self, idx: i32) -> Option<&PolyShape> {
        self.as_slice().shape(idx)
    }
}

/// Resolves edge addresses to the bars built on them
pub trait BarLookup {
    fn bar(&self, id: PolyId) -> Option<&Bar>;
}

impl BarLookup for [Bar] {
    fn bar(&self, id: PolyId) -> Option<&Bar> {
        self.iter().find(|b| b.poly_id == id)
    }
}

impl BarLookup for Vec<Bar> {
    fn bar(&self, id: PolyId) -> Option<&Bar> {
        self.as_slice().bar(id)
    }
}

/// One serialized bucket
#[derive(Debug, Clone, Serialize, Deserialize)]
struct DockBucket {
    key: PolyId,
    data: Vec<DockData>,
}

/// Persisted form: ordered list of buckets
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
struct DockManagerData(Vec<DockBucket>);

/// Registry of docking points, keyed by [`PolyId`]
///
/// Only the buckets are persisted and compared; the matching tolerance is
/// runtime configuration and reloads as the default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(into = "DockManagerData", from = "DockManagerData")]
pub struct DockManager {
    buckets: BTreeMap<i32, BTreeMap<i32, Vec<DockData>>>,
    tol: Tolerance,
}

impl PartialEq for DockManager {
    fn eq(&self, other: &Self) -> bool {
        self.buckets == other.buckets
    }
}

impl From<DockManager> for DockManagerData {
    fn from(manager: DockManager) -> Self {
        let buckets = manager
            .iter()
            .map(|(key, data)| DockBucket {
                key,
                data: data.to_vec(),
            })
            .collect();
        DockManagerData(buckets)
    }
}

impl From<DockManagerData> for DockManager {
    fn from(data: DockManagerData) -> Self {
        let mut manager = DockManager::new();
        for bucket in data.0 {
            for entry in bucket.data {
                manager.push(bucket.key, entry);
            }
        }
        manager
    }
}

impl DockManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tolerance used when matching points in [`find_pt`](Self::find_pt)
    pub fn with_tolerance(mut self, tol: Tolerance) -> Self {
        self.tol = tol;
        self
    }

    pub fn tolerance(&self) -> &Tolerance {
        &self.tol
    }

    /// Append `data` to the bucket for `key`
    pub fn push(&mut self, key: PolyId, data: DockData) {
        self.buckets
            .entry(key.idx)
            .or_default()
            .entry(key.pos)
            .or_default()
            .push(data);
    }

    /// Entries under `key` (empty when the bucket does not exist)
    pub fn get_data(&self, key: PolyId) -> &[DockData] {
        self.buckets
            .get(&key.idx)
            .and_then(|inner| inner.get(&key.pos))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn has_edge_data(&self, idx: i32) -> bool {
        !self.get_edge_data(idx).is_empty()
    }

    /// The edge-level bucket of polygon `idx`
    pub fn get_edge_data(&self, idx: i32) -> &[DockData] {
        self.get_data(PolyId::edge(idx))
    }

    /// All buckets in key order
    pub fn iter(&self) -> impl Iterator<Item = (PolyId, &[DockData])> {
        self.buckets.iter().flat_map(|(&idx, inner)| {
            inner
                .iter()
                .map(move |(&pos, data)| (PolyId::new(idx, pos), data.as_slice()))
        })
    }

    /// Buckets belonging to polygon `idx`, edge level first
    pub fn buckets_for(&self, idx: i32) -> impl Iterator<Item = (PolyId, &[DockData])> {
        self.buckets.get(&idx).into_iter().flat_map(move |inner| {
            inner
                .iter()
                .map(move |(&pos, data)| (PolyId::new(idx, pos), data.as_slice()))
        })
    }

    /// Number of buckets
    pub fn len(&self) -> usize {
        self.buckets.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// First bucket holding a point equal to `pt` within the linear tolerance
    pub fn find_pt(&self, pt: Point) -> Option<(PolyId, &[DockData])> {
        self.iter()
            .find(|(_, data)| data.iter().any(|d| d.pt.distance(pt) <= self.tol.linear))
    }

    /// Move every stored point by `offset`.
    ///
    /// Call together with every move of the owning shape.
    pub fn translate(&mut self, offset: DVec2) {
        for inner in self.buckets.values_mut() {
            for data in inner.values_mut() {
                for entry in data.iter_mut() {
                    entry.pt += offset;
                }
            }
        }
    }

    /// Drop all multi-dock buckets, keeping edge-level ones
    pub fn remove_mul_data(&mut self) {
        for inner in self.buckets.values_mut() {
            inner.retain(|&pos, _| pos == PolyId::EDGE_POS);
        }
        self.buckets.retain(|_, inner| !inner.is_empty());
    }

    /// Remove one bucket, returning its entries
    pub fn remove_data(&mut self, key: PolyId) -> Vec<DockData> {
        let Some(inner) = self.buckets.get_mut(&key.idx) else {
            return Vec::new();
        };
        let removed = inner.remove(&key.pos).unwrap_or_default();
        if inner.is_empty() {
            self.buckets.remove(&key.idx);
        }
        removed
    }

    pub fn clear(&mut self) {
        self.buckets.clear();
    }

    /// Walk buckets in key order until the callback stops the walk.
    ///
    /// Returns the key at which the callback answered [`TaskFlow::Ok`], or
    /// `None` if it answered [`TaskFlow::Return`] or never stopped.
    pub fn for_do_task<F>(&self, mut task: F) -> Option<PolyId>
    where
        F: FnMut(PolyId, &[DockData]) -> TaskFlow,
    {
        for (key, data) in self.iter() {
            match task(key, data) {
                TaskFlow::Continue => continue,
                TaskFlow::Return => return None,
                TaskFlow::Ok => return Some(key),
            }
        }
        None
    }

    /// Edge that the first entry under `key` is docked to
    pub fn get_dock_edge<S>(&self, key: PolyId, shapes: &S) -> Option<Edge>
    where
        S: ShapeLookup + ?Sized,
    {
        let Some(target) = self.get_data(key).first().map(|d| d.idx) else {
            trace!("No dock data under {}", key);
            return None;
        };
        let edge = shapes
            .shape(target.idx)
            .and_then(|shape| usize::try_from(target.pos).ok().and_then(|pos| shape.edge(pos).ok()))
            .copied();
        if edge.is_none() {
            warn!("Dock {} points at missing edge {}", key, target);
        }
        edge
    }

    /// Bars owning the first two entries under `key`
    pub fn get_dock_bars<'b, B>(&self, key: PolyId, bars: &'b B) -> Option<(&'b Bar, &'b Bar)>
    where
        B: BarLookup + ?Sized,
    {
        let data = self.get_data(key);
        let (Some(first), Some(second)) = (data.first(), data.get(1)) else {
            trace!("Dock {} has fewer than two entries", key);
            return None;
        };
        match (bars.bar(first.idx), bars.bar(second.idx)) {
            (Some(a), Some(b)) => Some((a, b)),
            _ => {
                warn!("Dock {} points at missing bars {} / {}", key, first.idx, second.idx);
                None
            }
        }
    }

    // ============== Persistence ==============

    pub fn to_json(&self) -> DockResult<serde_json::Value> {
        serde_json::to_value(self).map_err(|e| DockError::Serialization(e.to_string()))
    }

    pub fn deserialize(value: serde_json::Value) -> DockResult<Self> {
        serde_json::from_value(value).map_err(|e| DockError::Serialization(e.to_string()))
    }
}
