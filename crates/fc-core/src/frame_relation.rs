//! Per-vertex frame relationship metadata

use serde::{Deserialize, Serialize};

use crate::poly_id::PolyId;

/// Relation data errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RelationError {
    #[error("Vertex index {index} out of range for {count} vertices")]
    VertexOutOfRange { index: usize, count: usize },

    #[error("Dock relation on vertex {0} has no dock reference")]
    MissingDock(usize),

    #[error("Frame relation on vertex {0} carries a dock reference")]
    UnexpectedDock(usize),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type RelationResult<T> = Result<T, RelationError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameRelationKind {
    /// Vertex sits on the frame itself
    Frame,
    /// Vertex is pinned to another polygon
    Dock,
}

/// Where a docked vertex is pinned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DockRef {
    pub dock_id: PolyId,
    pub poly_id: PolyId,
}

/// Raw stored form, validated into [`FrameRelationData`]
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FrameRelationRaw {
    #[serde(rename = "type")]
    kind: FrameRelationKind,
    vertex_index: usize,
    #[serde(default)]
    dock: Option<DockRef>,
    #[serde(default)]
    frame_idx: Option<i32>,
}

/// Relationship of one frame vertex; `dock` is present iff `kind` is `Dock`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "FrameRelationRaw")]
pub struct FrameRelationData {
    #[serde(rename = "type")]
    pub kind: FrameRelationKind,
    pub vertex_index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dock: Option<DockRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_idx: Option<i32>,
}

impl TryFrom<FrameRelationRaw> for FrameRelationData {
    type Error = RelationError;

    fn try_from(raw: FrameRelationRaw) -> Result<Self, Self::Error> {
        let data = Self {
            kind: raw.kind,
            vertex_index: raw.vertex_index,
            dock: raw.dock,
            frame_idx: raw.frame_idx,
        };
        data.check_dock()?;
        Ok(data)
    }
}

impl FrameRelationData {
    /// Vertex framed directly
    pub fn frame(vertex_index: usize) -> Self {
        Self {
            kind: FrameRelationKind::Frame,
            vertex_index,
            dock: None,
            frame_idx: None,
        }
    }

    /// Vertex docked at `dock_id` on polygon `poly_id`
    pub fn dock(vertex_index: usize, dock_id: PolyId, poly_id: PolyId) -> Self {
        Self {
            kind: FrameRelationKind::Dock,
            vertex_index,
            dock: Some(DockRef { dock_id, poly_id }),
            frame_idx: None,
        }
    }

    pub fn with_frame_idx(mut self, frame_idx: i32) -> Self {
        self.frame_idx = Some(frame_idx);
        self
    }

    pub fn is_docked(&self) -> bool {
        self.kind == FrameRelationKind::Dock
    }

    fn check_dock(&self) -> RelationResult<()> {
        match (self.kind, self.dock.is_some()) {
            (FrameRelationKind::Dock, false) => Err(RelationError::MissingDock(self.vertex_index)),
            (FrameRelationKind::Frame, true) => Err(RelationError::UnexpectedDock(self.vertex_index)),
            _ => Ok(()),
        }
    }

    /// Check the dock invariant and that the vertex exists
    pub fn validate(&self, vertex_count: usize) -> RelationResult<()> {
        if self.vertex_index >= vertex_count {
            return Err(RelationError::VertexOutOfRange {
                index: self.vertex_index,
                count: vertex_count,
            });
        }
        self.check_dock()
    }

    pub fn to_json(&self) -> RelationResult<serde_json::Value> {
        serde_json::to_value(self).map_err(|e| RelationError::Serialization(e.to_string()))
    }

    pub fn deserialize(value: serde_json::Value) -> RelationResult<Self> {
        serde_json::from_value(value).map_err(|e| RelationError::Serialization(e.to_string()))
    }
}

/// Relations of every vertex of one frame polygon
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameRelations(Vec<FrameRelationData>);

impl FrameRelations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plain frame relations for vertices `0..vertex_count`
    pub fn framed(vertex_count: usize) -> Self {
        Self((0..vertex_count).map(FrameRelationData::frame).collect())
    }

    /// Add or replace the relation of `data.vertex_index`
    pub fn set(&mut self, data: FrameRelationData) {
        match self.0.iter_mut().find(|r| r.vertex_index == data.vertex_index) {
            Some(existing) => *existing = data,
            None => self.0.push(data),
        }
    }

    pub fn for_vertex(&self, vertex_index: usize) -> Option<&FrameRelationData> {
        self.0.iter().find(|r| r.vertex_index == vertex_index)
    }

    pub fn docked(&self) -> impl Iterator<Item = &FrameRelationData> {
        self.0.iter().filter(|r| r.is_docked())
    }

    pub fn iter(&self) -> impl Iterator<Item = &FrameRelationData> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn validate(&self, vertex_count: usize) -> RelationResult<()> {
        self.0.iter().try_for_each(|r| r.validate(vertex_count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn optional_fields_stay_absent() {
        let frame = FrameRelationData::frame(2);
        let json = frame.to_json().unwrap();
        assert_eq!(json, json!({"type": "frame", "vertexIndex": 2}));
        let back = FrameRelationData::deserialize(json.clone()).unwrap();
        assert_eq!(back.dock, None);
        assert_eq!(back.frame_idx, None);
        assert_eq!(back.to_json().unwrap(), json);
    }

    #[test]
    fn dock_round_trip() {
        let data = FrameRelationData::dock(1, PolyId::new(3, -1), PolyId::new(0, 2)).with_frame_idx(0);
        let json = data.to_json().unwrap();
        assert_eq!(json["type"], "dock");
        assert_eq!(json["dock"]["dockId"], json!({"idx": 3, "pos": -1}));
        assert_eq!(json["frameIdx"], 0);
        assert_eq!(FrameRelationData::deserialize(json).unwrap(), data);
    }

    #[test]
    fn dock_without_reference_is_rejected() {
        let err = FrameRelationData::deserialize(json!({"type": "dock", "vertexIndex": 0})).unwrap_err();
        assert!(matches!(err, RelationError::Serialization(_)));

        let half = json!({"type": "dock", "vertexIndex": 0, "dock": {"dockId": {"idx": 1, "pos": -1}}});
        assert!(FrameRelationData::deserialize(half).is_err());

        let stray = json!({
            "type": "frame",
            "vertexIndex": 0,
            "dock": {"dockId": {"idx": 1, "pos": -1}, "polyId": {"idx": 0, "pos": 0}}
        });
        assert!(FrameRelationData::deserialize(stray).is_err());
    }

    #[test]
    fn vertex_index_boundary() {
        let data = FrameRelationData::frame(3);
        assert_eq!(data.validate(4), Ok(()));
        assert_eq!(
            data.validate(3),
            Err(RelationError::VertexOutOfRange { index: 3, count: 3 })
        );
        let mut broken = FrameRelationData::dock(0, PolyId::edge(1), PolyId::edge(2));
        broken.dock = None;
        assert_eq!(broken.validate(4), Err(RelationError::MissingDock(0)));
    }

    #[test]
    fn collection_queries() {
        let mut relations = FrameRelations::framed(4);
        relations.set(FrameRelationData::dock(2, PolyId::edge(1), PolyId::new(0, 1)));
        assert_eq!(relations.len(), 4);
        assert!(relations.for_vertex(2).unwrap().is_docked());
        assert!(!relations.for_vertex(1).unwrap().is_docked());
        assert_eq!(relations.docked().count(), 1);
        assert!(relations.validate(4).is_ok());
        assert!(relations.validate(2).is_err());

        let json = serde_json::to_value(&relations).unwrap();
        assert!(json.is_array());
        let back: FrameRelations = serde_json::from_value(json).unwrap();
        assert_eq!(back, relations);
    }
}
