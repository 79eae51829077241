//! Serde adapter writing points as `{x, y}` objects
//!
//! Use as `#[serde(with = "fc_geom::point_serde")]` on `DVec2` fields.

use glam::DVec2;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Serialize, Deserialize)]
struct Xy {
    x: f64,
    y: f64,
}

pub fn serialize<S>(point: &DVec2, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    Xy {
        x: point.x,
        y: point.y,
    }
    .serialize(serializer)
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DVec2, D::Error>
where
    D: Deserializer<'de>,
{
    let Xy { x, y } = Xy::deserialize(deserializer)?;
    Ok(DVec2::new(x, y))
}
