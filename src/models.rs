//! Request bodies for the asset endpoints.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;

pub const CONTRIBUTION_DEFINITION_REL: &str = "contributionDefinition";

/// Link as the platform expects it inside request bodies.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypedLink {
    #[serde(rename = "@type")]
    kind: &'static str,
    pub rel: String,
    pub uri: String,
}

impl TypedLink {
    pub fn new(rel: impl Into<String>, uri: impl Into<String>) -> Self {
        TypedLink {
            kind: "Link",
            rel: rel.into(),
            uri: uri.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAsset {
    pub text: String,
    pub title: String,
    pub asset_category: String,
    pub asset_sub_type: String,
    pub asset_type: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<TypedLink>,
}

impl NewAsset {
    /// A generic sensor device.
    pub fn sensor(title: impl Into<String>, text: impl Into<String>) -> Self {
        NewAsset {
            text: text.into(),
            title: title.into(),
            asset_category: "DEVICE".to_string(),
            asset_sub_type: "OTHER".to_string(),
            asset_type: "SENSOR".to_string(),
            links: Vec::new(),
        }
    }

    /// Ties the asset to the contribution definition it reports under.
    pub fn contribution_definition(mut self, platform_root: &str, definition_id: &str) -> Self {
        self.links.push(TypedLink::new(
            CONTRIBUTION_DEFINITION_REL,
            format!("{}/contributionDefinitions/{}", platform_root, definition_id),
        ));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BasicMeasurement {
    #[serde(rename = "@type")]
    kind: &'static str,
    pub name: String,
    pub value: String,
    pub unit: String,
}

impl BasicMeasurement {
    pub fn new(name: impl Into<String>, value: impl Into<String>, unit: impl Into<String>) -> Self {
        BasicMeasurement {
            kind: "BasicMeasurement",
            name: name.into(),
            value: value.into(),
            unit: unit.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetLocation {
    /// GeoJSON feature, serialized to a string inside the JSON body.
    pub geometry: String,
    pub measurement_data: Vec<BasicMeasurement>,
    /// Millisecond precision UTC, e.g. `2019-05-01T17:03:22.512Z`.
    pub timestamp: String,
    #[serde(rename = "@type")]
    kind: &'static str,
}

impl AssetLocation {
    pub fn point(
        lat: f64,
        lon: f64,
        at: DateTime<Utc>,
        measurement_data: Vec<BasicMeasurement>,
    ) -> Self {
        let feature = json!({
            "geometry": {
                "geometries": [{ "coordinates": [lon, lat], "type": "Point" }],
                "type": "GeometryCollection"
            },
            "type": "Feature"
        });
        AssetLocation {
            geometry: feature.to_string(),
            measurement_data,
            timestamp: at.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
            kind: "ContributedAssetLocation",
        }
    }
}
