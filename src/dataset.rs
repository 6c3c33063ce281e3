//! The fixed OGC Simple Features dataset: index mapping, bundled bulk
//! resource and the per-feature-type aliases.

use serde_json::{json, Map, Value};

/// Mapping type the documents are indexed under.
pub const MAPPING_TYPE: &str = "doc";

/// Location of the bulk payload inside the resource root.
pub const BULK_RESOURCE: &str = "/ogc/ogc.json";

/// Field every alias filters on.
pub const DISCRIMINATOR_FIELD: &str = "ogc_type";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Keyword,
    Integer,
    GeoShape,
    /// `text` with a `keyword` sub-field.
    String,
}

impl FieldType {
    /// The `type` the store reports for the field.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Keyword => "keyword",
            FieldType::Integer => "integer",
            FieldType::GeoShape => "geo_shape",
            FieldType::String => "text",
        }
    }

    pub fn to_mapping(&self) -> Value {
        match self {
            FieldType::String => json!({
                "type": "text",
                "fields": {
                    "keyword": { "type": "keyword" }
                }
            }),
            other => json!({ "type": other.as_str() }),
        }
    }
}

pub const FIELDS: &[(&str, FieldType)] = &[
    // common
    ("ogc_type", FieldType::Keyword),
    ("fid", FieldType::Integer),
    ("name", FieldType::String),
    // lakes
    ("shore", FieldType::GeoShape),
    // road_segments
    ("aliases", FieldType::String),
    // road_segments, divided_routes
    ("num_lanes", FieldType::Integer),
    // road_segments, streams
    ("centerline", FieldType::GeoShape),
    // divided_routes
    ("centerlines", FieldType::GeoShape),
    // forests, named_places
    ("boundary", FieldType::GeoShape),
    // bridges, buildings
    ("position", FieldType::GeoShape),
    // buildings
    ("address", FieldType::String),
    ("footprint", FieldType::GeoShape),
    // ponds
    ("type", FieldType::Keyword),
    ("shores", FieldType::GeoShape),
    // map_neatlines
    ("neatline", FieldType::GeoShape),
];

/// One alias per feature type, each named after the `ogc_type` value it keeps.
pub const ALIASES: &[&str] = &[
    "lakes",
    "road_segments",
    "divided_routes",
    "forests",
    "bridges",
    "streams",
    "buildings",
    "ponds",
    "named_places",
    "map_neatlines",
];

/// Body of the create-index request.
pub fn index_definition() -> Value {
    let mut properties = Map::new();
    for (name, field_type) in FIELDS {
        properties.insert(name.to_string(), field_type.to_mapping());
    }

    json!({
        "settings": {
            "number_of_shards": 1
        },
        "mappings": {
            MAPPING_TYPE: {
                "properties": properties
            }
        }
    })
}

/// Term clause keeping only documents of one feature type.
pub fn alias_filter(value: &str) -> String {
    format!("\"term\" : {{ \"{}\" : \"{}\" }}", DISCRIMINATOR_FIELD, value)
}
