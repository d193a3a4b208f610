use crate::constants::{DEFAULT_IMAGE_HEIGHT, DEFAULT_IMAGE_WIDTH};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One polygon vertex, carried through exactly as written in the source
/// (integer coordinates stay integers, odd vertices are not rejected).
pub type Point = Value;

/// Annotation file as written by iSAT.
///
/// Every field is optional; `null` is treated the same as a missing key and
/// unknown keys are ignored. A dimension that is not a non-negative integer
/// (integer-valued floats such as `720.0` are accepted) counts as missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IsatAnnotation {
    #[serde(default)]
    pub objects: Option<Vec<IsatObject>>,
    #[serde(default, rename = "imageHeight", deserialize_with = "lenient_dimension")]
    pub image_height: Option<u32>,
    #[serde(default, rename = "imageWidth", deserialize_with = "lenient_dimension")]
    pub image_width: Option<u32>,
}

fn lenient_dimension<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(dimension_from_value))
}

fn dimension_from_value(value: &Value) -> Option<u32> {
    if let Some(n) = value.as_u64() {
        return u32::try_from(n).ok();
    }
    let f = value.as_f64()?;
    (f.fract() == 0.0 && (0.0..=u32::MAX as f64).contains(&f)).then_some(f as u32)
}

/// A single annotated object inside an iSAT file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IsatObject {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub segmentation: Option<Vec<Point>>,
    #[serde(default)]
    pub note: Option<String>,
}

/// LabelMe annotation document. Field order is the key order of the output file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelmeAnnotation {
    pub version: String,
    pub flags: BTreeMap<String, bool>,
    pub shapes: Vec<LabelmeShape>,
    #[serde(rename = "imagePath")]
    pub image_path: String,
    #[serde(rename = "imageData")]
    pub image_data: Option<String>,
    #[serde(rename = "imageHeight")]
    pub image_height: u32,
    #[serde(rename = "imageWidth")]
    pub image_width: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelmeShape {
    pub label: String,
    pub points: Vec<Point>,
    pub group_id: Option<i64>,
    pub description: String,
    pub shape_type: String,
    pub flags: BTreeMap<String, bool>,
    pub mask: Option<String>,
}

/// Image dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    pub height: u32,
    pub width: u32,
}

impl ImageSize {
    pub const DEFAULT: ImageSize = ImageSize {
        height: DEFAULT_IMAGE_HEIGHT,
        width: DEFAULT_IMAGE_WIDTH,
    };
}

impl Default for ImageSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}
