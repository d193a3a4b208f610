use std::collections::BTreeMap;
use std::path::Path;

use crate::constants::{IMAGE_EXTENSION, LABELME_VERSION, SHAPE_TYPE_POLYGON, UNKNOWN_LABEL};
use crate::types::{ImageSize, IsatAnnotation, IsatObject, LabelmeAnnotation, LabelmeShape};

/// Maps iSAT annotation records to LabelMe documents
pub struct AnnotationMapper;

impl AnnotationMapper {
    /// Build a LabelMe document from an iSAT record and the name of the file it came from.
    /// Missing image dimensions fall back to 1080x1920.
    pub fn map(source: &IsatAnnotation, source_file_name: &Path) -> LabelmeAnnotation {
        Self::map_with_fallback(source, source_file_name, ImageSize::DEFAULT)
    }

    /// Same as [`AnnotationMapper::map`] with a caller-chosen fallback size.
    /// Each dimension present in the source wins over the fallback independently.
    pub fn map_with_fallback(
        source: &IsatAnnotation,
        source_file_name: &Path,
        fallback: ImageSize,
    ) -> LabelmeAnnotation {
        let shapes = source
            .objects
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(Self::map_object)
            .collect();

        LabelmeAnnotation {
            version: LABELME_VERSION.to_string(),
            flags: BTreeMap::new(),
            shapes,
            image_path: Self::image_file_name(source_file_name),
            image_data: None,
            image_height: source.image_height.unwrap_or(fallback.height),
            image_width: source.image_width.unwrap_or(fallback.width),
        }
    }

    /// Build one polygon shape from an iSAT object
    pub fn map_object(object: &IsatObject) -> LabelmeShape {
        LabelmeShape {
            label: object
                .category
                .clone()
                .unwrap_or_else(|| UNKNOWN_LABEL.to_string()),
            points: object.segmentation.clone().unwrap_or_default(),
            group_id: None,
            description: object.note.clone().unwrap_or_default(),
            shape_type: SHAPE_TYPE_POLYGON.to_string(),
            flags: BTreeMap::new(),
            mask: None,
        }
    }

    /// `<stem>.jpg` for an annotation file name, whatever its own extension
    pub fn image_file_name(source_file_name: &Path) -> String {
        let stem = source_file_name
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        format!("{stem}.{IMAGE_EXTENSION}")
    }
}
