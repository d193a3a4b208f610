/// LabelMe schema version written into every converted document
pub const LABELME_VERSION: &str = "5.5.0";

/// Shape type for every converted object; iSAT only produces polygons
pub const SHAPE_TYPE_POLYGON: &str = "polygon";

/// Label used when an iSAT object has no category
pub const UNKNOWN_LABEL: &str = "unknown";

/// Extension of the image that sits next to each annotation file
pub const IMAGE_EXTENSION: &str = "jpg";

/// Extension of annotation files picked up from the input directory
pub const ANNOTATION_EXTENSION: &str = ".json";

/// Fallback image height when the source record does not carry one
pub const DEFAULT_IMAGE_HEIGHT: u32 = 1080;

/// Fallback image width when the source record does not carry one
pub const DEFAULT_IMAGE_WIDTH: u32 = 1920;

/// Output root used by the nested layout when nothing else is configured
pub const DEFAULT_OUTPUT_ROOT: &str = "results";

/// Directory created inside the input directory by the in-place layout
pub const IN_PLACE_OUTPUT_DIR: &str = "labelme_output";

/// Config file picked up from the working directory when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "isat2labelme.toml";

/// Default tracing filter
pub const DEFAULT_LOG_FILTER: &str = "isat2labelme=info";
