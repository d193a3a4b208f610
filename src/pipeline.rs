use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, instrument, warn};

use crate::config::{Config, OutputLayout};
use crate::constants::{ANNOTATION_EXTENSION, IN_PLACE_OUTPUT_DIR};
use crate::error::{ConvertError, Result};
use crate::mapper::AnnotationMapper;
use crate::storage::OutputStore;
use crate::types::{ImageSize, IsatAnnotation};

/// Everything a batch run needs to know
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub input_dir: PathBuf,
    pub output_root: PathBuf,
    pub layout: OutputLayout,
    pub copy_images: bool,
    pub probe_image_size: bool,
    pub fallback_size: ImageSize,
}

impl RunOptions {
    /// Options for `input_dir` with every other setting taken from `config`
    pub fn from_config(input_dir: impl Into<PathBuf>, config: &Config) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_root: config.output_root.clone(),
            layout: config.layout,
            copy_images: config.copy_images,
            probe_image_size: config.probe_image_size,
            fallback_size: config.fallback_size,
        }
    }
}

/// A file that could not be converted, with the reason
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileFailure {
    pub file_name: String,
    pub error: String,
}

/// Result of a complete batch run
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Candidate `.json` files found
    pub total: usize,
    pub converted: usize,
    /// Entries named `*.json` that are not regular files
    pub skipped: usize,
    pub failures: Vec<FileFailure>,
    pub images_copied: usize,
    /// Files that converted but had no `<stem>.jpg` to copy
    pub missing_images: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl BatchSummary {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn all_failed(&self) -> bool {
        self.total > 0 && self.converted == 0
    }
}

/// What happened to the image of a converted file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ImageOutcome {
    NotRequested,
    Copied,
    Missing,
}

pub struct Pipeline;

impl Pipeline {
    /// Convert every iSAT file directly inside `options.input_dir`.
    ///
    /// Only an unreadable input directory, an output directory that cannot be
    /// created, or one that is the input directory itself aborts the run;
    /// failures of individual files are collected in the returned summary.
    #[instrument(skip(options), fields(input_dir = %options.input_dir.display()))]
    pub fn run(options: &RunOptions) -> Result<BatchSummary> {
        let started_at = Utc::now();

        let input_dir = Self::resolve_input_dir(&options.input_dir)?;
        let output_dir = Self::output_dir_for(&input_dir, &options.output_root, options.layout);
        Self::ensure_distinct_output(&input_dir, &output_dir)?;
        let store = OutputStore::open(&output_dir)?;

        let (candidates, skipped) = Self::discover_candidates(&input_dir)?;

        let mut summary = BatchSummary {
            input_dir: input_dir.clone(),
            output_dir,
            total: candidates.len(),
            converted: 0,
            skipped,
            failures: Vec::new(),
            images_copied: 0,
            missing_images: Vec::new(),
            started_at,
            finished_at: started_at,
        };

        if candidates.is_empty() {
            info!("No JSON files found in {}", input_dir.display());
            summary.finished_at = Utc::now();
            return Ok(summary);
        }

        info!("Converting {} file(s) from {}", candidates.len(), input_dir.display());

        for file_name in &candidates {
            match Self::convert_file(&input_dir, file_name, &store, options) {
                Ok(image) => {
                    summary.converted += 1;
                    match image {
                        ImageOutcome::Copied => summary.images_copied += 1,
                        ImageOutcome::Missing => summary.missing_images.push(file_name.clone()),
                        ImageOutcome::NotRequested => {}
                    }
                    info!("✅ Converted: {}", file_name);
                }
                Err(e) => {
                    error!("❌ Error at {}: {}", file_name, e);
                    summary.failures.push(FileFailure {
                        file_name: file_name.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        summary.finished_at = Utc::now();
        info!(
            "Conversion completed: {} converted, {} failed. LabelMe files → {}",
            summary.converted,
            summary.failed(),
            summary.output_dir.display()
        );

        Ok(summary)
    }

    /// Canonical path of the input directory; fails when it is missing or not a directory
    pub fn resolve_input_dir(input_dir: &Path) -> Result<PathBuf> {
        let resolved = fs::canonicalize(input_dir).map_err(|source| ConvertError::InputDir {
            path: input_dir.to_path_buf(),
            source,
        })?;
        if !resolved.is_dir() {
            return Err(ConvertError::NotADirectory(resolved));
        }
        Ok(resolved)
    }

    /// Output directory for an already resolved input directory
    pub fn output_dir_for(input_dir: &Path, output_root: &Path, layout: OutputLayout) -> PathBuf {
        match layout {
            OutputLayout::Nested => {
                // Only the filesystem root has no name
                let name = input_dir
                    .file_name()
                    .map(|n| n.to_os_string())
                    .unwrap_or_else(|| "root".into());
                output_root.join(name)
            }
            OutputLayout::InPlace => input_dir.join(IN_PLACE_OUTPUT_DIR),
        }
    }

    /// Refuse an output directory that resolves to the input directory itself;
    /// converted files would replace their own sources.
    pub fn ensure_distinct_output(input_dir: &Path, output_dir: &Path) -> Result<()> {
        // A directory that does not exist yet cannot be the input
        match fs::canonicalize(output_dir) {
            Ok(resolved) if resolved == input_dir => Err(ConvertError::OutputIsInput(resolved)),
            _ => Ok(()),
        }
    }

    /// Names of the `.json` entries directly inside `input_dir`, sorted, plus the
    /// number of matching entries that are not regular files.
    pub fn discover_candidates(input_dir: &Path) -> Result<(Vec<String>, usize)> {
        let entries = fs::read_dir(input_dir).map_err(|source| ConvertError::InputDir {
            path: input_dir.to_path_buf(),
            source,
        })?;

        let mut candidates = Vec::new();
        let mut skipped = 0;

        for entry in entries {
            let entry = entry?;
            let Some(file_name) = entry.file_name().to_str().map(str::to_owned) else {
                warn!("Skipping entry with non UTF-8 name: {:?}", entry.file_name());
                continue;
            };
            if !Self::is_annotation_name(&file_name) {
                continue;
            }
            // follows symlinks, so a link to a regular file still counts
            if entry.path().is_file() {
                candidates.push(file_name);
            } else {
                debug!("Skipping {}: not a regular file", file_name);
                skipped += 1;
            }
        }

        candidates.sort();
        Ok((candidates, skipped))
    }

    fn is_annotation_name(file_name: &str) -> bool {
        file_name.len() >= ANNOTATION_EXTENSION.len()
            && file_name
                .get(file_name.len() - ANNOTATION_EXTENSION.len()..)
                .is_some_and(|ext| ext.eq_ignore_ascii_case(ANNOTATION_EXTENSION))
    }

    /// Load, map, write and optionally copy the image for one file
    #[instrument(skip(input_dir, store, options))]
    fn convert_file(
        input_dir: &Path,
        file_name: &str,
        store: &OutputStore,
        options: &RunOptions,
    ) -> Result<ImageOutcome> {
        let input_path = input_dir.join(file_name);
        let content = fs::read_to_string(&input_path)?;
        let source: IsatAnnotation = serde_json::from_str(&content)?;

        let image_name = AnnotationMapper::image_file_name(Path::new(file_name));
        let image_path = input_dir.join(&image_name);

        let fallback = Self::fallback_size(&source, &image_path, options);
        let labelme = AnnotationMapper::map_with_fallback(&source, Path::new(file_name), fallback);
        debug!("Mapped {} object(s)", labelme.shapes.len());

        store.write_json(file_name, &labelme)?;

        if !options.copy_images {
            return Ok(ImageOutcome::NotRequested);
        }
        if !image_path.is_file() {
            warn!("⚠️  Image not found for {}: {}", file_name, image_path.display());
            return Ok(ImageOutcome::Missing);
        }
        store.copy_file(&image_path, &image_name)?;
        Ok(ImageOutcome::Copied)
    }

    /// Size used for dimensions the source record lacks
    fn fallback_size(source: &IsatAnnotation, image_path: &Path, options: &RunOptions) -> ImageSize {
        let complete = source.image_height.is_some() && source.image_width.is_some();
        if complete || !options.probe_image_size {
            return options.fallback_size;
        }
        match Self::probe_image_size(image_path) {
            Ok(size) => {
                debug!("Probed {}: {}x{}", image_path.display(), size.width, size.height);
                size
            }
            Err(e) => {
                warn!(
                    "Cannot read size of {}, using {}x{}: {}",
                    image_path.display(),
                    options.fallback_size.width,
                    options.fallback_size.height,
                    e
                );
                options.fallback_size
            }
        }
    }

    /// Read image dimensions from the file header
    pub fn probe_image_size(image_path: &Path) -> Result<ImageSize> {
        let probe_error = |message: String| ConvertError::ImageProbe {
            path: image_path.to_path_buf(),
            message,
        };
        let size = imagesize::size(image_path).map_err(|e| probe_error(e.to_string()))?;
        let height = u32::try_from(size.height)
            .map_err(|_| probe_error(format!("image height {} does not fit in u32", size.height)))?;
        let width = u32::try_from(size.width)
            .map_err(|_| probe_error(format!("image width {} does not fit in u32", size.width)))?;
        Ok(ImageSize { height, width })
    }
}
