//! Work items and the deterministic mapping from ordinals to file paths.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use super::transform::Transform;

/// Name of the directory that collects every per-image output directory.
pub const TRANSFORM_DIR: &str = "imagen_transform";

/// One image of the batch, identified by its 1-based ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkItem(u32);

impl WorkItem {
    pub fn new(ordinal: u32) -> Self {
        Self(ordinal)
    }

    pub fn ordinal(self) -> u32 {
        self.0
    }
}

impl fmt::Display for WorkItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03}", self.0)
    }
}

/// Where inputs are read from and where outputs are written.
///
/// Inputs: `<input_dir>/<prefix>_<NNN>.<ext>`.
/// Outputs: `<output_root>/imagen_transform/img_<NNN>/<prefix>_<NNN>_<label>.<ext>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchLayout {
    input_dir: PathBuf,
    output_root: PathBuf,
    prefix: String,
    extension: String,
}

impl BatchLayout {
    pub fn new(
        input_dir: impl Into<PathBuf>,
        output_root: impl Into<PathBuf>,
        prefix: &str,
        extension: &str,
    ) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_root: output_root.into(),
            prefix: prefix.to_string(),
            extension: extension.trim_start_matches('.').to_string(),
        }
    }

    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }

    /// File name of an input image, e.g. `imagen_007.bmp`.
    pub fn image_name(&self, item: WorkItem) -> String {
        format!("{}_{}.{}", self.prefix, item, self.extension)
    }

    /// Full path of an input image.
    pub fn input_path(&self, item: WorkItem) -> PathBuf {
        self.input_dir.join(self.image_name(item))
    }

    /// Shared directory created once before any worker starts.
    pub fn transform_root(&self) -> PathBuf {
        self.output_root.join(TRANSFORM_DIR)
    }

    /// Per-image output directory, e.g. `imagen_transform/img_007`.
    pub fn output_dir(&self, item: WorkItem) -> PathBuf {
        self.transform_root().join(format!("img_{}", item))
    }

    /// Output file for one transform variant of one image.
    pub fn output_path(&self, item: WorkItem, transform: &Transform) -> PathBuf {
        self.output_dir(item).join(format!(
            "{}_{}_{}.{}",
            self.prefix,
            item,
            transform.label(),
            self.extension
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> BatchLayout {
        BatchLayout::new("/in", "/out", "imagen", "bmp")
    }

    #[test]
    fn test_work_item_display_is_zero_padded() {
        assert_eq!(WorkItem::new(7).to_string(), "007");
        assert_eq!(WorkItem::new(100).to_string(), "100");
        assert_eq!(WorkItem::new(1234).to_string(), "1234");
    }

    #[test]
    fn test_input_path() {
        assert_eq!(
            layout().input_path(WorkItem::new(37)),
            PathBuf::from("/in/imagen_037.bmp")
        );
        assert_eq!(layout().image_name(WorkItem::new(1)), "imagen_001.bmp");
    }

    #[test]
    fn test_output_paths() {
        let layout = layout();
        let item = WorkItem::new(5);
        assert_eq!(
            layout.output_dir(item),
            PathBuf::from("/out/imagen_transform/img_005")
        );
        assert_eq!(
            layout.output_path(item, &Transform::GrayHMirror),
            PathBuf::from("/out/imagen_transform/img_005/imagen_005_gray_hmirror.bmp")
        );
        assert_eq!(
            layout.output_path(item, &Transform::Blur { kernel_size: 55 }),
            PathBuf::from("/out/imagen_transform/img_005/imagen_005_blur_55.bmp")
        );
    }

    #[test]
    fn test_extension_dot_is_optional() {
        let layout = BatchLayout::new("in", "out", "imagen", ".bmp");
        assert_eq!(layout.image_name(WorkItem::new(2)), "imagen_002.bmp");
    }
}
