//! Pre-run inventory of which batch inputs are present on disk.

use std::collections::HashMap;
use walkdir::WalkDir;

use super::layout::{BatchLayout, WorkItem};

/// Present and missing inputs for a batch of `1..=N` ordinals.
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    /// Ordinals whose input file exists
    pub present: Vec<WorkItem>,
    /// Ordinals whose input file is absent
    pub missing: Vec<WorkItem>,
    /// Total size of the present inputs in bytes
    pub total_bytes: u64,
}

impl Inventory {
    /// Scan the input directory (non-recursively) for the batch's files.
    ///
    /// An unreadable or absent directory yields an inventory with every
    /// ordinal missing.
    pub fn scan(layout: &BatchLayout, num_images: u32) -> Self {
        let mut sizes = HashMap::new();
        for entry in WalkDir::new(layout.input_dir())
            .max_depth(1)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }
            if let (Some(name), Ok(meta)) = (entry.file_name().to_str(), entry.metadata()) {
                sizes.insert(name.to_string(), meta.len());
            }
        }

        let mut inventory = Inventory::default();
        for ordinal in 1..=num_images {
            let item = WorkItem::new(ordinal);
            match sizes.get(&layout.image_name(item)) {
                Some(&size) => {
                    inventory.present.push(item);
                    inventory.total_bytes += size;
                }
                None => inventory.missing.push(item),
            }
        }
        inventory
    }

    /// Number of ordinals scanned.
    pub fn len(&self) -> usize {
        self.present.len() + self.missing.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_splits_present_and_missing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("imagen_001.bmp"), [0u8; 60]).unwrap();
        std::fs::write(dir.path().join("imagen_003.bmp"), [0u8; 70]).unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();

        let layout = BatchLayout::new(dir.path(), dir.path(), "imagen", "bmp");
        let inventory = Inventory::scan(&layout, 4);

        assert_eq!(inventory.present, vec![WorkItem::new(1), WorkItem::new(3)]);
        assert_eq!(inventory.missing, vec![WorkItem::new(2), WorkItem::new(4)]);
        assert_eq!(inventory.total_bytes, 130);
        assert_eq!(inventory.len(), 4);
    }

    #[test]
    fn test_scan_ignores_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested");
        std::fs::create_dir(&nested).unwrap();
        std::fs::write(nested.join("imagen_001.bmp"), [0u8; 60]).unwrap();

        let layout = BatchLayout::new(dir.path(), dir.path(), "imagen", "bmp");
        let inventory = Inventory::scan(&layout, 1);
        assert!(inventory.present.is_empty());
    }

    #[test]
    fn test_scan_missing_directory() {
        let layout = BatchLayout::new("/definitely/not/here", ".", "imagen", "bmp");
        let inventory = Inventory::scan(&layout, 3);
        assert_eq!(inventory.missing.len(), 3);
        assert!(!inventory.is_empty());
    }
}
