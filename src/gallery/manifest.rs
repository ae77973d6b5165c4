use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::scan::GalleryImage;
use crate::error::{Result, SiteError};
use crate::state::data::Category;

/// `gallery-manifest.json` contents
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Manifest {
    pub generated_at: NaiveDateTime,
    pub total_images: usize,
    pub images: Vec<GalleryImage>,
}

impl Manifest {
    pub fn new(images: Vec<GalleryImage>, generated_at: NaiveDateTime) -> Self {
        Self {
            generated_at,
            total_images: images.len(),
            images,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_json()?).map_err(|e| SiteError::io(path, e))
    }

    pub fn read(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path).map_err(|e| SiteError::io(path, e))?;
        Ok(serde_json::from_str(&json)?)
    }
}

/// Image count per category, ordered by category slug
pub fn category_counts(images: &[GalleryImage]) -> Vec<(Category, usize)> {
    let mut counts: BTreeMap<&str, (Category, usize)> = BTreeMap::new();
    for image in images {
        counts
            .entry(image.category.slug())
            .or_insert((image.category, 0))
            .1 += 1;
    }
    counts.into_values().collect()
}

/// Human-readable summary printed by the gallery tool
pub fn render_stats(images: &[GalleryImage]) -> String {
    if images.is_empty() {
        return "📊 No images found!".to_string();
    }
    let mut out = format!("📊 Found {} image(s):\n{}\n", images.len(), "-".repeat(40));
    for (category, count) in category_counts(images) {
        out += &format!("  {} {}: {}\n", category.icon(), category.display_name(), count);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn images() -> Vec<GalleryImage> {
        ["silk-blouse.jpg", "party-gown.jpg", "choli.png", "saree.png"]
            .iter()
            .map(|f| GalleryImage::new(f, "Rudransh Tailoring"))
            .collect()
    }

    #[test]
    fn test_counts_ordered_by_slug() {
        let counts = category_counts(&images());
        assert_eq!(
            counts,
            vec![(Category::Blouse, 2), (Category::Gown, 1), (Category::Other, 1)]
        );
    }

    #[test]
    fn test_stats_text() {
        let stats = render_stats(&images());
        assert!(stats.starts_with("📊 Found 4 image(s):\n"));
        assert!(stats.contains("  👔 Blouse: 2\n"));
        assert!(stats.contains("  👘 Other: 1\n"));
        assert_eq!(render_stats(&[]), "📊 No images found!");
    }

    #[test]
    fn test_manifest_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gallery-manifest.json");
        let at = NaiveDate::from_ymd_opt(2026, 10, 19)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let manifest = Manifest::new(images(), at);
        manifest.write(&path).unwrap();

        let json = std::fs::read_to_string(&path).unwrap();
        assert!(json.contains("\"generated_at\": \"2026-10-19T09:00:00\""));
        assert!(json.contains("\"total_images\": 4"));
        assert!(json.contains("\"category\": \"blouse\""));
        assert!(!json.contains("width"));
        assert_eq!(Manifest::read(&path).unwrap(), manifest);
    }
}
