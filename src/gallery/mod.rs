/// Offline gallery generator
///
/// Turns a folder of garment photos into the gallery page's tile grid:
/// - Folder scanning and category detection (scan.rs)
/// - JSON manifest and per-category statistics (manifest.rs)
/// - In-place regeneration of the admin gallery grid (html.rs)
pub mod html;
pub mod manifest;
pub mod scan;

use std::path::PathBuf;

use chrono::NaiveDateTime;
use tracing::info;

use crate::error::Result;

pub use manifest::Manifest;
pub use scan::GalleryImage;

/// Manifest file written next to the images
pub const MANIFEST_FILE: &str = "gallery-manifest.json";

/// Inputs of one generator run
#[derive(Debug, Clone)]
pub struct GalleryJob {
    pub images_dir: PathBuf,
    pub page: PathBuf,
    pub manifest: PathBuf,
    pub business_name: String,
    /// Scan and report without touching any file
    pub dry_run: bool,
}

impl GalleryJob {
    /// Standard site layout: `<root>/images`, `<root>/gallery.html`
    pub fn for_site(root: &std::path::Path, business_name: &str) -> Self {
        let images_dir = root.join("images");
        Self {
            manifest: images_dir.join(MANIFEST_FILE),
            page: root.join("gallery.html"),
            images_dir,
            business_name: business_name.to_string(),
            dry_run: false,
        }
    }
}

/// What a run found and changed
#[derive(Debug, Clone)]
pub struct GalleryReport {
    pub manifest: Manifest,
    pub wrote_files: bool,
}

/// Scan, then write the manifest and regenerate the page. Nothing is written
/// for a dry run or when no images were found.
pub fn generate(job: &GalleryJob, at: NaiveDateTime) -> Result<GalleryReport> {
    let images = scan::scan_images(&job.images_dir, &job.business_name)?;
    let manifest = Manifest::new(images, at);

    if job.dry_run || manifest.images.is_empty() {
        return Ok(GalleryReport {
            manifest,
            wrote_files: false,
        });
    }

    manifest.write(&job.manifest)?;
    info!("manifest saved to {}", job.manifest.display());
    html::update_page(&job.page, &manifest.images, at)?;
    info!("gallery page updated: {}", job.page.display());

    Ok(GalleryReport {
        manifest,
        wrote_files: true,
    })
}
