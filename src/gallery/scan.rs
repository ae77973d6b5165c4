use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{Result, SiteError};
use crate::state::data::Category;

/// Accepted image extensions, compared case-insensitively
pub const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];

/// Folder the page loads gallery images from
pub const WEB_IMAGE_DIR: &str = "images";

/// One image found in the gallery folder
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GalleryImage {
    pub filename: String,
    /// Path as referenced from the page
    pub path: String,
    pub category: Category,
    pub title: String,
    pub description: String,
    /// Pixel size, when the header could be read
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

impl GalleryImage {
    pub fn new(filename: &str, business_name: &str) -> Self {
        let category = Category::detect(filename);
        Self {
            filename: filename.to_string(),
            path: format!("{}/{}", WEB_IMAGE_DIR, filename),
            category,
            title: format_title(filename),
            description: describe(category, business_name),
            width: None,
            height: None,
        }
    }
}

/// `red-silk_blouse.jpg` -> `Red Silk Blouse`
pub fn format_title(filename: &str) -> String {
    let stem = Path::new(filename)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    let mut title = String::with_capacity(stem.len());
    let mut word_start = true;
    for c in stem.chars() {
        let c = if c == '-' || c == '_' { ' ' } else { c };
        if word_start {
            title.extend(c.to_uppercase());
        } else {
            title.extend(c.to_lowercase());
        }
        word_start = !c.is_alphabetic();
    }
    title
}

pub fn describe(category: Category, business_name: &str) -> String {
    format!("Beautiful custom {} by {}", category.display_name(), business_name)
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

/// List the images directly inside `dir`, sorted by category then filename
pub fn scan_images(dir: &Path, business_name: &str) -> Result<Vec<GalleryImage>> {
    if !dir.is_dir() {
        return Err(SiteError::io(
            dir,
            io::Error::new(io::ErrorKind::NotFound, "images folder not found"),
        ));
    }

    let mut images = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.is_file() || !is_image(path) {
            continue;
        }
        let filename = entry.file_name().to_string_lossy().to_string();
        if filename.starts_with("README") {
            continue;
        }

        let mut image = GalleryImage::new(&filename, business_name);
        match image::image_dimensions(path) {
            Ok((width, height)) => {
                image.width = Some(width);
                image.height = Some(height);
            }
            Err(e) => warn!("{}: unreadable image header: {}", filename, e),
        }
        debug!(filename = %filename, category = image.category.slug(), "found image");
        images.push(image);
    }

    images.sort_by(|a, b| {
        (a.category.slug(), &a.filename).cmp(&(b.category.slug(), &b.filename))
    });
    Ok(images)
}
