//! Gallery page regeneration.
//!
//! Only the contents of the admin gallery grid are rewritten; everything else
//! in the page is left byte-for-byte as it was.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::Regex;

use super::scan::GalleryImage;
use crate::error::{Result, SiteError};

/// Id of the grid the tool owns
pub const GRID_ID: &str = "adminGallery";
pub const GRID_OPEN: &str = r#"<div class="gallery-grid" id="adminGallery">"#;

/// Opening or closing `div` tags
static DIV_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<div[\s>]|</div\s*>").expect("div pattern is valid"));

/// Escape text for use in element content and quoted attributes
pub fn escape(text: &str) -> String {
    v_htmlescape::escape(text).to_string()
}

fn render_tile(image: &GalleryImage) -> String {
    let title = escape(&image.title);
    let path = escape(&image.path);
    format!(
        r#"                <!-- {comment} -->
                <div class="gallery-item" data-category="{category}">
                    <div class="gallery-image-wrapper">
                        <img src="{path}" alt="{title}" loading="lazy">
                    </div>
                    <div class="gallery-info">
                        <h4>{title}</h4>
                        <p>{description}</p>
                        <p style="color: var(--primary); font-size: 0.85rem; margin-top: 8px;">👆 Click to view &amp; order</p>
                    </div>
                </div>"#,
        comment = title.replace("--", "- -"),
        category = image.category.slug(),
        path = path,
        title = title,
        description = escape(&image.description),
    )
}

/// Tile markup for every image, in order
pub fn render_tiles(images: &[GalleryImage]) -> String {
    if images.is_empty() {
        return "<!-- No images found in images/ folder -->".to_string();
    }
    images.iter().map(render_tile).collect::<Vec<_>>().join("\n")
}

/// Everything that goes between the grid's opening and closing tags
pub fn render_grid_body(images: &[GalleryImage], at: NaiveDateTime) -> String {
    format!(
        r#"
                    <!-- Auto-generated gallery - {stamp} -->
                    <p style="color: #666; text-align: center; grid-column: 1/-1; padding: 10px; font-size: 0.9rem;">
                        🖼️ Showing {count} design(s)
                    </p>
{tiles}
                "#,
        stamp = at.format("%Y-%m-%d %H:%M:%S"),
        count = images.len(),
        tiles = render_tiles(images),
    )
}

/// Byte range of the grid's contents, between its opening tag and the
/// matching `</div>`
fn grid_contents(page: &str) -> Option<(usize, usize)> {
    let start = page.find(GRID_OPEN)? + GRID_OPEN.len();
    let mut depth = 1usize;
    for tag in DIV_TAG.find_iter(&page[start..]) {
        if tag.as_str().starts_with("</") {
            depth -= 1;
            if depth == 0 {
                return Some((start, start + tag.start()));
            }
        } else {
            depth += 1;
        }
    }
    None
}

/// Replace the grid's contents with `body`
pub fn replace_grid(page: &str, body: &str) -> Result<String> {
    let (start, end) =
        grid_contents(page).ok_or_else(|| SiteError::GalleryGridMissing(GRID_ID.to_string()))?;
    let mut out = String::with_capacity(page.len() + body.len());
    out.push_str(&page[..start]);
    out.push_str(body);
    out.push_str(&page[end..]);
    Ok(out)
}

/// Rewrite the gallery page at `path` in place
pub fn update_page(path: &Path, images: &[GalleryImage], at: NaiveDateTime) -> Result<()> {
    let page = fs::read_to_string(path).map_err(|e| SiteError::io(path, e))?;
    let updated = replace_grid(&page, &render_grid_body(images, at))?;
    fs::write(path, updated).map_err(|e| SiteError::io(path, e))
}
