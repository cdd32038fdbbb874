//! Markdown export of a generated design

use crate::types::{CacheEntry, ExportDocument};

/// Render a cache entry as a downloadable markdown document.
/// The generated text is included verbatim.
pub fn export_markdown(entry: &CacheEntry) -> ExportDocument {
    let snapshot = &entry.snapshot;
    let style = snapshot.style.trim();

    let mut content = String::new();
    content.push_str(&format!("# {} Home Design\n\n", if style.is_empty() { "Custom" } else { style }));
    content.push_str(&format!("- Scenario: {}\n", snapshot.scenario));
    content.push_str(&format!("- Budget: {}\n", snapshot.budget));
    content.push_str(&format!("- Priority: {}\n", snapshot.priority));
    if let Some(sqft) = snapshot.square_footage {
        content.push_str(&format!("- Size: {sqft} sq ft\n"));
    }
    content.push_str(&format!("- Generated: {}\n\n", entry.created_at.format("%Y-%m-%d %H:%M UTC")));
    content.push_str(&entry.generated_text);
    if !entry.generated_text.ends_with('\n') {
        content.push('\n');
    }

    if !entry.image_results.is_empty() {
        content.push_str("\n## Visual Inspiration\n\n");
        for image in &entry.image_results {
            content.push_str(&format!("- ![{}]({})\n", image.attribution, image.url));
        }
    }

    ExportDocument {
        file_name: format!("{}_home_design.md", file_slug(style)),
        mime_type: "text/markdown",
        content,
    }
}

/// Keep alphanumerics, collapse everything else to single underscores
fn file_slug(style: &str) -> String {
    let mut slug = String::new();
    for c in style.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
        } else if !slug.is_empty() && !slug.ends_with('_') {
            slug.push('_');
        }
    }
    let slug = slug.trim_end_matches('_');
    if slug.is_empty() { "custom".to_string() } else { slug.to_string() }
}
