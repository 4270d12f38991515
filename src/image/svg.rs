//! SVG optimization using usvg.
//!
//! usvg parses and normalizes the document (resolves styles, drops
//! editor metadata, flattens groups) and writes it back without
//! indentation. usvg is built without text shaping and only keeps what it
//! can render, so documents carrying anything it would discard are passed
//! through untouched.

use anyhow::{Context, Result};
use usvg::roxmltree::{Document, ParsingOptions};

use super::policy::SvgPolicy;

/// Elements usvg drops or flattens away on write.
const UNSUPPORTED_ELEMENTS: &[&str] = &[
    "text",
    "image",
    "foreignObject",
    "script",
    "a",
    "animate",
    "animateMotion",
    "animateTransform",
    "set",
    "title",
];

/// Optimize SVG bytes according to the policy.
///
/// Returns the input unchanged when the rewrite would lose content.
pub fn optimize_svg(content: &[u8], policy: &SvgPolicy) -> Result<Vec<u8>> {
    let tree = usvg::Tree::from_data(content, &usvg::Options::default())
        .context("Failed to parse SVG")?;

    if !is_lossless(content) {
        return Ok(content.to_vec());
    }

    let write_options = usvg::WriteOptions {
        indent: usvg::Indent::None,
        attributes_indent: usvg::Indent::None,
        ..Default::default()
    };

    let mut optimized = tree.to_string(&write_options);
    if policy.remove_view_box {
        optimized = remove_redundant_view_box(&optimized);
    }
    Ok(optimized.into_bytes())
}

/// Whether every element of the source survives a usvg round trip.
///
/// Sources that are not plain UTF-8 XML (e.g. gzip) count as lossy.
fn is_lossless(content: &[u8]) -> bool {
    let Ok(text) = std::str::from_utf8(content) else {
        return false;
    };
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let Ok(doc) = Document::parse_with_options(text, options) else {
        return false;
    };
    !doc.descendants()
        .filter(|node| node.is_element())
        .any(|node| UNSUPPORTED_ELEMENTS.contains(&node.tag_name().name()))
}

/// Drop the root `viewBox` when it is exactly `0 0 <width> <height>`.
fn remove_redundant_view_box(svg: &str) -> String {
    let Some(root_end) = svg.find("<svg").and_then(|start| {
        svg[start..].find('>').map(|end| start + end)
    }) else {
        return svg.to_string();
    };
    let root = &svg[..root_end];

    let (Some(width), Some(height)) = (
        extract_attr(root, r#" width=""#),
        extract_attr(root, r#" height=""#),
    ) else {
        return svg.to_string();
    };
    let Some(view_box) = extract_attr(root, r#" viewBox=""#) else {
        return svg.to_string();
    };

    let numbers: Vec<f32> = view_box
        .split([' ', ','])
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse().ok())
        .collect();
    let (Ok(w), Ok(h)) = (width.parse::<f32>(), height.parse::<f32>()) else {
        return svg.to_string();
    };
    if numbers != [0.0, 0.0, w, h] {
        return svg.to_string();
    }

    let attr = format!(r#" viewBox="{view_box}""#);
    svg.replacen(&attr, "", 1)
}

/// Extract attribute value between prefix and closing quote
#[inline]
fn extract_attr<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let start = s.find(prefix)? + prefix.len();
    let end = start + s.as_bytes()[start..].iter().position(|&b| b == b'"')?;
    Some(&s[start..end])
}
