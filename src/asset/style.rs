//! Stylesheet compilation: SCSS via grass, vendor prefixing via lightningcss.

use std::path::Path;

use anyhow::{Result, anyhow};
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::{Browsers, Targets};

/// Encode a browser version the way lightningcss expects (`major << 16 | minor << 8`).
const fn version(major: u32, minor: u32) -> Option<u32> {
    Some((major << 16) | (minor << 8))
}

/// Fixed legacy browser set used for prefixing.
///
/// Roughly "last 2 versions" at the time prefixed properties still mattered,
/// so flexbox, transforms, transitions and `user-select` get their prefixes.
pub fn legacy_targets() -> Targets {
    Targets::from(Browsers {
        android: version(4, 4),
        chrome: version(49, 0),
        edge: version(12, 0),
        firefox: version(52, 0),
        ie: version(11, 0),
        ios_saf: version(9, 0),
        opera: version(36, 0),
        safari: version(9, 0),
        samsung: version(5, 0),
    })
}

/// Whether a SCSS file is a partial (`_name.scss`), only reachable through `@use`/`@import`.
pub fn is_partial(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('_'))
}

/// Compile SCSS to expanded CSS.
///
/// `load_dir` is searched for `@use`/`@import` targets (the SCSS directory).
pub fn compile_sass(source: &str, name: &str, load_dir: &Path) -> Result<String> {
    let options = grass::Options::default()
        .style(grass::OutputStyle::Expanded)
        .load_path(load_dir);
    grass::from_string(source.to_string(), &options).map_err(|e| anyhow!("{name}: {e}"))
}

/// Add vendor prefixes, keeping the output readable.
pub fn autoprefix(source: &str, name: &str) -> Result<String> {
    let mut stylesheet = StyleSheet::parse(
        source,
        ParserOptions {
            filename: name.to_string(),
            ..ParserOptions::default()
        },
    )
    .map_err(|e| anyhow!("{name}: {e}"))?;

    stylesheet
        .minify(MinifyOptions {
            targets: legacy_targets(),
            ..MinifyOptions::default()
        })
        .map_err(|e| anyhow!("{name}: {e}"))?;

    let result = stylesheet
        .to_css(PrinterOptions {
            minify: false,
            targets: legacy_targets(),
            ..PrinterOptions::default()
        })
        .map_err(|e| anyhow!("{name}: {e}"))?;
    Ok(result.code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_compile_sass_nesting() {
        let temp = TempDir::new().unwrap();
        let css = compile_sass(
            "$c: red;\n.nav { a { color: $c; } }\n",
            "main.scss",
            temp.path(),
        )
        .unwrap();
        assert!(css.contains(".nav a"));
        assert!(css.contains("color: red"));
    }

    #[test]
    fn test_compile_sass_uses_load_dir() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("_vars.scss"), "$gap: 4px;\n").unwrap();
        let css = compile_sass(
            "@import 'vars';\n.a { margin: $gap; }\n",
            "main.scss",
            temp.path(),
        )
        .unwrap();
        assert!(css.contains("margin: 4px"));
    }

    #[test]
    fn test_compile_sass_error_names_file() {
        let temp = TempDir::new().unwrap();
        let err = compile_sass(".a { color: $missing; }", "main.scss", temp.path()).unwrap_err();
        assert!(err.to_string().starts_with("main.scss"));
    }

    #[test]
    fn test_autoprefix_adds_prefix() {
        let css = autoprefix(".a { user-select: none; }", "a.css").unwrap();
        assert!(css.contains("-webkit-user-select"), "{css}");
        // still readable
        assert!(css.contains('\n'));
    }

    #[test]
    fn test_is_partial() {
        assert!(is_partial(Path::new("app/scss/_vars.scss")));
        assert!(!is_partial(Path::new("app/scss/main.scss")));
    }
}
