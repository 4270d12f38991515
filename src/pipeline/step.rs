//! The transformation vocabulary and the in-flight file it operates on.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde_json::Value;

use crate::asset::{
    autoprefix, compile_sass as compile_scss, concat as join_files, is_partial, is_webp_source,
    minify_css, minify_js, transpile_js,
};
use crate::image::{IMAGE_POLICY, ImageKind, convert_to_webp, optimize_image};
use crate::template::{Context as IncludeContext, resolve_includes};

/// A file moving through a task: where it came from, where it goes, what it holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    /// Output name, relative to the class output directory.
    pub name: PathBuf,
    /// Absolute source path (for diagnostics and relative lookups).
    pub source: PathBuf,
    pub contents: Vec<u8>,
}

impl Asset {
    pub fn read(source: &Path) -> Result<Self> {
        let contents = std::fs::read(source)
            .with_context(|| format!("failed to read {}", source.display()))?;
        let name = source
            .file_name()
            .map(PathBuf::from)
            .with_context(|| format!("{} has no file name", source.display()))?;
        Ok(Self {
            name,
            source: source.to_path_buf(),
            contents,
        })
    }

    fn text(&self) -> Result<&str> {
        std::str::from_utf8(&self.contents)
            .with_context(|| format!("{} is not valid UTF-8", self.source.display()))
    }

    fn label(&self) -> String {
        self.source.display().to_string()
    }

    /// Replace the contents with the result of a text transformation.
    fn map_text(mut self, f: impl FnOnce(&str, &str) -> Result<String>) -> Result<Self> {
        let out = f(self.text()?, &self.label())?;
        self.contents = out.into_bytes();
        Ok(self)
    }
}

/// One transformation applied to every asset of a task.
///
/// Most steps map files one-to-one. `CompileSass` drops partials, `Concat`
/// folds everything into one file and `ConvertWebp` adds siblings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Expand `@@include` / `@@if` / `@@var` directives. With
    /// `expose_profile`, templates see `hard = true`.
    ResolveIncludes { expose_profile: bool },
    CompileSass,
    Autoprefix,
    MinifyCss,
    TranspileJs,
    /// Minify with mangling, keeping class names.
    MinifyJs,
    Concat { name: &'static str },
    /// Add a lossless `<stem>.webp` next to every jpg/jpeg/png.
    ConvertWebp,
    OptimizeImage,
}

impl Step {
    pub fn apply(self, assets: Vec<Asset>) -> Result<Vec<Asset>> {
        match self {
            Self::ResolveIncludes { expose_profile } => {
                let context = include_context(expose_profile);
                each(assets, |asset| {
                    let source = asset.source.clone();
                    asset.map_text(|text, _| Ok(resolve_includes(text, &source, &context)?))
                })
            }
            Self::CompileSass => assets
                .into_iter()
                .filter(|asset| !is_partial(&asset.source))
                .map(compile_sass)
                .collect(),
            Self::Autoprefix => each(assets, |file| file.map_text(autoprefix)),
            Self::MinifyCss => each(assets, |file| file.map_text(minify_css)),
            Self::TranspileJs => each(assets, |file| file.map_text(transpile_js)),
            Self::MinifyJs => each(assets, |file| file.map_text(minify_js)),
            Self::Concat { name } => Ok(concat(assets, name)),
            Self::ConvertWebp => convert_webp(assets),
            Self::OptimizeImage => assets.into_par_iter().map(optimize).collect(),
        }
    }
}

fn each(assets: Vec<Asset>, f: impl FnMut(Asset) -> Result<Asset>) -> Result<Vec<Asset>> {
    assets.into_iter().map(f).collect()
}

/// Variables visible to markup directives.
///
/// Only the hard profile defines `hard`. Under soft it is undefined rather
/// than `false`: `@@if (!hard)` still takes the soft branch, but a bare
/// `@@hard` is left as literal text instead of rendering `false`.
fn include_context(expose_profile: bool) -> IncludeContext {
    let mut context = IncludeContext::new();
    if expose_profile {
        context.insert("hard".to_owned(), Value::Bool(true));
    }
    context
}

fn compile_sass(asset: Asset) -> Result<Asset> {
    let load_dir = asset
        .source
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    let mut asset = asset.map_text(|text, name| compile_scss(text, name, &load_dir))?;
    asset.name.set_extension("css");
    Ok(asset)
}

/// Nothing in, nothing out: an empty script directory yields no bundle.
fn concat(assets: Vec<Asset>, name: &str) -> Vec<Asset> {
    let Some(first) = assets.first() else {
        return Vec::new();
    };
    let source = first
        .source
        .parent()
        .map(|dir| dir.join(name))
        .unwrap_or_else(|| PathBuf::from(name));
    let contents = join_files(assets.iter().map(|asset| asset.contents.as_slice()));
    vec![Asset {
        name: PathBuf::from(name),
        source,
        contents,
    }]
}

fn convert_webp(assets: Vec<Asset>) -> Result<Vec<Asset>> {
    let groups = assets
        .into_par_iter()
        .map(|asset| {
            if !is_webp_source(&asset.source) {
                return Ok(vec![asset]);
            }
            let webp = convert_to_webp(&asset.contents)
                .with_context(|| format!("failed to convert {} to webp", asset.label()))?;
            let sibling = Asset {
                name: asset.name.with_extension("webp"),
                source: asset.source.clone(),
                contents: webp,
            };
            Ok(vec![asset, sibling])
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(groups.into_iter().flatten().collect())
}

/// Converted siblings are already WebP, which the optimizer passes through.
fn optimize(mut asset: Asset) -> Result<Asset> {
    if ImageKind::from_path(&asset.name) == Some(ImageKind::Webp) {
        return Ok(asset);
    }
    asset.contents = optimize_image(&asset.source, &asset.contents, &IMAGE_POLICY)?;
    Ok(asset)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(name: &str, contents: &str) -> Asset {
        Asset {
            name: PathBuf::from(name),
            source: PathBuf::from("/site/app").join(name),
            contents: contents.as_bytes().to_vec(),
        }
    }

    #[test]
    fn test_concat_order_and_name() {
        let out = Step::Concat { name: "bundle.js" }
            .apply(vec![asset("a.js", "var a;"), asset("b.js", "var b;")])
            .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, PathBuf::from("bundle.js"));
        assert_eq!(out[0].contents, b"var a;\nvar b;");
    }

    #[test]
    fn test_concat_empty() {
        let out = Step::Concat { name: "bundle.js" }.apply(Vec::new()).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_include_context_only_when_exposed() {
        let src = "@@if (hard) {H}@@if (!hard) {S}";
        let soft = Step::ResolveIncludes {
            expose_profile: false,
        }
        .apply(vec![asset("index.html", src)])
        .unwrap();
        assert_eq!(soft[0].contents, b"S");

        let hard = Step::ResolveIncludes {
            expose_profile: true,
        }
        .apply(vec![asset("index.html", src)])
        .unwrap();
        assert_eq!(hard[0].contents, b"H");
    }

    #[test]
    fn test_compile_sass_skips_partials_and_renames() {
        let out = Step::CompileSass
            .apply(vec![
                asset("_vars.scss", "$c: red;"),
                asset("main.scss", ".a { .b { color: red; } }"),
            ])
            .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, PathBuf::from("main.css"));
        let css = String::from_utf8(out[0].contents.clone()).unwrap();
        assert!(css.contains(".a .b"));
    }

    #[test]
    fn test_error_names_source() {
        let err = Step::MinifyJs
            .apply(vec![asset("broken.js", "function (")])
            .unwrap_err();
        assert!(format!("{err:#}").contains("broken.js"));
    }

    #[test]
    fn test_non_utf8_rejected() {
        let bad = Asset {
            name: PathBuf::from("x.css"),
            source: PathBuf::from("/site/app/css/x.css"),
            contents: vec![0xff, 0xfe],
        };
        let err = Step::MinifyCss.apply(vec![bad]).unwrap_err();
        assert!(err.to_string().contains("UTF-8"));
    }
}
