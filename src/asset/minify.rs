//! Asset minification for JS and CSS files.
//!
//! Uses oxc for JavaScript and lightningcss for CSS. Unlike a best-effort
//! minifier, a parse failure here is an error: the source is malformed and
//! the task must stop.

use anyhow::{Result, anyhow};
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::{MangleOptions, MangleOptionsKeepNames};
use oxc::minifier::{CompressOptions, CompressOptionsKeepNames, Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;
use oxc::transformer::EngineTargets;

use super::script::TRANSPILE_TARGET;
use super::style::legacy_targets;

/// Minify a classic browser script.
///
/// Top-level names are left alone (files share the global scope once
/// bundled) and class names survive mangling. Compression stays within the
/// transpile target, so lowered syntax is not folded back.
pub fn minify_js(source: &str, name: &str) -> Result<String> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, SourceType::cjs()).parse();
    if !ret.errors.is_empty() {
        return Err(anyhow!("{name}: {}", join_errors(&ret.errors)));
    }
    let mut program = ret.program;

    let mut compress = CompressOptions::smallest();
    compress.target =
        EngineTargets::from_target(TRANSPILE_TARGET).map_err(|e| anyhow!("{name}: {e}"))?;
    compress.keep_names = CompressOptionsKeepNames {
        function: false,
        class: true,
    };
    let options = MinifierOptions {
        mangle: Some(MangleOptions {
            top_level: Some(false),
            keep_names: MangleOptionsKeepNames {
                function: false,
                class: true,
            },
            ..MangleOptions::default()
        }),
        compress: Some(compress),
    };
    let ret = Minifier::new(options).minify(&allocator, &mut program);
    let code = Codegen::new()
        .with_options(CodegenOptions {
            minify: true,
            comments: CommentOptions::disabled(),
            ..CodegenOptions::default()
        })
        .with_scoping(ret.scoping)
        .build(&program)
        .code;
    Ok(code)
}

/// Minify CSS, adding vendor prefixes for the legacy browser targets.
pub fn minify_css(source: &str, name: &str) -> Result<String> {
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
            minify: true,
            targets: legacy_targets(),
            ..PrinterOptions::default()
        })
        .map_err(|e| anyhow!("{name}: {e}"))?;
    Ok(result.code)
}

pub(super) fn join_errors(errors: &[oxc::diagnostics::OxcDiagnostic]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minify_css() {
        let css = minify_css(".a {\n  color: red;\n}\n", "a.css").unwrap();
        assert_eq!(css, ".a{color:red}");
    }

    #[test]
    fn test_minify_js_shrinks() {
        let source = "function greet(name) {\n  var message = 'hi ' + name;\n  return message;\n}\n";
        let out = minify_js(source, "a.js").unwrap();
        assert!(out.len() < source.len());
        assert!(out.contains("greet"));
    }

    #[test]
    fn test_minify_js_keeps_class_names() {
        let source = "function make() {\n  class Widget { render() { return 1; } }\n  return new Widget();\n}\n";
        let out = minify_js(source, "a.js").unwrap();
        assert!(out.contains("Widget"), "{out}");
    }

    #[test]
    fn test_minify_js_stays_at_transpile_target() {
        let source = "function f(a, b) {\n  var x = Math.pow(a, b);\n  var y = a === null || a === void 0 ? void 0 : a.c;\n  return [x, y !== null && y !== void 0 ? y : b];\n}\nwindow.f = f;\n";
        let out = minify_js(source, "a.js").unwrap();
        assert!(!out.contains("**"), "{out}");
        assert!(!out.contains("?."), "{out}");
        assert!(!out.contains("??"), "{out}");
    }

    #[test]
    fn test_minify_js_syntax_error() {
        let err = minify_js("function (", "broken.js").unwrap_err();
        assert!(err.to_string().contains("broken.js"));
    }
}
