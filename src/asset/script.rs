//! Script lowering and bundling.

use anyhow::{Result, anyhow};
use oxc::allocator::Allocator;
use oxc::codegen::Codegen;
use oxc::parser::Parser;
use oxc::semantic::SemanticBuilder;
use oxc::span::SourceType;
use oxc::transformer::{TransformOptions, Transformer};
use std::path::Path;

use super::minify::join_errors;

/// Syntax level scripts are lowered to.
pub(super) const TRANSPILE_TARGET: &str = "es2015";

/// Separator placed between bundled files.
const CONCAT_SEPARATOR: &str = "\n";

/// Lower newer syntax (optional chaining, class fields, `**`, ...) to ES2015.
pub fn transpile_js(source: &str, name: &str) -> Result<String> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, SourceType::cjs()).parse();
    if !ret.errors.is_empty() {
        return Err(anyhow!("{name}: {}", join_errors(&ret.errors)));
    }
    let mut program = ret.program;

    let scoping = SemanticBuilder::new()
        .build(&program)
        .semantic
        .into_scoping();

    let options =
        TransformOptions::from_target(TRANSPILE_TARGET).map_err(|e| anyhow!("{name}: {e}"))?;
    let ret = Transformer::new(&allocator, Path::new(name), &options)
        .build_with_scoping(scoping, &mut program);
    if !ret.errors.is_empty() {
        return Err(anyhow!("{name}: {}", join_errors(&ret.errors)));
    }

    Ok(Codegen::new().build(&program).code)
}

/// Join scripts in order into one bundle.
pub fn concat<'a>(parts: impl IntoIterator<Item = &'a [u8]>) -> Vec<u8> {
    let mut bundle = Vec::new();
    for part in parts {
        if !bundle.is_empty() {
            bundle.extend_from_slice(CONCAT_SEPARATOR.as_bytes());
        }
        bundle.extend_from_slice(part);
    }
    bundle
}
