//! `@@` directive resolution for markup.
//!
//! Supported directives:
//!
//! ```text
//! @@include('link_templates/head.html')
//! @@include("card.html", { "title": "News" })
//! @@if (hard) { <script src="js/bundle.js"></script> }
//! @@title
//! ```
//!
//! Include paths are relative to the including file. Parameters are merged
//! over the inherited context for the included file only. Text without a
//! recognized directive is copied through unchanged.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use super::condition::{evaluate, lookup};
use super::error::IncludeError;

/// Maximum include nesting.
pub const MAX_DEPTH: usize = 32;

const PREFIX: &str = "@@";

static IDENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_$][\w$]*(?:\.[A-Za-z_$][\w$]*)*").expect("valid ident regex")
});

/// Variables visible to directives.
pub type Context = Map<String, Value>;

/// Resolve every directive in `source`, which was read from `file`.
pub fn resolve_includes(source: &str, file: &Path, context: &Context) -> Result<String, IncludeError> {
    if !source.contains(PREFIX) {
        return Ok(source.to_string());
    }
    let mut resolver = Resolver {
        stack: vec![canonical(file)],
    };
    resolver.process(source, file, context)
}

struct Resolver {
    /// Files currently being expanded, outermost first.
    stack: Vec<PathBuf>,
}

impl Resolver {
    fn process(&mut self, text: &str, file: &Path, context: &Context) -> Result<String, IncludeError> {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        let mut offset = 0;

        while let Some(pos) = rest.find(PREFIX) {
            out.push_str(&rest[..pos]);
            let at = offset + pos;
            let tail = &rest[pos + PREFIX.len()..];

            let directive = if let Some(args) = tail.strip_prefix("include") {
                self.include(args, text, at, file, context, &mut out)?
                    .map(|n| "include".len() + n)
            } else if let Some(args) = tail.strip_prefix("if") {
                self.conditional(args, text, at, file, context, &mut out)?
                    .map(|n| "if".len() + n)
            } else {
                None
            };

            // Not a call: try a variable, otherwise `@@` is literal text.
            let consumed = match directive.or_else(|| substitute(tail, context, &mut out)) {
                Some(n) => PREFIX.len() + n,
                None => {
                    out.push_str(PREFIX);
                    PREFIX.len()
                }
            };
            rest = &rest[pos + consumed..];
            offset = at + consumed;
        }

        out.push_str(rest);
        Ok(out)
    }

    /// Expand `@@include(...)`. `args` starts right after the keyword.
    /// Returns the number of bytes consumed from `args`, or `None` when this
    /// is not an include call (e.g. `@@included` variable).
    fn include(
        &mut self,
        args: &str,
        text: &str,
        at: usize,
        file: &Path,
        context: &Context,
        out: &mut String,
    ) -> Result<Option<usize>, IncludeError> {
        let trimmed = args.trim_start();
        let Some(inner) = trimmed.strip_prefix('(') else {
            return Ok(None);
        };
        let lead = args.len() - trimmed.len() + 1;
        let line = line_of(text, at);

        let close = find_closing(inner, b'(', b')').ok_or_else(|| IncludeError::Unterminated {
            file: file.to_path_buf(),
            line,
            directive: "include",
        })?;
        let (target, params) =
            parse_include_args(&inner[..close]).map_err(|reason| IncludeError::BadArguments {
                file: file.to_path_buf(),
                line,
                reason,
            })?;

        let base = file.parent().unwrap_or(Path::new(""));
        let target_path = base.join(&target);

        if self.stack.len() > MAX_DEPTH {
            return Err(IncludeError::TooDeep {
                file: file.to_path_buf(),
            });
        }
        let key = canonical(&target_path);
        if self.stack.contains(&key) {
            return Err(IncludeError::Cycle {
                file: file.to_path_buf(),
                target: target_path,
            });
        }

        let content = fs::read_to_string(&target_path).map_err(|source| IncludeError::Missing {
            file: file.to_path_buf(),
            line,
            target: target_path.clone(),
            source,
        })?;

        let mut scoped = context.clone();
        scoped.extend(params);

        self.stack.push(key);
        let expanded = self.process(&content, &target_path, &scoped);
        self.stack.pop();
        out.push_str(&expanded?);

        Ok(Some(lead + close + 1))
    }

    /// Expand `@@if (cond) { body }`. `args` starts right after the keyword.
    fn conditional(
        &mut self,
        args: &str,
        text: &str,
        at: usize,
        file: &Path,
        context: &Context,
        out: &mut String,
    ) -> Result<Option<usize>, IncludeError> {
        let trimmed = args.trim_start();
        let Some(inner) = trimmed.strip_prefix('(') else {
            return Ok(None);
        };
        let line = line_of(text, at);
        let unterminated = || IncludeError::Unterminated {
            file: file.to_path_buf(),
            line,
            directive: "if",
        };

        let close = find_closing(inner, b'(', b')').ok_or_else(unterminated)?;
        let condition = &inner[..close];

        let after = &inner[close + 1..];
        let body_start = after.trim_start();
        let Some(body) = body_start.strip_prefix('{') else {
            return Err(unterminated());
        };
        let body_end = find_closing(body, b'{', b'}').ok_or_else(unterminated)?;

        let keep = evaluate(condition, context).ok_or_else(|| IncludeError::BadCondition {
            file: file.to_path_buf(),
            line,
            condition: condition.trim().to_string(),
        })?;
        if keep {
            let expanded = self.process(&body[..body_end], file, context)?;
            out.push_str(&expanded);
        }

        let consumed = (args.len() - trimmed.len())
            + 1
            + close
            + 1
            + (after.len() - body_start.len())
            + 1
            + body_end
            + 1;
        Ok(Some(consumed))
    }
}

/// Replace `@@name` with its context value. Returns bytes consumed after
/// the prefix, or `None` when the name is not defined.
fn substitute(tail: &str, context: &Context, out: &mut String) -> Option<usize> {
    let name = IDENT.find(tail)?.as_str();
    let value = lookup(context, name)?;
    match value {
        Value::String(s) => out.push_str(s),
        other => out.push_str(&other.to_string()),
    }
    Some(name.len())
}

/// Parse `'path'` or `"path", { json }`.
fn parse_include_args(args: &str) -> Result<(String, Context), String> {
    let args = args.trim();
    let quote = args
        .chars()
        .next()
        .filter(|c| *c == '\'' || *c == '"')
        .ok_or_else(|| "expected a quoted path".to_string())?;
    let body = &args[1..];
    let end = body
        .find(quote)
        .ok_or_else(|| "unterminated path string".to_string())?;
    let target = body[..end].to_string();
    if target.is_empty() {
        return Err("empty path".into());
    }

    let rest = body[end + 1..].trim();
    if rest.is_empty() {
        return Ok((target, Context::new()));
    }
    let json = rest
        .strip_prefix(',')
        .ok_or_else(|| format!("unexpected `{rest}` after path"))?
        .trim();
    let params: Context = serde_json::from_str(json).map_err(|e| format!("parameters: {e}"))?;
    Ok((target, params))
}

/// Find the byte index of the bracket closing an already-opened one.
/// Quoted strings are skipped.
fn find_closing(s: &str, open: u8, close: u8) -> Option<usize> {
    let mut depth = 1usize;
    let mut quote: Option<u8> = None;
    let mut escaped = false;

    for (i, &b) in s.as_bytes().iter().enumerate() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == q {
                quote = None;
            }
            continue;
        }
        match b {
            b'"' | b'\'' if open == b'(' => quote = Some(b),
            _ if b == open => depth += 1,
            _ if b == close => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn line_of(text: &str, at: usize) -> usize {
    text[..at].matches('\n').count() + 1
}

fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}
