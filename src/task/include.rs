// src/task/include.rs

//! `@@` directive expansion for HTML and JS sources.
//!
//! Supported directives:
//!
//! ```text
//! @@include('pages/include/header.html')
//! @@include("components/card.html", { "title": "Hello" })
//! @@if (svgSpriteExists) { ... }
//! @@if (!svgSpriteExists) { ... }
//! @@if (theme === 'dark') { ... }
//! @@title
//! ```
//!
//! Conditionals are resolved first, then includes (each included file is
//! fully expanded with the merged context), then context keys are
//! substituted, longest key first. A condition other than a name, a negated
//! name, or an `==`/`!=`/`===`/`!==` comparison fails the expansion.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result, anyhow, bail};
use regex::Regex;
use serde_json::{Map, Number, Value};

use crate::fs::FileSystem;
use crate::watch::path_utils::normalize_lexically;

/// Values visible to `@@if` and `@@name` directives.
pub type IncludeContext = Map<String, Value>;

const INCLUDE: &str = "@@include";
const IF: &str = "@@if";

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(!?)\s*([A-Za-z_$][\w$]*)$").expect("static regex"));

static COMPARISON_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+?)\s*(===|!==|==|!=)\s*(.+)$").expect("static regex"));

pub struct IncludeExpander<'a> {
    fs: &'a dyn FileSystem,
    base: &'a Path,
}

impl<'a> IncludeExpander<'a> {
    /// `base` is the directory include paths are resolved against.
    pub fn new(fs: &'a dyn FileSystem, base: &'a Path) -> Self {
        Self { fs, base }
    }

    /// Read and expand the file at `path`.
    pub fn expand_path(&self, path: &Path, context: &IncludeContext) -> Result<String> {
        let path = normalize_lexically(path);
        let text = self.fs.read_to_string(&path)?;
        let mut stack = vec![path];
        self.expand_text(&text, context, &mut stack)
    }

    /// Expand an in-memory source.
    pub fn expand(&self, text: &str, context: &IncludeContext) -> Result<String> {
        self.expand_text(text, context, &mut Vec::new())
    }

    fn expand_text(
        &self,
        text: &str,
        context: &IncludeContext,
        stack: &mut Vec<PathBuf>,
    ) -> Result<String> {
        let text = apply_conditionals(text, context)?;
        let text = self.apply_includes(&text, context, stack)?;
        Ok(substitute_variables(&text, context))
    }

    fn apply_includes(
        &self,
        text: &str,
        context: &IncludeContext,
        stack: &mut Vec<PathBuf>,
    ) -> Result<String> {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;

        while let Some(pos) = rest.find(INCLUDE) {
            out.push_str(&rest[..pos]);
            let after = &rest[pos + INCLUDE.len()..];
            let (args, consumed) = parse_parenthesized(after)
                .with_context(|| format!("malformed {INCLUDE} directive"))?;
            let (rel, params) = parse_include_args(args)?;

            let mut child = context.clone();
            child.extend(params);

            let body = self.expand_file(&rel, &child, stack)?;
            let indent = current_line_indent(&out);
            out.push_str(&indent_following_lines(&body, &indent));

            rest = &after[consumed..];
        }

        out.push_str(rest);
        Ok(out)
    }

    fn expand_file(
        &self,
        rel: &str,
        context: &IncludeContext,
        stack: &mut Vec<PathBuf>,
    ) -> Result<String> {
        let path = normalize_lexically(&self.base.join(rel));
        if stack.contains(&path) {
            let chain: Vec<String> = stack
                .iter()
                .chain(std::iter::once(&path))
                .map(|p| p.display().to_string())
                .collect();
            bail!("include cycle: {}", chain.join(" -> "));
        }

        let text = self
            .fs
            .read_to_string(&path)
            .with_context(|| format!("including '{rel}'"))?;

        stack.push(path);
        let expanded = self.expand_text(&text, context, stack);
        stack.pop();
        expanded
    }
}

/// Parse `(...)` at the start of `s` (after optional whitespace).
///
/// Returns the text between the parentheses and the number of bytes of `s`
/// consumed, closing parenthesis included. Quotes and nested brackets are
/// respected.
fn parse_parenthesized(s: &str) -> Result<(&str, usize)> {
    let start = s.len() - s.trim_start().len();
    if !s[start..].starts_with('(') {
        bail!("expected '('");
    }

    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (i, c) in s[start..].char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => quote = Some(c),
            '(' | '{' | '[' => depth += 1,
            ')' | '}' | ']' => {
                depth = depth.saturating_sub(1);
                if depth == 0 && c == ')' {
                    let open = start + 1;
                    let close = start + i;
                    return Ok((&s[open..close], close + 1));
                }
            }
            _ => {}
        }
    }

    bail!("unterminated '('")
}

/// Split `'path', { json }` into the path and the parameter object.
fn parse_include_args(args: &str) -> Result<(String, IncludeContext)> {
    let args = args.trim();
    let quote = args
        .chars()
        .next()
        .filter(|c| *c == '\'' || *c == '"')
        .ok_or_else(|| anyhow!("include path must be quoted: {args}"))?;

    let body = &args[1..];
    let end = body
        .find(quote)
        .ok_or_else(|| anyhow!("unterminated include path: {args}"))?;
    let path = body[..end].to_string();

    let tail = body[end + 1..].trim();
    if tail.is_empty() {
        return Ok((path, Map::new()));
    }

    let json = tail
        .strip_prefix(',')
        .ok_or_else(|| anyhow!("expected ',' after include path: {args}"))?
        .trim();
    let params: IncludeContext = serde_json::from_str(json)
        .with_context(|| format!("include parameters for '{path}' must be a JSON object"))?;
    Ok((path, params))
}

/// Leading whitespace of the last (unfinished) line of `out`.
fn current_line_indent(out: &str) -> String {
    let line_start = out.rfind('\n').map_or(0, |i| i + 1);
    out[line_start..]
        .chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .collect()
}

/// Prefix every line after the first with `indent`. Empty lines stay empty.
fn indent_following_lines(body: &str, indent: &str) -> String {
    let body = body
        .strip_suffix("\r\n")
        .or_else(|| body.strip_suffix('\n'))
        .unwrap_or(body);
    if indent.is_empty() {
        return body.to_string();
    }

    let mut out = String::with_capacity(body.len());
    for (i, line) in body.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
            if !line.trim_end_matches('\r').is_empty() {
                out.push_str(indent);
            }
        }
        out.push_str(line);
    }
    out
}

fn apply_conditionals(text: &str, context: &IncludeContext) -> Result<String> {
    let mut out = String::with_capacity(text.len());
    let mut rest = text.to_string();

    while let Some(pos) = rest.find(IF) {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + IF.len()..];
        let (cond, consumed) =
            parse_parenthesized(after).with_context(|| format!("malformed {IF} directive"))?;
        let keep = evaluate_condition(cond, context)?;

        let block = &after[consumed..];
        let open = block.len() - block.trim_start().len();
        if !block[open..].starts_with('{') {
            bail!("expected '{{' after {IF} ({})", cond.trim());
        }
        let close = matching_brace(&block[open..])
            .ok_or_else(|| anyhow!("unterminated {IF} block ({})", cond.trim()))?;
        let body = &block[open + 1..open + close];
        let remaining = &block[open + close + 1..];

        // Rescan the kept body so nested conditionals are resolved too.
        rest = if keep {
            format!("{body}{remaining}")
        } else {
            remaining.to_string()
        };
    }

    out.push_str(&rest);
    Ok(out)
}

/// Byte offset of the `}` closing the `{` at the start of `s`.
fn matching_brace(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in s.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
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

/// `name`, `!name` or `lhs OP rhs`; unknown names are null.
fn evaluate_condition(cond: &str, context: &IncludeContext) -> Result<bool> {
    let cond = cond.trim();
    if let Some(caps) = NAME_RE.captures(cond) {
        let truthy = is_truthy(context.get(&caps[2]));
        return Ok(if caps[1].is_empty() { truthy } else { !truthy });
    }

    let Some(caps) = COMPARISON_RE.captures(cond) else {
        bail!("unsupported {IF} expression ({cond})");
    };
    let lhs = operand(caps[1].trim(), context)
        .with_context(|| format!("unsupported {IF} expression ({cond})"))?;
    let rhs = operand(caps[3].trim(), context)
        .with_context(|| format!("unsupported {IF} expression ({cond})"))?;

    Ok(match &caps[2] {
        "===" => strict_eq(&lhs, &rhs),
        "!==" => !strict_eq(&lhs, &rhs),
        "==" => loose_eq(&lhs, &rhs),
        _ => !loose_eq(&lhs, &rhs),
    })
}

/// A literal or a context name.
fn operand(token: &str, context: &IncludeContext) -> Result<Value> {
    match token {
        "true" => return Ok(Value::Bool(true)),
        "false" => return Ok(Value::Bool(false)),
        "null" | "undefined" => return Ok(Value::Null),
        _ => {}
    }
    for quote in ['\'', '"'] {
        if token.len() >= 2 && token.starts_with(quote) && token.ends_with(quote) {
            return Ok(Value::String(token[1..token.len() - 1].to_string()));
        }
    }
    if let Some(n) = token.parse::<f64>().ok().and_then(Number::from_f64) {
        return Ok(Value::Number(n));
    }
    if NAME_RE.is_match(token) && !token.starts_with('!') {
        return Ok(context.get(token).cloned().unwrap_or(Value::Null));
    }
    bail!("cannot evaluate operand '{token}'")
}

fn strict_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

/// Strict equality, plus numbers matching numeric strings.
fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(n), Value::String(s)) | (Value::String(s), Value::Number(n)) => {
            s.trim().parse::<f64>().ok() == n.as_f64()
        }
        _ => strict_eq(a, b),
    }
}

fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

fn substitute_variables(text: &str, context: &IncludeContext) -> String {
    let mut keys: Vec<&String> = context.keys().collect();
    keys.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

    let mut out = text.to_string();
    for key in keys {
        let needle = format!("@@{key}");
        if !out.contains(&needle) {
            continue;
        }
        let value = match &context[key.as_str()] {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        out = out.replace(&needle, &value);
    }
    out
}
