//! Type expression parsing.
//!
//! Grammar:
//!
//! ```text
//! expr  := "*" expr | "[]" expr | "map[" expr "]" expr | ident
//! ident := basic | Name | path/to/pkg.Name
//! ```
//!
//! Bare names that are not basic kinds refer to a type in the declaring
//! package.

use crate::error::ParseError;
use typewright_core::{BasicKind, QualifiedName, TypeDesc};

/// Parses a type expression declared inside `package`.
///
/// # Errors
/// Returns [`ParseError::InvalidTypeExpr`] if the expression is malformed.
pub fn parse_type_expr(expr: &str, package: &str) -> Result<TypeDesc, ParseError> {
    let trimmed = expr.trim();
    if trimmed.is_empty() {
        return Err(ParseError::invalid_expr(expr, "empty type expression"));
    }
    parse_inner(trimmed, package).map_err(|reason| ParseError::invalid_expr(expr, reason))
}

fn parse_inner(expr: &str, package: &str) -> Result<TypeDesc, String> {
    if let Some(rest) = expr.strip_prefix('*') {
        return Ok(TypeDesc::pointer(parse_operand(rest, package)?));
    }
    if let Some(rest) = expr.strip_prefix("[]") {
        return Ok(TypeDesc::slice(parse_operand(rest, package)?));
    }
    if let Some(rest) = expr.strip_prefix("map[") {
        let close = matching_bracket(rest).ok_or("unterminated map key")?;
        let key = parse_operand(&rest[..close], package)?;
        let elem = parse_operand(&rest[close + 1..], package)?;
        return Ok(TypeDesc::map(key, elem));
    }
    if expr.starts_with('[') {
        return Err("fixed size arrays are not supported".to_string());
    }
    parse_ident(expr, package)
}

fn parse_operand(expr: &str, package: &str) -> Result<TypeDesc, String> {
    let expr = expr.trim();
    if expr.is_empty() {
        return Err("missing element type".to_string());
    }
    parse_inner(expr, package)
}

/// Finds the `]` closing a map key, skipping nested brackets.
fn matching_bracket(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (idx, c) in s.char_indices() {
        match c {
            '[' => depth += 1,
            ']' if depth == 0 => return Some(idx),
            ']' => depth -= 1,
            _ => {}
        }
    }
    None
}

fn parse_ident(expr: &str, package: &str) -> Result<TypeDesc, String> {
    if let Some(kind) = BasicKind::from_name(expr) {
        return Ok(TypeDesc::Basic(kind));
    }
    if expr.contains('.') {
        let name = QualifiedName::parse(expr)
            .ok_or_else(|| format!("cannot split qualified name '{expr}'"))?;
        if !is_identifier(&name.name) || !is_package_path(&name.package) {
            return Err(format!("invalid qualified name '{expr}'"));
        }
        return Ok(TypeDesc::Named(name));
    }
    if !is_identifier(expr) {
        return Err(format!("invalid identifier '{expr}'"));
    }
    Ok(TypeDesc::named(package, expr))
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}

fn is_package_path(s: &str) -> bool {
    !s.is_empty()
        && s.split('/').all(|segment| {
            !segment.is_empty()
                && segment
                    .chars()
                    .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '~'))
        })
}
