//! Condition parser
//!
//! Recognizes, in priority order:
//! - `selected == "id"`
//! - `"id" in selected`
//! - `value >= 7` (also `>`, `<=`, `<`)
//! - `"substr" in text`
//!
//! String literals may use double or single quotes.

use super::ast::{CompareOp, Condition};
use crate::intake::error::ConditionError;

/// Parse a condition string into an AST
pub fn parse(input: &str) -> Result<Condition, ConditionError> {
    let input = input.trim();

    if let Some(id) = parse_selected_equals(input) {
        return Ok(Condition::SelectedEquals(id));
    }
    if let Some(id) = parse_membership(input, "selected") {
        return Ok(Condition::InSelected(id));
    }
    if let Some(result) = parse_value_comparison(input) {
        return result;
    }
    if let Some(needle) = parse_membership(input, "text") {
        return Ok(Condition::InText(needle));
    }

    Err(ConditionError::Unrecognized(input.to_string()))
}

fn parse_selected_equals(input: &str) -> Option<String> {
    let rest = input.strip_prefix("selected")?.trim_start();
    let rest = rest.strip_prefix("==")?.trim();
    match parse_quoted(rest)? {
        (literal, "") => Some(literal.to_string()),
        _ => None,
    }
}

/// `"<literal>" in <field>`
fn parse_membership(input: &str, field: &str) -> Option<String> {
    let (literal, rest) = parse_quoted(input)?;
    let rest = rest.strip_prefix(char::is_whitespace)?.trim_start();
    let rest = rest.strip_prefix("in")?;
    let rest = rest.strip_prefix(char::is_whitespace)?.trim();
    (rest == field).then(|| literal.to_string())
}

fn parse_value_comparison(input: &str) -> Option<Result<Condition, ConditionError>> {
    let rest = input.strip_prefix("value")?.trim_start();

    // Longest operators first
    let operators = [
        (">=", CompareOp::Gte),
        ("<=", CompareOp::Lte),
        (">", CompareOp::Gt),
        ("<", CompareOp::Lt),
    ];

    let (op, literal) = operators
        .into_iter()
        .find_map(|(op_str, op)| rest.strip_prefix(op_str).map(|r| (op, r.trim())))?;

    Some(parse_number(literal, input).map(|threshold| Condition::Value { op, threshold }))
}

fn parse_number(literal: &str, condition: &str) -> Result<f64, ConditionError> {
    literal
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| ConditionError::InvalidNumber {
            condition: condition.to_string(),
            literal: literal.to_string(),
        })
}

/// Split a leading quoted literal from the rest of the input
fn parse_quoted(input: &str) -> Option<(&str, &str)> {
    let quote = input.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let body = &input[1..];
    let end = body.find(quote)?;
    Some((&body[..end], &body[end + 1..]))
}
