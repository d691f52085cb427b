//! Condition evaluator

use super::ast::Condition;
use super::parser::parse;
use crate::intake::survey::answer::Answer;

/// Evaluate condition text against a single answer.
///
/// Text that does not parse evaluates to `false`, never to an error.
pub fn evaluate(expression: &str, answer: &Answer) -> bool {
    match parse(expression) {
        Ok(condition) => evaluate_condition(&condition, answer),
        Err(e) => {
            log::debug!("Condition '{}' evaluates to false: {}", expression, e);
            false
        }
    }
}

/// Evaluate a parsed condition against a single answer
pub fn evaluate_condition(condition: &Condition, answer: &Answer) -> bool {
    match condition {
        Condition::SelectedEquals(id) => answer
            .selected
            .as_ref()
            .and_then(|s| s.as_scalar())
            .is_some_and(|scalar| scalar == id.as_str()),
        Condition::InSelected(id) => answer
            .selected
            .as_ref()
            .and_then(|s| s.as_many())
            .is_some_and(|items| items.iter().any(|item| item == id)),
        Condition::Value { op, threshold } => op.apply(answer.value.unwrap_or(0.0), *threshold),
        Condition::InText(needle) => answer
            .text
            .as_deref()
            .unwrap_or("")
            .to_lowercase()
            .contains(&needle.to_lowercase()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selected_equality() {
        let expr = r#"selected == "yes""#;
        assert!(evaluate(expr, &Answer::single("yes")));
        assert!(!evaluate(expr, &Answer::single("no")));
        assert!(!evaluate(expr, &Answer::default()));
    }

    #[test]
    fn test_selected_equality_ignores_collections() {
        assert!(!evaluate(r#"selected == "yes""#, &Answer::multiple(["yes"])));
    }

    #[test]
    fn test_selected_equality_on_consent_flag() {
        assert!(evaluate(r#"selected == "true""#, &Answer::consent(true)));
        assert!(!evaluate(r#"selected == "true""#, &Answer::consent(false)));
    }

    #[test]
    fn test_in_selected() {
        let expr = r#""a" in selected"#;
        assert!(evaluate(expr, &Answer::multiple(["a", "b"])));
        assert!(!evaluate(expr, &Answer::multiple(["b"])));
        // A scalar selection is not a collection
        assert!(!evaluate(expr, &Answer::single("a")));
    }

    #[test]
    fn test_value_comparison() {
        assert!(evaluate("value >= 7", &Answer::number(7.0)));
        assert!(!evaluate("value > 7", &Answer::number(7.0)));
        assert!(evaluate("value <= 7", &Answer::number(7.0)));
        assert!(evaluate("value < 7.5", &Answer::number(7.0)));
    }

    #[test]
    fn test_missing_value_is_zero() {
        assert!(!evaluate("value >= 7", &Answer::default()));
        assert!(evaluate("value < 1", &Answer::default()));
        assert!(evaluate("value >= 0", &Answer::default()));
    }

    #[test]
    fn test_text_contains_case_insensitive() {
        let answer = Answer::free_text("I have Pain today");
        assert!(evaluate(r#""pain" in text"#, &answer));
        assert!(evaluate(r#""PAIN TODAY" in text"#, &answer));
        assert!(!evaluate(r#""fever" in text"#, &answer));
    }

    #[test]
    fn test_missing_text_is_empty() {
        assert!(!evaluate(r#""pain" in text"#, &Answer::default()));
    }

    #[test]
    fn test_unrecognized_is_false() {
        let answers = [
            Answer::default(),
            Answer::single("yes"),
            Answer::multiple(["yes"]),
            Answer::number(100.0),
            Answer::free_text("yes"),
        ];
        for expr in ["true", "selected != 'yes'", "garbage", "", "value >= x"] {
            for answer in &answers {
                assert!(!evaluate(expr, answer), "{:?} on {:?}", expr, answer);
            }
        }
    }
}
