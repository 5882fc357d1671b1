use chaingen_parser::ElementType;

/// Element type of a rendered type expression.
///
/// `[X]` is a sequence of `X`; optional markers are ignored; anything else
/// is its own element.
pub fn element_type(expr: &str) -> ElementType {
    let expr = expr.trim().trim_end_matches(|c| c == '?' || c == '!');

    let sequence = expr
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .filter(|inner| !inner.is_empty() && inner.chars().all(|c| c.is_alphanumeric() || c == '_'));

    match sequence {
        Some(inner) => ElementType {
            name: inner.to_string(),
            is_sequence: true,
        },
        None => ElementType {
            name: expr.to_string(),
            is_sequence: false,
        },
    }
}
