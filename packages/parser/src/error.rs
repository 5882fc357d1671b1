use thiserror::Error;

pub type ParseResult<T> = Result<T, ParseError>;
pub type TypeResult<T> = Result<T, TypeError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Declaration '{name}' at {pos} has no closing @end")]
    MalformedBlock { name: String, pos: usize },
}

impl ParseError {
    pub fn malformed_block(name: impl Into<String>, pos: usize) -> Self {
        Self::MalformedBlock {
            name: name.into(),
            pos,
        }
    }

    /// Byte offset of the error in the source unit
    pub fn pos(&self) -> usize {
        match self {
            ParseError::MalformedBlock { pos, .. } => *pos,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TypeError {
    #[error("Unbalanced generic brackets in '{raw}'")]
    UnbalancedGenerics { raw: String },

    #[error("Malformed block type '{raw}'")]
    MalformedClosure { raw: String },
}

impl TypeError {
    pub fn unbalanced(raw: impl Into<String>) -> Self {
        Self::UnbalancedGenerics { raw: raw.into() }
    }

    pub fn malformed_closure(raw: impl Into<String>) -> Self {
        Self::MalformedClosure { raw: raw.into() }
    }
}

/// Pretty-print parse errors with source context using ariadne
#[cfg(feature = "pretty-errors")]
pub mod pretty {
    use super::ParseError;

    pub fn format_error(error: &ParseError, filename: &str, source: &str) -> String {
        use ariadne::{Color, Label, Report, ReportKind, Source};

        // ariadne spans are char offsets
        let byte_pos = error.pos().min(source.len());
        let start = source
            .char_indices()
            .take_while(|(i, _)| *i < byte_pos)
            .count();
        let line_len = source[byte_pos..]
            .find('\n')
            .unwrap_or(source.len() - byte_pos);
        let end = start + source[byte_pos..byte_pos + line_len].chars().count().max(1);

        let message = match error {
            ParseError::MalformedBlock { name, .. } => {
                format!("'{}' starts here but @end is never reached", name)
            }
        };

        let mut output = Vec::new();
        let report = Report::build(ReportKind::Error, filename, start)
            .with_message(error.to_string())
            .with_label(
                Label::new((filename, start..end))
                    .with_color(Color::Red)
                    .with_message(message),
            )
            .finish();

        if report
            .write((filename, Source::from(source)), &mut output)
            .is_err()
        {
            return error.to_string();
        }

        String::from_utf8(output).unwrap_or_else(|_| error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let error = ParseError::malformed_block("UIView", 12);
        assert_eq!(error.pos(), 12);
        assert!(error.to_string().contains("UIView"));

        let error = TypeError::unbalanced("NSArray>");
        assert!(error.to_string().contains("NSArray>"));
    }

    #[cfg(feature = "pretty-errors")]
    #[test]
    fn test_pretty_error_mentions_declaration() {
        let source = "@interface UIView : UIResponder\n@property CGRect frame;\n";
        let error = ParseError::malformed_block("UIView", 0);
        let rendered = pretty::format_error(&error, "UIView.h", source);
        assert!(rendered.contains("UIView"));
    }
}
