//! Availability macro resolution
//!
//! Annotation text such as `NS_AVAILABLE_IOS(9_0)` or
//! `API_DEPRECATED("...", ios(2.0, 9.0))` is reduced to an [`Availability`]
//! relative to the configured minimum version.

use crate::ast::{Availability, Declaration, Method, Property, Version};
use regex::Regex;
use std::sync::OnceLock;

/// Anything carrying raw availability annotations
pub trait Annotated {
    fn annotations(&self) -> &str;

    /// Class-scoped items also recognise the `*_CLASS_*` macro spellings
    fn is_class_scoped(&self) -> bool {
        false
    }
}

impl Annotated for Declaration {
    fn annotations(&self) -> &str {
        &self.annotations
    }

    fn is_class_scoped(&self) -> bool {
        true
    }
}

impl Annotated for Property {
    fn annotations(&self) -> &str {
        &self.annotations
    }
}

impl Annotated for Method {
    fn annotations(&self) -> &str {
        &self.annotations
    }
}

struct Patterns {
    unavailable: Regex,
    class_deprecated: Vec<Regex>,
    deprecated: Vec<Regex>,
    class_introduced: Vec<Regex>,
    introduced: Vec<Regex>,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();

    PATTERNS.get_or_init(|| {
        // Captured version / skipped version
        const V: &str = r"(\d+)[_.](\d+)";
        const N: &str = r"\d+[_.]\d+";
        // Macro arguments before the platform, string literals kept whole
        const ARGS: &str = r#"(?:"[^"]*"|[^;"])*?"#;

        let compile = |pattern: String| Regex::new(&format!("(?i){}", pattern)).unwrap();

        Patterns {
            unavailable: compile(r"API_UNAVAILABLE\s*\([^)]*\bios\b".to_string()),
            class_deprecated: vec![
                compile(format!(r"CLASS_DEPRECATED_IOS\s*\(\s*{V}\s*,\s*{V}")),
                compile(format!(
                    r"CLASS_DEPRECATED\s*\(\s*{N}\s*,\s*{N}\s*,\s*{V}\s*,\s*{V}"
                )),
            ],
            deprecated: vec![
                compile(format!(r"\b(?:NS|UIKIT)_DEPRECATED_IOS\s*\(\s*{V}\s*,\s*{V}")),
                compile(format!(
                    r"\bNS_DEPRECATED\s*\(\s*{N}\s*,\s*{N}\s*,\s*{V}\s*,\s*{V}"
                )),
                compile(format!(
                    r"\bAPI_DEPRECATED\w*\s*\({ARGS}\bios\s*\(\s*{V}\s*,\s*{V}"
                )),
            ],
            class_introduced: vec![
                compile(format!(r"CLASS_AVAILABLE_IOS\s*\(\s*{V}")),
                compile(format!(r"CLASS_AVAILABLE\s*\(\s*{N}\s*,\s*{V}")),
            ],
            introduced: vec![
                compile(format!(r"\b(?:NS|UIKIT)_AVAILABLE_IOS\s*\(\s*{V}")),
                compile(format!(r"\bNS_AVAILABLE\s*\(\s*{N}\s*,\s*{V}")),
                compile(format!(r"\bAPI_AVAILABLE\s*\({ARGS}\bios\s*\(\s*{V}")),
            ],
        }
    })
}

fn version_at(captures: &regex::Captures<'_>, group: usize) -> Option<Version> {
    Some(Version::new(
        captures.get(group)?.as_str().parse().ok()?,
        captures.get(group + 1)?.as_str().parse().ok()?,
    ))
}

/// First match across the pattern lists, in order
fn first_match<'a, 't>(
    lists: impl IntoIterator<Item = &'a Regex>,
    text: &'t str,
) -> Option<regex::Captures<'t>> {
    lists.into_iter().find_map(|re| re.captures(text))
}

#[derive(Debug, Clone, Copy)]
pub struct AvailabilityResolver {
    minimum: Version,
}

impl AvailabilityResolver {
    pub fn new(minimum: Version) -> Self {
        Self { minimum }
    }

    pub fn resolve<T: Annotated + ?Sized>(&self, item: &T) -> Availability {
        self.resolve_text(item.annotations(), item.is_class_scoped())
    }

    pub fn resolve_text(&self, text: &str, class_scoped: bool) -> Availability {
        let patterns = patterns();

        if patterns.unavailable.is_match(text) {
            return Availability::Unavailable;
        }

        let class_deprecated: &[Regex] = if class_scoped {
            &patterns.class_deprecated
        } else {
            &[]
        };
        if let Some(captures) = first_match(class_deprecated.iter().chain(&patterns.deprecated), text) {
            if let (Some(introduced), Some(deprecated)) =
                (version_at(&captures, 1), version_at(&captures, 3))
            {
                return if deprecated <= self.minimum {
                    Availability::Unavailable
                } else {
                    Availability::Deprecated {
                        introduced,
                        deprecated,
                    }
                };
            }
        }

        let class_introduced: &[Regex] = if class_scoped {
            &patterns.class_introduced
        } else {
            &[]
        };
        if let Some(captures) = first_match(class_introduced.iter().chain(&patterns.introduced), text) {
            if let Some(introduced) = version_at(&captures, 1) {
                return if introduced <= self.minimum {
                    Availability::Always
                } else {
                    Availability::Introduced(introduced)
                };
            }
        }

        Availability::Always
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> AvailabilityResolver {
        AvailabilityResolver::new(Version::new(9, 0))
    }

    #[test]
    fn test_introduced_at_minimum_needs_no_guard() {
        assert_eq!(
            resolver().resolve_text("NS_AVAILABLE_IOS(9_0)", false),
            Availability::Always
        );
        assert_eq!(
            resolver().resolve_text("API_AVAILABLE(ios(9.0))", false),
            Availability::Always
        );
    }

    #[test]
    fn test_introduced_above_minimum() {
        assert_eq!(
            resolver().resolve_text("API_AVAILABLE(macos(10.12), ios(11.0))", false),
            Availability::Introduced(Version::new(11, 0))
        );
        assert_eq!(
            resolver().resolve_text("NS_AVAILABLE(10_10, 10_0)", false),
            Availability::Introduced(Version::new(10, 0))
        );
    }

    #[test]
    fn test_deprecated_at_or_below_minimum_is_unavailable() {
        assert_eq!(
            resolver().resolve_text("NS_DEPRECATED_IOS(2_0, 8_0)", false),
            Availability::Unavailable
        );
        assert_eq!(
            resolver().resolve_text(
                r#"API_DEPRECATED("Use something else", ios(2.0, 9.0))"#,
                false
            ),
            Availability::Unavailable
        );
    }

    #[test]
    fn test_deprecated_above_minimum_keeps_range() {
        assert_eq!(
            resolver().resolve_text(
                r#"API_DEPRECATED_WITH_REPLACEMENT("other", ios(7.0, 13.0)) API_UNAVAILABLE(tvos)"#,
                false
            ),
            Availability::Deprecated {
                introduced: Version::new(7, 0),
                deprecated: Version::new(13, 0),
            }
        );
    }

    #[test]
    fn test_semicolon_inside_message() {
        assert_eq!(
            resolver().resolve_text(r#"API_DEPRECATED("Use bar; it is faster", ios(2.0, 8.0))"#, false),
            Availability::Unavailable
        );
        assert_eq!(
            resolver().resolve_text(r#"API_AVAILABLE(ios(11.0)) API_DEPRECATED("a; b", tvos(9.0, 10.0))"#, false),
            Availability::Introduced(Version::new(11, 0))
        );
    }

    #[test]
    fn test_class_spellings_only_for_class_scope() {
        let text = "NS_CLASS_AVAILABLE_IOS(10_0)";
        assert_eq!(
            resolver().resolve_text(text, true),
            Availability::Introduced(Version::new(10, 0))
        );
        assert_eq!(resolver().resolve_text(text, false), Availability::Always);

        assert_eq!(
            resolver().resolve_text("NS_CLASS_DEPRECATED_IOS(2_0, 8_0)", true),
            Availability::Unavailable
        );

        let mut declaration = Declaration::new("UIWebView");
        declaration.annotations = "UIKIT_CLASS_DEPRECATED(10_0, 10_5, 2_0, 12_0)".to_string();
        assert_eq!(
            resolver().resolve(&declaration),
            Availability::Deprecated {
                introduced: Version::new(2, 0),
                deprecated: Version::new(12, 0),
            }
        );
    }

    #[test]
    fn test_explicitly_unavailable() {
        assert_eq!(
            resolver().resolve_text("API_UNAVAILABLE(ios, watchos)", false),
            Availability::Unavailable
        );
        assert_eq!(
            resolver().resolve_text("API_UNAVAILABLE(tvos)", false),
            Availability::Always
        );
    }

    #[test]
    fn test_case_insensitive_and_plain_text() {
        assert_eq!(
            resolver().resolve_text("ns_available_ios(12_0)", false),
            Availability::Introduced(Version::new(12, 0))
        );
        assert_eq!(resolver().resolve_text("", false), Availability::Always);
        assert_eq!(
            resolver().resolve_text("UI_APPEARANCE_SELECTOR", false),
            Availability::Always
        );
    }

    #[test]
    fn test_raising_minimum_never_restores_availability() {
        let samples = [
            "NS_AVAILABLE_IOS(8_0)",
            "NS_AVAILABLE_IOS(11_0)",
            "NS_DEPRECATED_IOS(2_0, 10_0)",
            "API_DEPRECATED(\"x\", ios(3.0, 12.0))",
            "API_AVAILABLE(ios(13.0))",
            "",
        ];

        for text in samples {
            let mut dropped = false;
            for major in 7..15 {
                let resolved =
                    AvailabilityResolver::new(Version::new(major, 0)).resolve_text(text, false);
                if dropped {
                    assert_eq!(resolved, Availability::Unavailable, "{} at {}", text, major);
                }
                dropped = !resolved.is_available();
            }
        }
    }
}
