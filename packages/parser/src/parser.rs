//! Declaration parser
//!
//! Recovers `@interface` / `@protocol` blocks from header text. Member lines
//! are matched against small line grammars; anything that does not fit is
//! skipped with a diagnostic so a single odd line never loses a whole unit.

use crate::ast::{member_key, Availability, Declaration, Method, Part, Property};
use crate::availability::AvailabilityResolver;
use crate::config::GeneratorConfig;
use crate::diagnostic::Diagnostic;
use crate::error::{ParseError, ParseResult};
use crate::type_parser::TypeParser;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::{debug, instrument, warn};

/// Partial registry produced from one input unit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedUnit {
    pub declarations: Vec<Declaration>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Result of matching one logical member line
#[derive(Debug)]
enum LineOutcome<T> {
    Admitted(T),
    Excluded(&'static str),
    Malformed(String),
}

const PROPERTY_ATTRIBUTES: &str = r"@property\s*(?:\(([\w\s,=]*)\))?\s*";

/// Annotation text up to the terminating `;`, string literals kept whole
const ANNOTATIONS: &str = r#"((?:"[^"\n]*"|[^;"])*);"#;

fn header_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // A prefix line is taken only when it carries a class macro or holds
        // nothing but macros; statements end in `;` and never qualify.
        Regex::new(&format!(
            r"(?m)^(?:({class}|{macros})\n)?[ \t]*([^\n@]*?)@(?:interface|protocol)[ \t]+(\w+)([^;\n]*)$",
            class = r"[^\n;@]*\b[A-Z_]*CLASS[A-Z_]*\b[^\n;@]*",
            macros = r"[ \t]*[A-Z_][A-Z0-9_]*(?:\([^\n;@]*?\))?(?:[ \t]+[A-Z_][A-Z0-9_]*(?:\([^\n;@]*?\))?)*[ \t]*",
        ))
        .unwrap()
    })
}

fn super_type_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*:\s*(\w+)").unwrap())
}

fn end_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"@end\b").unwrap())
}

fn scalar_property_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(
            r"^{}(?:__kindof\s+)?((?:unsigned\s+int|unsigned\s+long|\w+)\s*(?:<[\w\s\*<>,]+>)?)\s*\*?\s*(\w+)\s*{}",
            PROPERTY_ATTRIBUTES, ANNOTATIONS
        ))
        .unwrap()
    })
}

fn closure_property_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(
            r"^{}(\w+\s*\*?\s*\(\s*\^\s*(\w+)\s*\)\s*\([^)]*\))\s*{}",
            PROPERTY_ATTRIBUTES, ANNOTATIONS
        ))
        .unwrap()
    })
}

fn method_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([-+])\s*\(([^()]*(?:\([^()]*\)[^()]*)*)\)\s*(.*);").unwrap())
}

fn part_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(\w+)\s*:\s*\(((?:[^()]|\([^()]*\))*)\)\s*(\w+)").unwrap()
    })
}

/// Qualifiers written inside a property type
fn inline_nullability_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b(?:_Nullable|__nullable|_Null_unspecified|_Nonnull|__nonnull)\b").unwrap()
    })
}

/// Every nullability spelling accepted in a method parameter type
fn parameter_nullability_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"\b(?:_Nullable|__nullable|nullable|_Null_unspecified|null_unspecified|_Nonnull|__nonnull|nonnull)\b",
        )
        .unwrap()
    })
}

fn is_nullable_qualifier(qualifier: &str) -> bool {
    matches!(qualifier, "_Nullable" | "__nullable" | "nullable")
}

/// Replace comments with spaces, keeping newlines and byte offsets intact
pub fn strip_comments(source: &str) -> String {
    #[derive(PartialEq)]
    enum State {
        Code,
        Str,
        Line,
        Block,
    }

    let mut output = String::with_capacity(source.len());
    let mut state = State::Code;
    let mut previous = '\n';
    let mut chars = source.chars().peekable();

    let blank = |output: &mut String, c: char| {
        if c == '\n' {
            output.push('\n');
        } else {
            output.extend(std::iter::repeat(' ').take(c.len_utf8()));
        }
    };

    while let Some(c) = chars.next() {
        match state {
            State::Code => match (c, chars.peek()) {
                ('/', Some('*')) => {
                    state = State::Block;
                    chars.next();
                    output.push_str("  ");
                }
                ('/', Some('/')) if previous.is_whitespace() => {
                    state = State::Line;
                    chars.next();
                    output.push_str("  ");
                }
                ('"', _) => {
                    state = State::Str;
                    output.push(c);
                }
                _ => output.push(c),
            },
            State::Str => {
                output.push(c);
                if c == '\\' {
                    if let Some(escaped) = chars.next() {
                        output.push(escaped);
                    }
                } else if c == '"' || c == '\n' {
                    state = State::Code;
                }
            }
            State::Line => {
                if c == '\n' {
                    state = State::Code;
                }
                blank(&mut output, c);
            }
            State::Block => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    output.push_str("  ");
                    state = State::Code;
                } else {
                    blank(&mut output, c);
                }
            }
        }
        previous = c;
    }

    output
}

/// Members whose window closes inside their block's window are dropped
fn admit_available<T>(availability: Availability, member: T) -> LineOutcome<T> {
    if availability.is_available() {
        LineOutcome::Admitted(member)
    } else {
        LineOutcome::Excluded("unavailable")
    }
}

/// Whether a statement has its `;`, ignoring any inside string literals
fn is_terminated(text: &str) -> bool {
    let mut in_string = false;
    for c in text.chars() {
        match c {
            '"' => in_string = !in_string,
            ';' if !in_string => return true,
            _ => {}
        }
    }
    false
}

/// Physical lines joined into member statements, with their byte offsets
fn logical_lines(body: &str, base: usize) -> Vec<(usize, String)> {
    let mut lines = Vec::new();
    let mut pending: Option<(usize, String)> = None;
    let mut offset = base;

    for physical in body.split('\n') {
        let start = offset;
        offset += physical.len() + 1;
        let trimmed = physical.trim();

        if let Some((pos, mut text)) = pending.take() {
            text.push(' ');
            text.push_str(trimmed);
            if is_terminated(&text) {
                lines.push((pos, text));
            } else {
                pending = Some((pos, text));
            }
            continue;
        }

        if trimmed.is_empty() {
            continue;
        }

        let is_member = trimmed.starts_with("@property")
            || trimmed.starts_with('-')
            || trimmed.starts_with('+');
        if is_member && !is_terminated(trimmed) {
            pending = Some((start, trimmed.to_string()));
        } else {
            lines.push((start, trimmed.to_string()));
        }
    }

    if let Some(line) = pending {
        lines.push(line);
    }
    lines
}

fn nullable(expr: String, is_closure: bool) -> String {
    if is_closure {
        format!("({})?", expr)
    } else {
        format!("{}?", expr)
    }
}

pub struct Parser<'cfg> {
    config: &'cfg GeneratorConfig,
    types: TypeParser<'cfg>,
    availability: AvailabilityResolver,
}

impl<'cfg> Parser<'cfg> {
    pub fn new(config: &'cfg GeneratorConfig) -> Self {
        Self {
            config,
            types: TypeParser::new(config),
            availability: AvailabilityResolver::new(config.minimum_version),
        }
    }

    #[instrument(skip(self, source), fields(bytes = source.len()))]
    pub fn parse(&self, source: &str) -> ParseResult<ParsedUnit> {
        let text = strip_comments(&source.replace("\r\n", "\n"));
        let mut unit = ParsedUnit::default();
        let mut cursor = 0;

        while let Some(captures) = header_regex().captures_at(&text, cursor) {
            let (Some(whole), Some(name)) = (captures.get(0), captures.get(3)) else {
                break;
            };
            let name = name.as_str();
            let rest = captures.get(4).map_or("", |m| m.as_str());

            let mut declaration = Declaration::new(name);
            declaration.super_type = super_type_regex()
                .captures(rest)
                .map(|c| c[1].to_string());
            declaration.annotations = [
                captures.get(1).map_or("", |m| m.as_str()),
                captures.get(2).map_or("", |m| m.as_str()),
                rest,
            ]
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
            declaration.availability = self.availability.resolve(&declaration);

            if self.config.excluded_types.contains(name) || !declaration.availability.is_available() {
                debug!(declaration = name, "Skipping declaration");
                cursor = whole.end();
                continue;
            }

            let end = end_regex()
                .find_at(&text, whole.end())
                .ok_or_else(|| ParseError::malformed_block(name, whole.start()))?;

            let body = &text[whole.end()..end.start()];
            self.parse_body(declaration, body, whole.end(), &mut unit);
            cursor = end.end();
        }

        debug!(
            declarations = unit.declarations.len(),
            diagnostics = unit.diagnostics.len(),
            "Parsed unit"
        );
        Ok(unit)
    }

    fn parse_body(&self, mut declaration: Declaration, body: &str, base: usize, unit: &mut ParsedUnit) {
        let mut optional_mode = false;
        let mut optional_properties = Vec::new();
        let mut optional_methods = Vec::new();

        for (pos, line) in logical_lines(body, base) {
            if line.starts_with("@optional") {
                optional_mode = true;
                continue;
            }
            if line.starts_with("@required") {
                optional_mode = false;
                continue;
            }

            if line.starts_with("@property") {
                let outcome = match self.parse_property(&declaration.name, &line) {
                    LineOutcome::Admitted(mut property) => {
                        property.availability = declaration.availability.narrow(property.availability);
                        admit_available(property.availability, property)
                    }
                    outcome => outcome,
                };
                match outcome {
                    LineOutcome::Admitted(property) if optional_mode => {
                        optional_properties.push((pos, property))
                    }
                    LineOutcome::Admitted(property) => declaration.properties.push(property),
                    outcome => self.report(outcome, &line, pos, unit),
                }
            } else if line.starts_with('-') || line.starts_with('+') {
                let outcome = match self.parse_method(&declaration.name, &line) {
                    LineOutcome::Admitted(mut method) => {
                        method.availability = declaration.availability.narrow(method.availability);
                        admit_available(method.availability, method)
                    }
                    outcome => outcome,
                };
                match outcome {
                    LineOutcome::Admitted(method) if optional_mode => {
                        optional_methods.push((pos, method))
                    }
                    LineOutcome::Admitted(method) => declaration.methods.push(method),
                    outcome => self.report(outcome, &line, pos, unit),
                }
            }
        }

        if !optional_properties.is_empty() || !optional_methods.is_empty() {
            self.route_optional_members(&declaration.name, optional_properties, optional_methods, unit);
        }

        if declaration.is_empty() {
            debug!(declaration = %declaration.name, "No admitted members");
        } else {
            debug!(
                declaration = %declaration.name,
                properties = declaration.properties.len(),
                methods = declaration.methods.len(),
                "Admitted declaration"
            );
            unit.declarations.push(declaration);
        }
    }

    fn report<T>(&self, outcome: LineOutcome<T>, line: &str, pos: usize, unit: &mut ParsedUnit) {
        match outcome {
            LineOutcome::Admitted(_) => {}
            LineOutcome::Excluded(reason) => {
                debug!(line = %line, reason, "Excluded member");
            }
            LineOutcome::Malformed(reason) => {
                debug!(line = %line, reason = %reason, "Malformed member");
                unit.diagnostics.push(Diagnostic::malformed_member(line, pos));
            }
        }
    }

    /// Copy `@optional` members onto the configured target declarations
    fn route_optional_members(
        &self,
        source: &str,
        properties: Vec<(usize, Property)>,
        methods: Vec<(usize, Method)>,
        unit: &mut ParsedUnit,
    ) {
        let Some(targets) = self.config.optional_targets.get(source) else {
            for (pos, property) in &properties {
                warn!(declaration = source, member = %property.name, "Optional member has no target");
                unit.diagnostics
                    .push(Diagnostic::unmapped_optional_member(source, &property.name, *pos));
            }
            for (pos, method) in &methods {
                warn!(declaration = source, member = %method.selector(), "Optional member has no target");
                unit.diagnostics
                    .push(Diagnostic::unmapped_optional_member(source, &method.selector(), *pos));
            }
            return;
        };

        for target in targets {
            let mut declaration = Declaration::new(target.as_str());
            declaration.properties = properties.iter().map(|(_, p)| p.clone()).collect();
            declaration.methods = methods.iter().map(|(_, m)| m.clone()).collect();
            debug!(source, target = %target, "Synthesized optional members");
            unit.declarations.push(declaration);
        }
    }

    fn parse_property(&self, declaration: &str, line: &str) -> LineOutcome<Property> {
        // Qualifiers inside a block's own parameter list belong to the parameters
        let scope_end = line
            .find('^')
            .and_then(|caret| line[caret..].find(')').map(|close| caret + close))
            .unwrap_or(line.len());
        let is_nullable = inline_nullability_regex()
            .find_iter(&line[..scope_end])
            .any(|m| is_nullable_qualifier(m.as_str()));
        let line = inline_nullability_regex().replace_all(line, "");

        let is_closure = line.contains('^');
        let pattern = if is_closure {
            closure_property_regex()
        } else {
            scalar_property_regex()
        };
        let Some(captures) = pattern.captures(&line) else {
            return LineOutcome::Malformed("property grammar".to_string());
        };

        let mut attributes: Vec<String> = captures
            .get(1)
            .map_or("", |m| m.as_str())
            .split(',')
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .collect();
        if is_nullable && !attributes.iter().any(|a| a == "nullable") {
            attributes.push("nullable".to_string());
        }

        let mut property = Property {
            name: captures[3].to_string(),
            raw_type: captures[2].trim().to_string(),
            type_expr: String::new(),
            is_closure,
            attributes,
            annotations: captures[4].trim().to_string(),
            availability: Default::default(),
            element_type: None,
        };

        if property.is_class() {
            return LineOutcome::Excluded("class property");
        }
        if property.is_read_only() {
            return LineOutcome::Excluded("read-only");
        }
        if self.config.is_platform_excluded(&property.annotations) {
            return LineOutcome::Excluded("platform");
        }

        let key = member_key(declaration, &property.name);
        if self.config.excluded_properties.contains(&key) {
            return LineOutcome::Excluded("configured");
        }

        property.availability = self.availability.resolve(&property);
        if !property.availability.is_available() {
            return LineOutcome::Excluded("unavailable");
        }

        let expr = match self.config.type_overrides.get(&key) {
            Some(expr) => expr.clone(),
            None => match self.types.parse(&property.raw_type) {
                Ok(parsed) => parsed.expr,
                Err(error) => return LineOutcome::Malformed(error.to_string()),
            },
        };
        property.type_expr = if property.is_nullable() {
            nullable(expr, is_closure)
        } else {
            expr
        };

        LineOutcome::Admitted(property)
    }

    fn parse_method(&self, declaration: &str, line: &str) -> LineOutcome<Method> {
        let Some(captures) = method_regex().captures(line) else {
            return LineOutcome::Malformed("method grammar".to_string());
        };

        let is_class_method = &captures[1] == "+";
        let return_type = captures[2].trim().to_string();
        let rest = captures.get(3).map_or("", |m| m.as_str());

        let mut parts = Vec::new();
        let mut annotations_start = 0;
        for part in part_regex().captures_iter(rest) {
            let raw_type = part[2].trim().to_string();
            parts.push(Part {
                keyword: part[1].to_string(),
                parameter: part[3].to_string(),
                raw_type,
                type_expr: String::new(),
                label: None,
                element_type: None,
            });
            annotations_start = part.get(0).map_or(annotations_start, |m| m.end());
        }

        if parts.is_empty() {
            return LineOutcome::Malformed("no selector parts".to_string());
        }

        let mut method = Method {
            parts,
            annotations: rest[annotations_start..].trim().to_string(),
            availability: Default::default(),
        };

        if is_class_method {
            return LineOutcome::Excluded("class method");
        }

        let keyword = method.first_keyword();
        let is_setter = keyword
            .strip_prefix("set")
            .and_then(|tail| tail.chars().next())
            .map_or(false, |c| c.is_ascii_uppercase());
        if !is_setter || return_type != "void" {
            return LineOutcome::Excluded("not a setter");
        }

        let key = member_key(declaration, keyword);
        if self.config.excluded_methods.contains(&key) {
            return LineOutcome::Excluded("configured");
        }
        if self.config.is_platform_excluded(&method.annotations) {
            return LineOutcome::Excluded("platform");
        }

        method.availability = self.availability.resolve(&method);
        if !method.availability.is_available() {
            return LineOutcome::Excluded("unavailable");
        }

        let type_override = self.config.type_overrides.get(&key).cloned();
        let label = self
            .config
            .method_names
            .get(&key)
            .and_then(|name| name.label.clone());

        for (index, part) in method.parts.iter_mut().enumerate() {
            let is_nullable = parameter_nullability_regex()
                .find_iter(&part.raw_type)
                .any(|m| is_nullable_qualifier(m.as_str()));
            let cleaned = parameter_nullability_regex().replace_all(&part.raw_type, "");

            let (expr, is_closure) = match (index, &type_override) {
                (0, Some(expr)) => (expr.clone(), false),
                _ => match self.types.parse(&cleaned) {
                    Ok(parsed) => (parsed.expr, parsed.is_closure),
                    Err(error) => return LineOutcome::Malformed(error.to_string()),
                },
            };

            part.type_expr = if is_nullable {
                nullable(expr, is_closure)
            } else {
                expr
            };
        }

        if let Some(first) = method.parts.first_mut() {
            first.label = label;
        }

        LineOutcome::Admitted(method)
    }
}

/// Parse one unit with the given configuration
pub fn parse(source: &str, config: &GeneratorConfig) -> ParseResult<ParsedUnit> {
    Parser::new(config).parse(source)
}
