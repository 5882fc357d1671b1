//! Member naming
//!
//! Every generated function has a full name, derived mechanically from the
//! declaration, and a short name produced by the configured rewrite tables.
//! When the two differ both are emitted and the full one is deprecated in
//! favour of the short one.

use chaingen_parser::ast::member_key;
use chaingen_parser::{Declaration, GeneratorConfig, Method, Property};
use regex::{NoExpand, Regex};

/// Boolean prefixes that must keep their suffix
const BOOLEAN_STEMS: &[&str] = &["is", "has"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberNames {
    pub full: String,
    pub short: String,
}

impl MemberNames {
    pub fn is_renamed(&self) -> bool {
        self.full != self.short
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodNames {
    /// Setter to call on the wrapped object, e.g. `setNeedsDisplay`
    pub setter: String,
    /// Sub-label of the first argument, e.g. `in`
    pub label: Option<String>,
    pub names: MemberNames,
}

pub struct NameEngine<'cfg> {
    config: &'cfg GeneratorConfig,
    rules: Vec<(Regex, String)>,
}

impl<'cfg> NameEngine<'cfg> {
    pub fn new(config: &'cfg GeneratorConfig) -> Self {
        let rules = config
            .name_rules
            .iter()
            .filter_map(|rule| {
                let pattern = format!("(?i){}", regex::escape(&rule.pattern));
                Regex::new(&pattern)
                    .ok()
                    .map(|re| (re, rule.replacement.clone()))
            })
            .collect();

        Self { config, rules }
    }

    pub fn property_names(&self, declaration: &Declaration, property: &Property) -> MemberNames {
        let full = match property.getter() {
            Some(getter) => getter.to_string(),
            None => self
                .config
                .property_names
                .get(&member_key(&declaration.name, &property.name))
                .cloned()
                .unwrap_or_else(|| property.name.clone()),
        };

        self.member_names(full)
    }

    pub fn method_names(&self, declaration: &Declaration, method: &Method) -> MethodNames {
        let keyword = method.first_keyword();
        let key = member_key(&declaration.name, keyword);
        let first = method.parts.first();

        let (base, label) = match self.config.method_names.get(&key) {
            Some(rename) => (rename.name.clone(), rename.label.clone()),
            None => {
                let base = keyword.strip_prefix("set").unwrap_or(keyword);
                let parameter = first.map_or("", |part| part.parameter.as_str());
                match self.split_preposition(base, parameter) {
                    Some((stem, preposition)) => (stem.to_string(), Some(preposition)),
                    None => (base.to_string(), None),
                }
            }
        };
        let label = first.and_then(|part| part.label.clone()).or(label);

        MethodNames {
            setter: format!("set{}", base),
            label,
            names: self.member_names(initial_lowercased(&base)),
        }
    }

    fn member_names(&self, full: String) -> MemberNames {
        let short = self.shorten(&full);
        MemberNames { full, short }
    }

    /// `NeedsDisplayInRect` with parameter `rect` → (`NeedsDisplay`, `in`)
    fn split_preposition<'a>(&self, base: &'a str, parameter: &str) -> Option<(&'a str, String)> {
        if parameter.is_empty() {
            return None;
        }

        self.config.prepositions.iter().find_map(|preposition| {
            base.match_indices(preposition.as_str()).find_map(|(at, _)| {
                let tail = &base[at + preposition.len()..];
                let starts_word = tail.chars().next().map_or(false, |c| c.is_ascii_uppercase());

                (at > 0 && starts_word && tail.eq_ignore_ascii_case(parameter))
                    .then(|| (&base[..at], preposition.to_lowercase()))
            })
        })
    }

    /// Short form of a member name
    pub fn shorten(&self, name: &str) -> String {
        if let Some(custom) = self.config.custom_names.get(name) {
            return custom.clone();
        }

        let mut short = name.to_string();
        for (pattern, replacement) in &self.rules {
            short = pattern
                .replace_all(&short, NoExpand(replacement.as_str()))
                .into_owned();
        }

        for suffix in &self.config.name_suffix_strips {
            while let Some(stem) = short.strip_suffix(suffix.as_str()) {
                if stem.is_empty() || BOOLEAN_STEMS.contains(&stem) {
                    break;
                }
                short = stem.to_string();
            }
        }

        let short = initial_lowercased(&short);
        if short.is_empty() {
            name.to_string()
        } else {
            short
        }
    }
}

/// Lowercase the leading uppercase run, keeping the capital that starts the
/// next word: `URLString` → `urlString`, `ID` → `id`, `Title` → `title`
pub fn initial_lowercased(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let run = chars.iter().take_while(|c| c.is_ascii_uppercase()).count();

    let lowered = if run > 1 && run < chars.len() && chars[run].is_ascii_lowercase() {
        run - 1
    } else {
        run
    };

    chars
        .iter()
        .enumerate()
        .map(|(i, c)| if i < lowered { c.to_ascii_lowercase() } else { *c })
        .collect()
}
