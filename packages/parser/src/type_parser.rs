//! Type-expression normalization
//!
//! Objective-C type spellings (`NSArray<NSString *> *`, `void (^)(NSError *)`)
//! become Swift type expressions (`[String]`, `(Error?) -> Void`). Generic
//! types are scanned into an arena tree and rendered post-order; block types
//! go through a dedicated pattern.

use crate::config::GeneratorConfig;
use crate::error::{TypeError, TypeResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Qualifier tokens dropped wherever they appear
const QUALIFIERS: &[&str] = &["__kindof", "const"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedType {
    pub expr: String,
    pub is_closure: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeNode {
    pub name: String,
    pub children: Vec<usize>,
    pub parent: Option<usize>,
}

/// Arena of type nodes; index 0 is the root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeTree {
    pub nodes: Vec<TypeNode>,
}

impl TypeTree {
    fn new() -> Self {
        Self {
            nodes: vec![TypeNode::default()],
        }
    }

    fn push(&mut self, parent: Option<usize>) -> usize {
        let id = self.nodes.len();
        self.nodes.push(TypeNode {
            parent,
            ..TypeNode::default()
        });
        if let Some(parent) = parent {
            self.nodes[parent].children.push(id);
        }
        id
    }

    pub fn root(&self) -> &TypeNode {
        &self.nodes[0]
    }

    /// Generic nesting depth, 0 for a plain name
    pub fn depth(&self) -> usize {
        fn walk(tree: &TypeTree, id: usize) -> usize {
            tree.nodes[id]
                .children
                .iter()
                .map(|child| 1 + walk(tree, *child))
                .max()
                .unwrap_or(0)
        }
        walk(self, 0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Idle,
    InToken,
}

fn closure_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*([^()^]+?)\s*\(\s*\^\s*\w*\s*\)\s*\((.*)\)\s*$").unwrap()
    })
}

pub struct TypeParser<'cfg> {
    config: &'cfg GeneratorConfig,
}

impl<'cfg> TypeParser<'cfg> {
    pub fn new(config: &'cfg GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn parse(&self, raw: &str) -> TypeResult<ParsedType> {
        if raw.contains('^') {
            return Ok(ParsedType {
                expr: self.parse_closure(raw)?,
                is_closure: true,
            });
        }

        let tree = self.parse_tree(raw)?;
        Ok(ParsedType {
            expr: self.render(&tree),
            is_closure: false,
        })
    }

    /// Scan a non-block type into a tree of rewritten names
    pub fn parse_tree(&self, raw: &str) -> TypeResult<TypeTree> {
        let mut tree = TypeTree::new();
        let mut current = 0;
        let mut depth = 0usize;
        let mut mode = Mode::Idle;
        let mut buffer = String::new();

        for c in raw.chars() {
            if c.is_ascii_alphanumeric() || c == '_' {
                buffer.push(c);
                mode = Mode::InToken;
                continue;
            }

            if mode == Mode::InToken {
                self.flush(&mut tree, current, &mut buffer);
                mode = Mode::Idle;
            }

            match c {
                '<' => {
                    current = tree.push(Some(current));
                    depth += 1;
                }
                ',' => {
                    if depth == 0 {
                        return Err(TypeError::unbalanced(raw));
                    }
                    let parent = tree.nodes[current].parent;
                    current = tree.push(parent);
                }
                '>' => {
                    if depth == 0 {
                        return Err(TypeError::unbalanced(raw));
                    }
                    current = tree.nodes[current].parent.unwrap_or(0);
                    depth -= 1;
                }
                _ => {}
            }
        }

        if mode == Mode::InToken {
            self.flush(&mut tree, current, &mut buffer);
        }

        // Unclosed `<` are closed implicitly
        Ok(tree)
    }

    fn flush(&self, tree: &mut TypeTree, node: usize, buffer: &mut String) {
        let token = std::mem::take(buffer);
        if QUALIFIERS.contains(&token.as_str()) {
            return;
        }

        let node = &mut tree.nodes[node];
        let joined = if node.name.is_empty() {
            token
        } else {
            format!("{} {}", node.name, token)
        };
        node.name = self.rewrite_token(&joined);
    }

    /// Alias table, then prefix strip, then reference suffix strip
    pub fn rewrite_token(&self, token: &str) -> String {
        if let Some(alias) = self.config.type_aliases.get(token) {
            return alias.clone();
        }

        if self.config.prefix_strips.contains(token) {
            return token.chars().skip(2).collect();
        }

        let suffix = self.config.reference_suffix.as_str();
        if !suffix.is_empty()
            && token.len() > suffix.len()
            && token.ends_with(suffix)
            && !self.config.reference_suffix_exceptions.contains(token)
        {
            return token[..token.len() - suffix.len()].to_string();
        }

        token.to_string()
    }

    pub fn render(&self, tree: &TypeTree) -> String {
        self.render_node(tree, 0)
    }

    fn render_node(&self, tree: &TypeTree, id: usize) -> String {
        let node = &tree.nodes[id];
        let container = self.config.containers.get(&node.name);

        let arguments: Vec<String> = node
            .children
            .iter()
            .map(|child| self.render_node(tree, *child))
            .filter(|argument| !argument.is_empty())
            .collect();

        if arguments.is_empty() {
            return match container {
                Some(container) => container.bare.clone(),
                None => node.name.clone(),
            };
        }

        if node.name == self.config.wildcard_object && arguments.len() >= 2 {
            return format!("({})", arguments.join(" & "));
        }

        match container {
            Some(container) => substitute(&container.template, &arguments),
            None if node.name.is_empty() => arguments.join(", "),
            None => format!("{}<{}>", node.name, arguments.join(", ")),
        }
    }

    fn parse_closure(&self, raw: &str) -> TypeResult<String> {
        let captures = closure_regex()
            .captures(raw)
            .ok_or_else(|| TypeError::malformed_closure(raw))?;

        let return_type = self.render(&self.parse_tree(&captures[1])?);

        let mut parameters = Vec::new();
        for parameter in split_top_level(&captures[2]) {
            let parameter = parameter.trim();
            let (type_text, is_pointer) = match parameter.rfind('*') {
                Some(star) => (&parameter[..star], true),
                None => match parameter.rsplit_once(char::is_whitespace) {
                    Some((head, _name)) if !head.trim().is_empty() => (head, false),
                    _ => (parameter, false),
                },
            };

            let rendered = self.render(&self.parse_tree(type_text)?);
            if rendered.is_empty() || rendered == "Void" {
                continue;
            }
            if is_pointer {
                parameters.push(format!("{}?", rendered));
            } else {
                parameters.push(rendered);
            }
        }

        Ok(format!("({}) -> {}", parameters.join(", "), return_type))
    }
}

fn substitute(template: &str, arguments: &[String]) -> String {
    let mut pieces = template.split("%@");
    let mut output = pieces.next().unwrap_or_default().to_string();
    let mut arguments = arguments.iter();

    for piece in pieces {
        if let Some(argument) = arguments.next() {
            output.push_str(argument);
        }
        output.push_str(piece);
    }
    output
}

/// Split on commas outside of generic brackets
fn split_top_level(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;

    for (i, c) in text.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}
