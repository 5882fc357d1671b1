use crate::context::{CompileOptions, CompilerContext};
use crate::naming::{MemberNames, NameEngine};
use crate::variants::{self, VariantExpansion};
use chaingen_bundle::TypeRegistry;
use chaingen_parser::{Availability, Declaration, ElementType, Method, Property};
use regex::{NoExpand, Regex};
use std::collections::BTreeSet;
use tracing::{debug, info, instrument};

/// Parameter of a generated function
struct Param {
    /// Argument label, `None` for `_`
    label: Option<String>,
    name: String,
    ty: String,
    default: Option<&'static str>,
}

impl Param {
    fn new(label: Option<String>, name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            label,
            name: name.into(),
            ty: ty.into(),
            default: None,
        }
    }

    fn declaration(&self) -> String {
        let head = match &self.label {
            None => format!("_ {}", self.name),
            Some(label) if *label == self.name => self.name.clone(),
            Some(label) => format!("{} {}", label, self.name),
        };

        match self.default {
            Some(default) => format!("{}: {} = {}", head, self.ty, default),
            None => format!("{}: {}", head, self.ty),
        }
    }

    fn argument(&self) -> String {
        match &self.label {
            None => self.name.clone(),
            Some(label) => format!("{}: {}", label, self.name),
        }
    }
}

/// A chainable function, emitted once or as a short/full pair
struct Function {
    guard: Option<String>,
    names: MemberNames,
    params: Vec<Param>,
    multiline: bool,
    body: Vec<String>,
}

/// Compile one declaration to a Swift source file
#[instrument(skip(declaration, options), fields(declaration = %declaration.name))]
pub fn compile_declaration(declaration: &Declaration, framework: &str, options: &CompileOptions<'_>) -> String {
    let ctx = CompilerContext::new(options.clone());
    let engine = NameEngine::new(options.config);

    compile_header(declaration, framework, &ctx);

    ctx.indent();
    for property in &declaration.properties {
        compile_property(declaration, property, &engine, &ctx);
    }

    for method in &declaration.methods {
        compile_method(declaration, method, &engine, &ctx);
    }

    for method in &declaration.methods {
        let names = engine.method_names(declaration, method);
        if let Some(expansion) = variants::expand(method, &names, options.config) {
            compile_variants(declaration, method, &names.names, &expansion, &ctx);
        }
    }
    ctx.dedent();

    ctx.trim_blank_line();
    ctx.add("}\n");

    debug!(
        properties = declaration.properties.len(),
        methods = declaration.methods.len(),
        "Compiled declaration"
    );
    ctx.get_output()
}

/// Compile every registered declaration, in name order
pub fn compile_registry(
    registry: &TypeRegistry,
    framework: &str,
    options: &CompileOptions<'_>,
) -> Vec<(String, String)> {
    let files: Vec<(String, String)> = registry
        .iter()
        .map(|declaration| {
            (
                declaration.name.clone(),
                compile_declaration(declaration, framework, options),
            )
        })
        .collect();

    info!(framework, files = files.len(), "Compiled framework");
    files
}

fn compile_header(declaration: &Declaration, framework: &str, ctx: &CompilerContext<'_>) {
    let config = ctx.config();
    let name = &declaration.name;
    let chain = &config.chain_type;
    let guard = availability_guard(declaration.availability, &config.platform);

    ctx.add_line("//");
    ctx.add_line(&format!("//  {}.swift", name));
    ctx.add_line(&format!("//  {}", config.module_name));
    ctx.add_line("//");
    ctx.add_line(&format!("//  {}", ctx.options.banner));
    ctx.add_line("//");
    ctx.add("\n");

    ctx.add_line(&format!("import {}", framework));
    for import in imports(declaration, ctx) {
        if import != framework {
            ctx.add_line(&format!("import {}", import));
        }
    }

    if declaration.is_convertible {
        ctx.add("\n");
        ctx.add_optional_line(guard.as_deref());
        ctx.add_line(&format!("public protocol {}Convertible {{}}", name));
        ctx.add("\n");
        ctx.add_optional_line(guard.as_deref());
        ctx.add_line(&format!("extension {}: {}Convertible {{}}", name, name));
        ctx.add_optional_line(guard.as_deref());
        ctx.add_line(&format!("extension {}: {}Convertible {{}}", chain, name));
    }

    ctx.add("\n");
    ctx.add_optional_line(guard.as_deref());
    ctx.add_line(&format!("extension {} where Object: {} {{", chain, name));
}

/// Extra frameworks named by the two-letter prefix of member types
fn imports(declaration: &Declaration, ctx: &CompilerContext<'_>) -> BTreeSet<String> {
    let config = ctx.config();
    let raw_types = declaration
        .properties
        .iter()
        .map(|p| p.raw_type.as_str())
        .chain(
            declaration
                .methods
                .iter()
                .flat_map(|m| m.parts.iter().map(|part| part.raw_type.as_str())),
        );

    raw_types
        .filter_map(|raw| {
            let name = raw
                .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .find(|word| !word.is_empty() && !is_type_qualifier(word))?;
            let prefix = name.get(..2)?;
            config.framework_imports.get(prefix).cloned()
        })
        .collect()
}

fn is_type_qualifier(word: &str) -> bool {
    matches!(
        word,
        "__kindof" | "const" | "nullable" | "nonnull" | "_Nullable" | "_Nonnull" | "__nullable" | "__nonnull"
    )
}

fn compile_property(declaration: &Declaration, property: &Property, engine: &NameEngine<'_>, ctx: &CompilerContext<'_>) {
    let config = ctx.config();
    let names = engine.property_names(declaration, property);
    let (ty, expr) = convertible(&property.type_expr, property.element_type.as_ref(), "value");

    let escaping = (property.is_closure && !property.type_expr.ends_with('?'))
        || config.escaping_types.contains(&property.raw_type);
    let ty = if escaping { format!("@escaping {}", ty) } else { ty };

    let body = vec![
        format!("object.{} = {}", names.full, expr),
        "return self".to_string(),
    ];

    emit_function(
        ctx,
        Function {
            guard: member_guard(declaration, property.availability, &config.platform),
            names,
            params: vec![Param::new(None, "value", ty)],
            multiline: false,
            body,
        },
    );
}

fn compile_method(declaration: &Declaration, method: &Method, engine: &NameEngine<'_>, ctx: &CompilerContext<'_>) {
    let config = ctx.config();
    let Some((first, rest)) = method.parts.split_first() else {
        return;
    };
    let names = engine.method_names(declaration, method);
    let (ty, expr) = convertible(&first.type_expr, first.element_type.as_ref(), &first.parameter);
    let ty = if is_escaping_closure(&first.type_expr) || config.escaping_types.contains(&first.raw_type) {
        format!("@escaping {}", ty)
    } else {
        ty
    };

    let mut params = vec![Param::new(names.label.clone(), first.parameter.as_str(), ty)];
    let mut arguments = vec![match &names.label {
        Some(label) => format!("{}: {}", label, expr),
        None => expr,
    }];

    for part in rest {
        let ty = if is_escaping_closure(&part.type_expr) {
            format!("@escaping {}", part.type_expr)
        } else {
            part.type_expr.clone()
        };
        params.push(Param::new(Some(part.keyword.clone()), part.parameter.as_str(), ty));
        arguments.push(format!("{}: {}", part.keyword, part.parameter));
    }

    let body = vec![
        format!("object.{}({})", names.setter, arguments.join(", ")),
        "return self".to_string(),
    ];

    emit_function(
        ctx,
        Function {
            guard: member_guard(declaration, method.availability, &config.platform),
            names: names.names,
            params,
            multiline: false,
            body,
        },
    );
}

fn compile_variants(declaration: &Declaration, method: &Method, names: &MemberNames, expansion: &VariantExpansion, ctx: &CompilerContext<'_>) {
    let config = ctx.config();

    let params = expansion
        .entries
        .iter()
        .map(|entry| {
            if entry.defaulted {
                Param {
                    label: Some(entry.value.clone()),
                    name: entry.parameter.clone(),
                    ty: format!("{}?", expansion.parameter_type),
                    default: Some("nil"),
                }
            } else {
                Param::new(None, entry.parameter.as_str(), expansion.parameter_type.as_str())
            }
        })
        .collect();

    let mut body = vec![format!("return {}(", expansion.helper)];
    for entry in &expansion.entries {
        body.push(format!("    {}: {},", entry.value, entry.parameter));
    }
    body.push(format!("    setter: object.{}", expansion.setter));
    body.push(")".to_string());

    emit_function(
        ctx,
        Function {
            guard: member_guard(declaration, method.availability, &config.platform),
            names: names.clone(),
            params,
            multiline: true,
            body,
        },
    );
}

fn emit_function(ctx: &CompilerContext<'_>, function: Function) {
    let member = ctx.with_new_buffer();
    let guard = function.guard.as_deref();

    if function.names.is_renamed() {
        let short = &function.names.short;
        let full = &function.names.full;
        let arguments: Vec<String> = function.params.iter().map(Param::argument).collect();
        let forward = vec![format!("return {}({})", short, arguments.join(", "))];
        let deprecation = format!("@available(*, deprecated, renamed: \"{}()\")", short);

        member.add_line(&format!("/// `{}`", full));
        emit_signature(&member, guard, None, short, &function, &function.body);
        emit_signature(&member, guard, Some(&deprecation), full, &function, &forward);
    } else {
        emit_signature(&member, guard, None, &function.names.full, &function, &function.body);
    }

    ctx.merge_buffer(&member);
}

fn emit_signature(
    ctx: &CompilerContext<'_>,
    guard: Option<&str>,
    attribute: Option<&str>,
    name: &str,
    function: &Function,
    body: &[String],
) {
    let chain = &ctx.config().chain_type;

    ctx.add_optional_line(guard);
    ctx.add_optional_line(attribute);
    ctx.add_line("@discardableResult");

    if function.multiline {
        ctx.add_line(&format!("public func {}(", name));
        ctx.indent();
        let last = function.params.len().saturating_sub(1);
        for (index, param) in function.params.iter().enumerate() {
            let separator = if index < last { "," } else { "" };
            ctx.add_line(&format!("{}{}", param.declaration(), separator));
        }
        ctx.dedent();
        ctx.add_line(&format!(") -> {} {{", chain));
    } else {
        let params: Vec<String> = function.params.iter().map(Param::declaration).collect();
        ctx.add_line(&format!(
            "public func {}({}) -> {} {{",
            name,
            params.join(", "),
            chain
        ));
    }

    ctx.indent();
    for line in body {
        ctx.add_line(line);
    }
    ctx.dedent();
    ctx.add_line("}");
    ctx.add("\n");
}

fn availability_guard(availability: Availability, platform: &str) -> Option<String> {
    match availability {
        Availability::Introduced(version) => Some(format!("@available({} {}, *)", platform, version)),
        Availability::Deprecated {
            introduced,
            deprecated,
        } => Some(format!(
            "@available({}, introduced: {}, deprecated: {})",
            platform, introduced, deprecated
        )),
        Availability::Always | Availability::Unavailable => None,
    }
}

/// A member sharing its extension's window needs no guard of its own
fn member_guard(declaration: &Declaration, availability: Availability, platform: &str) -> Option<String> {
    if availability == declaration.availability {
        None
    } else {
        availability_guard(availability, platform)
    }
}

fn is_escaping_closure(ty: &str) -> bool {
    ty.contains("->") && !ty.ends_with('?')
}

/// Swap a registered element type for its convertible protocol
fn convertible(ty: &str, element: Option<&ElementType>, parameter: &str) -> (String, String) {
    let Some(element) = element else {
        return (ty.to_string(), parameter.to_string());
    };

    let replacement = format!("{}Convertible", element.name);
    let ty = match Regex::new(&format!(r"\b{}\b", regex::escape(&element.name))) {
        Ok(pattern) => pattern.replace_all(ty, NoExpand(&replacement)).into_owned(),
        Err(_) => ty.to_string(),
    };

    let expr = if element.is_sequence {
        format!("unboxArray({})", parameter)
    } else {
        format!("unbox({})", parameter)
    };

    (ty, expr)
}
