use crate::naming::MethodNames;
use chaingen_parser::{GeneratorConfig, Method};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantEntry {
    /// Enumeration value, also the argument label
    pub value: String,
    /// Local parameter name after keyword escaping
    pub parameter: String,
    /// Every entry but the first defaults to `nil`
    pub defaulted: bool,
}

/// One function setting a value for every case of a closed enumeration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantExpansion {
    pub helper: String,
    pub setter: String,
    pub parameter_type: String,
    pub entries: Vec<VariantEntry>,
}

/// Helper that dispatches per-case values: `UIControlState` → `forControlState`
pub fn helper_name(type_name: &str) -> String {
    let stem: String = type_name.chars().skip(2).filter(|c| *c != '.').collect();
    format!("for{}", stem)
}

/// Expand a two-part setter whose second part is a configured enumeration
pub fn expand(method: &Method, names: &MethodNames, config: &GeneratorConfig) -> Option<VariantExpansion> {
    let [first, second] = method.parts.as_slice() else {
        return None;
    };
    let group = config.variant_group(&second.type_expr)?;

    let entries = group
        .values
        .iter()
        .enumerate()
        .map(|(index, value)| VariantEntry {
            value: value.clone(),
            parameter: config.reserved_parameter(value).to_string(),
            defaulted: index > 0,
        })
        .collect();

    Some(VariantExpansion {
        helper: helper_name(&second.type_expr),
        setter: names.setter.clone(),
        parameter_type: first.type_expr.trim_end_matches('?').to_string(),
        entries,
    })
}
