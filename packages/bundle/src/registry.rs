//! # Registry - Declaration Collection Across Header Units
//!
//! Every parsed unit yields a partial set of declarations. The same type is
//! commonly spread over several units (categories, protocol members routed
//! onto adopting classes), so the registry folds them into one declaration
//! per name.
//!
//! ## Merge rules
//!
//! - members are unioned; a member already present under the same identity
//!   (property name, method selector) keeps the first copy
//! - availability windows combine through `Availability::merge`, so the
//!   least restrictive block wins; members already carry their own block's
//!   window from parsing
//! - the smallest present super type wins
//!
//! Merging is associative and commutative in the member sets, so units can be
//! folded in any order.
//!
//! ## Usage
//!
//! ```rust
//! use chaingen_bundle::TypeRegistry;
//! use chaingen_parser::{parse, GeneratorConfig};
//!
//! let config = GeneratorConfig::default();
//! let mut registry = TypeRegistry::new();
//!
//! let unit = parse("@interface UIView : UIResponder\n@property CGFloat alpha;\n@end\n", &config).unwrap();
//! registry.extend(unit.declarations);
//! registry.mark_containers();
//!
//! assert_eq!(registry.names(), vec!["UIView"]);
//! ```

use crate::element::element_type;
use chaingen_parser::Declaration;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Declarations keyed by name, read-only once generation starts
#[derive(Clone, Debug, Default)]
pub struct TypeRegistry {
    declarations: HashMap<String, Declaration>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a declaration into the registry
    pub fn merge(&mut self, declaration: Declaration) {
        match self.declarations.get_mut(&declaration.name) {
            Some(existing) => merge_into(existing, declaration),
            None => {
                self.declarations
                    .insert(declaration.name.clone(), declaration);
            }
        }
    }

    pub fn merge_registry(&mut self, other: TypeRegistry) {
        self.extend(other.declarations.into_values());
    }

    /// Record element types on members and flag the declarations they name
    pub fn mark_containers(&mut self) {
        let names: HashSet<String> = self.declarations.keys().cloned().collect();
        let mut convertible = HashSet::new();

        for declaration in self.declarations.values_mut() {
            for property in &mut declaration.properties {
                let element = element_type(&property.type_expr);
                if names.contains(&element.name) {
                    convertible.insert(element.name.clone());
                    property.element_type = Some(element);
                }
            }

            for method in &mut declaration.methods {
                let Some(first) = method.parts.first_mut() else {
                    continue;
                };
                let element = element_type(&first.type_expr);
                if names.contains(&element.name) {
                    convertible.insert(element.name.clone());
                    first.element_type = Some(element);
                }
            }
        }

        for name in convertible {
            if let Some(declaration) = self.declarations.get_mut(&name) {
                debug!(declaration = %name, "Marked convertible");
                declaration.is_convertible = true;
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Declaration> {
        self.declarations.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.declarations.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Declaration names in sorted order
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.declarations.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Declarations in name order
    pub fn iter(&self) -> impl Iterator<Item = &Declaration> {
        let mut declarations: Vec<&Declaration> = self.declarations.values().collect();
        declarations.sort_by(|a, b| a.name.cmp(&b.name));
        declarations.into_iter()
    }
}

impl Extend<Declaration> for TypeRegistry {
    fn extend<I: IntoIterator<Item = Declaration>>(&mut self, iter: I) {
        for declaration in iter {
            self.merge(declaration);
        }
    }
}

impl FromIterator<Declaration> for TypeRegistry {
    fn from_iter<I: IntoIterator<Item = Declaration>>(iter: I) -> Self {
        let mut registry = TypeRegistry::new();
        registry.extend(iter);
        registry
    }
}

fn merge_into(existing: &mut Declaration, incoming: Declaration) {
    for property in incoming.properties {
        if !existing.properties.iter().any(|p| p.name == property.name) {
            existing.properties.push(property);
        }
    }

    for method in incoming.methods {
        let selector = method.selector();
        if !existing.methods.iter().any(|m| m.selector() == selector) {
            existing.methods.push(method);
        }
    }

    existing.availability = existing.availability.merge(incoming.availability);
    existing.super_type = match (existing.super_type.take(), incoming.super_type) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    };
    if existing.annotations.is_empty()
        || (!incoming.annotations.is_empty() && incoming.annotations < existing.annotations)
    {
        existing.annotations = incoming.annotations;
    }
    existing.is_convertible |= incoming.is_convertible;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chaingen_parser::{parse, Availability, GeneratorConfig, Version};
    use std::collections::BTreeSet;

    fn declarations(source: &str) -> Vec<Declaration> {
        parse(source, &GeneratorConfig::default()).unwrap().declarations
    }

    fn member_sets(registry: &TypeRegistry) -> Vec<(String, BTreeSet<String>, BTreeSet<String>)> {
        registry
            .iter()
            .map(|d| {
                (
                    d.name.clone(),
                    d.properties.iter().map(|p| p.name.clone()).collect(),
                    d.methods.iter().map(|m| m.selector()).collect(),
                )
            })
            .collect()
    }

    const VIEW: &str = "@interface UIView : UIResponder\n@property CGFloat alpha;\n@property BOOL hidden;\n@end\n";
    const VIEW_CATEGORY: &str = "@interface UIView (Layout)\n@property UIEdgeInsets layoutMargins API_AVAILABLE(ios(11.0));\n@property CGFloat alpha;\n@end\n";
    const VIEW_METHODS: &str = "@interface UIView (Rendering)\n- (void)setNeedsDisplayInRect:(CGRect)rect;\n@end\n";

    #[test]
    fn test_merge_unions_members() {
        let mut registry = TypeRegistry::new();
        registry.extend(declarations(VIEW));
        registry.extend(declarations(VIEW_CATEGORY));

        assert_eq!(registry.len(), 1);
        let view = registry.get("UIView").unwrap();
        let names: Vec<&str> = view.properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "hidden", "layoutMargins"]);
        assert_eq!(view.super_type.as_deref(), Some("UIResponder"));
    }

    #[test]
    fn test_merge_is_commutative_and_associative() {
        let units = [VIEW, VIEW_CATEGORY, VIEW_METHODS];

        let forward: TypeRegistry = units.iter().flat_map(|u| declarations(u)).collect();
        let backward: TypeRegistry = units.iter().rev().flat_map(|u| declarations(u)).collect();

        let mut left = TypeRegistry::new();
        left.extend(declarations(VIEW));
        let mut right: TypeRegistry = declarations(VIEW_CATEGORY).into_iter().collect();
        right.extend(declarations(VIEW_METHODS));
        left.merge_registry(right);

        assert_eq!(member_sets(&forward), member_sets(&backward));
        assert_eq!(member_sets(&forward), member_sets(&left));
    }

    #[test]
    fn test_merge_availability_and_super_type() {
        let mut first = Declaration::new("UIStackView");
        first.availability = Availability::Introduced(Version::new(11, 0));
        let mut second = Declaration::new("UIStackView");
        second.availability = Availability::Introduced(Version::new(10, 0));
        second.super_type = Some("UIView".to_string());

        let mut registry = TypeRegistry::new();
        registry.merge(first);
        registry.merge(second);

        let stack = registry.get("UIStackView").unwrap();
        assert_eq!(stack.availability, Availability::Introduced(Version::new(10, 0)));
        assert_eq!(stack.super_type.as_deref(), Some("UIView"));
    }

    #[test]
    fn test_gated_category_keeps_base_ungated() {
        let category = "API_AVAILABLE(ios(11.0)) @interface UIView (Interactions)\n@property BOOL interactionsEnabled;\n@end\n";

        for units in [[VIEW, category], [category, VIEW]] {
            let registry: TypeRegistry = units.iter().flat_map(|u| declarations(u)).collect();
            let view = registry.get("UIView").unwrap();

            assert_eq!(view.availability, Availability::Always);
            let alpha = view.properties.iter().find(|p| p.name == "alpha").unwrap();
            assert_eq!(alpha.availability, Availability::Always);
            let enabled = view
                .properties
                .iter()
                .find(|p| p.name == "interactionsEnabled")
                .unwrap();
            assert_eq!(enabled.availability, Availability::Introduced(Version::new(11, 0)));
        }
    }

    #[test]
    fn test_mark_containers() {
        let source = r#"
@interface UINavigationItem : NSObject
@property(nullable, nonatomic, copy) NSArray<UIBarButtonItem *> *leftBarButtonItems;
@property(nullable, nonatomic, strong) UIBarButtonItem *backBarButtonItem;
@property(nullable, nonatomic, copy) NSString *title;
@end

@interface UIBarButtonItem : UIBarItem
@property(nonatomic) CGFloat width;
@end
"#;
        let mut registry: TypeRegistry = declarations(source).into_iter().collect();
        registry.mark_containers();

        assert!(registry.get("UIBarButtonItem").unwrap().is_convertible);
        assert!(!registry.get("UINavigationItem").unwrap().is_convertible);

        let item = registry.get("UINavigationItem").unwrap();
        let items = item.properties[0].element_type.as_ref().unwrap();
        assert_eq!(items.name, "UIBarButtonItem");
        assert!(items.is_sequence);

        let back = item.properties[1].element_type.as_ref().unwrap();
        assert!(!back.is_sequence);
        assert!(item.properties[2].element_type.is_none());
    }

    #[test]
    fn test_sorted_iteration() {
        let source = "@interface UIView : UIResponder\n@property CGFloat alpha;\n@end\n@interface UILabel : UIView\n@property NSInteger numberOfLines;\n@end\n";
        let registry: TypeRegistry = declarations(source).into_iter().collect();

        assert_eq!(registry.names(), vec!["UILabel", "UIView"]);
        let names: Vec<&str> = registry.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["UILabel", "UIView"]);
        assert!(!registry.is_empty());
        assert!(registry.contains("UIView"));
    }
}
