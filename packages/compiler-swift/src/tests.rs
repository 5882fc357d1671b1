use crate::{compile_declaration, compile_registry, CompileOptions};
use chaingen_bundle::TypeRegistry;
use chaingen_parser::{parse, GeneratorConfig};

fn registry(source: &str, config: &GeneratorConfig) -> TypeRegistry {
    let unit = parse(source, config).expect("Failed to parse");
    let mut registry: TypeRegistry = unit.declarations.into_iter().collect();
    registry.mark_containers();
    registry
}

fn compile(source: &str, name: &str) -> String {
    let config = GeneratorConfig::default();
    let registry = registry(source, &config);
    let declaration = registry.get(name).expect("Declaration not found");
    compile_declaration(declaration, "UIKit", &CompileOptions::new(&config))
}

#[test]
fn test_simple_declaration() {
    let source = r#"
@interface UIView : UIResponder
@property(nonatomic) CGFloat alpha;
@property(nonatomic) UIViewContentMode contentMode;
- (void)setNeedsDisplayInRect:(CGRect)rect;
@end
"#;

    let expected = r#"//
//  UIView.swift
//  Panda
//
//  Generated by chaingen. DO NOT EDIT.
//

import UIKit

extension PandaChain where Object: UIView {
    @discardableResult
    public func alpha(_ value: CGFloat) -> PandaChain {
        object.alpha = value
        return self
    }

    /// `contentMode`
    @discardableResult
    public func mode(_ value: UIViewContentMode) -> PandaChain {
        object.contentMode = value
        return self
    }

    @available(*, deprecated, renamed: "mode()")
    @discardableResult
    public func contentMode(_ value: UIViewContentMode) -> PandaChain {
        return mode(value)
    }

    @discardableResult
    public func needsDisplay(_ rect: CGRect) -> PandaChain {
        object.setNeedsDisplay(rect)
        return self
    }
}
"#;

    assert_eq!(compile(source, "UIView"), expected);
}

#[test]
fn test_variant_group_expansion() {
    let source = r#"
@interface UIButton : UIControl
- (void)setTitle:(nullable NSString *)title forState:(UIControlState)state;
@end
"#;
    let result = compile(source, "UIButton");

    assert!(result.contains(
        "    public func title(_ title: String?, forState state: UIControlState) -> PandaChain {\n        object.setTitle(title, forState: state)\n"
    ));

    let expansion = r#"    @discardableResult
    public func title(
        _ normal: String,
        highlighted: String? = nil,
        selected: String? = nil,
        disabled: String? = nil
    ) -> PandaChain {
        return forControlState(
            normal: normal,
            highlighted: highlighted,
            selected: selected,
            disabled: disabled,
            setter: object.setTitle
        )
    }
}
"#;
    assert!(result.ends_with(expansion), "{}", result);

    // Ordinary method comes before the expansion
    let ordinary = result.find("forState state").unwrap();
    let expanded = result.find("_ normal").unwrap();
    assert!(ordinary < expanded);
}

#[test]
fn test_variant_reserved_parameter() {
    let source = r#"
@interface UINavigationBar : UIView
- (void)setTitleVerticalPositionAdjustment:(CGFloat)adjustment forBarMetrics:(UIBarMetrics)barMetrics;
@end
"#;
    let result = compile(source, "UINavigationBar");

    assert!(result.contains("        _ d: CGFloat,\n        compact: CGFloat? = nil,"));
    assert!(result.contains("            default: d,\n"));
    assert!(result.contains("return forBarMetrics("));
}

#[test]
fn test_convertible_elements() {
    let source = r#"
@interface UINavigationItem : NSObject
@property(nullable, nonatomic, copy) NSArray<UIBarButtonItem *> *leftBarButtonItems;
@property(nullable, nonatomic, strong) UIBarButtonItem *backBarButtonItem;
@end

@interface UIBarButtonItem : UIBarItem
@property(nonatomic) CGFloat width;
@end
"#;
    let item = compile(source, "UINavigationItem");
    assert!(item.contains("public func leftItems(_ value: [UIBarButtonItemConvertible]?) -> PandaChain {"));
    assert!(item.contains("object.leftBarButtonItems = unboxArray(value)"));
    assert!(item.contains("public func backItem(_ value: UIBarButtonItemConvertible?) -> PandaChain {"));
    assert!(item.contains("object.backBarButtonItem = unbox(value)"));
    assert!(!item.contains("public protocol"));

    let button = compile(source, "UIBarButtonItem");
    assert!(button.contains(
        "import UIKit\n\npublic protocol UIBarButtonItemConvertible {}\n\nextension UIBarButtonItem: UIBarButtonItemConvertible {}\nextension PandaChain: UIBarButtonItemConvertible {}\n\nextension PandaChain where Object: UIBarButtonItem {\n"
    ));
}

#[test]
fn test_availability_guards() {
    let source = r#"
NS_CLASS_AVAILABLE_IOS(10_0) @interface UIGraphicsRenderer : NSObject
@property(nonatomic) CGFloat scale API_AVAILABLE(ios(11.0));
@property(nonatomic) BOOL opaque NS_DEPRECATED_IOS(2_0, 12_0);
@property(nonatomic) BOOL prefersExtendedRange NS_AVAILABLE_IOS(9_0);
@end
"#;
    let result = compile(source, "UIGraphicsRenderer");

    assert!(result.contains("@available(iOS 10.0, *)\nextension PandaChain where Object: UIGraphicsRenderer {"));
    assert!(result.contains("    @available(iOS 11.0, *)\n    @discardableResult\n    public func scale("));
    assert!(result.contains(
        "    @available(iOS, introduced: 10.0, deprecated: 12.0)\n    @discardableResult\n    public func opaque("
    ));
    assert!(result.contains("    @discardableResult\n    public func prefersExtendedRange("));
    assert!(!result.contains("@available(iOS 9.0"));
    assert_eq!(result.matches("@available(iOS 10.0, *)").count(), 1);
}

#[test]
fn test_ungated_class_with_gated_category() {
    let config = GeneratorConfig::default();
    let mut registry = TypeRegistry::new();
    for source in [
        "API_AVAILABLE(ios(11.0)) @interface UIView (Interactions)\n@property BOOL interactionsEnabled;\n@end\n",
        "@interface UIView : UIResponder\n@property CGFloat alpha;\n@end\n",
    ] {
        registry.extend(parse(source, &config).unwrap().declarations);
    }
    let view = registry.get("UIView").unwrap();
    let result = compile_declaration(view, "UIKit", &CompileOptions::new(&config));

    assert!(result.contains("\n\nextension PandaChain where Object: UIView {"));
    assert!(result.contains("    @discardableResult\n    public func alpha("));
    assert!(result.contains("    @available(iOS 11.0, *)\n    @discardableResult\n    public func interactionsEnabled("));
}

#[test]
fn test_deprecated_below_minimum_is_dropped() {
    let source = r#"
@interface UIView : UIResponder
@property(nonatomic) BOOL legacy NS_DEPRECATED_IOS(2_0, 8_0);
@property(nonatomic) CGFloat alpha;
@end
"#;
    let result = compile(source, "UIView");
    assert!(!result.contains("legacy"));
    assert!(result.contains("func alpha"));
}

#[test]
fn test_escaping_and_imports() {
    let source = r#"
@interface UIViewPropertyAnimator : NSObject
@property(nonatomic, copy) void (^animations)(void);
@property(nonatomic, copy, nullable) void (^completion)(BOOL finished);
@property(nonatomic) CLLocationCoordinate2D coordinate;
@end
"#;
    let result = compile(source, "UIViewPropertyAnimator");

    assert!(result.contains("import UIKit\nimport CoreLocation\n"));
    assert!(result.contains("public func animations(_ value: @escaping () -> Void) -> PandaChain {"));
    assert!(result.contains("public func completion(_ value: ((Bool) -> Void)?) -> PandaChain {"));
}

#[test]
fn test_imports_skip_type_qualifiers() {
    let source = r#"
@interface UIFoo : NSObject
- (void)setLocation:(nullable __kindof CLLocation *)location;
- (void)setHeading:(const CLHeading *)heading;
@end
"#;
    let result = compile(source, "UIFoo");

    assert!(result.contains("import UIKit\nimport CoreLocation\n"));
    assert!(result.contains("func location("));
}

#[test]
fn test_single_closing_brace() {
    let source = r#"
@interface UILabel : UIView
@property(nonatomic) NSInteger numberOfLines;
@end
"#;
    let result = compile(source, "UILabel");

    assert!(result.ends_with("    }\n}\n"));
    assert_eq!(result.matches("\n}\n").count(), 1);
    assert!(result.contains("/// `numberOfLines`\n"));
    assert!(result.contains("public func lines(_ value: Int) -> PandaChain {"));
}

#[test]
fn test_compile_registry_in_name_order() {
    let source = r#"
@interface UIView : UIResponder
@property(nonatomic) CGFloat alpha;
@end

@interface UILabel : UIView
@property(nonatomic) NSInteger numberOfLines;
@end
"#;
    let config = GeneratorConfig::default();
    let registry = registry(source, &config);
    let files = compile_registry(&registry, "UIKit", &CompileOptions::new(&config));

    let names: Vec<&str> = files.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, vec!["UILabel", "UIView"]);
    assert!(files[1].1.contains("//  UIView.swift"));
}

#[test]
fn test_custom_chain_type() {
    let mut config = GeneratorConfig::default();
    config.chain_type = "Chain".to_string();
    config.module_name = "Fluent".to_string();

    let registry = registry(
        "@interface UIView : UIResponder\n@property CGFloat alpha;\n@end\n",
        &config,
    );
    let result = compile_declaration(
        registry.get("UIView").unwrap(),
        "UIKit",
        &CompileOptions::new(&config),
    );

    assert!(result.contains("//  Fluent\n"));
    assert!(result.contains("extension Chain where Object: UIView {"));
    assert!(result.contains("-> Chain {"));
}
