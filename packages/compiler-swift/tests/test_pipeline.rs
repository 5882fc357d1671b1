use chaingen_bundle::TypeRegistry;
use chaingen_compiler_swift::{compile_registry, CompileOptions};
use chaingen_parser::{parse, GeneratorConfig};

const SCROLL_VIEW: &str = r#"
NS_CLASS_AVAILABLE_IOS(2_0) @interface UIScrollView : UIView <NSCoding>
@property(nonatomic) CGPoint contentOffset;
@property(nonatomic) UIEdgeInsets contentInset;
@property(nullable, nonatomic, weak) id<UIScrollViewDelegate> delegate;
- (void)setContentOffset:(CGPoint)contentOffset animated:(BOOL)animated;
@end

@protocol UIScrollViewDelegate <NSObject>
@optional
- (void)scrollViewDidScroll:(UIScrollView *)scrollView;
@end
"#;

const TABLE_VIEW: &str = r#"
NS_CLASS_AVAILABLE_IOS(2_0) @interface UITableView : UIScrollView <NSCoding>
@property(nonatomic) CGFloat rowHeight;
@property(nonatomic, strong, nullable) UIView *tableHeaderView;
@end

@interface UIScrollView (UIRefreshControl)
@property(nonatomic, strong, nullable) UIRefreshControl *refreshControl API_AVAILABLE(ios(10.0));
@end
"#;

const VIEW: &str = r#"
@interface UIView : UIResponder
@property(nonatomic) CGFloat alpha;
@end
"#;

fn generate(units: &[&str]) -> Vec<(String, String)> {
    let config = GeneratorConfig::default();
    let mut registry = TypeRegistry::new();
    for unit in units {
        registry.extend(parse(unit, &config).unwrap().declarations);
    }
    registry.mark_containers();
    compile_registry(&registry, "UIKit", &CompileOptions::new(&config))
}

/// Lines of every file, sorted; members keep first-seen order
fn line_sets(files: &[(String, String)]) -> Vec<(String, Vec<String>)> {
    files
        .iter()
        .map(|(name, text)| {
            let mut lines: Vec<String> = text.lines().map(str::to_string).collect();
            lines.sort();
            (name.clone(), lines)
        })
        .collect()
}

#[test]
fn test_unit_order_does_not_change_members() {
    let forward = generate(&[SCROLL_VIEW, TABLE_VIEW, VIEW]);
    let backward = generate(&[VIEW, TABLE_VIEW, SCROLL_VIEW]);

    assert_eq!(line_sets(&forward), line_sets(&backward));
}

#[test]
fn test_category_members_join_the_class() {
    let files = generate(&[SCROLL_VIEW, TABLE_VIEW, VIEW]);
    let names: Vec<&str> = files.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["UIScrollView", "UITableView", "UIView"]);

    let scroll = &files[0].1;
    assert!(scroll.contains("func contentOffset(_ value: CGPoint) -> PandaChain {"));
    assert!(scroll.contains("    @available(iOS 10.0, *)\n    @discardableResult\n    public func refreshControl("));
    assert!(scroll.contains("object.setContentOffset(contentOffset, animated: animated)"));
}

#[test]
fn test_element_types_become_convertible() {
    let files = generate(&[SCROLL_VIEW, TABLE_VIEW, VIEW]);

    let view = &files[2].1;
    assert!(view.contains("public protocol UIViewConvertible {}"));

    let table = &files[1].1;
    assert!(table.contains("(_ value: UIViewConvertible?) -> PandaChain {"));
    assert!(table.contains("object.tableHeaderView = unbox(value)"));
}
