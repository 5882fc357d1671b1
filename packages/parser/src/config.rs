//! Static generator configuration
//!
//! All tables consumed by the parser, the naming engine and the code
//! generator live in one immutable [`GeneratorConfig`] value. It is built
//! once (from [`Default`] or from a JSON project file) and passed around by
//! reference.
//!
//! Member-specific tables are keyed by `"Declaration.Member"`, where the
//! member is a property name or a method's first selector keyword.

use crate::ast::Version;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Spellings of a well-known container type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerTemplate {
    /// Used when the container has no generic arguments
    pub bare: String,
    /// `%@` placeholders are substituted positionally with the arguments
    pub template: String,
}

/// Renamed setter: the base name after `set` and an optional first-part label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodNameOverride {
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
}

/// Ordered substring rewrite used to derive short member names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameRule {
    pub pattern: String,
    pub replacement: String,
}

/// Closed enumeration that turns a two-part setter into a variant group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantGroup {
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GeneratorConfig {
    /// Members deprecated at or below this version are dropped
    pub minimum_version: Version,
    /// Platform name used in `@available` guards
    pub platform: String,
    /// Chainable wrapper type the generated extensions attach to
    pub chain_type: String,
    /// Module name written in the file banner
    pub module_name: String,

    pub excluded_types: BTreeSet<String>,
    pub excluded_properties: BTreeSet<String>,
    pub excluded_methods: BTreeSet<String>,
    /// Annotation tokens marking a member as absent on the target platform
    pub platform_excluded_macros: Vec<String>,
    /// Protocol name → declarations receiving its `@optional` members
    pub optional_targets: BTreeMap<String, Vec<String>>,

    pub type_aliases: BTreeMap<String, String>,
    pub prefix_strips: BTreeSet<String>,
    pub reference_suffix: String,
    pub reference_suffix_exceptions: BTreeSet<String>,
    pub containers: BTreeMap<String, ContainerTemplate>,
    /// Container whose multiple arguments render as a protocol composition
    pub wildcard_object: String,
    pub type_overrides: BTreeMap<String, String>,
    pub escaping_types: BTreeSet<String>,

    pub property_names: BTreeMap<String, String>,
    pub method_names: BTreeMap<String, MethodNameOverride>,
    pub custom_names: BTreeMap<String, String>,
    pub name_rules: Vec<NameRule>,
    pub name_suffix_strips: Vec<String>,
    pub prepositions: Vec<String>,

    pub variant_groups: BTreeMap<String, VariantGroup>,
    pub reserved_parameters: BTreeMap<String, String>,
    /// Two-letter type prefix → framework to import
    pub framework_imports: BTreeMap<String, String>,
}

impl GeneratorConfig {
    /// Load a configuration from JSON; missing tables keep their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Copy of the defaults with a different minimum version
    pub fn with_minimum_version(mut self, minimum: Version) -> Self {
        self.minimum_version = minimum;
        self
    }

    pub fn is_platform_excluded(&self, annotations: &str) -> bool {
        self.platform_excluded_macros
            .iter()
            .any(|token| annotations.contains(token.as_str()))
    }

    pub fn variant_group(&self, type_expr: &str) -> Option<&VariantGroup> {
        self.variant_groups.get(type_expr)
    }

    pub fn reserved_parameter<'a>(&'a self, name: &'a str) -> &'a str {
        self.reserved_parameters
            .get(name)
            .map(String::as_str)
            .unwrap_or(name)
    }
}

fn pairs(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn set(entries: &[&str]) -> BTreeSet<String> {
    entries.iter().map(|s| s.to_string()).collect()
}

fn list(entries: &[&str]) -> Vec<String> {
    entries.iter().map(|s| s.to_string()).collect()
}

fn container(bare: &str, template: &str) -> ContainerTemplate {
    ContainerTemplate {
        bare: bare.to_string(),
        template: template.to_string(),
    }
}

fn method_name(name: &str, label: Option<&str>) -> MethodNameOverride {
    MethodNameOverride {
        name: name.to_string(),
        label: label.map(str::to_string),
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            minimum_version: Version::new(9, 0),
            platform: "iOS".to_string(),
            chain_type: "PandaChain".to_string(),
            module_name: "Panda".to_string(),

            excluded_types: set(&["CAEmitterBehavior", "CAMetalLayer"]),
            excluded_properties: set(&[
                "CATransition.filter",
                "UIGestureRecognizer.state",
                "UILabel.font",
                "UISimpleTextPrintFormatter.font",
                "UITextField.font",
                "UITextView.font",
                "UIViewController.disablesAutomaticKeyboardDismissal",
            ]),
            excluded_methods: set(&["UITextChecker.setIgnoredWords"]),
            platform_excluded_macros: list(&["UIKIT_AVAILABLE_TVOS_ONLY"]),
            optional_targets: [
                ("UITextInput", vec!["UITextField", "UITextView"]),
                (
                    "UITextInputTraits",
                    vec!["UISearchBar", "UITextField", "UITextView"],
                ),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), list(&v)))
            .collect(),

            type_aliases: pairs(&[
                ("void", "Void"),
                ("BOOL", "Bool"),
                ("NSInteger", "Int"),
                ("NSUInteger", "Int"),
                ("size_t", "Int"),
                ("unsigned int", "UInt32"),
                ("float", "Float"),
                ("double", "Double"),
                ("SEL", "Selector"),
                ("instancetype", "Self"),
                ("NSCalendarUnit", "NSCalendar.Unit"),
                ("NSGlyphProperty", "NSLayoutManager.GlyphProperty"),
                (
                    "UIDocumentBrowserUserInterfaceStyle",
                    "UIDocumentBrowserViewController.BrowserUserInterfaceStyle",
                ),
                (
                    "UINavigationItemLargeTitleDisplayMode",
                    "UINavigationItem.LargeTitleDisplayMode",
                ),
            ]),
            prefix_strips: set(&[
                "NSCalendar",
                "NSData",
                "NSDate",
                "NSError",
                "NSFileWrapper",
                "NSIndexPath",
                "NSLocale",
                "NSProgress",
                "NSSet",
                "NSString",
                "NSTimeInterval",
                "NSTimeZone",
                "NSUndoManager",
                "NSURL",
            ]),
            reference_suffix: "Ref".to_string(),
            reference_suffix_exceptions: set(&["CFTypeRef"]),
            containers: [
                ("Class", container("AnyClass", "%@.Type")),
                ("id", container("Any", "%@")),
                ("NSArray", container("[Any]", "[%@]")),
                ("NSDictionary", container("[AnyHashable: Any]", "[%@: %@]")),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
            wildcard_object: "id".to_string(),
            type_overrides: pairs(&[
                ("UIAccessibilityElement.accessibilityContainer", "AnyObject"),
                ("UIAccessibilityCustomAction.target", "AnyObject"),
                ("UIAlertView.delegate", "AnyObject"),
                ("UIBarButtonItem.target", "AnyObject"),
            ]),
            escaping_types: set(&["UIAccessibilityCustomRotorSearch"]),

            property_names: pairs(&[
                ("UIBezierPath.CGPath", "cgPath"),
                (
                    "UIPopoverController.popoverBackgroundViewClass",
                    "backgroundViewClass",
                ),
                ("UIPopoverController.popoverContentSize", "contentSize"),
                ("UIPopoverController.popoverLayoutMargins", "layoutMargins"),
                ("UIView.maskView", "mask"),
            ]),
            method_names: [
                ("CALayer.setNeedsDisplayInRect", method_name("NeedsDisplay", None)),
                (
                    "UINavigationItem.setLeftBarButtonItem",
                    method_name("LeftBarButton", None),
                ),
                (
                    "UINavigationItem.setRightBarButtonItem",
                    method_name("RightBarButton", None),
                ),
                (
                    "UIPopoverController.setContentViewController",
                    method_name("ContentView", None),
                ),
                (
                    "UIPopoverController.setPopoverContentSize",
                    method_name("ContentSize", None),
                ),
                (
                    "UITextPasteItem.setAttachmentResult",
                    method_name("Result", Some("attachment")),
                ),
                (
                    "UITextPasteItem.setAttributedStringResult",
                    method_name("Result", Some("attributedString")),
                ),
                (
                    "UITextPasteItem.setStringResult",
                    method_name("Result", Some("string")),
                ),
                ("UIView.setNeedsDisplayInRect", method_name("NeedsDisplay", None)),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
            custom_names: default_custom_names(),
            name_rules: [
                ("alignment", "Align"),
                ("adjustment", "Adjust"),
                ("arrangement", "Arrange"),
                ("backgroundcolor", "Background"),
                ("backgroundimage", "Background"),
                ("backgroundview", "Background"),
                ("identifier", "ID"),
                ("largecontentsizeimage", "LargeImage"),
                ("layoutmargins", "Margins"),
                ("maximum", "Max"),
                ("minimum", "Min"),
                ("numberof", ""),
                ("scalefactor", "Scale"),
                ("scrollindicator", "Indicator"),
                ("textattributes", "Attributes"),
                ("timingfunction", "Timing"),
                ("tintcolor", "Tint"),
                ("userinteractionenabled", "Interactable"),
            ]
            .into_iter()
            .map(|(pattern, replacement)| NameRule {
                pattern: pattern.to_string(),
                replacement: replacement.to_string(),
            })
            .collect(),
            name_suffix_strips: list(&["Enabled"]),
            prepositions: list(&["For", "With", "At", "In", "On", "To", "From", "By", "Of"]),

            variant_groups: [
                (
                    "UIControlState",
                    list(&["normal", "highlighted", "selected", "disabled"]),
                ),
                (
                    "UIBarMetrics",
                    list(&["default", "compact", "defaultPrompt", "compactPrompt"]),
                ),
            ]
            .into_iter()
            .map(|(k, values)| (k.to_string(), VariantGroup { values }))
            .collect(),
            reserved_parameters: pairs(&[("default", "d")]),
            framework_imports: pairs(&[("CL", "CoreLocation")]),
        }
    }
}

fn default_custom_names() -> BTreeMap<String, String> {
    pairs(&[
        // CABasicAnimation
        ("byValue", "by"),
        ("fromValue", "from"),
        ("toValue", "to"),
        // CALayer
        ("allowsEdgeAntialiasing", "edgeAntialiasable"),
        ("masksToBounds", "masks"),
        ("shouldRasterize", "rasterized"),
        // UIBarButtonItemGroup
        ("barButtonItems", "items"),
        // UIButton
        ("contentEdgeInsets", "contentInsets"),
        ("imageEdgeInsets", "imageInsets"),
        ("titleEdgeInsets", "titleInsets"),
        // UICollectionView
        ("allowsMultipleSelection", "multiSelectable"),
        ("allowsSelection", "selectable"),
        ("dragInteractionEnabled", "draggable"),
        ("prefetchDataSource", "prefetchSource"),
        ("prefetchingEnabled", "prefetchs"),
        ("remembersLastFocusedIndexPath", "remembersLastFocus"),
        // UICollectionViewFlowLayout
        ("footerReferenceSize", "footerSize"),
        ("headerReferenceSize", "headerSize"),
        ("scrollDirection", "direction"),
        ("sectionFootersPinToVisibleBounds", "footersPinned"),
        ("sectionHeadersPinToVisibleBounds", "headersPinned"),
        // UIControl
        ("contentHorizontalAlignment", "horizontalAlign"),
        ("contentVerticalAlignment", "verticalAlign"),
        // UIGestureRecognizer
        ("requiresExclusiveTouchType", "exclusiveTouchType"),
        // UILabel
        ("adjustsFontSizeToFitWidth", "adjustsFontSize"),
        ("allowsDefaultTighteningForTruncation", "tightenable"),
        ("highlightedTextColor", "highlightedColor"),
        ("lineBreakMode", "lineBreak"),
        ("preferredMaxLayoutWidth", "maxWidth"),
        ("textAlignment", "align"),
        ("textColor", "color"),
        // UILongPressGestureRecognizer
        ("minimumPressDuration", "minDuration"),
        // UINavigationBar
        ("barStyle", "style"),
        // UINavigationItem
        ("backBarButtonItem", "backItem"),
        ("largeTitleDisplayMode", "largeTitleMode"),
        ("leftBarButton", "leftItem"),
        ("leftBarButtonItem", "leftItem"),
        ("leftBarButtonItems", "leftItems"),
        ("rightBarButton", "rightItem"),
        ("rightBarButtonItem", "rightItem"),
        ("rightBarButtonItems", "rightItems"),
        // UIScrollView
        ("contentInsetAdjustmentBehavior", "contentInsetAdjust"),
        ("directionalLockEnabled", "directionLocked"),
        ("pagingEnabled", "paged"),
        ("scrollEnabled", "scrollable"),
        // UIStackView
        ("baselineRelativeArrangement", "baselineArrange"),
        ("layoutMarginsRelativeArrangement", "marginsArrange"),
        // UITableView
        ("allowsSelectionDuringEditing", "selectableDuringEditing"),
        (
            "allowsMultipleSelectionDuringEditing",
            "multiSelectableDuringEditing",
        ),
        ("estimatedSectionFooterHeight", "estimatedFooterHeight"),
        ("estimatedSectionHeaderHeight", "estimatedHeaderHeight"),
        ("sectionFooterHeight", "footerHeight"),
        ("sectionHeaderHeight", "headerHeight"),
        // UITapGestureRecognizer
        ("numberOfTapsRequired", "taps"),
        ("numberOfTouchesRequired", "touches"),
        // UITextField
        ("allowsEditingTextAttributes", "attributesEditable"),
        // UITextView
        ("textContainerInset", "containerInset"),
        // UIView
        ("autoresizesSubviews", "autoresizes"),
        ("autoresizingMask", "autoresizing"),
        ("clearsContextBeforeDrawing", "clearsContext"),
        ("clipsToBounds", "clips"),
        ("contentCompressionResistancePriority", "resistancePriority"),
        ("contentHuggingPriority", "huggingPriority"),
        ("contentMode", "mode"),
        ("multipleTouchEnabled", "multiTouchable"),
        ("semanticContentAttribute", "semantics"),
        ("tintAdjustmentMode", "tintAdjust"),
        (
            "translatesAutoresizingMaskIntoConstraints",
            "translatesAutoresizing",
        ),
        // Exceptions
        ("badgeTextAttributes", "badgeTextAttributes"),
        ("showsNumberOfCopies", "showsNumberOfCopies"),
    ])
}
