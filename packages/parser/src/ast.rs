use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::fmt;

/// A `major.minor` platform version
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
}

impl Version {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Parse `9.0` or `9_0`
    pub fn parse(text: &str) -> Option<Self> {
        let (major, minor) = text.trim().split_once(|c| c == '.' || c == '_')?;
        Some(Self {
            major: major.parse().ok()?,
            minor: minor.parse().ok()?,
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Availability window of a declaration or member, already resolved
/// against the configured minimum version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Availability {
    /// Available on every supported version, no guard needed
    Always,
    /// Introduced after the minimum version
    Introduced(Version),
    /// Deprecated after the minimum version
    Deprecated { introduced: Version, deprecated: Version },
    /// Deprecated at or below the minimum version, or unavailable on the platform
    Unavailable,
}

impl Default for Availability {
    fn default() -> Self {
        Availability::Always
    }
}

impl Availability {
    pub fn is_available(&self) -> bool {
        !matches!(self, Availability::Unavailable)
    }

    pub fn introduced(&self) -> Option<Version> {
        match self {
            Availability::Introduced(version) => Some(*version),
            Availability::Deprecated { introduced, .. } => Some(*introduced),
            _ => None,
        }
    }

    pub fn deprecated(&self) -> Option<Version> {
        match self {
            Availability::Deprecated { deprecated, .. } => Some(*deprecated),
            _ => None,
        }
    }

    /// Combine the windows of two declarations sharing a name.
    ///
    /// The least restrictive window wins, so an ungated block keeps the
    /// merged declaration ungated. Commutative and associative.
    pub fn merge(self, other: Self) -> Self {
        if self.restriction_key() <= other.restriction_key() {
            self
        } else {
            other
        }
    }

    /// Window of a member declared inside a block with window `self`
    pub fn narrow(self, member: Self) -> Self {
        use Availability::*;

        let (introduced, deprecated) = match (self, member) {
            (Unavailable, _) | (_, Unavailable) => return Unavailable,
            (Always, window) | (window, Always) => return window,
            (Introduced(a), Introduced(b)) => return Introduced(a.max(b)),
            (Introduced(a), Deprecated { introduced, deprecated })
            | (Deprecated { introduced, deprecated }, Introduced(a)) => (a.max(introduced), deprecated),
            (
                Deprecated { introduced: a, deprecated: x },
                Deprecated { introduced: b, deprecated: y },
            ) => (a.max(b), x.min(y)),
        };

        if introduced >= deprecated {
            Unavailable
        } else {
            Deprecated { introduced, deprecated }
        }
    }

    fn restriction_key(&self) -> (u8, Version, Reverse<Version>) {
        const NEVER: Version = Version::new(u32::MAX, u32::MAX);

        match self {
            Availability::Always => (0, Version::new(0, 0), Reverse(NEVER)),
            Availability::Introduced(introduced) => (1, *introduced, Reverse(NEVER)),
            Availability::Deprecated {
                introduced,
                deprecated,
            } => (1, *introduced, Reverse(*deprecated)),
            Availability::Unavailable => (2, NEVER, Reverse(Version::new(0, 0))),
        }
    }
}

/// Inner type of a container-shaped member
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementType {
    pub name: String,
    pub is_sequence: bool,
}

/// A named interface unit (`@interface` or `@protocol` block)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Declaration {
    pub name: String,
    pub super_type: Option<String>,
    /// Raw annotation text attached to the block header
    pub annotations: String,
    pub availability: Availability,
    pub properties: Vec<Property>,
    pub methods: Vec<Method>,
    /// Set when another declaration uses this one as an element type
    pub is_convertible: bool,
}

impl Declaration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            super_type: None,
            annotations: String::new(),
            availability: Availability::Always,
            properties: Vec::new(),
            methods: Vec::new(),
            is_convertible: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty() && self.methods.is_empty()
    }

}

/// Compound `Declaration.Member` key used by the configuration tables
pub fn member_key(declaration: &str, member: &str) -> String {
    format!("{}.{}", declaration, member)
}

/// `@property` member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    pub raw_type: String,
    /// Normalized type expression, nullability applied
    pub type_expr: String,
    pub is_closure: bool,
    pub attributes: Vec<String>,
    pub annotations: String,
    pub availability: Availability,
    pub element_type: Option<ElementType>,
}

impl Property {
    pub fn has_attribute(&self, attribute: &str) -> bool {
        self.attributes.iter().any(|a| a == attribute)
    }

    pub fn is_read_only(&self) -> bool {
        self.has_attribute("readonly")
    }

    pub fn is_class(&self) -> bool {
        self.has_attribute("class")
    }

    pub fn is_nullable(&self) -> bool {
        self.has_attribute("nullable") || self.has_attribute("null_resettable")
    }

    /// Custom getter name from `getter=isFoo`
    pub fn getter(&self) -> Option<&str> {
        self.attributes.iter().find_map(|attribute| {
            let (key, value) = attribute.split_once('=')?;
            (key.trim() == "getter").then(|| value.trim())
        })
    }
}

/// One `keyword:(type)parameter` segment of a method selector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub keyword: String,
    pub parameter: String,
    pub raw_type: String,
    pub type_expr: String,
    /// Sub-label of the first part, e.g. `in` for `needsDisplay(in rect:)`
    pub label: Option<String>,
    pub element_type: Option<ElementType>,
}

/// Multi-keyword instance method
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Method {
    pub parts: Vec<Part>,
    pub annotations: String,
    pub availability: Availability,
}

impl Method {
    pub fn first_keyword(&self) -> &str {
        self.parts.first().map(|p| p.keyword.as_str()).unwrap_or("")
    }

    /// Objective-C selector, e.g. `setTitle:forState:`
    pub fn selector(&self) -> String {
        self.parts.iter().map(|p| format!("{}:", p.keyword)).collect()
    }
}
