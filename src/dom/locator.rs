use serde::{Deserialize, Serialize};

/// How an attribute value is compared
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum AttributeMatch {
    #[default]
    Exact,
    Contains,
    Prefix,
}

/// Predicate applied to an element's rendered text
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TextMatch {
    /// Text contains the literal substring
    Contains(String),
    /// Trimmed text equals the literal
    Equals(String),
    /// Text contains at least one of the fragments
    ContainsAny(Vec<String>),
}

impl TextMatch {
    pub fn matches(&self, text: &str) -> bool {
        match self {
            TextMatch::Contains(needle) => text.contains(needle.as_str()),
            TextMatch::Equals(expected) => text.trim() == expected,
            TextMatch::ContainsAny(fragments) => fragments.iter().any(|f| text.contains(f.as_str())),
        }
    }
}

/// One way of finding an element.
///
/// Strategies are plain data so that fallback chains live in configuration;
/// the resolver tries them in declared order and the first hit wins.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "by", rename_all = "snake_case")]
pub enum LocatorStrategy {
    /// Structural CSS selector
    Css { selector: String },

    /// Attribute comparison, optionally restricted to a tag
    Attribute {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tag: Option<String>,
        name: String,
        value: String,
        #[serde(default)]
        mode: AttributeMatch,
    },

    /// Free-text match over every element matched by `candidates`.
    ///
    /// When `closest` is set the match is replaced by its nearest ancestor
    /// (or itself) matching that selector.
    Text {
        candidates: String,
        matcher: TextMatch,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        closest: Option<String>,
    },
}

impl LocatorStrategy {
    pub fn css(selector: impl Into<String>) -> Self {
        LocatorStrategy::Css { selector: selector.into() }
    }

    pub fn attribute(name: impl Into<String>, value: impl Into<String>, mode: AttributeMatch) -> Self {
        LocatorStrategy::Attribute { tag: None, name: name.into(), value: value.into(), mode }
    }

    pub fn text(candidates: impl Into<String>, matcher: TextMatch) -> Self {
        LocatorStrategy::Text { candidates: candidates.into(), matcher, closest: None }
    }

    /// Builder method: resolve a text match to its closest matching ancestor
    pub fn with_closest(self, selector: impl Into<String>) -> Self {
        match self {
            LocatorStrategy::Text { candidates, matcher, .. } => {
                LocatorStrategy::Text { candidates, matcher, closest: Some(selector.into()) }
            }
            other => other,
        }
    }

    /// CSS selector equivalent of a structural strategy, `None` for text strategies
    pub fn to_css(&self) -> Option<String> {
        match self {
            LocatorStrategy::Css { selector } => Some(selector.clone()),
            LocatorStrategy::Attribute { tag, name, value, mode } => {
                let op = match mode {
                    AttributeMatch::Exact => "=",
                    AttributeMatch::Contains => "*=",
                    AttributeMatch::Prefix => "^=",
                };
                Some(format!(
                    "{}[{}{}\"{}\"]",
                    tag.as_deref().unwrap_or(""),
                    name,
                    op,
                    value.replace('\\', "\\\\").replace('"', "\\\"")
                ))
            }
            LocatorStrategy::Text { .. } => None,
        }
    }

    /// Short description used in logs and error messages
    pub fn describe(&self) -> String {
        match self {
            LocatorStrategy::Text { candidates, matcher, .. } => format!("text {:?} in '{}'", matcher, candidates),
            _ => self.to_css().unwrap_or_default(),
        }
    }
}
