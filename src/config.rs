//! Engine configuration.
//!
//! Every frame name, fallback chain, timeout and settle delay the pipeline
//! uses lives here as data. Defaults reproduce the target application's
//! current markup; a JSON file may override any subset of fields.

use crate::browser::page::DomEvent;
use crate::dom::{FrameMatcher, LocatorStrategy, TextMatch};
use crate::error::{BrowserError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub frames: FrameConfig,
    pub timing: TimingConfig,
    pub navigation: NavigationConfig,
    pub colorway: ColorwayConfig,
    pub extraction: ExtractionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    pub sidebar: FrameMatcher,
    pub content: FrameMatcher,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self { sidebar: FrameMatcher::name("sidebarframe"), content: FrameMatcher::name("contentframe") }
    }
}

/// Bounded waits and settle delays, in milliseconds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub frame_timeout_ms: u64,
    pub element_timeout_ms: u64,
    pub reset_timeout_ms: u64,
    pub menu_timeout_ms: u64,
    pub poll_interval_ms: u64,
    pub reset_settle_ms: u64,
    pub search_load_ms: u64,
    pub search_results_ms: u64,
    pub menu_settle_ms: u64,
    pub bom_load_ms: u64,
    pub picker_open_ms: u64,
    pub option_settle_ms: u64,
    pub colorway_apply_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            frame_timeout_ms: 10_000,
            element_timeout_ms: 10_000,
            reset_timeout_ms: 5_000,
            menu_timeout_ms: 10_000,
            poll_interval_ms: 250,
            reset_settle_ms: 2_000,
            search_load_ms: 5_000,
            search_results_ms: 5_000,
            menu_settle_ms: 3_000,
            bom_load_ms: 5_000,
            picker_open_ms: 2_000,
            option_settle_ms: 3_000,
            colorway_apply_ms: 5_000,
        }
    }
}

impl TimingConfig {
    pub fn poll(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Shorthand for `Duration::from_millis`
pub fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

fn css(selectors: &[&str]) -> Vec<LocatorStrategy> {
    selectors.iter().map(|s| LocatorStrategy::css(*s)).collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// Sidebar control that resets navigation; optional
    pub reset_navigation: Vec<LocatorStrategy>,
    /// Sidebar control opening the product search; required
    pub find_product: Vec<LocatorStrategy>,
    /// Product-name input, waited for
    pub product_input: Vec<LocatorStrategy>,
    /// Tried once each after `product_input` times out
    pub product_input_fallbacks: Vec<LocatorStrategy>,
    pub search_submit: Vec<LocatorStrategy>,
    /// Key pressed when no submit control matches
    pub submit_key: String,
    pub menu_bar: Vec<LocatorStrategy>,
    pub specifications: Vec<LocatorStrategy>,
    pub bom: Vec<LocatorStrategy>,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            reset_navigation: css(&["#siteNavLink"]),
            find_product: css(&["a[href=\"javascript:findProduct()\"]"]),
            product_input: css(&["input[name=\"LCSPRODUCT_ptc_str_1\"]", "input[id=\"LCSPRODUCT_ptc_str_1\"]"]),
            product_input_fallbacks: css(&[
                "input[type=\"text\"][name*=\"PRODUCT\"]",
                "input[type=\"text\"][id*=\"PRODUCT\"]",
                "input[type=\"text\"][name*=\"ptc_str\"]",
                "input[type=\"text\"]",
            ]),
            search_submit: css(&[
                "a#SearchButton2.button[href=\"javascript:search()\"]",
                "#SearchButton2",
                "a[id=\"SearchButton2\"]",
                "a.button[href=\"javascript:search()\"]",
                "a[href=\"javascript:search()\"]",
            ]),
            submit_key: "Enter".to_string(),
            menu_bar: css(&[".menu-bar"]),
            specifications: {
                let mut strategies = css(&[
                    ".menu-bar a[href*=\"Specifications\"]",
                    ".menu-bar [title=\"Specifications\"]",
                    ".menu-bar *[data-menu=\"Specifications\"]",
                ]);
                strategies.push(LocatorStrategy::text(
                    ".menu-bar a, .menu-bar span, .menu-bar li",
                    TextMatch::Contains("Specifications".to_string()),
                ));
                strategies
            },
            bom: {
                let mut strategies = css(&["a[href*=\"BOM\"]", "[title=\"BOM\"]", "*[data-menu=\"BOM\"]"]);
                strategies.push(LocatorStrategy::text("a, span, li", TextMatch::Contains("BOM".to_string())));
                strategies
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorwayConfig {
    /// Clickable part of the custom picker widget, structural hints first,
    /// then by the variant text it currently displays
    pub widget: Vec<LocatorStrategy>,
    /// Dispatched after clicking the widget
    pub widget_open_events: Vec<DomEvent>,
    /// The (possibly hidden) native selection control
    pub native_select: String,
    /// Dispatched after clicking the native control
    pub native_open_events: Vec<DomEvent>,
    /// Rendered options of the custom widget once opened
    pub option_selector: String,
    /// Dispatched after clicking a rendered option
    pub option_events: Vec<DomEvent>,
    /// Option texts that are never a real variant (substring match)
    pub placeholder_labels: Vec<String>,
    /// Fragments that mark a native option as a real variant
    pub variant_fragments: Vec<String>,
    /// Element showing the widget's current selection
    pub rendered_selector: String,
    /// Presence of any of these means the BOM section rendered
    pub loaded_probe: String,
    /// Value reported for a selection made through the custom widget
    pub widget_value_label: String,
}

impl Default for ColorwayConfig {
    fn default() -> Self {
        let mut widget = css(&[
            ".select2-container[data-select2-id=\"7\"] .select2-selection",
            "span[data-select2-id=\"7\"] .select2-selection",
            ".select2-selection[aria-labelledby=\"select2-contextSKUId-container\"]",
            ".select2-selection:has(#select2-contextSKUId-container)",
        ]);
        widget.push(
            LocatorStrategy::text(
                ".select2-selection__rendered",
                TextMatch::ContainsAny(vec!["GPW LOVE".to_string(), "PC Set".to_string()]),
            )
            .with_closest(".select2-selection"),
        );

        Self {
            widget,
            widget_open_events: vec![DomEvent::Click, DomEvent::MouseDown],
            native_select: "select[name=\"contextSKUId\"], select[id=\"contextSKUId\"]".to_string(),
            native_open_events: vec![DomEvent::Focus, DomEvent::KeyDown("ArrowDown".to_string())],
            option_selector: ".select2-results__option, .select2-dropdown li, .select2-results li, \
                              .select2-results__option--highlighted, .select2-results__option[role=\"option\"]"
                .to_string(),
            option_events: vec![DomEvent::Click, DomEvent::MouseDown, DomEvent::MouseUp, DomEvent::Focus],
            placeholder_labels: vec![
                "-- None Selected --".to_string(),
                "None Selected".to_string(),
                "-- View All --".to_string(),
                "View All".to_string(),
            ],
            variant_fragments: vec!["PC Set".to_string(), "GPW".to_string()],
            rendered_selector: ".select2-selection__rendered".to_string(),
            loaded_probe: "table, .table-wrapper, .f-attribute-group".to_string(),
            widget_value_label: "select2-option".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Group key for rows with an empty body
    pub unknown_body: String,
    pub descriptor_placeholder: String,
    pub placement_placeholder: String,
    pub position_placeholder: String,
    pub material_placeholder: String,
    pub color_placeholder: String,
    /// Material attribute (case-insensitive) whose rows are dropped
    pub excluded_attribute: String,
    pub content_selector: String,
    pub content_keywords: Vec<String>,
    pub attribute_box: String,
    pub attribute_title: String,
    pub attribute_value: String,
    pub no_bom_data: String,
    pub no_component_details: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            unknown_body: "Unknown Body".to_string(),
            descriptor_placeholder: "SC Body Description".to_string(),
            placement_placeholder: "Placement".to_string(),
            position_placeholder: String::new(),
            material_placeholder: "Material".to_string(),
            color_placeholder: "Color".to_string(),
            excluded_attribute: "misc".to_string(),
            content_selector: "table tr, .product-info, .search-result, td, div".to_string(),
            content_keywords: ["Style", "Product", "Description", "Name", "ID", "Number"]
                .iter()
                .map(|k| k.to_string())
                .collect(),
            attribute_box: ".f-attribute-box".to_string(),
            attribute_title: ".input-title".to_string(),
            attribute_value: ".display-only-label".to_string(),
            no_bom_data: "BOM table not found or no data could be extracted".to_string(),
            no_component_details: "No component details available".to_string(),
        }
    }
}

impl EngineConfig {
    /// Parse a (possibly partial) JSON configuration
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| BrowserError::ConfigInvalid(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read a (possibly partial) JSON configuration file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| BrowserError::ConfigInvalid(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }

    /// Reject configurations the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.timing.poll_interval_ms == 0 {
            return Err(BrowserError::ConfigInvalid("timing.poll_interval_ms must be positive".to_string()));
        }
        if self.frames.sidebar.frame_name().is_empty() || self.frames.content.frame_name().is_empty() {
            return Err(BrowserError::ConfigInvalid("frame names must not be empty".to_string()));
        }
        if self.navigation.find_product.is_empty() {
            return Err(BrowserError::ConfigInvalid("navigation.find_product needs at least one strategy".to_string()));
        }
        if self.navigation.product_input.is_empty() && self.navigation.product_input_fallbacks.is_empty() {
            return Err(BrowserError::ConfigInvalid("navigation.product_input needs at least one strategy".to_string()));
        }
        Ok(())
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| BrowserError::ConfigInvalid(e.to_string()))
    }
}
