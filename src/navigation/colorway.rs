//! Colorway Selector.
//!
//! The variant picker renders either as a native `<select>` or as a custom
//! popup widget layered over a hidden one. The selector opens whichever is
//! present, picks the first real variant and reports what it chose. Nothing
//! here is fatal: a failed selection leaves the page showing whatever
//! variant it already had.

use crate::browser::page::{DomEvent, ElementHandle, NativeOption, Page, Scope};
use crate::config::{ColorwayConfig, EngineConfig, TimingConfig, ms};
use crate::dom::resolver::resolve;
use serde::Serialize;

/// Which kind of picker was opened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PickerKind {
    Widget,
    Native,
}

/// How the colorway was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMethod {
    /// Clicked a rendered widget option
    WidgetOption,
    /// Native option that looks like a real variant
    NativeOption,
    /// First non-empty native option, heuristics ignored
    NativeFallback,
}

/// A chosen colorway
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorwayChoice {
    pub method: SelectionMethod,
    pub text: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorwayOutcome {
    pub opened: Option<PickerKind>,
    pub choice: Option<ColorwayChoice>,
    /// Text the widget displayed after the choice
    pub displayed: Option<String>,
    /// Whether BOM content was present once the choice applied
    pub content_loaded: bool,
}

impl ColorwayOutcome {
    pub fn is_selected(&self) -> bool {
        self.choice.is_some()
    }
}

pub struct ColorwaySelector<'a, P: Page> {
    page: &'a P,
    scope: &'a Scope,
    config: &'a ColorwayConfig,
    timing: &'a TimingConfig,
}

impl<'a, P: Page> ColorwaySelector<'a, P> {
    pub fn new(page: &'a P, scope: &'a Scope, config: &'a EngineConfig) -> Self {
        Self { page, scope, config: &config.colorway, timing: &config.timing }
    }

    /// Open the picker, choose a colorway and wait for it to apply
    pub fn select(&self) -> ColorwayOutcome {
        let mut outcome = ColorwayOutcome { opened: self.open(), ..Default::default() };
        if outcome.opened.is_none() {
            log::warn!("No colorway picker could be opened, continuing with current data");
            return outcome;
        }
        self.page.settle(ms(self.timing.picker_open_ms));

        let native = self.native_select();
        let choice = self.choose(native.as_ref()).or_else(|| {
            log::info!("No valid colorway option, trying any non-empty native option");
            native.as_ref().and_then(|select| self.choose_any_native(select))
        });

        let Some(choice) = choice else {
            log::warn!("Colorway selection not found, continuing with current data");
            return outcome;
        };
        log::info!("Selected colorway via {:?}: {} ({})", choice.method, choice.text, choice.value);
        outcome.choice = Some(choice);

        self.page.settle(ms(self.timing.option_settle_ms));
        outcome.displayed = self.displayed_text();
        match &outcome.displayed {
            Some(text) => log::info!("Selection verified, widget shows: {}", text),
            None => log::warn!("Selection verification failed"),
        }

        self.page.settle(ms(self.timing.colorway_apply_ms));
        outcome.content_loaded = self.content_loaded();
        if outcome.content_loaded {
            log::info!("BOM data appears to be loaded after colorway selection");
        } else {
            log::warn!("BOM data may not have loaded yet, continuing anyway");
        }

        outcome
    }

    /// Colorway description for the extraction result
    pub fn describe(&self, outcome: &ColorwayOutcome) -> String {
        let selected = self.native_select().and_then(|select| match self.page.selected_native_option(&select) {
            Ok(option) => option,
            Err(e) => {
                log::debug!("Could not read selected colorway: {}", e);
                None
            }
        });

        match (selected, &outcome.choice) {
            (Some(option), _) => format!("Selected Colorway: {} (Value: {})", option.text, option.value),
            (None, Some(choice)) if choice.method == SelectionMethod::WidgetOption => {
                format!("Selected Colorway: {} (Value: {})", choice.text, self.config.widget_value_label)
            }
            _ => String::new(),
        }
    }

    fn open(&self) -> Option<PickerKind> {
        if let Some(found) = resolve(self.page, self.scope, &self.config.widget) {
            if self.activate(&found.element, &self.config.widget_open_events) {
                log::info!("Opened colorway widget via {}", found.strategy.describe());
                return Some(PickerKind::Widget);
            }
        }

        if let Some(select) = self.native_select() {
            if self.activate(&select, &self.config.native_open_events) {
                log::info!("Opened native colorway select");
                return Some(PickerKind::Native);
            }
        }

        None
    }

    fn activate(&self, element: &ElementHandle, events: &[DomEvent]) -> bool {
        let result = self.page.click(element).and_then(|_| self.page.dispatch(element, events));
        if let Err(e) = &result {
            log::debug!("Failed to activate <{}>: {}", element.tag_name, e);
        }
        result.is_ok()
    }

    fn native_select(&self) -> Option<ElementHandle> {
        self.page.query(self.scope, &self.config.native_select).ok().flatten()
    }

    fn is_placeholder(&self, text: &str) -> bool {
        self.config.placeholder_labels.iter().any(|label| text.contains(label.as_str()))
    }

    fn looks_like_variant(&self, text: &str) -> bool {
        self.config.variant_fragments.iter().any(|fragment| text.contains(fragment.as_str()))
            || text.chars().last().is_some_and(|c| c.is_ascii_digit())
    }

    /// Rendered widget options first; native options only when none rendered
    fn choose(&self, native: Option<&ElementHandle>) -> Option<ColorwayChoice> {
        let rendered = self.page.query_all(self.scope, &self.config.option_selector).unwrap_or_default();
        log::debug!("Found {} rendered colorway options", rendered.len());

        if rendered.is_empty() {
            return native.and_then(|select| self.choose_native(select));
        }

        let option = rendered.iter().find(|option| !option.text.is_empty() && !self.is_placeholder(&option.text))?;
        log::info!("Clicking first valid colorway option: {}", option.text);
        if !self.activate(option, &self.config.option_events) {
            return None;
        }
        if let Some(select) = native {
            self.notify(select);
        }

        Some(ColorwayChoice {
            method: SelectionMethod::WidgetOption,
            text: option.text.clone(),
            value: self.config.widget_value_label.clone(),
        })
    }

    fn notify(&self, select: &ElementHandle) {
        if let Err(e) = self.page.dispatch(select, &[DomEvent::Change, DomEvent::Input]) {
            log::debug!("Failed to notify native select: {}", e);
        }
    }

    fn options_of(&self, select: &ElementHandle) -> Vec<NativeOption> {
        match self.page.native_options(select) {
            Ok(options) if options.len() > 1 => options,
            Ok(_) => Vec::new(),
            Err(e) => {
                log::debug!("Failed to read native colorway options: {}", e);
                Vec::new()
            }
        }
    }

    fn choose_native(&self, select: &ElementHandle) -> Option<ColorwayChoice> {
        let option = self.options_of(select).into_iter().find(|option| {
            let text = option.text.trim();
            !option.value.is_empty()
                && !self.is_placeholder(&option.title)
                && !text.is_empty()
                && !self.is_placeholder(text)
                && self.looks_like_variant(text)
        })?;

        self.apply_native(select, option, SelectionMethod::NativeOption)
    }

    fn choose_any_native(&self, select: &ElementHandle) -> Option<ColorwayChoice> {
        let option = self
            .options_of(select)
            .into_iter()
            .skip(1)
            .find(|option| !option.value.trim().is_empty())?;

        self.apply_native(select, option, SelectionMethod::NativeFallback)
    }

    fn apply_native(&self, select: &ElementHandle, option: NativeOption, method: SelectionMethod) -> Option<ColorwayChoice> {
        match self.page.choose_native_option(select, option.index) {
            Ok(()) => Some(ColorwayChoice { method, text: option.text.trim().to_string(), value: option.value }),
            Err(e) => {
                log::warn!("Failed to choose colorway option {}: {}", option.index, e);
                None
            }
        }
    }

    fn displayed_text(&self) -> Option<String> {
        self.page
            .query(self.scope, &self.config.rendered_selector)
            .ok()
            .flatten()
            .map(|element| element.text)
    }

    fn content_loaded(&self) -> bool {
        self.page
            .query(self.scope, &self.config.loaded_probe)
            .map(|found| found.is_some())
            .unwrap_or(false)
    }
}
