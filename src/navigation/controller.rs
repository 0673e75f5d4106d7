use crate::browser::page::{ElementHandle, Page, Scope};
use crate::config::{EngineConfig, ms};
use crate::dom::frame::{FrameMatcher, locate_frame};
use crate::dom::locator::LocatorStrategy;
use crate::dom::resolver::{require, resolve, resolve_within};
use crate::error::{BrowserError, Result};
use crate::extract::{BomExtractor, ExtractionResult};
use crate::navigation::colorway::{ColorwayOutcome, ColorwaySelector};
use crate::navigation::state::{NavigationState, NavigationTrace, Stage};
use serde::Serialize;
use std::time::Duration;

/// Everything one style's pipeline produced
#[derive(Debug, Clone, Serialize)]
pub struct StyleRun {
    pub trace: NavigationTrace,
    pub colorway: ColorwayOutcome,
    pub extraction: ExtractionResult,
}

/// Drives the sidebar, search, menu and colorway steps for one style at a
/// time, then extracts the BOM from the content frame.
///
/// Only the sidebar frame, the find-product control, the content frame and
/// the product-name input are required. Every other step logs its miss and
/// the pipeline carries on to extraction.
pub struct NavigationController<'a, P: Page> {
    page: &'a P,
    config: &'a EngineConfig,
}

impl<'a, P: Page> NavigationController<'a, P> {
    pub fn new(page: &'a P, config: &'a EngineConfig) -> Self {
        Self { page, config }
    }

    /// Search for `search_key` and extract whatever BOM the page ends up
    /// showing
    pub fn run(&self, search_key: &str) -> Result<StyleRun> {
        let mut trace = NavigationTrace::new();
        let timing = &self.config.timing;

        log::info!("Step 1: Locating sidebar frame");
        let sidebar = required(&mut trace, Stage::SidebarFrame, self.frame(&self.config.frames.sidebar))?;
        trace.advance(NavigationState::SidebarReady);

        log::info!("Step 2: Resetting navigation");
        let reset = resolve_within(
            self.page,
            &sidebar,
            &self.config.navigation.reset_navigation,
            ms(timing.reset_timeout_ms),
            timing.poll(),
        );
        match reset.map(|found| self.page.click(&found.element)) {
            Some(Ok(())) => self.page.settle(ms(timing.reset_settle_ms)),
            Some(Err(e)) => {
                log::warn!("Failed to click reset navigation: {}", e);
                trace.skip(Stage::ResetNavigation);
            }
            None => trace.skip(Stage::ResetNavigation),
        }

        log::info!("Step 3: Opening product search");
        let find_product = self.wait_for(&sidebar, &self.config.navigation.find_product, "find product control");
        let clicked = find_product.and_then(|element| self.page.click(&element));
        required(&mut trace, Stage::FindProduct, clicked)?;
        self.page.settle(ms(timing.search_load_ms));
        trace.advance(NavigationState::ProductSearchOpened);

        log::info!("Step 4: Locating content frame");
        let content = required(&mut trace, Stage::ContentFrame, self.frame(&self.config.frames.content))?;

        log::info!("Step 5: Searching for {}", search_key);
        let input = self.product_input(&content);
        let typed = input.and_then(|element| self.page.fill(&element, search_key));
        required(&mut trace, Stage::ProductInput, typed)?;

        if self.submit_search(&content) {
            trace.advance(NavigationState::SearchSubmitted);
        } else {
            trace.skip(Stage::SearchSubmit);
        }
        self.page.settle(ms(timing.search_results_ms));

        log::info!("Step 6: Navigating to the BOM section");
        self.navigate_menus(&content, &mut trace);

        log::info!("Step 7: Selecting colorway");
        let selector = ColorwaySelector::new(self.page, &content, self.config);
        let colorway = selector.select();
        if colorway.is_selected() {
            trace.advance(NavigationState::ColorwaySelected);
        } else {
            trace.skip(Stage::Colorway);
        }

        log::info!("Step 8: Extracting BOM data");
        let colorway_info = selector.describe(&colorway);
        let extracted = BomExtractor::new(&self.config.extraction).extract_page(self.page, &content, colorway_info);
        let extraction = required(&mut trace, Stage::Extraction, extracted)?;
        trace.advance(NavigationState::Extracted);

        Ok(StyleRun { trace, colorway, extraction })
    }

    fn frame(&self, matcher: &FrameMatcher) -> Result<Scope> {
        let timing = &self.config.timing;
        locate_frame(self.page, matcher, ms(timing.frame_timeout_ms), timing.poll()).map(Scope::from)
    }

    fn wait_for(&self, scope: &Scope, strategies: &[LocatorStrategy], target: &str) -> Result<ElementHandle> {
        let timing = &self.config.timing;
        resolve_within(self.page, scope, strategies, ms(timing.element_timeout_ms), timing.poll())
            .map(|found| found.element)
            .ok_or_else(|| BrowserError::SelectorsExhausted { target: target.to_string() })
    }

    /// Wait for the primary input strategies, then try each fallback once
    fn product_input(&self, content: &Scope) -> Result<ElementHandle> {
        let navigation = &self.config.navigation;
        match self.wait_for(content, &navigation.product_input, "product name input") {
            Ok(element) => Ok(element),
            Err(_) => {
                log::info!("Product name input not found, trying alternative selectors");
                require(self.page, content, &navigation.product_input_fallbacks, "product name input")
                    .map(|found| found.element)
            }
        }
    }

    /// Click the search control, or press the submit key when none matches
    fn submit_search(&self, content: &Scope) -> bool {
        let navigation = &self.config.navigation;

        if let Some(found) = resolve(self.page, content, &navigation.search_submit) {
            match self.page.click(&found.element) {
                Ok(()) => {
                    log::info!("Clicked search button via {}", found.strategy.describe());
                    return true;
                }
                Err(e) => log::warn!("Failed to click search button: {}", e),
            }
        }

        log::info!("Search button not found, pressing {}", navigation.submit_key);
        match self.page.press_key(&navigation.submit_key) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Failed to submit search: {}", e);
                false
            }
        }
    }

    fn navigate_menus(&self, content: &Scope, trace: &mut NavigationTrace) {
        let navigation = &self.config.navigation;
        let timing = &self.config.timing;

        if resolve_within(self.page, content, &navigation.menu_bar, ms(timing.menu_timeout_ms), timing.poll()).is_none() {
            log::warn!("Menu bar not found, continuing with current page");
            trace.skip(Stage::MenuBar);
        }

        if self.click_entry(content, &navigation.specifications, Stage::Specifications) {
            self.page.settle(ms(timing.menu_settle_ms));
            trace.advance(NavigationState::MenuNavigated);
        } else {
            trace.skip(Stage::Specifications);
        }

        if self.click_entry(content, &navigation.bom, Stage::Bom) {
            self.page.settle(ms(timing.bom_load_ms));
            trace.advance(NavigationState::BomSectionOpened);
        } else {
            trace.skip(Stage::Bom);
        }
    }

    fn click_entry(&self, scope: &Scope, strategies: &[LocatorStrategy], stage: Stage) -> bool {
        let Some(found) = resolve(self.page, scope, strategies) else {
            log::warn!("{} not found", stage);
            return false;
        };

        match self.page.click(&found.element) {
            Ok(()) => {
                log::info!("Clicked {} via {}", stage, found.strategy.describe());
                true
            }
            Err(e) => {
                log::warn!("Failed to click {}: {}", stage, e);
                false
            }
        }
    }
}

/// Turn the failure of a required step into an identifier-level error
fn required<T>(trace: &mut NavigationTrace, stage: Stage, result: Result<T>) -> Result<T> {
    result.map_err(|e| {
        trace.fail(stage);
        BrowserError::RequiredStepFailed { stage: stage.to_string(), reason: e.to_string() }
    })
}

/// Sum of the fixed settle delays a fully successful run spends
pub fn settle_budget(config: &EngineConfig) -> Duration {
    let timing = &config.timing;
    ms(timing.reset_settle_ms
        + timing.search_load_ms
        + timing.search_results_ms
        + timing.menu_settle_ms
        + timing.bom_load_ms
        + timing.picker_open_ms
        + timing.option_settle_ms
        + timing.colorway_apply_ms)
}
