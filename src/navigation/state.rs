use serde::{Deserialize, Serialize};
use std::fmt;

/// A single step of the per-style pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    SidebarFrame,
    ResetNavigation,
    FindProduct,
    ContentFrame,
    ProductInput,
    SearchSubmit,
    MenuBar,
    Specifications,
    Bom,
    Colorway,
    Extraction,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::SidebarFrame => "sidebar frame",
            Stage::ResetNavigation => "reset navigation",
            Stage::FindProduct => "find product",
            Stage::ContentFrame => "content frame",
            Stage::ProductInput => "product input",
            Stage::SearchSubmit => "search submit",
            Stage::MenuBar => "menu bar",
            Stage::Specifications => "specifications menu",
            Stage::Bom => "BOM menu",
            Stage::Colorway => "colorway selection",
            Stage::Extraction => "extraction",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How far one style's pipeline got
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationState {
    Initial,
    SidebarReady,
    ProductSearchOpened,
    SearchSubmitted,
    MenuNavigated,
    BomSectionOpened,
    ColorwaySelected,
    Extracted,
    Failed(Stage),
}

impl NavigationState {
    /// Position in the forward order; `Failed` has none
    fn rank(&self) -> Option<u8> {
        match self {
            NavigationState::Initial => Some(0),
            NavigationState::SidebarReady => Some(1),
            NavigationState::ProductSearchOpened => Some(2),
            NavigationState::SearchSubmitted => Some(3),
            NavigationState::MenuNavigated => Some(4),
            NavigationState::BomSectionOpened => Some(5),
            NavigationState::ColorwaySelected => Some(6),
            NavigationState::Extracted => Some(7),
            NavigationState::Failed(_) => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, NavigationState::Failed(_))
    }
}

/// Record of one style's walk through the pipeline.
///
/// The state only ever moves forward. Best-effort steps that missed are
/// listed in `skipped`; they never move the state back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationTrace {
    state: NavigationState,
    skipped: Vec<Stage>,
}

impl Default for NavigationTrace {
    fn default() -> Self {
        Self::new()
    }
}

impl NavigationTrace {
    pub fn new() -> Self {
        Self { state: NavigationState::Initial, skipped: Vec::new() }
    }

    pub fn state(&self) -> NavigationState {
        self.state
    }

    pub fn skipped(&self) -> &[Stage] {
        &self.skipped
    }

    /// Move to `next` if it lies ahead of the current state. Returns whether
    /// the state changed.
    pub fn advance(&mut self, next: NavigationState) -> bool {
        match (self.state.rank(), next.rank()) {
            (Some(current), Some(target)) if target > current => {
                log::debug!("Navigation state {:?} -> {:?}", self.state, next);
                self.state = next;
                true
            }
            _ => false,
        }
    }

    /// Note a best-effort step that did not succeed
    pub fn skip(&mut self, stage: Stage) {
        log::info!("Skipped {}", stage);
        self.skipped.push(stage);
    }

    /// Terminal failure of a required step
    pub fn fail(&mut self, stage: Stage) {
        log::warn!("Required step failed: {}", stage);
        self.state = NavigationState::Failed(stage);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advances_forward_only() {
        let mut trace = NavigationTrace::new();
        assert!(trace.advance(NavigationState::SidebarReady));
        assert!(trace.advance(NavigationState::SearchSubmitted));
        assert!(!trace.advance(NavigationState::ProductSearchOpened));
        assert!(!trace.advance(NavigationState::SearchSubmitted));
        assert_eq!(trace.state(), NavigationState::SearchSubmitted);
    }

    #[test]
    fn test_skips_do_not_regress() {
        let mut trace = NavigationTrace::new();
        trace.advance(NavigationState::SearchSubmitted);
        trace.skip(Stage::MenuBar);
        trace.skip(Stage::Specifications);
        assert_eq!(trace.state(), NavigationState::SearchSubmitted);
        assert_eq!(trace.skipped(), &[Stage::MenuBar, Stage::Specifications]);

        assert!(trace.advance(NavigationState::Extracted));
    }

    #[test]
    fn test_failed_is_terminal() {
        let mut trace = NavigationTrace::new();
        trace.advance(NavigationState::SidebarReady);
        trace.fail(Stage::ContentFrame);
        assert!(trace.state().is_failed());
        assert!(!trace.advance(NavigationState::Extracted));
        assert_eq!(trace.state(), NavigationState::Failed(Stage::ContentFrame));
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(Stage::ProductInput.to_string(), "product input");
        assert_eq!(Stage::Bom.to_string(), "BOM menu");
    }
}
