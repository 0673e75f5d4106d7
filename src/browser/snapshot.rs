use crate::browser::page::{DomEvent, ElementHandle, NativeOption, Page, Scope};
use crate::error::{BrowserError, Result};
use indexmap::IndexMap;
use scraper::{ElementRef, Html, Selector};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::time::Duration;

/// Interaction recorded by a [`SnapshotPage`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageAction {
    Click(ElementHandle),
    Dispatch(ElementHandle, Vec<DomEvent>),
    Fill(ElementHandle, String),
    PressKey(String),
    ChooseOption(ElementHandle, usize),
}

/// [`Page`] implementation over captured HTML.
///
/// The top document and each named frame are fixed markup; interactions are
/// recorded instead of executed, so the documents never change. Used to
/// replay saved pages offline and to exercise the navigation pipeline
/// without a browser.
#[derive(Debug, Default)]
pub struct SnapshotPage {
    top: String,
    frames: IndexMap<String, String>,
    actions: RefCell<Vec<PageAction>>,
    chosen: RefCell<HashMap<(Scope, String), usize>>,
    settled: Cell<Duration>,
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| BrowserError::InvalidSelector {
        selector: selector.to_string(),
        reason: format!("{:?}", e),
    })
}

fn element_text(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn describe(scope: &Scope, index: usize, element: &ElementRef) -> ElementHandle {
    let value = element.value();
    ElementHandle {
        scope: scope.clone(),
        node_ref: format!("n{}", index),
        tag_name: value.name().to_ascii_lowercase(),
        text: element_text(element),
        value: value.attr("value").map(str::to_string),
        title: value.attr("title").map(str::to_string),
    }
}

/// Options of a `<select>` the way the DOM reports them: an option without
/// a value attribute takes its text as value
fn options_of(select: &ElementRef) -> Vec<NativeOption> {
    let Ok(option_selector) = Selector::parse("option") else {
        return Vec::new();
    };

    select
        .select(&option_selector)
        .enumerate()
        .map(|(index, option)| {
            let text = element_text(&option);
            NativeOption {
                index,
                value: option.value().attr("value").map(str::to_string).unwrap_or_else(|| text.clone()),
                title: option.value().attr("title").unwrap_or_default().to_string(),
                text,
            }
        })
        .collect()
}

impl SnapshotPage {
    /// Create a page from the top document's markup
    pub fn new(top_html: impl Into<String>) -> Self {
        Self { top: top_html.into(), ..Default::default() }
    }

    /// Create a page whose top document hosts one iframe per named frame
    pub fn with_frames<N, H>(frames: impl IntoIterator<Item = (N, H)>) -> Self
    where
        N: Into<String>,
        H: Into<String>,
    {
        let mut page = Self::default();
        for (name, html) in frames {
            page = page.with_frame(name, html);
        }
        let hosts: String = page
            .frames
            .keys()
            .map(|name| format!("<iframe name=\"{}\"></iframe>", name))
            .collect();
        page.top = format!("<html><body>{}</body></html>", hosts);
        page
    }

    /// Builder method: add a named frame
    pub fn with_frame(mut self, name: impl Into<String>, html: impl Into<String>) -> Self {
        self.frames.insert(name.into(), html.into());
        self
    }

    /// Every interaction so far, in order
    pub fn actions(&self) -> Vec<PageAction> {
        self.actions.borrow().clone()
    }

    /// Text of every clicked element, in order
    pub fn clicked_texts(&self) -> Vec<String> {
        self.actions
            .borrow()
            .iter()
            .filter_map(|action| match action {
                PageAction::Click(element) => Some(element.text.clone()),
                _ => None,
            })
            .collect()
    }

    /// Keys pressed on the focused element, in order
    pub fn pressed_keys(&self) -> Vec<String> {
        self.actions
            .borrow()
            .iter()
            .filter_map(|action| match action {
                PageAction::PressKey(key) => Some(key.clone()),
                _ => None,
            })
            .collect()
    }

    /// Text typed into inputs, in order
    pub fn typed_texts(&self) -> Vec<String> {
        self.actions
            .borrow()
            .iter()
            .filter_map(|action| match action {
                PageAction::Fill(_, text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// Sum of all settle delays requested
    pub fn total_settle(&self) -> Duration {
        self.settled.get()
    }

    fn source(&self, scope: &Scope) -> Result<&str> {
        match scope {
            Scope::Document => Ok(&self.top),
            Scope::Frame(frame) => self
                .frames
                .get(&frame.name)
                .map(String::as_str)
                .ok_or_else(|| BrowserError::FrameNotFound(frame.name.clone())),
        }
    }

    fn parse(&self, scope: &Scope) -> Result<Html> {
        Ok(Html::parse_document(self.source(scope)?))
    }

    fn record(&self, action: PageAction) {
        self.actions.borrow_mut().push(action);
    }

    /// Run `f` against the element a handle refers to
    fn with_element<T>(&self, element: &ElementHandle, f: impl FnOnce(&ElementRef) -> T) -> Result<T> {
        let html = self.parse(&element.scope)?;
        let index: usize = element
            .node_ref
            .trim_start_matches('n')
            .parse()
            .map_err(|_| BrowserError::ElementNotFound(format!("bad reference {}", element.node_ref)))?;
        let all = parse_selector("*")?;
        let found = html
            .select(&all)
            .nth(index)
            .ok_or_else(|| BrowserError::ElementNotFound(format!("stale element reference {}", element.node_ref)))?;
        Ok(f(&found))
    }

    fn indexed_matches(&self, scope: &Scope, selector: &str) -> Result<Vec<ElementHandle>> {
        let wanted = parse_selector(selector)?;
        let all = parse_selector("*")?;
        let html = self.parse(scope)?;
        Ok(html
            .select(&all)
            .enumerate()
            .filter(|(_, element)| wanted.matches(element))
            .map(|(index, element)| describe(scope, index, &element))
            .collect())
    }
}

impl Page for SnapshotPage {
    fn query(&self, scope: &Scope, selector: &str) -> Result<Option<ElementHandle>> {
        Ok(self.indexed_matches(scope, selector)?.into_iter().next())
    }

    fn query_all(&self, scope: &Scope, selector: &str) -> Result<Vec<ElementHandle>> {
        self.indexed_matches(scope, selector)
    }

    fn closest(&self, element: &ElementHandle, selector: &str) -> Result<Option<ElementHandle>> {
        let wanted = parse_selector(selector)?;
        let target = self.with_element(element, |found| {
            std::iter::once(*found)
                .chain(found.ancestors().filter_map(ElementRef::wrap))
                .find(|candidate| wanted.matches(candidate))
                .map(|candidate| candidate.id())
        })?;

        let Some(target) = target else {
            return Ok(None);
        };

        let all = parse_selector("*")?;
        let html = self.parse(&element.scope)?;
        Ok(html
            .select(&all)
            .enumerate()
            .find(|(_, candidate)| candidate.id() == target)
            .map(|(index, candidate)| describe(&element.scope, index, &candidate)))
    }

    fn frame_names(&self) -> Result<Vec<String>> {
        Ok(self.frames.keys().cloned().collect())
    }

    fn click(&self, element: &ElementHandle) -> Result<()> {
        self.with_element(element, |_| ())?;
        self.record(PageAction::Click(element.clone()));
        Ok(())
    }

    fn dispatch(&self, element: &ElementHandle, events: &[DomEvent]) -> Result<()> {
        self.with_element(element, |_| ())?;
        self.record(PageAction::Dispatch(element.clone(), events.to_vec()));
        Ok(())
    }

    fn fill(&self, element: &ElementHandle, text: &str) -> Result<()> {
        self.with_element(element, |_| ())?;
        self.record(PageAction::Fill(element.clone(), text.to_string()));
        Ok(())
    }

    fn press_key(&self, key: &str) -> Result<()> {
        self.record(PageAction::PressKey(key.to_string()));
        Ok(())
    }

    fn native_options(&self, select: &ElementHandle) -> Result<Vec<NativeOption>> {
        self.with_element(select, options_of)
    }

    fn choose_native_option(&self, select: &ElementHandle, index: usize) -> Result<()> {
        let count = self.with_element(select, |found| options_of(found).len())?;
        if index >= count {
            return Err(BrowserError::ElementNotFound(format!("no option at index {}", index)));
        }
        self.chosen
            .borrow_mut()
            .insert((select.scope.clone(), select.node_ref.clone()), index);
        self.record(PageAction::ChooseOption(select.clone(), index));
        Ok(())
    }

    fn selected_native_option(&self, select: &ElementHandle) -> Result<Option<NativeOption>> {
        let chosen = self
            .chosen
            .borrow()
            .get(&(select.scope.clone(), select.node_ref.clone()))
            .copied();

        self.with_element(select, |found| {
            let selected_attr = Selector::parse("option[selected]")
                .ok()
                .and_then(|selector| found.select(&selector).next().map(|option| option.id()));
            let options = options_of(found);
            let default_index = selected_attr
                .and_then(|id| {
                    Selector::parse("option")
                        .ok()
                        .and_then(|selector| found.select(&selector).position(|option| option.id() == id))
                })
                .unwrap_or(0);
            options.into_iter().nth(chosen.unwrap_or(default_index))
        })
    }

    fn html(&self, scope: &Scope) -> Result<String> {
        Ok(self.source(scope)?.to_string())
    }

    fn settle(&self, delay: Duration) {
        self.settled.set(self.settled.get() + delay);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> SnapshotPage {
        SnapshotPage::with_frames([
            ("sidebarframe", "<html><body><a id=\"siteNavLink\">Site</a><a href=\"javascript:findProduct()\">Product</a></body></html>"),
            (
                "contentframe",
                "<html><body><div class=\"menu-bar\"><ul><li><span>Specifications</span></li></ul></div>\
                 <select id=\"contextSKUId\"><option value=\"\" title=\"-- None Selected --\">-- None Selected --</option>\
                 <option value=\"42\">2 PC Set 01</option></select></body></html>",
            ),
        ])
    }

    #[test]
    fn test_with_frames_builds_hosts() {
        let page = page();
        let host = page.query(&Scope::Document, "iframe[name=\"contentframe\"]").unwrap();
        assert!(host.is_some());
        assert_eq!(page.frame_names().unwrap(), vec!["sidebarframe", "contentframe"]);
    }

    #[test]
    fn test_query_in_frame() {
        let page = page();
        let link = page
            .query(&Scope::frame("sidebarframe"), "a[href=\"javascript:findProduct()\"]")
            .unwrap()
            .unwrap();
        assert_eq!(link.text, "Product");
        assert_eq!(link.tag_name, "a");

        let missing = page.query(&Scope::frame("sidebarframe"), "#nothing").unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn test_unknown_frame_is_an_error() {
        let page = page();
        let result = page.query(&Scope::frame("searchframe"), "input");
        assert!(matches!(result, Err(BrowserError::FrameNotFound(_))));
    }

    #[test]
    fn test_invalid_selector_is_an_error() {
        let page = page();
        let result = page.query(&Scope::frame("contentframe"), ".menu-bar a:contains(\"BOM\")");
        assert!(matches!(result, Err(BrowserError::InvalidSelector { .. })));
    }

    #[test]
    fn test_closest() {
        let page = page();
        let span = page.query(&Scope::frame("contentframe"), ".menu-bar span").unwrap().unwrap();
        let li = page.closest(&span, "li").unwrap().unwrap();
        assert_eq!(li.tag_name, "li");
        assert_eq!(li.text, "Specifications");

        let itself = page.closest(&span, "span").unwrap().unwrap();
        assert_eq!(itself.node_ref, span.node_ref);

        assert!(page.closest(&span, "table").unwrap().is_none());
    }

    #[test]
    fn test_native_options_and_selection() {
        let page = page();
        let select = page.query(&Scope::frame("contentframe"), "#contextSKUId").unwrap().unwrap();

        let options = page.native_options(&select).unwrap();
        assert_eq!(options.len(), 2);
        assert_eq!(options[0].title, "-- None Selected --");
        assert_eq!(options[1].value, "42");

        assert_eq!(page.selected_native_option(&select).unwrap().unwrap().index, 0);

        page.choose_native_option(&select, 1).unwrap();
        let selected = page.selected_native_option(&select).unwrap().unwrap();
        assert_eq!(selected.text, "2 PC Set 01");

        assert!(page.choose_native_option(&select, 5).is_err());
    }

    #[test]
    fn test_records_interactions() {
        let page = page();
        let link = page.query(&Scope::frame("sidebarframe"), "#siteNavLink").unwrap().unwrap();
        page.click(&link).unwrap();
        page.press_key("Enter").unwrap();
        page.settle(Duration::from_millis(1500));
        page.settle(Duration::from_millis(500));

        assert_eq!(page.clicked_texts(), vec!["Site"]);
        assert_eq!(page.pressed_keys(), vec!["Enter"]);
        assert_eq!(page.total_settle(), Duration::from_secs(2));
    }

    #[test]
    fn test_html_returns_frame_source() {
        let page = page();
        let html = page.html(&Scope::frame("contentframe")).unwrap();
        assert!(html.contains("menu-bar"));
    }
}
