use crate::browser::page::{DomEvent, ElementHandle, NativeOption, Page, Scope};
use crate::error::{BrowserError, Result};
use headless_chrome::Tab;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;

/// Helpers injected ahead of every call; they locate frames by name, mark
/// elements with a reference attribute and run the requested operation
const PAGE_JS: &str = include_str!("page.js");

/// [`Page`] implementation over a headless_chrome tab.
///
/// Sub-documents are reached from the top document by walking
/// `window.frames`, so every frame the engine touches must be same-origin
/// with the entry page.
pub struct ChromePage {
    tab: Arc<Tab>,
}

/// Shape returned by every injected call
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    ok: Value,
    #[serde(default)]
    error: Option<String>,
}

/// Element description produced by `describe()` in page.js
#[derive(Debug, Deserialize)]
struct RawElement {
    node_ref: String,
    tag_name: String,
    #[serde(default)]
    text: String,
    #[serde(default)]
    value: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

impl RawElement {
    fn into_handle(self, scope: &Scope) -> ElementHandle {
        ElementHandle {
            scope: scope.clone(),
            node_ref: self.node_ref,
            tag_name: self.tag_name,
            text: self.text,
            value: self.value,
            title: self.title,
        }
    }
}

fn frame_arg(scope: &Scope) -> Value {
    match scope {
        Scope::Document => Value::Null,
        Scope::Frame(frame) => Value::String(frame.name.clone()),
    }
}

/// Wrap an operation call so that thrown exceptions come back as data
fn build_script(op: &str, args: &[Value]) -> String {
    let args = args.iter().map(Value::to_string).collect::<Vec<_>>().join(", ");
    format!(
        "(function() {{\n{}\ntry {{\n  return JSON.stringify({{ ok: plm.{}({}) }});\n}} catch (e) {{\n  return JSON.stringify({{ error: String(e && e.message ? e.message : e) }});\n}}\n}})()",
        PAGE_JS, op, args
    )
}

impl ChromePage {
    pub fn new(tab: Arc<Tab>) -> Self {
        Self { tab }
    }

    /// Get the underlying tab
    pub fn tab(&self) -> &Arc<Tab> {
        &self.tab
    }

    fn call(&self, op: &str, args: &[Value]) -> Result<Value> {
        let script = build_script(op, args);

        let result = self
            .tab
            .evaluate(&script, false)
            .map_err(|e| BrowserError::EvaluationFailed(format!("{}: {}", op, e)))?;

        let raw = result
            .value
            .ok_or_else(|| BrowserError::EvaluationFailed(format!("{}: no value returned", op)))?;

        // The script returns a JSON string, decode it a second time
        let json_str: String = serde_json::from_value(raw)
            .map_err(|e| BrowserError::EvaluationFailed(format!("{}: expected JSON string: {}", op, e)))?;

        let envelope: Envelope = serde_json::from_str(&json_str)
            .map_err(|e| BrowserError::DomParseFailed(format!("{}: {}", op, e)))?;

        match envelope.error {
            Some(error) => Err(BrowserError::EvaluationFailed(format!("{}: {}", op, error))),
            None => Ok(envelope.ok),
        }
    }

    fn call_as<T: DeserializeOwned>(&self, op: &str, args: &[Value]) -> Result<T> {
        let value = self.call(op, args)?;
        serde_json::from_value(value).map_err(|e| BrowserError::DomParseFailed(format!("{}: {}", op, e)))
    }

    fn element_args(element: &ElementHandle) -> [Value; 2] {
        [frame_arg(&element.scope), Value::String(element.node_ref.clone())]
    }
}

impl Page for ChromePage {
    fn query(&self, scope: &Scope, selector: &str) -> Result<Option<ElementHandle>> {
        let raw: Option<RawElement> = self.call_as("query", &[frame_arg(scope), json!(selector)])?;
        Ok(raw.map(|r| r.into_handle(scope)))
    }

    fn query_all(&self, scope: &Scope, selector: &str) -> Result<Vec<ElementHandle>> {
        let raw: Vec<RawElement> = self.call_as("queryAll", &[frame_arg(scope), json!(selector)])?;
        Ok(raw.into_iter().map(|r| r.into_handle(scope)).collect())
    }

    fn closest(&self, element: &ElementHandle, selector: &str) -> Result<Option<ElementHandle>> {
        let [frame, node_ref] = Self::element_args(element);
        let raw: Option<RawElement> = self.call_as("closest", &[frame, node_ref, json!(selector)])?;
        Ok(raw.map(|r| r.into_handle(&element.scope)))
    }

    fn frame_names(&self) -> Result<Vec<String>> {
        self.call_as("frameNames", &[])
    }

    fn click(&self, element: &ElementHandle) -> Result<()> {
        self.call("click", &Self::element_args(element))?;
        Ok(())
    }

    fn dispatch(&self, element: &ElementHandle, events: &[DomEvent]) -> Result<()> {
        let [frame, node_ref] = Self::element_args(element);
        let events = serde_json::to_value(events)
            .map_err(|e| BrowserError::EvaluationFailed(format!("dispatch: {}", e)))?;
        self.call("dispatch", &[frame, node_ref, events])?;
        Ok(())
    }

    fn fill(&self, element: &ElementHandle, text: &str) -> Result<()> {
        self.call("focusAndSelect", &Self::element_args(element))?;

        // Real key events reach the focused element even inside a sub-document
        self.tab
            .type_str(text)
            .map_err(|e| BrowserError::TabOperationFailed(format!("Failed to type into element: {}", e)))?;

        Ok(())
    }

    fn press_key(&self, key: &str) -> Result<()> {
        self.tab
            .press_key(key)
            .map_err(|e| BrowserError::TabOperationFailed(format!("Failed to press {}: {}", key, e)))?;
        Ok(())
    }

    fn native_options(&self, select: &ElementHandle) -> Result<Vec<NativeOption>> {
        self.call_as("nativeOptions", &Self::element_args(select))
    }

    fn choose_native_option(&self, select: &ElementHandle, index: usize) -> Result<()> {
        let [frame, node_ref] = Self::element_args(select);
        self.call("chooseNativeOption", &[frame, node_ref, json!(index)])?;
        Ok(())
    }

    fn selected_native_option(&self, select: &ElementHandle) -> Result<Option<NativeOption>> {
        self.call_as("selectedNativeOption", &Self::element_args(select))
    }

    fn html(&self, scope: &Scope) -> Result<String> {
        self.call_as("html", &[frame_arg(scope)])
    }

    fn settle(&self, delay: Duration) {
        std::thread::sleep(delay);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_script_embeds_arguments() {
        let script = build_script("query", &[Value::Null, json!("a[href=\"javascript:search()\"]")]);

        assert!(script.contains("const plm"));
        assert!(script.contains("plm.query(null, \"a[href=\\\"javascript:search()\\\"]\")"));
        assert!(script.trim_end().ends_with("})()"));
    }

    #[test]
    fn test_frame_arg() {
        assert_eq!(frame_arg(&Scope::Document), Value::Null);
        assert_eq!(frame_arg(&Scope::frame("contentframe")), json!("contentframe"));
    }

    #[test]
    fn test_envelope_error() {
        let envelope: Envelope = serde_json::from_str(r#"{"error": "frame not found: contentframe"}"#).unwrap();
        assert_eq!(envelope.error.as_deref(), Some("frame not found: contentframe"));
        assert!(envelope.ok.is_null());
    }

    #[test]
    fn test_raw_element_into_handle() {
        let raw: RawElement = serde_json::from_value(json!({
            "node_ref": "r4",
            "tag_name": "input",
            "text": "",
            "value": "ABC1",
            "title": null
        }))
        .unwrap();

        let handle = raw.into_handle(&Scope::frame("contentframe"));
        assert_eq!(handle.node_ref, "r4");
        assert_eq!(handle.value.as_deref(), Some("ABC1"));
        assert_eq!(handle.scope, Scope::frame("contentframe"));
    }

    #[test]
    fn test_dom_events_serialize_for_page_js() {
        let events = serde_json::to_value([DomEvent::MouseDown, DomEvent::KeyDown("ArrowDown".to_string())]).unwrap();
        assert_eq!(events, json!(["mouse_down", {"key_down": "ArrowDown"}]));
    }
}
