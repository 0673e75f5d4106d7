use crate::browser::page::{FrameHandle, Page, Scope};
use crate::dom::resolver::wait_until;
use crate::error::{BrowserError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Identifies a sub-document hosted in the top document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FrameMatcher {
    /// Frame element carrying `name="..."`
    Name(String),

    /// Frame element matched by `host`, whose browsing context is named `name`
    Host { host: String, name: String },
}

impl FrameMatcher {
    pub fn name(name: impl Into<String>) -> Self {
        FrameMatcher::Name(name.into())
    }

    /// Name the frame's browsing context is registered under
    pub fn frame_name(&self) -> &str {
        match self {
            FrameMatcher::Name(name) => name,
            FrameMatcher::Host { name, .. } => name,
        }
    }

    /// Selector for the element hosting the frame in the top document
    pub fn host_selector(&self) -> String {
        match self {
            FrameMatcher::Name(name) => format!("iframe[name=\"{0}\"], frame[name=\"{0}\"]", name),
            FrameMatcher::Host { host, .. } => host.clone(),
        }
    }
}

/// Wait up to `timeout` for the frame's host element, then return a handle
/// to the sub-document by name.
pub fn locate_frame<P: Page>(page: &P, matcher: &FrameMatcher, timeout: Duration, poll: Duration) -> Result<FrameHandle> {
    let host = matcher.host_selector();

    let hosted = wait_until(page, timeout, poll, || page.query(&Scope::Document, &host).ok().flatten());
    if hosted.is_none() {
        log::warn!("Frame host '{}' did not appear within {:?}", host, timeout);
        return Err(BrowserError::FrameNotFound(format!(
            "{} (no '{}' within {}ms)",
            matcher.frame_name(),
            host,
            timeout.as_millis()
        )));
    }

    let names = page.frame_names()?;
    if names.iter().any(|name| name == matcher.frame_name()) {
        log::debug!("Located frame '{}'", matcher.frame_name());
        Ok(FrameHandle::new(matcher.frame_name()))
    } else {
        Err(BrowserError::FrameNotFound(format!(
            "{} (host present, attached frames: {:?})",
            matcher.frame_name(),
            names
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::SnapshotPage;

    const POLL: Duration = Duration::from_millis(250);

    #[test]
    fn test_host_selector() {
        assert_eq!(
            FrameMatcher::name("sidebarframe").host_selector(),
            "iframe[name=\"sidebarframe\"], frame[name=\"sidebarframe\"]"
        );

        let matcher = FrameMatcher::Host { host: "#content iframe".to_string(), name: "contentframe".to_string() };
        assert_eq!(matcher.host_selector(), "#content iframe");
        assert_eq!(matcher.frame_name(), "contentframe");
    }

    #[test]
    fn test_locate_existing_frame() {
        let page = SnapshotPage::with_frames([("sidebarframe", "<html><body></body></html>")]);

        let frame = locate_frame(&page, &FrameMatcher::name("sidebarframe"), Duration::from_secs(10), POLL).unwrap();
        assert_eq!(frame, FrameHandle::new("sidebarframe"));
        assert_eq!(page.total_settle(), Duration::ZERO);
    }

    #[test]
    fn test_missing_host_times_out() {
        let page = SnapshotPage::with_frames([("sidebarframe", "<html></html>")]);

        let result = locate_frame(&page, &FrameMatcher::name("contentframe"), Duration::from_secs(1), POLL);
        assert!(matches!(result, Err(BrowserError::FrameNotFound(_))));
        assert_eq!(page.total_settle(), Duration::from_secs(1));
    }

    #[test]
    fn test_host_without_attached_frame() {
        let page = SnapshotPage::new("<html><body><iframe name=\"contentframe\"></iframe></body></html>");

        let result = locate_frame(&page, &FrameMatcher::name("contentframe"), Duration::from_secs(1), POLL);
        match result {
            Err(BrowserError::FrameNotFound(message)) => assert!(message.contains("host present")),
            other => panic!("Expected FrameNotFound, got {:?}", other),
        }
    }
}
