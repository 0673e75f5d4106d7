use crate::batch::report::BatchReport;
use crate::browser::page::Page;
use crate::config::EngineConfig;
use crate::extract::ExtractionResult;
use crate::navigation::NavigationController;
use serde::{Deserialize, Serialize};

/// A caller-supplied style identifier and the key it is searched under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleRequest {
    style_id: String,
    search_key: String,
}

impl StyleRequest {
    pub fn new(style_id: impl Into<String>) -> Self {
        let style_id = style_id.into();
        let search_key = search_key(&style_id);
        Self { style_id, search_key }
    }

    pub fn style_id(&self) -> &str {
        &self.style_id
    }

    pub fn search_key(&self) -> &str {
        &self.search_key
    }
}

/// The identifier without its two-character variant suffix
pub fn search_key(style_id: &str) -> String {
    let count = style_id.chars().count();
    if count >= 2 {
        style_id.chars().take(count - 2).collect()
    } else {
        style_id.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleOutcome {
    pub style_id: String,
    pub search_key: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ExtractionResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Runs the pipeline for each style in turn against one shared page
pub struct BatchProcessor<'a, P: Page> {
    page: &'a P,
    config: &'a EngineConfig,
}

impl<'a, P: Page> BatchProcessor<'a, P> {
    pub fn new(page: &'a P, config: &'a EngineConfig) -> Self {
        Self { page, config }
    }

    /// Run one style. Failures are captured in the outcome.
    pub fn process_one(&self, request: &StyleRequest) -> StyleOutcome {
        log::info!("Processing style ID: {} (searching as {})", request.style_id(), request.search_key());

        match NavigationController::new(self.page, self.config).run(request.search_key()) {
            Ok(run) => {
                if run.extraction.bom_rows.is_empty() {
                    log::info!("No component details extracted for {}", request.style_id());
                } else {
                    log::debug!("Component details for {}:\n{}", request.style_id(), run.extraction.component_details);
                }
                log::info!("Successfully processed {} ({:?})", request.style_id(), run.trace.state());

                StyleOutcome {
                    style_id: request.style_id().to_string(),
                    search_key: request.search_key().to_string(),
                    success: true,
                    data: Some(run.extraction),
                    error: None,
                }
            }
            Err(e) => {
                log::error!("Error processing style ID {}: {}", request.style_id(), e);
                StyleOutcome {
                    style_id: request.style_id().to_string(),
                    search_key: request.search_key().to_string(),
                    success: false,
                    data: None,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    /// Run every style in order, one at a time
    pub fn process<S: AsRef<str>>(&self, style_ids: &[S]) -> BatchReport {
        let results = style_ids
            .iter()
            .map(|style_id| self.process_one(&StyleRequest::new(style_id.as_ref())))
            .collect();

        let report = BatchReport::new(results);
        log::info!(
            "Batch finished: {} succeeded, {} failed",
            report.summary.succeeded,
            report.summary.failed
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::SnapshotPage;

    #[test]
    fn test_search_key() {
        assert_eq!(search_key("ABC123XX"), "ABC123");
        assert_eq!(search_key("AB"), "");
        assert_eq!(search_key("A"), "A");
        assert_eq!(search_key(""), "");
        assert_eq!(search_key("ÄBCDÉ"), "ÄBC");
    }

    #[test]
    fn test_style_request() {
        let request = StyleRequest::new("1K123456AA");
        assert_eq!(request.style_id(), "1K123456AA");
        assert_eq!(request.search_key(), "1K123456");
    }

    #[test]
    fn test_failures_are_recorded_per_style() {
        let config = EngineConfig::default();
        let page = SnapshotPage::new("<html><body></body></html>");

        let report = BatchProcessor::new(&page, &config).process(&["AAA01", "BBB02"]);
        assert_eq!(report.results.len(), 2);
        assert_eq!(report.results[0].style_id, "AAA01");
        assert_eq!(report.results[1].search_key, "BBB");
        assert!(report.results.iter().all(|outcome| !outcome.success && outcome.data.is_none()));
        assert!(report.results[0].error.as_deref().unwrap_or_default().starts_with("sidebar frame failed"));
        assert_eq!(report.summary.failed, 2);
    }
}
