//! BOM table extraction.
//!
//! Extraction works on the serialized markup of the content frame, so the
//! same code runs against a live tab and a captured snapshot.

pub mod group;
pub mod page_text;
pub mod table;

pub use group::{ComponentGroup, group_rows, render_groups};
pub use table::{BomColumn, BomRow, BomTable, ColumnMap, find_bom_table};

use crate::browser::page::{Page, Scope};
use crate::config::ExtractionConfig;
use crate::error::Result;
use scraper::Html;
use serde::{Deserialize, Serialize};

/// Everything read from the content frame for one style
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    /// Keyword-matching text lines
    pub content: String,
    pub colorway_info: String,
    /// Summary of the table read
    pub bom_data: String,
    /// `"<title>: <value>"` lines
    pub product_details: String,
    /// Grouped, human-readable component listing
    pub component_details: String,
    /// Retained rows in table order
    #[serde(default)]
    pub bom_rows: Vec<BomRow>,
}

pub struct BomExtractor<'a> {
    config: &'a ExtractionConfig,
}

impl<'a> BomExtractor<'a> {
    pub fn new(config: &'a ExtractionConfig) -> Self {
        Self { config }
    }

    /// Extract from markup. `colorway_info` is left empty.
    pub fn extract_html(&self, html: &str) -> ExtractionResult {
        let document = Html::parse_document(html);

        let content = page_text::scan_content(&document, self.config);
        let product_details = page_text::scan_product_details(&document, self.config);

        let (bom_data, component_details, bom_rows) = match find_bom_table(&document, &self.config.excluded_attribute) {
            Some(table) if !table.rows.is_empty() => {
                let groups = group_rows(&table.rows, self.config);
                log::info!("Extracted {} BOM rows in {} groups", table.rows.len(), groups.len());
                (
                    format!("Extracted {} BOM rows, grouped into {} body groups", table.rows.len(), groups.len()),
                    render_groups(&groups),
                    table.rows,
                )
            }
            Some(table) => {
                log::warn!("BOM table {} has no retained rows ({} dropped)", table.table_index, table.dropped);
                self.no_bom()
            }
            None => {
                log::warn!("No table with the required BOM columns");
                self.no_bom()
            }
        };

        ExtractionResult { content, colorway_info: String::new(), bom_data, product_details, component_details, bom_rows }
    }

    /// Read the markup of `scope` and extract from it
    pub fn extract_page<P: Page>(&self, page: &P, scope: &Scope, colorway_info: String) -> Result<ExtractionResult> {
        let html = page.html(scope)?;
        Ok(ExtractionResult { colorway_info, ..self.extract_html(&html) })
    }

    fn no_bom(&self) -> (String, String, Vec<BomRow>) {
        (self.config.no_bom_data.clone(), self.config.no_component_details.clone(), Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::SnapshotPage;

    const BOM_PAGE: &str = r#"<html><body>
        <div class="f-attribute-box"><span class="input-title">Season</span><span class="display-only-label">Fall</span></div>
        <table>
            <tr><th>Material Attribute</th><th>Body</th><th>SC Body Descriptor</th><th>SC Body</th>
                <th>Placement</th><th>Material Position</th><th>Material</th><th>Color</th></tr>
            <tr><td>Fabric</td><td>B1</td><td>Desc</td><td>SC1</td><td>Front</td><td>P1</td><td>Cotton</td><td>Red</td></tr>
            <tr><td>Misc</td><td>B1</td><td>Desc</td><td>SC1</td><td>Label</td><td>P9</td><td>Care</td><td>White</td></tr>
            <tr><td>Fabric</td><td>B2</td><td>Desc2</td><td>SC2</td><td>Back</td><td>P2</td><td>Poly</td><td>Blue</td></tr>
        </table>
    </body></html>"#;

    #[test]
    fn test_extract_bom() {
        let config = ExtractionConfig::default();
        let result = BomExtractor::new(&config).extract_html(BOM_PAGE);

        assert_eq!(result.bom_data, "Extracted 2 BOM rows, grouped into 2 body groups");
        assert_eq!(result.component_details, "Desc : SC1\nFront : P1 : Cotton : Red\n\nDesc2 : SC2\nBack : P2 : Poly : Blue");
        assert_eq!(result.bom_rows.len(), 2);
        assert_eq!(result.product_details, "Season: Fall\n");
        assert!(result.colorway_info.is_empty());
    }

    #[test]
    fn test_sentinels_without_table() {
        let config = ExtractionConfig::default();
        let result = BomExtractor::new(&config).extract_html("<html><body><div>Product Name</div></body></html>");

        assert_eq!(result.bom_data, "BOM table not found or no data could be extracted");
        assert_eq!(result.component_details, "No component details available");
        assert!(result.bom_rows.is_empty());
        assert!(result.content.contains("Product Name"));
    }

    #[test]
    fn test_sentinels_when_every_row_dropped() {
        let config = ExtractionConfig::default();
        let html = BOM_PAGE.replace("<td>Fabric</td>", "<td>MISC</td>");
        let result = BomExtractor::new(&config).extract_html(&html);

        assert_eq!(result.bom_data, config.no_bom_data);
        assert_eq!(result.component_details, config.no_component_details);
    }

    #[test]
    fn test_extract_page_reads_scope() {
        let config = ExtractionConfig::default();
        let page = SnapshotPage::with_frames([("contentframe", BOM_PAGE)]);

        let result = BomExtractor::new(&config)
            .extract_page(&page, &Scope::frame("contentframe"), "Selected Colorway: X (Value: 1)".to_string())
            .unwrap();
        assert_eq!(result.colorway_info, "Selected Colorway: X (Value: 1)");
        assert_eq!(result.bom_rows[1].body, "B2");
    }

    #[test]
    fn test_serializes_camel_case() {
        let config = ExtractionConfig::default();
        let value = serde_json::to_value(BomExtractor::new(&config).extract_html(BOM_PAGE)).unwrap();
        assert!(value.get("bomData").is_some());
        assert!(value.get("componentDetails").is_some());
        assert_eq!(value["bomRows"][0]["scBodyDescriptor"], "Desc");
    }
}
