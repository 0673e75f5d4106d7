use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};

/// Columns a table's header row must carry to be treated as the BOM table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BomColumn {
    MaterialAttribute,
    Body,
    ScBodyDescriptor,
    ScBody,
    Placement,
    MaterialPosition,
    Material,
    Color,
}

impl BomColumn {
    pub const ALL: [BomColumn; 8] = [
        BomColumn::MaterialAttribute,
        BomColumn::Body,
        BomColumn::ScBodyDescriptor,
        BomColumn::ScBody,
        BomColumn::Placement,
        BomColumn::MaterialPosition,
        BomColumn::Material,
        BomColumn::Color,
    ];

    /// Header label, lower-cased as compared
    pub fn label(self) -> &'static str {
        match self {
            BomColumn::MaterialAttribute => "material attribute",
            BomColumn::Body => "body",
            BomColumn::ScBodyDescriptor => "sc body descriptor",
            BomColumn::ScBody => "sc body",
            BomColumn::Placement => "placement",
            BomColumn::MaterialPosition => "material position",
            BomColumn::Material => "material",
            BomColumn::Color => "color",
        }
    }
}

/// Position of every required column in a qualifying header row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    indices: [usize; 8],
}

impl ColumnMap {
    /// Map every required label to the first header cell equal to it.
    ///
    /// `headers` must already be trimmed and lower-cased. Matching is exact,
    /// so `"material"` never stands in for `"material position"`. Returns
    /// `None` when any label is missing.
    pub fn from_headers(headers: &[String]) -> Option<Self> {
        let mut indices = [0; 8];
        for (slot, column) in indices.iter_mut().zip(BomColumn::ALL) {
            match headers.iter().position(|header| header == column.label()) {
                Some(index) => *slot = index,
                None => {
                    log::debug!("Required column not found with exact match: \"{}\"", column.label());
                    return None;
                }
            }
        }
        Some(Self { indices })
    }

    pub fn index(&self, column: BomColumn) -> usize {
        let position = BomColumn::ALL.iter().position(|c| *c == column).unwrap_or_default();
        self.indices[position]
    }

    pub fn max_index(&self) -> usize {
        self.indices.iter().copied().max().unwrap_or_default()
    }
}

/// One line of the BOM table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BomRow {
    pub material_attribute: String,
    pub body: String,
    pub sc_body_descriptor: String,
    pub sc_body: String,
    pub placement: String,
    pub material_position: String,
    pub material: String,
    pub color: String,
}

impl BomRow {
    /// A row is kept when it identifies a component (body, SC body or
    /// material) and its material attribute is not the excluded one
    pub fn is_retained(&self, excluded_attribute: &str) -> bool {
        let has_component = !self.body.is_empty() || !self.sc_body.is_empty() || !self.material.is_empty();
        has_component && self.material_attribute.to_lowercase() != excluded_attribute.to_lowercase()
    }

    fn from_cells(cells: &[ElementRef], columns: &ColumnMap) -> Self {
        let field = |column: BomColumn| cells.get(columns.index(column)).map(cell_text).unwrap_or_default();

        Self {
            material_attribute: field(BomColumn::MaterialAttribute),
            body: field(BomColumn::Body),
            sc_body_descriptor: field(BomColumn::ScBodyDescriptor),
            sc_body: field(BomColumn::ScBody),
            placement: field(BomColumn::Placement),
            material_position: field(BomColumn::MaterialPosition),
            material: field(BomColumn::Material),
            color: field(BomColumn::Color),
        }
    }
}

/// The qualifying table and what was read from it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BomTable {
    /// Position among all tables in the document
    pub table_index: usize,
    pub columns: ColumnMap,
    /// Rows that passed [`BomRow::is_retained`], in table order
    pub rows: Vec<BomRow>,
    /// Data rows read but not retained
    pub dropped: usize,
}

fn selector(css: &'static str) -> Selector {
    match Selector::parse(css) {
        Ok(selector) => selector,
        Err(e) => unreachable!("static selector {css} is valid: {e:?}"),
    }
}

/// Whether `element`'s nearest `tag` ancestor is `owner`, so rows and cells
/// of nested tables are not attributed to the outer one
fn owned_by(element: &ElementRef, tag: &str, owner: &ElementRef) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| ancestor.value().name() == tag)
        .is_some_and(|ancestor| ancestor.id() == owner.id())
}

fn rows_of<'a>(table: &ElementRef<'a>) -> Vec<ElementRef<'a>> {
    let tr = selector("tr");
    table.select(&tr).filter(|row| owned_by(row, "table", table)).collect()
}

fn cells_of<'a>(row: &ElementRef<'a>) -> Vec<ElementRef<'a>> {
    let cell = selector("th, td");
    row.select(&cell).filter(|c| owned_by(c, "tr", row)).collect()
}

fn text_of(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Cell value, preferring the text of a link inside the cell
pub fn cell_text(cell: &ElementRef) -> String {
    let anchor = selector("a");
    match cell.select(&anchor).next() {
        Some(link) => text_of(&link),
        None => text_of(cell),
    }
}

/// Trimmed, lower-cased texts of a table's first row
pub fn header_cells(table: &ElementRef) -> Vec<String> {
    rows_of(table)
        .first()
        .map(|row| cells_of(row).iter().map(|c| text_of(c).to_lowercase()).collect())
        .unwrap_or_default()
}

/// Scan every table in document order and read the first one whose header
/// row carries all [`BomColumn`] labels.
pub fn find_bom_table(html: &Html, excluded_attribute: &str) -> Option<BomTable> {
    let table_selector = selector("table");
    let tables: Vec<ElementRef> = html.select(&table_selector).collect();
    log::debug!("Found {} tables on page", tables.len());

    for (table_index, table) in tables.iter().enumerate() {
        let headers = header_cells(table);
        log::debug!("Table {} headers: {:?}", table_index, headers);

        let Some(columns) = ColumnMap::from_headers(&headers) else {
            continue;
        };
        log::info!("Found BOM table at index {}", table_index);

        let mut rows = Vec::new();
        let mut dropped = 0;
        for (row_index, row) in rows_of(table).iter().enumerate().skip(1) {
            let cells = cells_of(row);
            if cells.len() < columns.max_index() {
                continue;
            }

            let bom_row = BomRow::from_cells(&cells, &columns);
            if bom_row.is_retained(excluded_attribute) {
                log::debug!("Row {}: {:?}", row_index, bom_row);
                rows.push(bom_row);
            } else {
                log::debug!("Dropped row {}: {:?}", row_index, bom_row);
                dropped += 1;
            }
        }

        return Some(BomTable { table_index, columns, rows, dropped });
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: [&str; 8] = [
        "Material Attribute",
        "Body",
        "SC Body Descriptor",
        "SC Body",
        "Placement",
        "Material Position",
        "Material",
        "Color",
    ];

    fn table_html(header: &[&str], rows: &[[&str; 8]]) -> String {
        let mut html = String::from("<table><tr>");
        for h in header {
            html.push_str(&format!("<th>{}</th>", h));
        }
        html.push_str("</tr>");
        for row in rows {
            html.push_str("<tr>");
            for cell in row {
                html.push_str(&format!("<td>{}</td>", cell));
            }
            html.push_str("</tr>");
        }
        html.push_str("</table>");
        html
    }

    fn document(body: &str) -> Html {
        Html::parse_document(&format!("<html><body>{}</body></html>", body))
    }

    fn headers(labels: &[&str]) -> Vec<String> {
        labels.iter().map(|l| l.to_lowercase()).collect()
    }

    #[test]
    fn test_column_map_exact_match() {
        let columns = ColumnMap::from_headers(&headers(&HEADER)).unwrap();
        assert_eq!(columns.index(BomColumn::MaterialAttribute), 0);
        assert_eq!(columns.index(BomColumn::Material), 6);
        assert_eq!(columns.index(BomColumn::Color), 7);
        assert_eq!(columns.max_index(), 7);
    }

    #[test]
    fn test_column_map_is_order_independent() {
        let mut reordered = HEADER.to_vec();
        reordered.reverse();
        let columns = ColumnMap::from_headers(&headers(&reordered)).unwrap();
        assert_eq!(columns.index(BomColumn::Color), 0);
        assert_eq!(columns.index(BomColumn::MaterialAttribute), 7);
    }

    #[test]
    fn test_column_map_rejects_substring_only_header() {
        // "material" is present but "material position" is not
        let labels = ["Material Attribute", "Body", "SC Body Descriptor", "SC Body", "Placement", "Position", "Material", "Color"];
        assert!(ColumnMap::from_headers(&headers(&labels)).is_none());

        // "material position" alone must not satisfy "material"
        let labels = ["Material Attribute", "Body", "SC Body Descriptor", "SC Body", "Placement", "Material Position", "Color"];
        assert!(ColumnMap::from_headers(&headers(&labels)).is_none());
    }

    #[test]
    fn test_column_map_rejects_each_missing_label() {
        for skip in 0..HEADER.len() {
            let labels: Vec<&str> = HEADER.iter().enumerate().filter(|(i, _)| *i != skip).map(|(_, l)| *l).collect();
            assert!(ColumnMap::from_headers(&headers(&labels)).is_none(), "matched without {}", HEADER[skip]);
        }
    }

    #[test]
    fn test_row_retention() {
        let row = BomRow { material_attribute: "Misc".to_string(), body: "B1".to_string(), ..Default::default() };
        assert!(!row.is_retained("misc"));

        let row = BomRow { material_attribute: "MISC".to_string(), material: "Cotton".to_string(), ..Default::default() };
        assert!(!row.is_retained("misc"));

        let row = BomRow { material_attribute: "Fabric".to_string(), placement: "Front".to_string(), ..Default::default() };
        assert!(!row.is_retained("misc"));

        let row = BomRow { sc_body: "SC1".to_string(), ..Default::default() };
        assert!(row.is_retained("misc"));
    }

    #[test]
    fn test_find_bom_table_skips_unrelated_tables() {
        let html = document(&format!(
            "<table><tr><th>Style</th><th>Name</th></tr><tr><td>A</td><td>B</td></tr></table>{}",
            table_html(&HEADER, &[["Fabric", "B1", "Desc", "SC1", "Front", "P1", "Cotton", "Red"]])
        ));

        let table = find_bom_table(&html, "misc").unwrap();
        assert_eq!(table.table_index, 1);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].material, "Cotton");
        assert_eq!(table.rows[0].color, "Red");
    }

    #[test]
    fn test_misc_rows_dropped() {
        let html = document(&table_html(
            &HEADER,
            &[
                ["Misc", "B1", "Desc", "SC1", "Front", "P1", "Cotton", "Red"],
                ["Fabric", "B1", "Desc", "SC1", "Back", "P2", "Poly", "Blue"],
                ["Trim", "", "", "", "Neck", "P3", "", "White"],
            ],
        ));

        let table = find_bom_table(&html, "misc").unwrap();
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].placement, "Back");
        assert_eq!(table.dropped, 2);
    }

    #[test]
    fn test_anchor_text_preferred() {
        let html = document(&format!(
            "<table><tr>{}</tr><tr><td>Fabric</td><td><a href=\"#\"> B1 </a> (edit)</td><td>Desc</td><td>SC1</td>\
             <td>Front</td><td>P1</td><td><span>icon</span><a>Cotton Jersey</a></td><td>Red</td></tr></table>",
            HEADER.iter().map(|h| format!("<td>{}</td>", h)).collect::<String>()
        ));

        let table = find_bom_table(&html, "misc").unwrap();
        assert_eq!(table.rows[0].body, "B1");
        assert_eq!(table.rows[0].material, "Cotton Jersey");
    }

    #[test]
    fn test_header_is_case_and_whitespace_insensitive() {
        let html = document(
            "<table><tr><th> MATERIAL ATTRIBUTE </th><th>body</th><th>Sc Body Descriptor</th><th>SC BODY</th>\
             <th>Placement\n</th><th>Material Position</th><th>Material</th><th>Color</th></tr>\
             <tr><td>Fabric</td><td>B1</td><td>D</td><td>S</td><td>P</td><td>MP</td><td>M</td><td>C</td></tr></table>",
        );

        assert_eq!(find_bom_table(&html, "misc").unwrap().rows.len(), 1);
    }

    #[test]
    fn test_short_rows_skipped() {
        let html = document(
            &table_html(&HEADER, &[["Fabric", "B1", "Desc", "SC1", "Front", "P1", "Cotton", "Red"]])
                .replace("</table>", "<tr><td colspan=\"8\">Total</td></tr></table>"),
        );

        let table = find_bom_table(&html, "misc").unwrap();
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.dropped, 0);
    }

    #[test]
    fn test_nested_layout_table_not_mistaken_for_bom() {
        let inner = table_html(&HEADER, &[["Fabric", "B1", "Desc", "SC1", "Front", "P1", "Cotton", "Red"]]);
        let html = document(&format!("<table><tr><td>Layout</td><td>{}</td></tr></table>", inner));

        let table = find_bom_table(&html, "misc").unwrap();
        assert_eq!(table.table_index, 1);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].body, "B1");
    }

    #[test]
    fn test_no_qualifying_table() {
        let html = document("<table><tr><th>Material</th><th>Color</th></tr></table><p>no tables here</p>");
        assert!(find_bom_table(&html, "misc").is_none());
    }
}
