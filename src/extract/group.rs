use crate::config::ExtractionConfig;
use crate::extract::table::BomRow;
use indexmap::IndexMap;
use serde::Serialize;

/// Rows sharing a body, rendered as a header line plus one detail line each
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentGroup {
    pub body_key: String,
    pub header: String,
    pub details: Vec<String>,
}

impl ComponentGroup {
    pub fn render(&self) -> String {
        let mut lines = Vec::with_capacity(self.details.len() + 1);
        lines.push(self.header.as_str());
        lines.extend(self.details.iter().map(String::as_str));
        lines.join("\n")
    }
}

fn or<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    if value.is_empty() { placeholder } else { value }
}

/// `"<placement> : <material position> : <material> : <color>"`
pub fn detail_line(row: &BomRow, config: &ExtractionConfig) -> String {
    format!(
        "{} : {} : {} : {}",
        or(&row.placement, &config.placement_placeholder),
        or(&row.material_position, &config.position_placeholder),
        or(&row.material, &config.material_placeholder),
        or(&row.color, &config.color_placeholder),
    )
}

/// Group rows by body in first-seen order. The header is taken from the
/// first row of each group.
pub fn group_rows(rows: &[BomRow], config: &ExtractionConfig) -> Vec<ComponentGroup> {
    let mut groups: IndexMap<&str, ComponentGroup> = IndexMap::new();

    for row in rows {
        let body_key = or(&row.body, &config.unknown_body);
        groups
            .entry(body_key)
            .or_insert_with(|| ComponentGroup {
                body_key: body_key.to_string(),
                header: format!(
                    "{} : {}",
                    or(&row.sc_body_descriptor, &config.descriptor_placeholder),
                    or(&row.sc_body, body_key)
                ),
                details: Vec::new(),
            })
            .details
            .push(detail_line(row, config));
    }

    groups.into_values().collect()
}

/// Groups separated by a blank line
pub fn render_groups(groups: &[ComponentGroup]) -> String {
    groups.iter().map(ComponentGroup::render).collect::<Vec<_>>().join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(body: &str, descriptor: &str, sc_body: &str, placement: &str, position: &str, material: &str, color: &str) -> BomRow {
        BomRow {
            material_attribute: "Fabric".to_string(),
            body: body.to_string(),
            sc_body_descriptor: descriptor.to_string(),
            sc_body: sc_body.to_string(),
            placement: placement.to_string(),
            material_position: position.to_string(),
            material: material.to_string(),
            color: color.to_string(),
        }
    }

    #[test]
    fn test_groups_keep_first_seen_order() {
        let config = ExtractionConfig::default();
        let rows = vec![
            row("B2", "Top", "SC2", "Front", "P1", "Cotton", "Red"),
            row("B1", "Bottom", "SC1", "Back", "P2", "Poly", "Blue"),
            row("B2", "Ignored", "Ignored", "Sleeve", "P3", "Rib", "Black"),
        ];

        let groups = group_rows(&rows, &config);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].body_key, "B2");
        assert_eq!(groups[0].header, "Top : SC2");
        assert_eq!(groups[0].details, vec!["Front : P1 : Cotton : Red", "Sleeve : P3 : Rib : Black"]);
        assert_eq!(groups[1].header, "Bottom : SC1");
    }

    #[test]
    fn test_placeholders_fill_empty_fields() {
        let config = ExtractionConfig::default();
        let rows = vec![row("", "", "", "", "", "Cotton", "")];

        let groups = group_rows(&rows, &config);
        assert_eq!(groups[0].body_key, "Unknown Body");
        assert_eq!(groups[0].header, "SC Body Description : Unknown Body");
        assert_eq!(groups[0].details[0], "Placement :  : Cotton : Color");
    }

    #[test]
    fn test_header_falls_back_to_body() {
        let config = ExtractionConfig::default();
        let groups = group_rows(&[row("B7", "Desc", "", "Front", "P1", "Cotton", "Red")], &config);
        assert_eq!(groups[0].header, "Desc : B7");
    }

    #[test]
    fn test_render_groups() {
        let config = ExtractionConfig::default();
        let rows = vec![
            row("B1", "Desc", "SC1", "Front", "P1", "Cotton", "Red"),
            row("B1", "Desc", "SC1", "Back", "P2", "Poly", "Blue"),
            row("B2", "Desc2", "SC2", "Neck", "P3", "Rib", "White"),
        ];

        let rendered = render_groups(&group_rows(&rows, &config));
        assert_eq!(
            rendered,
            "Desc : SC1\nFront : P1 : Cotton : Red\nBack : P2 : Poly : Blue\n\nDesc2 : SC2\nNeck : P3 : Rib : White"
        );
    }

    #[test]
    fn test_empty_rows() {
        let groups = group_rows(&[], &ExtractionConfig::default());
        assert!(groups.is_empty());
        assert_eq!(render_groups(&groups), "");
    }
}
