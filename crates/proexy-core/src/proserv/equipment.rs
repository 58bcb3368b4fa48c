/// Marker line on page 1 of a Proserv certificate.
pub const EQUIPMENT_ID_MARKER: &str = "Equipment ID";

/// Find the equipment identifier printed `offset` lines below the first
/// line containing the marker.
///
/// The offset encodes the known certificate template. Returns `None` when
/// the marker is absent or the target line does not exist.
pub fn find_equipment_id(page_text: &str, offset: usize) -> Option<String> {
    let lines: Vec<&str> = page_text.lines().collect();
    let marker = lines.iter().position(|l| l.contains(EQUIPMENT_ID_MARKER))?;
    lines.get(marker + offset).map(|l| l.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_is_five_lines_below() {
        let text = "Certificate\nEquipment ID\nLocation\nArea\nZone\nGas Group\n  JB-4471  \nnext";
        assert_eq!(find_equipment_id(text, 5).as_deref(), Some("JB-4471"));
    }

    #[test]
    fn first_marker_wins() {
        let text = "Equipment ID\na\nb\nc\nd\nFIRST\nEquipment ID\na\nb\nc\nd\nSECOND";
        assert_eq!(find_equipment_id(text, 5).as_deref(), Some("FIRST"));
    }

    #[test]
    fn missing_marker_or_short_page() {
        assert_eq!(find_equipment_id("no marker here", 5), None);
        assert_eq!(find_equipment_id("Equipment ID\na\nb", 5), None);
    }

    #[test]
    fn marker_is_case_sensitive() {
        assert_eq!(find_equipment_id("EQUIPMENT ID\na\nb\nc\nd\nX", 5), None);
    }
}
