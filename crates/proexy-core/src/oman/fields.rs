use std::collections::HashMap;

/// Labels printed on an Oman certificate, in output column order.
pub const OMAN_FIELDS: [&str; 26] = [
    "PROJECT DESCRIPTION",
    "CLIENT TAG",
    "CIRCUIT ID",
    "DESCRIPTION",
    "SYSTEM",
    "MANUFACTURER",
    "TYPE/MODEL",
    "SERIAL NUMBER",
    "Ex PROTECTION",
    "EPL",
    "CERTIFIED BODY",
    "Ex CERT No",
    "DATE INSPECTED",
    "PROJECT WBS NO",
    "EX INSPECTION TAG No",
    "AREA CLASSIFICATION",
    "AREA CLASS",
    "LAYOUT DWG",
    "LOCATION",
    "AREA",
    "GRID REFERENCE",
    "ACCESS ARRANGEMENT",
    "IP RATING",
    "REPAIR CATEGORY",
    "NEXT INSPECTION DUE",
    "PASS / FAIL",
];

pub const SEQUENCE_COLUMN: &str = "Sl. No";
pub const FILENAME_COLUMN: &str = "Filename";

/// Uppercase and drop everything that is not an ASCII letter or digit.
pub fn normalize_key(text: &str) -> String {
    text.to_uppercase()
        .chars()
        .filter(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        .collect()
}

/// Canonical field names paired with their normalized keys.
#[derive(Debug, Clone)]
pub struct FieldDictionary {
    names: Vec<&'static str>,
    by_key: HashMap<String, usize>,
}

impl FieldDictionary {
    pub fn new(names: &[&'static str]) -> Self {
        let by_key = names
            .iter()
            .enumerate()
            .map(|(i, name)| (normalize_key(name), i))
            .collect();
        FieldDictionary {
            names: names.to_vec(),
            by_key,
        }
    }

    pub fn oman() -> Self {
        Self::new(&OMAN_FIELDS)
    }

    /// Index of the field whose normalized key is `key`.
    pub fn lookup(&self, key: &str) -> Option<usize> {
        self.by_key.get(key).copied()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.by_key.contains_key(key)
    }

    pub fn name(&self, index: usize) -> &'static str {
        self.names[index]
    }

    pub fn names(&self) -> &[&'static str] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Output header for the Oman workbook: sequence, every field, filename once.
pub fn oman_headers() -> Vec<String> {
    std::iter::once(SEQUENCE_COLUMN)
        .chain(OMAN_FIELDS)
        .chain(std::iter::once(FILENAME_COLUMN))
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_punctuation_and_case() {
        assert_eq!(normalize_key("Ex CERT No."), "EXCERTNO");
        assert_eq!(normalize_key("PASS / FAIL"), "PASSFAIL");
        assert_eq!(normalize_key("type/model:"), "TYPEMODEL");
        assert_eq!(normalize_key("  "), "");
    }

    #[test]
    fn dictionary_keys_are_distinct() {
        let dict = FieldDictionary::oman();
        assert_eq!(dict.len(), 26);
        assert_eq!(dict.lookup("AREACLASS"), Some(16));
        assert_eq!(dict.lookup("AREACLASSIFICATION"), Some(15));
        assert_eq!(dict.name(dict.lookup("EPL").unwrap()), "EPL");
        assert!(!dict.contains("FILENAME"));
    }

    #[test]
    fn headers_carry_filename_once() {
        let headers = oman_headers();
        assert_eq!(headers.len(), 28);
        assert_eq!(headers[0], "Sl. No");
        assert_eq!(headers[27], "Filename");
        assert_eq!(headers.iter().filter(|h| *h == "Filename").count(), 1);
    }
}
