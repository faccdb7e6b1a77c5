/// One line of a digest: a label and a human-readable value.
///
/// Rows carry no schema beyond that. On the wire they travel as a
/// two-element array, `["label", "value"]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "(String, String)", into = "(String, String)")
)]
pub struct DigestRow {
    pub label: String,
    pub value: String,
}
impl DigestRow {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}
impl From<(String, String)> for DigestRow {
    fn from((label, value): (String, String)) -> Self {
        Self { label, value }
    }
}
impl From<(&str, &str)> for DigestRow {
    fn from((label, value): (&str, &str)) -> Self {
        Self::new(label, value)
    }
}
impl From<DigestRow> for (String, String) {
    fn from(row: DigestRow) -> Self {
        (row.label, row.value)
    }
}
