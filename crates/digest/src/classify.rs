//! Extension classification.
//!
//! The host configures which extensions are text-based and which are binary.
//! Only resources with a recognized extension get format-specific digesting;
//! the text class additionally offers "open as text" in the editor.

use crate::Format;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileClass {
    Text,
    Binary,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct Extensions {
    /// Text-based extensions, including the leading dot
    pub text: Vec<String>,
    /// Binary extensions, including the leading dot
    pub binary: Vec<String>,
}

impl Default for Extensions {
    fn default() -> Self {
        // TODO: Consider supporting ktx textures once there is a digester for them.
        Self {
            text: vec![".babylon".into(), ".gltf".into(), ".obj".into()],
            binary: vec![".glb".into()],
        }
    }
}

impl Extensions {
    /// Classify an extension (with leading dot, any case).
    pub fn classify(&self, extension: &str) -> Option<FileClass> {
        let matches = |candidates: &[String]| candidates.iter().any(|c| c.eq_ignore_ascii_case(extension));
        if matches(&self.text) {
            Some(FileClass::Text)
        } else if matches(&self.binary) {
            Some(FileClass::Binary)
        } else {
            None
        }
    }

    pub fn is_recognized(&self, extension: &str) -> bool {
        self.classify(extension).is_some()
    }

    pub fn is_text(&self, extension: &str) -> bool {
        self.classify(extension) == Some(FileClass::Text)
    }

    /// The digester format for an extension, if it is both recognized by
    /// this configuration and has a digester.
    pub fn format_for(&self, extension: &str) -> Option<Format> {
        self.classify(extension).and(Format::from_extension(extension))
    }

    /// All recognized extensions, text first.
    pub fn all(&self) -> impl Iterator<Item = &str> {
        self.text.iter().chain(self.binary.iter()).map(String::as_str)
    }
}
