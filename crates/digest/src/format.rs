use crate::error::{Error, ErrorKind};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// An asset format with a dedicated digester.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Format {
    /// Babylon.js scene description (.babylon)
    Babylon,
    /// glTF JSON (.gltf)
    Gltf,
    /// glTF binary container (.glb)
    Glb,
    /// Wavefront geometry (.obj)
    Obj,
}

impl Format {
    pub const ALL: [Format; 4] = [Format::Babylon, Format::Gltf, Format::Glb, Format::Obj];

    /// Canonical extension, including the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Babylon => ".babylon",
            Format::Gltf => ".gltf",
            Format::Glb => ".glb",
            Format::Obj => ".obj",
        }
    }

    /// Look up a format by extension, with or without the leading dot.
    /// Unknown extensions are not an error; they simply have no digester.
    #[must_use]
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.trim_start_matches('.').to_lowercase().as_str() {
            "babylon" => Some(Format::Babylon),
            "gltf" => Some(Format::Gltf),
            "glb" => Some(Format::Glb),
            "obj" => Some(Format::Obj),
            _ => None,
        }
    }

    #[must_use]
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }
}

impl FromStr for Format {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Self::from_extension(s) {
            Some(format) => Ok(format),
            None => exn::bail!(ErrorKind::UnsupportedFormat(s.to_string())),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(".babylon", Format::Babylon)]
    #[case("babylon", Format::Babylon)]
    #[case(".GLTF", Format::Gltf)]
    #[case("glb", Format::Glb)]
    #[case(".obj", Format::Obj)]
    fn test_from_str(#[case] input: &str, #[case] expected: Format) {
        assert_eq!(input.parse::<Format>().unwrap(), expected);
    }

    #[rstest]
    #[case(".fbx")]
    #[case("")]
    #[case(".ktx")]
    fn test_from_str_unsupported(#[case] input: &str) {
        let err = input.parse::<Format>().unwrap_err();
        assert!(matches!(&*err, ErrorKind::UnsupportedFormat(_)));
    }

    #[rstest]
    #[case("/models/duck.glb", Some(Format::Glb))]
    #[case("scene.Babylon", Some(Format::Babylon))]
    #[case("mesh.obj", Some(Format::Obj))]
    #[case("texture.png", None)]
    #[case(".gltf", None)]
    #[case("README", None)]
    fn test_from_path(#[case] path: &str, #[case] expected: Option<Format>) {
        assert_eq!(Format::from_path(path), expected);
    }

    #[test]
    fn test_extension_round_trips() {
        for format in Format::ALL {
            assert_eq!(Format::from_extension(format.extension()), Some(format));
        }
    }
}
