//! Wavefront OBJ geometry.

use super::summary_row;
use crate::DigestRow;
use crate::error::{ErrorKind, Result};
use memchr::memchr;
use tracing::instrument;

#[derive(Debug, Default)]
struct Tally {
    vertices: usize,
    normals: usize,
    texture_coords: usize,
    faces: usize,
    // `None` marks an anonymous statement: counted, never listed.
    objects: Vec<Option<String>>,
    groups: Vec<Option<String>>,
    materials: Vec<String>,
    libraries: Vec<String>,
}

impl Tally {
    fn statement(&mut self, line: &str) {
        let line = line.trim();
        let (keyword, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        let named = || (!rest.is_empty()).then(|| rest.to_string());
        match keyword {
            "v" => self.vertices += 1,
            "vn" => self.normals += 1,
            "vt" => self.texture_coords += 1,
            "f" => self.faces += 1,
            "o" => self.objects.push(named()),
            "g" => self.groups.push(named()),
            "usemtl" => {
                if !rest.is_empty() && !self.materials.iter().any(|m| m == rest) {
                    self.materials.push(rest.to_string());
                }
            },
            "mtllib" => {
                for library in rest.split_whitespace() {
                    if !self.libraries.iter().any(|l| l == library) {
                        self.libraries.push(library.to_string());
                    }
                }
            },
            _ => {},
        }
    }

    fn into_rows(self) -> Vec<DigestRow> {
        let mut rows: Vec<DigestRow> = [
            ("vertices", self.vertices),
            ("normals", self.normals),
            ("texture coords", self.texture_coords),
            ("faces", self.faces),
        ]
        .into_iter()
        .filter(|&(_, count)| count > 0)
        .map(|(label, count)| DigestRow::new(label, count.to_string()))
        .collect();

        for (label, statements) in [("objects", &self.objects), ("groups", &self.groups)] {
            let names: Vec<String> = statements.iter().flatten().cloned().collect();
            rows.extend(summary_row(label, statements.len(), &names));
        }
        rows.extend(summary_row("materials", self.materials.len(), &self.materials));
        rows.extend(summary_row("material libraries", self.libraries.len(), &self.libraries));
        rows
    }
}

#[instrument(skip_all)]
pub(crate) fn digest(content: &[u8]) -> Result<Vec<DigestRow>> {
    if memchr(0, content).is_some() {
        exn::bail!(ErrorKind::InvalidText);
    }
    let text = String::from_utf8_lossy(content);
    let mut tally = Tally::default();
    for line in text.lines() {
        if line.trim_start().starts_with('#') {
            continue;
        }
        tally.statement(line);
    }
    Ok(tally.into_rows())
}
