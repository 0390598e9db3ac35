use std::path::Path;

use anyhow::{bail, Context as _};
use serde_json::Value;

use crate::{Mapgen, Palette, RegistryBuilder};

/// Outcome of loading a batch of content.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub mapgens: usize,
    pub palettes: usize,
    /// Objects of other types that were skipped.
    pub ignored: usize,
    /// Definitions that failed to parse, with a description of where they
    /// were.
    pub failed: Vec<(String, anyhow::Error)>,
}

impl LoadReport {
    pub fn merge(&mut self, other: LoadReport) {
        self.mapgens += other.mapgens;
        self.palettes += other.palettes;
        self.ignored += other.ignored;
        self.failed.extend(other.failed);
    }
}

/// Short description of an object for error messages.
fn describe(source: &str, index: usize, obj: &Value) -> String {
    let name = [
        "id",
        "om_terrain",
        "nested_mapgen_id",
        "update_mapgen_id",
    ]
    .iter()
    .find_map(|k| obj.get(k))
    .map(|a| match a {
        Value::String(s) => s.clone(),
        a => a.to_string(),
    });

    match name {
        Some(name) => format!("{source}[{index}] {name}"),
        None => format!("{source}[{index}]"),
    }
}

impl RegistryBuilder {
    /// Load content from JSON text.
    ///
    /// The text is either a single object or an array of objects. Objects
    /// that fail to parse are listed in the report and don't stop the rest
    /// from loading, but text that isn't JSON at all is an error.
    pub fn load_json(
        &mut self,
        source: &str,
        text: &str,
    ) -> anyhow::Result<LoadReport> {
        let objects = match serde_json::from_str::<Value>(text)
            .with_context(|| format!("{source}: invalid JSON"))?
        {
            Value::Array(a) => a,
            obj @ Value::Object(_) => vec![obj],
            _ => bail!("{source}: expected an object or an array of objects"),
        };

        let mut report = LoadReport::default();
        for (i, obj) in objects.into_iter().enumerate() {
            let desc = describe(source, i, &obj);
            let kind = obj
                .get("type")
                .and_then(|a| a.as_str())
                .unwrap_or_default()
                .to_owned();
            match kind.as_str() {
                "mapgen" => match serde_json::from_value::<Mapgen>(obj) {
                    Ok(mapgen) => {
                        self.add_mapgen(mapgen);
                        report.mapgens += 1;
                    }
                    Err(e) => report.failed.push((desc, e.into())),
                },
                "palette" => match serde_json::from_value::<Palette>(obj) {
                    Ok(palette) => {
                        self.add_palette(palette);
                        report.palettes += 1;
                    }
                    Err(e) => report.failed.push((desc, e.into())),
                },
                _ => {
                    log::debug!("{desc}: ignoring object of type {kind:?}");
                    report.ignored += 1;
                }
            }
        }

        Ok(report)
    }

    /// Load every JSON file under a path.
    ///
    /// Files that aren't valid JSON are reported as failed.
    pub fn load_path(
        &mut self,
        path: impl AsRef<Path>,
    ) -> anyhow::Result<LoadReport> {
        let mut report = LoadReport::default();
        for (file, text) in util::json_files(path)? {
            let source = file.display().to_string();
            match self.load_json(&source, &text) {
                Ok(a) => report.merge(a),
                Err(e) => report.failed.push((source, e)),
            }
        }
        Ok(report)
    }
}
