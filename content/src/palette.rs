use serde::Deserialize;
use util::IndexMap;

use crate::{Legend, Parameter};

/// Entry in a palette list.
#[derive(Clone, Eq, PartialEq, Debug, Deserialize)]
#[serde(untagged)]
pub enum PaletteRef {
    Id(String),
    /// Palette named by a parameter value.
    Param { param: String },
}

/// Named reusable bundle of symbol mappings.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct Palette {
    pub id: String,
    pub legend: Legend,
    pub palettes: Vec<PaletteRef>,
    pub parameters: IndexMap<String, Parameter>,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct SerPaletteBody {
    #[serde(flatten)]
    legend: Legend,
    palettes: Vec<PaletteRef>,
    parameters: IndexMap<String, Parameter>,
}

#[derive(Deserialize)]
struct SerPalette {
    id: String,
    #[serde(default)]
    object: Option<SerPaletteBody>,
    #[serde(flatten)]
    body: SerPaletteBody,
}

impl<'de> Deserialize<'de> for Palette {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let SerPalette { id, object, body } =
            SerPalette::deserialize(deserializer)?;
        let body = object.unwrap_or(body);
        body.legend.validate().map_err(serde::de::Error::custom)?;
        Ok(Palette {
            id,
            legend: body.legend,
            palettes: body.palettes,
            parameters: body.parameters,
        })
    }
}
