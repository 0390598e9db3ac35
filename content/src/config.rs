use serde::{Deserialize, Serialize};

/// How to pick from a list of options that has no weights.
#[derive(Copy, Clone, Default, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ListPick {
    /// Every option is equally likely.
    #[default]
    Uniform,
    /// Always use the first option.
    First,
}

/// Generator tuning knobs.
#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct GenConfig {
    /// How many levels deep nested chunks may go.
    pub max_depth: u32,
    pub list_pick: ListPick,
}

impl Default for GenConfig {
    fn default() -> Self {
        GenConfig {
            max_depth: 8,
            list_pick: Default::default(),
        }
    }
}
