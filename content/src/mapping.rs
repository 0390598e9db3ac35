use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Deserializer};
use util::WeightedList;

use crate::{ListPick, Params};

/// Option of a weighted mapping.
#[derive(Clone, PartialEq, Debug)]
pub struct Choice {
    pub id: String,
    /// Payload that came with the option, kept as is.
    pub extra: Option<serde_json::Value>,
}

/// What a map symbol stands for.
#[derive(Clone, PartialEq, Debug)]
pub enum Mapping {
    Single(String),
    /// Options without weights, see `ListPick`.
    List(Vec<String>),
    Weighted(WeightedList<Choice>),
    /// Value of a mapgen parameter.
    Param {
        param: String,
        fallback: Option<String>,
    },
}

impl Mapping {
    pub fn single(id: impl Into<String>) -> Self {
        Mapping::Single(id.into())
    }

    pub fn weighted<'a>(
        options: impl IntoIterator<Item = (&'a str, u32)>,
    ) -> Self {
        Mapping::Weighted(
            options
                .into_iter()
                .map(|(id, w)| {
                    (
                        Choice {
                            id: id.to_owned(),
                            extra: None,
                        },
                        w,
                    )
                })
                .collect(),
        )
    }

    /// Pick an identifier.
    ///
    /// Returns `None` for a weighted mapping without positive weights and
    /// for a parameter that is neither set nor has a fallback.
    pub fn pick<'a, R: Rng + ?Sized>(
        &'a self,
        rng: &mut R,
        list_pick: ListPick,
        params: &'a Params,
    ) -> Option<&'a str> {
        match self {
            Mapping::Single(id) => Some(id),
            Mapping::List(ids) => match list_pick {
                ListPick::Uniform => ids.choose(rng),
                ListPick::First => ids.first(),
            }
            .map(|a| a.as_str()),
            Mapping::Weighted(list) => list.pick(rng).map(|c| c.id.as_str()),
            Mapping::Param { param, fallback } => {
                params.get(param).or(fallback.as_deref())
            }
        }
    }

    /// The identifier if there is no choice to make.
    pub fn fixed(&self) -> Option<&str> {
        match self {
            Mapping::Single(id) => Some(id),
            Mapping::List(ids) if ids.len() == 1 => Some(&ids[0]),
            Mapping::Weighted(list) => {
                let mut live = list.iter().filter(|(_, w)| *w > 0);
                match (live.next(), live.next()) {
                    (Some((c, _)), None) => Some(&c.id),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    /// All identifiers this mapping can produce.
    pub fn ids(&self) -> Vec<&str> {
        match self {
            Mapping::Single(id) => vec![id],
            Mapping::List(ids) => ids.iter().map(|a| a.as_str()).collect(),
            Mapping::Weighted(list) => {
                list.iter().map(|(c, _)| c.id.as_str()).collect()
            }
            Mapping::Param { fallback, .. } => {
                fallback.iter().map(|a| a.as_str()).collect()
            }
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SerOption {
    Plain(String),
    Weighted((String, u32)),
    WithExtra((String, u32, serde_json::Value)),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SerMapping {
    Single(String),
    Options(Vec<SerOption>),
    Param {
        param: String,
        #[serde(default)]
        fallback: Option<String>,
    },
    Distribution {
        distribution: Vec<SerOption>,
    },
}

fn from_options(options: Vec<SerOption>) -> Mapping {
    if options.iter().all(|a| matches!(a, SerOption::Plain(_))) {
        return Mapping::List(
            options
                .into_iter()
                .filter_map(|a| match a {
                    SerOption::Plain(id) => Some(id),
                    _ => None,
                })
                .collect(),
        );
    }

    Mapping::Weighted(
        options
            .into_iter()
            .map(|a| match a {
                SerOption::Plain(id) => (Choice { id, extra: None }, 1),
                SerOption::Weighted((id, w)) => (Choice { id, extra: None }, w),
                SerOption::WithExtra((id, w, extra)) => (
                    Choice {
                        id,
                        extra: Some(extra),
                    },
                    w,
                ),
            })
            .collect(),
    )
}

impl<'de> Deserialize<'de> for Mapping {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match SerMapping::deserialize(deserializer)? {
            SerMapping::Single(id) => Mapping::Single(id),
            SerMapping::Options(a) | SerMapping::Distribution { distribution: a } => {
                from_options(a)
            }
            SerMapping::Param { param, fallback } => {
                Mapping::Param { param, fallback }
            }
        })
    }
}
