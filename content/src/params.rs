use rand::Rng;
use serde::Deserialize;
use util::IndexMap;

use crate::{ListPick, Mapping};

/// Declared mapgen or palette parameter.
#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct Parameter {
    /// Content type of the value, such as `palette_id`.
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub default: Option<Mapping>,
}

/// Concrete parameter values by name.
#[derive(Clone, Default, Eq, PartialEq, Debug)]
pub struct Params(IndexMap<String, String>);

impl Params {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(|a| a.as_str())
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Fill in declared parameters whose default leaves no choice.
    ///
    /// Values already set are kept.
    pub fn with_fixed_defaults(
        &self,
        declared: &IndexMap<String, Parameter>,
    ) -> Params {
        let mut ret = self.clone();
        for (name, param) in declared {
            if ret.0.contains_key(name) {
                continue;
            }
            if let Some(value) =
                param.default.as_ref().and_then(|a| a.fixed())
            {
                ret.set(name.clone(), value);
            }
        }
        ret
    }

    /// Fill in every declared parameter that has a default, drawing from
    /// defaults with several options.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        declared: &IndexMap<String, Parameter>,
        rng: &mut R,
        list_pick: ListPick,
    ) -> Params {
        let mut ret = self.clone();
        for (name, param) in declared {
            if ret.0.contains_key(name) {
                continue;
            }
            let Some(default) = &param.default else {
                continue;
            };
            if let Some(value) = default.pick(rng, list_pick, self) {
                let value = value.to_owned();
                ret.set(name.clone(), value);
            }
        }
        ret
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Params(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use util::srng;

    fn declared(json: &str) -> IndexMap<String, Parameter> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn defaults() {
        let decl = declared(
            r#"{
                "roof": {"type": "palette_id", "default": "roof_flat"},
                "style": {
                    "type": "palette_id",
                    "default": {"distribution": [["brick", 1], ["wood", 1]]}
                },
                "bare": {"type": "palette_id"}
            }"#,
        );

        let fixed = Params::default().with_fixed_defaults(&decl);
        assert_eq!(fixed.get("roof"), Some("roof_flat"));
        assert_eq!(fixed.get("style"), None);
        assert_eq!(fixed.get("bare"), None);

        let sampled = Params::default().sample(
            &decl,
            &mut srng("params"),
            ListPick::Uniform,
        );
        assert_eq!(sampled.get("roof"), Some("roof_flat"));
        assert!(matches!(sampled.get("style"), Some("brick" | "wood")));

        let explicit: Params = [("roof", "roof_tin")].into_iter().collect();
        assert_eq!(
            explicit.with_fixed_defaults(&decl).get("roof"),
            Some("roof_tin")
        );
    }
}
