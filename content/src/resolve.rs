use std::{borrow::Cow, ops::Deref};

use util::IndexMap;

use crate::{Legend, Mapgen, PaletteRef, Parameter, Params, Registry};

/// Mapgen with its palettes merged into its own legend.
#[derive(Clone, PartialEq, Debug)]
pub struct Resolved<'a> {
    mapgen: Cow<'a, Mapgen>,
    /// Palette ids that were referenced but not found.
    pub missing_palettes: Vec<String>,
    /// Parameters used for palette references that had no value.
    pub missing_params: Vec<String>,
}

impl<'a> Resolved<'a> {
    /// Treat a mapgen as already resolved.
    pub fn borrowed(mapgen: &'a Mapgen) -> Self {
        Resolved {
            mapgen: Cow::Borrowed(mapgen),
            missing_palettes: Default::default(),
            missing_params: Default::default(),
        }
    }

    pub fn is_borrowed(&self) -> bool {
        matches!(self.mapgen, Cow::Borrowed(_))
    }

    pub fn into_owned(self) -> Resolved<'static> {
        Resolved {
            mapgen: Cow::Owned(self.mapgen.into_owned()),
            missing_palettes: self.missing_palettes,
            missing_params: self.missing_params,
        }
    }
}

impl Deref for Resolved<'_> {
    type Target = Mapgen;

    fn deref(&self) -> &Self::Target {
        &self.mapgen
    }
}

/// Merge a mapgen's palettes into its legend.
///
/// The mapgen's own mappings always win. After that the palettes are
/// applied in the order they are listed, each one followed by the
/// palettes it references, and a symbol only gets its mapping from the
/// first palette that has one. Missing palettes and parameters are
/// skipped.
pub fn resolve<'a>(mapgen: &'a Mapgen, registry: &Registry) -> Resolved<'a> {
    resolve_with(mapgen, registry, &Params::default())
}

/// Resolve with explicit values for palette parameters.
pub fn resolve_with<'a>(
    mapgen: &'a Mapgen,
    registry: &Registry,
    params: &Params,
) -> Resolved<'a> {
    if mapgen.palettes.is_empty() {
        return Resolved::borrowed(mapgen);
    }

    let mut walk = Walk {
        registry,
        legend: mapgen.legend.clone(),
        chain: Vec::new(),
        missing_palettes: Vec::new(),
        missing_params: Vec::new(),
    };
    walk.merge(
        &mapgen.palettes,
        &params.with_fixed_defaults(&mapgen.parameters),
    );

    let mut ret = mapgen.clone();
    ret.legend = walk.legend;
    Resolved {
        mapgen: Cow::Owned(ret),
        missing_palettes: walk.missing_palettes,
        missing_params: walk.missing_params,
    }
}

struct Walk<'r> {
    registry: &'r Registry,
    legend: Legend,
    /// Palettes being expanded, to stop reference cycles.
    chain: Vec<&'r str>,
    missing_palettes: Vec<String>,
    missing_params: Vec<String>,
}

impl<'r> Walk<'r> {
    fn merge(&mut self, refs: &[PaletteRef], params: &Params) {
        for r in refs {
            let id = match r {
                PaletteRef::Id(id) => id.as_str(),
                PaletteRef::Param { param } => match params.get(param) {
                    Some(id) => id,
                    None => {
                        log::debug!("no value for palette parameter {param}");
                        self.missing_params.push(param.clone());
                        continue;
                    }
                },
            };

            let Some(palette) = self.registry.get_palette_by_id(id) else {
                log::debug!("palette {id} not found");
                self.missing_palettes.push(id.to_owned());
                continue;
            };

            if self.chain.contains(&palette.id.as_str()) {
                log::debug!("palette {id} references itself");
                continue;
            }

            self.legend.merge_absent(&palette.legend);

            if !palette.palettes.is_empty() {
                self.chain.push(&palette.id);
                let params = inherit(params, &palette.parameters);
                self.merge(&palette.palettes, &params);
                self.chain.pop();
            }
        }
    }
}

fn inherit(params: &Params, declared: &IndexMap<String, Parameter>) -> Params {
    if declared.is_empty() {
        params.clone()
    } else {
        params.with_fixed_defaults(declared)
    }
}
