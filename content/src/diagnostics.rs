use std::fmt;

use util::IndexSet;

/// Things that went missing while generating.
///
/// None of these stop generation, the affected cells fall back to
/// defaults.
#[derive(Clone, Default, Eq, PartialEq, Debug)]
pub struct Diagnostics {
    /// Symbols in the rows that no table maps.
    pub unmapped_symbols: IndexSet<char>,
    pub missing_chunks: IndexSet<String>,
    pub unknown_terrain: IndexSet<String>,
    pub unknown_furniture: IndexSet<String>,
    pub unknown_traps: IndexSet<String>,
    pub unknown_fields: IndexSet<String>,
    pub missing_palettes: IndexSet<String>,
    pub missing_params: IndexSet<String>,
    /// Nested chunks skipped for going too deep.
    pub depth_limit_hits: usize,
}

impl Diagnostics {
    pub fn is_clean(&self) -> bool {
        self == &Diagnostics::default()
    }

    pub fn merge(&mut self, other: Diagnostics) {
        self.unmapped_symbols.extend(other.unmapped_symbols);
        self.missing_chunks.extend(other.missing_chunks);
        self.unknown_terrain.extend(other.unknown_terrain);
        self.unknown_furniture.extend(other.unknown_furniture);
        self.unknown_traps.extend(other.unknown_traps);
        self.unknown_fields.extend(other.unknown_fields);
        self.missing_palettes.extend(other.missing_palettes);
        self.missing_params.extend(other.missing_params);
        self.depth_limit_hits += other.depth_limit_hits;
    }
}

fn list<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    label: &str,
    items: &IndexSet<T>,
) -> fmt::Result {
    if items.is_empty() {
        return Ok(());
    }
    write!(f, "{label}:")?;
    for a in items {
        write!(f, " {a}")?;
    }
    writeln!(f)
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbols: IndexSet<String> =
            self.unmapped_symbols.iter().map(|c| format!("{c:?}")).collect();
        list(f, "unmapped symbols", &symbols)?;
        list(f, "missing chunks", &self.missing_chunks)?;
        list(f, "unknown terrain", &self.unknown_terrain)?;
        list(f, "unknown furniture", &self.unknown_furniture)?;
        list(f, "unknown traps", &self.unknown_traps)?;
        list(f, "unknown fields", &self.unknown_fields)?;
        list(f, "missing palettes", &self.missing_palettes)?;
        list(f, "missing parameters", &self.missing_params)?;
        if self.depth_limit_hits > 0 {
            writeln!(f, "nesting depth limit hit {} times", self.depth_limit_hits)?;
        }
        Ok(())
    }
}
