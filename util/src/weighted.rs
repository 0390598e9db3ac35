use rand::Rng;

/// Ordered list of options with integer weights.
///
/// Picking uses cumulative weights: a draw `r` is taken from `1..=total` and
/// the first option whose running weight sum meets or exceeds `r` is chosen.
/// Zero-weight options are never picked. Integer weights keep the choice
/// free of platform-dependent rounding.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WeightedList<T> {
    entries: Vec<(T, u32)>,
    total: u64,
}

impl<T> Default for WeightedList<T> {
    fn default() -> Self {
        WeightedList {
            entries: Default::default(),
            total: 0,
        }
    }
}

impl<T> WeightedList<T> {
    pub fn push(&mut self, item: T, weight: u32) {
        self.total += weight as u64;
        self.entries.push((item, weight));
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&T, u32)> + '_ {
        self.entries.iter().map(|(a, w)| (a, *w))
    }

    /// Pick with an explicit draw value in `1..=total`.
    ///
    /// Draws past the total fall back to the last option with nonzero
    /// weight.
    pub fn pick_at(&self, draw: u64) -> Option<&T> {
        if self.total == 0 {
            return None;
        }

        let mut acc = 0;
        let mut last = None;
        for (item, weight) in &self.entries {
            if *weight == 0 {
                continue;
            }
            acc += *weight as u64;
            last = Some(item);
            if acc >= draw {
                return Some(item);
            }
        }
        last
    }

    /// Pick a random option, `None` if the list has no positive weight.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&T> {
        if self.total == 0 {
            return None;
        }
        self.pick_at(rng.gen_range(1..=self.total))
    }
}

impl<T> FromIterator<(T, u32)> for WeightedList<T> {
    fn from_iter<I: IntoIterator<Item = (T, u32)>>(iter: I) -> Self {
        let mut ret = WeightedList::default();
        for (item, weight) in iter {
            ret.push(item, weight);
        }
        ret
    }
}
