/// A named array length, shared by every variable and mesh that references it.
///
/// Most dimensions have a single length. A dimension may instead carry one
/// length per timestep (e.g. a ragged unstructured node count), in which case
/// it is considered time-varying.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dimension {
    name: String,
    lengths: Vec<usize>,
}

impl Dimension {
    pub fn new<S: Into<String>>(name: S, length: usize) -> Self {
        Self {
            name: name.into(),
            lengths: vec![length],
        }
    }

    /// A dimension whose length varies over time, one entry per timestep.
    pub fn time_varying<S: Into<String>>(name: S, lengths: Vec<usize>) -> Self {
        Self {
            name: name.into(),
            lengths,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The first length entry, or 0 for a degenerate dimension with none.
    pub fn length(&self) -> usize {
        self.length_at(0)
    }

    /// The length at `index`. Out-of-range queries return 0 rather than
    /// failing.
    pub fn length_at(&self, index: usize) -> usize {
        self.lengths.get(index).copied().unwrap_or(0)
    }

    pub fn lengths(&self) -> &[usize] {
        &self.lengths
    }

    /// True iff the dimension carries more than one length entry.
    pub fn is_time_varying(&self) -> bool {
        self.lengths.len() > 1
    }
}
