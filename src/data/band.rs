//! Band triple for RGB composites.

/// Bands shown as the red, green and blue channels of a composite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BandSelection {
    pub red: usize,
    pub green: usize,
    pub blue: usize,
}

impl BandSelection {
    pub fn new(red: usize, green: usize, blue: usize) -> Self {
        Self { red, green, blue }
    }

    /// Indices in red, green, blue order, as `composite` expects them.
    pub fn as_array(&self) -> [usize; 3] {
        [self.red, self.green, self.blue]
    }
}

/// The first three bands.
impl Default for BandSelection {
    fn default() -> Self {
        Self::new(0, 1, 2)
    }
}

impl From<[usize; 3]> for BandSelection {
    fn from([red, green, blue]: [usize; 3]) -> Self {
        Self::new(red, green, blue)
    }
}
