//! Common types shared by the RFB crates.
//!
//! - [`Color`] - Decoded RGB color with up to 16 bits per channel
//! - [`ColorMap`] - Palette used when the pixel format is not true color

use thiserror::Error;

/// Largest number of palette entries addressable by the protocol (16-bit index).
pub const MAX_COLOR_MAP_ENTRIES: usize = 65_536;

/// A decoded color.
///
/// Channel values are kept in the range of the pixel format they came from
/// (e.g. 0..=31 for a 5-bit channel, 0..=65535 for a palette entry). No
/// scaling to 8 bits is applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Color {
    pub red: u16,
    pub green: u16,
    pub blue: u16,
}

impl Color {
    /// Create a new color.
    pub const fn new(red: u16, green: u16, blue: u16) -> Self {
        Self { red, green, blue }
    }
}

/// Errors raised when updating a [`ColorMap`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorMapError {
    /// The update would write past the last addressable palette index.
    #[error("color map update of {count} entries at index {first} exceeds {MAX_COLOR_MAP_ENTRIES} entries")]
    Overflow { first: u16, count: usize },
}

/// Indexed color table for palette pixel formats.
///
/// The map grows on demand as entries are set. Indices that were never set
/// are absent and lookups for them return `None`; unset holes below the
/// highest set index read as black.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorMap {
    entries: Vec<Color>,
}

impl ColorMap {
    /// Create an empty color map.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Create a color map whose entry `i` is `colors[i]`.
    pub fn from_colors(colors: Vec<Color>) -> Self {
        Self { entries: colors }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no entry has been set.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a palette index.
    pub fn get(&self, index: u32) -> Option<Color> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.entries.get(i))
            .copied()
    }

    /// Overwrite `colors.len()` entries starting at `first`, growing the map as needed.
    pub fn set_entries(&mut self, first: u16, colors: &[Color]) -> Result<(), ColorMapError> {
        let start = first as usize;
        let end = start + colors.len();
        if end > MAX_COLOR_MAP_ENTRIES {
            return Err(ColorMapError::Overflow {
                first,
                count: colors.len(),
            });
        }
        if self.entries.len() < end {
            self.entries.resize(end, Color::default());
        }
        self.entries[start..end].copy_from_slice(colors);
        Ok(())
    }

    /// Iterate over entries in index order.
    pub fn iter(&self) -> impl Iterator<Item = &Color> {
        self.entries.iter()
    }
}
