//! Deterministic tag colors.
//!
//! # Invariants
//! - The same tag (ignoring case and surrounding whitespace) always maps to
//!   the same color, across runs and processes.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TagColor {
    Indigo,
    Green,
    Yellow,
    Pink,
    Red,
    Blue,
}

impl TagColor {
    pub const PALETTE: [TagColor; 6] = [
        Self::Indigo,
        Self::Green,
        Self::Yellow,
        Self::Pink,
        Self::Red,
        Self::Blue,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Indigo => "indigo",
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Pink => "pink",
            Self::Red => "red",
            Self::Blue => "blue",
        }
    }
}

impl Display for TagColor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u64::from(*byte)).wrapping_mul(FNV_PRIME)
    })
}

/// Color for `tag` without caching.
pub fn color_for_tag(tag: &str) -> TagColor {
    let normalized = tag.trim().to_lowercase();
    let index = fnv1a(normalized.as_bytes()) % TagColor::PALETTE.len() as u64;
    TagColor::PALETTE[index as usize]
}

/// Memoizing wrapper around [`color_for_tag`].
#[derive(Debug, Default)]
pub struct TagPalette {
    assigned: HashMap<String, TagColor>,
}

impl TagPalette {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn color(&mut self, tag: &str) -> TagColor {
        let key = tag.trim().to_lowercase();
        *self
            .assigned
            .entry(key)
            .or_insert_with_key(|key| color_for_tag(key))
    }

    pub fn assigned(&self) -> usize {
        self.assigned.len()
    }
}

#[cfg(test)]
mod tests {
    use super::{color_for_tag, fnv1a, TagPalette};

    #[test]
    fn fnv1a_matches_reference_vectors() {
        assert_eq!(fnv1a(b""), 0xcbf2_9ce4_8422_2325);
        assert_eq!(fnv1a(b"a"), 0xaf63_dc4c_8601_ec8c);
    }

    #[test]
    fn colors_ignore_case_and_are_cached() {
        assert_eq!(color_for_tag("Work"), color_for_tag(" work "));

        let mut palette = TagPalette::new();
        let first = palette.color("Client");
        assert_eq!(palette.color("client"), first);
        assert_eq!(palette.assigned(), 1);
    }
}
