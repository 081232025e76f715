use std::fmt;
use std::str::FromStr;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::error::InputError;

/// Shirt colors offered to the user, declared in catalog order.
///
/// `Ord` follows declaration order, so sorting a selection yields catalog order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ShirtColor {
    Black,
    Pepper,
    White,
    Ivory,
    Yam,
    Moss,
    Denim,
    #[serde(rename = "Blue Jean")]
    BlueJean,
    Blossom,
    Crunchberry,
}

pub const CATALOG: [ShirtColor; 10] = [
    ShirtColor::Black,
    ShirtColor::Pepper,
    ShirtColor::White,
    ShirtColor::Ivory,
    ShirtColor::Yam,
    ShirtColor::Moss,
    ShirtColor::Denim,
    ShirtColor::BlueJean,
    ShirtColor::Blossom,
    ShirtColor::Crunchberry,
];

impl ShirtColor {
    pub fn name(self) -> &'static str {
        match self {
            ShirtColor::Black => "Black",
            ShirtColor::Pepper => "Pepper",
            ShirtColor::White => "White",
            ShirtColor::Ivory => "Ivory",
            ShirtColor::Yam => "Yam",
            ShirtColor::Moss => "Moss",
            ShirtColor::Denim => "Denim",
            ShirtColor::BlueJean => "Blue Jean",
            ShirtColor::Blossom => "Blossom",
            ShirtColor::Crunchberry => "Crunchberry",
        }
    }

    /// Swatch color shown next to the name.
    pub fn hex(self) -> &'static str {
        match self {
            ShirtColor::Black => "#1a1a1a",
            ShirtColor::Pepper => "#424242",
            ShirtColor::White => "#ffffff",
            ShirtColor::Ivory => "#f8f4e7",
            ShirtColor::Yam => "#E07C44",
            ShirtColor::Moss => "#5A6349",
            ShirtColor::Denim => "#6F8FAF",
            ShirtColor::BlueJean => "#5D83A8",
            ShirtColor::Blossom => "#F9D0E0",
            ShirtColor::Crunchberry => "#F25278",
        }
    }

    pub fn rgb(self) -> [u8; 3] {
        let hex = self.hex().trim_start_matches('#');
        let channel = |idx: usize| u8::from_str_radix(&hex[idx..idx + 2], 16).unwrap_or(0);
        [channel(0), channel(2), channel(4)]
    }

    pub fn is_dark(self) -> bool {
        matches!(
            self,
            ShirtColor::Black
                | ShirtColor::Pepper
                | ShirtColor::Moss
                | ShirtColor::Denim
                | ShirtColor::BlueJean
        )
    }

    /// Lowercase, dash-separated form used in file names (`blue-jean`).
    pub fn slug(self) -> String {
        self.name()
            .split_whitespace()
            .map(str::to_ascii_lowercase)
            .collect::<Vec<String>>()
            .join("-")
    }

    pub fn catalog_index(self) -> usize {
        CATALOG
            .iter()
            .position(|candidate| *candidate == self)
            .unwrap_or(CATALOG.len())
    }
}

impl fmt::Display for ShirtColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ShirtColor {
    type Err = InputError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw
            .trim()
            .split(|ch: char| ch.is_whitespace() || ch == '-' || ch == '_')
            .filter(|part| !part.is_empty())
            .map(str::to_ascii_lowercase)
            .collect::<Vec<String>>()
            .join("-");
        CATALOG
            .iter()
            .copied()
            .find(|color| color.slug() == normalized)
            .ok_or_else(|| InputError::UnknownColor(raw.trim().to_string()))
    }
}

/// Colors the user has ticked, in the order they were ticked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorSelection {
    colors: IndexSet<ShirtColor>,
}

impl ColorSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `color` if absent, removes it otherwise. Returns whether it is now selected.
    pub fn toggle(&mut self, color: ShirtColor) -> bool {
        if self.colors.shift_remove(&color) {
            false
        } else {
            self.colors.insert(color);
            true
        }
    }

    pub fn select_all(&mut self) {
        self.colors = CATALOG.iter().copied().collect();
    }

    pub fn clear(&mut self) {
        self.colors.clear();
    }

    pub fn contains(&self, color: ShirtColor) -> bool {
        self.colors.contains(&color)
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = ShirtColor> + '_ {
        self.colors.iter().copied()
    }

    /// Members re-ordered to match the catalog, independent of selection order.
    pub fn sorted(&self) -> Vec<ShirtColor> {
        let mut colors: Vec<ShirtColor> = self.colors.iter().copied().collect();
        colors.sort_by_key(|color| color.catalog_index());
        colors
    }
}

impl FromIterator<ShirtColor> for ColorSelection {
    fn from_iter<I: IntoIterator<Item = ShirtColor>>(iter: I) -> Self {
        Self {
            colors: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ColorSelection, ShirtColor, CATALOG};

    #[test]
    fn catalog_has_ten_distinct_colors_in_declared_order() {
        assert_eq!(CATALOG.len(), 10);
        for (idx, color) in CATALOG.iter().enumerate() {
            assert_eq!(color.catalog_index(), idx);
        }
        let mut sorted = CATALOG.to_vec();
        sorted.sort();
        assert_eq!(sorted, CATALOG.to_vec());
    }

    #[test]
    fn parse_accepts_names_and_slugs() {
        assert_eq!("Blue Jean".parse::<ShirtColor>().ok(), Some(ShirtColor::BlueJean));
        assert_eq!("blue-jean".parse::<ShirtColor>().ok(), Some(ShirtColor::BlueJean));
        assert_eq!("  CRUNCHBERRY ".parse::<ShirtColor>().ok(), Some(ShirtColor::Crunchberry));
        let err = "Magenta".parse::<ShirtColor>().err().map(|err| err.to_string());
        assert_eq!(err.as_deref(), Some("unknown shirt color 'Magenta'"));
    }

    #[test]
    fn slug_and_rgb_derive_from_catalog_entry() {
        assert_eq!(ShirtColor::BlueJean.slug(), "blue-jean");
        assert_eq!(ShirtColor::Yam.rgb(), [0xE0, 0x7C, 0x44]);
        assert!(ShirtColor::Moss.is_dark());
        assert!(!ShirtColor::Ivory.is_dark());
    }

    #[test]
    fn sorted_follows_catalog_not_selection_order() {
        let mut selection = ColorSelection::new();
        selection.toggle(ShirtColor::White);
        selection.toggle(ShirtColor::Black);
        assert_eq!(
            selection.iter().collect::<Vec<_>>(),
            vec![ShirtColor::White, ShirtColor::Black]
        );
        assert_eq!(selection.sorted(), vec![ShirtColor::Black, ShirtColor::White]);

        let reversed: ColorSelection = CATALOG.iter().rev().copied().collect();
        assert_eq!(reversed.sorted(), CATALOG.to_vec());
    }

    #[test]
    fn toggling_twice_restores_selection() {
        let mut selection: ColorSelection = [ShirtColor::Moss, ShirtColor::Yam].into_iter().collect();
        let before = selection.clone();

        assert!(selection.toggle(ShirtColor::Denim));
        assert!(!selection.toggle(ShirtColor::Denim));
        assert_eq!(selection, before);

        assert!(!selection.toggle(ShirtColor::Moss));
        assert!(selection.toggle(ShirtColor::Moss));
        assert_eq!(selection.sorted(), before.sorted());
    }

    #[test]
    fn select_all_and_clear() {
        let mut selection = ColorSelection::new();
        selection.select_all();
        assert_eq!(selection.len(), 10);
        assert!(selection.contains(ShirtColor::Blossom));
        selection.clear();
        assert!(selection.is_empty());
    }
}
