//! Player color palette

use serde::{Deserialize, Serialize};

/// Fixed set of colors a player card can be tagged with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerColor {
    Sage,
    Lavender,
    Peach,
    Mint,
    Sky,
    Coral,
}

impl PlayerColor {
    /// Palette order, also the order used when picking a color for a new player
    pub const ALL: [PlayerColor; 6] = [
        PlayerColor::Sage,
        PlayerColor::Lavender,
        PlayerColor::Peach,
        PlayerColor::Mint,
        PlayerColor::Sky,
        PlayerColor::Coral,
    ];

    /// Display value for renderers
    pub fn hex(&self) -> &'static str {
        match self {
            PlayerColor::Sage => "#94A3B8",
            PlayerColor::Lavender => "#A78BFA",
            PlayerColor::Peach => "#FCA5A5",
            PlayerColor::Mint => "#86EFAC",
            PlayerColor::Sky => "#7DD3FC",
            PlayerColor::Coral => "#FDA4AF",
        }
    }

    /// First palette entry not in `in_use`, or the first entry once the palette is exhausted
    pub fn first_unused<'a, I>(in_use: I) -> PlayerColor
    where
        I: IntoIterator<Item = &'a PlayerColor>,
    {
        let taken: Vec<PlayerColor> = in_use.into_iter().copied().collect();
        Self::ALL
            .iter()
            .copied()
            .find(|color| !taken.contains(color))
            .unwrap_or(PlayerColor::Sage)
    }
}
