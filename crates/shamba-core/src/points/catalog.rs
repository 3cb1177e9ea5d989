//! Fixed reward catalog
//!
//! Redemptions reference rewards by 1-based position, so the order here
//! is part of the conversational contract and must not change.

/// One redeemable catalog entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reward {
    /// Display name
    pub name: &'static str,
    /// Point cost
    pub cost: u32,
    /// Display glyph
    pub emoji: &'static str,
}

const CATALOG: &[Reward] = &[
    Reward {
        name: "Organic Seeds",
        cost: 500,
        emoji: "\u{1f331}",
    },
    Reward {
        name: "Weather Station",
        cost: 1000,
        emoji: "\u{1f4f1}",
    },
    Reward {
        name: "Farming Course",
        cost: 750,
        emoji: "\u{1f393}",
    },
];

/// The static, ordered reward catalog.
pub fn reward_catalog() -> &'static [Reward] {
    CATALOG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_has_three_entries_in_order() {
        let catalog = reward_catalog();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog[0].name, "Organic Seeds");
        assert_eq!(catalog[1].cost, 1000);
        assert_eq!(catalog[2].name, "Farming Course");
    }
}
