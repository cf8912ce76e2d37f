//! Breakthrough and hint level of an owned support card

use crate::catalog::{Lookup, OwnedCard, MAX_BREAKTHROUGH};

/// Hint level shown when a master card's mapping has no entry for a level
const DEFAULT_MAPPED_HINT_LEVEL: u8 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardLevelInfo {
    pub text: String,
    pub hint_level: u8,
}

/// Work out the hint level an owned card trains at, plus a display line
/// like `Breakthrough 4 (Full), Hint Lv.5`
pub fn card_level_info(card: &OwnedCard, lookup: &Lookup) -> CardLevelInfo {
    let template = lookup.support_card(&card.template_id);
    let hint_level = match template {
        Some(t) if t.level_mapping.is_some() => t
            .level_mapping
            .as_ref()
            .and_then(|mapping| mapping.get(&card.level).copied())
            .unwrap_or(DEFAULT_MAPPED_HINT_LEVEL),
        Some(t) if t.is_custom => t.hint_level.unwrap_or(0),
        _ => card.hint_level.unwrap_or(0),
    };

    let mut text = format!("Breakthrough {}", card.level);
    if card.level == MAX_BREAKTHROUGH {
        text.push_str(" (Full)");
    } else if card.level == 0 {
        text.push_str(" (Base)");
    }
    if hint_level > 0 {
        text.push_str(&format!(", Hint Lv.{hint_level}"));
    }

    CardLevelInfo { text, hint_level }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::custom::{CardDraft, CustomData, OwnedCollection};
    use crate::fixtures;

    #[test]
    fn test_master_card_uses_mapping() {
        let master = fixtures::catalog();
        let custom = CustomData::default();
        let lookup = Lookup::new(&master, &custom);
        let owned = fixtures::owned();

        let kita = card_level_info(owned.card("user_sc_kita").unwrap(), &lookup);
        assert_eq!(kita.hint_level, 5);
        assert_eq!(kita.text, "Breakthrough 4 (Full), Hint Lv.5");

        // Fine Motion maps only 0 and 4
        let fine = card_level_info(owned.card("user_sc_fine").unwrap(), &lookup);
        assert_eq!(fine.hint_level, 1);
        assert_eq!(fine.text, "Breakthrough 2, Hint Lv.1");
    }

    #[test]
    fn test_custom_card_uses_fixed_level() {
        let master = fixtures::catalog();
        let mut custom = CustomData::default();
        let mut owned = OwnedCollection::default();
        let id = custom
            .create_card(&master, &mut owned, CardDraft { name: "Mine".into(), hint_level: 3, ..Default::default() })
            .unwrap();
        let lookup = Lookup::new(&master, &custom);
        let info = card_level_info(owned.card(&id).unwrap(), &lookup);
        assert_eq!(info.hint_level, 3);
        assert_eq!(info.text, "Breakthrough 4 (Full), Hint Lv.3");
    }

    #[test]
    fn test_unresolved_template_falls_back_to_instance() {
        let master = fixtures::catalog();
        let custom = CustomData::default();
        let lookup = Lookup::new(&master, &custom);
        let owned = fixtures::owned();

        let ghost = card_level_info(owned.card("user_sc_ghost").unwrap(), &lookup);
        assert_eq!(ghost.hint_level, 0);
        assert_eq!(ghost.text, "Breakthrough 0 (Base)");

        let mut stored = owned.card("user_sc_ghost").unwrap().clone();
        stored.hint_level = Some(2);
        assert_eq!(card_level_info(&stored, &lookup).hint_level, 2);
    }
}
