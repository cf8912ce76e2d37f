//! Shared test data: a small master catalog and a matching collection

use crate::catalog::{parse_catalog, Catalog, OwnedCard, OwnedFactorSet};
use crate::custom::OwnedCollection;

const CATALOG_JSON: &str = r#"{
    "scenarios": [
        {
            "scenarioId": "scn_ura",
            "name": "URA Finals",
            "goldenSkills": [{"choices": ["skill_ultimate"]}],
            "skills": [{"skillId": "skill_ura_spirit", "level": 3}]
        }
    ],
    "skills": [
        {"skillId": "skill_corner", "name": "Corner Recovery", "category": "common", "upgradeType": "normal", "effectType": "heal"},
        {"skillId": "skill_straight", "name": "Straightaway Adept", "category": "distance", "upgradeType": "normal", "effectType": "normal"},
        {"skillId": "skill_arc", "name": "Arc Maestro", "category": "common", "upgradeType": "gold", "effectType": "heal"},
        {"skillId": "skill_focus", "name": "Concentration", "category": "common", "upgradeType": "gold", "effectType": "passive"},
        {"skillId": "skill_front", "name": "Front Runner Savvy", "category": "style", "upgradeType": "normal", "effectType": "passive"},
        {"skillId": "skill_glare", "name": "Intimidate", "category": "common", "upgradeType": "normal", "effectType": "debuff"},
        {"skillId": "skill_hymn", "name": "Victory Hymn", "category": "common", "isUnique": true},
        {"skillId": "skill_cut", "name": "Cut and Drive", "category": "common", "isUnique": true},
        {"skillId": "skill_ura_spirit", "name": "URA Spirit", "category": "common", "upgradeType": "normal", "effectType": "normal"},
        {"skillId": "skill_ultimate", "name": "Ultimate Drive", "category": "common", "upgradeType": "gold", "effectType": "normal"}
    ],
    "supportCards": [
        {
            "masterCardId": "sc_kitasan",
            "name": "Kitasan Black",
            "goldenSkills": [{"choices": ["skill_focus"]}],
            "hintSkills": ["skill_corner", "skill_straight"],
            "eventSkills": ["skill_front"],
            "levelMapping": {"0": 1, "1": 2, "2": 3, "3": 4, "4": 5}
        },
        {
            "masterCardId": "sc_fine",
            "name": "Fine Motion",
            "hintSkills": ["skill_glare"],
            "eventSkills": ["skill_corner", "skill_missing"],
            "levelMapping": {"0": 1, "4": 5}
        }
    ],
    "inzaCharacters": [
        {
            "masterInzaId": "inza_vodka",
            "name": "Vodka Line",
            "slots": {
                "parent": {
                    "name": "Vodka",
                    "uniqueSkillId": "skill_cut",
                    "greenFactor": {"skillName": "Victory Hymn", "stars": 2},
                    "skillFactors": ["skill_corner"]
                },
                "grandparent1": {
                    "name": "Daiwa Scarlet",
                    "greenFactor": {"skillId": "skill_straight", "stars": 3},
                    "skillFactors": ["skill_glare"]
                }
            }
        }
    ]
}"#;

pub fn catalog() -> Catalog {
    parse_catalog(CATALOG_JSON).unwrap()
}

pub fn owned() -> OwnedCollection {
    OwnedCollection {
        support_cards: vec![
            OwnedCard {
                id: "user_sc_kita".into(),
                template_id: "sc_kitasan".into(),
                name: "Kitasan Black".into(),
                level: 4,
                hint_level: None,
            },
            OwnedCard {
                id: "user_sc_fine".into(),
                template_id: "sc_fine".into(),
                name: "Fine Motion".into(),
                level: 2,
                hint_level: None,
            },
            OwnedCard {
                id: "user_sc_ghost".into(),
                template_id: "sc_deleted".into(),
                name: "Ghost".into(),
                level: 0,
                hint_level: None,
            },
        ],
        inza_characters: vec![OwnedFactorSet {
            id: "user_inza_vodka".into(),
            template_id: "inza_vodka".into(),
            name: "Vodka Line".into(),
        }],
    }
}
