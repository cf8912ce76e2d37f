//! User-authored entities
//!
//! Custom skills, cards and factor sets, the owned collection, export
//! bundles and the import merge.

pub mod ids;
pub mod store;
pub mod bundle;
pub mod merge;

pub use store::{
    CustomData, OwnedCollection, CustomEntity, EntityKind, StoreError, CascadeReport,
    SkillDraft, CardDraft, FactorSlotDraft, FactorSetDraft, CUSTOM_HINT_LEVELS,
};

pub use bundle::{
    Bundle, IndividualItem, Dependencies, ImportError,
    parse_bundle, export_item, export_all, kind_from_wire,
};

pub use merge::{
    ConflictResolver, EntityRef, FixedResolver, MergeStats, Resolution, merge_import,
};
