// Badge catalog and lineup synergies

pub mod catalog;
pub mod synergy;

pub use catalog::{
    BadgeCatalog, BadgeCategory, BadgeDefinition, BadgeEffect, BadgeRequirement, BadgeSynergy,
    SynergyEffect, SynergyScope,
};
pub use synergy::{ActivatedSynergy, ActiveEffects, BadgeSynergyEngine, ModifierSet, SynergyCache};
