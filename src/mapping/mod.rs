//! Reconciles spreadsheet naming with document identifiers.

pub mod key;
pub mod stat;
pub mod weapon;

pub use key::StatKey;
pub use stat::{find_stat_value, NameMapping, StatTarget};
pub use weapon::{MatchRule, WeaponMatch, WeaponResolver};
