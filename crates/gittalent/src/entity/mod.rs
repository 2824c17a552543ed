//! SeaORM entity definitions for the profile store.

pub mod developer;
pub mod prelude;
