pub(crate) mod developer;
pub(crate) mod github;
pub(crate) mod meta;
pub(crate) mod migrate;
pub(crate) mod shared;
pub(crate) mod sync;
