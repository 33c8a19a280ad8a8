//! Internal helpers for serde shapes and numeric formatting.

pub(crate) mod numeric;
pub(crate) mod serde;
