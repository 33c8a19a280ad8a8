//! Transform adapters from upstream API shapes into pipeline entities.

pub(crate) mod drug;
pub(crate) mod gene;
pub(crate) mod network;
pub(crate) mod pathway;
