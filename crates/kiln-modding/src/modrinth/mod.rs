//! Modrinth v2 API.

pub mod registry;
pub mod search;
pub mod version;
