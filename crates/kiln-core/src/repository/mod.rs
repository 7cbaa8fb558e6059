//! Schemas of the remote metadata documents and a few launcher value types.
//!
//! Required fields are required: a document missing one fails to parse
//! instead of being filled with a silent default. Unknown fields are ignored.

pub mod assets;
pub mod fabric_meta;
pub mod fabric_profile;
pub mod java_runner;
pub mod launcher_manifest;
pub mod manifest;
pub mod username;
