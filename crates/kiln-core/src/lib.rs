#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_possible_truncation)]
pub mod configs;
pub mod downloads;
pub mod installer;
pub mod launch;
pub mod loaders;
pub mod meta;
pub mod mods;
pub mod profiles;
pub mod repository;

pub mod error;

pub mod fs;
pub mod game_paths;
pub mod maven_data;
pub mod natives;
pub mod platform;

pub mod consts;

pub use consts::*;
pub use error::{Error, ErrorKind};

use sha1::Digest;
pub use uuid::Uuid;

pub fn calculate_sha1(data: impl AsRef<[u8]>) -> String {
    let value = sha1::Sha1::digest(data);
    base16ct::lower::encode_string(&value)
}
