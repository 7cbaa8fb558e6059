use std::process::ExitStatus;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("No such profile `{0}`\nRun `kiln profiles list` to see existing profiles")]
    NoSuchProfile(String),

    #[error("Profile `{profile}` has no mod `{name}`")]
    NoSuchMod { profile: String, name: String },

    #[error("The game exited with {0}")]
    GameExited(ExitStatus),
}
