use std::{collections::HashSet, sync::Arc};

use parking_lot::Mutex;

pub(crate) type ActiveSet = Arc<Mutex<HashSet<String>>>;

/// Marks a profile as being installed until dropped.
#[derive(Debug)]
pub struct FlightGuard {
    active: ActiveSet,
    profile: String,
}

impl FlightGuard {
    /// Returns `None` while another guard for `profile` is alive.
    pub(crate) fn acquire(active: &ActiveSet, profile: &str) -> Option<Self> {
        active.lock().insert(profile.to_owned()).then(|| Self {
            active: active.clone(),
            profile: profile.to_owned(),
        })
    }
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        self.active.lock().remove(&self.profile);
    }
}
