use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::models::UserResponse;

/// How long a cached profile is served before it is rebuilt from the database.
pub const PROFILE_CACHE_TTL: Duration = Duration::from_secs(60);

/// Process-local cache of `/users/me` responses keyed by user id.
#[derive(Debug)]
pub struct ProfileCache {
    ttl: Duration,
    entries: Mutex<HashMap<i32, (UserResponse, Instant)>>,
}

impl Default for ProfileCache {
    fn default() -> Self {
        Self::new(PROFILE_CACHE_TTL)
    }
}

impl ProfileCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, user_id: i32) -> Option<UserResponse> {
        self.get_at(user_id, Instant::now())
    }

    fn get_at(&self, user_id: i32, now: Instant) -> Option<UserResponse> {
        let mut entries = self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        match entries.get(&user_id) {
            Some((profile, stored_at)) if now.duration_since(*stored_at) < self.ttl => {
                Some(profile.clone())
            }
            Some(_) => {
                entries.remove(&user_id);
                None
            }
            None => None,
        }
    }

    pub fn insert(&self, profile: UserResponse) {
        self.insert_at(profile, Instant::now());
    }

    fn insert_at(&self, profile: UserResponse, now: Instant) {
        let mut entries = self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.insert(profile.id, (profile, now));
    }

    pub fn invalidate(&self, user_id: i32) {
        let mut entries = self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.remove(&user_id);
    }
}
