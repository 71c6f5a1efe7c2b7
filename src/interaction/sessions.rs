//! At most one teaching conversation per author and channel.

use std::{
    collections::HashMap,
    sync::{
        Mutex, MutexGuard, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
    time::{Duration, Instant},
};

use log::{debug, warn};
use poise::serenity_prelude::{ChannelId, UserId};

use crate::config::Timeouts;

/// Identifies whose conversation it is and where it happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub author: UserId,
    pub channel: ChannelId,
}

impl SessionKey {
    #[must_use]
    pub fn new(author: UserId, channel: ChannelId) -> Self {
        Self { author, channel }
    }
}

/// In-memory registry of live conversations.
///
/// Entries not renewed within the TTL count as abandoned, so a conversation
/// lost to a crashed task never blocks its author for good.
#[derive(Debug)]
pub struct Sessions {
    active: Mutex<HashMap<SessionKey, Claim>>,
    next_id: AtomicU64,
    ttl: Duration,
}

#[derive(Debug, Clone, Copy)]
struct Claim {
    id: u64,
    started: Instant,
}

impl Sessions {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            active: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(0),
            ttl,
        }
    }

    /// TTL long enough to cover the longest single wait for a reply.
    ///
    /// Conversations renew their claim before every wait, so the number of
    /// prompts does not matter.
    #[must_use]
    pub fn for_timeouts(timeouts: &Timeouts) -> Self {
        Self::new(timeouts.confirm.max(timeouts.teach) + Duration::from_secs(5))
    }

    /// Claim `key` for a new conversation, or `None` if one is already live.
    ///
    /// The claim is released when the returned guard is dropped.
    #[must_use]
    pub fn try_begin(&self, key: SessionKey) -> Option<SessionGuard<'_>> {
        let now = Instant::now();
        let mut active = self.lock();

        if let Some(claim) = active.get(&key) {
            if now.duration_since(claim.started) < self.ttl {
                debug!(
                    "Conversation already live for {} in {}",
                    key.author, key.channel
                );
                return None;
            }
            warn!(
                "Replacing abandoned conversation for {} in {}",
                key.author, key.channel
            );
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        active.insert(key, Claim { id, started: now });
        Some(SessionGuard {
            sessions: self,
            key,
            id,
        })
    }

    /// Returns true while a conversation for `key` is live.
    #[must_use]
    pub fn is_active(&self, key: SessionKey) -> bool {
        self.lock()
            .get(&key)
            .is_some_and(|claim| claim.started.elapsed() < self.ttl)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<SessionKey, Claim>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Releases its session when dropped.
#[derive(Debug)]
pub struct SessionGuard<'a> {
    sessions: &'a Sessions,
    key: SessionKey,
    id: u64,
}

impl SessionGuard<'_> {
    /// Restart the TTL of this claim, unless a newer conversation replaced it.
    pub fn renew(&self) {
        let mut active = self.sessions.lock();
        if let Some(claim) = active.get_mut(&self.key)
            && claim.id == self.id
        {
            claim.started = Instant::now();
        }
    }
}

impl Drop for SessionGuard<'_> {
    fn drop(&mut self) {
        let mut active = self.sessions.lock();
        // A replaced claim belongs to a newer conversation now.
        if active.get(&self.key).is_some_and(|claim| claim.id == self.id) {
            active.remove(&self.key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(author: u64, channel: u64) -> SessionKey {
        SessionKey::new(UserId::new(author), ChannelId::new(channel))
    }

    #[test]
    fn second_claim_for_same_pair_is_rejected() {
        let sessions = Sessions::new(Duration::from_secs(60));
        let guard = sessions.try_begin(key(1, 10));

        assert!(guard.is_some());
        assert!(sessions.is_active(key(1, 10)));
        assert!(sessions.try_begin(key(1, 10)).is_none());
    }

    #[test]
    fn other_pairs_are_independent() {
        let sessions = Sessions::new(Duration::from_secs(60));
        let _first = sessions.try_begin(key(1, 10));

        assert!(sessions.try_begin(key(2, 10)).is_some());
        assert!(sessions.try_begin(key(1, 11)).is_some());
    }

    #[test]
    fn dropping_guard_releases_pair() {
        let sessions = Sessions::new(Duration::from_secs(60));
        drop(sessions.try_begin(key(1, 10)));

        assert!(!sessions.is_active(key(1, 10)));
        assert!(sessions.try_begin(key(1, 10)).is_some());
    }

    #[test]
    fn expired_claim_can_be_replaced() {
        let sessions = Sessions::new(Duration::ZERO);
        let stale = sessions.try_begin(key(1, 10));

        assert!(stale.is_some());
        assert!(!sessions.is_active(key(1, 10)));
        assert!(sessions.try_begin(key(1, 10)).is_some());
    }

    #[test]
    fn renewed_claim_outlives_its_first_ttl() {
        let sessions = Sessions::new(Duration::from_millis(100));
        let guard = sessions.try_begin(key(1, 10)).expect("claim");

        std::thread::sleep(Duration::from_millis(60));
        guard.renew();
        std::thread::sleep(Duration::from_millis(60));

        assert!(sessions.is_active(key(1, 10)));
        assert!(sessions.try_begin(key(1, 10)).is_none());
    }

    #[test]
    fn stale_guard_cannot_renew_newer_claim() {
        let sessions = Sessions::new(Duration::from_millis(100));
        let stale = sessions.try_begin(key(1, 10)).expect("claim");
        std::thread::sleep(Duration::from_millis(110));
        let _fresh = sessions.try_begin(key(1, 10)).expect("replacement");

        std::thread::sleep(Duration::from_millis(60));
        stale.renew();
        std::thread::sleep(Duration::from_millis(60));

        assert!(!sessions.is_active(key(1, 10)));
    }

    #[test]
    fn ttl_covers_longest_wait() {
        let timeouts = Timeouts {
            confirm: Duration::from_secs(30),
            teach: Duration::from_secs(60),
        };
        let sessions = Sessions::for_timeouts(&timeouts);
        assert!(sessions.ttl > timeouts.teach);
        assert!(sessions.ttl > timeouts.confirm);
    }

    #[test]
    fn stale_guard_does_not_release_newer_claim() {
        let sessions = Sessions::new(Duration::from_millis(20));
        let stale = sessions.try_begin(key(1, 10));
        std::thread::sleep(Duration::from_millis(30));

        let fresh = sessions.try_begin(key(1, 10));
        assert!(fresh.is_some());
        drop(stale);
        assert!(sessions.is_active(key(1, 10)));
    }
}
