//! Bounded in-process cache tier.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::domain::entities::ShortLink;

struct Entry {
    link: ShortLink,
    inserted_at: Instant,
}

/// Fixed-capacity map with insertion-order (FIFO) eviction and a short TTL.
///
/// Eviction deliberately ignores recency: when full, the oldest-inserted
/// entry is dropped even if it was just read. Re-setting an existing key
/// refreshes the value and TTL but keeps its original eviction position.
///
/// Interior mutability behind a single mutex; operations are short map
/// manipulations, so contention stays negligible next to the I/O this tier
/// avoids. Constructed once and injected; there is no global instance.
pub struct LocalTier {
    inner: Mutex<LocalTierInner>,
    capacity: usize,
    ttl: Duration,
}

struct LocalTierInner {
    entries: HashMap<String, Entry>,
    insertion_order: VecDeque<String>,
}

impl LocalTier {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            inner: Mutex::new(LocalTierInner {
                entries: HashMap::with_capacity(capacity),
                insertion_order: VecDeque::with_capacity(capacity),
            }),
            capacity: capacity.max(1),
            ttl,
        }
    }

    /// Returns the cached record if present and unexpired. An expired entry
    /// is removed so the caller falls through to the shared tier.
    pub fn get(&self, code: &str) -> Option<ShortLink> {
        let mut inner = self.inner.lock().expect("local cache mutex poisoned");

        let expired = match inner.entries.get(code) {
            Some(entry) if entry.inserted_at.elapsed() < self.ttl => {
                return Some(entry.link.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            inner.entries.remove(code);
            inner.insertion_order.retain(|k| k != code);
        }
        None
    }

    pub fn set(&self, code: &str, link: &ShortLink) {
        let mut inner = self.inner.lock().expect("local cache mutex poisoned");

        if inner.entries.contains_key(code) {
            inner.entries.insert(
                code.to_string(),
                Entry {
                    link: link.clone(),
                    inserted_at: Instant::now(),
                },
            );
            return;
        }

        while inner.entries.len() >= self.capacity {
            let Some(oldest) = inner.insertion_order.pop_front() else {
                break;
            };
            inner.entries.remove(&oldest);
        }

        inner.insertion_order.push_back(code.to_string());
        inner.entries.insert(
            code.to_string(),
            Entry {
                link: link.clone(),
                inserted_at: Instant::now(),
            },
        );
    }

    pub fn invalidate(&self, code: &str) {
        let mut inner = self.inner.lock().expect("local cache mutex poisoned");
        if inner.entries.remove(code).is_some() {
            inner.insertion_order.retain(|k| k != code);
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.inner.lock().unwrap().entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::short_link::test_link;

    #[test]
    fn test_get_returns_inserted_entry() {
        let tier = LocalTier::new(10, Duration::from_secs(60));
        tier.set("abc1234", &test_link("abc1234"));

        let hit = tier.get("abc1234").unwrap();
        assert_eq!(hit.short_code, "abc1234");
    }

    #[test]
    fn test_eviction_drops_oldest_inserted() {
        let tier = LocalTier::new(2, Duration::from_secs(60));
        tier.set("first00", &test_link("first00"));
        tier.set("second0", &test_link("second0"));

        // Reading the oldest must not save it from FIFO eviction.
        let _ = tier.get("first00");
        tier.set("third00", &test_link("third00"));

        assert!(tier.get("first00").is_none());
        assert!(tier.get("second0").is_some());
        assert!(tier.get("third00").is_some());
        assert_eq!(tier.len(), 2);
    }

    #[test]
    fn test_reset_keeps_eviction_position() {
        let tier = LocalTier::new(2, Duration::from_secs(60));
        tier.set("first00", &test_link("first00"));
        tier.set("second0", &test_link("second0"));
        tier.set("first00", &test_link("first00"));

        tier.set("third00", &test_link("third00"));

        // "first00" stays oldest despite the re-set, so it was evicted.
        assert!(tier.get("first00").is_none());
        assert!(tier.get("second0").is_some());
    }

    #[test]
    fn test_expired_entry_reads_as_miss() {
        let tier = LocalTier::new(10, Duration::from_millis(0));
        tier.set("abc1234", &test_link("abc1234"));

        assert!(tier.get("abc1234").is_none());
        assert_eq!(tier.len(), 0);
    }

    #[test]
    fn test_invalidate_removes_entry() {
        let tier = LocalTier::new(10, Duration::from_secs(60));
        tier.set("abc1234", &test_link("abc1234"));
        tier.invalidate("abc1234");

        assert!(tier.get("abc1234").is_none());
    }
}
