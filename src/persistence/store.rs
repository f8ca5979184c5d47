//! TTL-bound persisted store

use jiff::{SignedDuration, Timestamp};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    brands::BrandId,
    persistence::{
        clock::{Clock, SystemClock},
        envelope::Envelope,
        storage::{Storage, StorageError},
    },
};

/// How long a persisted cart stays usable after its last write.
pub const DEFAULT_TTL: SignedDuration = SignedDuration::from_hours(6);

/// Reasons a persisted cart could not be used.
#[derive(Debug, Error)]
pub enum PersistedStateError {
    /// Nothing is stored under the key.
    #[error("no persisted cart")]
    Absent,

    /// The storage backend failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The stored value is not a valid envelope.
    #[error("persisted cart is malformed: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The stored timestamp is outside the representable range (epoch milliseconds).
    #[error("persisted cart has an invalid timestamp: {0}")]
    InvalidTimestamp(i64),

    /// The stored value is older than the time to live.
    #[error("persisted cart expired, last written {age:#} ago")]
    Expired {
        /// Time since the last write
        age: SignedDuration,
    },
}

/// Reads and writes one cart envelope under one key, discarding it once it outlives its TTL.
///
/// Reads and writes never surface errors through [`PersistedStore::read`],
/// [`PersistedStore::write`] and [`PersistedStore::clear`]; failures are logged and the store
/// behaves as if it were empty. The `try_` variants expose the underlying errors.
#[derive(Debug)]
pub struct PersistedStore<S, C = SystemClock> {
    storage: S,
    clock: C,
    key: String,
    ttl: SignedDuration,
}

impl<S: Storage> PersistedStore<S, SystemClock> {
    /// Create a store for `key` using wall clock time and the default TTL.
    pub fn new(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            clock: SystemClock,
            key: key.into(),
            ttl: DEFAULT_TTL,
        }
    }

    /// Create a store under the brand's storage key.
    pub fn for_brand(storage: S, brand: &BrandId) -> Self {
        Self::new(storage, brand.storage_key())
    }
}

impl<S: Storage, C: Clock> PersistedStore<S, C> {
    /// Swap the clock.
    pub fn with_clock<D: Clock>(self, clock: D) -> PersistedStore<S, D> {
        PersistedStore {
            storage: self.storage,
            clock,
            key: self.key,
            ttl: self.ttl,
        }
    }

    /// Override the time to live.
    #[must_use]
    pub fn with_ttl(mut self, ttl: SignedDuration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Storage key
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Time to live
    pub fn ttl(&self) -> SignedDuration {
        self.ttl
    }

    /// Current time according to the store's clock
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Time elapsed since the envelope was written.
    ///
    /// # Errors
    ///
    /// Returns [`PersistedStateError::InvalidTimestamp`] if the stamp is out of range or lies
    /// in the future.
    pub fn age(&self, envelope: &Envelope) -> Result<SignedDuration, PersistedStateError> {
        let invalid = || PersistedStateError::InvalidTimestamp(envelope.timestamp);

        let written = Timestamp::from_millisecond(envelope.timestamp).map_err(|_err| invalid())?;
        let age = self.clock.now().duration_since(written);

        if age.is_negative() {
            return Err(invalid());
        }

        Ok(age)
    }

    /// Time left before the envelope expires, floored at zero.
    pub fn expires_in(&self, envelope: &Envelope) -> SignedDuration {
        self.age(envelope)
            .map(|age| self.ttl.saturating_sub(age).max(SignedDuration::ZERO))
            .unwrap_or(SignedDuration::ZERO)
    }

    /// Load and classify the envelope without modifying storage.
    ///
    /// Expired entries are reported but left in place.
    ///
    /// # Errors
    ///
    /// Returns a [`PersistedStateError`] describing why no usable envelope was found.
    pub fn inspect(&self) -> Result<Envelope, PersistedStateError> {
        let raw = self
            .storage
            .get(&self.key)?
            .ok_or(PersistedStateError::Absent)?;

        let envelope: Envelope = serde_json::from_str(&raw)?;
        let age = self.age(&envelope)?;

        if age > self.ttl {
            return Err(PersistedStateError::Expired { age });
        }

        Ok(envelope)
    }

    /// Load the envelope, classifying every way that can fail.
    ///
    /// Expired entries are removed from storage before the error is returned.
    ///
    /// # Errors
    ///
    /// Returns a [`PersistedStateError`] describing why no usable envelope was found.
    pub fn try_read(&self) -> Result<Envelope, PersistedStateError> {
        let result = self.inspect();

        if let Err(PersistedStateError::Expired { age }) = &result {
            debug!(key = %self.key, age = %format!("{age:#}"), "purging expired cart");

            self.clear();
        }

        result
    }

    /// Load the envelope, or `None` if it is absent, unreadable or expired.
    pub fn read(&self) -> Option<Envelope> {
        match self.try_read() {
            Ok(envelope) => Some(envelope),
            Err(PersistedStateError::Absent | PersistedStateError::Expired { .. }) => None,
            Err(error) => {
                warn!(key = %self.key, %error, "ignoring persisted cart");

                None
            }
        }
    }

    /// Stamp the envelope with the current time and overwrite the stored value.
    ///
    /// # Errors
    ///
    /// Returns a [`PersistedStateError`] if the envelope cannot be encoded or stored.
    pub fn try_write(&self, mut envelope: Envelope) -> Result<(), PersistedStateError> {
        envelope.timestamp = self.clock.now().as_millisecond();

        let raw = serde_json::to_string(&envelope)?;

        self.storage.set(&self.key, &raw)?;

        Ok(())
    }

    /// Stamp and store the envelope, logging any failure.
    pub fn write(&self, envelope: Envelope) {
        if let Err(error) = self.try_write(envelope) {
            warn!(key = %self.key, %error, "failed to persist cart");
        }
    }

    /// Remove the stored envelope, logging any failure.
    pub fn clear(&self) {
        if let Err(error) = self.storage.remove(&self.key) {
            warn!(key = %self.key, %error, "failed to clear persisted cart");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{io, sync::Arc};

    use testresult::TestResult;

    use crate::persistence::{
        clock::{ManualClock, MockClock},
        storage::{MemoryStorage, MockStorage},
    };

    use super::*;

    const KEY: &str = "cart-storage:acme";

    fn stored(timestamp: i64) -> String {
        format!(r#"{{ "cart": [], "coupon": null, "shipping": null, "_timestamp": {timestamp} }}"#)
    }

    fn at_hours(hours: i64) -> Timestamp {
        Timestamp::UNIX_EPOCH + SignedDuration::from_hours(hours)
    }

    fn store_at(
        storage: MockStorage,
        hours: i64,
    ) -> PersistedStore<MockStorage, MockClock> {
        let mut clock = MockClock::new();

        clock.expect_now().returning(move || at_hours(hours));

        PersistedStore::new(storage, KEY).with_clock(clock)
    }

    #[test]
    fn missing_entry_is_absent() {
        let mut storage = MockStorage::new();

        storage
            .expect_get()
            .once()
            .withf(|key| key == KEY)
            .returning(|_| Ok(None));

        let store = store_at(storage, 0);

        assert!(matches!(store.try_read(), Err(PersistedStateError::Absent)));
    }

    #[test]
    fn fresh_entry_is_returned() -> TestResult {
        let mut storage = MockStorage::new();

        storage
            .expect_get()
            .returning(|_| Ok(Some(stored(at_hours(1).as_millisecond()))));
        storage.expect_remove().never();

        let store = store_at(storage, 6);

        let envelope = store.try_read()?;

        assert_eq!(envelope.timestamp, at_hours(1).as_millisecond());
        assert_eq!(store.expires_in(&envelope), SignedDuration::from_hours(1));

        Ok(())
    }

    #[test]
    fn expired_entry_is_removed() {
        let mut storage = MockStorage::new();

        storage.expect_get().returning(|_| Ok(Some(stored(0))));
        storage
            .expect_remove()
            .once()
            .withf(|key| key == KEY)
            .returning(|_| Ok(()));

        let store = store_at(storage, 7);

        let age = match store.try_read() {
            Err(PersistedStateError::Expired { age }) => Some(age),
            _ => None,
        };

        assert_eq!(age, Some(SignedDuration::from_hours(7)));
    }

    #[test]
    fn entry_exactly_at_ttl_is_still_fresh() {
        let mut storage = MockStorage::new();

        storage.expect_get().returning(|_| Ok(Some(stored(0))));
        storage.expect_remove().never();

        let store = store_at(storage, 6);

        assert!(store.read().is_some());
    }

    #[test]
    fn malformed_entry_is_ignored_and_kept() {
        let mut storage = MockStorage::new();

        storage
            .expect_get()
            .returning(|_| Ok(Some("{ not json".to_string())));
        storage.expect_remove().never();

        let store = store_at(storage, 0);

        assert!(matches!(
            store.try_read(),
            Err(PersistedStateError::Malformed(_))
        ));
        assert!(store.read().is_none());
    }

    #[test]
    fn entry_without_timestamp_is_malformed() {
        let mut storage = MockStorage::new();

        storage
            .expect_get()
            .returning(|_| Ok(Some(r#"{ "cart": [] }"#.to_string())));

        let store = store_at(storage, 0);

        assert!(matches!(
            store.try_read(),
            Err(PersistedStateError::Malformed(_))
        ));
    }

    #[test]
    fn out_of_range_timestamp_is_rejected() {
        let mut storage = MockStorage::new();

        storage
            .expect_get()
            .returning(|_| Ok(Some(stored(i64::MAX))));

        let store = store_at(storage, 0);

        assert!(matches!(
            store.try_read(),
            Err(PersistedStateError::InvalidTimestamp(i64::MAX))
        ));
    }

    #[test]
    fn inspect_reports_expiry_without_removing() {
        let mut storage = MockStorage::new();

        storage.expect_get().returning(|_| Ok(Some(stored(0))));
        storage.expect_remove().never();

        let store = store_at(storage, 7);

        assert!(matches!(
            store.inspect(),
            Err(PersistedStateError::Expired { .. })
        ));
    }

    #[test]
    fn future_timestamp_is_rejected_and_kept() {
        let mut storage = MockStorage::new();

        storage
            .expect_get()
            .returning(|_| Ok(Some(stored(at_hours(100).as_millisecond()))));
        storage.expect_remove().never();

        let store = store_at(storage, 1);

        assert!(matches!(
            store.try_read(),
            Err(PersistedStateError::InvalidTimestamp(_))
        ));
        assert!(store.read().is_none());
    }

    #[test]
    fn storage_failures_degrade_to_empty() {
        let mut storage = MockStorage::new();

        storage
            .expect_get()
            .returning(|_| Err(StorageError::Io(io::Error::other("disk gone"))));
        storage
            .expect_set()
            .returning(|_, _| Err(StorageError::Poisoned));
        storage
            .expect_remove()
            .returning(|_| Err(StorageError::Poisoned));

        let store = store_at(storage, 0);

        assert!(store.read().is_none());
        assert!(matches!(
            store.try_write(Envelope::default()),
            Err(PersistedStateError::Storage(StorageError::Poisoned))
        ));

        store.write(Envelope::default());
        store.clear();
    }

    #[test]
    fn write_stamps_current_time() -> TestResult {
        let storage = Arc::new(MemoryStorage::new());
        let clock = Arc::new(ManualClock::new(at_hours(3)));
        let store = PersistedStore::new(Arc::clone(&storage), KEY).with_clock(Arc::clone(&clock));

        store.try_write(Envelope {
            timestamp: 42,
            ..Envelope::default()
        })?;

        assert_eq!(store.try_read()?.timestamp, at_hours(3).as_millisecond());

        clock.advance(SignedDuration::from_hours(6) + SignedDuration::from_millis(1));

        assert!(store.read().is_none());
        assert_eq!(storage.get(KEY)?, None);

        Ok(())
    }

    #[test]
    fn custom_ttl_is_honoured() -> TestResult {
        let clock = Arc::new(ManualClock::default());
        let store = PersistedStore::new(MemoryStorage::new(), KEY)
            .with_clock(Arc::clone(&clock))
            .with_ttl(SignedDuration::from_mins(30));

        store.try_write(Envelope::default())?;

        clock.advance(SignedDuration::from_mins(29));
        assert!(store.read().is_some());

        clock.advance(SignedDuration::from_mins(2));
        assert!(store.read().is_none());

        Ok(())
    }

    #[test]
    fn clear_removes_entry() -> TestResult {
        let store = PersistedStore::for_brand(MemoryStorage::new(), &"acme".parse()?)
            .with_clock(ManualClock::default());

        store.try_write(Envelope::default())?;
        store.clear();

        assert_eq!(store.key(), KEY);
        assert!(matches!(store.try_read(), Err(PersistedStateError::Absent)));

        Ok(())
    }
}
