//! Persistence
//!
//! A cart is saved as a JSON [`Envelope`] under one key of a string [`Storage`] backend.
//! [`PersistedStore`] stamps every write and treats anything older than its time to live
//! as gone.

pub mod clock;
pub mod envelope;
pub mod storage;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use envelope::{Envelope, EnvelopeError, StoredCoupon, StoredLine};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};
pub use store::{DEFAULT_TTL, PersistedStateError, PersistedStore};
