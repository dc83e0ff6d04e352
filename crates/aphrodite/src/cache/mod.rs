pub mod clock;
pub mod memo;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use memo::{CacheStats, MemoCache};
pub use store::{MemoryTransitStore, StoreError, TransitStore};
