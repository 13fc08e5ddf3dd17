//! # tagfs-testkit
//!
//! Shared test infrastructure: an in-memory `RemoteStore`, a settable clock
//! and a tracing subscriber for test output.
//!
//! ```rust,ignore
//! let store = MemoryStore::new();
//! let resolver = PathResolver::new(store.clone());
//! resolver.put("/a/b.txt", b"hello".to_vec()).await?;
//! assert_eq!(store.len().await, 2);
//! ```

#![forbid(unsafe_code)]

/// Settable clock
pub mod clock;

/// In-memory store double
pub mod memory_store;

pub use clock::FixedClock;
pub use memory_store::{CallCounts, MemoryStore, StoreOp};

/// Hex seed used by fixtures that need a stable signing key.
pub const TEST_SEED_HEX: &str =
    "9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60";

/// Install a `fmt` subscriber honouring `RUST_LOG`, writing through the test
/// harness. Safe to call from every test.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
