// Service modules
pub mod dedup;
pub mod signing;
pub mod validator;

pub use dedup::{CacheEntry, DedupStore, InMemoryDedupStore};
pub use signing::{PlaceholderSigner, RequestSigner};
pub use validator::{PicoValidator, PurchaseValidator, SimulatedValidator};
