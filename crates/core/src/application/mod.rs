// Application Layer - Use Cases and Business Logic

pub mod check_in;
pub mod queue;

// Re-exports
pub use check_in::{CheckIn, CheckInService};
pub use queue::{PersistentOrderedQueue, QueueNamespaces};
