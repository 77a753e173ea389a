// External I/O operations module
pub mod signals; // Unix signal handling
pub mod timer; // Single deferred callback
