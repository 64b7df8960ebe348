//! Application constants
//!
//! Centralized location for domain-level constants used throughout the
//! calendar synchronization subsystem.

// Fan-out configuration
pub const DEFAULT_MAX_IN_FLIGHT: usize = 10;

// Event projection
pub const TIME_OF_DAY_FORMAT: &str = "%H:%M";
pub const DEFAULT_TIME_ZONE: &str = "UTC";

// Bulk clear safety valve: stop following pagination tokens after this many
// pages so a provider that loops its tokens cannot hang the operation.
pub const MAX_LIST_PAGES: usize = 1_000;
