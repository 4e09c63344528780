//! Process exit codes for the `stagehand` binary.

/// Cycle completed, all eligible extensions deployed.
pub const SUCCESS: i32 = 0;

/// Fatal precondition: resources root or extensions root missing.
pub const PRECONDITION_FAILED: i32 = 1;

/// Unexpected internal error.
pub const INTERNAL_ERROR: i32 = 2;

/// One or more extensions failed to inject.
pub const INJECTION_FAILED: i32 = 3;
