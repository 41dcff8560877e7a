//! Well-known payload and meta keys.

pub const MARKETPLACE: &str = "marketplace";
pub const MARKETPLACE_ID: &str = "marketplace_id";
pub const INVENTORY_ID: &str = "inventory_id";
pub const LISTING_ID: &str = "listing_id";

pub const STATUS_CODE: &str = "status_code";
pub const OPERATION: &str = "operation";
pub const ATTEMPTS: &str = "attempts";

/// Set to `true` only when a failed provider protocol can resume mid-way.
pub const RECOVERABLE: &str = "recoverable";
/// One of `"recoverable"`, `"terminal"` or `"unknown"`.
pub const RECOVERABILITY: &str = "recoverability";

pub const RESULTS: &str = "results";
pub const SUCCESSFUL: &str = "successful";
pub const FAILED: &str = "failed";
pub const PARTIAL_SUCCESS: &str = "partial_success";
pub const RECOVERABLE_FAILURES: &str = "recoverable_failures";

pub const MISSING_FIELDS: &str = "missing_fields";
pub const ERRORS: &str = "errors";
pub const VALIDATION: &str = "validation";
