use crate::{CapabilityInstance, Category, Owner};

/// Contract every plugin module exports.
///
/// `name` is expected to be unique within its category but nothing checks
/// it. `create_instance` hands ownership of the new object to the caller and
/// has no error path: an instance of the wrong kind for `category` is the
/// caller's to detect and discard.
pub trait CapabilityFactory: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn category(&self) -> Category;
    fn create_instance(&self, owner: &Owner) -> CapabilityInstance;
}
