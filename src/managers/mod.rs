// State managers
// The category store and its change notification fan-out.

pub mod category_manager;
pub mod notifier;
