//! Built-in change-detection policies.
//!
//! Each differ is stateless; the runner passes the previous successful and
//! the current observation into `merge` and gets back the merged state, the
//! trigger decision, and the rendered notification in one call.

pub mod always;
pub mod groups;
pub mod new_items;
pub mod scalar;

pub use always::AlwaysDiffer;
pub use groups::GroupedItemsDiffer;
pub use new_items::NewItemsDiffer;
pub use scalar::ScalarChangeDiffer;
