/*!
Core observation engine.

# Module Structure

- `bus.rs` - typed publish/subscribe with UI-thread delivery
- `context.rs` - per-monitor handles and the event outbox
- `elements.rs` - element facades built from live host state
- `tree.rs` - recursive subtree queries
- `bounds_pane.rs` - selection highlight geometry
- `inspect.rs` - inspect-mode hover display
- `monitor/` - one window: instrumentation, selection, hover
- `connector.rs` - every window, and the public operations
- `options.rs` - runtime switches
- `resource.rs` - stylesheet resource loading
*/

mod bounds_pane;
mod bus;
mod connector;
mod context;
mod elements;
mod inspect;
mod monitor;
mod options;
mod resource;
pub(crate) mod tree;

pub use bounds_pane::{BoundsPane, BASELINE_ID, BOUNDS_IN_PARENT_ID, LAYOUT_BOUNDS_ID};
pub use bus::{Callback, EventBus, SubscriberId, Topic};
pub use connector::{Connector, ConnectorBuilder};
pub use elements::{element_tree, node_element, window_element};
pub use inspect::InspectOverlay;
pub use monitor::{MonitorState, Selection, WindowMonitor};
pub use options::ConnectorOptions;
pub use resource::{FsResourceAccessor, ResourceAccessor};

pub(crate) use context::Ctx;
#[cfg(test)]
pub(crate) use context::testing;
