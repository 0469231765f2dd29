/*!
Scenescope - live introspection of retained scene graphs

```ignore
use scenescope::{Connector, EventGroup, MemoryToolkit, Topic};

let toolkit = MemoryToolkit::new();
let connector = Connector::builder(toolkit.clone(), None)
  .application("demo")
  .inspect_mode(true)
  .build();

// Events are delivered on the UI thread
connector.bus().subscribe(Topic::Group(EventGroup::Any), |event| println!("{event:?}"));
connector.start();

// Select a node and read its attributes
connector.select_node(window, &element, None);
connector.reload_attributes(window, None, None);

// Events produced on other threads arrive on the next pump
connector.bus().dispatcher().pump();

// Every subscription is released on stop
connector.stop();
```
*/

pub mod attributes;
pub mod class_info;
mod core;
pub mod env;
pub mod platform;

mod types;
pub use types::*;

pub use crate::attributes::{AttributeListener, PropertyListener, Tracker};
pub use crate::class_info::ClassInfoCache;
pub use crate::core::{
  element_tree, node_element, window_element, BoundsPane, Callback, Connector, ConnectorBuilder,
  ConnectorOptions, EventBus, FsResourceAccessor, InspectOverlay, MonitorState, ResourceAccessor,
  Selection, SubscriberId, Topic, WindowMonitor,
};
pub use crate::env::{Env, KeyValue};
pub use crate::platform::{Dispatcher, MemoryToolkit, NodeKind, Toolkit};
