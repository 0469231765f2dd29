/*!
Attribute tracking: discover, read and watch the properties of a selection.
*/

mod listener;
mod property_listener;
mod tracker;
mod trackers;

pub use listener::AttributeListener;
pub use property_listener::{ChangeCallback, PropertyListener};
pub use tracker::Tracker;
pub use trackers::{
  CONTROL_PROPERTIES, GRID_PANE_PROPERTIES, IMAGE_VIEW_PROPERTIES, LABELED_PROPERTIES, NODE_PROPERTIES,
  PARENT_PROPERTIES, REGION_PROPERTIES, SCENE_PROPERTIES, SHAPE_PROPERTIES, TEXT_PROPERTIES,
  WINDOW_PROPERTIES,
};
