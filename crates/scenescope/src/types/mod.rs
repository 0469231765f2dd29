/*! Core types for scenescope.

Regenerate TypeScript types: `cargo test export_bindings`
*/

#![allow(missing_docs)]

mod attribute;
mod element;
mod error;
mod event;
mod geometry;
mod ids;
mod overlay;
mod value;

pub use attribute::{Attribute, AttributeCategory, DisplayHint, ObservableType, ValueState};
pub use element::{
  is_auxiliary_id, ClassInfo, Element, ElementKind, ElementTree, EventSource, NodeProperties,
  StyledElements, WindowProperties, WindowType, AUX_NODE_ID_PREFIX,
};
pub use error::{ScopeError, ScopeResult};
pub use event::{ConnectorEvent, EventGroup, EventType};
pub use geometry::{Affine, Bounds, Insets, Point, Size};
pub use ids::{NodeId, Target, Uid, WindowId};
pub use overlay::{
  HighlightOptions, InspectSnapshot, OverlayLine, OverlayRect, OverlaySnapshot,
};
pub use value::{Color, Font, ImageRef, PropValue};
