//! Category readers.

mod grid_pane;
mod image_view;
mod labeled;
mod node;
mod parent;
pub(crate) mod reflective;
mod region;
mod shape;
mod window;

pub use grid_pane::GRID_PANE_PROPERTIES;
pub use image_view::IMAGE_VIEW_PROPERTIES;
pub use labeled::LABELED_PROPERTIES;
pub use node::NODE_PROPERTIES;
pub use parent::PARENT_PROPERTIES;
pub use region::{CONTROL_PROPERTIES, REGION_PROPERTIES};
pub use shape::{SHAPE_PROPERTIES, TEXT_PROPERTIES};
pub use window::{SCENE_PROPERTIES, WINDOW_PROPERTIES};

pub(crate) use grid_pane::GridPaneReader;
pub(crate) use image_view::ImageViewReader;
pub(crate) use labeled::LabeledReader;
pub(crate) use node::NodeReader;
pub(crate) use parent::ParentReader;
pub(crate) use reflective::ReflectiveReader;
pub(crate) use region::{ControlReader, RegionReader};
pub(crate) use shape::{ShapeReader, TextReader};
pub(crate) use window::{SceneReader, WindowReader};
