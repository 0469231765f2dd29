/*!
Built-in node kinds of the in-memory toolkit.

Each kind maps to a chain of runtime types. Every type in the chain declares
its own properties with their default values and observability.
*/

use std::collections::HashMap;
use std::sync::Arc;

use crate::platform::{Archetypes, TypeInfo};
use crate::types::{Color, Font, Insets, ObservableType, PropValue};

use super::graph::Slot;

/// Concrete node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
  Group,
  Pane,
  GridPane,
  Region,
  Control,
  Label,
  Button,
  ImageView,
  Rectangle,
  Line,
  Circle,
  Text,
  SubScene,
}

impl NodeKind {
  /// Fully qualified runtime type name.
  pub const fn type_name(self) -> &'static str {
    match self {
      Self::Group => "scene.Group",
      Self::Pane => "scene.layout.Pane",
      Self::GridPane => "scene.layout.GridPane",
      Self::Region => "scene.layout.Region",
      Self::Control => "scene.control.Control",
      Self::Label => "scene.control.Label",
      Self::Button => "scene.control.Button",
      Self::ImageView => "scene.image.ImageView",
      Self::Rectangle => "scene.shape.Rectangle",
      Self::Line => "scene.shape.Line",
      Self::Circle => "scene.shape.Circle",
      Self::Text => "scene.text.Text",
      Self::SubScene => "scene.SubScene",
    }
  }

  pub fn archetypes(self) -> Archetypes {
    use Archetypes as A;
    match self {
      Self::Group => A::PARENT | A::PANE,
      Self::Pane => A::PARENT | A::PANE | A::REGION,
      Self::GridPane => A::PARENT | A::PANE | A::REGION | A::GRID_PANE,
      Self::Region => A::PARENT | A::REGION,
      Self::Control => A::PARENT | A::REGION | A::CONTROL,
      Self::Label | Self::Button => A::PARENT | A::REGION | A::CONTROL | A::LABELED,
      Self::ImageView => A::IMAGE_VIEW,
      Self::Rectangle | Self::Circle => A::SHAPE,
      Self::Line => A::SHAPE | A::OPEN_SHAPE,
      Self::Text => A::SHAPE | A::TEXT,
      Self::SubScene => A::SUB_SCENE,
    }
  }

  /// Sized by width/height properties rather than by content.
  pub const fn is_resizable(self) -> bool {
    matches!(
      self,
      Self::Pane
        | Self::GridPane
        | Self::Region
        | Self::Control
        | Self::Label
        | Self::Button
        | Self::SubScene
    )
  }
}

const LEFT_RIGHT: &[&str] = &["LEFT", "CENTER", "RIGHT", "JUSTIFY"];
const POSITIONS: &[&str] = &[
  "TOP_LEFT",
  "TOP_CENTER",
  "TOP_RIGHT",
  "CENTER_LEFT",
  "CENTER",
  "CENTER_RIGHT",
  "BOTTOM_LEFT",
  "BOTTOM_CENTER",
  "BOTTOM_RIGHT",
  "BASELINE_LEFT",
  "BASELINE_CENTER",
  "BASELINE_RIGHT",
];

fn rw(value: impl Into<PropValue>) -> Slot {
  Slot::observable(value.into(), ObservableType::ReadWrite)
}

fn ro(value: impl Into<PropValue>) -> Slot {
  Slot::observable(value.into(), ObservableType::ReadOnly)
}

fn plain(value: impl Into<PropValue>) -> Slot {
  Slot::plain(value.into())
}

fn en(value: &str, domain: &[&str]) -> Slot {
  rw(PropValue::enumeration(value, domain))
}

/// One type of the built-in hierarchy.
struct TypeSpec {
  name: &'static str,
  super_name: Option<&'static str>,
  styleable: &'static [&'static str],
  props: fn() -> Vec<(&'static str, Slot)>,
}

fn node_props() -> Vec<(&'static str, Slot)> {
  vec![
    ("id", rw(PropValue::Null)),
    ("visible", rw(true)),
    ("managed", rw(true)),
    ("opacity", rw(1.0)),
    ("layoutX", rw(0.0)),
    ("layoutY", rw(0.0)),
    ("translateX", rw(0.0)),
    ("translateY", rw(0.0)),
    ("translateZ", rw(0.0)),
    ("scaleX", rw(1.0)),
    ("scaleY", rw(1.0)),
    ("scaleZ", rw(1.0)),
    ("rotate", rw(0.0)),
    ("viewOrder", rw(0.0)),
    (
      "blendMode",
      rw(PropValue::Null),
    ),
    ("cursor", rw(PropValue::Null)),
    ("effect", rw(PropValue::Null)),
    ("clip", rw(PropValue::Null)),
    ("mouseTransparent", rw(false)),
    ("focusVisible", ro(false)),
    ("focusWithin", ro(false)),
    ("focused", ro(false)),
    ("hover", ro(false)),
    ("disable", rw(false)),
    ("styleClass", plain(PropValue::List(vec![]))),
    ("pseudoClassStates", plain(PropValue::List(vec![]))),
    ("transforms", plain(PropValue::List(vec![]))),
    ("userData", plain(PropValue::Null)),
  ]
}

fn parent_props() -> Vec<(&'static str, Slot)> {
  vec![
    ("needsLayout", ro(false)),
    ("stylesheets", plain(PropValue::List(vec![]))),
  ]
}

fn group_props() -> Vec<(&'static str, Slot)> {
  vec![("autoSizeChildren", rw(true))]
}

fn sizing_props() -> Vec<(&'static str, Slot)> {
  vec![
    ("minWidth", rw(-1.0)),
    ("minHeight", rw(-1.0)),
    ("prefWidth", rw(-1.0)),
    ("prefHeight", rw(-1.0)),
    ("maxWidth", rw(-1.0)),
    ("maxHeight", rw(-1.0)),
    ("width", ro(0.0)),
    ("height", ro(0.0)),
  ]
}

fn region_props() -> Vec<(&'static str, Slot)> {
  let mut props = vec![
    ("padding", rw(Insets::EMPTY)),
    ("insets", ro(Insets::EMPTY)),
    ("opaqueInsets", rw(PropValue::Null)),
    ("snapToPixel", rw(true)),
    ("shape", rw(PropValue::Null)),
    ("scaleShape", rw(true)),
    ("centerShape", rw(true)),
    ("cacheShape", rw(true)),
    ("background", rw(PropValue::Null)),
    ("border", rw(PropValue::Null)),
    ("userAgentStylesheet", plain(PropValue::Null)),
  ];
  props.extend(sizing_props());
  props
}

fn grid_pane_props() -> Vec<(&'static str, Slot)> {
  vec![
    ("hgap", rw(0.0)),
    ("vgap", rw(0.0)),
    ("alignment", en("TOP_LEFT", POSITIONS)),
    ("gridLinesVisible", rw(false)),
    ("rowConstraints", plain(PropValue::List(vec![]))),
    ("columnConstraints", plain(PropValue::List(vec![]))),
  ]
}

fn control_props() -> Vec<(&'static str, Slot)> {
  vec![
    ("skin", rw(PropValue::Null)),
    ("tooltip", rw(PropValue::Null)),
    ("contextMenu", rw(PropValue::Null)),
  ]
}

fn labeled_props() -> Vec<(&'static str, Slot)> {
  vec![
    ("text", rw("")),
    ("font", rw(Font::default())),
    ("textFill", rw(Color::BLACK)),
    ("graphic", rw(PropValue::Null)),
    ("graphicTextGap", rw(4.0)),
    ("labelPadding", ro(Insets::EMPTY)),
    (
      "contentDisplay",
      en(
        "LEFT",
        &["LEFT", "RIGHT", "TOP", "BOTTOM", "CENTER", "GRAPHIC_ONLY", "TEXT_ONLY"],
      ),
    ),
    ("alignment", en("CENTER_LEFT", POSITIONS)),
    ("textAlignment", en("LEFT", LEFT_RIGHT)),
    (
      "textOverrun",
      en(
        "ELLIPSIS",
        &[
          "CLIP",
          "ELLIPSIS",
          "WORD_ELLIPSIS",
          "CENTER_ELLIPSIS",
          "CENTER_WORD_ELLIPSIS",
          "LEADING_ELLIPSIS",
          "LEADING_WORD_ELLIPSIS",
        ],
      ),
    ),
    ("wrapText", rw(false)),
    ("underline", rw(false)),
    ("ellipsisString", rw("...")),
    ("mnemonicParsing", rw(false)),
    ("lineSpacing", rw(0.0)),
  ]
}

fn label_props() -> Vec<(&'static str, Slot)> {
  vec![("labelFor", rw(PropValue::Null))]
}

fn button_props() -> Vec<(&'static str, Slot)> {
  vec![
    ("armed", ro(false)),
    ("defaultButton", rw(false)),
    ("cancelButton", rw(false)),
  ]
}

fn image_view_props() -> Vec<(&'static str, Slot)> {
  vec![
    ("image", rw(PropValue::Null)),
    ("x", rw(0.0)),
    ("y", rw(0.0)),
    ("fitWidth", rw(0.0)),
    ("fitHeight", rw(0.0)),
    ("preserveRatio", rw(false)),
    ("smooth", rw(true)),
  ]
}

fn shape_props() -> Vec<(&'static str, Slot)> {
  vec![
    ("fill", rw(Color::BLACK)),
    ("smooth", rw(true)),
    ("stroke", rw(PropValue::Null)),
    ("strokeType", en("CENTERED", &["INSIDE", "OUTSIDE", "CENTERED"])),
    ("strokeWidth", rw(1.0)),
    ("strokeDashArray", plain(PropValue::List(vec![]))),
    ("strokeDashOffset", rw(0.0)),
    ("strokeLineCap", en("SQUARE", &["SQUARE", "BUTT", "ROUND"])),
    ("strokeLineJoin", en("MITER", &["MITER", "BEVEL", "ROUND"])),
    ("strokeMiterLimit", rw(10.0)),
  ]
}

fn rectangle_props() -> Vec<(&'static str, Slot)> {
  vec![
    ("x", rw(0.0)),
    ("y", rw(0.0)),
    ("width", rw(0.0)),
    ("height", rw(0.0)),
    ("arcWidth", rw(0.0)),
    ("arcHeight", rw(0.0)),
  ]
}

fn line_props() -> Vec<(&'static str, Slot)> {
  vec![
    ("startX", rw(0.0)),
    ("startY", rw(0.0)),
    ("endX", rw(0.0)),
    ("endY", rw(0.0)),
  ]
}

fn circle_props() -> Vec<(&'static str, Slot)> {
  vec![
    ("centerX", rw(0.0)),
    ("centerY", rw(0.0)),
    ("radius", rw(0.0)),
  ]
}

fn text_props() -> Vec<(&'static str, Slot)> {
  vec![
    ("text", rw("")),
    ("font", rw(Font::default())),
    ("textOrigin", en("BASELINE", &["BASELINE", "TOP", "CENTER", "BOTTOM"])),
    ("x", rw(0.0)),
    ("y", rw(0.0)),
    ("textAlignment", en("LEFT", LEFT_RIGHT)),
    ("boundsType", en("LOGICAL", &["LOGICAL", "VISUAL", "LOGICAL_VERTICAL_CENTER"])),
    ("tabSize", rw(8_i64)),
    ("lineSpacing", rw(0.0)),
    ("wrappingWidth", rw(0.0)),
    ("underline", rw(false)),
    ("strikethrough", rw(false)),
    ("fontSmoothingType", en("GRAY", &["GRAY", "LCD"])),
  ]
}

fn sub_scene_props() -> Vec<(&'static str, Slot)> {
  vec![
    ("width", rw(0.0)),
    ("height", rw(0.0)),
    ("fill", rw(PropValue::Null)),
    ("userAgentStylesheet", rw(PropValue::Null)),
  ]
}

const NODE_STYLEABLE: &[&str] = &[
  "visible",
  "managed",
  "opacity",
  "rotate",
  "scaleX",
  "scaleY",
  "scaleZ",
  "translateX",
  "translateY",
  "translateZ",
  "viewOrder",
  "blendMode",
  "cursor",
  "effect",
];

const TYPES: &[TypeSpec] = &[
  TypeSpec {
    name: "scene.Node",
    super_name: None,
    styleable: NODE_STYLEABLE,
    props: node_props,
  },
  TypeSpec {
    name: "scene.Parent",
    super_name: Some("scene.Node"),
    styleable: &[],
    props: parent_props,
  },
  TypeSpec {
    name: "scene.Group",
    super_name: Some("scene.Parent"),
    styleable: &[],
    props: group_props,
  },
  TypeSpec {
    name: "scene.layout.Region",
    super_name: Some("scene.Parent"),
    styleable: &[
      "padding",
      "opaqueInsets",
      "snapToPixel",
      "shape",
      "scaleShape",
      "centerShape",
      "background",
      "border",
      "minWidth",
      "minHeight",
      "prefWidth",
      "prefHeight",
      "maxWidth",
      "maxHeight",
    ],
    props: region_props,
  },
  TypeSpec {
    name: "scene.layout.Pane",
    super_name: Some("scene.layout.Region"),
    styleable: &[],
    props: Vec::new,
  },
  TypeSpec {
    name: "scene.layout.GridPane",
    super_name: Some("scene.layout.Pane"),
    styleable: &["hgap", "vgap", "alignment", "gridLinesVisible"],
    props: grid_pane_props,
  },
  TypeSpec {
    name: "scene.control.Control",
    super_name: Some("scene.layout.Region"),
    styleable: &["skin"],
    props: control_props,
  },
  TypeSpec {
    name: "scene.control.Labeled",
    super_name: Some("scene.control.Control"),
    styleable: &[
      "font",
      "textFill",
      "graphic",
      "graphicTextGap",
      "labelPadding",
      "contentDisplay",
      "alignment",
      "textAlignment",
      "textOverrun",
      "wrapText",
      "underline",
      "ellipsisString",
      "lineSpacing",
    ],
    props: labeled_props,
  },
  TypeSpec {
    name: "scene.control.Label",
    super_name: Some("scene.control.Labeled"),
    styleable: &[],
    props: label_props,
  },
  TypeSpec {
    name: "scene.control.ButtonBase",
    super_name: Some("scene.control.Labeled"),
    styleable: &[],
    props: Vec::new,
  },
  TypeSpec {
    name: "scene.control.Button",
    super_name: Some("scene.control.ButtonBase"),
    styleable: &[],
    props: button_props,
  },
  TypeSpec {
    name: "scene.image.ImageView",
    super_name: Some("scene.Node"),
    styleable: &["image"],
    props: image_view_props,
  },
  TypeSpec {
    name: "scene.shape.Shape",
    super_name: Some("scene.Node"),
    styleable: &[
      "fill",
      "smooth",
      "stroke",
      "strokeType",
      "strokeWidth",
      "strokeDashOffset",
      "strokeLineCap",
      "strokeLineJoin",
      "strokeMiterLimit",
    ],
    props: shape_props,
  },
  TypeSpec {
    name: "scene.shape.Rectangle",
    super_name: Some("scene.shape.Shape"),
    styleable: &["arcWidth", "arcHeight"],
    props: rectangle_props,
  },
  TypeSpec {
    name: "scene.shape.Line",
    super_name: Some("scene.shape.Shape"),
    styleable: &[],
    props: line_props,
  },
  TypeSpec {
    name: "scene.shape.Circle",
    super_name: Some("scene.shape.Shape"),
    styleable: &[],
    props: circle_props,
  },
  TypeSpec {
    name: "scene.text.Text",
    super_name: Some("scene.shape.Shape"),
    styleable: &[
      "font",
      "textOrigin",
      "textAlignment",
      "boundsType",
      "tabSize",
      "lineSpacing",
      "underline",
      "strikethrough",
      "fontSmoothingType",
    ],
    props: text_props,
  },
  TypeSpec {
    name: "scene.SubScene",
    super_name: Some("scene.Node"),
    styleable: &[],
    props: sub_scene_props,
  },
];

/// Registry of the built-in runtime types.
#[derive(Debug)]
pub(super) struct TypeRegistry {
  types: HashMap<String, Arc<TypeInfo>>,
}

impl TypeRegistry {
  pub(super) fn new() -> Self {
    let mut types: HashMap<String, Arc<TypeInfo>> = HashMap::new();
    // TYPES lists supertypes before subtypes
    for spec in TYPES {
      let super_type = spec.super_name.and_then(|name| types.get(name).cloned());
      let info = TypeInfo {
        module: Some("scene.graphics".into()),
        name: spec.name.to_owned(),
        simple_name: simple_name(spec.name).to_owned(),
        super_type,
        declared_properties: (spec.props)().into_iter().map(|(n, _)| n.to_owned()).collect(),
        styleable_properties: spec.styleable.iter().map(|s| (*s).to_owned()).collect(),
      };
      types.insert(spec.name.to_owned(), Arc::new(info));
    }
    for extra in [window_type("stage.Window", None), scene_type()] {
      types.insert(extra.name.clone(), Arc::new(extra));
    }
    let window = types.get("stage.Window").cloned();
    for name in ["stage.Stage", "stage.Popup"] {
      types.insert(name.to_owned(), Arc::new(window_type(name, window.clone())));
    }
    Self { types }
  }

  pub(super) fn get(&self, name: &str) -> Option<Arc<TypeInfo>> {
    self.types.get(name).cloned()
  }

  pub(super) fn insert(&mut self, info: Arc<TypeInfo>) {
    self.types.insert(info.name.clone(), info);
  }
}

/// Default property slots of a type, including inherited ones.
pub(super) fn default_slots(info: &Arc<TypeInfo>) -> Vec<(String, Slot)> {
  let mut chain: Vec<Arc<TypeInfo>> = info.ancestry().collect();
  chain.reverse();
  let mut slots = Vec::new();
  for t in chain {
    if let Some(spec) = TYPES.iter().find(|spec| spec.name == t.name) {
      slots.extend((spec.props)().into_iter().map(|(n, s)| (n.to_owned(), s)));
    }
  }
  slots
}

pub(super) fn simple_name(name: &str) -> &str {
  name.rsplit('.').next().unwrap_or(name)
}

fn window_type(name: &str, super_type: Option<Arc<TypeInfo>>) -> TypeInfo {
  TypeInfo {
    module: Some("scene.graphics".into()),
    name: name.to_owned(),
    simple_name: simple_name(name).to_owned(),
    super_type,
    declared_properties: window_slots().into_iter().map(|(n, _)| n.to_owned()).collect(),
    styleable_properties: Vec::new(),
  }
}

fn scene_type() -> TypeInfo {
  TypeInfo {
    module: Some("scene.graphics".into()),
    name: "scene.Scene".into(),
    simple_name: "Scene".into(),
    super_type: None,
    declared_properties: scene_slots().into_iter().map(|(n, _)| n.to_owned()).collect(),
    styleable_properties: Vec::new(),
  }
}

/// Default window properties.
pub(super) fn window_slots() -> Vec<(&'static str, Slot)> {
  vec![
    ("x", ro(f64::NAN)),
    ("y", ro(f64::NAN)),
    ("width", ro(f64::NAN)),
    ("height", ro(f64::NAN)),
    ("opacity", rw(1.0)),
    ("focused", ro(false)),
    ("showing", ro(false)),
    ("autoHide", rw(false)),
    ("outputScaleX", ro(1.0)),
    ("outputScaleY", ro(1.0)),
    ("renderScaleX", rw(1.0)),
    ("renderScaleY", rw(1.0)),
    ("forceIntegerRenderScale", rw(false)),
    ("title", rw(PropValue::Null)),
    ("userData", plain(PropValue::Null)),
  ]
}

/// Default scene properties.
pub(super) fn scene_slots() -> Vec<(&'static str, Slot)> {
  vec![
    ("fill", rw(Color::WHITE)),
    ("cursor", rw(PropValue::Null)),
    ("camera", rw(PropValue::Null)),
    (
      "nodeOrientation",
      en("INHERIT", &["LEFT_TO_RIGHT", "RIGHT_TO_LEFT", "INHERIT"]),
    ),
    ("width", ro(0.0)),
    ("height", ro(0.0)),
    ("userAgentStylesheet", rw(PropValue::Null)),
    ("stylesheets", plain(PropValue::List(vec![]))),
    ("userData", plain(PropValue::Null)),
  ]
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn every_kind_has_a_type() {
    let registry = TypeRegistry::new();
    for kind in [
      NodeKind::Group,
      NodeKind::Pane,
      NodeKind::GridPane,
      NodeKind::Region,
      NodeKind::Control,
      NodeKind::Label,
      NodeKind::Button,
      NodeKind::ImageView,
      NodeKind::Rectangle,
      NodeKind::Line,
      NodeKind::Circle,
      NodeKind::Text,
      NodeKind::SubScene,
    ] {
      assert!(registry.get(kind.type_name()).is_some(), "{kind:?}");
    }
  }

  #[test]
  fn button_inherits_node_slots() {
    let registry = TypeRegistry::new();
    let button = registry.get("scene.control.Button").unwrap();
    let names: Vec<String> = default_slots(&button).into_iter().map(|(n, _)| n).collect();
    assert!(names.iter().any(|n| n == "opacity"));
    assert!(names.iter().any(|n| n == "padding"));
    assert!(names.iter().any(|n| n == "textFill"));
    assert!(names.iter().any(|n| n == "defaultButton"));
  }

  #[test]
  fn archetypes_follow_the_class_hierarchy() {
    let button = NodeKind::Button.archetypes();
    assert!(button.contains(Archetypes::LABELED | Archetypes::CONTROL | Archetypes::REGION));
    assert!(!button.contains(Archetypes::PANE));
    assert!(NodeKind::GridPane.archetypes().contains(Archetypes::PANE | Archetypes::GRID_PANE));
    assert!(NodeKind::Line.archetypes().contains(Archetypes::OPEN_SHAPE));
    assert!(!NodeKind::Rectangle.archetypes().contains(Archetypes::OPEN_SHAPE));
    assert!(!NodeKind::ImageView.archetypes().contains(Archetypes::PARENT));
  }

  #[test]
  fn simple_name_takes_last_segment() {
    assert_eq!(simple_name("scene.control.Button"), "Button");
    assert_eq!(simple_name("Plain"), "Plain");
  }
}
