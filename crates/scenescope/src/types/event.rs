/*! Events emitted to bus subscribers. */

use super::{Attribute, AttributeCategory, Element, ElementTree, EventSource, Point, ScopeError, Size};
use serde::Serialize;
use ts_rs::TS;

/// Fieldless kind of a [`ConnectorEvent`], used as a subscription key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, TS)]
#[ts(export)]
pub enum EventType {
  AttributeList,
  AttributeUpdated,
  NodeAdded,
  NodeRemoved,
  NodeSelected,
  NodeStyleClass,
  NodeVisibility,
  RootChanged,
  WindowClosed,
  WindowProperties,
  MousePos,
  Forwarded,
  Exception,
}

impl EventType {
  pub const ALL: [Self; 13] = [
    Self::AttributeList,
    Self::AttributeUpdated,
    Self::NodeAdded,
    Self::NodeRemoved,
    Self::NodeSelected,
    Self::NodeStyleClass,
    Self::NodeVisibility,
    Self::RootChanged,
    Self::WindowClosed,
    Self::WindowProperties,
    Self::MousePos,
    Self::Forwarded,
    Self::Exception,
  ];

  /// Whether events of this kind carry an element.
  pub const fn is_element_event(self) -> bool {
    match self {
      Self::AttributeList
      | Self::AttributeUpdated
      | Self::NodeAdded
      | Self::NodeRemoved
      | Self::NodeSelected
      | Self::NodeStyleClass
      | Self::NodeVisibility
      | Self::RootChanged
      | Self::Forwarded => true,
      Self::WindowClosed | Self::WindowProperties | Self::MousePos | Self::Exception => false,
    }
  }

  /// Supertypes this kind is tagged with.
  pub const fn groups(self) -> &'static [EventGroup] {
    if self.is_element_event() {
      &[EventGroup::Any, EventGroup::Element]
    } else {
      &[EventGroup::Any]
    }
  }
}

/// Event supertypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, TS)]
#[ts(export)]
pub enum EventGroup {
  /// Every event.
  Any,
  /// Events that carry an element.
  Element,
}

/// Events emitted when the observed scene changes.
#[derive(Debug, Clone, Serialize, TS)]
#[serde(tag = "event", content = "data")]
#[ts(export)]
pub enum ConnectorEvent {
  // Attribute snapshots (from trackers)
  #[serde(rename = "attribute:list")]
  AttributeList {
    source: EventSource,
    element: Element,
    category: AttributeCategory,
    attributes: Vec<Attribute>,
  },
  #[serde(rename = "attribute:updated")]
  AttributeUpdated {
    source: EventSource,
    element: Element,
    category: AttributeCategory,
    attribute: Attribute,
  },

  // Structure (from branch instrumentation)
  #[serde(rename = "node:added")]
  NodeAdded { source: EventSource, element: Element },
  #[serde(rename = "node:removed")]
  NodeRemoved { source: EventSource, element: Element },
  #[serde(rename = "node:selected")]
  NodeSelected { source: EventSource, element: Element },
  #[serde(rename = "node:style-class")]
  NodeStyleClass {
    source: EventSource,
    element: Element,
    style_class: Vec<String>,
  },
  #[serde(rename = "node:visibility")]
  NodeVisibility {
    source: EventSource,
    element: Element,
    visible: bool,
  },
  #[serde(rename = "root:changed")]
  RootChanged {
    source: EventSource,
    element: Element,
    /// Snapshot of the new root's subtree.
    tree: ElementTree,
  },

  // Window lifecycle
  #[serde(rename = "window:closed")]
  WindowClosed { source: EventSource },
  #[serde(rename = "window:properties")]
  WindowProperties {
    source: EventSource,
    position: Point,
    size: Size,
    focused: bool,
  },

  // Input tracking, scene coordinates
  #[serde(rename = "mouse:position")]
  MousePos { source: EventSource, position: Point },

  /// Any host event observed on an instrumented node.
  #[serde(rename = "scene:event")]
  Forwarded {
    source: EventSource,
    element: Element,
    event_type: String,
    value: String,
  },

  #[serde(rename = "exception")]
  Exception {
    source: EventSource,
    class_name: String,
    message: String,
    stack_trace: String,
  },
}

impl ConnectorEvent {
  /// Exception event describing `error`.
  pub fn exception(source: EventSource, error: &ScopeError) -> Self {
    Self::Exception {
      source,
      class_name: error.kind().to_owned(),
      message: error.to_string(),
      stack_trace: error.trace(),
    }
  }

  pub const fn event_type(&self) -> EventType {
    match self {
      Self::AttributeList { .. } => EventType::AttributeList,
      Self::AttributeUpdated { .. } => EventType::AttributeUpdated,
      Self::NodeAdded { .. } => EventType::NodeAdded,
      Self::NodeRemoved { .. } => EventType::NodeRemoved,
      Self::NodeSelected { .. } => EventType::NodeSelected,
      Self::NodeStyleClass { .. } => EventType::NodeStyleClass,
      Self::NodeVisibility { .. } => EventType::NodeVisibility,
      Self::RootChanged { .. } => EventType::RootChanged,
      Self::WindowClosed { .. } => EventType::WindowClosed,
      Self::WindowProperties { .. } => EventType::WindowProperties,
      Self::MousePos { .. } => EventType::MousePos,
      Self::Forwarded { .. } => EventType::Forwarded,
      Self::Exception { .. } => EventType::Exception,
    }
  }

  pub const fn source(&self) -> &EventSource {
    match self {
      Self::AttributeList { source, .. }
      | Self::AttributeUpdated { source, .. }
      | Self::NodeAdded { source, .. }
      | Self::NodeRemoved { source, .. }
      | Self::NodeSelected { source, .. }
      | Self::NodeStyleClass { source, .. }
      | Self::NodeVisibility { source, .. }
      | Self::RootChanged { source, .. }
      | Self::WindowClosed { source }
      | Self::WindowProperties { source, .. }
      | Self::MousePos { source, .. }
      | Self::Forwarded { source, .. }
      | Self::Exception { source, .. } => source,
    }
  }

  /// Element carried by element events.
  pub const fn element(&self) -> Option<&Element> {
    match self {
      Self::AttributeList { element, .. }
      | Self::AttributeUpdated { element, .. }
      | Self::NodeAdded { element, .. }
      | Self::NodeRemoved { element, .. }
      | Self::NodeSelected { element, .. }
      | Self::NodeStyleClass { element, .. }
      | Self::NodeVisibility { element, .. }
      | Self::RootChanged { element, .. }
      | Self::Forwarded { element, .. } => Some(element),
      Self::WindowClosed { .. }
      | Self::WindowProperties { .. }
      | Self::MousePos { .. }
      | Self::Exception { .. } => None,
    }
  }

  /// One-line description for logs.
  pub fn to_log_string(&self) -> String {
    let source = self.source().to_log_string();
    match self {
      Self::AttributeList {
        element,
        category,
        attributes,
        ..
      } => {
        let attrs: Vec<String> = attributes.iter().map(Attribute::to_log_string).collect();
        format!(
          "source={source} | class={} | category={category} | attributes=[{}]",
          element.simple_class_name(),
          attrs.join("; ")
        )
      }
      Self::AttributeUpdated {
        element,
        category,
        attribute,
        ..
      } => format!(
        "source={source} | class={} | category={category} | attribute={}",
        element.simple_class_name(),
        attribute.to_log_string()
      ),
      Self::NodeAdded { element, .. }
      | Self::NodeRemoved { element, .. }
      | Self::NodeSelected { element, .. }
      | Self::RootChanged { element, .. } => {
        format!("source={source} | element={}", element.to_log_string())
      }
      Self::NodeStyleClass {
        element, style_class, ..
      } => format!(
        "source={source} | element={} | styleClass={}",
        element.to_log_string(),
        style_class.join(" ")
      ),
      Self::NodeVisibility { element, visible, .. } => format!(
        "source={source} | element={} | visible={visible}",
        element.to_log_string()
      ),
      Self::WindowClosed { .. } => format!("source={source}"),
      Self::WindowProperties {
        position,
        size,
        focused,
        ..
      } => format!(
        "source={source} | x={} y={} | width={} height={} | focused={focused}",
        position.x, position.y, size.width, size.height
      ),
      Self::MousePos { position, .. } => {
        format!("source={source} | x={} y={}", position.x, position.y)
      }
      Self::Forwarded {
        event_type, value, ..
      } => format!("source={source} | type={event_type} | value={value}"),
      Self::Exception {
        class_name, message, ..
      } => format!("source={source} | class={class_name} | message={message}"),
    }
  }
}
