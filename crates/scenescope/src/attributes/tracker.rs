/*!
Tracker core: one optional target, one category, full and partial reloads.

The category-specific part is an [`AttributeReader`]. The tracker owns the
acquire/release discipline: a new target is only watched after the previous
target's subscriptions are fully released.
*/

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use super::property_listener::{ChangeCallback, PropertyListener};
use super::trackers;
use crate::core::Ctx;
use crate::platform::{Channel, Listener, Notification, SubscriptionId, Toolkit, PROPERTY_SUFFIX, USE_COMPUTED_SIZE};
use crate::types::{
  Attribute, AttributeCategory, Color, ConnectorEvent, DisplayHint, ObservableType, PropValue, Target,
  ValueState,
};

/// Category-specific attribute reading.
pub(crate) trait AttributeReader {
  /// Whether this reader handles `target`.
  fn accepts(&self, host: &dyn Toolkit, target: Target) -> bool;

  /// Effective target for an accepted candidate.
  fn resolve_target(&self, target: Target) -> Target {
    target
  }

  /// Attribute names a full reload lists, in order.
  fn supported(&self, r: &Reading<'_>) -> Vec<String>;

  /// Read one attribute. `None` when unsupported for this target.
  fn read(&self, r: &Reading<'_>, name: &str) -> Option<Attribute>;

  /// Extra change streams, and the attributes each one reloads.
  fn extra_watched(&self) -> Vec<(Channel, &'static [&'static str])> {
    Vec::new()
  }
}

impl AttributeCategory {
  pub(crate) fn reader(self) -> Box<dyn AttributeReader> {
    match self {
      Self::Control => Box::new(trackers::ControlReader),
      Self::GridPane => Box::new(trackers::GridPaneReader),
      Self::Labeled => Box::new(trackers::LabeledReader),
      Self::ImageView => Box::new(trackers::ImageViewReader),
      Self::Node => Box::new(trackers::NodeReader),
      Self::Parent => Box::new(trackers::ParentReader),
      Self::Reflective => Box::new(trackers::ReflectiveReader),
      Self::Region => Box::new(trackers::RegionReader),
      Self::Scene => Box::new(trackers::SceneReader),
      Self::Shape => Box::new(trackers::ShapeReader),
      Self::Text => Box::new(trackers::TextReader),
      Self::Window => Box::new(trackers::WindowReader),
    }
  }

  /// Statically declared attribute names. Empty for the reflective category,
  /// whose names are discovered per target.
  pub fn supported_properties(self) -> &'static [&'static str] {
    match self {
      Self::Control => trackers::CONTROL_PROPERTIES,
      Self::GridPane => trackers::GRID_PANE_PROPERTIES,
      Self::Labeled => trackers::LABELED_PROPERTIES,
      Self::ImageView => trackers::IMAGE_VIEW_PROPERTIES,
      Self::Node => trackers::NODE_PROPERTIES,
      Self::Parent => trackers::PARENT_PROPERTIES,
      Self::Reflective => &[],
      Self::Region => trackers::REGION_PROPERTIES,
      Self::Scene => trackers::SCENE_PROPERTIES,
      Self::Shape => trackers::SHAPE_PROPERTIES,
      Self::Text => trackers::TEXT_PROPERTIES,
      Self::Window => trackers::WINDOW_PROPERTIES,
    }
  }
}

/// Live view of a target while reading attributes.
pub(crate) struct Reading<'a> {
  pub(crate) host: &'a dyn Toolkit,
  pub(crate) target: Target,
  pub(crate) properties: &'a PropertyListener,
}

impl Reading<'_> {
  /// Current value, `Null` when the target has no such property.
  pub(crate) fn value(&self, name: &str) -> PropValue {
    self
      .host
      .property(self.target, name)
      .map_or(PropValue::Null, |snapshot| snapshot.value)
  }

  pub(crate) fn has(&self, name: &str) -> bool {
    self.host.property(self.target, name).is_some()
  }

  pub(crate) fn observable_type(&self, name: &str) -> ObservableType {
    self
      .properties
      .get(name)
      .map_or(ObservableType::NotObservable, |o| o.kind)
  }

  /// Attribute backed by the property `name`, if the target has it.
  pub(crate) fn attribute(
    &self,
    name: &str,
    hint: DisplayHint,
    state: impl FnOnce(&PropValue) -> ValueState,
  ) -> Option<Attribute> {
    let snapshot = self.host.property(self.target, name)?;
    let observable_type = self.observable_type(name);
    let value_state = state(&snapshot.value);
    let attr = Attribute::new(name, snapshot.value, observable_type, hint, value_state);
    Some(if observable_type == ObservableType::NotObservable {
      attr
    } else {
      attr.with_field(format!("{name}{PROPERTY_SUFFIX}"))
    })
  }

  pub(crate) fn boolean(&self, name: &str, default: bool) -> Option<Attribute> {
    self.attribute(name, DisplayHint::Boolean, |v| {
      ValueState::default_if(v.as_bool() == Some(default))
    })
  }

  pub(crate) fn number(&self, name: &str, default: f64) -> Option<Attribute> {
    self.attribute(name, DisplayHint::Numeric, |v| {
      ValueState::default_if(v.as_f64() == Some(default))
    })
  }

  pub(crate) fn number_auto(&self, name: &str) -> Option<Attribute> {
    self.attribute(name, DisplayHint::Numeric, |_| ValueState::Auto)
  }

  /// Sizing attribute, default iff it asks for the computed size.
  pub(crate) fn size(&self, name: &str) -> Option<Attribute> {
    self.number(name, USE_COMPUTED_SIZE)
  }

  /// Text attribute, default iff unset or empty.
  pub(crate) fn text(&self, name: &str) -> Option<Attribute> {
    self.attribute(name, DisplayHint::Text, |v| {
      ValueState::default_if(v.as_str().map_or(true, str::is_empty))
    })
  }

  /// Text attribute, default iff equal to `default`.
  pub(crate) fn text_or(&self, name: &str, default: &str) -> Option<Attribute> {
    self.attribute(name, DisplayHint::Text, |v| {
      ValueState::default_if(v.as_str() == Some(default))
    })
  }

  /// Enumeration attribute. Unset counts as default.
  pub(crate) fn choice(&self, name: &str, default: &str) -> Option<Attribute> {
    let attr = self.attribute(name, DisplayHint::Enum, |v| {
      ValueState::default_if(v.is_null() || v.enum_value() == Some(default))
    })?;
    let valid = domain_of(&attr.value);
    Some(attr.with_valid_values(valid))
  }

  /// Enumeration attribute whose domain is not carried by the value.
  pub(crate) fn choice_in(&self, name: &str, domain: &[&str]) -> Option<Attribute> {
    let attr = self.attribute(name, DisplayHint::Enum, |v| ValueState::default_if(v.is_null()))?;
    Some(attr.with_valid_values(domain.iter().map(|d| PropValue::text(*d)).collect()))
  }

  pub(crate) fn color(&self, name: &str, default: Color) -> Option<Attribute> {
    self.attribute(name, DisplayHint::Color, |v| {
      ValueState::default_if(v.as_color() == Some(default))
    })
  }

  /// Insets attribute, default iff unset or empty.
  pub(crate) fn insets(&self, name: &str) -> Option<Attribute> {
    self.attribute(name, DisplayHint::Insets, |v| {
      ValueState::default_if(v.as_insets().map_or(true, |i| i.is_empty()))
    })
  }

  /// Object-valued attribute, default iff unset.
  pub(crate) fn object(&self, name: &str, hint: DisplayHint) -> Option<Attribute> {
    self.attribute(name, hint, |v| ValueState::default_if(v.is_null()))
  }

  /// Read-only attribute whose default cannot be judged.
  pub(crate) fn auto(&self, name: &str, hint: DisplayHint) -> Option<Attribute> {
    self.attribute(name, hint, |_| ValueState::Auto)
  }

  /// List-valued attribute joined into text, read through its getter.
  pub(crate) fn list(&self, name: &str, separator: &str, observable_type: ObservableType) -> Option<Attribute> {
    self.list_from(name, name, separator, observable_type, DisplayHint::Text)
  }

  /// List-valued attribute `name` backed by the list property `property`.
  pub(crate) fn list_from(
    &self,
    name: &str,
    property: &str,
    separator: &str,
    observable_type: ObservableType,
    hint: DisplayHint,
  ) -> Option<Attribute> {
    let snapshot = self.host.property(self.target, property)?;
    let items = snapshot.value.as_list().map(<[String]>::to_vec).unwrap_or_default();
    Some(
      Attribute::new(
        name,
        PropValue::Text(items.join(separator)),
        observable_type,
        hint,
        ValueState::default_if(items.is_empty()),
      )
      .with_field(getter_name(property)),
    )
  }

  /// List-valued attribute reported item by item. Default iff empty.
  pub(crate) fn items(&self, name: &str, hint: DisplayHint) -> Option<Attribute> {
    let value = self.host.property(self.target, name)?.value;
    let empty = value.as_list().map_or(true, <[String]>::is_empty);
    Some(
      Attribute::new(name, value, ObservableType::List, hint, ValueState::default_if(empty))
        .with_field(getter_name(name)),
    )
  }

  /// Attribute computed by the reader rather than read from a property.
  pub(crate) fn computed(&self, name: &str, value: PropValue, hint: DisplayHint) -> Attribute {
    Attribute::new(name, value, ObservableType::NotObservable, hint, ValueState::Auto)
  }
}

fn domain_of(value: &PropValue) -> Vec<PropValue> {
  match value {
    PropValue::Enum { domain, .. } => domain.iter().map(|d| PropValue::Text(d.clone())).collect(),
    _ => Vec::new(),
  }
}

/// Builder helpers on optional attributes, so reader tables stay flat.
pub(crate) trait AttributeExt {
  /// Style-engine name derived from the attribute name.
  fn css(self) -> Self;
  fn css_as(self, property: &str) -> Self;
  fn valid(self, values: Vec<PropValue>) -> Self;
}

impl AttributeExt for Option<Attribute> {
  fn css(self) -> Self {
    self.map(|a| {
      let css = css_name(&a.name);
      a.with_css(css)
    })
  }

  fn css_as(self, property: &str) -> Self {
    self.map(|a| a.with_css(property))
  }

  fn valid(self, values: Vec<PropValue>) -> Self {
    self.map(|a| a.with_valid_values(values))
  }
}

/// `graphicTextGap` → `-fx-graphic-text-gap`.
pub(crate) fn css_name(name: &str) -> String {
  let mut css = String::from("-fx-");
  for c in name.chars() {
    if c.is_ascii_uppercase() {
      css.push('-');
      css.push(c.to_ascii_lowercase());
    } else {
      css.push(c);
    }
  }
  css
}

/// `styleClass` → `getStyleClass`.
pub(crate) fn getter_name(name: &str) -> String {
  let mut chars = name.chars();
  match chars.next() {
    Some(first) => format!("get{}{}", first.to_ascii_uppercase(), chars.as_str()),
    None => "get".to_owned(),
  }
}

/// Attribute tracker for one category.
pub struct Tracker {
  category: AttributeCategory,
  reader: Box<dyn AttributeReader>,
  ctx: Ctx,
  target: Option<Target>,
  properties: PropertyListener,
  extra: Vec<SubscriptionId>,
  this: Weak<RefCell<Tracker>>,
}

impl std::fmt::Debug for Tracker {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Tracker")
      .field("category", &self.category)
      .field("target", &self.target)
      .finish_non_exhaustive()
  }
}

impl Tracker {
  pub(crate) fn new(category: AttributeCategory, ctx: Ctx) -> Rc<RefCell<Self>> {
    Rc::new_cyclic(|this| {
      RefCell::new(Self {
        category,
        reader: category.reader(),
        ctx,
        target: None,
        properties: PropertyListener::new(),
        extra: Vec::new(),
        this: this.clone(),
      })
    })
  }

  pub fn category(&self) -> AttributeCategory {
    self.category
  }

  pub fn target(&self) -> Option<Target> {
    self.target
  }

  pub(crate) fn accepts(&self, target: Target) -> bool {
    self.reader.accepts(self.ctx.host.as_ref(), target)
  }

  /// Acquire `target`, or reset on `None`.
  ///
  /// Returns false when nothing changed (same target as before).
  pub(crate) fn set_target(&mut self, target: Option<Target>) -> bool {
    let Some(candidate) = target else {
      return self.reset();
    };
    let resolved = self.reader.resolve_target(candidate);
    if self.target == Some(resolved) {
      return false;
    }

    self.release();
    let host = Rc::clone(&self.ctx.host);
    let on_change = self.change_callback();
    self.properties.use_target(host.as_ref(), resolved, on_change);
    self.watch_extra(host.as_ref(), resolved);
    self.target = Some(resolved);
    self.reload(&[]);
    true
  }

  /// Drop the target. Emits an empty list for it, if there was one.
  pub(crate) fn reset(&mut self) -> bool {
    let Some(previous) = self.target else {
      return false;
    };
    self.release();
    self.emit_list(previous, Vec::new());
    true
  }

  /// Release every subscription without emitting anything.
  pub(crate) fn release(&mut self) {
    let host = Rc::clone(&self.ctx.host);
    self.properties.release(host.as_ref());
    for id in self.extra.drain(..) {
      host.unsubscribe(id);
    }
    self.target = None;
  }

  /// Zero names: one list event. One name: one update event. Several names:
  /// one update event per resolvable name, in order.
  pub(crate) fn reload(&self, names: &[&str]) {
    let Some(target) = self.target else {
      return;
    };
    let reading = Reading {
      host: self.ctx.host.as_ref(),
      target,
      properties: &self.properties,
    };

    if names.is_empty() {
      let attributes = self
        .reader
        .supported(&reading)
        .iter()
        .filter_map(|name| self.reader.read(&reading, name))
        .collect();
      self.emit_list(target, attributes);
      return;
    }

    for name in names {
      if let Some(attribute) = self.reader.read(&reading, name) {
        self.emit_updated(target, attribute);
      }
    }
  }

  fn change_callback(&self) -> ChangeCallback {
    let this = self.this.clone();
    Rc::new(move |name: &str| reload_from_host(&this, &[name]))
  }

  fn watch_extra(&mut self, host: &dyn Toolkit, target: Target) {
    for (channel, names) in self.reader.extra_watched() {
      let this = self.this.clone();
      let listener: Listener = Rc::new(move |_: &Notification| reload_from_host(&this, names));
      match host.subscribe(target, channel, listener) {
        Ok(id) => self.extra.push(id),
        Err(e) => log::info!("{} tracker cannot watch {target}: {e}", self.category),
      }
    }
  }

  fn emit_list(&self, target: Target, attributes: Vec<Attribute>) {
    match self.ctx.target_element(target) {
      Ok(element) => self.ctx.emit(ConnectorEvent::AttributeList {
        source: self.ctx.source.clone(),
        element,
        category: self.category,
        attributes,
      }),
      Err(e) => log::warn!("{} tracker: cannot resolve {target}: {e}", self.category),
    }
  }

  fn emit_updated(&self, target: Target, attribute: Attribute) {
    match self.ctx.target_element(target) {
      Ok(element) => self.ctx.emit(ConnectorEvent::AttributeUpdated {
        source: self.ctx.source.clone(),
        element,
        category: self.category,
        attribute,
      }),
      Err(e) => log::warn!("{} tracker: cannot resolve {target}: {e}", self.category),
    }
  }
}

/// Host callback entry: reload under a shared borrow, then flush.
fn reload_from_host(this: &Weak<RefCell<Tracker>>, names: &[&str]) {
  let Some(tracker) = this.upgrade() else {
    return;
  };
  let ctx = {
    let Ok(tracker) = tracker.try_borrow() else {
      log::warn!("Tracker busy, dropping reload of {names:?}");
      return;
    };
    tracker.reload(names);
    tracker.ctx.clone()
  };
  ctx.flush();
}
