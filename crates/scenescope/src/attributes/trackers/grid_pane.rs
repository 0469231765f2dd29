//! Grid pane gaps, alignment and constraints.

use super::region::{has_archetype, names};
use crate::attributes::tracker::{AttributeExt, AttributeReader, Reading};
use crate::platform::{Archetypes, Channel, Toolkit};
use crate::types::{Attribute, DisplayHint, Target};

pub const GRID_PANE_PROPERTIES: &[&str] = &[
  "hgap",
  "vgap",
  "alignment",
  "gridLinesVisible",
  "rowConstraints",
  "columnConstraints",
];

pub(crate) struct GridPaneReader;

impl AttributeReader for GridPaneReader {
  fn accepts(&self, host: &dyn Toolkit, target: Target) -> bool {
    has_archetype(host, target, Archetypes::GRID_PANE)
  }

  fn supported(&self, _r: &Reading<'_>) -> Vec<String> {
    names(GRID_PANE_PROPERTIES)
  }

  fn read(&self, r: &Reading<'_>, name: &str) -> Option<Attribute> {
    match name {
      "hgap" | "vgap" => r.number(name, 0.0).css(),
      "alignment" => r.choice(name, "TOP_LEFT").css(),
      "gridLinesVisible" => r.boolean(name, false).css(),
      "rowConstraints" => r.items(name, DisplayHint::RowConstraints),
      "columnConstraints" => r.items(name, DisplayHint::ColumnConstraints),
      _ => None,
    }
  }

  fn extra_watched(&self) -> Vec<(Channel, &'static [&'static str])> {
    vec![
      (Channel::Property("rowConstraints".into()), &["rowConstraints"]),
      (Channel::Property("columnConstraints".into()), &["columnConstraints"]),
    ]
  }
}
