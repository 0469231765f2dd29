/*! Runtime options shared by the connector and its monitors. */

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Connector-wide switches. Every monitor reads the current value on use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[allow(clippy::struct_excessive_bools)]
pub struct ConnectorOptions {
  /// Pointer hover highlights nodes and a press reports the node under it.
  pub inspect_mode: bool,
  /// Hit testing also considers mouse transparent nodes.
  pub ignore_mouse_transparent: bool,
  /// Keep popups open when they lose focus.
  pub prevent_popup_auto_hide: bool,
}
