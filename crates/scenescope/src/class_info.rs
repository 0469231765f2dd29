/*!
Memoized naming of concrete toolkit types.

Anonymous and synthetic wrapper types carry no useful simple name, so lookup
walks up the ancestry until it reaches a named type. Results are keyed by the
concrete type's full name.
*/

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::platform::TypeInfo;
use crate::types::ClassInfo;

/// Explicit, shareable class-info cache. Clone is cheap (Arc bump).
#[derive(Debug, Clone, Default)]
pub struct ClassInfoCache {
  entries: Arc<RwLock<HashMap<String, ClassInfo>>>,
}

impl ClassInfoCache {
  pub fn new() -> Self {
    Self::default()
  }

  /// Naming of `info`, or of its nearest named ancestor.
  pub fn class_info(&self, info: &Arc<TypeInfo>) -> ClassInfo {
    if let Some(hit) = self.entries.read().get(&info.name) {
      return hit.clone();
    }
    let resolved = resolve(info);
    self
      .entries
      .write()
      .entry(info.name.clone())
      .or_insert(resolved)
      .clone()
  }

  pub fn clear(&self) {
    self.entries.write().clear();
  }

  pub fn len(&self) -> usize {
    self.entries.read().len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.read().is_empty()
  }
}

fn is_synthetic(info: &TypeInfo) -> bool {
  info.simple_name.is_empty() || info.simple_name.contains('$')
}

fn resolve(info: &Arc<TypeInfo>) -> ClassInfo {
  // Fall back to the concrete type when the whole chain is synthetic
  let named = info
    .ancestry()
    .find(|t| !is_synthetic(t))
    .unwrap_or_else(|| Arc::clone(info));
  ClassInfo {
    module: named.module.clone(),
    name: named.name.clone(),
    simple_name: named.simple_name.clone(),
  }
}
