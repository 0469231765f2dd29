/*!
Process and toolkit environment of the observed application.

Everything is read once, at [`Env::collect`] time.
*/

use serde::Serialize;
use ts_rs::TS;

use crate::platform::Toolkit;

/// One named value, displayed as text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, TS)]
#[ts(export)]
pub struct KeyValue {
  pub key: String,
  pub value: String,
}

impl KeyValue {
  pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
    Self {
      key: key.into(),
      value: value.into(),
    }
  }
}

/// Snapshot of the environment the observed application runs in.
#[derive(Debug, Clone, Default, Serialize, TS)]
#[ts(export)]
pub struct Env {
  /// Environment variables, sorted by name.
  pub variables: Vec<KeyValue>,
  /// Properties of the running process.
  pub process: Vec<KeyValue>,
  /// Toolkit preferences, in host order.
  pub preferences: Vec<KeyValue>,
}

impl Env {
  pub fn collect(host: &dyn Toolkit) -> Self {
    let env = Self {
      variables: variables(),
      process: process(),
      preferences: host
        .platform_preferences()
        .into_iter()
        .map(|(key, value)| KeyValue::new(key, value))
        .collect(),
    };
    log::debug!(
      "Collected env: {} variables, {} preferences",
      env.variables.len(),
      env.preferences.len()
    );
    env
  }
}

fn variables() -> Vec<KeyValue> {
  // vars() panics on non-unicode entries
  let mut vars: Vec<KeyValue> = std::env::vars_os()
    .map(|(k, v)| KeyValue::new(k.to_string_lossy(), v.to_string_lossy()))
    .collect();
  vars.sort();
  vars
}

fn process() -> Vec<KeyValue> {
  let path_or_empty = |p: std::io::Result<std::path::PathBuf>| {
    p.map(|p| p.display().to_string()).unwrap_or_default()
  };
  vec![
    KeyValue::new("os", std::env::consts::OS),
    KeyValue::new("arch", std::env::consts::ARCH),
    KeyValue::new("family", std::env::consts::FAMILY),
    KeyValue::new("pid", std::process::id().to_string()),
    KeyValue::new("currentDir", path_or_empty(std::env::current_dir())),
    KeyValue::new("executable", path_or_empty(std::env::current_exe())),
  ]
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::platform::MemoryToolkit;

  #[test]
  fn variables_are_sorted() {
    let env = Env::collect(MemoryToolkit::new().as_ref());
    let keys: Vec<&str> = env.variables.iter().map(|kv| kv.key.as_str()).collect();
    let mut sorted = keys.clone();
    sorted.sort_unstable();
    assert_eq!(keys, sorted);
  }

  #[test]
  fn process_properties() {
    let env = Env::collect(MemoryToolkit::new().as_ref());
    let get = |key: &str| {
      env
        .process
        .iter()
        .find(|kv| kv.key == key)
        .map(|kv| kv.value.clone())
    };
    assert_eq!(get("os").as_deref(), Some(std::env::consts::OS));
    assert_eq!(get("pid"), Some(std::process::id().to_string()));
    assert!(get("executable").is_some_and(|e| !e.is_empty()));
  }

  #[test]
  fn host_preferences_are_copied() {
    let tk = MemoryToolkit::new();
    tk.set_preference("colorScheme", "DARK");
    let env = Env::collect(tk.as_ref());
    assert!(env.preferences.contains(&KeyValue::new("colorScheme", "DARK")));
  }

  #[test]
  fn serializes_as_key_value_object() {
    let json = serde_json::to_value(KeyValue::new("a", "b")).unwrap();
    assert_eq!(json, serde_json::json!({ "key": "a", "value": "b" }));
  }
}
