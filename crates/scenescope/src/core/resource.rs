/*!
Stylesheet resource loading.

The connector only asks for URIs a live stylesheet references; the accessor
itself does no gating.
*/

use std::path::PathBuf;

use crate::types::{ScopeError, ScopeResult};

/// Reads the text of a stylesheet resource.
pub trait ResourceAccessor {
  fn read(&self, uri: &str) -> ScopeResult<String>;
}

/// Reads `file:` URIs and plain paths from the local file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsResourceAccessor;

impl FsResourceAccessor {
  /// Local path of `uri`. Other schemes are not supported.
  pub fn path_of(uri: &str) -> ScopeResult<PathBuf> {
    if let Some(rest) = uri.strip_prefix("file:") {
      // file:///abs, file://localhost/abs and file:/abs
      let path = rest
        .strip_prefix("//localhost")
        .or_else(|| rest.strip_prefix("//"))
        .unwrap_or(rest);
      return Ok(PathBuf::from(percent_decode(path)));
    }
    match uri.split_once("://") {
      Some((scheme, _)) if !scheme.is_empty() && scheme.chars().all(|c| c.is_ascii_alphanumeric()) => {
        Err(ScopeError::NotSupported(format!("resource scheme '{scheme}'")))
      }
      _ => Ok(PathBuf::from(uri)),
    }
  }
}

impl ResourceAccessor for FsResourceAccessor {
  fn read(&self, uri: &str) -> ScopeResult<String> {
    let path = Self::path_of(uri)?;
    std::fs::read_to_string(&path).map_err(|source| ScopeError::Resource {
      uri: uri.to_owned(),
      source,
    })
  }
}

/// Decode `%XX` escapes. Malformed escapes are kept as is.
fn percent_decode(input: &str) -> String {
  let mut out = Vec::with_capacity(input.len());
  let mut rest = input.as_bytes();
  while let Some((&first, tail)) = rest.split_first() {
    let decoded = match (first, tail) {
      (b'%', [hi, lo, ..]) => hex_value(*hi).zip(hex_value(*lo)).map(|(h, l)| (h << 4) | l),
      _ => None,
    };
    match decoded {
      Some(byte) => {
        out.push(byte);
        rest = tail.get(2..).unwrap_or_default();
      }
      None => {
        out.push(first);
        rest = tail;
      }
    }
  }
  String::from_utf8_lossy(&out).into_owned()
}

fn hex_value(digit: u8) -> Option<u8> {
  char::from(digit).to_digit(16).and_then(|d| u8::try_from(d).ok())
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::path::Path;

  #[test]
  fn file_uri_forms() {
    assert_eq!(FsResourceAccessor::path_of("file:///tmp/a.css").unwrap(), Path::new("/tmp/a.css"));
    assert_eq!(
      FsResourceAccessor::path_of("file://localhost/tmp/a.css").unwrap(),
      Path::new("/tmp/a.css")
    );
    assert_eq!(FsResourceAccessor::path_of("file:/tmp/a.css").unwrap(), Path::new("/tmp/a.css"));
    assert_eq!(
      FsResourceAccessor::path_of("file:///tmp/my%20style.css").unwrap(),
      Path::new("/tmp/my style.css")
    );
  }

  #[test]
  fn malformed_escapes_are_kept() {
    assert_eq!(percent_decode("a%2"), "a%2");
    assert_eq!(percent_decode("%"), "%");
    assert_eq!(percent_decode("%zz.css"), "%zz.css");
    assert_eq!(percent_decode("%+1"), "%+1");
    assert_eq!(percent_decode("%41%4"), "A%4");
    assert_eq!(percent_decode("caf%C3%A9"), "café");
  }

  #[test]
  fn plain_paths_pass_through() {
    assert_eq!(FsResourceAccessor::path_of("styles/app.css").unwrap(), Path::new("styles/app.css"));
  }

  #[test]
  fn remote_schemes_are_rejected() {
    let err = FsResourceAccessor::path_of("https://example.com/a.css").unwrap_err();
    assert_eq!(err.kind(), "NotSupported");
  }

  #[test]
  fn reads_file_contents() {
    let path = std::env::temp_dir().join(format!("scenescope-{}.css", std::process::id()));
    std::fs::write(&path, ".root { -fx-base: red; }").unwrap();
    let uri = format!("file://{}", path.display());
    assert_eq!(FsResourceAccessor.read(&uri).unwrap(), ".root { -fx-base: red; }");
    std::fs::remove_file(&path).unwrap();
  }

  #[test]
  fn missing_file_keeps_io_cause() {
    let err = FsResourceAccessor.read("file:///definitely/not/here.css").unwrap_err();
    assert_eq!(err.kind(), "Resource");
    assert!(err.trace().contains("caused by:"));
  }
}
