use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{LoaderError, Result};

const COMMENT_MARKER: &str = "//";

/// Joins a resource location like `/ogc/ogc.json` onto the resource root.
pub fn resolve(root: &Path, location: &str) -> PathBuf {
    root.join(location.trim_start_matches('/'))
}

/// Drops every line whose trimmed text starts with `//` and terminates each
/// kept line with `\n`, which is what `_bulk` expects.
pub fn strip_comments(content: &str) -> String {
    let mut builder = String::with_capacity(content.len());
    for line in content.lines() {
        if !line.trim().starts_with(COMMENT_MARKER) {
            builder.push_str(line);
            builder.push('\n');
        }
    }
    builder
}

pub async fn read_resource(root: &Path, location: &str) -> Result<String> {
    let path = resolve(root, location);
    debug!("Reading resource {} from {:?}", location, path);

    let content = match tokio::fs::read_to_string(&path).await {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(LoaderError::ResourceNotFound(location.to_string()))
        }
        Err(e) => return Err(e.into()),
    };
    Ok(strip_comments(&content))
}
