use serde::Deserialize;
use serde_json::Value;

/// The parts of a `_bulk` response the loader looks at.
#[derive(Debug, Deserialize, Clone)]
pub struct BulkResponse {
    #[serde(default)]
    took: u64,
    #[serde(default)]
    errors: bool,
    #[serde(default)]
    items: Vec<Value>,
}

impl BulkResponse {
    pub fn get_took(&self) -> u64 {
        self.took
    }
    pub fn has_errors(&self) -> bool {
        self.errors
    }
    pub fn get_items_count(&self) -> usize {
        self.items.len()
    }
}
