use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A small named tree of scalar/list metadata values.
///
/// Mirrors the original tiler's `metadata()` accessor: the stage exposes one
/// root `"tileSet"` node carrying `maxLevel`, the grid shape and the input
/// dimension list, which a consuming pipeline can merge into its own
/// metadata tree. `geotile-io::filetree` serializes this same structure into
/// `header.json`'s `dimensions` array.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetadataNode {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub children: Vec<MetadataNode>,
}

impl MetadataNode {
    pub fn leaf(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
            children: Vec::new(),
        }
    }

    pub fn branch(name: impl Into<String>, children: Vec<MetadataNode>) -> Self {
        Self {
            name: name.into(),
            value: None,
            children,
        }
    }

    pub fn child(&self, name: &str) -> Option<&MetadataNode> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn push(&mut self, child: MetadataNode) {
        self.children.push(child);
    }
}
