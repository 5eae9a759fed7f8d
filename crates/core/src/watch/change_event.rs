use std::fmt;

use serde_json::Value;

/// Kind of mutation reported by a change feed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OperationType {
    Insert,
    Update,
    Replace,
    Delete,
    Other(String),
}

impl OperationType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Replace => "replace",
            Self::Delete => "delete",
            Self::Other(op) => op,
        }
    }

    /// Operations that produce notifications.
    pub fn is_watched(&self) -> bool {
        matches!(self, Self::Insert | Self::Update | Self::Replace)
    }
}

impl From<&str> for OperationType {
    fn from(op: &str) -> Self {
        match op {
            "insert" => Self::Insert,
            "update" => Self::Update,
            "replace" => Self::Replace,
            "delete" => Self::Delete,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operation types requested from every change feed subscription.
pub fn watched_operations() -> [OperationType; 3] {
    [
        OperationType::Insert,
        OperationType::Update,
        OperationType::Replace,
    ]
}

/// One mutation on a watched collection.
///
/// `full_document` is the post-change document when the feed could resolve
/// it; deletes and some update shapes arrive without one.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    pub collection: String,
    pub operation: OperationType,
    pub full_document: Option<Value>,
}

impl ChangeEvent {
    pub fn new(collection: &str, operation: OperationType, full_document: Option<Value>) -> Self {
        Self {
            collection: collection.to_string(),
            operation,
            full_document,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watched_operations() {
        for op in watched_operations() {
            assert!(op.is_watched());
        }
        assert!(!OperationType::Delete.is_watched());
        assert!(!OperationType::from("invalidate").is_watched());
        assert_eq!(OperationType::from("replace"), OperationType::Replace);
    }
}
