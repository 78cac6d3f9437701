//! Segment identity and its auto-enrollment percentage.

/// A named segment a user may belong to, with the complement of its caller-
/// supplied "hit percentage" stored as `automatic_percentage`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Segment {
    pub id: i64,
    pub name: String,
    pub automatic_percentage: i32,
}

/// Lightweight `(id, name)` projection, used wherever only identity matters
/// (resolving add/delete lists to ids, auto-enrollment selection).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SegmentInfo {
    pub id: i64,
    pub name: String,
}
