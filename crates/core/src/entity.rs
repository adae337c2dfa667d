//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Storage adapters key their tables by `Entity::id`, so the id must be
/// cheap to copy and hashable.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> Self::Id;

    /// Returns a copy of `self` carrying the given id (used when a store assigns ids).
    fn with_id(self, id: Self::Id) -> Self;
}
