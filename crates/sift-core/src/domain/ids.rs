//! Domain identifiers (strongly-typed IDs).
//!
//! Every stored record is addressed by a ULID assigned by the record store.
//! `Id<T>` wraps the ULID with a phantom marker so a `ReviewerId` can never be
//! passed where a `SubmitterId` is expected.
//!
//! ## ULID の特性
//! - **時刻でソート可能**: timestamp が先頭にあるため、生成順序でおおむねソートできる
//! - **分散生成可能**: 調整なしで複数プロセスで生成できる

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use ulid::Ulid;

/// IdMarker は各 ID 型のマーカー trait
///
/// Display で使うプレフィックス（"sub-", "rev-", ...）を提供します。
pub trait IdMarker: Send + Sync + 'static {
    fn prefix() -> &'static str;
}

/// Generic record identifier.
///
/// `T` is only a compile-time tag; the in-memory size equals a bare ULID.
#[repr(transparent)]
#[derive(Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id<T: IdMarker> {
    ulid: Ulid,
    #[serde(skip)]
    _marker: PhantomData<T>,
}

impl<T: IdMarker> Id<T> {
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self {
            ulid,
            _marker: PhantomData,
        }
    }

    pub fn as_ulid(&self) -> Ulid {
        self.ulid
    }
}

// Manual impls: derives would require `T: Clone + Eq + ...` on the marker.
impl<T: IdMarker> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: IdMarker> Copy for Id<T> {}

impl<T: IdMarker> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ulid == other.ulid
    }
}

impl<T: IdMarker> Eq for Id<T> {}

impl<T: IdMarker> std::hash::Hash for Id<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.ulid.hash(state);
    }
}

impl<T: IdMarker> PartialOrd for Id<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: IdMarker> Ord for Id<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.ulid.cmp(&other.ulid)
    }
}

impl<T: IdMarker> From<Ulid> for Id<T> {
    fn from(ulid: Ulid) -> Self {
        Self::from_ulid(ulid)
    }
}

impl<T: IdMarker> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", T::prefix(), self.ulid)
    }
}

impl<T: IdMarker> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", T::prefix(), self.ulid)
    }
}

// ========================================
// マーカー型の定義
// ========================================

/// Submitter のマーカー型
pub enum Submitter {}

impl IdMarker for Submitter {
    fn prefix() -> &'static str {
        "sub-"
    }
}

/// Reviewer のマーカー型
pub enum Reviewer {}

impl IdMarker for Reviewer {
    fn prefix() -> &'static str {
        "rev-"
    }
}

/// Ingredient のマーカー型
pub enum Ingredient {}

impl IdMarker for Ingredient {
    fn prefix() -> &'static str {
        "ing-"
    }
}

/// Recipe のマーカー型
pub enum Recipe {}

impl IdMarker for Recipe {
    fn prefix() -> &'static str {
        "rcp-"
    }
}

/// Identifier of a submitter account.
pub type SubmitterId = Id<Submitter>;

/// Identifier of a reviewer account.
pub type ReviewerId = Id<Reviewer>;

/// Identifier of an ingredient catalog entry.
pub type IngredientId = Id<Ingredient>;

/// Identifier of a recipe submission.
pub type RecipeId = Id<Recipe>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_display_with_collection_prefix() {
        let ulid = Ulid::new();

        assert!(SubmitterId::from_ulid(ulid).to_string().starts_with("sub-"));
        assert!(ReviewerId::from_ulid(ulid).to_string().starts_with("rev-"));
        assert!(IngredientId::from_ulid(ulid).to_string().starts_with("ing-"));
        assert!(RecipeId::from_ulid(ulid).to_string().starts_with("rcp-"));

        // let _: ReviewerId = SubmitterId::from_ulid(ulid); // <- does not compile
    }

    #[test]
    fn ids_serialize_as_bare_ulid() {
        let ulid = Ulid::new();
        let id = RecipeId::from_ulid(ulid);

        let s = serde_json::to_string(&id).unwrap();
        assert_eq!(s, format!("\"{}\"", ulid));

        let back: RecipeId = serde_json::from_str(&s).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn phantom_data_does_not_consume_memory() {
        use std::mem::size_of;
        assert_eq!(size_of::<RecipeId>(), size_of::<Ulid>());
    }
}
