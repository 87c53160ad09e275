//! Domain model (ids, records, lifecycle, errors).
//!
//! Pure types only: nothing here touches the store or takes a lock.

pub mod account;
pub mod errors;
pub mod identity;
pub mod ids;
pub mod ingredient;
pub mod price;
pub mod recipe;
pub mod record;
pub mod state;

pub use account::{Profile, Reviewer, Submitter, SubmitterPatch, SubmitterStats};
pub use errors::{ConflictReason, ErrorKind, WorkflowError};
pub use identity::{Identity, Role};
pub use ids::{Id, IdMarker, IngredientId, RecipeId, ReviewerId, SubmitterId};
pub use ingredient::{Ingredient, IngredientDraft};
pub use price::{Price, PriceSheet};
pub use recipe::{DecisionKey, Recipe, RecipeDraft, RecipePatch};
pub use record::{CollectionName, FieldValue, Record};
pub use state::{IllegalTransition, RecipeStatus, Transition, Verdict};
