//! InMemoryRecordStore - 開発用・テスト用のレコードストア
//!
//! # 実装詳細
//! - collection ごとに `Vec<R>`（挿入順）+ `HashMap<Id, index>`
//! - `tokio::sync::RwLock` で排他制御（1 レコードの update はアトミック）
//! - fault injection で StoreUnavailable 経路をテストできる

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{CollectionName, Id, Ingredient, Recipe, Record, Reviewer, Submitter};
use crate::ports::{
    Clock, Collection, Direction, Filter, IdGenerator, RecordStore, SortKey, StoreError,
    SystemClock, UlidGenerator,
};

/// Which operations of a collection should fail with `Unavailable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    None = 0,
    /// `create` and `update` fail; reads succeed.
    Writes = 1,
    /// Every operation fails.
    All = 2,
}

impl Fault {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => Fault::Writes,
            2 => Fault::All,
            _ => Fault::None,
        }
    }
}

struct Table<R: Record> {
    rows: Vec<R>,
    index: HashMap<Id<R::Marker>, usize>,
}

impl<R: Record> Default for Table<R> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            index: HashMap::new(),
        }
    }
}

/// One insertion-ordered collection.
pub struct InMemoryCollection<R: Record> {
    table: RwLock<Table<R>>,
    fault: AtomicU8,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
}

impl<R: Record> InMemoryCollection<R> {
    fn new(clock: Arc<dyn Clock>, ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            table: RwLock::new(Table::default()),
            fault: AtomicU8::new(Fault::None as u8),
            clock,
            ids,
        }
    }

    fn set_fault(&self, fault: Fault) {
        self.fault.store(fault as u8, Ordering::SeqCst);
    }

    fn check(&self, write: bool) -> Result<(), StoreError> {
        let failing = match Fault::from_u8(self.fault.load(Ordering::SeqCst)) {
            Fault::None => false,
            Fault::Writes => write,
            Fault::All => true,
        };
        if failing {
            return Err(StoreError::Unavailable {
                collection: R::COLLECTION,
                message: "injected fault".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl<R: Record> Collection<R> for InMemoryCollection<R> {
    async fn create(&self, draft: R::Draft) -> Result<R, StoreError> {
        self.check(true)?;
        let id = Id::from_ulid(self.ids.next_ulid());
        let record = R::from_draft(id, draft, self.clock.now());

        let mut table = self.table.write().await;
        let position = table.rows.len();
        table.rows.push(record.clone());
        table.index.insert(id, position);
        Ok(record)
    }

    async fn get(&self, id: Id<R::Marker>) -> Result<Option<R>, StoreError> {
        self.check(false)?;
        let table = self.table.read().await;
        Ok(table.index.get(&id).map(|&i| table.rows[i].clone()))
    }

    async fn update(&self, id: Id<R::Marker>, patch: R::Patch) -> Result<R, StoreError> {
        self.check(true)?;
        let now = self.clock.now();
        let mut table = self.table.write().await;
        let Some(&position) = table.index.get(&id) else {
            return Err(StoreError::NotFound {
                collection: R::COLLECTION,
                id: id.to_string(),
            });
        };
        let record = &mut table.rows[position];
        record.apply(patch, now);
        Ok(record.clone())
    }

    async fn query(&self, filter: &Filter, sort: &[SortKey]) -> Result<Vec<R>, StoreError> {
        self.check(false)?;
        let mut matched: Vec<R> = {
            let table = self.table.read().await;
            table
                .rows
                .iter()
                .filter(|record| filter.matches(*record))
                .cloned()
                .collect()
        };

        if !sort.is_empty() {
            // stable sort keeps insertion order among equal keys
            matched.sort_by(|a, b| {
                for key in sort {
                    let ord = a.field(key.field).partial_cmp(&b.field(key.field));
                    let ord = ord.unwrap_or(std::cmp::Ordering::Equal);
                    let ord = match key.direction {
                        Direction::Ascending => ord,
                        Direction::Descending => ord.reverse(),
                    };
                    if ord.is_ne() {
                        return ord;
                    }
                }
                std::cmp::Ordering::Equal
            });
        }
        Ok(matched)
    }
}

/// In-memory implementation of all four collections.
///
/// # 使用例
/// ```ignore
/// let store = Arc::new(InMemoryRecordStore::new());
/// let engine = EngineBuilder::new().store(store.clone()).build()?;
/// ```
pub struct InMemoryRecordStore {
    submitters: InMemoryCollection<Submitter>,
    reviewers: InMemoryCollection<Reviewer>,
    ingredients: InMemoryCollection<Ingredient>,
    recipes: InMemoryCollection<Recipe>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        let ids: Arc<dyn IdGenerator> = Arc::new(UlidGenerator::new(clock.clone()));
        Self {
            submitters: InMemoryCollection::new(clock.clone(), ids.clone()),
            reviewers: InMemoryCollection::new(clock.clone(), ids.clone()),
            ingredients: InMemoryCollection::new(clock.clone(), ids.clone()),
            recipes: InMemoryCollection::new(clock, ids),
        }
    }

    /// Make operations on `collection` fail with `StoreError::Unavailable`.
    pub fn inject_fault(&self, collection: CollectionName, fault: Fault) {
        match collection {
            CollectionName::Submitters => self.submitters.set_fault(fault),
            CollectionName::Reviewers => self.reviewers.set_fault(fault),
            CollectionName::Ingredients => self.ingredients.set_fault(fault),
            CollectionName::Recipes => self.recipes.set_fault(fault),
        }
    }

    pub fn clear_faults(&self) {
        self.submitters.set_fault(Fault::None);
        self.reviewers.set_fault(Fault::None);
        self.ingredients.set_fault(Fault::None);
        self.recipes.set_fault(Fault::None);
    }
}

impl Default for InMemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore for InMemoryRecordStore {
    fn submitters(&self) -> &dyn Collection<Submitter> {
        &self.submitters
    }

    fn reviewers(&self) -> &dyn Collection<Reviewer> {
        &self.reviewers
    }

    fn ingredients(&self) -> &dyn Collection<Ingredient> {
        &self.ingredients
    }

    fn recipes(&self) -> &dyn Collection<Recipe> {
        &self.recipes
    }
}
