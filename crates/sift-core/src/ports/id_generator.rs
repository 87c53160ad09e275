//! IdGenerator port - ID 生成の抽象化
//!
//! The record store asks this port for the ULID of every new record.

use std::sync::Arc;

use ulid::Ulid;

use crate::domain::{Id, IdMarker};
use crate::ports::Clock;

/// IdGenerator は分散環境で使える ID を生成
///
/// # Thread Safety
/// - `Send + Sync` を要求（複数タスクから使える）
pub trait IdGenerator: Send + Sync {
    fn next_ulid(&self) -> Ulid;

    fn generate<T: IdMarker>(&self) -> Id<T>
    where
        Self: Sized,
    {
        Id::from_ulid(self.next_ulid())
    }
}

/// ULID whose timestamp part comes from a `Clock`.
pub struct UlidGenerator {
    clock: Arc<dyn Clock>,
}

impl UlidGenerator {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

impl IdGenerator for UlidGenerator {
    fn next_ulid(&self) -> Ulid {
        let timestamp_ms = self.clock.now().timestamp_millis().max(0) as u64;
        Ulid::from_parts(timestamp_ms, rand::random())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RecipeId;
    use crate::ports::{FixedClock, SystemClock};
    use chrono::{TimeZone, Utc};

    #[test]
    fn ulid_generator_generates_unique_ids() {
        let id_gen = UlidGenerator::new(Arc::new(SystemClock));

        let id1: RecipeId = id_gen.generate();
        let id2: RecipeId = id_gen.generate();

        assert_ne!(id1, id2);
    }

    #[test]
    fn ulid_timestamp_comes_from_clock() {
        let fixed_time = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let id_gen = UlidGenerator::new(Arc::new(FixedClock::new(fixed_time)));

        let id1 = id_gen.next_ulid();
        let id2 = id_gen.next_ulid();

        // ランダム部分があるので ID は異なるが、timestamp 部分は同じ
        assert_ne!(id1, id2);
        assert_eq!(id1.timestamp_ms(), fixed_time.timestamp_millis() as u64);
        assert_eq!(id2.timestamp_ms(), fixed_time.timestamp_millis() as u64);
    }
}
