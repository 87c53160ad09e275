//! Ports - 抽象化レイヤー
//!
//! Hexagonal Architecture の「ポート」。外部システム（レコードストア、
//! 認証、時刻、ID 生成）への境界をここで定義します。

pub mod clock;
pub mod id_generator;
pub mod identity;
pub mod record_store;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::identity::{IdentityProvider, RequestContext};
pub use self::record_store::{Collection, Direction, Filter, RecordStore, SortKey, StoreError};
