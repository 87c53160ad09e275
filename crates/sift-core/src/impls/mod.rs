//! Impls - ports の実装（開発用・テスト用）
//!
//! # 含まれる実装
//! - **InMemoryRecordStore**: 挿入順を保つレコードストア（fault injection 付き）
//! - **StaticIdentityProvider**: session token → identity の固定テーブル
//!
//! 本番用のストア実装は別クレートに配置する想定です。

pub mod inmem_store;
pub mod static_identity;

pub use self::inmem_store::{Fault, InMemoryCollection, InMemoryRecordStore};
pub use self::static_identity::StaticIdentityProvider;
