//! App - アプリケーション層
//!
//! ports を組み合わせてレビューワークフローを実装します。
//!
//! # 主要コンポーネント
//! - **EngineBuilder**: エンジンの構築とワイヤリング
//! - **WorkflowEngine**: Submit / Assign / Decide / Resubmit
//! - **LockTable**: 識別子ごとの排他制御
//! - **RecipeQueries**: status 別・アカウント別の検索
//! - **Dashboards**: submitter / reviewer 向けの読み取りビュー

pub mod accounts;
pub mod builder;
pub mod catalog;
pub mod config;
pub mod dashboard;
pub mod engine;
pub mod locks;
pub mod queries;
pub mod status;

// 主要な型を再エクスポート
pub use self::builder::{BuildError, EngineBuilder};
pub use self::config::{ConfigError, EngineConfig, LOCK_TIMEOUT_ENV};
pub use self::dashboard::{ReviewerDashboard, SubmitterDashboard};
pub use self::engine::{Command, Revision, Submission, WorkflowEngine};
pub use self::locks::{LockGuard, LockKey, LockScope, LockTable};
pub use self::queries::{Link, RecipeQueries};
pub use self::status::ReviewCounts;
