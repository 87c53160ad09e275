//! sift-core
//!
//! Recipe review workflow engine.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, recipe, account, ingredient, price, state, errors）
//! - **ports**: 抽象化レイヤー（RecordStore, IdentityProvider, Clock, IdGenerator）
//! - **impls**: 実装（InMemoryRecordStore, StaticIdentityProvider など開発用）
//! - **app**: アプリケーションロジック（engine, locks, config, builder, dashboards）

pub mod app;
pub mod domain;
pub mod impls;
pub mod ports;

pub use app::{EngineBuilder, WorkflowEngine};
pub use domain::WorkflowError;
