//! App - アプリケーション層
//!
//! このモジュールは、ports を組み合わせてディスパッチのロジックを実装します。
//!
//! # 主要コンポーネント
//! - **DispatcherBuilder**: 登録とワイヤリング、起動時検証
//! - **Registry**: queue と handler の対応表（build 後は不変）
//! - **Dispatcher**: trigger / start / stop の表面
//! - **Worker**: 1 つの queue view から取り出して handler を呼ぶループ
//! - **PoolStatus**: ワーカーのスナップショット

pub mod builder;
pub mod dispatcher;
pub(crate) mod guard;
pub mod registry;
pub(crate) mod reporter;
pub mod state;
pub mod status;
pub(crate) mod worker_loop;

// 主要な型を再エクスポート
pub use self::builder::{BuildError, DispatcherBuilder};
pub use self::dispatcher::Dispatcher;
pub use self::registry::{Binding, Registry, RegistryError};
pub use self::state::WorkerState;
pub use self::status::{PoolStatus, WorkerCounts, WorkerStatus};
