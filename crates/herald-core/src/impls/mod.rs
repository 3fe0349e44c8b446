//! Impls - 実装（開発用・テスト用）
//!
//! # 含まれる実装
//! - **MemoryQueue**: インメモリの `Queue` 実装
//!
//! 永続化や外部ブローカーを使うバックエンドは別クレートで `Queue` を実装する。

pub mod memory;

pub use self::memory::MemoryQueue;
