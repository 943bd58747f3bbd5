//! 置換表モジュール
//!
//! 探索結果（評価値・境界種別・深さ・最善手）をZobristキーで引ける
//! 共有テーブル。lazy SMPの全スレッドが同じテーブルを参照するため、
//! エントリは2本のAtomicU64で構成し、`key ^ data` の照合で裂けた
//! 書き込みを検出する（ロックは取らない）。
//!
//! - `TTEntry`: 16バイトのアトミックエントリ
//! - `TranspositionTable`: 本体（probe / save / 世代管理）
//!
//! バケットは2スロット: インデックスとそのXOR-1隣接を対にして使う。

mod entry;
mod table;

pub use entry::{TTData, TTEntry};
pub use table::{ProbeResult, TranspositionTable};

/// 世代のビット数（データワード上位に収める）
pub(crate) const GENERATION_BITS: u32 = 6;
/// 世代の周期
pub(crate) const GENERATION_CYCLE: u8 = 1 << GENERATION_BITS;
/// デフォルトのテーブルサイズ（MB）
pub const DEFAULT_HASH_MB: usize = 16;
