//! 局面表現モジュール
//!
//! チェスの局面を表現し、手の実行・巻き戻しを行う。
//!
//! - `Position`: 局面本体（盤面配列・Bitboard・手番・キャスリング権・手数）
//! - `StateInfo`: 局面状態のスナップショット（Zobristキー、王手情報、直前の手など）
//! - `Zobrist`: Zobristハッシュ乱数テーブル（手番・駒×升・キャスリング権・EP筋）
//! - `do_move` / `undo_move` / `do_null_move`: 手の実行と巻き戻し（スナップショットをスタックとして管理）
//! - FEN形式の解析・出力
//! - SEE（静的交換評価）
//!
//! 盤面配列・Bitboard・Zobristキー・マテリアル・フェーズは `Position` のメソッド
//! （`put_piece` / `remove_piece` / `do_move` 系）を通じて更新されることを前提とし、
//! 常に互いに整合しているように保つ。

mod fen;
mod pos;
mod see;
mod state;
mod zobrist;

pub use fen::{FenError, START_FEN};
pub use pos::{Position, CASTLE_BK, CASTLE_BQ, CASTLE_WK, CASTLE_WQ};
pub use state::StateInfo;
pub use zobrist::{zobrist_castling, zobrist_ep, zobrist_psq, zobrist_side, ZOBRIST};
