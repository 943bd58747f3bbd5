//! 基本型モジュール
//!
//! エンジン全体で使う値型を定義する。
//!
//! - `Color`: 手番（White / Black）
//! - `PieceType` / `Piece`: 駒種と駒（色付き）
//! - `Square` / `File` / `Rank`: 盤上の座標
//! - `Value`: 評価値（詰みスコア帯を含む）
//! - `Move` / `MoveKind`: 32bitにパックした指し手

mod color;
mod moves;
mod piece;
mod square;
mod value;

pub use color::Color;
pub use moves::{Move, MoveKind};
pub use piece::{Piece, PieceType};
pub use square::{File, Rank, Square};
pub use value::{value_from_tt, value_to_tt, Bound, Value};

/// 探索の最大ply数
pub const MAX_PLY: i32 = 128;

/// 探索深さの型エイリアス
pub type Depth = i32;

/// 静止探索に入る深さ境界
pub const DEPTH_QS: Depth = 0;
