//! 指し手生成モジュール
//!
//! カテゴリ別（駒取り・成り・静かな手）の疑似合法手生成と、王手回避の
//! 専用経路を提供する。オーダリングと枝刈りがカテゴリ単位で制御できる
//! よう、生成関数は分割されている。合法性の最終判定は `do_move` が行う。

mod generator;
mod movelist;
mod perft;

pub use generator::{
    generate_all, generate_captures, generate_evasions, generate_promotions, generate_quiets,
};
pub use movelist::{ExtMove, MoveList, MAX_MOVES};
pub use perft::perft;
