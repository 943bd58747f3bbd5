//! rchess-core: チェスエンジンのコアライブラリ
//!
//! 局面表現（bitboard + Zobristハッシュ）、指し手生成、探索（PVS +
//! lazy SMP）、置換表、評価を提供する。UCIフロントエンドは
//! rchess-uciクレートが担う。

pub mod bitboard;
pub mod eval;
pub mod movegen;
pub mod position;
pub mod search;
pub mod tt;
pub mod types;
