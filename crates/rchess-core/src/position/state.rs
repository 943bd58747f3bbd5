//! 局面状態（StateInfo）

use crate::bitboard::Bitboard;
use crate::types::{Move, Piece, Square};

/// 局面状態のスナップショット
///
/// do_move時に直前の状態を保存し、undo_move時に復元するための情報を保持する。
/// `Position` 本体のフィールドが常に現在局面を表し、このスタックは巻き戻しと
/// 千日手判定にのみ使う。
#[derive(Clone, Copy)]
pub struct StateInfo {
    /// Zobristキー（手番・キャスリング権・検証済みアンパッサン込み）
    pub key: u64,
    /// キャスリング権（4bit: WK=1, WQ=2, BK=4, BQ=8）
    pub castling: u8,
    /// 直前のダブルプッシュが作ったアンパッサン升（取れるかは問わない）
    pub ep_raw: Option<Square>,
    /// 検証済みアンパッサン升（敵ポーンが取れる場合のみ、ハッシュ対象）
    pub ep_valid: Option<Square>,
    /// 50手ルールカウンタ（halfmove clock）
    pub rule50: i32,
    /// null moveからの手数
    pub plies_from_null: i32,
    /// 手番側の玉に王手している駒
    pub checkers: Bitboard,
    /// この状態から指された手（undo用、スタック上のエントリのみ有効）
    pub last_move: Move,
    /// last_moveで取られた駒（undo用）
    pub captured: Piece,
    /// ゲーム開始からの手数（fullmove number）
    pub game_ply: u16,
}

impl StateInfo {
    pub const fn new() -> Self {
        StateInfo {
            key: 0,
            castling: 0,
            ep_raw: None,
            ep_valid: None,
            rule50: 0,
            plies_from_null: 0,
            checkers: Bitboard::EMPTY,
            last_move: Move::NULL,
            captured: Piece::NONE,
            game_ply: 1,
        }
    }
}

impl Default for StateInfo {
    fn default() -> Self {
        Self::new()
    }
}
