//! 指し手リスト

use crate::types::Move;

/// 1局面の指し手数の上限
pub const MAX_MOVES: usize = 256;

/// 指し手とスコアのペア（オーダリング用）
#[derive(Debug, Clone, Copy)]
pub struct ExtMove {
    /// 指し手
    pub mv: Move,
    /// オーダリング用スコア
    pub value: i32,
}

impl ExtMove {
    pub const NONE: ExtMove = ExtMove {
        mv: Move::NULL,
        value: 0,
    };
}

/// 指し手生成バッファ（固定長、ヒープ確保なし）
pub struct MoveList {
    moves: [ExtMove; MAX_MOVES],
    len: usize,
}

impl MoveList {
    /// 空のMoveListを作成
    #[inline]
    pub const fn new() -> Self {
        Self {
            moves: [ExtMove::NONE; MAX_MOVES],
            len: 0,
        }
    }

    /// 指し手の数
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// 空かどうか
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// 指し手を追加
    #[inline]
    pub fn push(&mut self, mv: Move) {
        debug_assert!(self.len < MAX_MOVES);
        self.moves[self.len] = ExtMove { mv, value: 0 };
        self.len += 1;
    }

    /// i番目の指し手を取得
    #[inline]
    pub fn at(&self, i: usize) -> Move {
        debug_assert!(i < self.len);
        self.moves[i].mv
    }

    /// 指定された指し手が含まれているか
    pub fn contains(&self, mv: Move) -> bool {
        self.moves[..self.len].iter().any(|e| e.mv == mv)
    }

    /// クリア
    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// 指し手のイテレータ
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = Move> + '_ {
        self.moves[..self.len].iter().map(|e| e.mv)
    }

    /// スコア付きスライス（オーダリング用）
    #[inline]
    pub fn as_ext_slice(&self) -> &[ExtMove] {
        &self.moves[..self.len]
    }

    /// スコア付き可変スライス（スコア書き込み用）
    #[inline]
    pub fn as_ext_mut_slice(&mut self) -> &mut [ExtMove] {
        &mut self.moves[..self.len]
    }

    /// start以降で最大スコアの指し手をstartの位置へ引き出して返す
    ///
    /// 全体をソートせず、取り出すたびに1回の線形走査で済ませる
    /// （カットオフで途中までしか読まれないことが多いため）。
    pub fn pick_best(&mut self, start: usize) -> ExtMove {
        debug_assert!(start < self.len);
        let mut best = start;
        for i in start + 1..self.len {
            if self.moves[i].value > self.moves[best].value {
                best = i;
            }
        }
        self.moves.swap(start, best);
        self.moves[start]
    }
}

impl Default for MoveList {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Index<usize> for MoveList {
    type Output = ExtMove;

    fn index(&self, index: usize) -> &Self::Output {
        debug_assert!(index < self.len);
        &self.moves[index]
    }
}
