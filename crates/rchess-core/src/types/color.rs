//! 手番（色）

/// 手番
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Color {
    White = 0,
    Black = 1,
}

impl Color {
    /// 色の数
    pub const NUM: usize = 2;

    /// 配列インデックス
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// 相手の色
    #[inline]
    pub const fn flip(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// ポーンの前進方向（rank増分）
    #[inline]
    pub const fn pawn_push(self) -> i32 {
        match self {
            Color::White => 8,
            Color::Black => -8,
        }
    }

    #[inline]
    pub const fn from_index(idx: usize) -> Self {
        debug_assert!(idx < Self::NUM);
        if idx == 0 {
            Color::White
        } else {
            Color::Black
        }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Color::White => write!(f, "w"),
            Color::Black => write!(f, "b"),
        }
    }
}
