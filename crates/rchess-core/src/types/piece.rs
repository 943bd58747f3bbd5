//! 駒種と駒
//!
//! `PieceType` は色を持たない駒種（歩〜玉）、`Piece` は色付きの駒。
//! `Piece` は盤面配列のエントリとして使うため NONE を含む。

use super::Color;

/// 駒種
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum PieceType {
    Pawn = 0,
    Knight = 1,
    Bishop = 2,
    Rook = 3,
    Queen = 4,
    King = 5,
}

impl PieceType {
    /// 駒種の数
    pub const NUM: usize = 6;

    /// 全駒種
    pub const ALL: [PieceType; Self::NUM] = [
        PieceType::Pawn,
        PieceType::Knight,
        PieceType::Bishop,
        PieceType::Rook,
        PieceType::Queen,
        PieceType::King,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// SEE・オーダリング用の駒価値（centipawn）
    #[inline]
    pub const fn value(self) -> i32 {
        match self {
            PieceType::Pawn => 100,
            PieceType::Knight => 320,
            PieceType::Bishop => 330,
            PieceType::Rook => 500,
            PieceType::Queen => 900,
            // 玉は取れないが、SEEの打ち切り判定で番兵として使う
            PieceType::King => 15000,
        }
    }

    /// ゲームフェーズ重み（全駒合計24）
    #[inline]
    pub const fn phase(self) -> i32 {
        match self {
            PieceType::Pawn | PieceType::King => 0,
            PieceType::Knight | PieceType::Bishop => 1,
            PieceType::Rook => 2,
            PieceType::Queen => 4,
        }
    }

    #[inline]
    pub const fn from_index(idx: usize) -> Self {
        debug_assert!(idx < Self::NUM);
        match idx {
            0 => PieceType::Pawn,
            1 => PieceType::Knight,
            2 => PieceType::Bishop,
            3 => PieceType::Rook,
            4 => PieceType::Queen,
            _ => PieceType::King,
        }
    }

    /// FEN/UCI用の小文字1文字
    pub const fn to_char(self) -> char {
        match self {
            PieceType::Pawn => 'p',
            PieceType::Knight => 'n',
            PieceType::Bishop => 'b',
            PieceType::Rook => 'r',
            PieceType::Queen => 'q',
            PieceType::King => 'k',
        }
    }

    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'p' => Some(PieceType::Pawn),
            'n' => Some(PieceType::Knight),
            'b' => Some(PieceType::Bishop),
            'r' => Some(PieceType::Rook),
            'q' => Some(PieceType::Queen),
            'k' => Some(PieceType::King),
            _ => None,
        }
    }
}

/// 色付きの駒（盤面配列用、NONE含む）
///
/// 内部表現: `piece_type + 6 * color`、NONE = 12。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Piece(u8);

impl Piece {
    /// 駒の数（NONE含む）
    pub const NUM: usize = 13;

    /// 空きマス
    pub const NONE: Piece = Piece(12);

    #[inline]
    pub const fn new(color: Color, pt: PieceType) -> Self {
        Piece(pt as u8 + 6 * color as u8)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 == 12
    }

    #[inline]
    pub const fn is_some(self) -> bool {
        self.0 != 12
    }

    /// 駒種を取得（NONEに対して呼んではならない）
    #[inline]
    pub fn piece_type(self) -> PieceType {
        debug_assert!(self.is_some(), "piece_type() on Piece::NONE");
        PieceType::from_index((self.0 % 6) as usize)
    }

    /// 色を取得（NONEに対して呼んではならない）
    #[inline]
    pub fn color(self) -> Color {
        debug_assert!(self.is_some(), "color() on Piece::NONE");
        Color::from_index((self.0 / 6) as usize)
    }

    /// FEN用の1文字（白=大文字、黒=小文字）
    pub fn to_char(self) -> char {
        let c = self.piece_type().to_char();
        match self.color() {
            Color::White => c.to_ascii_uppercase(),
            Color::Black => c,
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        let pt = PieceType::from_char(c.to_ascii_lowercase())?;
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        Some(Piece::new(color, pt))
    }
}
