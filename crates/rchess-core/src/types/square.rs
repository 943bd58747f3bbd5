//! 盤上の座標
//!
//! A1=0 〜 H8=63。file = sq & 7、rank = sq >> 3。

use super::Color;

/// 筋（a〜h）
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct File(pub u8);

impl File {
    pub const NUM: usize = 8;
    pub const A: File = File(0);
    pub const H: File = File(7);

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub const fn to_char(self) -> char {
        (b'a' + self.0) as char
    }
}

/// 段（1〜8）
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Rank(pub u8);

impl Rank {
    pub const NUM: usize = 8;
    pub const R1: Rank = Rank(0);
    pub const R2: Rank = Rank(1);
    pub const R3: Rank = Rank(2);
    pub const R4: Rank = Rank(3);
    pub const R5: Rank = Rank(4);
    pub const R6: Rank = Rank(5);
    pub const R7: Rank = Rank(6);
    pub const R8: Rank = Rank(7);

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// 手番側から見た相対段
    #[inline]
    pub const fn relative(self, color: Color) -> Rank {
        match color {
            Color::White => self,
            Color::Black => Rank(7 - self.0),
        }
    }

    pub const fn to_char(self) -> char {
        (b'1' + self.0) as char
    }
}

/// 盤上のマス
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square(pub u8);

impl Square {
    /// マスの数
    pub const NUM: usize = 64;

    pub const A1: Square = Square(0);
    pub const B1: Square = Square(1);
    pub const C1: Square = Square(2);
    pub const D1: Square = Square(3);
    pub const E1: Square = Square(4);
    pub const F1: Square = Square(5);
    pub const G1: Square = Square(6);
    pub const H1: Square = Square(7);
    pub const F2: Square = Square(13);
    pub const A8: Square = Square(56);
    pub const C8: Square = Square(58);
    pub const D8: Square = Square(59);
    pub const E8: Square = Square(60);
    pub const F8: Square = Square(61);
    pub const G8: Square = Square(62);
    pub const H8: Square = Square(63);

    #[inline]
    pub const fn new(file: File, rank: Rank) -> Self {
        Square(rank.0 * 8 + file.0)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn file(self) -> File {
        File(self.0 & 7)
    }

    #[inline]
    pub const fn rank(self) -> Rank {
        Rank(self.0 >> 3)
    }

    /// オフセット移動（盤外チェックなし、呼び出し側が保証する）
    #[inline]
    pub const fn offset(self, delta: i32) -> Square {
        Square((self.0 as i32 + delta) as u8)
    }

    /// オフセット移動（盤外ならNone）
    #[inline]
    pub fn try_offset(self, delta: i32) -> Option<Square> {
        let idx = self.0 as i32 + delta;
        if (0..64).contains(&idx) {
            Some(Square(idx as u8))
        } else {
            None
        }
    }

    /// チェビシェフ距離（玉の歩数）
    #[inline]
    pub fn distance(self, other: Square) -> u32 {
        let df = (self.file().0 as i32 - other.file().0 as i32).unsigned_abs();
        let dr = (self.rank().0 as i32 - other.rank().0 as i32).unsigned_abs();
        df.max(dr)
    }

    /// 全マスの昇順イテレータ
    #[inline]
    pub fn all() -> impl Iterator<Item = Square> {
        (0..64u8).map(Square)
    }

    /// UCI座標（例: "e4"）から解析
    pub fn from_uci(s: &str) -> Option<Square> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return None;
        }
        let file = bytes[0].wrapping_sub(b'a');
        let rank = bytes[1].wrapping_sub(b'1');
        if file < 8 && rank < 8 {
            Some(Square(rank * 8 + file))
        } else {
            None
        }
    }
}

impl std::fmt::Display for Square {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.file().to_char(), self.rank().to_char())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_coords() {
        assert_eq!(Square::E1.file(), File(4));
        assert_eq!(Square::E1.rank(), Rank(0));
        assert_eq!(Square::new(File(4), Rank(0)), Square::E1);
        assert_eq!(Square::H8.index(), 63);
    }

    #[test]
    fn test_square_uci() {
        assert_eq!(Square::from_uci("e1"), Some(Square::E1));
        assert_eq!(Square::from_uci("a8"), Some(Square::A8));
        assert_eq!(Square::from_uci("i1"), None);
        assert_eq!(Square::from_uci("e9"), None);
        assert_eq!(Square::E1.to_string(), "e1");
    }

    #[test]
    fn test_distance() {
        assert_eq!(Square::A1.distance(Square::H8), 7);
        assert_eq!(Square::E1.distance(Square::E1), 0);
        assert_eq!(Square::E1.distance(Square::F2), 1);
    }

    #[test]
    fn test_relative_rank() {
        assert_eq!(Rank::R2.relative(Color::White), Rank::R2);
        assert_eq!(Rank::R2.relative(Color::Black), Rank::R7);
        assert_eq!(Rank::R3.relative(Color::White), Rank::R3);
        assert_eq!(Rank::R3.relative(Color::Black), Rank::R6);
    }
}
