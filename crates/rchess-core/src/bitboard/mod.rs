//! ビットボードモジュール
//!
//! 64マスの盤面をu64で表現し、高速なビット演算と利き計算を提供する。
//!
//! - `Bitboard`: 64bit盤面表現（bit0 = a1、bit63 = h8）
//! - 筋・段のマスク（`FILE_A` など）
//! - 近接駒の利きテーブル（ポーン・ナイト・キング）
//! - 遠方駒の利き計算（ビショップ・ルーク・クイーン）
//!   BMI2 PEXT命令とmagic bitboardの2経路を持ち、実行時に選択する

mod attacks;
mod tables;

pub use attacks::*;

use crate::types::Square;

/// 64bit盤面表現
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Bitboard(pub u64);

/// 筋マスク
pub const FILE_A: Bitboard = Bitboard(0x0101_0101_0101_0101);
pub const FILE_B: Bitboard = Bitboard(0x0202_0202_0202_0202);
pub const FILE_G: Bitboard = Bitboard(0x4040_4040_4040_4040);
pub const FILE_H: Bitboard = Bitboard(0x8080_8080_8080_8080);

/// 段マスク
pub const RANK_1: Bitboard = Bitboard(0x0000_0000_0000_00ff);
pub const RANK_2: Bitboard = Bitboard(0x0000_0000_0000_ff00);
pub const RANK_3: Bitboard = Bitboard(0x0000_0000_00ff_0000);
pub const RANK_4: Bitboard = Bitboard(0x0000_0000_ff00_0000);
pub const RANK_5: Bitboard = Bitboard(0x0000_00ff_0000_0000);
pub const RANK_6: Bitboard = Bitboard(0x0000_ff00_0000_0000);
pub const RANK_7: Bitboard = Bitboard(0x00ff_0000_0000_0000);
pub const RANK_8: Bitboard = Bitboard(0xff00_0000_0000_0000);

impl Bitboard {
    pub const EMPTY: Bitboard = Bitboard(0);
    pub const ALL: Bitboard = Bitboard(!0);

    #[inline]
    pub const fn from_square(sq: Square) -> Self {
        Bitboard(1u64 << sq.0)
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_some(self) -> bool {
        self.0 != 0
    }

    #[inline]
    pub const fn contains(self, sq: Square) -> bool {
        self.0 & (1u64 << sq.0) != 0
    }

    #[inline]
    pub fn set(&mut self, sq: Square) {
        self.0 |= 1u64 << sq.0;
    }

    #[inline]
    pub fn reset(&mut self, sq: Square) {
        self.0 &= !(1u64 << sq.0);
    }

    /// 立っているビット数
    #[inline]
    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }

    /// 2つ以上のビットが立っているか
    #[inline]
    pub const fn more_than_one(self) -> bool {
        self.0 & self.0.wrapping_sub(1) != 0
    }

    /// 最下位ビットのマス（空で呼んではならない）
    #[inline]
    pub fn lsb(self) -> Square {
        debug_assert!(self.is_some(), "lsb() on empty bitboard");
        Square(self.0.trailing_zeros() as u8)
    }

    /// 最上位ビットのマス（空で呼んではならない）
    #[inline]
    pub fn msb(self) -> Square {
        debug_assert!(self.is_some(), "msb() on empty bitboard");
        Square(63 - self.0.leading_zeros() as u8)
    }

    /// 最下位ビットを取り出して消す
    #[inline]
    pub fn pop_lsb(&mut self) -> Square {
        let sq = self.lsb();
        self.0 &= self.0 - 1;
        sq
    }

    /// self & !other
    #[inline]
    pub const fn and_not(self, other: Bitboard) -> Bitboard {
        Bitboard(self.0 & !other.0)
    }

    /// 1段上へシフト
    #[inline]
    pub const fn north(self) -> Bitboard {
        Bitboard(self.0 << 8)
    }

    /// 1段下へシフト
    #[inline]
    pub const fn south(self) -> Bitboard {
        Bitboard(self.0 >> 8)
    }

    /// 右上（a筋は消える）
    #[inline]
    pub const fn north_east(self) -> Bitboard {
        Bitboard((self.0 << 9) & !FILE_A.0)
    }

    /// 左上（h筋は消える）
    #[inline]
    pub const fn north_west(self) -> Bitboard {
        Bitboard((self.0 << 7) & !FILE_H.0)
    }

    #[inline]
    pub const fn south_east(self) -> Bitboard {
        Bitboard((self.0 >> 7) & !FILE_A.0)
    }

    #[inline]
    pub const fn south_west(self) -> Bitboard {
        Bitboard((self.0 >> 9) & !FILE_H.0)
    }
}

impl std::ops::BitOr for Bitboard {
    type Output = Bitboard;
    #[inline]
    fn bitor(self, rhs: Bitboard) -> Bitboard {
        Bitboard(self.0 | rhs.0)
    }
}

impl std::ops::BitAnd for Bitboard {
    type Output = Bitboard;
    #[inline]
    fn bitand(self, rhs: Bitboard) -> Bitboard {
        Bitboard(self.0 & rhs.0)
    }
}

impl std::ops::BitXor for Bitboard {
    type Output = Bitboard;
    #[inline]
    fn bitxor(self, rhs: Bitboard) -> Bitboard {
        Bitboard(self.0 ^ rhs.0)
    }
}

impl std::ops::Not for Bitboard {
    type Output = Bitboard;
    #[inline]
    fn not(self) -> Bitboard {
        Bitboard(!self.0)
    }
}

impl std::ops::BitOrAssign for Bitboard {
    #[inline]
    fn bitor_assign(&mut self, rhs: Bitboard) {
        self.0 |= rhs.0;
    }
}

impl std::ops::BitAndAssign for Bitboard {
    #[inline]
    fn bitand_assign(&mut self, rhs: Bitboard) {
        self.0 &= rhs.0;
    }
}

impl std::ops::BitXorAssign for Bitboard {
    #[inline]
    fn bitxor_assign(&mut self, rhs: Bitboard) {
        self.0 ^= rhs.0;
    }
}

/// 立っているマスを昇順に列挙するイテレータ
pub struct BitboardIter(u64);

impl Iterator for BitboardIter {
    type Item = Square;

    #[inline]
    fn next(&mut self) -> Option<Square> {
        if self.0 == 0 {
            return None;
        }
        let sq = Square(self.0.trailing_zeros() as u8);
        self.0 &= self.0 - 1;
        Some(sq)
    }
}

impl IntoIterator for Bitboard {
    type Item = Square;
    type IntoIter = BitboardIter;

    #[inline]
    fn into_iter(self) -> BitboardIter {
        BitboardIter(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_reset_contains() {
        let mut bb = Bitboard::EMPTY;
        bb.set(Square::E1);
        assert!(bb.contains(Square::E1));
        assert_eq!(bb.count(), 1);
        bb.reset(Square::E1);
        assert!(bb.is_empty());
    }

    #[test]
    fn test_iteration_ascending() {
        let bb = Bitboard::from_square(Square::H8)
            | Bitboard::from_square(Square::A1)
            | Bitboard::from_square(Square::E1);
        let squares: Vec<Square> = bb.into_iter().collect();
        assert_eq!(squares, vec![Square::A1, Square::E1, Square::H8]);
    }

    #[test]
    fn test_lsb_msb_pop() {
        let mut bb = RANK_2;
        assert_eq!(bb.lsb(), Square(8));
        assert_eq!(bb.msb(), Square(15));
        assert_eq!(bb.pop_lsb(), Square(8));
        assert_eq!(bb.count(), 7);
    }

    #[test]
    fn test_shifts_respect_edges() {
        // h1 を右上にシフトしても a 筋へ回り込まない
        let bb = Bitboard::from_square(Square::H1);
        assert!(bb.north_east().is_empty());
        let bb = Bitboard::from_square(Square::A1);
        assert!(bb.north_west().is_empty());
        assert_eq!(RANK_1.north(), RANK_2);
    }

    #[test]
    fn test_more_than_one() {
        assert!(!Bitboard::EMPTY.more_than_one());
        assert!(!Bitboard::from_square(Square::A1).more_than_one());
        assert!(RANK_1.more_than_one());
    }
}
