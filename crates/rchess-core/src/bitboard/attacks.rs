//! 利き計算の公開API
//!
//! 遠方駒はBMI2のPEXT命令が使える環境ではPEXT経路、そうでなければ
//! magic bitboard経路で引く。両経路は同じ利きを返すことをテストで保証する
//! （どちらかを信用するのではなく、相互検証する）。

use super::tables::{attack_table, pext_index};
use super::Bitboard;
use crate::types::{Color, PieceType, Square};

/// ポーンの利き
#[inline]
pub fn pawn_attacks(color: Color, sq: Square) -> Bitboard {
    attack_table().pawn[color.index()][sq.index()]
}

/// ナイトの利き
#[inline]
pub fn knight_attacks(sq: Square) -> Bitboard {
    attack_table().knight[sq.index()]
}

/// キングの利き
#[inline]
pub fn king_attacks(sq: Square) -> Bitboard {
    attack_table().king[sq.index()]
}

/// ビショップの利き（occupancy対応、実行時に速い経路を選択）
#[inline]
pub fn bishop_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    let t = attack_table();
    let m = &t.bishop_magics[sq.index()];
    if t.has_pext {
        t.pext_attacks[m.offset + m.pext_index(occupied)]
    } else {
        t.magic_attacks[m.offset + m.magic_index(occupied)]
    }
}

/// ルークの利き（occupancy対応、実行時に速い経路を選択）
#[inline]
pub fn rook_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    let t = attack_table();
    let m = &t.rook_magics[sq.index()];
    if t.has_pext {
        t.pext_attacks[m.offset + m.pext_index(occupied)]
    } else {
        t.magic_attacks[m.offset + m.magic_index(occupied)]
    }
}

/// クイーンの利き
#[inline]
pub fn queen_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    rook_attacks(sq, occupied) | bishop_attacks(sq, occupied)
}

/// 駒種ディスパッチ（SEE・チェック判定用）
#[inline]
pub fn attacks_bb(pt: PieceType, sq: Square, occupied: Bitboard) -> Bitboard {
    match pt {
        PieceType::Knight => knight_attacks(sq),
        PieceType::Bishop => bishop_attacks(sq, occupied),
        PieceType::Rook => rook_attacks(sq, occupied),
        PieceType::Queen => queen_attacks(sq, occupied),
        PieceType::King => king_attacks(sq),
        // ポーンは色依存のため pawn_attacks を直接使う
        PieceType::Pawn => Bitboard::EMPTY,
    }
}

/// magic経路を明示的に引く（経路相互検証テスト用）
#[inline]
pub fn rook_attacks_magic(sq: Square, occupied: Bitboard) -> Bitboard {
    let t = attack_table();
    let m = &t.rook_magics[sq.index()];
    t.magic_attacks[m.offset + m.magic_index(occupied)]
}

/// PEXT経路を明示的に引く（経路相互検証テスト用、非BMI2環境ではソフトpext）
#[inline]
pub fn rook_attacks_pext(sq: Square, occupied: Bitboard) -> Bitboard {
    let t = attack_table();
    let m = &t.rook_magics[sq.index()];
    t.pext_attacks[m.offset + pext_index(occupied, m.mask)]
}

/// magic経路を明示的に引く（経路相互検証テスト用）
#[inline]
pub fn bishop_attacks_magic(sq: Square, occupied: Bitboard) -> Bitboard {
    let t = attack_table();
    let m = &t.bishop_magics[sq.index()];
    t.magic_attacks[m.offset + m.magic_index(occupied)]
}

/// PEXT経路を明示的に引く（経路相互検証テスト用、非BMI2環境ではソフトpext）
#[inline]
pub fn bishop_attacks_pext(sq: Square, occupied: Bitboard) -> Bitboard {
    let t = attack_table();
    let m = &t.bishop_magics[sq.index()];
    t.pext_attacks[m.offset + pext_index(occupied, m.mask)]
}

/// 2マスの間のマス集合（両端を含まない、直線上にない場合は空）
#[inline]
pub fn between_bb(s1: Square, s2: Square) -> Bitboard {
    attack_table().between[s1.index()][s2.index()]
}

/// 2マスを通る直線全体（直線上にない場合は空）
#[inline]
pub fn line_bb(s1: Square, s2: Square) -> Bitboard {
    attack_table().line[s1.index()][s2.index()]
}

/// 3マスが一直線（縦横斜めいずれか）に並んでいるか
#[inline]
pub fn aligned(s1: Square, s2: Square, s3: Square) -> bool {
    line_bb(s1, s2).contains(s3)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_paths_identical() {
        // magic経路とPEXT経路の全マス×サンプルoccupancy相互検証
        let mut seed = 0xdead_beef_cafe_babeu64;
        for sq in Square::all() {
            for _ in 0..64 {
                seed ^= seed << 13;
                seed ^= seed >> 7;
                seed ^= seed << 17;
                let occ = Bitboard(seed & seed.rotate_left(31));
                assert_eq!(
                    rook_attacks_magic(sq, occ),
                    rook_attacks_pext(sq, occ),
                    "rook path mismatch at {sq} occ={:#x}",
                    occ.0
                );
                assert_eq!(
                    bishop_attacks_magic(sq, occ),
                    bishop_attacks_pext(sq, occ),
                    "bishop path mismatch at {sq} occ={:#x}",
                    occ.0
                );
            }
        }
    }

    #[test]
    fn test_rook_attacks_blocked() {
        // d4のルーク、d7にブロッカー
        let d4 = Square::from_uci("d4").unwrap();
        let d7 = Square::from_uci("d7").unwrap();
        let d8 = Square::from_uci("d8").unwrap();
        let att = rook_attacks(d4, Bitboard::from_square(d7));
        assert!(att.contains(d7));
        assert!(!att.contains(d8));
    }

    #[test]
    fn test_queen_union() {
        let e4 = Square::from_uci("e4").unwrap();
        let occ = Bitboard::EMPTY;
        assert_eq!(
            queen_attacks(e4, occ),
            rook_attacks(e4, occ) | bishop_attacks(e4, occ)
        );
    }

    #[test]
    fn test_between_and_aligned() {
        let a1 = Square::A1;
        let h8 = Square::H8;
        let d4 = Square::from_uci("d4").unwrap();
        assert!(between_bb(a1, h8).contains(d4));
        assert_eq!(between_bb(a1, h8).count(), 6);
        assert!(aligned(a1, d4, h8));
        // 直線上にないペア
        let b3 = Square::from_uci("b3").unwrap();
        assert!(between_bb(a1, b3).is_empty());
        assert!(!aligned(a1, b3, h8));
    }

    #[test]
    fn test_pawn_attacks_direction() {
        let e4 = Square::from_uci("e4").unwrap();
        let d5 = Square::from_uci("d5").unwrap();
        let f5 = Square::from_uci("f5").unwrap();
        let d3 = Square::from_uci("d3").unwrap();
        assert!(pawn_attacks(Color::White, e4).contains(d5));
        assert!(pawn_attacks(Color::White, e4).contains(f5));
        assert!(pawn_attacks(Color::Black, e4).contains(d3));
        assert_eq!(pawn_attacks(Color::White, e4).count(), 2);
    }
}
