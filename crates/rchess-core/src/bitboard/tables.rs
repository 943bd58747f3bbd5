//! 利きテーブルの構築
//!
//! 起動時に一度だけ構築し、以降は読み取り専用（`OnceLock`）。
//!
//! 遠方駒の利きは fancy magic bitboard 方式で引く。magic定数は
//! 固定シードのPRNGで起動時に探索する（carry-rippler型の部分集合列挙で
//! 参照利きを作り、全occupancyが衝突なく引けるmagicを採用する）。
//! PEXT経路用のテーブルも同じ領域レイアウトで併設し、
//! `pext(occ, mask)` をインデックスとして使う。

use std::sync::OnceLock;

use rand::RngCore;
use rand_xoshiro::rand_core::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

use super::{Bitboard, FILE_A, FILE_H, RANK_1, RANK_8};
use crate::types::{Color, Square};

/// ルークの4方向（rank/file増分）
const ROOK_DIRS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
/// ビショップの4方向
const BISHOP_DIRS: [(i32, i32); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// 1マスのmagic情報
#[derive(Clone, Copy, Default)]
pub(super) struct Magic {
    pub(super) mask: Bitboard,
    pub(super) magic: u64,
    pub(super) shift: u32,
    pub(super) offset: usize,
}

impl Magic {
    #[inline]
    pub(super) fn magic_index(&self, occupied: Bitboard) -> usize {
        (u64::wrapping_mul((occupied & self.mask).0, self.magic) >> self.shift) as usize
    }

    #[inline]
    pub(super) fn pext_index(&self, occupied: Bitboard) -> usize {
        pext_index(occupied, self.mask)
    }
}

/// pext相当のインデックス計算（ソフトウェア実装）
///
/// テーブル構築と非BMI2環境の検証に使う。ハードウェアPEXT経路とは
/// 定義上同じ値になる。
#[inline]
pub(super) fn pext_index(occupied: Bitboard, mask: Bitboard) -> usize {
    #[cfg(target_arch = "x86_64")]
    {
        if std::is_x86_feature_detected!("bmi2") {
            // SAFETY: bmi2サポートを実行時に確認済み
            return unsafe { std::arch::x86_64::_pext_u64(occupied.0, mask.0) } as usize;
        }
    }
    pext_software(occupied.0, mask.0) as usize
}

/// ソフトウェアpext（mask内のビットを下位へ詰める）
pub(super) const fn pext_software(value: u64, mut mask: u64) -> u64 {
    let mut result = 0u64;
    let mut bit = 1u64;
    while mask != 0 {
        let lowest = mask & mask.wrapping_neg();
        if value & lowest != 0 {
            result |= bit;
        }
        bit <<= 1;
        mask &= mask - 1;
    }
    result
}

/// 全利きテーブル
pub(super) struct AttackTable {
    pub(super) pawn: [[Bitboard; Square::NUM]; Color::NUM],
    pub(super) knight: [Bitboard; Square::NUM],
    pub(super) king: [Bitboard; Square::NUM],
    pub(super) rook_magics: [Magic; Square::NUM],
    pub(super) bishop_magics: [Magic; Square::NUM],
    /// magicインデックスで引く利き（rook + bishop共有領域）
    pub(super) magic_attacks: Vec<Bitboard>,
    /// pextインデックスで引く利き（同じ領域レイアウト）
    pub(super) pext_attacks: Vec<Bitboard>,
    pub(super) between: [[Bitboard; Square::NUM]; Square::NUM],
    pub(super) line: [[Bitboard; Square::NUM]; Square::NUM],
    /// 実行時にBMI2が使えるか
    pub(super) has_pext: bool,
}

static ATTACK_TABLE: OnceLock<AttackTable> = OnceLock::new();

pub(super) fn attack_table() -> &'static AttackTable {
    ATTACK_TABLE.get_or_init(AttackTable::new)
}

fn in_bounds(file: i32, rank: i32) -> bool {
    (0..8).contains(&file) && (0..8).contains(&rank)
}

fn square_at(file: i32, rank: i32) -> Square {
    debug_assert!(in_bounds(file, rank));
    Square((rank * 8 + file) as u8)
}

/// 参照実装: 方向集合に沿ったoccupancy対応の利き
pub(super) fn sliding_attack(dirs: &[(i32, i32)], sq: Square, occupied: Bitboard) -> Bitboard {
    let mut attack = Bitboard::EMPTY;
    for &(df, dr) in dirs {
        let mut f = sq.file().index() as i32 + df;
        let mut r = sq.rank().index() as i32 + dr;
        while in_bounds(f, r) {
            let s = square_at(f, r);
            attack.set(s);
            if occupied.contains(s) {
                break;
            }
            f += df;
            r += dr;
        }
    }
    attack
}

fn leaper_attack(deltas: &[(i32, i32)], sq: Square) -> Bitboard {
    let mut attack = Bitboard::EMPTY;
    for &(df, dr) in deltas {
        let f = sq.file().index() as i32 + df;
        let r = sq.rank().index() as i32 + dr;
        if in_bounds(f, r) {
            attack.set(square_at(f, r));
        }
    }
    attack
}

impl AttackTable {
    fn new() -> Self {
        let mut pawn = [[Bitboard::EMPTY; Square::NUM]; Color::NUM];
        let mut knight = [Bitboard::EMPTY; Square::NUM];
        let mut king = [Bitboard::EMPTY; Square::NUM];

        const KNIGHT_DELTAS: [(i32, i32); 8] =
            [(1, 2), (2, 1), (2, -1), (1, -2), (-1, -2), (-2, -1), (-2, 1), (-1, 2)];
        const KING_DELTAS: [(i32, i32); 8] =
            [(0, 1), (1, 1), (1, 0), (1, -1), (0, -1), (-1, -1), (-1, 0), (-1, 1)];

        for sq in Square::all() {
            let bb = Bitboard::from_square(sq);
            pawn[Color::White.index()][sq.index()] = bb.north_east() | bb.north_west();
            pawn[Color::Black.index()][sq.index()] = bb.south_east() | bb.south_west();
            knight[sq.index()] = leaper_attack(&KNIGHT_DELTAS, sq);
            king[sq.index()] = leaper_attack(&KING_DELTAS, sq);
        }

        let mut magic_attacks = Vec::new();
        let mut pext_attacks = Vec::new();
        let rook_magics =
            init_magics(&ROOK_DIRS, &mut magic_attacks, &mut pext_attacks);
        let bishop_magics =
            init_magics(&BISHOP_DIRS, &mut magic_attacks, &mut pext_attacks);

        // between/line はmagic構築後に空盤利きから導出する
        let mut between = [[Bitboard::EMPTY; Square::NUM]; Square::NUM];
        let mut line = [[Bitboard::EMPTY; Square::NUM]; Square::NUM];
        for s1 in Square::all() {
            for &dirs in &[&ROOK_DIRS, &BISHOP_DIRS] {
                let empty_att = sliding_attack(dirs, s1, Bitboard::EMPTY);
                for s2 in empty_att {
                    line[s1.index()][s2.index()] = (empty_att
                        & sliding_attack(dirs, s2, Bitboard::EMPTY))
                        | Bitboard::from_square(s1)
                        | Bitboard::from_square(s2);
                    between[s1.index()][s2.index()] =
                        sliding_attack(dirs, s1, Bitboard::from_square(s2))
                            & sliding_attack(dirs, s2, Bitboard::from_square(s1));
                }
            }
        }

        #[cfg(target_arch = "x86_64")]
        let has_pext = std::is_x86_feature_detected!("bmi2");
        #[cfg(not(target_arch = "x86_64"))]
        let has_pext = false;

        AttackTable {
            pawn,
            knight,
            king,
            rook_magics,
            bishop_magics,
            magic_attacks,
            pext_attacks,
            between,
            line,
            has_pext,
        }
    }
}

/// fancy magic bitboardの構築
///
/// 各マスについて盤端を除いたmaskを作り、carry-ripplerで全occupancy部分集合を
/// 列挙して参照利きを記録する。magicは疎な乱数を試行し、全部分集合が
/// 衝突なく（同じインデックスなら同じ利きに）写像されたものを採用する。
fn init_magics(
    dirs: &[(i32, i32); 4],
    magic_attacks: &mut Vec<Bitboard>,
    pext_attacks: &mut Vec<Bitboard>,
) -> [Magic; Square::NUM] {
    let mut magics = [Magic::default(); Square::NUM];
    let mut occupancy = [Bitboard::EMPTY; 4096];
    let mut reference = [Bitboard::EMPTY; 4096];
    let mut epoch = [0i32; 4096];
    let mut cnt = 0i32;

    for sq in Square::all() {
        // 盤端は関連occupancyに含めない（端で利きが止まっても同じため）
        let edges = ((RANK_1 | RANK_8).and_not(rank_mask(sq)))
            | ((FILE_A | FILE_H).and_not(file_mask(sq)));

        let mask = sliding_attack(dirs, sq, Bitboard::EMPTY).and_not(edges);
        let bits = mask.count();
        let size = 1usize << bits;
        let offset = magic_attacks.len();

        magic_attacks.resize(offset + size, Bitboard::EMPTY);
        pext_attacks.resize(offset + size, Bitboard::EMPTY);

        // carry-ripplerで部分集合を列挙
        let mut b = Bitboard::EMPTY;
        let mut n = 0usize;
        loop {
            occupancy[n] = b;
            reference[n] = sliding_attack(dirs, sq, b);
            pext_attacks[offset + pext_software(b.0, mask.0) as usize] = reference[n];
            n += 1;
            b = Bitboard(b.0.wrapping_sub(mask.0) & mask.0);
            if b.is_empty() {
                break;
            }
        }
        debug_assert_eq!(n, size);

        let m = &mut magics[sq.index()];
        m.mask = mask;
        m.shift = 64 - bits;
        m.offset = offset;

        // 固定シード: 同じバイナリは常に同じmagicに到達する
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(0x9e37_79b9_7f4a_7c15 ^ sq.0 as u64);
        loop {
            // 疎な乱数でないと上位ビットの分散が足りない
            loop {
                m.magic = rng.next_u64() & rng.next_u64() & rng.next_u64();
                if (u64::wrapping_mul(m.magic, m.mask.0) >> 56).count_ones() >= 6 {
                    break;
                }
            }

            cnt += 1;
            let mut ok = true;
            for i in 0..n {
                let idx = m.magic_index(occupancy[i]);
                if epoch[idx] < cnt {
                    epoch[idx] = cnt;
                    magic_attacks[offset + idx] = reference[i];
                } else if magic_attacks[offset + idx] != reference[i] {
                    ok = false;
                    break;
                }
            }
            if ok {
                break;
            }
        }
    }

    magics
}

fn file_mask(sq: Square) -> Bitboard {
    Bitboard(FILE_A.0 << sq.file().index())
}

fn rank_mask(sq: Square) -> Bitboard {
    Bitboard(RANK_1.0 << (8 * sq.rank().index()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pext_software() {
        // mask = 0b1010 の中でbit3が立っている → 詰めるとbit1
        assert_eq!(pext_software(0b1000, 0b1010), 0b10);
        assert_eq!(pext_software(0b0010, 0b1010), 0b01);
        assert_eq!(pext_software(0, 0b1010), 0);
        assert_eq!(pext_software(u64::MAX, 0xff), 0xff);
    }

    #[test]
    fn test_sliding_attack_reference() {
        // 空盤のルーク利きは同じ筋・段の14マス
        let att = sliding_attack(&ROOK_DIRS, Square::A1, Bitboard::EMPTY);
        assert_eq!(att.count(), 14);
        // ブロッカーで止まる
        let occ = Bitboard::from_square(Square(2)); // c1
        let att = sliding_attack(&ROOK_DIRS, Square::A1, occ);
        assert!(att.contains(Square(2)));
        assert!(!att.contains(Square(3))); // d1には届かない
    }

    #[test]
    fn test_table_init() {
        let table = attack_table();
        // ルークのmagic領域は合計102400エントリ、ビショップ込みで107648
        assert_eq!(table.magic_attacks.len(), 107_648);
        assert_eq!(table.pext_attacks.len(), table.magic_attacks.len());
        // ナイト: 中央で8マス、隅で2マス
        assert_eq!(table.knight[Square(27).index()].count(), 8); // d4
        assert_eq!(table.knight[Square::A1.index()].count(), 2);
        // キング: 中央で8マス
        assert_eq!(table.king[Square(27).index()].count(), 8);
        // ポーン: a2の白ポーンはb3のみ
        assert_eq!(table.pawn[Color::White.index()][Square(8).index()].count(), 1);
    }

    #[test]
    fn test_magic_vs_reference() {
        let table = attack_table();
        // 各マスでいくつかのoccupancyに対し、magic経路と参照実装が一致する
        let mut occ_seed = 0x1234_5678_9abc_def0u64;
        for sq in Square::all() {
            for _ in 0..16 {
                occ_seed = occ_seed.wrapping_mul(6364136223846793005).wrapping_add(1);
                let occ = Bitboard(occ_seed);
                let m = &table.rook_magics[sq.index()];
                let magic_att = table.magic_attacks[m.offset + m.magic_index(occ)];
                assert_eq!(magic_att, sliding_attack(&ROOK_DIRS, sq, occ));
                let m = &table.bishop_magics[sq.index()];
                let magic_att = table.magic_attacks[m.offset + m.magic_index(occ)];
                assert_eq!(magic_att, sliding_attack(&BISHOP_DIRS, sq, occ));
            }
        }
    }
}
