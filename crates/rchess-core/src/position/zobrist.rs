//! Zobristハッシュ

use crate::types::{File, Piece, Square};

/// Zobristハッシュ用乱数テーブル
pub struct Zobrist {
    /// 手番用（黒番のときxorする）
    pub side: u64,
    /// 駒×升 [Piece.index()][Square.index()]
    pub psq: [[u64; Square::NUM]; Piece::NUM],
    /// キャスリング権（4bitマスクでそのまま引く）
    pub castling: [u64; 16],
    /// アンパッサン筋
    pub ep_file: [u64; File::NUM],
}

impl Zobrist {
    /// テーブル初期化
    pub const fn init() -> Self {
        let mut zobrist = Zobrist {
            side: 0,
            psq: [[0; Square::NUM]; Piece::NUM],
            castling: [0; 16],
            ep_file: [0; File::NUM],
        };

        // XorShift64で疑似乱数生成
        let mut seed = 0x123456789ABCDEF0u64;

        // 手番用
        seed = xorshift64(seed);
        zobrist.side = seed;

        // 駒×升
        // pc == 12 (Piece::NONE) は常に0を保つためスキップ
        let mut pc = 0;
        while pc < Piece::NUM - 1 {
            let mut sq = 0;
            while sq < Square::NUM {
                seed = xorshift64(seed);
                zobrist.psq[pc][sq] = seed;
                sq += 1;
            }
            pc += 1;
        }

        // キャスリング権（mask == 0 は0のままにし、権利なしを恒等にする）
        let mut mask = 1;
        while mask < 16 {
            seed = xorshift64(seed);
            zobrist.castling[mask] = seed;
            mask += 1;
        }

        // アンパッサン筋
        let mut file = 0;
        while file < File::NUM {
            seed = xorshift64(seed);
            zobrist.ep_file[file] = seed;
            file += 1;
        }

        zobrist
    }
}

/// XorShift64疑似乱数生成（const fn対応）
const fn xorshift64(mut x: u64) -> u64 {
    x ^= x << 13;
    x ^= x >> 7;
    x ^= x << 17;
    x
}

/// グローバルZobristテーブル
pub static ZOBRIST: Zobrist = Zobrist::init();

/// 駒と升のハッシュを取得
#[inline]
pub fn zobrist_psq(pc: Piece, sq: Square) -> u64 {
    ZOBRIST.psq[pc.index()][sq.index()]
}

/// キャスリング権マスクのハッシュを取得
#[inline]
pub fn zobrist_castling(mask: u8) -> u64 {
    ZOBRIST.castling[mask as usize]
}

/// アンパッサン筋のハッシュを取得
#[inline]
pub fn zobrist_ep(file: File) -> u64 {
    ZOBRIST.ep_file[file.index()]
}

/// 手番のハッシュを取得
#[inline]
pub fn zobrist_side() -> u64 {
    ZOBRIST.side
}
