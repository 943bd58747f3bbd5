//! 置換表エントリ
//!
//! 1エントリ16バイト: `key ^ data` と `data` のAtomicU64ペア。
//! 読み手は両ワードをrelaxedで読み、XORがキーと一致したときだけ
//! データを信用する。書き込みが裂けてもキー照合で弾かれるため、
//! スレッド間の同期は不要。
//!
//! dataのレイアウト:
//!
//! | bit    | 内容                  |
//! |--------|-----------------------|
//! | 0-31   | 指し手（Move生値）    |
//! | 32-47  | 評価値（i16）         |
//! | 48-55  | 深さ（u8）            |
//! | 56-57  | 境界種別              |
//! | 58-63  | 世代                  |

use std::sync::atomic::{AtomicU64, Ordering};

use crate::types::{Bound, Depth, Move, Value};

use super::GENERATION_CYCLE;

/// デコード済みの置換表データ
#[derive(Clone, Copy, Debug)]
pub struct TTData {
    /// 最善手（なければNULL）
    pub mv: Move,
    /// 評価値（詰みスコアはply補正前の保存表現）
    pub value: Value,
    /// 探索深さ
    pub depth: Depth,
    /// 境界種別
    pub bound: Bound,
    /// 書き込み時の世代
    pub generation: u8,
}

impl TTData {
    pub const EMPTY: TTData = TTData {
        mv: Move::NULL,
        value: Value::NONE,
        depth: 0,
        bound: Bound::None,
        generation: 0,
    };

    fn encode(&self) -> u64 {
        (self.mv.raw() as u64)
            | ((self.value.raw() as i16 as u16 as u64) << 32)
            | ((self.depth.clamp(0, 255) as u64) << 48)
            | ((self.bound as u64) << 56)
            | (((self.generation & (GENERATION_CYCLE - 1)) as u64) << 58)
    }

    fn decode(data: u64) -> Self {
        TTData {
            mv: Move::from_raw(data as u32),
            value: Value::new(((data >> 32) as u16 as i16) as i32),
            depth: ((data >> 48) & 0xff) as Depth,
            bound: Bound::from_u8(((data >> 56) & 0x3) as u8),
            generation: ((data >> 58) & (GENERATION_CYCLE - 1) as u64) as u8,
        }
    }
}

/// 16バイトのアトミックエントリ
pub struct TTEntry {
    key_data: AtomicU64,
    data: AtomicU64,
}

impl TTEntry {
    pub const fn new() -> Self {
        TTEntry {
            key_data: AtomicU64::new(0),
            data: AtomicU64::new(0),
        }
    }

    /// キーが一致すればデータを返す（裂けた書き込みはここで弾かれる）
    #[inline]
    pub fn read(&self, key: u64) -> Option<TTData> {
        let key_data = self.key_data.load(Ordering::Relaxed);
        let data = self.data.load(Ordering::Relaxed);
        if key_data ^ data == key {
            Some(TTData::decode(data))
        } else {
            None
        }
    }

    /// キー照合なしでデータを読む（置換スロット選択用）
    #[inline]
    pub fn peek(&self) -> TTData {
        TTData::decode(self.data.load(Ordering::Relaxed))
    }

    /// 書き込み（XORトリックで後から照合可能にする）
    #[inline]
    pub fn write(&self, key: u64, data: TTData) {
        let encoded = data.encode();
        self.data.store(encoded, Ordering::Relaxed);
        self.key_data.store(key ^ encoded, Ordering::Relaxed);
    }

    /// 何か書かれているか
    #[inline]
    pub fn is_occupied(&self) -> bool {
        self.data.load(Ordering::Relaxed) != 0
    }

    /// 現世代から見たエントリの古さ（世代周期でラップ）
    #[inline]
    pub fn relative_age(&self, generation: u8) -> u8 {
        let entry_gen = self.peek().generation;
        generation.wrapping_sub(entry_gen) & (GENERATION_CYCLE - 1)
    }
}

// 16バイトであることを保証（2スロットで1キャッシュラインの半分）
const _: () = assert!(std::mem::size_of::<TTEntry>() == 16);
