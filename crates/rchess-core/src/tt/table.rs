//! TranspositionTable本体
//!
//! - 2スロットバケット（インデックスとXOR-1隣接）
//! - probe/save操作と世代管理

use std::sync::atomic::{AtomicU8, Ordering};

use crate::types::{value_from_tt, value_to_tt, Bound, Depth, Move, Value};

use super::entry::{TTData, TTEntry};
use super::GENERATION_CYCLE;

/// 置換表
pub struct TranspositionTable {
    entries: Vec<TTEntry>,
    /// 世代カウンター
    generation: AtomicU8,
}

impl TranspositionTable {
    /// 新しい置換表を作成（サイズはMB単位）
    pub fn new(mb_size: usize) -> Self {
        let mut tt = TranspositionTable {
            entries: Vec::new(),
            generation: AtomicU8::new(0),
        };
        tt.resize(mb_size);
        tt
    }

    /// サイズを変更（内容は消える）
    pub fn resize(&mut self, mb_size: usize) {
        let count = (mb_size * 1024 * 1024 / std::mem::size_of::<TTEntry>()) & !1;
        let count = count.max(2); // XOR-1の相方が必ず存在するよう偶数・最小2
        self.entries = (0..count).map(|_| TTEntry::new()).collect();
        self.generation.store(0, Ordering::Relaxed);
        log::debug!("transposition table resized: {mb_size} MiB, {count} entries");
    }

    /// クリア（エントリ書き込みはアトミックなので共有参照でよい）
    pub fn clear(&self) {
        for entry in &self.entries {
            entry.write(0, TTData::EMPTY);
        }
        self.generation.store(0, Ordering::Relaxed);
    }

    /// 新しい探索を開始（世代を進める）
    pub fn new_search(&self) {
        self.generation.fetch_add(1, Ordering::Relaxed);
    }

    /// 現在の世代を取得
    #[inline]
    pub fn generation(&self) -> u8 {
        self.generation.load(Ordering::Relaxed) & (GENERATION_CYCLE - 1)
    }

    /// バケット先頭のインデックス（乗算高位ビット法、bit0は相方用）
    #[inline]
    fn index(&self, key: u64) -> usize {
        ((key as u128 * self.entries.len() as u128) >> 64) as usize
    }

    /// 置換表を検索
    ///
    /// ヒット時は評価値をplyで現在節点の表現に戻して返す。
    pub fn probe(&self, key: u64, ply: i32) -> ProbeResult {
        let first = self.index(key);
        let bucket = [&self.entries[first], &self.entries[first ^ 1]];

        for entry in bucket {
            if let Some(mut data) = entry.read(key) {
                data.value = value_from_tt(data.value, ply);
                return ProbeResult {
                    found: entry.is_occupied(),
                    data,
                };
            }
        }

        ProbeResult {
            found: false,
            data: TTData::EMPTY,
        }
    }

    /// 書き込み先スロットを選ぶ
    ///
    /// 同キーがあればそのスロット。なければバケット内で最も
    /// 置換価値の低いもの（置換価値 = 深さ - 古さ）。
    fn store_slot(&self, key: u64) -> &TTEntry {
        let first = self.index(key);
        let bucket = [&self.entries[first], &self.entries[first ^ 1]];

        for entry in bucket {
            if entry.read(key).is_some() {
                return entry;
            }
        }

        let gen = self.generation();
        let worth = |e: &TTEntry| e.peek().depth as i32 - 8 * e.relative_age(gen) as i32;
        if worth(bucket[0]) <= worth(bucket[1]) {
            bucket[0]
        } else {
            bucket[1]
        }
    }

    /// 探索結果を保存する
    ///
    /// 同キーの深いエントリをExact以外の浅い結果で潰さない。
    /// 指し手がNULLで同キーヒットなら既存の指し手を残す。
    pub fn save(&self, key: u64, value: Value, bound: Bound, depth: Depth, mv: Move, ply: i32) {
        debug_assert!(value != Value::NONE, "abort sentinel must not be stored");

        let generation = self.generation();
        let entry = self.store_slot(key);

        let old = entry.read(key);
        let keep_move = match (mv.is_null(), &old) {
            (true, Some(old)) => old.mv,
            _ => mv,
        };

        if let Some(old) = &old {
            // 同世代・同キーの深い結果を浅い上書きから守る
            if bound != Bound::Exact && old.generation == generation && depth + 4 <= old.depth {
                return;
            }
        }

        entry.write(
            key,
            TTData {
                mv: keep_move,
                value: value_to_tt(value, ply),
                depth,
                bound,
                generation,
            },
        );
    }

    /// 置換表の使用率を1000分率で返す（先頭サンプリング）
    pub fn hashfull(&self) -> i32 {
        let gen = self.generation();
        let sample = 1000.min(self.entries.len());
        let mut count = 0;
        for entry in self.entries.iter().take(sample) {
            if entry.is_occupied() && entry.peek().generation == gen {
                count += 1;
            }
        }
        (count * 1000 / sample as i32).min(1000)
    }
}

/// probe結果（値渡し。保存は`TranspositionTable::save`で行う）
pub struct ProbeResult {
    /// ヒットしたか
    pub found: bool,
    /// 読み取ったデータ（評価値はply補正済み）
    pub data: TTData,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Color, MoveKind, PieceType, Square};

    fn mv() -> Move {
        Move::new(
            Color::White,
            PieceType::Pawn,
            Square(12),
            Square(28),
            MoveKind::DoublePush,
        )
    }

    #[test]
    fn test_probe_miss_then_hit() {
        let tt = TranspositionTable::new(1);
        let key = 0x0123_4567_89ab_cdefu64;

        let probe = tt.probe(key, 0);
        assert!(!probe.found);
        tt.save(key, Value::new(42), Bound::Exact, 5, mv(), 0);

        let probe = tt.probe(key, 0);
        assert!(probe.found);
        assert_eq!(probe.data.value, Value::new(42));
        assert_eq!(probe.data.depth, 5);
        assert_eq!(probe.data.bound, Bound::Exact);
        assert_eq!(probe.data.mv, mv());
    }

    #[test]
    fn test_mate_score_ply_translation() {
        let tt = TranspositionTable::new(1);
        let key = 0x1111_2222_3333_4444u64;

        // ply 3 で「2手後に詰ます」スコアを保存
        tt.save(key, Value::mate_in(5), Bound::Exact, 8, mv(), 3);

        // ply 7 から読むと同じ詰みが相対的に近く見える
        let probe = tt.probe(key, 7);
        assert!(probe.found);
        assert_eq!(probe.data.value, Value::mate_in(9));
    }

    #[test]
    fn test_no_false_positives() {
        let tt = TranspositionTable::new(1);
        let mut seed = 0x9e37_79b9_97f4_a7c1u64;
        let mut next = move || {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            seed
        };

        let mut stored = Vec::new();
        for _ in 0..1000 {
            let key = next();
            tt.save(key, Value::new(1), Bound::Lower, 1, Move::NULL, 0);
            stored.push(key);
        }
        // 保存していない10000キーはヒットしない（64bitキー完全照合）
        for _ in 0..10_000 {
            let key = next();
            if !stored.contains(&key) {
                assert!(!tt.probe(key, 0).found);
            }
        }
    }

    #[test]
    fn test_generation_affects_replacement() {
        let tt = TranspositionTable::new(1);
        let key = 0xaaaa_bbbb_cccc_ddddu64;

        tt.save(key, Value::new(10), Bound::Exact, 10, mv(), 0);
        tt.new_search();
        assert_eq!(tt.generation(), 1);

        // 旧世代の深いエントリも、新世代のExactなら上書きできる
        tt.save(key, Value::new(20), Bound::Exact, 2, Move::NULL, 0);
        let probe = tt.probe(key, 0);
        assert_eq!(probe.data.value, Value::new(20));
        // NULL指し手での保存は既存の指し手を残す
        assert_eq!(probe.data.mv, mv());
    }

    #[test]
    fn test_shallow_overwrite_protected() {
        let tt = TranspositionTable::new(1);
        let key = 0x5555_6666_7777_8888u64;

        tt.save(key, Value::new(30), Bound::Lower, 12, mv(), 0);
        // 同世代・同キーの大幅に浅いLower結果は無視される
        tt.save(key, Value::new(-5), Bound::Lower, 2, Move::NULL, 0);
        let probe = tt.probe(key, 0);
        assert_eq!(probe.data.value, Value::new(30));
        assert_eq!(probe.data.depth, 12);
    }
}
