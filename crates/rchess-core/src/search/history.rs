//! History統計
//!
//! 探索中の手の成功/失敗を記録し、手の順序付けに利用する。
//!
//! - `StatsEntry`: 範囲制限付き履歴エントリ
//! - `MainHistory`: [Color][piece][to] -> score
//! - `CounterMoveTable`: [Color][piece][to] -> Move（直前の相手の手に対する応手）

use crate::types::{Color, Move, PieceType, Square};

/// MainHistoryの値域 [-D, D]
pub const HISTORY_MAX: i32 = 16384;

// ========== StatsEntry ==========

/// 履歴統計の1エントリ
///
/// 更新式: entry += clamp(bonus, -D, D) - entry * |clamp(bonus, -D, D)| / D
///
/// bonus == D でentryはDに収束し、値は自然にゼロ方向へ引き戻される
/// （history gravity）。
#[derive(Clone, Copy)]
pub struct StatsEntry<const D: i32> {
    value: i16,
}

impl<const D: i32> Default for StatsEntry<D> {
    fn default() -> Self {
        Self { value: 0 }
    }
}

impl<const D: i32> StatsEntry<D> {
    #[inline]
    pub fn get(&self) -> i16 {
        self.value
    }

    #[inline]
    pub fn set(&mut self, v: i16) {
        self.value = v;
    }

    /// ボーナス値を加算（範囲制限付き）
    #[inline]
    pub fn update(&mut self, bonus: i32) {
        let clamped = bonus.clamp(-D, D);
        let delta = clamped - (self.value as i32) * clamped.abs() / D;
        self.value = (self.value as i32 + delta) as i16;
        debug_assert!(self.value.unsigned_abs() <= D as u16);
    }
}

// ========== MainHistory ==========

/// 静かな手の履歴: [Color][piece][to] -> score
pub struct MainHistory {
    table: Box<[[[StatsEntry<HISTORY_MAX>; Square::NUM]; PieceType::NUM]; Color::NUM]>,
}

impl MainHistory {
    pub fn new() -> Self {
        Self {
            table: Box::new(
                [[[StatsEntry::default(); Square::NUM]; PieceType::NUM]; Color::NUM],
            ),
        }
    }

    #[inline]
    pub fn get(&self, c: Color, mv: Move) -> i16 {
        let (pt, to) = mv.piece_to_index();
        self.table[c.index()][pt][to].get()
    }

    #[inline]
    pub fn update(&mut self, c: Color, mv: Move, bonus: i32) {
        let (pt, to) = mv.piece_to_index();
        self.table[c.index()][pt][to].update(bonus);
    }

    pub fn clear(&mut self) {
        for color_table in self.table.iter_mut() {
            for pt_table in color_table.iter_mut() {
                for entry in pt_table.iter_mut() {
                    entry.set(0);
                }
            }
        }
    }
}

impl Default for MainHistory {
    fn default() -> Self {
        Self::new()
    }
}

// ========== CounterMoveTable ==========

/// 直前の相手の手（指した側・駒種・移動先）に対するカウンター手
pub struct CounterMoveTable {
    table: Box<[[[Move; Square::NUM]; PieceType::NUM]; Color::NUM]>,
}

impl CounterMoveTable {
    pub fn new() -> Self {
        Self {
            table: Box::new([[[Move::NULL; Square::NUM]; PieceType::NUM]; Color::NUM]),
        }
    }

    /// 直前の手に対するカウンター手を取得
    #[inline]
    pub fn get(&self, prev: Move) -> Move {
        if prev.is_null() {
            return Move::NULL;
        }
        let (pt, to) = prev.piece_to_index();
        self.table[prev.side().index()][pt][to]
    }

    #[inline]
    pub fn set(&mut self, prev: Move, counter: Move) {
        if prev.is_null() {
            return;
        }
        let (pt, to) = prev.piece_to_index();
        self.table[prev.side().index()][pt][to] = counter;
    }

    pub fn clear(&mut self) {
        for color_table in self.table.iter_mut() {
            for pt_table in color_table.iter_mut() {
                for entry in pt_table.iter_mut() {
                    *entry = Move::NULL;
                }
            }
        }
    }
}

impl Default for CounterMoveTable {
    fn default() -> Self {
        Self::new()
    }
}

// ========== HistoryTables ==========

/// スレッドローカルに持つ履歴テーブル一式
pub struct HistoryTables {
    pub main: MainHistory,
    pub counter: CounterMoveTable,
}

impl HistoryTables {
    pub fn new() -> Self {
        Self {
            main: MainHistory::new(),
            counter: CounterMoveTable::new(),
        }
    }

    pub fn clear(&mut self) {
        self.main.clear();
        self.counter.clear();
    }
}

impl Default for HistoryTables {
    fn default() -> Self {
        Self::new()
    }
}

// ========== ボーナス計算 ==========

/// カットオフ時のhistoryボーナス
#[inline]
pub fn stat_bonus(depth: i32) -> i32 {
    (130 * depth - 103).min(1652)
}

/// カットオフを起こさなかった手へのペナルティ
#[inline]
pub fn stat_malus(depth: i32) -> i32 {
    (303 * depth - 273).min(1352)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MoveKind;

    fn quiet(c: Color, pt: PieceType, from: &str, to: &str) -> Move {
        Move::new(
            c,
            pt,
            Square::from_uci(from).unwrap(),
            Square::from_uci(to).unwrap(),
            MoveKind::Normal,
        )
    }

    #[test]
    fn test_stats_entry_bounded() {
        let mut entry = StatsEntry::<1000>::default();
        for _ in 0..100 {
            entry.update(1000);
        }
        assert_eq!(entry.get(), 1000);
        for _ in 0..100 {
            entry.update(-1000);
        }
        assert_eq!(entry.get(), -1000);
    }

    #[test]
    fn test_stats_entry_small_bonus_near_linear() {
        let mut entry = StatsEntry::<16384>::default();
        entry.update(100);
        assert_eq!(entry.get(), 100);
    }

    #[test]
    fn test_main_history_update_and_get() {
        let mut hist = MainHistory::new();
        let mv = quiet(Color::White, PieceType::Knight, "g1", "f3");
        assert_eq!(hist.get(Color::White, mv), 0);
        hist.update(Color::White, mv, 500);
        assert!(hist.get(Color::White, mv) > 0);
        // 別の色のスロットは独立
        assert_eq!(hist.get(Color::Black, mv), 0);
        hist.clear();
        assert_eq!(hist.get(Color::White, mv), 0);
    }

    #[test]
    fn test_counter_move_table() {
        let mut table = CounterMoveTable::new();
        let prev = quiet(Color::White, PieceType::Pawn, "e2", "e4");
        let reply = quiet(Color::Black, PieceType::Pawn, "e7", "e5");
        assert!(table.get(prev).is_null());
        table.set(prev, reply);
        assert_eq!(table.get(prev), reply);
        // null手に対しては何も記録しない
        table.set(Move::NULL, reply);
        assert!(table.get(Move::NULL).is_null());
    }

    #[test]
    fn test_stat_bonus_monotone_and_capped() {
        assert!(stat_bonus(2) > stat_bonus(1));
        assert_eq!(stat_bonus(100), 1652);
        assert_eq!(stat_malus(100), 1352);
    }
}
