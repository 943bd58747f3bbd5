//! MovePicker（指し手オーダリング）
//!
//! カットオフを起こしやすい手から順に返す段階的イテレータ。
//! 各段階は到達時に初めて生成する（lazy generation）ので、
//! 早いカットオフなら後段の生成コストは一切かからない。
//!
//! ## Stage
//!
//! ### 通常探索（王手なし）
//! 1. MainTt       - 置換表の指し手
//! 2. CaptureInit  - 捕獲手の生成（MVV-LVAスコア）
//! 3. GoodCapture  - SEE >= 0 の捕獲手。負けるタダ取りは後段へ回す
//! 4. PromotionInit/Promotion - 静かな成り
//! 5. Killer1/Killer2/Counter - キラー手とカウンター手
//! 6. BadCapture   - 後回しにした捕獲手
//! 7. QuietInit/Quiet - 残りの静かな手（historyスコア順）
//!
//! ### 王手回避
//! EvasionTt -> EvasionInit -> Evasion
//!
//! ### 静止探索
//! QsTt -> QsCaptureInit -> QsCapture
//!
//! ## History参照を保持しない設計
//!
//! 再帰呼び出し時の参照エイリアス問題を避けるため、MovePickerは
//! HistoryTablesへの参照をフィールドに持たず、`next_move()`の引数で受け取る。

use super::history::HistoryTables;
use crate::movegen::{
    generate_captures, generate_evasions, generate_promotions, generate_quiets, ExtMove,
    MoveList,
};
use crate::position::Position;
use crate::types::{Move, Value};

/// 後回しにする負けSEE捕獲手の上限。溢れた分はその場で返す
/// （並べ替えコストの悪化を抑えるため）。
const MAX_BAD_CAPTURES: usize = 16;

// ========== Stage ==========

/// 指し手生成の段階
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum Stage {
    MainTt,
    CaptureInit,
    GoodCapture,
    PromotionInit,
    Promotion,
    Killer1,
    Killer2,
    Counter,
    BadCapture,
    QuietInit,
    Quiet,

    EvasionTt,
    EvasionInit,
    Evasion,

    QsTt,
    QsCaptureInit,
    QsCapture,

    End,
}

// ========== MovePicker ==========

/// 段階的な指し手イテレータ
pub struct MovePicker {
    stage: Stage,
    tt_move: Move,
    killers: [Move; 2],
    counter: Move,
    skip_quiets: bool,
    with_promotions: bool,

    moves: MoveList,
    cur: usize,
    bad_captures: [ExtMove; MAX_BAD_CAPTURES],
    bad_count: usize,
    bad_cur: usize,
}

impl MovePicker {
    /// 通常ノード用（王手中なら自動的に回避パスへ）
    pub fn new(pos: &Position, tt_move: Move, killers: [Move; 2], counter: Move) -> Self {
        let tt_ok = tt_move.is_some() && pos.is_pseudo_legal(tt_move);
        let stage = if pos.in_check() {
            if tt_ok {
                Stage::EvasionTt
            } else {
                Stage::EvasionInit
            }
        } else if tt_ok {
            Stage::MainTt
        } else {
            Stage::CaptureInit
        };
        Self::with_stage(stage, tt_move, killers, counter)
    }

    /// 静止探索用。王手中は回避パス、そうでなければ捕獲手
    /// （`with_promotions` なら静かな成りも）のみを返す
    pub fn new_qsearch(pos: &Position, tt_move: Move, with_promotions: bool) -> Self {
        let tt_ok = tt_move.is_some()
            && pos.is_pseudo_legal(tt_move)
            && (pos.in_check() || !tt_move.is_quiet());
        let stage = if pos.in_check() {
            if tt_ok {
                Stage::EvasionTt
            } else {
                Stage::EvasionInit
            }
        } else if tt_ok {
            Stage::QsTt
        } else {
            Stage::QsCaptureInit
        };
        let mut mp = Self::with_stage(stage, tt_move, [Move::NULL; 2], Move::NULL);
        mp.with_promotions = with_promotions;
        mp
    }

    fn with_stage(stage: Stage, tt_move: Move, killers: [Move; 2], counter: Move) -> Self {
        Self {
            stage,
            tt_move,
            killers,
            counter,
            skip_quiets: false,
            with_promotions: false,
            moves: MoveList::new(),
            cur: 0,
            bad_captures: [ExtMove::NONE; MAX_BAD_CAPTURES],
            bad_count: 0,
            bad_cur: 0,
        }
    }

    /// 残りのquiet手の生成と列挙をスキップする（LMP用）
    pub fn skip_quiets(&mut self) {
        self.skip_quiets = true;
    }

    #[inline]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// 次の指し手を返す。尽きたら `Move::NULL`
    pub fn next_move(&mut self, pos: &Position, history: &HistoryTables) -> Move {
        loop {
            match self.stage {
                Stage::MainTt | Stage::EvasionTt | Stage::QsTt => {
                    self.stage = match self.stage {
                        Stage::MainTt => Stage::CaptureInit,
                        Stage::EvasionTt => Stage::EvasionInit,
                        _ => Stage::QsCaptureInit,
                    };
                    return self.tt_move;
                }

                Stage::CaptureInit | Stage::QsCaptureInit => {
                    self.moves.clear();
                    self.cur = 0;
                    generate_captures(pos, &mut self.moves);
                    if self.stage == Stage::QsCaptureInit && self.with_promotions {
                        generate_promotions(pos, &mut self.moves);
                    }
                    score_captures(&mut self.moves);
                    self.stage = if self.stage == Stage::CaptureInit {
                        Stage::GoodCapture
                    } else {
                        Stage::QsCapture
                    };
                }

                Stage::GoodCapture => {
                    while self.cur < self.moves.len() {
                        let ext = self.moves.pick_best(self.cur);
                        self.cur += 1;
                        if ext.mv == self.tt_move {
                            continue;
                        }
                        if pos.see(ext.mv) >= Value::ZERO {
                            return ext.mv;
                        }
                        if self.bad_count < MAX_BAD_CAPTURES {
                            self.bad_captures[self.bad_count] = ext;
                            self.bad_count += 1;
                        } else {
                            return ext.mv;
                        }
                    }
                    self.stage = Stage::PromotionInit;
                }

                Stage::PromotionInit => {
                    self.moves.clear();
                    self.cur = 0;
                    generate_promotions(pos, &mut self.moves);
                    score_promotions(&mut self.moves);
                    self.stage = Stage::Promotion;
                }

                Stage::Promotion => {
                    while self.cur < self.moves.len() {
                        let ext = self.moves.pick_best(self.cur);
                        self.cur += 1;
                        if ext.mv != self.tt_move {
                            return ext.mv;
                        }
                    }
                    self.stage = Stage::Killer1;
                }

                Stage::Killer1 | Stage::Killer2 => {
                    let mv = if self.stage == Stage::Killer1 {
                        self.stage = Stage::Killer2;
                        self.killers[0]
                    } else {
                        self.stage = Stage::Counter;
                        self.killers[1]
                    };
                    if mv.is_some()
                        && mv != self.tt_move
                        && mv.is_quiet()
                        && pos.is_pseudo_legal(mv)
                    {
                        return mv;
                    }
                }

                Stage::Counter => {
                    self.stage = Stage::BadCapture;
                    let mv = self.counter;
                    if mv.is_some()
                        && mv != self.tt_move
                        && mv != self.killers[0]
                        && mv != self.killers[1]
                        && mv.is_quiet()
                        && pos.is_pseudo_legal(mv)
                    {
                        return mv;
                    }
                }

                Stage::BadCapture => {
                    if self.bad_cur < self.bad_count {
                        let mv = self.bad_captures[self.bad_cur].mv;
                        self.bad_cur += 1;
                        return mv;
                    }
                    self.stage = Stage::QuietInit;
                }

                Stage::QuietInit => {
                    if self.skip_quiets {
                        self.stage = Stage::End;
                        continue;
                    }
                    self.moves.clear();
                    self.cur = 0;
                    generate_quiets(pos, &mut self.moves);
                    score_quiets(pos, history, &mut self.moves);
                    self.stage = Stage::Quiet;
                }

                Stage::Quiet => {
                    if self.skip_quiets {
                        self.stage = Stage::End;
                        continue;
                    }
                    while self.cur < self.moves.len() {
                        let ext = self.moves.pick_best(self.cur);
                        self.cur += 1;
                        let mv = ext.mv;
                        if mv != self.tt_move
                            && mv != self.killers[0]
                            && mv != self.killers[1]
                            && mv != self.counter
                        {
                            return mv;
                        }
                    }
                    self.stage = Stage::End;
                }

                Stage::EvasionInit => {
                    self.moves.clear();
                    self.cur = 0;
                    generate_evasions(pos, &mut self.moves);
                    score_evasions(pos, history, &mut self.moves);
                    self.stage = Stage::Evasion;
                }

                Stage::Evasion => {
                    while self.cur < self.moves.len() {
                        let ext = self.moves.pick_best(self.cur);
                        self.cur += 1;
                        if ext.mv != self.tt_move {
                            return ext.mv;
                        }
                    }
                    self.stage = Stage::End;
                }

                Stage::QsCapture => {
                    while self.cur < self.moves.len() {
                        let ext = self.moves.pick_best(self.cur);
                        self.cur += 1;
                        if ext.mv != self.tt_move {
                            return ext.mv;
                        }
                    }
                    self.stage = Stage::End;
                }

                Stage::End => return Move::NULL,
            }
        }
    }
}

// ========== スコアリング ==========

/// 捕獲手のMVV-LVAスコア
///
/// 取る駒が主、動かす駒が従（安い駒で取るほど高評価）。成り捕獲は
/// 成る駒の価値も足す。
fn score_captures(list: &mut MoveList) {
    for ext in list.as_ext_mut_slice() {
        let mv = ext.mv;
        let captured = mv.captured().map_or(0, |pt| pt.value());
        let promo = mv.promotion().map_or(0, |pt| pt.value());
        ext.value = captured * 8 - mv.piece().value() / 16 + promo;
    }
}

fn score_promotions(list: &mut MoveList) {
    for ext in list.as_ext_mut_slice() {
        ext.value = ext.mv.promotion().map_or(0, |pt| pt.value());
    }
}

fn score_quiets(pos: &Position, history: &HistoryTables, list: &mut MoveList) {
    let us = pos.side_to_move();
    for ext in list.as_ext_mut_slice() {
        ext.value = history.main.get(us, ext.mv) as i32;
    }
}

/// 回避手は捕獲を先に（MVV-LVA+オフセット）、静かな合駒はhistory順
fn score_evasions(pos: &Position, history: &HistoryTables, list: &mut MoveList) {
    let us = pos.side_to_move();
    for ext in list.as_ext_mut_slice() {
        let mv = ext.mv;
        if mv.is_capture() {
            let captured = mv.captured().map_or(0, |pt| pt.value());
            ext.value = HISTORY_OFFSET + captured * 8 - mv.piece().value() / 16;
        } else {
            ext.value = history.main.get(us, mv) as i32;
        }
    }
}

/// 回避手スコアで捕獲手を必ずhistory値より上に置くためのオフセット
const HISTORY_OFFSET: i32 = 1 << 20;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::START_FEN;
    use crate::types::MoveKind;

    fn sq(s: &str) -> crate::types::Square {
        crate::types::Square::from_uci(s).unwrap()
    }

    fn collect_all(pos: &Position, mp: &mut MovePicker, history: &HistoryTables) -> Vec<Move> {
        let mut out = Vec::new();
        loop {
            let mv = mp.next_move(pos, history);
            if mv.is_null() {
                break;
            }
            out.push(mv);
        }
        out
    }

    #[test]
    fn test_startpos_yields_all_moves_once() {
        let pos = Position::from_fen(START_FEN).unwrap();
        let history = HistoryTables::new();
        let mut mp = MovePicker::new(&pos, Move::NULL, [Move::NULL; 2], Move::NULL);
        let moves = collect_all(&pos, &mut mp, &history);
        assert_eq!(moves.len(), 20);
        let mut dedup = moves.clone();
        dedup.sort_by_key(|m| m.raw());
        dedup.dedup();
        assert_eq!(dedup.len(), 20);
    }

    #[test]
    fn test_tt_move_first_and_not_repeated() {
        let pos = Position::from_fen(START_FEN).unwrap();
        let history = HistoryTables::new();
        let tt_move = Move::new(
            crate::types::Color::White,
            crate::types::PieceType::Pawn,
            sq("e2"),
            sq("e4"),
            MoveKind::DoublePush,
        );
        let mut mp = MovePicker::new(&pos, tt_move, [Move::NULL; 2], Move::NULL);
        let moves = collect_all(&pos, &mut mp, &history);
        assert_eq!(moves[0], tt_move);
        assert_eq!(moves.len(), 20);
        assert_eq!(moves.iter().filter(|&&m| m == tt_move).count(), 1);
    }

    #[test]
    fn test_good_capture_before_bad_capture() {
        // 白: Qxd5 はポーンに取り返されて損、Nxd5 はルーク得で勝ちSEE
        let pos =
            Position::from_fen("4k3/8/4p3/3r4/8/2N5/8/3Q1K2 w - - 0 1").unwrap();
        let history = HistoryTables::new();
        let mut mp = MovePicker::new(&pos, Move::NULL, [Move::NULL; 2], Move::NULL);
        let moves = collect_all(&pos, &mut mp, &history);
        let nxd5 = moves
            .iter()
            .position(|m| m.piece() == crate::types::PieceType::Knight && m.is_capture())
            .unwrap();
        let qxd5 = moves
            .iter()
            .position(|m| m.piece() == crate::types::PieceType::Queen && m.is_capture())
            .unwrap();
        assert!(nxd5 < qxd5);
    }

    #[test]
    fn test_killer_before_quiets() {
        let pos = Position::from_fen(START_FEN).unwrap();
        let history = HistoryTables::new();
        let killer = Move::new(
            crate::types::Color::White,
            crate::types::PieceType::Knight,
            sq("g1"),
            sq("f3"),
            MoveKind::Normal,
        );
        let mut mp = MovePicker::new(&pos, Move::NULL, [killer, Move::NULL], Move::NULL);
        let moves = collect_all(&pos, &mut mp, &history);
        // 捕獲も成りもない初期局面ではキラーが先頭に来る
        assert_eq!(moves[0], killer);
        assert_eq!(moves.len(), 20);
    }

    #[test]
    fn test_history_orders_quiets() {
        let pos = Position::from_fen(START_FEN).unwrap();
        let mut history = HistoryTables::new();
        let good = Move::new(
            crate::types::Color::White,
            crate::types::PieceType::Pawn,
            sq("d2"),
            sq("d4"),
            MoveKind::DoublePush,
        );
        history.main.update(crate::types::Color::White, good, 1000);
        let mut mp = MovePicker::new(&pos, Move::NULL, [Move::NULL; 2], Move::NULL);
        let moves = collect_all(&pos, &mut mp, &history);
        assert_eq!(moves[0], good);
    }

    #[test]
    fn test_skip_quiets() {
        let pos = Position::from_fen(START_FEN).unwrap();
        let history = HistoryTables::new();
        let mut mp = MovePicker::new(&pos, Move::NULL, [Move::NULL; 2], Move::NULL);
        mp.skip_quiets();
        let moves = collect_all(&pos, &mut mp, &history);
        assert!(moves.is_empty());
    }

    #[test]
    fn test_qsearch_returns_captures_only() {
        let pos =
            Position::from_fen("4k3/8/4p3/3p4/8/2N5/8/3Q1K2 w - - 0 1").unwrap();
        let history = HistoryTables::new();
        let mut mp = MovePicker::new_qsearch(&pos, Move::NULL, false);
        let moves = collect_all(&pos, &mut mp, &history);
        assert!(!moves.is_empty());
        assert!(moves.iter().all(|m| m.is_capture()));
    }

    #[test]
    fn test_evasion_path_when_in_check() {
        let pos = Position::from_fen("4k3/8/8/8/8/4r3/8/4K3 w - - 0 1").unwrap();
        let history = HistoryTables::new();
        let mut mp = MovePicker::new(&pos, Move::NULL, [Move::NULL; 2], Move::NULL);
        let moves = collect_all(&pos, &mut mp, &history);
        let mut expect = MoveList::new();
        generate_evasions(&pos, &mut expect);
        assert_eq!(moves.len(), expect.len());
    }

}
