//! Alpha-Beta探索
//!
//! 反復深化 + aspiration window を外側に、fail-soft negamax の
//! Principal Variation Search を内側に持つ。枝刈りは
//! mate distance pruning / Null Move Pruning / 置換表カットオフ /
//! 静止探索（depth <= 0）。
//!
//! 中断（時間切れ・stop・ノード上限）はノードカウンタのポーリングで
//! 検出し、検出後は `Value::NONE` を番兵として呼び出し元へ伝播する。
//! 中断したノードの結果は置換表に保存しない。

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use super::history::{stat_bonus, stat_malus, HistoryTables};
use super::limits::Limits;
use super::movepick::MovePicker;
use super::time_manager::TimeManager;
use crate::eval::evaluate;
use crate::movegen::{generate_all, MoveList};
use crate::position::Position;
use crate::tt::TranspositionTable;
use crate::types::{Bound, Depth, Move, Value, DEPTH_QS, MAX_PLY};

/// aspiration windowの拡大ステップ。使い切ったら全窓
const ASPIRATION_STEPS: [i32; 4] = [17, 68, 272, 1088];

/// aspirationを使い始める深さ
const ASPIRATION_MIN_DEPTH: Depth = 4;

/// 中断チェックの間隔（ノード数）
const ABORT_CHECK_INTERVAL: i32 = 2048;

/// カットオフしなかったquiet手のペナルティ対象の上限
const MAX_TRIED_QUIETS: usize = 64;

/// 静止探索で静かな成りまで読む深さ（DEPTH_QSからの相対）
const QS_PROMOTION_DEPTH: Depth = -1;

// ========== 探索スタック ==========

/// plyごとの探索フレーム
#[derive(Clone, Default)]
struct StackFrame {
    current_move: Move,
    killers: [Move; 2],
    static_eval: Option<Value>,
    in_check: bool,
    pv: Vec<Move>,
}

/// 負オフセット参照用の余白
const STACK_GUARD: usize = 2;

/// 固定長の探索スタック
///
/// `frame(-1)` で親plyのフレームを参照できる。
struct Stack {
    frames: Vec<StackFrame>,
}

impl Stack {
    fn new() -> Self {
        Self {
            frames: vec![StackFrame::default(); MAX_PLY as usize + STACK_GUARD + 2],
        }
    }

    #[inline]
    fn frame(&self, ply: i32) -> &StackFrame {
        &self.frames[(ply + STACK_GUARD as i32) as usize]
    }

    #[inline]
    fn frame_mut(&mut self, ply: i32) -> &mut StackFrame {
        &mut self.frames[(ply + STACK_GUARD as i32) as usize]
    }

    fn clear(&mut self) {
        for frame in &mut self.frames {
            *frame = StackFrame::default();
        }
    }
}

// ========== ルート手 ==========

/// ルート手とその探索結果
#[derive(Clone)]
struct RootMove {
    mv: Move,
    value: Value,
    prev_value: Value,
    pv: Vec<Move>,
}

impl RootMove {
    fn new(mv: Move) -> Self {
        Self {
            mv,
            value: -Value::INFINITE,
            prev_value: -Value::INFINITE,
            pv: vec![mv],
        }
    }
}

// ========== 報告 ==========

/// 反復深化の進捗報告（UCI infoの元データ）
#[derive(Clone, Debug)]
pub struct SearchReport {
    pub depth: Depth,
    pub seldepth: i32,
    pub value: Value,
    pub bound: Bound,
    pub nodes: u64,
    pub elapsed_ms: i64,
    pub hashfull: i32,
    pub pv: Vec<Move>,
}

/// 探索の最終結果
#[derive(Clone, Debug)]
pub struct SearchResult {
    pub best_move: Move,
    pub ponder_move: Move,
    pub value: Value,
}

/// 進捗報告コールバック
pub type InfoCallback = Box<dyn FnMut(&SearchReport) + Send>;

// ========== SearchWorker ==========

/// 探索スレッド1本分の状態
///
/// 共有するのは置換表・stopフラグ・合計ノード数のみで、
/// 履歴・スタック・局面は各ワーカーが私有する（Lazy SMP）。
pub struct SearchWorker {
    tt: Arc<TranspositionTable>,
    pub history: HistoryTables,
    thread_id: usize,
    time: TimeManager,
    limits: Limits,

    nodes: u64,
    flushed_nodes: u64,
    shared_nodes: Arc<AtomicU64>,
    sel_depth: i32,
    calls_cnt: i32,
    abort: bool,

    stack: Stack,
    root_moves: Vec<RootMove>,
    completed_depth: Depth,

    info: Option<InfoCallback>,
}

impl SearchWorker {
    pub fn new(
        tt: Arc<TranspositionTable>,
        thread_id: usize,
        stop: Arc<AtomicBool>,
        ponderhit: Arc<AtomicBool>,
        shared_nodes: Arc<AtomicU64>,
    ) -> Self {
        Self {
            tt,
            history: HistoryTables::new(),
            thread_id,
            time: TimeManager::new(stop, ponderhit),
            limits: Limits::new(),
            nodes: 0,
            flushed_nodes: 0,
            shared_nodes,
            sel_depth: 0,
            calls_cnt: ABORT_CHECK_INTERVAL,
            abort: false,
            stack: Stack::new(),
            root_moves: Vec::new(),
            completed_depth: 0,
            info: None,
        }
    }

    /// 進捗報告コールバックを設定（mainスレッドのみ）
    pub fn set_info_callback(&mut self, info: Option<InfoCallback>) {
        self.info = info;
    }

    #[inline]
    pub fn is_main(&self) -> bool {
        self.thread_id == 0
    }

    #[inline]
    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    /// ucinewgame相当のリセット
    pub fn clear(&mut self) {
        self.history.clear();
        self.stack.clear();
        self.root_moves.clear();
        self.completed_depth = 0;
    }

    // ========== 反復深化 ==========

    /// 探索を実行して最善手を返す
    pub fn run(&mut self, pos: &mut Position, limits: &Limits) -> SearchResult {
        self.limits = limits.clone();
        self.time.init(limits, pos.side_to_move());
        self.nodes = 0;
        self.flushed_nodes = 0;
        // 合算カウンタはmainスレッドが探索開始時にリセットする
        if self.thread_id == 0 {
            self.shared_nodes.store(0, Ordering::Relaxed);
        }
        self.sel_depth = 0;
        self.calls_cnt = ABORT_CHECK_INTERVAL;
        self.abort = false;
        self.completed_depth = 0;
        self.stack.clear();

        self.root_moves = legal_root_moves(pos);
        if self.root_moves.is_empty() {
            let value = if pos.in_check() {
                Value::mated_in(0)
            } else {
                Value::DRAW
            };
            return SearchResult {
                best_move: Move::NULL,
                ponder_move: Move::NULL,
                value,
            };
        }

        let max_depth = if self.limits.depth > 0 {
            self.limits.depth.min(MAX_PLY - 1)
        } else {
            MAX_PLY - 1
        };

        let mut last_value = Value::NONE;
        for depth in 1..=max_depth {
            for rm in &mut self.root_moves {
                rm.prev_value = rm.value;
            }

            // seldepthは反復ごとに数え直す（全ルート手の最大値を報告する）
            self.sel_depth = 0;
            let value = self.aspiration(pos, depth, last_value);
            if self.abort {
                break;
            }
            last_value = value;
            self.completed_depth = depth;

            self.sort_root_moves();
            self.report(depth, value, Bound::Exact);

            if self.time.out_of_optimum() {
                break;
            }
        }

        // ponder中・go infinite中は外部からのstopまで結果を持って待機する
        while self.is_main()
            && (self.time.is_pondering() || self.limits.infinite)
            && !self.time.stop_requested()
        {
            std::thread::sleep(std::time::Duration::from_millis(1));
        }

        let best = &self.root_moves[0];
        SearchResult {
            best_move: best.mv,
            ponder_move: best.pv.get(1).copied().unwrap_or(Move::NULL),
            value: if best.value > -Value::INFINITE {
                best.value
            } else {
                best.prev_value
            },
        }
    }

    /// aspiration windowつきで1深さぶん探索する
    ///
    /// fail-low/fail-highのたびに該当側の窓をステップ表で広げ、
    /// スコアが窓に収まるまで同じ深さを再探索する。
    fn aspiration(&mut self, pos: &mut Position, depth: Depth, prev: Value) -> Value {
        let mut lo = 0usize;
        let mut hi = 0usize;

        let full = depth < ASPIRATION_MIN_DEPTH || prev == Value::NONE;
        loop {
            let alpha = if full || lo >= ASPIRATION_STEPS.len() {
                -Value::INFINITE
            } else {
                Value::new((prev.raw() - ASPIRATION_STEPS[lo]).max(-Value::INFINITE.raw()))
            };
            let beta = if full || hi >= ASPIRATION_STEPS.len() {
                Value::INFINITE
            } else {
                Value::new((prev.raw() + ASPIRATION_STEPS[hi]).min(Value::INFINITE.raw()))
            };

            let value = self.search_root(pos, depth, alpha, beta);
            if self.abort {
                return value;
            }

            if value <= alpha {
                lo += 1;
                self.report(depth, value, Bound::Upper);
            } else if value >= beta {
                hi += 1;
                self.report(depth, value, Bound::Lower);
            } else {
                return value;
            }
        }
    }

    /// ルートノードの指し手ループ
    fn search_root(&mut self, pos: &mut Position, depth: Depth, alpha: Value, beta: Value) -> Value {
        let mut alpha = alpha;
        let mut best_value = -Value::INFINITE;
        self.stack.frame_mut(0).in_check = pos.in_check();

        for idx in 0..self.root_moves.len() {
            let mv = self.root_moves[idx].mv;

            // ルート手は合法と確認済み
            let moved = pos.do_move(mv);
            debug_assert!(moved);
            self.nodes += 1;
            self.stack.frame_mut(0).current_move = mv;

            let value = if idx == 0 {
                -self.search(pos, depth - 1, -beta, -alpha, 1, true, true)
            } else {
                let zw = -self.search(pos, depth - 1, -next_value(alpha), -alpha, 1, false, true);
                if zw > alpha && !self.abort {
                    -self.search(pos, depth - 1, -beta, -alpha, 1, true, true)
                } else {
                    zw
                }
            };
            pos.undo_move(mv);
            if self.abort {
                // 1手も読み切れていない深さの値は信用しない
                return best_value;
            }

            let rm = &mut self.root_moves[idx];
            if idx == 0 || value > alpha {
                rm.value = value;
                rm.pv.clear();
                rm.pv.push(mv);
                rm.pv.extend(self.stack.frame(1).pv.iter().copied());
            } else {
                rm.value = -Value::INFINITE;
            }

            if value > best_value {
                best_value = value;
                if value > alpha {
                    if value >= beta {
                        return best_value;
                    }
                    alpha = value;
                    // fail-highした手を先頭へ引き上げる
                    self.root_moves[..=idx].rotate_right(1);
                }
            }
        }
        best_value
    }

    // ========== ノード探索 ==========

    #[allow(clippy::too_many_arguments)]
    fn search(
        &mut self,
        pos: &mut Position,
        depth: Depth,
        alpha: Value,
        beta: Value,
        ply: i32,
        pv_node: bool,
        allow_null: bool,
    ) -> Value {
        if depth <= DEPTH_QS {
            return self.qsearch(pos, alpha, beta, ply, 0);
        }
        if self.check_abort() {
            return Value::NONE;
        }

        self.stack.frame_mut(ply).pv.clear();
        if ply >= MAX_PLY - 1 {
            return if pos.in_check() {
                Value::DRAW
            } else {
                evaluate(pos)
            };
        }

        if pos.is_draw() {
            return self.draw_value();
        }

        // mate distance pruning
        let mut alpha = alpha.max(Value::mated_in(ply));
        let beta = beta.min(Value::mate_in(ply + 1));
        if alpha >= beta {
            return alpha;
        }

        let in_check = pos.in_check();
        self.stack.frame_mut(ply).in_check = in_check;
        // 孫plyのキラーは毎回初期化する
        self.stack.frame_mut(ply + 2).killers = [Move::NULL; 2];

        // 置換表
        let key = pos.key();
        let probe = self.tt.probe(key, ply);
        let tt_move = if probe.found { probe.data.mv } else { Move::NULL };

        if !pv_node
            && probe.found
            && probe.data.depth >= depth
            && probe.data.value != Value::NONE
            && probe.data.bound.usable(probe.data.value, alpha, beta)
        {
            return probe.data.value;
        }

        // 静的評価（王手中は未定義）
        let static_eval = if in_check { None } else { Some(evaluate(pos)) };
        self.stack.frame_mut(ply).static_eval = static_eval;

        // Null Move Pruning
        if !pv_node
            && !in_check
            && allow_null
            && depth >= 3
            && static_eval.is_some_and(|v| v >= beta)
            && pos.has_non_pawn_material(pos.side_to_move())
        {
            let r = 3 + depth / 4;
            self.stack.frame_mut(ply).current_move = Move::NULL;
            pos.do_null_move();
            let value = -self.search(pos, depth - 1 - r, -beta, -next_value(beta), ply + 1, false, false);
            pos.undo_null_move();
            if self.abort {
                return Value::NONE;
            }
            if value >= beta {
                // NMP由来の詰みスコアは信用しない
                return if value >= Value::MATE_IN_MAX_PLY {
                    beta
                } else {
                    value
                };
            }
        }

        // 指し手ループ
        let killers = self.stack.frame(ply).killers;
        let counter = self.history.counter.get(pos.last_move());
        let mut picker = MovePicker::new(pos, tt_move, killers, counter);

        let mut best_value = -Value::INFINITE;
        let mut best_move = Move::NULL;
        let mut move_count = 0i32;
        let mut quiets_tried: Vec<Move> = Vec::new();

        loop {
            let mv = picker.next_move(pos, &self.history);
            if mv.is_null() {
                break;
            }

            // 浅い非PVノードでは遅い静かな手を読まない
            if !pv_node
                && !in_check
                && depth <= 4
                && best_value > Value::MATED_IN_MAX_PLY
                && move_count >= 3 + depth * depth
            {
                picker.skip_quiets();
                if mv.is_quiet() {
                    continue;
                }
            }

            if !pos.do_move(mv) {
                continue;
            }
            move_count += 1;
            self.nodes += 1;
            self.stack.frame_mut(ply).current_move = mv;

            let value = if move_count == 1 {
                -self.search(pos, depth - 1, -beta, -alpha, ply + 1, pv_node, true)
            } else {
                let zw =
                    -self.search(pos, depth - 1, -next_value(alpha), -alpha, ply + 1, false, true);
                if pv_node && zw > alpha && !self.abort {
                    -self.search(pos, depth - 1, -beta, -alpha, ply + 1, true, true)
                } else {
                    zw
                }
            };
            pos.undo_move(mv);
            if self.abort {
                return Value::NONE;
            }

            if value > best_value {
                best_value = value;
                if value > alpha {
                    best_move = mv;
                    if pv_node {
                        self.update_pv(ply, mv);
                    }
                    if value >= beta {
                        self.on_cutoff(pos, mv, depth, ply, &quiets_tried);
                        break;
                    }
                    alpha = value;
                }
            }

            if mv.is_quiet() && quiets_tried.len() < MAX_TRIED_QUIETS {
                quiets_tried.push(mv);
            }
        }

        if move_count == 0 {
            best_value = if in_check {
                Value::mated_in(ply)
            } else {
                Value::DRAW
            };
        }

        let bound = if best_value >= beta {
            Bound::Lower
        } else if pv_node && best_move.is_some() {
            Bound::Exact
        } else {
            Bound::Upper
        };
        self.tt.save(key, best_value, bound, depth, best_move, ply);

        best_value
    }

    /// 静止探索
    ///
    /// stand-patカットオフの後、捕獲手（入口付近では静かな成りも）
    /// だけを読む。王手中は回避手を全て読み、逃げ場がなければ詰み。
    fn qsearch(
        &mut self,
        pos: &mut Position,
        alpha: Value,
        beta: Value,
        ply: i32,
        qs_depth: Depth,
    ) -> Value {
        if self.check_abort() {
            return Value::NONE;
        }
        self.sel_depth = self.sel_depth.max(ply);

        if pos.is_draw() {
            return self.draw_value();
        }
        if ply >= MAX_PLY - 1 {
            return if pos.in_check() {
                Value::DRAW
            } else {
                evaluate(pos)
            };
        }

        let in_check = pos.in_check();
        let mut alpha = alpha;

        let key = pos.key();
        let probe = self.tt.probe(key, ply);
        let tt_move = if probe.found { probe.data.mv } else { Move::NULL };

        if probe.found
            && probe.data.depth >= DEPTH_QS
            && probe.data.value != Value::NONE
            && probe.data.bound.usable(probe.data.value, alpha, beta)
        {
            return probe.data.value;
        }

        let mut best_value = -Value::INFINITE;
        if !in_check {
            // stand pat
            let stand = evaluate(pos);
            if stand >= beta {
                self.tt.save(key, stand, Bound::Lower, DEPTH_QS, Move::NULL, ply);
                return stand;
            }
            if stand > alpha {
                alpha = stand;
            }
            best_value = stand;
        }

        let with_promotions = qs_depth > QS_PROMOTION_DEPTH;
        let mut picker = MovePicker::new_qsearch(pos, tt_move, with_promotions);
        let mut best_move = Move::NULL;
        let mut move_count = 0i32;

        loop {
            let mv = picker.next_move(pos, &self.history);
            if mv.is_null() {
                break;
            }

            // 負けSEEの捕獲は読まない（回避中は読む）
            if !in_check && mv.is_capture() && pos.see(mv) < Value::ZERO {
                continue;
            }

            if !pos.do_move(mv) {
                continue;
            }
            move_count += 1;
            self.nodes += 1;

            let value = -self.qsearch(pos, -beta, -alpha, ply + 1, qs_depth - 1);
            pos.undo_move(mv);
            if self.abort {
                return Value::NONE;
            }

            if value > best_value {
                best_value = value;
                if value > alpha {
                    best_move = mv;
                    if value >= beta {
                        break;
                    }
                    alpha = value;
                }
            }
        }

        if in_check && move_count == 0 {
            return Value::mated_in(ply);
        }

        let bound = if best_value >= beta {
            Bound::Lower
        } else {
            Bound::Upper
        };
        self.tt.save(key, best_value, bound, DEPTH_QS, best_move, ply);

        best_value
    }

    // ========== ヘルパー ==========

    /// betaカットオフ時のオーダリング統計の更新
    fn on_cutoff(&mut self, pos: &Position, mv: Move, depth: Depth, ply: i32, quiets_tried: &[Move]) {
        if !mv.is_quiet() {
            return;
        }

        let killers = &mut self.stack.frame_mut(ply).killers;
        if killers[0] != mv {
            killers[1] = killers[0];
            killers[0] = mv;
        }

        let us = pos.side_to_move();
        self.history.main.update(us, mv, stat_bonus(depth));
        for &quiet in quiets_tried {
            if quiet != mv {
                self.history.main.update(us, quiet, -stat_malus(depth));
            }
        }

        let prev = pos.last_move();
        if prev.is_some() {
            self.history.counter.set(prev, mv);
        }
    }

    /// 子plyのPVの先頭に自分の手をつないでこのplyのPVにする
    fn update_pv(&mut self, ply: i32, mv: Move) {
        let child: Vec<Move> = self.stack.frame(ply + 1).pv.clone();
        let frame = self.stack.frame_mut(ply);
        frame.pv.clear();
        frame.pv.push(mv);
        frame.pv.extend(child);
    }

    /// 引き分けスコア
    ///
    /// ノード数でわずかに揺らし、探索木の中で引き分け同士が
    /// 区別できるようにする。
    #[inline]
    fn draw_value(&self) -> Value {
        Value::new(1 - (self.nodes as i32 & 2))
    }

    /// 中断条件のポーリング
    ///
    /// 毎ノード時計を見ないよう、一定ノード数ごとにまとめて確認する。
    fn check_abort(&mut self) -> bool {
        if self.abort {
            return true;
        }
        self.calls_cnt -= 1;
        if self.calls_cnt > 0 {
            return false;
        }
        self.calls_cnt = ABORT_CHECK_INTERVAL;

        // 合計ノード数へ反映（ノード上限は全スレッド合算で判定）
        let delta = self.nodes - self.flushed_nodes;
        self.flushed_nodes = self.nodes;
        let total = self.shared_nodes.fetch_add(delta, Ordering::Relaxed) + delta;

        if self.time.stop_requested()
            || self.time.out_of_maximum()
            || (self.limits.nodes > 0 && total >= self.limits.nodes)
        {
            self.time.request_stop();
            self.abort = true;
        }
        self.abort
    }

    fn sort_root_moves(&mut self) {
        self.root_moves
            .sort_by(|a, b| (b.value, b.prev_value).cmp(&(a.value, a.prev_value)));
    }

    fn report(&mut self, depth: Depth, value: Value, bound: Bound) {
        if self.info.is_none() {
            return;
        }
        let delta = self.nodes - self.flushed_nodes;
        self.flushed_nodes = self.nodes;
        let total = self.shared_nodes.fetch_add(delta, Ordering::Relaxed) + delta;

        let report = SearchReport {
            depth,
            seldepth: self.sel_depth,
            value,
            bound,
            nodes: total,
            elapsed_ms: self.time.elapsed_ms(),
            hashfull: self.tt.hashfull(),
            pv: self.root_moves[0].pv.clone(),
        };
        if let Some(info) = &mut self.info {
            info(&report);
        }
    }
}

/// 窓の半開区間用に1だけ進めた値
#[inline]
fn next_value(v: Value) -> Value {
    Value::new(v.raw() + 1)
}

/// 合法なルート手を列挙する
fn legal_root_moves(pos: &mut Position) -> Vec<RootMove> {
    let mut list = MoveList::new();
    generate_all(pos, &mut list);
    let mut out = Vec::with_capacity(list.len());
    for i in 0..list.len() {
        let mv = list.at(i);
        if pos.do_move(mv) {
            pos.undo_move(mv);
            out.push(RootMove::new(mv));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::START_FEN;

    fn make_worker(mb: usize) -> SearchWorker {
        SearchWorker::new(
            Arc::new(TranspositionTable::new(mb)),
            0,
            Arc::new(AtomicBool::new(false)),
            Arc::new(AtomicBool::new(false)),
            Arc::new(AtomicU64::new(0)),
        )
    }

    fn search_depth(fen: &str, depth: Depth) -> SearchResult {
        let mut pos = Position::from_fen(fen).unwrap();
        let mut worker = make_worker(4);
        let mut limits = Limits::new();
        limits.depth = depth;
        worker.run(&mut pos, &limits)
    }

    #[test]
    fn test_startpos_returns_legal_move() {
        let result = search_depth(START_FEN, 4);
        assert!(result.best_move.is_some());
        let mut pos = Position::from_fen(START_FEN).unwrap();
        assert!(pos.is_pseudo_legal(result.best_move));
        assert!(pos.do_move(result.best_move));
    }

    #[test]
    fn test_mate_in_one_found() {
        // バックランクメイト: Ra8#
        let result = search_depth("6k1/5ppp/8/8/8/8/8/R3K3 w - - 0 1", 4);
        assert_eq!(result.best_move.to_uci(), "a1a8");
        assert_eq!(result.value, Value::mate_in(1));
    }

    #[test]
    fn test_checkmated_position_no_moves() {
        // fool's mateの終局図。白はすでに詰んでいる
        let result = search_depth(
            "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3",
            3,
        );
        assert!(result.best_move.is_null());
        assert_eq!(result.value, Value::mated_in(0));
    }

    #[test]
    fn test_stalemate_returns_draw() {
        // 黒番ステイルメイト
        let mut pos = Position::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        let mut worker = make_worker(1);
        let mut limits = Limits::new();
        limits.depth = 2;
        let result = worker.run(&mut pos, &limits);
        assert!(result.best_move.is_null());
        assert_eq!(result.value, Value::DRAW);
    }

    #[test]
    fn test_hanging_queen_is_captured() {
        // 白クイーンがd5のルークをただ取りできる
        let result = search_depth("4k3/8/8/3r4/8/8/8/3QK3 w - - 0 1", 4);
        assert_eq!(result.best_move.to_uci(), "d1d5");
    }

    #[test]
    fn test_node_limit_stops_search() {
        let mut pos = Position::from_fen(START_FEN).unwrap();
        let mut worker = make_worker(4);
        let mut limits = Limits::new();
        limits.nodes = 20_000;
        let result = worker.run(&mut pos, &limits);
        assert!(result.best_move.is_some());
        // ポーリング間隔ぶんの超過は許す
        assert!(worker.nodes() < 20_000 + 2 * ABORT_CHECK_INTERVAL as u64);
    }

    #[test]
    fn test_node_limit_counts_per_search() {
        // 同じワーカーの2回目の探索でも上限はフルに使える
        // （合算カウンタが前回の探索分を持ち越さないこと）
        let mut worker = make_worker(4);
        let mut limits = Limits::new();
        limits.nodes = 20_000;
        for _ in 0..2 {
            let mut pos = Position::from_fen(START_FEN).unwrap();
            let result = worker.run(&mut pos, &limits);
            assert!(result.best_move.is_some());
            assert!(worker.nodes() > 10_000);
            assert!(worker.nodes() < 20_000 + 2 * ABORT_CHECK_INTERVAL as u64);
        }
    }

    #[test]
    fn test_krk_corner_mate() {
        // 白 Kg6/Ra1, 黒 Kh8: Ra8#
        let result = search_depth("7k/8/6K1/8/8/8/8/R7 w - - 0 1", 6);
        assert_eq!(result.value, Value::mate_in(1));
        assert_eq!(result.best_move.to_uci(), "a1a8");
    }

    #[test]
    fn test_repetition_avoided_when_winning() {
        // 上のバックランク局面で勝ち側が千日手スコアを選ばないこと
        let result = search_depth("6k1/5ppp/8/8/8/8/8/R3K3 w - - 0 1", 6);
        assert!(result.value >= Value::MATE_IN_MAX_PLY);
    }

    #[test]
    fn test_seldepth_covers_the_pv() {
        // 各反復のseldepthは全ルート手の最大到達深さ。
        // 少なくともPVの長さ（=その反復の深さ）には届く
        use std::sync::Mutex;

        let depths: Arc<Mutex<Vec<(Depth, i32)>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&depths);
        let mut worker = make_worker(4);
        worker.set_info_callback(Some(Box::new(move |report: &SearchReport| {
            if report.bound == Bound::Exact {
                sink.lock().unwrap().push((report.depth, report.seldepth));
            }
        })));

        let mut pos = Position::from_fen(START_FEN).unwrap();
        let mut limits = Limits::new();
        limits.depth = 5;
        worker.run(&mut pos, &limits);

        let depths = depths.lock().unwrap();
        assert!(!depths.is_empty());
        for &(depth, seldepth) in depths.iter() {
            assert!(seldepth >= depth, "depth {depth} seldepth {seldepth}");
        }
    }

    #[test]
    fn test_tt_move_survives_new_search() {
        let mut pos = Position::from_fen("6k1/5ppp/8/8/8/8/8/R3K3 w - - 0 1").unwrap();
        let mut worker = make_worker(4);
        let mut limits = Limits::new();
        limits.depth = 4;
        let first = worker.run(&mut pos, &limits);
        // 同じ局面の再探索は置換表の指し手から立ち上がる
        let second = worker.run(&mut pos, &limits);
        assert_eq!(first.best_move, second.best_move);
    }
}
