use std::sync::atomic::Ordering;
use std::sync::mpsc;
use std::thread;

use anyhow::{anyhow, Result};
use rchess_core::movegen::{generate_all, MoveList};
use rchess_core::position::Position;
use rchess_core::search::{InfoCallback, Limits};
use rchess_core::types::{Color, Move};

use crate::io::uci_println;
use crate::state::EngineState;
use crate::util::{emit_bestmove, format_info};

/// `position [startpos | fen <FEN>] [moves <m1> <m2> ...]` を解析して局面を設定する
pub fn parse_position(cmd: &str, state: &mut EngineState) -> Result<()> {
    let mut tokens = cmd.split_whitespace().skip(1).peekable();
    let mut from_startpos = true;
    let mut fen: Option<String> = None;
    let mut moves: Vec<String> = Vec::new();

    while let Some(tok) = tokens.next() {
        match tok {
            "startpos" => {
                from_startpos = true;
                fen = None;
            }
            "fen" => {
                let mut parts: Vec<&str> = Vec::new();
                while let Some(t) = tokens.peek() {
                    if *t == "moves" {
                        break;
                    }
                    parts.push(tokens.next().unwrap_or(""));
                }
                if parts.is_empty() {
                    return Err(anyhow!("empty FEN in position command"));
                }
                from_startpos = false;
                fen = Some(parts.join(" "));
            }
            "moves" => {
                moves.extend(tokens.by_ref().map(str::to_string));
            }
            _ => {}
        }
    }

    let mut pos = Position::new();
    match &fen {
        Some(f) => pos.set_fen(f).map_err(|e| anyhow!("bad FEN {f:?}: {e}"))?,
        None => pos.set_startpos(),
    }
    for mstr in &moves {
        let mv = find_move(&pos, mstr).ok_or_else(|| anyhow!("unknown move {mstr}"))?;
        if !pos.do_move(mv) {
            return Err(anyhow!("illegal move {mstr}"));
        }
    }

    state.position = pos;
    state.pos_from_startpos = from_startpos;
    state.pos_fen = fen;
    state.pos_moves = moves;
    Ok(())
}

/// UCI表記の指し手を現局面の生成手から探す
fn find_move(pos: &Position, uci: &str) -> Option<Move> {
    let mut list = MoveList::new();
    generate_all(pos, &mut list);
    let found = list.iter().find(|m| m.to_uci() == uci);
    found
}

/// goコマンドの引数をLimitsへ変換する
pub fn parse_go(cmd: &str) -> Limits {
    let mut limits = Limits::new();
    let mut it = cmd.split_whitespace().skip(1);
    while let Some(tok) = it.next() {
        match tok {
            "wtime" => limits.time[Color::White.index()] = next_num(&mut it),
            "btime" => limits.time[Color::Black.index()] = next_num(&mut it),
            "winc" => limits.inc[Color::White.index()] = next_num(&mut it),
            "binc" => limits.inc[Color::Black.index()] = next_num(&mut it),
            "movetime" => limits.movetime = next_num(&mut it),
            "depth" => limits.depth = next_num(&mut it) as i32,
            "nodes" => limits.nodes = next_num(&mut it) as u64,
            "infinite" => limits.infinite = true,
            "ponder" => limits.ponder = true,
            // movestogoは固定horizonの時間管理では使わない
            "movestogo" | "mate" => {
                let _ = it.next();
            }
            _ => {}
        }
    }
    // 制限が何も指定されないgoはstopが来るまでの無限探索として扱う
    if limits.use_time_management() && limits.time == [0; 2] {
        limits.infinite = true;
    }
    limits
}

fn next_num<'a>(it: &mut impl Iterator<Item = &'a str>) -> i64 {
    it.next().and_then(|v| v.parse().ok()).unwrap_or(0)
}

/// goコマンドの処理
///
/// ThreadPoolのロックを握ったままpool.searchを回すワーカースレッドを
/// 起こし、結果はチャネル経由で受け取る。stop/ponderhitはフラグ経由で
/// 届くので、メインループがロック待ちになることはない。
pub fn handle_go(cmd: &str, state: &mut EngineState) {
    if state.searching {
        log::info!("ignoring go while searching");
        return;
    }

    let mut limits = parse_go(cmd);
    if limits.ponder && !state.opts.ponder {
        limits.ponder = false;
    }

    let pondering = limits.ponder;
    let self_terminating =
        !pondering && (limits.depth > 0 || limits.nodes > 0 || limits.movetime > 0);

    let pos = state.position.clone();
    let pool = std::sync::Arc::clone(&state.pool);
    let (tx, rx) = mpsc::channel();

    let info: InfoCallback = Box::new(|report| {
        uci_println(&format_info(report));
    });

    let handle = thread::spawn(move || {
        let result = match pool.lock() {
            Ok(mut pool) => pool.search(&pos, &limits, Some(info)),
            Err(poisoned) => poisoned.into_inner().search(&pos, &limits, Some(info)),
        };
        let _ = tx.send(result);
    });

    state.searching = true;
    state.pondering = pondering;
    state.self_terminating = self_terminating;
    state.result_rx = Some(rx);
    state.worker = Some(handle);
}

/// 探索の完了を検査し、終わっていればbestmoveを出力する
pub fn poll_search_completion(state: &mut EngineState) {
    if !state.searching {
        return;
    }
    if state.stop_pending {
        state.stop.store(true, Ordering::Relaxed);
    }
    let Some(rx) = &state.result_rx else {
        return;
    };

    match rx.try_recv() {
        Ok(result) => {
            state.searching = false;
            state.pondering = false;
            state.stop_pending = false;
            state.result_rx = None;
            if let Some(handle) = state.worker.take() {
                let _ = handle.join();
            }
            emit_bestmove(result.best_move, result.ponder_move);
        }
        Err(mpsc::TryRecvError::Empty) => {}
        Err(mpsc::TryRecvError::Disconnected) => {
            // ワーカーがpanicした場合の退避路。合法手を一つ返す。
            log::error!("search thread exited without a result");
            state.searching = false;
            state.pondering = false;
            state.stop_pending = false;
            state.result_rx = None;
            if let Some(handle) = state.worker.take() {
                let _ = handle.join();
            }
            emit_bestmove(fallback_move(&mut state.position.clone()), Move::NULL);
        }
    }
}

/// 探索結果なしで返すときの合法手（なければnull move）
fn fallback_move(pos: &mut Position) -> Move {
    let mut list = MoveList::new();
    generate_all(pos, &mut list);
    for mv in list.iter() {
        if pos.do_move(mv) {
            pos.undo_move(mv);
            return mv;
        }
    }
    Move::NULL
}

/// stopコマンド: 探索の停止を要求してbestmoveを待つ
pub fn handle_stop(state: &mut EngineState) {
    if !state.searching {
        return;
    }
    // ponder中のstopも通常のstopと同じく即時最終化
    state.stop_pending = true;
    state.stop.store(true, Ordering::Relaxed);
}

/// quit時の後始末: 走っている探索を止め、結果を回収してbestmoveを出す
pub fn finalize_pending_search(state: &mut EngineState) {
    if !state.searching {
        return;
    }
    let Some(rx) = state.result_rx.take() else {
        return;
    };
    // depth/nodes/movetime指定の探索は自然終了を待ち、開放型の探索は
    // stopで止める。探索開始直後のリセットと競合しないよう、結果が
    // 届くまでstopを立て直しながら待つ。
    loop {
        if !state.self_terminating || state.stop_pending {
            state.stop.store(true, Ordering::Relaxed);
        }
        match rx.recv_timeout(std::time::Duration::from_millis(10)) {
            Ok(result) => {
                emit_bestmove(result.best_move, result.ponder_move);
                break;
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }
    state.searching = false;
    state.pondering = false;
    state.stop_pending = false;
    if let Some(handle) = state.worker.take() {
        let _ = handle.join();
    }
}

/// ponderhitコマンド: 予想手が的中、時計を通常モードへ切り替える
pub fn handle_ponderhit(state: &mut EngineState) {
    if !state.searching || !state.pondering {
        return;
    }
    state.pondering = false;
    state.ponderhit.store(true, Ordering::Relaxed);
}
