use rchess_core::search::SearchReport;
use rchess_core::types::{Bound, Move, Value};

use crate::io::uci_println;

/// bestmove行を出力する（ponder手があれば併記）
pub fn emit_bestmove(best: Move, ponder: Move) {
    if ponder.is_some() {
        uci_println(&format!("bestmove {} ponder {}", best.to_uci(), ponder.to_uci()));
    } else {
        uci_println(&format!("bestmove {}", best.to_uci()));
    }
}

/// 評価値をUCIのscore表記へ変換する
///
/// 詰みスコア帯は `mate N`（N=fullmove数、負なら詰まされる側）、
/// それ以外は `cp N`。
pub fn score_string(value: Value) -> String {
    match value.mate_distance() {
        Some(moves) => format!("mate {moves}"),
        None => format!("cp {}", value.raw()),
    }
}

/// 反復深化の進捗報告をinfo行として整形する
pub fn format_info(report: &SearchReport) -> String {
    let mut line = format!(
        "info depth {} seldepth {} score {}",
        report.depth,
        report.seldepth,
        score_string(report.value)
    );
    match report.bound {
        Bound::Lower => line.push_str(" lowerbound"),
        Bound::Upper => line.push_str(" upperbound"),
        _ => {}
    }
    let nps = if report.elapsed_ms > 0 {
        report.nodes * 1000 / report.elapsed_ms as u64
    } else {
        0
    };
    line.push_str(&format!(
        " nodes {} nps {} time {} hashfull {}",
        report.nodes, nps, report.elapsed_ms, report.hashfull
    ));
    if !report.pv.is_empty() {
        line.push_str(" pv");
        for mv in &report.pv {
            line.push(' ');
            line.push_str(&mv.to_uci());
        }
    }
    line
}
