use rchess_core::search::MAX_THREADS;

use crate::io::{info_string, uci_println};
use crate::state::{EngineState, UciOptions};

/// Hashオプションの上限（MB）
const MAX_HASH_MB: usize = 1_048_576;

/// `uci`コマンドへの応答（id行とオプション一覧）
pub fn send_id_and_options(opts: &UciOptions) {
    uci_println(&format!("id name rchess {}", env!("CARGO_PKG_VERSION")));
    uci_println("id author rchess developers");

    uci_println(&format!(
        "option name Hash type spin default {} min 1 max {}",
        opts.hash_mb, MAX_HASH_MB
    ));
    uci_println(&format!(
        "option name Threads type spin default {} min 1 max {}",
        opts.threads, MAX_THREADS
    ));
    uci_println(&format!("option name Ponder type check default {}", opts.ponder));
    uci_println("option name Clear Hash type button");
}

/// setoption行を解析して設定値を更新する
///
/// 実エンジンへの反映（置換表の確保やワーカーの作り直し）は
/// isready時に`apply_options`が行う。未知のオプション名は無視。
pub fn handle_setoption(cmd: &str, state: &mut EngineState) {
    let body = cmd.strip_prefix("setoption").unwrap_or("").trim();
    let Some(after_name) = body.strip_prefix("name") else {
        log::warn!("malformed setoption: {cmd}");
        return;
    };
    let after_name = after_name.trim_start();

    let (name, value) = match after_name.find(" value ") {
        Some(pos) => (after_name[..pos].trim(), Some(after_name[pos + 7..].trim())),
        None => (after_name.trim(), None),
    };

    match name {
        "Hash" => {
            if let Some(mb) = value.and_then(|v| v.parse::<usize>().ok()) {
                state.opts.hash_mb = mb.clamp(1, MAX_HASH_MB);
            } else {
                log::warn!("setoption Hash: invalid value {value:?}");
            }
        }
        "Threads" => {
            if let Some(t) = value.and_then(|v| v.parse::<usize>().ok()) {
                state.opts.threads = t.clamp(1, MAX_THREADS);
            } else {
                log::warn!("setoption Threads: invalid value {value:?}");
            }
        }
        "Ponder" => {
            if let Some(v) = value {
                state.opts.ponder = v.eq_ignore_ascii_case("true");
            }
        }
        "Clear Hash" => {
            state.pending_clear = true;
        }
        _ => {
            log::info!("ignoring unknown option: {name}");
        }
    }
}

/// 保持している設定と実エンジンの差分を反映する（isready時）
///
/// 探索中は何もしない。探索終了後の次のisreadyで反映される。
pub fn apply_options(state: &mut EngineState) {
    if state.searching {
        return;
    }
    let Ok(mut pool) = state.pool.lock() else {
        return;
    };
    if state.opts.hash_mb != state.applied.hash_mb {
        pool.set_hash(state.opts.hash_mb);
        info_string(format!("hash_resized mb={}", state.opts.hash_mb));
    }
    if state.opts.threads != state.applied.threads {
        pool.set_num_threads(state.opts.threads);
        info_string(format!("threads_set n={}", state.opts.threads));
    }
    if state.pending_clear {
        pool.clear();
        state.pending_clear = false;
    }
    state.applied = state.opts;
}
