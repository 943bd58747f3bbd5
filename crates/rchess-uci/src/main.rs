mod io;
mod options;
mod search;
mod state;
mod util;

use std::io::{self as stdio, BufRead};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use log::{info, warn};
use rchess_core::tt::DEFAULT_HASH_MB;

use crate::io::uci_println;
use crate::options::{apply_options, handle_setoption, send_id_and_options};
use crate::search::{
    finalize_pending_search, handle_go, handle_ponderhit, handle_stop, parse_position,
    poll_search_completion,
};
use crate::state::{EngineState, UciOptions};

/// rchessエンジンのUCIフロントエンド
#[derive(Parser)]
#[command(name = "rchess-uci", version, about = "UCI front-end for the rchess engine")]
struct Cli {
    /// 置換表サイズ（MB）
    #[arg(long, default_value_t = DEFAULT_HASH_MB)]
    hash: usize,

    /// 探索スレッド数
    #[arg(long, default_value_t = 1)]
    threads: usize,

    /// ログフィルタ（env_logger書式、RUST_LOGが優先）
    #[arg(long, default_value = "warn")]
    log: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&cli.log)).init();

    let mut state = EngineState::new(UciOptions {
        hash_mb: cli.hash,
        threads: cli.threads,
        ..UciOptions::default()
    });

    // stdinは専用スレッドで読み、メインループは探索完了のポーリングと
    // コマンド処理を数ms周期で回す。goをブロックしないための構成。
    let stdin = stdio::stdin();
    let (line_tx, line_rx) = mpsc::channel::<String>();
    thread::spawn(move || {
        for line in stdin.lock().lines() {
            match line {
                Ok(s) => {
                    if line_tx.send(s).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
    });

    loop {
        poll_search_completion(&mut state);

        let line = match line_rx.try_recv() {
            Ok(line) => line,
            Err(mpsc::TryRecvError::Empty) => {
                thread::sleep(Duration::from_millis(2));
                continue;
            }
            // stdinが閉じたらquit相当
            Err(mpsc::TryRecvError::Disconnected) => break,
        };
        let cmd = line.trim();
        if cmd.is_empty() {
            continue;
        }

        match cmd {
            "uci" => {
                send_id_and_options(&state.opts);
                uci_println("uciok");
            }
            "isready" => {
                apply_options(&mut state);
                uci_println("readyok");
            }
            "ucinewgame" => {
                if state.searching {
                    warn!("ignoring ucinewgame while searching");
                } else if let Ok(mut pool) = state.pool.lock() {
                    pool.clear();
                }
            }
            "stop" => handle_stop(&mut state),
            "ponderhit" => handle_ponderhit(&mut state),
            "quit" => break,
            _ if cmd.starts_with("setoption") => handle_setoption(cmd, &mut state),
            _ if cmd.starts_with("position") => {
                if let Err(e) = parse_position(cmd, &mut state) {
                    warn!("position: {e}");
                }
            }
            _ if cmd.starts_with("go") => handle_go(cmd, &mut state),
            _ => info!("ignoring command: {cmd}"),
        }
    }

    // 終了前に走っている探索を終わらせ、bestmoveを出してからワーカーを回収する
    finalize_pending_search(&mut state);

    Ok(())
}
