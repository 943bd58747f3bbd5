use assert_cmd::Command;

fn run_script(script: &str) -> String {
    let mut cmd = Command::cargo_bin("rchess-uci").expect("binary available");
    let output = cmd.write_stdin(script).assert().success().get_output().stdout.clone();
    String::from_utf8_lossy(&output).into_owned()
}

#[test]
fn handshake_reports_id_and_options() {
    let text = run_script("uci\nisready\nquit\n");

    assert!(text.contains("id name rchess"), "id name missing: {text}");
    assert!(text.contains("id author"), "id author missing: {text}");
    assert!(text.contains("option name Hash type spin"), "Hash option missing: {text}");
    assert!(text.contains("option name Threads type spin"), "Threads option missing: {text}");
    assert!(text.contains("uciok"), "uciok missing: {text}");
    assert!(text.contains("readyok"), "readyok missing: {text}");
}

#[test]
fn go_depth_emits_info_and_single_bestmove() {
    let text = run_script("uci\nisready\nposition startpos\ngo depth 4\nquit\n");

    assert!(text.contains("info depth"), "info line missing: {text}");
    assert!(text.contains(" pv "), "pv missing from info: {text}");
    let bestmove_count = text.match_indices("bestmove").count();
    assert_eq!(bestmove_count, 1, "bestmove emitted {bestmove_count} times: {text}");
}

#[test]
fn threads_hash_movetime_stop_finalize_once() {
    let script = "uci\n\
                  setoption name Threads value 2\n\
                  setoption name Hash value 32\n\
                  isready\n\
                  position startpos moves e2e4 e7e5\n\
                  go movetime 200\n\
                  stop\n\
                  quit\n";
    let text = run_script(script);

    let bestmove_count = text.match_indices("bestmove").count();
    assert_eq!(bestmove_count, 1, "bestmove emitted {bestmove_count} times: {text}");
}

#[test]
fn mate_position_reports_mate_score() {
    let script = "uci\nisready\n\
                  position fen 6k1/5ppp/8/8/8/8/8/R3K3 w - - 0 1\n\
                  go depth 5\n\
                  quit\n";
    let text = run_script(script);

    assert!(text.contains("score mate 1"), "mate score missing: {text}");
    assert!(text.contains("bestmove a1a8"), "mating move missing: {text}");
}

#[test]
fn malformed_input_does_not_crash() {
    let script = "uci\n\
                  position fen not a real fen\n\
                  setoption garbage\n\
                  go depth 2\n\
                  flibbertigibbet\n\
                  quit\n";
    let text = run_script(script);

    // 不正なpositionは無視され、直前の局面（初期局面）で探索する
    let bestmove_count = text.match_indices("bestmove").count();
    assert_eq!(bestmove_count, 1, "bestmove emitted {bestmove_count} times: {text}");
}
