use std::io::{self, Write};

/// UCIプロトコルに沿って標準出力へ行を出力するヘルパ。
pub fn uci_println(s: &str) {
    println!("{s}");
    let _ = io::stdout().flush();
}

/// `info string ...` の出力ユーティリティ。
pub fn info_string<S: AsRef<str>>(s: S) {
    uci_println(&format!("info string {}", s.as_ref()));
}
