use std::sync::atomic::AtomicBool;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;

use rchess_core::position::Position;
use rchess_core::search::{SearchResult, ThreadPool, MAX_THREADS};
use rchess_core::tt::{TranspositionTable, DEFAULT_HASH_MB};

/// setoptionで受け付けるエンジン設定
///
/// 値は受信時に保持だけして、isreadyのタイミングでエンジンへ反映する。
/// 探索中のsetoptionが置換表の付け替えと衝突しないようにするため。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UciOptions {
    pub hash_mb: usize,
    pub threads: usize,
    pub ponder: bool,
}

impl Default for UciOptions {
    fn default() -> Self {
        Self {
            hash_mb: DEFAULT_HASH_MB,
            threads: 1,
            ponder: false,
        }
    }
}

/// UCIフロントエンドの全状態
///
/// 探索はワーカースレッドがThreadPoolのロックを握って実行し、
/// 完了結果をチャネルで返す。メインループはロックを取らずに
/// stop/ponderhitフラグ経由で探索へ介入する。
pub struct EngineState {
    pub pool: Arc<Mutex<ThreadPool>>,
    pub stop: Arc<AtomicBool>,
    pub ponderhit: Arc<AtomicBool>,

    pub position: Position,
    pub pos_from_startpos: bool,
    pub pos_fen: Option<String>,
    pub pos_moves: Vec<String>,

    pub opts: UciOptions,
    /// 最後にエンジンへ反映した設定（差分検出用）
    pub applied: UciOptions,
    pub pending_clear: bool,

    pub searching: bool,
    pub pondering: bool,
    /// stop要求済みフラグ
    ///
    /// pool.search側が探索開始時にstopフラグをリセットするため、
    /// 極端に早いstopが消される可能性がある。ポーリングのたびに
    /// 立て直すことでこの競合を閉じる。
    pub stop_pending: bool,
    /// 現在の探索がdepth/nodes/movetimeで自然終了するか
    pub self_terminating: bool,
    pub result_rx: Option<mpsc::Receiver<SearchResult>>,
    pub worker: Option<thread::JoinHandle<()>>,
}

impl EngineState {
    pub fn new(opts: UciOptions) -> Self {
        let tt = Arc::new(TranspositionTable::new(opts.hash_mb));
        let pool = ThreadPool::new(tt, opts.threads.clamp(1, MAX_THREADS));
        let stop = pool.stop_flag();
        let ponderhit = pool.ponderhit_flag();
        let mut position = Position::new();
        position.set_startpos();
        Self {
            pool: Arc::new(Mutex::new(pool)),
            stop,
            ponderhit,
            position,
            pos_from_startpos: true,
            pos_fen: None,
            pos_moves: Vec::new(),
            applied: opts,
            opts,
            pending_clear: false,
            searching: false,
            pondering: false,
            stop_pending: false,
            self_terminating: false,
            result_rx: None,
            worker: None,
        }
    }
}
