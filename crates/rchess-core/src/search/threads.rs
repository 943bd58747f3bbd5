//! Lazy SMP
//!
//! 各スレッドは局面のクローンと私有の履歴・スタックを持ち、
//! 共有するのは置換表とstopフラグだけ。ヘルパースレッドは時間管理を
//! 行わず、mainスレッドが立てるstopフラグに従って停止する。
//! 報告と最終結果はmainスレッドのものだけが有効。

use std::sync::atomic::{AtomicBool, AtomicU64};
use std::sync::Arc;

use super::alpha_beta::{InfoCallback, SearchResult, SearchWorker};
use super::limits::Limits;
use crate::position::Position;
use crate::tt::TranspositionTable;

/// スレッド数の上限
pub const MAX_THREADS: usize = 256;

/// 探索スレッド群
pub struct ThreadPool {
    tt: Arc<TranspositionTable>,
    stop: Arc<AtomicBool>,
    ponderhit: Arc<AtomicBool>,
    nodes: Arc<AtomicU64>,
    num_threads: usize,
    workers: Vec<SearchWorker>,
}

impl ThreadPool {
    pub fn new(tt: Arc<TranspositionTable>, num_threads: usize) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let ponderhit = Arc::new(AtomicBool::new(false));
        let mut pool = Self {
            tt,
            stop,
            ponderhit,
            nodes: Arc::new(AtomicU64::new(0)),
            num_threads: num_threads.clamp(1, MAX_THREADS),
            workers: Vec::new(),
        };
        pool.rebuild();
        pool
    }

    /// スレッド数を変更する（setoption Threads）
    pub fn set_num_threads(&mut self, num_threads: usize) {
        self.num_threads = num_threads.clamp(1, MAX_THREADS);
        self.rebuild();
    }

    /// 置換表のサイズを変更する（setoption Hash）
    ///
    /// ワーカーが古い表へのArcを保持しているため、置き換えて作り直す。
    pub fn set_hash(&mut self, mb_size: usize) {
        self.tt = Arc::new(TranspositionTable::new(mb_size));
        self.rebuild();
    }

    fn rebuild(&mut self) {
        log::debug!("thread pool rebuilt: {} workers", self.num_threads);
        self.workers = (0..self.num_threads)
            .map(|id| {
                SearchWorker::new(
                    Arc::clone(&self.tt),
                    id,
                    Arc::clone(&self.stop),
                    Arc::clone(&self.ponderhit),
                    Arc::clone(&self.nodes),
                )
            })
            .collect();
    }

    #[inline]
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    #[inline]
    pub fn ponderhit_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.ponderhit)
    }

    /// ucinewgame相当のリセット（置換表と各ワーカーの履歴を消す）
    pub fn clear(&mut self) {
        self.tt.clear();
        for worker in &mut self.workers {
            worker.clear();
        }
    }

    /// 探索を実行して最善手を返す（完了までブロック）
    ///
    /// mainワーカーは呼び出しスレッドで走り、ヘルパーはスコープ付き
    /// スレッドで並走する。mainが返ったらstopを立てて全員を止める。
    pub fn search(
        &mut self,
        pos: &Position,
        limits: &Limits,
        info: Option<InfoCallback>,
    ) -> SearchResult {
        use std::sync::atomic::Ordering;

        self.stop.store(false, Ordering::Relaxed);
        self.ponderhit.store(false, Ordering::Relaxed);
        // 合算ノード数は探索ごとにリセットする（ノード上限とinfoの基準）
        self.nodes.store(0, Ordering::Relaxed);
        self.tt.new_search();

        // ヘルパーは時間管理もノード上限も持たず、stopフラグ専従で走る
        let mut helper_limits = limits.clone();
        helper_limits.infinite = true;
        helper_limits.ponder = false;
        helper_limits.movetime = 0;
        helper_limits.time = [0; 2];
        helper_limits.nodes = 0;

        let stop = Arc::clone(&self.stop);
        let (main, helpers) = self.workers.split_first_mut().expect("at least one worker");
        main.set_info_callback(info);

        let result = std::thread::scope(|scope| {
            for helper in helpers.iter_mut() {
                let mut helper_pos = pos.clone();
                let helper_limits = helper_limits.clone();
                scope.spawn(move || {
                    helper.run(&mut helper_pos, &helper_limits);
                });
            }

            let mut main_pos = pos.clone();
            let result = main.run(&mut main_pos, limits);
            stop.store(true, Ordering::Relaxed);
            result
        });

        result
    }
}
