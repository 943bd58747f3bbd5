//! 時間管理
//!
//! 残り時間と加算から最適思考時間（soft budget）と最大思考時間
//! （hard budget）を決める。softは反復深化の1イテレーション完了時に
//! 参照し、hardは探索中のノードポーリングで参照する。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use super::limits::{Limits, TimePoint};
use crate::types::Color;

/// 通信遅延の安全マージン（ミリ秒）
const MOVE_OVERHEAD: TimePoint = 50;

/// 残り時間をこの手数で使い切る想定で配分する
const MOVES_TO_GO: TimePoint = 40;

/// 時間管理
///
/// `stop` は外部（UCI `stop`）とハード時間超過の両方から立てられる。
/// ponder中は `ponderhit` が立つまで時間超過でも停止しない。
pub struct TimeManager {
    start_time: Instant,
    optimum_time: TimePoint,
    maximum_time: TimePoint,
    use_time: bool,
    stop: Arc<AtomicBool>,
    ponderhit: Arc<AtomicBool>,
    pondering: bool,
}

impl TimeManager {
    pub fn new(stop: Arc<AtomicBool>, ponderhit: Arc<AtomicBool>) -> Self {
        Self {
            start_time: Instant::now(),
            optimum_time: TimePoint::MAX / 2,
            maximum_time: TimePoint::MAX / 2,
            use_time: false,
            stop,
            ponderhit,
            pondering: false,
        }
    }

    /// 今回の思考時間を決定する
    pub fn init(&mut self, limits: &Limits, us: Color) {
        self.start_time = Instant::now();
        self.pondering = limits.ponder;
        self.ponderhit.store(false, Ordering::Relaxed);

        if limits.movetime > 0 {
            self.use_time = true;
            self.optimum_time = (limits.movetime - MOVE_OVERHEAD).max(1);
            self.maximum_time = (limits.movetime - MOVE_OVERHEAD).max(1);
            return;
        }

        if !limits.use_time_management() {
            self.use_time = false;
            self.optimum_time = TimePoint::MAX / 2;
            self.maximum_time = TimePoint::MAX / 2;
            return;
        }

        let time_left = (limits.time_left(us) - MOVE_OVERHEAD).max(1);
        let inc = limits.increment(us);

        self.use_time = true;
        self.optimum_time = (time_left / MOVES_TO_GO + inc / 2).max(1);
        // 1手で残り時間の1/4以上は使わない
        self.maximum_time = (self.optimum_time * 6).min(time_left / 4).max(1);
    }

    #[inline]
    pub fn elapsed_ms(&self) -> TimePoint {
        self.start_time.elapsed().as_millis() as TimePoint
    }

    /// 反復深化のイテレーション完了時に呼ぶsoft判定
    #[inline]
    pub fn out_of_optimum(&self) -> bool {
        self.use_time && !self.is_pondering() && self.elapsed_ms() >= self.optimum_time
    }

    /// ノードポーリングで呼ぶhard判定
    #[inline]
    pub fn out_of_maximum(&self) -> bool {
        self.use_time && !self.is_pondering() && self.elapsed_ms() >= self.maximum_time
    }

    /// ponder中（ponderhit前）か
    #[inline]
    pub fn is_pondering(&self) -> bool {
        self.pondering && !self.ponderhit.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_manager() -> TimeManager {
        TimeManager::new(
            Arc::new(AtomicBool::new(false)),
            Arc::new(AtomicBool::new(false)),
        )
    }

    #[test]
    fn test_movetime_budget() {
        let mut tm = make_manager();
        let mut limits = Limits::new();
        limits.movetime = 1000;
        tm.init(&limits, Color::White);
        assert_eq!(tm.optimum_time, 1000 - MOVE_OVERHEAD);
        assert_eq!(tm.maximum_time, 1000 - MOVE_OVERHEAD);
    }

    #[test]
    fn test_clock_budget_bounded() {
        let mut tm = make_manager();
        let mut limits = Limits::new();
        limits.time[Color::White.index()] = 60_000;
        limits.inc[Color::White.index()] = 1_000;
        tm.init(&limits, Color::White);
        assert!(tm.optimum_time > 0);
        assert!(tm.maximum_time >= tm.optimum_time);
        assert!(tm.maximum_time <= 60_000 / 4);
    }

    #[test]
    fn test_infinite_never_times_out() {
        let mut tm = make_manager();
        let mut limits = Limits::new();
        limits.infinite = true;
        tm.init(&limits, Color::White);
        assert!(!tm.out_of_optimum());
        assert!(!tm.out_of_maximum());
    }

    #[test]
    fn test_ponder_holds_clock() {
        let ponderhit = Arc::new(AtomicBool::new(false));
        let mut tm = TimeManager::new(Arc::new(AtomicBool::new(false)), ponderhit.clone());
        let mut limits = Limits::new();
        limits.movetime = 1;
        limits.ponder = true;
        tm.init(&limits, Color::White);
        std::thread::sleep(std::time::Duration::from_millis(5));
        // ponderhit前は時間切れにならない
        assert!(!tm.out_of_maximum());
        ponderhit.store(true, Ordering::Relaxed);
        assert!(tm.out_of_maximum());
    }
}
