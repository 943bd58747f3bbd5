//! 探索
//!
//! 反復深化 + aspiration window + PVS の探索本体（[`alpha_beta`]）、
//! 段階的オーダリング（[`movepick`]）、history/killer/counter統計
//! （[`history`]）、時間管理（[`time_manager`]）、Lazy SMPの
//! スレッド管理（[`threads`]）からなる。

pub mod alpha_beta;
pub mod history;
pub mod limits;
pub mod movepick;
pub mod threads;
pub mod time_manager;

pub use alpha_beta::{InfoCallback, SearchReport, SearchResult, SearchWorker};
pub use history::{stat_bonus, stat_malus, HistoryTables, MainHistory};
pub use limits::{Limits, TimePoint};
pub use movepick::MovePicker;
pub use threads::{ThreadPool, MAX_THREADS};
pub use time_manager::TimeManager;
