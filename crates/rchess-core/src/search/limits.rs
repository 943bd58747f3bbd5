//! 探索制限
//!
//! UCI `go` コマンドのパラメータを表現する。

use crate::types::Color;

/// 時間（ミリ秒）
pub type TimePoint = i64;

/// 探索制限条件
#[derive(Clone, Debug)]
pub struct Limits {
    /// 両者の残り時間（ミリ秒）
    pub time: [TimePoint; Color::NUM],
    /// 1手ごとの加算時間（ミリ秒）
    pub inc: [TimePoint; Color::NUM],
    /// 思考時間固定（ミリ秒、0以外なら有効）
    pub movetime: TimePoint,
    /// 探索深さ固定（0以外なら有効）
    pub depth: i32,
    /// 探索ノード数制限（0以外なら有効）
    pub nodes: u64,
    /// 思考時間無制限フラグ
    pub infinite: bool,
    /// ponder有効フラグ
    pub ponder: bool,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            time: [0; Color::NUM],
            inc: [0; Color::NUM],
            movetime: 0,
            depth: 0,
            nodes: 0,
            infinite: false,
            ponder: false,
        }
    }
}

impl Limits {
    pub fn new() -> Self {
        Self::default()
    }

    /// 持ち時間ベースの時間制御を行うか
    ///
    /// movetime / depth / nodes / infinite のいずれかが指定されて
    /// いれば時間制御は行わない。
    #[inline]
    pub fn use_time_management(&self) -> bool {
        self.movetime == 0 && self.depth == 0 && self.nodes == 0 && !self.infinite
    }

    #[inline]
    pub fn time_left(&self, us: Color) -> TimePoint {
        self.time[us.index()]
    }

    #[inline]
    pub fn increment(&self, us: Color) -> TimePoint {
        self.inc[us.index()]
    }
}
