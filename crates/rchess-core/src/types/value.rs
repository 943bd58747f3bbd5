//! 評価値
//!
//! 詰みスコアは `MATE - ply` で符号化する。置換表に保存する際は
//! 「このノードからの詰み手数」に変換し、取り出す際に現在のplyへ
//! 読み替えることで、異なるplyでのヒットでも正しい詰み距離になる。

use super::MAX_PLY;

/// 評価値（centipawn、詰みスコア帯含む）
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Value(i32);

impl Value {
    pub const ZERO: Value = Value(0);
    pub const DRAW: Value = Value(0);

    /// 詰みスコアの基準値
    pub const MATE: Value = Value(32000);
    /// 無限大（探索窓の初期値）
    pub const INFINITE: Value = Value(32001);
    /// 未評価・中断の番兵
    pub const NONE: Value = Value(32002);

    /// これ以上なら「MAX_PLY以内に詰ます」スコア
    pub const MATE_IN_MAX_PLY: Value = Value(32000 - MAX_PLY);
    /// これ以下なら「MAX_PLY以内に詰まされる」スコア
    pub const MATED_IN_MAX_PLY: Value = Value(-32000 + MAX_PLY);

    #[inline]
    pub const fn new(raw: i32) -> Self {
        Value(raw)
    }

    #[inline]
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// plyで詰ます側のスコア
    #[inline]
    pub const fn mate_in(ply: i32) -> Value {
        Value(32000 - ply)
    }

    /// plyで詰まされる側のスコア
    #[inline]
    pub const fn mated_in(ply: i32) -> Value {
        Value(-32000 + ply)
    }

    /// 詰みスコア帯か
    #[inline]
    pub fn is_mate_score(self) -> bool {
        self >= Value::MATE_IN_MAX_PLY || self <= Value::MATED_IN_MAX_PLY
    }

    /// 詰みスコアから手数（fullmove単位、正=勝ち/負=負け）へ変換
    ///
    /// UCIの `score mate N` 表記用。
    pub fn mate_distance(self) -> Option<i32> {
        if self >= Value::MATE_IN_MAX_PLY && self <= Value::MATE {
            Some((Value::MATE.0 - self.0 + 1) / 2)
        } else if self <= Value::MATED_IN_MAX_PLY {
            Some(-(Value::MATE.0 + self.0 + 1) / 2)
        } else {
            None
        }
    }
}

impl From<i32> for Value {
    fn from(raw: i32) -> Self {
        Value(raw)
    }
}

impl std::ops::Add for Value {
    type Output = Value;
    #[inline]
    fn add(self, rhs: Value) -> Value {
        Value(self.0 + rhs.0)
    }
}

impl std::ops::Sub for Value {
    type Output = Value;
    #[inline]
    fn sub(self, rhs: Value) -> Value {
        Value(self.0 - rhs.0)
    }
}

impl std::ops::Neg for Value {
    type Output = Value;
    #[inline]
    fn neg(self) -> Value {
        Value(-self.0)
    }
}

impl std::ops::AddAssign for Value {
    #[inline]
    fn add_assign(&mut self, rhs: Value) {
        self.0 += rhs.0;
    }
}

impl std::ops::SubAssign for Value {
    #[inline]
    fn sub_assign(&mut self, rhs: Value) {
        self.0 -= rhs.0;
    }
}

/// 置換表エントリの境界種別
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Bound {
    None = 0,
    /// score <= alpha で確定（上界）
    Upper = 1,
    /// score >= beta で確定（下界）
    Lower = 2,
    /// 窓の内側で確定
    Exact = 3,
}

impl Bound {
    #[inline]
    pub const fn from_u8(v: u8) -> Self {
        match v & 3 {
            0 => Bound::None,
            1 => Bound::Upper,
            2 => Bound::Lower,
            _ => Bound::Exact,
        }
    }

    /// 保存値がこの境界で beta カットオフ／alpha 棄却に使えるか
    #[inline]
    pub fn usable(self, value: Value, alpha: Value, beta: Value) -> bool {
        match self {
            Bound::Exact => true,
            Bound::Lower => value >= beta,
            Bound::Upper => value <= alpha,
            Bound::None => false,
        }
    }
}

/// 探索スコアを置換表保存用に変換
///
/// 詰みスコアは「ルートからの距離」を「このノードからの距離」に直す。
#[inline]
pub fn value_to_tt(v: Value, ply: i32) -> Value {
    if v >= Value::MATE_IN_MAX_PLY {
        Value::new(v.raw() + ply)
    } else if v <= Value::MATED_IN_MAX_PLY {
        Value::new(v.raw() - ply)
    } else {
        v
    }
}

/// 置換表の保存値を現在のplyのスコアへ変換（`value_to_tt` の逆）
#[inline]
pub fn value_from_tt(v: Value, ply: i32) -> Value {
    if v == Value::NONE {
        v
    } else if v >= Value::MATE_IN_MAX_PLY {
        Value::new(v.raw() - ply)
    } else if v <= Value::MATED_IN_MAX_PLY {
        Value::new(v.raw() + ply)
    } else {
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mate_scores() {
        let m3 = Value::mate_in(3);
        assert!(m3.is_mate_score());
        assert!(!Value::new(100).is_mate_score());
        assert!(Value::mated_in(5).is_mate_score());
        assert!(m3 > Value::mate_in(5)); // 早い詰みが高スコア
    }

    #[test]
    fn test_mate_distance() {
        // mate_in(ply) のplyは半手。5手詰め(ply=5)は mate 3
        assert_eq!(Value::mate_in(1).mate_distance(), Some(1));
        assert_eq!(Value::mate_in(5).mate_distance(), Some(3));
        assert_eq!(Value::mated_in(4).mate_distance(), Some(-2));
        assert_eq!(Value::new(150).mate_distance(), None);
    }

    #[test]
    fn test_tt_translation_roundtrip() {
        for ply in [0, 3, 17] {
            for v in [Value::mate_in(ply + 4), Value::mated_in(ply + 6), Value::new(42)] {
                assert_eq!(value_from_tt(value_to_tt(v, ply), ply), v);
            }
        }
    }

    #[test]
    fn test_tt_translation_cross_ply() {
        // ply=4で記録したmate_in(6)を ply=2 で取り出すと mate_in(4) 相当になる
        let stored = value_to_tt(Value::mate_in(6), 4);
        assert_eq!(value_from_tt(stored, 2), Value::mate_in(4));
    }

    #[test]
    fn test_bound_usable() {
        let alpha = Value::new(-50);
        let beta = Value::new(50);
        assert!(Bound::Exact.usable(Value::ZERO, alpha, beta));
        assert!(Bound::Lower.usable(Value::new(60), alpha, beta));
        assert!(!Bound::Lower.usable(Value::new(40), alpha, beta));
        assert!(Bound::Upper.usable(Value::new(-60), alpha, beta));
        assert!(!Bound::Upper.usable(Value::new(0), alpha, beta));
    }
}
