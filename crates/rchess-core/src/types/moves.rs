//! 32bitにパックした指し手
//!
//! レイアウト:
//! ```text
//! bit  0- 5: from
//! bit  6-11: to
//! bit 12-15: MoveKind
//! bit 16-18: 動かす駒種
//! bit 19-22: 取る駒種 + 1（0 = なし）
//! bit 23-26: 成る駒種 + 1（0 = なし）
//! bit 27   : 手番（0 = White）
//! ```
//!
//! 等値判定は全ワード比較。`Move::NULL`（全bit 0、kind = Null）が
//! 「指し手なし」とNull Move Pruningのパス手を兼ねる番兵。

use super::{Color, PieceType, Square};

/// 指し手の種別（閉じた列挙）
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum MoveKind {
    /// 番兵（指し手なし／パス）
    Null = 0,
    /// 通常の駒移動
    Normal = 1,
    Capture = 2,
    Castle = 3,
    EnPassant = 4,
    /// ポーンの1マス前進
    PawnPush = 5,
    /// ポーンの2マス前進
    DoublePush = 6,
    Promotion = 7,
    PromotionCapture = 8,
}

impl MoveKind {
    #[inline]
    const fn from_u8(v: u8) -> Self {
        match v {
            0 => MoveKind::Null,
            1 => MoveKind::Normal,
            2 => MoveKind::Capture,
            3 => MoveKind::Castle,
            4 => MoveKind::EnPassant,
            5 => MoveKind::PawnPush,
            6 => MoveKind::DoublePush,
            7 => MoveKind::Promotion,
            _ => MoveKind::PromotionCapture,
        }
    }
}

/// 指し手
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Move(u32);

impl Move {
    /// 番兵（指し手なし／パス）
    pub const NULL: Move = Move(0);

    #[inline]
    pub fn new(
        side: Color,
        piece: PieceType,
        from: Square,
        to: Square,
        kind: MoveKind,
    ) -> Self {
        Move(
            from.0 as u32
                | (to.0 as u32) << 6
                | (kind as u32) << 12
                | (piece as u32) << 16
                | (side as u32) << 27,
        )
    }

    /// 取る駒を記録した指し手を返す
    #[inline]
    pub fn with_captured(self, captured: PieceType) -> Self {
        Move(self.0 | (captured as u32 + 1) << 19)
    }

    /// 成る駒を記録した指し手を返す
    #[inline]
    pub fn with_promotion(self, promotion: PieceType) -> Self {
        Move(self.0 | (promotion as u32 + 1) << 23)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Move(raw)
    }

    #[inline]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_some(self) -> bool {
        self.0 != 0
    }

    #[inline]
    pub const fn from(self) -> Square {
        Square((self.0 & 0x3f) as u8)
    }

    #[inline]
    pub const fn to(self) -> Square {
        Square(((self.0 >> 6) & 0x3f) as u8)
    }

    #[inline]
    pub const fn kind(self) -> MoveKind {
        MoveKind::from_u8(((self.0 >> 12) & 0xf) as u8)
    }

    /// 動かす駒種
    #[inline]
    pub fn piece(self) -> PieceType {
        PieceType::from_index(((self.0 >> 16) & 0x7) as usize)
    }

    /// 取る駒種（なければNone）
    #[inline]
    pub fn captured(self) -> Option<PieceType> {
        let v = (self.0 >> 19) & 0xf;
        if v == 0 {
            None
        } else {
            Some(PieceType::from_index((v - 1) as usize))
        }
    }

    /// 成る駒種（なければNone）
    #[inline]
    pub fn promotion(self) -> Option<PieceType> {
        let v = (self.0 >> 23) & 0xf;
        if v == 0 {
            None
        } else {
            Some(PieceType::from_index((v - 1) as usize))
        }
    }

    #[inline]
    pub fn side(self) -> Color {
        Color::from_index(((self.0 >> 27) & 1) as usize)
    }

    /// 駒を取る手か（アンパッサン含む）
    #[inline]
    pub fn is_capture(self) -> bool {
        matches!(
            self.kind(),
            MoveKind::Capture | MoveKind::EnPassant | MoveKind::PromotionCapture
        )
    }

    #[inline]
    pub fn is_promotion(self) -> bool {
        matches!(self.kind(), MoveKind::Promotion | MoveKind::PromotionCapture)
    }

    /// 静かな手か（駒取りでも成りでもない）
    #[inline]
    pub fn is_quiet(self) -> bool {
        !self.is_capture() && !self.is_promotion()
    }

    /// History/CounterMoveテーブル用インデックス（駒種×移動先）
    #[inline]
    pub fn piece_to_index(self) -> (usize, usize) {
        (self.piece().index(), self.to().index())
    }

    /// UCI表記（例: "e2e4", "e7e8q"）
    pub fn to_uci(self) -> String {
        if self.is_null() {
            return "0000".to_string();
        }
        match self.promotion() {
            Some(pt) => format!("{}{}{}", self.from(), self.to(), pt.to_char()),
            None => format!("{}{}", self.from(), self.to()),
        }
    }
}

impl Default for Move {
    /// 既定値は番兵（`Move::NULL`）
    #[inline]
    fn default() -> Self {
        Move::NULL
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_uci())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_unpack() {
        let mv = Move::new(
            Color::Black,
            PieceType::Knight,
            Square::from_uci("g8").unwrap(),
            Square::from_uci("f6").unwrap(),
            MoveKind::Normal,
        );
        assert_eq!(mv.side(), Color::Black);
        assert_eq!(mv.piece(), PieceType::Knight);
        assert_eq!(mv.from().to_string(), "g8");
        assert_eq!(mv.to().to_string(), "f6");
        assert_eq!(mv.kind(), MoveKind::Normal);
        assert_eq!(mv.captured(), None);
        assert_eq!(mv.promotion(), None);
        assert!(!mv.is_capture());
    }

    #[test]
    fn test_promotion_capture() {
        let mv = Move::new(
            Color::White,
            PieceType::Pawn,
            Square::from_uci("b7").unwrap(),
            Square::from_uci("a8").unwrap(),
            MoveKind::PromotionCapture,
        )
        .with_captured(PieceType::Rook)
        .with_promotion(PieceType::Queen);
        assert_eq!(mv.captured(), Some(PieceType::Rook));
        assert_eq!(mv.promotion(), Some(PieceType::Queen));
        assert!(mv.is_capture());
        assert!(mv.is_promotion());
        assert_eq!(mv.to_uci(), "b7a8q");
    }

    #[test]
    fn test_null_sentinel() {
        assert!(Move::NULL.is_null());
        assert_eq!(Move::default(), Move::NULL);
        assert_eq!(Move::NULL.kind(), MoveKind::Null);
        assert_eq!(Move::NULL.to_uci(), "0000");
        let mv = Move::new(
            Color::White,
            PieceType::Pawn,
            Square::A1,
            Square::A1,
            MoveKind::Normal,
        );
        // from==to==a1 の通常手でも番兵とは一致しない（kindビットが異なる）
        assert_ne!(mv, Move::NULL);
    }

    #[test]
    fn test_word_equality() {
        let a = Move::new(
            Color::White,
            PieceType::Rook,
            Square::A1,
            Square::H1,
            MoveKind::Normal,
        );
        let b = Move::new(
            Color::White,
            PieceType::Rook,
            Square::A1,
            Square::H1,
            MoveKind::Capture,
        );
        // 種別が違えば別の手
        assert_ne!(a, b);
        assert_eq!(a, Move::from_raw(a.raw()));
    }
}
