//! SEE（静的交換評価）
//!
//! 1マス上の取り合いを前方探索なしで解く。駒取りのオーダリングと
//! 損な駒取りの枝刈りの両方から呼ばれる。

use crate::bitboard::{
    bishop_attacks, king_attacks, knight_attacks, pawn_attacks, rook_attacks, Bitboard,
};
use crate::types::{Color, Move, MoveKind, PieceType, Square, Value};

use super::pos::Position;

impl Position {
    /// 指し手の静的交換評価（指した側から見た物質収支）
    pub fn see(&self, mv: Move) -> Value {
        let us = mv.side();
        let to = mv.to();
        let from = mv.from();

        let captured_value = match mv.kind() {
            MoveKind::EnPassant => PieceType::Pawn.value(),
            _ => mv.captured().map_or(0, |pt| pt.value()),
        };

        // 移動元を空け、アンパッサンなら取られるポーンも外す
        let mut occupied = self.occupied() ^ Bitboard::from_square(from);
        if mv.kind() == MoveKind::EnPassant {
            occupied ^= Bitboard::from_square(to.offset(-us.pawn_push()));
        }

        Value::new(captured_value - self.see_recapture(to, us.flip(), occupied, mv.piece()))
    }

    /// toの上のtarget駒をstmが取り返し続けたときにstmが得られる値
    ///
    /// 再帰のたびに最も安い攻撃駒をoccupancyから外すので、背後の
    /// スライダーのX線利きも自然に現れる。取らない自由があるため
    /// 損な取り返しは0に留まる。
    pub(crate) fn see_recapture(
        &self,
        to: Square,
        stm: Color,
        occupied: Bitboard,
        target: PieceType,
    ) -> i32 {
        match self.least_valuable_attacker(to, stm, occupied) {
            Some((from, pt)) => {
                let occ = occupied ^ Bitboard::from_square(from);
                0.max(target.value() - self.see_recapture(to, stm.flip(), occ, pt))
            }
            None => 0,
        }
    }

    /// occupancy限定で、toに利くstmの最も安い駒を探す
    fn least_valuable_attacker(
        &self,
        to: Square,
        stm: Color,
        occupied: Bitboard,
    ) -> Option<(Square, PieceType)> {
        for pt in PieceType::ALL {
            let attacks = match pt {
                PieceType::Pawn => pawn_attacks(stm.flip(), to),
                PieceType::Knight => knight_attacks(to),
                PieceType::Bishop => bishop_attacks(to, occupied),
                PieceType::Rook => rook_attacks(to, occupied),
                PieceType::Queen => {
                    rook_attacks(to, occupied) | bishop_attacks(to, occupied)
                }
                PieceType::King => king_attacks(to),
            };
            let attackers = attacks & self.pieces_cp(stm, pt) & occupied;
            if attackers.is_some() {
                return Some((attackers.lsb(), pt));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Move;

    fn capture(pos: &Position, from: &str, to: &str) -> Move {
        let from = Square::from_uci(from).unwrap();
        let to = Square::from_uci(to).unwrap();
        let pc = pos.piece_on(from);
        let captured = pos.piece_on(to);
        Move::new(pc.color(), pc.piece_type(), from, to, MoveKind::Capture)
            .with_captured(captured.piece_type())
    }

    #[test]
    fn test_see_free_capture() {
        // 取り返しのないポーン取り
        let pos = Position::from_fen("1k6/8/8/3p4/4P3/8/8/1K6 w - - 0 1").unwrap();
        let mv = capture(&pos, "e4", "d5");
        assert_eq!(pos.see(mv), Value::new(100));
    }

    #[test]
    fn test_see_defended_pawn() {
        // c7のポーンが守るd6のポーンをナイトで取ると 100 - 320
        let pos = Position::from_fen("1k6/2p5/3p4/8/4N3/8/8/1K6 w - - 0 1").unwrap();
        let mv = capture(&pos, "e4", "d6");
        assert_eq!(pos.see(mv), Value::new(100 - 320));
    }

    #[test]
    fn test_see_xray() {
        // d8ルークの後ろにd7...ではなくX線: 白ルーク2枚 vs 黒ルーク1枚のd5ポーン争い
        // Rxd5, rxd5, Rxd5 で白が 100 - 500 + 500 = 100 得
        let pos = Position::from_fen("1k1r4/8/8/3p4/8/8/3R4/1K1R4 w - - 0 1").unwrap();
        let mv = capture(&pos, "d2", "d5");
        assert_eq!(pos.see(mv), Value::new(100));
    }

    #[test]
    fn test_see_identity() {
        // see(mv) == 取った駒の価値 - 相手の取り返し列の値
        let pos = Position::from_fen("1k1r4/8/8/3p4/8/8/3R4/1K1R4 w - - 0 1").unwrap();
        let mv = capture(&pos, "d2", "d5");
        let occupied = pos.occupied() ^ Bitboard::from_square(mv.from());
        let recapture =
            pos.see_recapture(mv.to(), Color::Black, occupied, PieceType::Rook);
        assert_eq!(
            pos.see(mv),
            Value::new(PieceType::Pawn.value() - recapture)
        );
    }

    #[test]
    fn test_see_king_cannot_win_defended_pawn() {
        // c4のポーンが守るb3を玉で取ると、玉の駒価値が番兵として働き大きく損になる
        let pos = Position::from_fen("1k6/8/8/8/2p5/1p6/2K5/8 w - - 0 1").unwrap();
        let mv = capture(&pos, "c2", "b3");
        assert_eq!(pos.see(mv), Value::new(100 - PieceType::King.value()));
    }
}
