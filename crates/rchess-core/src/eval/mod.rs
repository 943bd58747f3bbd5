//! 静的評価
//!
//! マテリアル（Positionが差分更新している値）に piece-square table を
//! 加算し、フェーズカウンタ（0..=24）で序盤用と終盤用を線形補間する。
//! 評価値は常に手番側から見た centipawn。

use crate::position::Position;
use crate::types::{Color, PieceType, Square, Value};

/// フェーズの最大値（Q=4, R=2, B/N=1 の初期配置合計）
pub const PHASE_MAX: i32 = 24;

// ========== piece-square tables ==========

/// 序盤PST（白から見た値、黒はランク反転で参照する）
static PSQ_MG: [[i32; Square::NUM]; PieceType::NUM] = build_psq(false);
/// 終盤PST
static PSQ_EG: [[i32; Square::NUM]; PieceType::NUM] = build_psq(true);

/// 中央からのマンハッタン距離に基づく簡易ボーナス。
/// ポーンは前進とセンターファイル、キングは序盤のみ隅寄りを好む。
const fn psq_bonus(pt: PieceType, file: i32, rank: i32, endgame: bool) -> i32 {
    let center = 4 - ((file - 3).abs() + (rank - 3).abs());
    match pt {
        PieceType::Pawn => {
            if endgame {
                // 終盤は昇格距離が支配的
                rank * 14 - (file - 3).abs()
            } else {
                rank * 8 - (file - 3).abs() * 2
            }
        }
        PieceType::Knight => center * 6,
        PieceType::Bishop => center * 4 + rank,
        PieceType::Rook => {
            if rank == 6 {
                // 7段目のルーク
                rank * 2 + 10
            } else {
                rank * 2
            }
        }
        PieceType::Queen => center * 2,
        PieceType::King => {
            if endgame {
                // 終盤は中央化
                center * 6
            } else if rank <= 1 {
                8 - (file - 4).abs() * 2
            } else {
                -center * 4
            }
        }
    }
}

const fn build_psq(endgame: bool) -> [[i32; Square::NUM]; PieceType::NUM] {
    let mut table = [[0; Square::NUM]; PieceType::NUM];
    let mut pt = 0;
    while pt < PieceType::NUM {
        let mut sq = 0;
        while sq < Square::NUM {
            let file = (sq % 8) as i32;
            let rank = (sq / 8) as i32;
            table[pt][sq] = psq_bonus(PieceType::from_index(pt), file, rank, endgame);
            sq += 1;
        }
        pt += 1;
    }
    table
}

/// 色を考慮したPST参照（黒はランク反転）
#[inline]
fn psq(table: &[[i32; Square::NUM]; PieceType::NUM], c: Color, pt: PieceType, sq: Square) -> i32 {
    let rel = match c {
        Color::White => sq.index(),
        Color::Black => sq.index() ^ 56,
    };
    table[pt.index()][rel]
}

// ========== evaluate ==========

/// 手番側から見た静的評価値を返す
pub fn evaluate(pos: &Position) -> Value {
    let material = pos.material(Color::White).raw() - pos.material(Color::Black).raw();

    let mut mg = 0i32;
    let mut eg = 0i32;
    for c in [Color::White, Color::Black] {
        let sign = match c {
            Color::White => 1,
            Color::Black => -1,
        };
        for pt in PieceType::ALL {
            for sq in pos.pieces_cp(c, pt) {
                mg += sign * psq(&PSQ_MG, c, pt, sq);
                eg += sign * psq(&PSQ_EG, c, pt, sq);
            }
        }
    }

    let phase = pos.phase().clamp(0, PHASE_MAX);
    let positional = (mg * phase + eg * (PHASE_MAX - phase)) / PHASE_MAX;

    let white_score = material + positional;
    match pos.side_to_move() {
        Color::White => Value::new(white_score),
        Color::Black => Value::new(-white_score),
    }
}

// ========== tests ==========

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_startpos_is_symmetric() {
        let mut pos = Position::new();
        pos.set_startpos();
        assert_eq!(evaluate(&pos), Value::ZERO);
    }

    #[test]
    fn test_material_advantage_sign() {
        // 白がクイーン+
        let pos = Position::from_fen("4k3/8/8/8/8/8/8/3QK3 w - - 0 1").unwrap();
        assert!(evaluate(&pos) > Value::new(500));

        // 同じ局面を黒番で見ると符号が反転する
        let pos = Position::from_fen("4k3/8/8/8/8/8/8/3QK3 b - - 0 1").unwrap();
        assert!(evaluate(&pos) < Value::new(-500));
    }

    #[test]
    fn test_psq_black_mirror() {
        // 白ナイトをf3、黒ナイトをf6に置いた対称局面は0になる
        let pos = Position::from_fen("4k3/8/5n2/8/8/5N2/8/4K3 w - - 0 1").unwrap();
        assert_eq!(evaluate(&pos), Value::ZERO);
    }

    #[test]
    fn test_pawn_advance_bonus() {
        // 進んだポーンはPST上で初期位置のポーンより高く評価される
        let advanced = Position::from_fen("4k3/8/8/8/3P4/8/8/4K3 w - - 0 1").unwrap();
        let home = Position::from_fen("4k3/8/8/8/8/8/3P4/4K3 w - - 0 1").unwrap();
        assert!(evaluate(&advanced) > evaluate(&home));
    }

    #[test]
    fn test_king_centralized_in_endgame() {
        // 駒が残っていない終盤では中央のキングが隅より良い
        let central = Position::from_fen("4k3/8/8/8/3K4/8/8/8 w - - 0 1").unwrap();
        let corner = Position::from_fen("4k3/8/8/8/8/8/8/K7 w - - 0 1").unwrap();
        assert!(evaluate(&central) > evaluate(&corner));
    }
}
