//! 指し手生成器

use crate::bitboard::{attacks_bb, between_bb, king_attacks, pawn_attacks, Bitboard, RANK_2, RANK_3, RANK_6, RANK_7};
use crate::position::{Position, CASTLE_BK, CASTLE_BQ, CASTLE_WK, CASTLE_WQ};
use crate::types::{Color, Move, MoveKind, PieceType, Square};

use super::movelist::MoveList;

/// 成り先の駒種（オーダリング前の生成順）
const PROMOTION_TYPES: [PieceType; 4] = [
    PieceType::Queen,
    PieceType::Knight,
    PieceType::Rook,
    PieceType::Bishop,
];

/// 玉以外の移動駒種
const NON_KING_TYPES: [PieceType; 4] = [
    PieceType::Knight,
    PieceType::Bishop,
    PieceType::Rook,
    PieceType::Queen,
];

/// 成りを控えたポーンのいる段
fn rank7_bb(us: Color) -> Bitboard {
    match us {
        Color::White => RANK_7,
        Color::Black => RANK_2,
    }
}

/// 初期段から1歩進んだポーンのいる段（ダブルプッシュ判定用）
fn rank3_bb(us: Color) -> Bitboard {
    match us {
        Color::White => RANK_3,
        Color::Black => RANK_6,
    }
}

fn push_bb(us: Color, bb: Bitboard) -> Bitboard {
    match us {
        Color::White => bb.north(),
        Color::Black => bb.south(),
    }
}

// ========== カテゴリ別の内部生成 ==========

/// ポーンの駒取り（成り捕獲・アンパッサン含む）
///
/// targetは取ってよい敵駒の升集合。王手回避時は王手駒のみに絞られる。
fn gen_pawn_captures(pos: &Position, us: Color, target: Bitboard, list: &mut MoveList) {
    let them = us.flip();
    let pawns = pos.pieces_cp(us, PieceType::Pawn);
    let on7 = pawns & rank7_bb(us);
    let not7 = pawns.and_not(rank7_bb(us));
    let enemy = pos.pieces_c(them) & target;

    let dirs: [(Bitboard, Bitboard, i32); 2] = match us {
        Color::White => [
            (not7.north_east(), on7.north_east(), 9),
            (not7.north_west(), on7.north_west(), 7),
        ],
        Color::Black => [
            (not7.south_east(), on7.south_east(), -7),
            (not7.south_west(), on7.south_west(), -9),
        ],
    };

    for (plain, promo, delta) in dirs {
        for to in plain & enemy {
            let from = to.offset(-delta);
            list.push(
                Move::new(us, PieceType::Pawn, from, to, MoveKind::Capture)
                    .with_captured(pos.piece_on(to).piece_type()),
            );
        }
        for to in promo & enemy {
            let from = to.offset(-delta);
            let captured = pos.piece_on(to).piece_type();
            for pt in PROMOTION_TYPES {
                list.push(
                    Move::new(us, PieceType::Pawn, from, to, MoveKind::PromotionCapture)
                        .with_captured(captured)
                        .with_promotion(pt),
                );
            }
        }
    }

    // アンパッサン（取られるポーンの升がtargetに入っているときのみ）
    if let Some(ep) = pos.ep_square() {
        let cap_sq = ep.offset(-us.pawn_push());
        if target.contains(cap_sq) {
            for from in pawn_attacks(them, ep) & not7 {
                list.push(Move::new(us, PieceType::Pawn, from, ep, MoveKind::EnPassant));
            }
        }
    }
}

/// ポーンの静かな前進（成りは含まない）
fn gen_pawn_quiets(pos: &Position, us: Color, target: Bitboard, list: &mut MoveList) {
    let empty = !pos.occupied();
    let pawns = pos.pieces_cp(us, PieceType::Pawn).and_not(rank7_bb(us));
    let push = us.pawn_push();

    let single = push_bb(us, pawns) & empty;
    let double = push_bb(us, single & rank3_bb(us)) & empty;

    for to in single & target {
        list.push(Move::new(
            us,
            PieceType::Pawn,
            to.offset(-push),
            to,
            MoveKind::PawnPush,
        ));
    }
    for to in double & target {
        list.push(Move::new(
            us,
            PieceType::Pawn,
            to.offset(-2 * push),
            to,
            MoveKind::DoublePush,
        ));
    }
}

/// 静かな成り（7段目のポーンの前進）
fn gen_promotions(pos: &Position, us: Color, target: Bitboard, list: &mut MoveList) {
    let empty = !pos.occupied();
    let pawns = pos.pieces_cp(us, PieceType::Pawn) & rank7_bb(us);
    let push = us.pawn_push();

    for to in push_bb(us, pawns) & empty & target {
        let from = to.offset(-push);
        for pt in PROMOTION_TYPES {
            list.push(
                Move::new(us, PieceType::Pawn, from, to, MoveKind::Promotion)
                    .with_promotion(pt),
            );
        }
    }
}

/// 駒種リストの移動（targetが敵駒ならCapture、空升ならNormal）
fn gen_piece_moves(
    pos: &Position,
    us: Color,
    piece_types: &[PieceType],
    target: Bitboard,
    list: &mut MoveList,
) {
    let occ = pos.occupied();
    let enemy = pos.pieces_c(us.flip());
    for &pt in piece_types {
        for from in pos.pieces_cp(us, pt) {
            for to in attacks_bb(pt, from, occ) & target {
                if enemy.contains(to) {
                    list.push(
                        Move::new(us, pt, from, to, MoveKind::Capture)
                            .with_captured(pos.piece_on(to).piece_type()),
                    );
                } else {
                    list.push(Move::new(us, pt, from, to, MoveKind::Normal));
                }
            }
        }
    }
}

/// キャスリング（権利と経路の空きのみ判定、利きの検査はdo_moveが行う）
fn gen_castles(pos: &Position, us: Color, list: &mut MoveList) {
    let occ = pos.occupied();
    let rights = pos.castling_rights();
    let (ksq, entries): (Square, [(u8, Square, Square); 2]) = match us {
        Color::White => (
            Square::E1,
            [
                (CASTLE_WK, Square::G1, Square::H1),
                (CASTLE_WQ, Square::C1, Square::A1),
            ],
        ),
        Color::Black => (
            Square::E8,
            [
                (CASTLE_BK, Square::G8, Square::H8),
                (CASTLE_BQ, Square::C8, Square::A8),
            ],
        ),
    };
    for (right, kto, rfrom) in entries {
        if rights & right != 0 && (between_bb(ksq, rfrom) & occ).is_empty() {
            list.push(Move::new(us, PieceType::King, ksq, kto, MoveKind::Castle));
        }
    }
}

// ========== 公開API ==========

/// 駒取り（成り捕獲・アンパッサン含む）を生成
pub fn generate_captures(pos: &Position, list: &mut MoveList) {
    let us = pos.side_to_move();
    let enemy = pos.pieces_c(us.flip());
    gen_pawn_captures(pos, us, Bitboard::ALL, list);
    gen_piece_moves(pos, us, &NON_KING_TYPES, enemy, list);
    gen_piece_moves(pos, us, &[PieceType::King], enemy, list);
}

/// 静かな成りを生成
pub fn generate_promotions(pos: &Position, list: &mut MoveList) {
    let us = pos.side_to_move();
    gen_promotions(pos, us, Bitboard::ALL, list);
}

/// 静かな手（前進・駒移動・キャスリング、成りは含まない）を生成
pub fn generate_quiets(pos: &Position, list: &mut MoveList) {
    let us = pos.side_to_move();
    let empty = !pos.occupied();
    gen_pawn_quiets(pos, us, Bitboard::ALL, list);
    gen_piece_moves(pos, us, &NON_KING_TYPES, empty, list);
    gen_piece_moves(pos, us, &[PieceType::King], empty, list);
    gen_castles(pos, us, list);
}

/// 王手回避手を生成
///
/// 玉の移動は「玉を外したoccupancy」で敵利きを判定して絞る
/// （スライダーの王手の裏側へ下がる手を弾くため）。両王手では
/// 玉の移動のみ、単独王手では王手駒を取る手と合駒も生成する。
pub fn generate_evasions(pos: &Position, list: &mut MoveList) {
    let us = pos.side_to_move();
    let them = us.flip();
    let ksq = pos.king_square(us);
    let checkers = pos.checkers();
    debug_assert!(checkers.is_some());

    let occ_wo_king = pos.occupied() ^ Bitboard::from_square(ksq);
    for to in king_attacks(ksq).and_not(pos.pieces_c(us)) {
        if (pos.attackers_to(to, occ_wo_king) & pos.pieces_c(them)).is_some() {
            continue;
        }
        let occupant = pos.piece_on(to);
        if occupant.is_some() {
            list.push(
                Move::new(us, PieceType::King, ksq, to, MoveKind::Capture)
                    .with_captured(occupant.piece_type()),
            );
        } else {
            list.push(Move::new(us, PieceType::King, ksq, to, MoveKind::Normal));
        }
    }

    if checkers.more_than_one() {
        return;
    }

    let checker = checkers.lsb();
    let block = between_bb(ksq, checker);

    gen_pawn_captures(pos, us, checkers, list);
    gen_piece_moves(pos, us, &NON_KING_TYPES, checkers, list);
    gen_pawn_quiets(pos, us, block, list);
    gen_promotions(pos, us, block, list);
    gen_piece_moves(pos, us, &NON_KING_TYPES, block, list);
}

/// 全疑似合法手を生成（王手中は回避手のみ）
pub fn generate_all(pos: &Position, list: &mut MoveList) {
    if pos.in_check() {
        generate_evasions(pos, list);
    } else {
        generate_captures(pos, list);
        generate_promotions(pos, list);
        generate_quiets(pos, list);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::START_FEN;

    fn legal_count(pos: &mut Position, list: &MoveList) -> usize {
        let mut n = 0;
        for i in 0..list.len() {
            let mv = list.at(i);
            if pos.do_move(mv) {
                pos.undo_move(mv);
                n += 1;
            }
        }
        n
    }

    #[test]
    fn test_startpos_moves() {
        let mut pos = Position::from_fen(START_FEN).unwrap();
        let mut list = MoveList::new();
        generate_all(&pos, &mut list);
        assert_eq!(list.len(), 20);
        assert_eq!(legal_count(&mut pos, &list), 20);
    }

    #[test]
    fn test_evasions_match_filtered_full_generation() {
        // 王手局面で、回避専用経路と全生成+合法性フィルタが同じ合法手集合になる
        let fens = [
            "rnbqkbnr/ppp2ppp/8/1B1pp3/4P3/8/PPPP1PPP/RNBQK1NR b KQkq - 0 1", // ビショップ王手
            "4k3/8/8/8/8/4r3/8/4K3 w - - 0 1",                                // ルーク王手
            "rnb1kbnr/pppp1ppp/8/4p3/5PPq/8/PPPPP2P/RNBQKBNR w KQkq - 1 3",  // クイーン王手
            "4k3/8/8/8/8/5n2/8/4KR2 w - - 0 1", // ナイト王手
        ];
        for fen in fens {
            let mut pos = Position::from_fen(fen).unwrap();
            assert!(pos.in_check(), "{fen}");

            let mut evasions = MoveList::new();
            generate_evasions(&pos, &mut evasions);

            let mut full = MoveList::new();
            generate_captures(&pos, &mut full);
            generate_promotions(&pos, &mut full);
            generate_quiets(&pos, &mut full);

            let legal_evasions: Vec<_> =
                evasions.iter().filter(|&m| pos.do_move(m) && { pos.undo_move(m); true }).collect();
            let legal_full: Vec<_> =
                full.iter().filter(|&m| pos.do_move(m) && { pos.undo_move(m); true }).collect();

            let mut a = legal_evasions.clone();
            let mut b = legal_full.clone();
            a.sort_by_key(|m| m.raw());
            b.sort_by_key(|m| m.raw());
            assert_eq!(a, b, "evasion set mismatch for {fen}");
        }
    }

    #[test]
    fn test_double_check_king_moves_only() {
        // e3ルークとc2ナイトの二重王手: 回避は玉の移動のみ
        let pos = Position::from_fen("4k3/8/8/8/8/4r3/2n5/4K3 w - - 0 1").unwrap();
        assert_eq!(pos.checkers().count(), 2);
        let mut list = MoveList::new();
        generate_evasions(&pos, &mut list);
        assert!(!list.is_empty());
        for mv in list.iter() {
            assert_eq!(mv.piece(), PieceType::King);
        }
    }

    #[test]
    fn test_ep_evasion() {
        // 黒のd7d5直後、d5のポーンが白玉に王手 → c5ポーンのEP取りが回避手に含まれる
        let pos =
            Position::from_fen("4k3/8/8/2Pp4/4K3/8/8/8 w - d6 0 1").unwrap();
        assert!(pos.in_check());
        let mut list = MoveList::new();
        generate_evasions(&pos, &mut list);
        let ep = list
            .iter()
            .find(|m| m.kind() == MoveKind::EnPassant);
        assert!(ep.is_some(), "en passant evasion should be generated");
    }

    #[test]
    fn test_castle_generation() {
        let pos = Position::from_fen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        )
        .unwrap();
        let mut list = MoveList::new();
        generate_quiets(&pos, &mut list);
        let castles: Vec<_> = list.iter().filter(|m| m.kind() == MoveKind::Castle).collect();
        assert_eq!(castles.len(), 2);
    }
}
