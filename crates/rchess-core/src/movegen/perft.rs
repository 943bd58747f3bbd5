//! perft（既知局面のノード数による生成器の回帰検証）

use crate::position::Position;

use super::generator::generate_all;
use super::movelist::MoveList;

/// 指定深さまでの合法手ノード数を数える
pub fn perft(pos: &mut Position, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    let mut list = MoveList::new();
    generate_all(pos, &mut list);
    let mut nodes = 0;
    for i in 0..list.len() {
        let mv = list.at(i);
        if pos.do_move(mv) {
            nodes += if depth == 1 { 1 } else { perft(pos, depth - 1) };
            pos.undo_move(mv);
        }
    }
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::START_FEN;

    fn assert_perft(fen: &str, expected: &[u64]) {
        let mut pos = Position::from_fen(fen).unwrap();
        for (i, &nodes) in expected.iter().enumerate() {
            let depth = i as u32 + 1;
            assert_eq!(perft(&mut pos, depth), nodes, "{fen} depth {depth}");
            // 全展開後に局面が完全に復元されていること
            assert_eq!(pos.fen(), fen);
            assert_eq!(pos.key(), pos.compute_key());
        }
    }

    #[test]
    fn test_perft_startpos() {
        assert_perft(START_FEN, &[20, 400, 8_902, 197_281]);
    }

    #[test]
    fn test_perft_kiwipete() {
        // キャスリング・EP・成りが混在する定番の検証局面
        assert_perft(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            &[48, 2_039, 97_862],
        );
    }

    #[test]
    fn test_perft_ep_pins() {
        // EPと絶対ピンが絡む局面（CPW position 3）
        assert_perft("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1", &[14, 191, 2_812, 43_238]);
    }

    #[test]
    fn test_perft_promotions() {
        // 成り・成り捕獲が多い局面（CPW position 4）
        assert_perft(
            "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
            &[6, 264, 9_467],
        );
    }

    #[test]
    fn test_perft_position5() {
        assert_perft(
            "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
            &[44, 1_486, 62_379],
        );
    }
}
