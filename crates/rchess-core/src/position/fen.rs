//! FEN形式の解析・出力

use crate::bitboard::pawn_attacks;
use crate::types::{Color, File, Piece, PieceType, Rank, Square};

use super::pos::{Position, CASTLE_BK, CASTLE_BQ, CASTLE_WK, CASTLE_WQ};

/// 初期局面のFEN
pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// FEN解析エラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FenError {
    /// 盤面の形式が不正
    Board(String),
    /// 手番の形式が不正
    SideToMove(String),
    /// キャスリング権の形式が不正
    Castling(String),
    /// アンパッサン升の形式が不正
    EnPassant(String),
    /// 手数の形式が不正
    Clock(String),
}

impl std::fmt::Display for FenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FenError::Board(s) => write!(f, "Invalid board: {s}"),
            FenError::SideToMove(s) => write!(f, "Invalid side to move: {s}"),
            FenError::Castling(s) => write!(f, "Invalid castling rights: {s}"),
            FenError::EnPassant(s) => write!(f, "Invalid en passant square: {s}"),
            FenError::Clock(s) => write!(f, "Invalid move clock: {s}"),
        }
    }
}

impl std::error::Error for FenError {}

impl Position {
    /// 初期局面を設定
    pub fn set_startpos(&mut self) {
        self.set_fen(START_FEN).unwrap();
    }

    /// FEN文字列から局面を生成
    pub fn from_fen(fen: &str) -> Result<Position, FenError> {
        let mut pos = Position::new();
        pos.set_fen(fen)?;
        Ok(pos)
    }

    /// FEN文字列から局面を設定
    pub fn set_fen(&mut self, fen: &str) -> Result<(), FenError> {
        *self = Position::new();
        let mut parts = fen.split_whitespace();

        // 盤面（rank 8から）
        let board = parts
            .next()
            .ok_or_else(|| FenError::Board(fen.to_string()))?;
        let mut rank = 7i32;
        let mut file = 0i32;
        for c in board.chars() {
            match c {
                '/' => {
                    if file != 8 || rank == 0 {
                        return Err(FenError::Board(board.to_string()));
                    }
                    rank -= 1;
                    file = 0;
                }
                '1'..='8' => {
                    file += c as i32 - '0' as i32;
                    if file > 8 {
                        return Err(FenError::Board(board.to_string()));
                    }
                }
                _ => {
                    let pc = Piece::from_char(c)
                        .ok_or_else(|| FenError::Board(board.to_string()))?;
                    if file > 7 {
                        return Err(FenError::Board(board.to_string()));
                    }
                    self.put_piece(pc, Square::new(File(file as u8), Rank(rank as u8)));
                    file += 1;
                }
            }
        }
        if rank != 0 || file != 8 {
            return Err(FenError::Board(board.to_string()));
        }
        // 玉は両軍1枚ずつ（king_squareキャッシュの前提）
        for c in [Color::White, Color::Black] {
            if self.pieces_cp(c, PieceType::King).count() != 1 {
                return Err(FenError::Board(board.to_string()));
            }
        }

        // 手番
        let side = parts
            .next()
            .ok_or_else(|| FenError::SideToMove(fen.to_string()))?;
        self.side_to_move = match side {
            "w" => Color::White,
            "b" => Color::Black,
            _ => return Err(FenError::SideToMove(side.to_string())),
        };

        // キャスリング権
        let castling = parts
            .next()
            .ok_or_else(|| FenError::Castling(fen.to_string()))?;
        let mut rights = 0u8;
        if castling != "-" {
            for c in castling.chars() {
                rights |= match c {
                    'K' => CASTLE_WK,
                    'Q' => CASTLE_WQ,
                    'k' => CASTLE_BK,
                    'q' => CASTLE_BQ,
                    _ => return Err(FenError::Castling(castling.to_string())),
                };
            }
        }
        self.state.castling = rights;

        // アンパッサン升（取れる形のときだけ検証済みとして扱う）
        let ep = parts
            .next()
            .ok_or_else(|| FenError::EnPassant(fen.to_string()))?;
        if ep != "-" {
            let sq = Square::from_uci(ep)
                .ok_or_else(|| FenError::EnPassant(ep.to_string()))?;
            let us = self.side_to_move;
            let them = us.flip();
            // 白番ならrank6、黒番ならrank3にしか現れない
            if sq.rank() != Rank::R3.relative(them) {
                return Err(FenError::EnPassant(ep.to_string()));
            }
            self.state.ep_raw = Some(sq);
            if (pawn_attacks(them, sq) & self.pieces_cp(us, PieceType::Pawn)).is_some() {
                self.state.ep_valid = Some(sq);
            }
        }

        // 手数（省略可）
        if let Some(halfmove) = parts.next() {
            self.state.rule50 = halfmove
                .parse()
                .map_err(|_| FenError::Clock(halfmove.to_string()))?;
        }
        if let Some(fullmove) = parts.next() {
            self.state.game_ply = fullmove
                .parse()
                .map_err(|_| FenError::Clock(fullmove.to_string()))?;
        }

        self.state.key = self.compute_key();
        self.state.checkers = self.attackers_to(
            self.king_square(self.side_to_move),
            self.occupied(),
        ) & self.pieces_c(self.side_to_move.flip());
        Ok(())
    }

    /// 現局面のFEN文字列を返す
    pub fn fen(&self) -> String {
        let mut out = String::new();

        for rank in (0..8u8).rev() {
            let mut empty = 0;
            for file in 0..8u8 {
                let pc = self.piece_on(Square::new(File(file), Rank(rank)));
                if pc.is_none() {
                    empty += 1;
                } else {
                    if empty > 0 {
                        out.push((b'0' + empty) as char);
                        empty = 0;
                    }
                    out.push(pc.to_char());
                }
            }
            if empty > 0 {
                out.push((b'0' + empty) as char);
            }
            if rank > 0 {
                out.push('/');
            }
        }

        out.push(' ');
        out.push_str(&self.side_to_move().to_string());

        out.push(' ');
        let rights = self.castling_rights();
        if rights == 0 {
            out.push('-');
        } else {
            for (bit, c) in [
                (CASTLE_WK, 'K'),
                (CASTLE_WQ, 'Q'),
                (CASTLE_BK, 'k'),
                (CASTLE_BQ, 'q'),
            ] {
                if rights & bit != 0 {
                    out.push(c);
                }
            }
        }

        out.push(' ');
        match self.state.ep_raw {
            Some(sq) => out.push_str(&sq.to_string()),
            None => out.push('-'),
        }

        out.push_str(&format!(" {} {}", self.rule50(), self.game_ply()));
        out
    }
}
