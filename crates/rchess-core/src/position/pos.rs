//! 局面（Position）

use crate::bitboard::{
    attacks_bb, bishop_attacks, king_attacks, knight_attacks, pawn_attacks, rook_attacks,
    Bitboard,
};
use crate::types::{Color, File, Move, MoveKind, Piece, PieceType, Rank, Square, Value};

use super::state::StateInfo;
use super::zobrist::{zobrist_castling, zobrist_ep, zobrist_psq, zobrist_side};

// ========== キャスリング権 ==========

/// 白キングサイド
pub const CASTLE_WK: u8 = 1;
/// 白クイーンサイド
pub const CASTLE_WQ: u8 = 2;
/// 黒キングサイド
pub const CASTLE_BK: u8 = 4;
/// 黒クイーンサイド
pub const CASTLE_BQ: u8 = 8;

/// 升→残すキャスリング権のマスク
///
/// from/toがこの升に触れた手の後、`rights &= MASK[from] & MASK[to]` で権利を落とす。
const CASTLING_MASK: [u8; Square::NUM] = castling_masks();

const fn castling_masks() -> [u8; Square::NUM] {
    let mut m = [0xfu8; Square::NUM];
    m[Square::A1.index()] = 0xf ^ CASTLE_WQ;
    m[Square::E1.index()] = 0xf ^ (CASTLE_WK | CASTLE_WQ);
    m[Square::H1.index()] = 0xf ^ CASTLE_WK;
    m[Square::A8.index()] = 0xf ^ CASTLE_BQ;
    m[Square::E8.index()] = 0xf ^ (CASTLE_BK | CASTLE_BQ);
    m[Square::H8.index()] = 0xf ^ CASTLE_BK;
    m
}

/// キャスリング時のルークの移動元・移動先（玉の移動先から導出）
fn rook_castle_squares(king_to: Square) -> (Square, Square) {
    if king_to.file() == File(6) {
        (
            Square::new(File(7), king_to.rank()),
            Square::new(File(5), king_to.rank()),
        )
    } else {
        (
            Square::new(File(0), king_to.rank()),
            Square::new(File(3), king_to.rank()),
        )
    }
}

/// チェスの局面
#[derive(Clone)]
pub struct Position {
    // === 盤面 ===
    /// 各マスの駒 [Square]
    pub(super) board: [Piece; Square::NUM],
    /// 駒種別Bitboard [PieceType]
    pub(super) by_type: [Bitboard; PieceType::NUM],
    /// 先後別Bitboard
    pub(super) by_color: [Bitboard; Color::NUM],

    // === 状態 ===
    /// 現在の状態（Zobristキー・キャスリング権・EP・王手情報）
    pub(super) state: StateInfo,
    /// 過去状態のスタック（undo・千日手判定用）
    pub(super) history: Vec<StateInfo>,
    /// 手番
    pub(super) side_to_move: Color,
    /// 玉の位置 [Color]
    pub(super) king_square: [Square; Color::NUM],
    /// 玉を除くマテリアル合計 [Color]
    pub(super) material: [Value; Color::NUM],
    /// ゲームフェーズ（全駒で24、終盤に向かって減る）
    pub(super) phase: i32,
}

impl Position {
    // ========== 局面設定 ==========

    /// 空の局面を生成
    pub fn new() -> Self {
        Position {
            board: [Piece::NONE; Square::NUM],
            by_type: [Bitboard::EMPTY; PieceType::NUM],
            by_color: [Bitboard::EMPTY; Color::NUM],
            state: StateInfo::new(),
            history: Vec::new(),
            side_to_move: Color::White,
            king_square: [Square::E1; Color::NUM],
            material: [Value::ZERO; Color::NUM],
            phase: 0,
        }
    }

    // ========== 盤面アクセス ==========

    /// 指定マスの駒を取得
    #[inline]
    pub fn piece_on(&self, sq: Square) -> Piece {
        self.board[sq.index()]
    }

    /// 全駒のBitboard（占有）
    #[inline]
    pub fn occupied(&self) -> Bitboard {
        self.by_color[Color::White.index()] | self.by_color[Color::Black.index()]
    }

    /// 指定駒種のBitboard（両軍）
    #[inline]
    pub fn pieces_pt(&self, pt: PieceType) -> Bitboard {
        self.by_type[pt.index()]
    }

    /// 指定手番の駒のBitboard
    #[inline]
    pub fn pieces_c(&self, c: Color) -> Bitboard {
        self.by_color[c.index()]
    }

    /// 指定手番・駒種のBitboard
    #[inline]
    pub fn pieces_cp(&self, c: Color, pt: PieceType) -> Bitboard {
        self.by_color[c.index()] & self.by_type[pt.index()]
    }

    /// 手番
    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    /// 玉の位置
    #[inline]
    pub fn king_square(&self, c: Color) -> Square {
        self.king_square[c.index()]
    }

    /// Zobristキー
    #[inline]
    pub fn key(&self) -> u64 {
        self.state.key
    }

    /// キャスリング権（4bitマスク）
    #[inline]
    pub fn castling_rights(&self) -> u8 {
        self.state.castling
    }

    /// 検証済みアンパッサン升（敵ポーンが取れる場合のみSome）
    #[inline]
    pub fn ep_square(&self) -> Option<Square> {
        self.state.ep_valid
    }

    /// 50手ルールカウンタ
    #[inline]
    pub fn rule50(&self) -> i32 {
        self.state.rule50
    }

    /// ゲーム開始からの手数（fullmove number）
    #[inline]
    pub fn game_ply(&self) -> u16 {
        self.state.game_ply
    }

    /// 手番側の玉に王手している駒
    #[inline]
    pub fn checkers(&self) -> Bitboard {
        self.state.checkers
    }

    /// 手番側が王手されているか
    #[inline]
    pub fn in_check(&self) -> bool {
        self.state.checkers.is_some()
    }

    /// 玉を除くマテリアル合計
    #[inline]
    pub fn material(&self, c: Color) -> Value {
        self.material[c.index()]
    }

    /// ゲームフェーズ（0〜24）
    #[inline]
    pub fn phase(&self) -> i32 {
        self.phase
    }

    /// ポーンと玉以外の駒が残っているか（null move pruningのガード）
    #[inline]
    pub fn has_non_pawn_material(&self, c: Color) -> bool {
        (self.pieces_c(c)
            .and_not(self.pieces_pt(PieceType::Pawn))
            .and_not(self.pieces_pt(PieceType::King)))
        .is_some()
    }

    /// 直前に指された手
    #[inline]
    pub fn last_move(&self) -> Move {
        self.state.last_move
    }

    // ========== 利き ==========

    /// 指定升に利きのある駒（両軍、occupancy指定）
    pub fn attackers_to(&self, sq: Square, occupied: Bitboard) -> Bitboard {
        (pawn_attacks(Color::White, sq) & self.pieces_cp(Color::Black, PieceType::Pawn))
            | (pawn_attacks(Color::Black, sq) & self.pieces_cp(Color::White, PieceType::Pawn))
            | (knight_attacks(sq) & self.pieces_pt(PieceType::Knight))
            | (king_attacks(sq) & self.pieces_pt(PieceType::King))
            | (rook_attacks(sq, occupied)
                & (self.pieces_pt(PieceType::Rook) | self.pieces_pt(PieceType::Queen)))
            | (bishop_attacks(sq, occupied)
                & (self.pieces_pt(PieceType::Bishop) | self.pieces_pt(PieceType::Queen)))
    }

    /// 指定手番が指定升に利きを持つか
    #[inline]
    pub fn attacked_by(&self, c: Color, sq: Square) -> bool {
        (self.attackers_to(sq, self.occupied()) & self.pieces_c(c)).is_some()
    }

    // ========== 盤面更新 ==========

    /// 駒を置く（Bitboard・キー・マテリアル・フェーズを同時に更新）
    pub(super) fn put_piece(&mut self, pc: Piece, sq: Square) {
        debug_assert!(self.board[sq.index()].is_none());
        let bb = Bitboard::from_square(sq);
        self.board[sq.index()] = pc;
        self.by_type[pc.piece_type().index()] |= bb;
        self.by_color[pc.color().index()] |= bb;
        if pc.piece_type() == PieceType::King {
            self.king_square[pc.color().index()] = sq;
        } else {
            self.material[pc.color().index()] += Value::new(pc.piece_type().value());
        }
        self.phase += pc.piece_type().phase();
        self.state.key ^= zobrist_psq(pc, sq);
    }

    /// 駒を取り除く
    pub(super) fn remove_piece(&mut self, sq: Square) {
        let pc = self.board[sq.index()];
        debug_assert!(pc.is_some());
        let bb = Bitboard::from_square(sq);
        self.board[sq.index()] = Piece::NONE;
        self.by_type[pc.piece_type().index()] ^= bb;
        self.by_color[pc.color().index()] ^= bb;
        if pc.piece_type() != PieceType::King {
            self.material[pc.color().index()] -= Value::new(pc.piece_type().value());
        }
        self.phase -= pc.piece_type().phase();
        self.state.key ^= zobrist_psq(pc, sq);
    }

    /// 駒を移動する（移動元は空になる、移動先は空であること）
    fn move_piece(&mut self, from: Square, to: Square) {
        let pc = self.board[from.index()];
        debug_assert!(pc.is_some() && self.board[to.index()].is_none());
        let bb = Bitboard::from_square(from) | Bitboard::from_square(to);
        self.board[from.index()] = Piece::NONE;
        self.board[to.index()] = pc;
        self.by_type[pc.piece_type().index()] ^= bb;
        self.by_color[pc.color().index()] ^= bb;
        if pc.piece_type() == PieceType::King {
            self.king_square[pc.color().index()] = to;
        }
        self.state.key ^= zobrist_psq(pc, from) ^ zobrist_psq(pc, to);
    }

    // ========== 手の実行と巻き戻し ==========

    /// 手を実行する
    ///
    /// 疑似合法手を受け取り、自玉が取られる手（およびキャスリングで
    /// 玉の始点・通過升に敵の利きがある手）は巻き戻してfalseを返す。
    pub fn do_move(&mut self, mv: Move) -> bool {
        debug_assert!(mv.is_some());
        let us = self.side_to_move;
        let them = us.flip();
        let from = mv.from();
        let to = mv.to();

        // キャスリングの始点・通過升への利きは盤面を変える前に検査できる
        if mv.kind() == MoveKind::Castle {
            let transit = Square((from.0 + to.0) / 2);
            if self.attacked_by(them, from) || self.attacked_by(them, transit) {
                return false;
            }
        }

        self.history.push(self.state);
        let st = &mut self.state;
        st.last_move = mv;
        st.captured = Piece::NONE;
        st.rule50 += 1;
        st.plies_from_null += 1;
        if let Some(ep) = st.ep_valid {
            st.key ^= zobrist_ep(ep.file());
        }
        st.ep_raw = None;
        st.ep_valid = None;
        st.key ^= zobrist_side();

        match mv.kind() {
            MoveKind::Normal | MoveKind::PawnPush => {
                self.move_piece(from, to);
            }
            MoveKind::DoublePush => {
                self.move_piece(from, to);
                let ep = from.offset(us.pawn_push());
                self.state.ep_raw = Some(ep);
                // 敵ポーンが取れる形のときだけハッシュに混ぜる
                if (pawn_attacks(us, ep) & self.pieces_cp(them, PieceType::Pawn)).is_some() {
                    self.state.ep_valid = Some(ep);
                    self.state.key ^= zobrist_ep(ep.file());
                }
            }
            MoveKind::Capture => {
                self.state.captured = self.board[to.index()];
                self.remove_piece(to);
                self.move_piece(from, to);
                self.state.rule50 = 0;
            }
            MoveKind::EnPassant => {
                let cap_sq = to.offset(-us.pawn_push());
                self.state.captured = self.board[cap_sq.index()];
                self.remove_piece(cap_sq);
                self.move_piece(from, to);
                self.state.rule50 = 0;
            }
            MoveKind::Castle => {
                self.move_piece(from, to);
                let (rfrom, rto) = rook_castle_squares(to);
                self.move_piece(rfrom, rto);
            }
            MoveKind::Promotion => {
                self.remove_piece(from);
                if let Some(promo) = mv.promotion() {
                    self.put_piece(Piece::new(us, promo), to);
                }
                self.state.rule50 = 0;
            }
            MoveKind::PromotionCapture => {
                self.state.captured = self.board[to.index()];
                self.remove_piece(to);
                self.remove_piece(from);
                if let Some(promo) = mv.promotion() {
                    self.put_piece(Piece::new(us, promo), to);
                }
                self.state.rule50 = 0;
            }
            MoveKind::Null => {
                debug_assert!(false, "null move must use do_null_move");
            }
        }

        if mv.piece() == PieceType::Pawn {
            self.state.rule50 = 0;
        }

        // キャスリング権の更新（升→マスクの静的テーブル）
        let old_castling = self.state.castling;
        let new_castling =
            old_castling & CASTLING_MASK[from.index()] & CASTLING_MASK[to.index()];
        if new_castling != old_castling {
            self.state.key ^= zobrist_castling(old_castling) ^ zobrist_castling(new_castling);
            self.state.castling = new_castling;
        }

        self.side_to_move = them;
        if us == Color::Black {
            self.state.game_ply += 1;
        }

        // 自玉が取られる手は違法
        if self.attacked_by(them, self.king_square[us.index()]) {
            self.undo_move(mv);
            return false;
        }

        self.state.checkers =
            self.attackers_to(self.king_square[them.index()], self.occupied())
                & self.pieces_c(us);
        true
    }

    /// 手を巻き戻す
    pub fn undo_move(&mut self, mv: Move) {
        let us = self.side_to_move.flip();
        let from = mv.from();
        let to = mv.to();
        let captured = self.state.captured;

        // 駒配置を逆再生する（キーはスタックから丸ごと復元されるため気にしない）
        match mv.kind() {
            MoveKind::Normal | MoveKind::PawnPush | MoveKind::DoublePush => {
                self.move_piece(to, from);
            }
            MoveKind::Capture => {
                self.move_piece(to, from);
                self.put_piece(captured, to);
            }
            MoveKind::EnPassant => {
                self.move_piece(to, from);
                self.put_piece(captured, to.offset(-us.pawn_push()));
            }
            MoveKind::Castle => {
                let (rfrom, rto) = rook_castle_squares(to);
                self.move_piece(rto, rfrom);
                self.move_piece(to, from);
            }
            MoveKind::Promotion => {
                self.remove_piece(to);
                self.put_piece(Piece::new(us, PieceType::Pawn), from);
            }
            MoveKind::PromotionCapture => {
                self.remove_piece(to);
                self.put_piece(captured, to);
                self.put_piece(Piece::new(us, PieceType::Pawn), from);
            }
            MoveKind::Null => {}
        }

        self.side_to_move = us;
        if let Some(prev) = self.history.pop() {
            self.state = prev;
        }
    }

    /// null move（パス）を実行する
    ///
    /// 王手されていない局面でのみ呼べる。
    pub fn do_null_move(&mut self) {
        debug_assert!(!self.in_check());
        self.history.push(self.state);
        let st = &mut self.state;
        if let Some(ep) = st.ep_valid {
            st.key ^= zobrist_ep(ep.file());
        }
        st.ep_raw = None;
        st.ep_valid = None;
        st.key ^= zobrist_side();
        st.rule50 += 1;
        st.plies_from_null = 0;
        st.last_move = Move::NULL;
        st.captured = Piece::NONE;
        st.checkers = Bitboard::EMPTY;
        self.side_to_move = self.side_to_move.flip();
    }

    /// null moveを巻き戻す
    pub fn undo_null_move(&mut self) {
        self.side_to_move = self.side_to_move.flip();
        if let Some(prev) = self.history.pop() {
            self.state = prev;
        }
    }

    // ========== 判定 ==========

    /// 千日手（同一局面の再出現）か
    ///
    /// 同一局面は偶数手差にのみ現れるため、スタックを2手刻みで遡る。
    /// 遡り幅は50手カウンタとnull moveからの手数で打ち切る。
    pub fn is_repetition(&self) -> bool {
        let end = self.state.rule50.min(self.state.plies_from_null);
        let len = self.history.len() as i32;
        let mut d = 4;
        while d <= end && len - d >= 0 {
            if self.history[(len - d) as usize].key == self.state.key {
                return true;
            }
            d += 2;
        }
        false
    }

    /// 引き分け（千日手または50手ルール）か
    pub fn is_draw(&self) -> bool {
        self.state.rule50 >= 100 || self.is_repetition()
    }

    /// 指し手が現局面で疑似合法か
    ///
    /// 置換表から取り出した手を信用する前の再検証に使う。パス経路の空きや
    /// 駒の不一致を弾くだけで、自玉が素抜かれるかはdo_moveが判定する。
    pub fn is_pseudo_legal(&self, mv: Move) -> bool {
        if mv.is_null() {
            return false;
        }
        let us = self.side_to_move;
        let them = us.flip();
        if mv.side() != us {
            return false;
        }
        let from = mv.from();
        let to = mv.to();
        let pc = self.board[from.index()];
        if pc.is_none() || pc.color() != us || pc.piece_type() != mv.piece() {
            return false;
        }
        let pt = pc.piece_type();
        let occ = self.occupied();

        match mv.kind() {
            MoveKind::Null => false,
            MoveKind::Normal => {
                pt != PieceType::Pawn
                    && self.board[to.index()].is_none()
                    && attacks_bb(pt, from, occ).contains(to)
            }
            MoveKind::Capture => {
                let target = self.board[to.index()];
                if target.is_none()
                    || target.color() != them
                    || Some(target.piece_type()) != mv.captured()
                {
                    return false;
                }
                if pt == PieceType::Pawn {
                    to.rank().relative(us) != Rank::R8 && pawn_attacks(us, from).contains(to)
                } else {
                    attacks_bb(pt, from, occ).contains(to)
                }
            }
            MoveKind::PawnPush => {
                pt == PieceType::Pawn
                    && to.rank().relative(us) != Rank::R8
                    && from.try_offset(us.pawn_push()) == Some(to)
                    && self.board[to.index()].is_none()
            }
            MoveKind::DoublePush => {
                pt == PieceType::Pawn
                    && from.rank().relative(us) == Rank::R2
                    && from.try_offset(2 * us.pawn_push()) == Some(to)
                    && self.board[from.offset(us.pawn_push()).index()].is_none()
                    && self.board[to.index()].is_none()
            }
            MoveKind::EnPassant => {
                pt == PieceType::Pawn
                    && self.state.ep_valid == Some(to)
                    && pawn_attacks(us, from).contains(to)
            }
            MoveKind::Castle => {
                if pt != PieceType::King || self.in_check() {
                    return false;
                }
                let rank = Rank::R1.relative(us);
                if from != Square::new(File(4), rank) {
                    return false;
                }
                let kingside = to == Square::new(File(6), rank);
                let queenside = to == Square::new(File(2), rank);
                if !kingside && !queenside {
                    return false;
                }
                let right = match (us, kingside) {
                    (Color::White, true) => CASTLE_WK,
                    (Color::White, false) => CASTLE_WQ,
                    (Color::Black, true) => CASTLE_BK,
                    (Color::Black, false) => CASTLE_BQ,
                };
                if self.state.castling & right == 0 {
                    return false;
                }
                let (rfrom, _) = rook_castle_squares(to);
                self.board[rfrom.index()] == Piece::new(us, PieceType::Rook)
                    && (crate::bitboard::between_bb(from, rfrom) & occ).is_empty()
            }
            MoveKind::Promotion => {
                pt == PieceType::Pawn
                    && from.rank().relative(us) == Rank::R7
                    && from.try_offset(us.pawn_push()) == Some(to)
                    && self.board[to.index()].is_none()
                    && mv.promotion().is_some()
            }
            MoveKind::PromotionCapture => {
                let target = self.board[to.index()];
                pt == PieceType::Pawn
                    && from.rank().relative(us) == Rank::R7
                    && pawn_attacks(us, from).contains(to)
                    && target.is_some()
                    && target.color() == them
                    && Some(target.piece_type()) == mv.captured()
                    && mv.promotion().is_some()
            }
        }
    }

    // ========== 検証 ==========

    /// Zobristキーをゼロから再計算する（差分更新の検証用）
    pub fn compute_key(&self) -> u64 {
        let mut key = 0u64;
        for sq in Square::all() {
            let pc = self.board[sq.index()];
            if pc.is_some() {
                key ^= zobrist_psq(pc, sq);
            }
        }
        key ^= zobrist_castling(self.state.castling);
        if let Some(ep) = self.state.ep_valid {
            key ^= zobrist_ep(ep.file());
        }
        if self.side_to_move == Color::Black {
            key ^= zobrist_side();
        }
        key
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}
