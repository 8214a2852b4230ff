use rustc_hash::FxHashMap;

use crate::{
    board::{Board, Snapshot},
    color::Color,
    coord::{promotion_rank, Coord},
    end_state::{DrawReason, EndState},
    error::PromotionError,
    grid::Grid,
    piece::{Piece, PieceKind},
};

/// Everything that identifies a position for threefold repetition: the
/// occupants, the side to move, and the en passant window. Castling
/// eligibility rides along in the pieces' `moved` flags.
type PositionKey = (Grid<Option<Piece>>, Color, Option<Coord>);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameStatus {
    InProgress,
    Check(Color),
    /// A pawn reached its last rank and the turn is held open until the
    /// player names a replacement through [`Game::choose_promotion`].
    AwaitingPromotion(Coord),
    Over(EndState),
}

/// A full game: the board plus turn order, status, and the draw
/// counters. Moves come in through [`Game::attempt_move`], which turns
/// illegal requests into a `false` and nothing else.
#[derive(Debug, Clone)]
pub struct Game {
    board: Board,
    current_player: Color,
    status: GameStatus,
    halfmove_clock: u16,
    seen: FxHashMap<PositionKey, u8>,
}
impl Game {
    pub fn new() -> Self {
        Game::from_parts(Board::starting_position(), Color::White, 0)
    }
    pub(crate) fn from_parts(board: Board, player: Color, halfmove_clock: u16) -> Self {
        let mut game = Game {
            board,
            current_player: player,
            status: GameStatus::InProgress,
            halfmove_clock,
            seen: FxHashMap::default(),
        };
        *game.seen.entry(game.position_key()).or_insert(0) += 1;
        game.status = game.evaluated_status();
        game
    }
    pub fn restart(&mut self) {
        *self = Game::new();
    }
    pub fn board(&self) -> &Board {
        &self.board
    }
    pub fn current_player(&self) -> Color {
        self.current_player
    }
    pub fn status(&self) -> GameStatus {
        self.status
    }
    pub fn end_state(&self) -> Option<EndState> {
        match self.status {
            GameStatus::Over(end) => Some(end),
            _ => None,
        }
    }
    pub fn is_in_check(&self, color: Color) -> bool {
        self.board.in_check(color)
    }
    pub fn is_checkmate(&self, color: Color) -> bool {
        self.status == GameStatus::Over(EndState::Win(!color))
    }
    pub fn requires_promotion_choice(&self) -> bool {
        matches!(self.status, GameStatus::AwaitingPromotion(_))
    }
    /// A stable copy of the board and captured lists for rendering.
    pub fn snapshot(&self) -> Snapshot {
        self.board.snapshot()
    }
    pub(crate) fn halfmove_clock(&self) -> u16 {
        self.halfmove_clock
    }

    fn accepting_moves(&self) -> bool {
        matches!(self.status, GameStatus::InProgress | GameStatus::Check(_))
    }
    fn position_key(&self) -> PositionKey {
        (
            self.board.position(),
            self.current_player,
            self.board.en_passant_target(),
        )
    }
    /// The squares the piece on `origin` may move to right now. Empty
    /// when it is not the current player's piece or no move is expected.
    pub fn legal_targets(&self, origin: Coord) -> Vec<Coord> {
        if !self.accepting_moves()
            || self
                .board
                .piece_at(origin)
                .is_none_or(|piece| piece.color != self.current_player)
        {
            return Vec::new();
        }
        self.board.legal_targets(origin)
    }
    /// Plays the move when it is the current player's and legal. On a
    /// promotion the turn stays with the mover until a piece is chosen.
    pub fn attempt_move(&mut self, origin: Coord, target: Coord) -> bool {
        if !self.accepting_moves()
            || self
                .board
                .piece_at(origin)
                .is_none_or(|piece| piece.color != self.current_player)
            || !self.board.is_legal(origin, target)
        {
            return false;
        }
        let Some(outcome) = self.board.apply_effects(origin, target) else {
            return false;
        };
        if outcome.captured.is_some() || outcome.pawn_move {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }
        let promoting = self.board.piece_at(target).is_some_and(|piece| {
            piece.kind == PieceKind::Pawn && target.y() == promotion_rank(piece.color)
        });
        if promoting {
            self.status = GameStatus::AwaitingPromotion(target);
        } else {
            self.finish_turn();
        }
        true
    }
    pub fn choose_promotion(&mut self, kind: PieceKind) -> Result<(), PromotionError> {
        let GameStatus::AwaitingPromotion(position) = self.status else {
            return Err(PromotionError::NothingPending);
        };
        self.board.promote(position, kind)?;
        self.finish_turn();
        Ok(())
    }
    fn finish_turn(&mut self) {
        self.current_player = !self.current_player;
        *self.seen.entry(self.position_key()).or_insert(0) += 1;
        self.status = self.evaluated_status();
    }
    fn evaluated_status(&self) -> GameStatus {
        let player = self.current_player;
        if !self.board.has_any_legal_move(player) {
            return GameStatus::Over(if self.board.in_check(player) {
                EndState::Win(!player)
            } else {
                EndState::Draw(DrawReason::Stalemate)
            });
        }
        if self.board.is_dead() {
            return GameStatus::Over(EndState::Draw(DrawReason::DeadPosition));
        }
        if self.halfmove_clock >= 100 {
            return GameStatus::Over(EndState::Draw(DrawReason::FiftyMoves));
        }
        if self
            .seen
            .get(&self.position_key())
            .is_some_and(|count| *count >= 3)
        {
            return GameStatus::Over(EndState::Draw(DrawReason::Repetition));
        }
        if self.board.in_check(player) {
            GameStatus::Check(player)
        } else {
            GameStatus::InProgress
        }
    }
}
impl Default for Game {
    fn default() -> Self {
        Game::new()
    }
}

#[cfg(test)]
mod test {
    use crate::{
        board::Board,
        color::Color,
        coord,
        end_state::{DrawReason, EndState},
        error::PromotionError,
        piece::{Piece, PieceKind},
    };

    use super::{Game, GameStatus};

    fn game_with(pieces: &[(&str, Color, PieceKind)], player: Color) -> Game {
        let board = Board::with_pieces(|coord| {
            pieces
                .iter()
                .find(|(name, ..)| crate::coord::Coord::from_name(name) == coord)
                .map(|(_, color, kind)| Piece::new(*color, *kind))
        });
        Game::from_parts(board, player, 0)
    }
    fn play(game: &mut Game, moves: &[(&str, &str)]) {
        for (origin, target) in moves {
            assert!(
                game.attempt_move(
                    crate::coord::Coord::from_name(origin),
                    crate::coord::Coord::from_name(target),
                ),
                "{origin}{target} was rejected",
            );
        }
    }

    #[test]
    fn turns_alternate_and_offturn_moves_are_rejected() {
        let mut game = Game::new();
        assert_eq!(game.current_player(), Color::White);
        assert!(!game.attempt_move(coord!("e7"), coord!("e5")));
        assert!(game.attempt_move(coord!("e2"), coord!("e4")));
        assert_eq!(game.current_player(), Color::Black);
        assert!(!game.attempt_move(coord!("d2"), coord!("d4")));
    }
    #[test]
    fn fools_mate_ends_the_game() {
        let mut game = Game::new();
        play(
            &mut game,
            &[("f2", "f3"), ("e7", "e5"), ("g2", "g4"), ("d8", "h4")],
        );
        assert_eq!(
            game.status(),
            GameStatus::Over(EndState::Win(Color::Black))
        );
        assert!(game.is_checkmate(Color::White));
        assert!(!game.is_checkmate(Color::Black));
        assert_eq!(game.end_state().unwrap().to_string(), "black wins");
        assert!(!game.attempt_move(coord!("e1"), coord!("f2")));
    }
    #[test]
    fn a_double_check_with_no_flight_square_is_mate() {
        let game = game_with(
            &[
                ("h8", Color::Black, PieceKind::King),
                ("a8", Color::Black, PieceKind::Rook),
                ("h1", Color::White, PieceKind::Rook),
                ("g1", Color::White, PieceKind::Rook),
                ("b2", Color::White, PieceKind::Bishop),
                ("e1", Color::White, PieceKind::King),
            ],
            Color::Black,
        );
        assert_eq!(game.status(), GameStatus::Over(EndState::Win(Color::White)));
    }
    #[test]
    fn check_is_reported_and_must_be_answered() {
        let mut game = Game::new();
        play(&mut game, &[("e2", "e4"), ("f7", "f6"), ("d1", "h5")]);
        assert_eq!(game.status(), GameStatus::Check(Color::Black));
        assert!(game.is_in_check(Color::Black));
        assert!(!game.is_in_check(Color::White));
        // Ignoring the check is not allowed, blocking it is.
        assert!(!game.attempt_move(coord!("a7"), coord!("a6")));
        assert!(game.attempt_move(coord!("g7"), coord!("g6")));
        assert_eq!(game.status(), GameStatus::InProgress);
    }
    #[test]
    fn stalemate_is_a_draw() {
        let game = game_with(
            &[
                ("b6", Color::White, PieceKind::King),
                ("c7", Color::White, PieceKind::Queen),
                ("a8", Color::Black, PieceKind::King),
            ],
            Color::Black,
        );
        assert_eq!(
            game.status(),
            GameStatus::Over(EndState::Draw(DrawReason::Stalemate))
        );
        assert_eq!(game.end_state().unwrap().to_string(), "draw by stalemate");
    }
    #[test]
    fn shuffling_knights_repeats_into_a_draw() {
        let mut game = Game::new();
        let shuffle = [
            ("g1", "f3"),
            ("g8", "f6"),
            ("f3", "g1"),
            ("f6", "g8"),
        ];
        play(&mut game, &shuffle);
        assert_eq!(game.status(), GameStatus::InProgress);
        play(&mut game, &shuffle);
        assert_eq!(
            game.status(),
            GameStatus::Over(EndState::Draw(DrawReason::Repetition))
        );
    }
    #[test]
    fn the_fifty_move_counter_runs_out() {
        let board = Board::with_pieces(|coord| {
            [
                (coord!("e1"), Piece::new(Color::White, PieceKind::King)),
                (coord!("e8"), Piece::new(Color::Black, PieceKind::King)),
                (coord!("a1"), Piece::new(Color::White, PieceKind::Rook)),
            ]
            .into_iter()
            .find(|(position, _)| *position == coord)
            .map(|(_, piece)| piece)
        });
        let mut game = Game::from_parts(board, Color::White, 99);
        assert!(game.attempt_move(coord!("a1"), coord!("b1")));
        assert_eq!(
            game.status(),
            GameStatus::Over(EndState::Draw(DrawReason::FiftyMoves))
        );
    }
    #[test]
    fn captures_reset_the_fifty_move_counter() {
        let mut game = game_with(
            &[
                ("e1", Color::White, PieceKind::King),
                ("e8", Color::Black, PieceKind::King),
                ("a1", Color::White, PieceKind::Rook),
                ("a8", Color::Black, PieceKind::Rook),
            ],
            Color::White,
        );
        game.halfmove_clock = 99;
        assert!(game.attempt_move(coord!("a1"), coord!("a8")));
        assert_eq!(game.halfmove_clock(), 0);
        assert_ne!(
            game.status(),
            GameStatus::Over(EndState::Draw(DrawReason::FiftyMoves))
        );
    }
    #[test]
    fn capturing_down_to_bare_kings_is_a_dead_draw() {
        let mut game = game_with(
            &[
                ("e1", Color::White, PieceKind::King),
                ("e2", Color::Black, PieceKind::Rook),
                ("a8", Color::Black, PieceKind::King),
            ],
            Color::White,
        );
        assert_eq!(game.status(), GameStatus::Check(Color::White));
        assert!(game.attempt_move(coord!("e1"), coord!("e2")));
        assert_eq!(
            game.status(),
            GameStatus::Over(EndState::Draw(DrawReason::DeadPosition))
        );
    }
    #[test]
    fn promotion_holds_the_turn_until_a_piece_is_chosen() {
        let mut game = game_with(
            &[
                ("a7", Color::White, PieceKind::Pawn),
                ("e1", Color::White, PieceKind::King),
                ("h5", Color::Black, PieceKind::King),
            ],
            Color::White,
        );
        assert!(game.attempt_move(coord!("a7"), coord!("a8")));
        assert_eq!(game.status(), GameStatus::AwaitingPromotion(coord!("a8")));
        assert_eq!(game.current_player(), Color::White);
        assert!(!game.attempt_move(coord!("h5"), coord!("h4")));

        assert_eq!(
            game.choose_promotion(PieceKind::Bishop),
            Err(PromotionError::InvalidKind(PieceKind::Bishop))
        );
        game.choose_promotion(PieceKind::Queen).unwrap();
        assert_eq!(
            game.board().piece_at(coord!("a8")).map(|piece| piece.kind),
            Some(PieceKind::Queen)
        );
        assert_eq!(game.current_player(), Color::Black);
    }
    #[test]
    fn promotion_choice_without_a_promotion_is_an_error() {
        let mut game = Game::new();
        assert_eq!(
            game.choose_promotion(PieceKind::Queen),
            Err(PromotionError::NothingPending)
        );
    }
    #[test]
    fn legal_targets_follow_the_turn() {
        let game = Game::new();
        assert!(game.legal_targets(coord!("e7")).is_empty());
        // Coordinates come out top row first.
        assert_eq!(
            game.legal_targets(coord!("e2")),
            [coord!("e4"), coord!("e3")]
        );
    }
    #[test]
    fn snapshots_detach_from_the_live_board() {
        let mut game = Game::new();
        play(&mut game, &[("e2", "e4"), ("d7", "d5"), ("e4", "d5")]);
        let snapshot = game.snapshot();
        assert_eq!(
            snapshot.captured_black,
            [Piece::new(Color::Black, PieceKind::Pawn)]
        );
        play(&mut game, &[("d8", "d5")]);
        assert_eq!(
            snapshot.pieces[coord!("d5")],
            Some(Piece::new(Color::White, PieceKind::Pawn))
        );
    }
    #[test]
    fn restart_returns_to_the_starting_position() {
        let mut game = Game::new();
        play(&mut game, &[("e2", "e4")]);
        game.restart();
        assert_eq!(game.current_player(), Color::White);
        assert_eq!(game.board(), &Board::starting_position());
        assert_eq!(game.status(), GameStatus::InProgress);
    }
}
