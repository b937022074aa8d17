use crate::board::{Board, Color, Piece, PieceId, Player, Tally, Token};
use crate::config::{ConfigError, GameConfig, PlacementMode, ScoringRule};
use crate::geometry::{Point, on_open_segment};
use crate::normalize::Normalizer;
use crate::sampler;
use crate::snapshot::Snapshot;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;
use tracing::{debug, info};

/// Rejected candidates allowed per piece before layout generation gives up.
const MAX_LAYOUT_ATTEMPTS: usize = 10_000;

/// Capture `a` and `b`, leaving a token at `point`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Move {
    pub a: PieceId,
    pub b: PieceId,
    pub point: Point,
}

impl Move {
    pub fn new(a: PieceId, b: PieceId, point: Point) -> Self {
        Move { a, b, point }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {} @ {}", self.a, self.b, self.point)
    }
}

/// Why a proposed move was refused. The game is left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum InvalidMove {
    #[error("not this player's turn")]
    WrongTurn,
    #[error("no such piece on this board")]
    UnknownPiece,
    #[error("piece already captured or chosen twice")]
    AlreadyCaptured,
    #[error("pieces are different colors")]
    ColorMismatch,
    #[error("line between the pieces is obstructed")]
    ObstructedLine,
    #[error("token point is not strictly between the pieces")]
    InvalidPlacementPoint,
    #[error("token point is too close to a piece or token")]
    PositionOccupied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("Game already over")]
    GameOver,
    #[error("Invalid move: {0}")]
    Invalid(#[from] InvalidMove),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    Winner(Player),
    Draw,
}

impl GameResult {
    pub fn winner(&self) -> Option<Player> {
        match self {
            GameResult::Winner(player) => Some(*player),
            GameResult::Draw => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    InProgress(Player),
    GameOver(GameResult),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CaptureOutcome {
    pub captured: [PieceId; 2],
    pub color: Color,
    pub token: Token,
    pub by: Player,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    config: GameConfig,
    normalizer: Normalizer,
    board: Board,
    phase: Phase,
}

impl GameState {
    /// Start a game on a random layout. The same seed always produces the
    /// same layout.
    pub fn new(config: GameConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let rows = random_layout(&config, &mut rng)?;
        Ok(Self::setup(config, rows))
    }

    /// Start a game on an explicit layout: one row of normalized positions
    /// per color, each row holding exactly `pieces_per_color` points.
    pub fn from_layout(config: GameConfig, rows: Vec<Vec<Point>>) -> Result<Self, ConfigError> {
        config.validate()?;
        if rows.len() != config.num_colors
            || rows.iter().any(|row| row.len() != config.pieces_per_color)
        {
            return Err(ConfigError::LayoutMismatch {
                rows: rows.len(),
                per_row: rows.iter().map(Vec::len).collect(),
                colors: config.num_colors,
                pieces: config.pieces_per_color,
            });
        }
        let normalizer = Normalizer::new(config.bounds);
        let bounds = normalizer.bounds();
        for (color, row) in rows.iter().enumerate() {
            if let Some(index) = row
                .iter()
                .position(|&p| !bounds.contains(normalizer.unnormalize(p)))
            {
                return Err(ConfigError::OutOfBounds { color, index });
            }
        }
        Ok(Self::setup(config, rows))
    }

    fn setup(config: GameConfig, rows: Vec<Vec<Point>>) -> Self {
        let board = Board::from_rows(&rows, config.pieces_per_color);
        let mut state = GameState {
            normalizer: Normalizer::new(config.bounds),
            config,
            board,
            phase: Phase::InProgress(Player::One),
        };
        if !state.has_legal_move(Player::One) && !state.has_legal_move(Player::Two) {
            state.finish();
        }
        state
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn num_colors(&self) -> usize {
        self.config.num_colors
    }

    pub fn pieces_per_color(&self) -> usize {
        self.config.pieces_per_color
    }

    pub fn normalize(&self, physical: Point) -> Point {
        self.normalizer.normalize(physical)
    }

    pub fn unnormalize(&self, normalized: Point) -> Point {
        self.normalizer.unnormalize(normalized)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// `None` once the game is over.
    pub fn current_player(&self) -> Option<Player> {
        match self.phase {
            Phase::InProgress(player) => Some(player),
            Phase::GameOver(_) => None,
        }
    }

    pub fn result(&self) -> Option<GameResult> {
        match self.phase {
            Phase::InProgress(_) => None,
            Phase::GameOver(result) => Some(result),
        }
    }

    pub fn is_game_over(&self) -> bool {
        matches!(self.phase, Phase::GameOver(_))
    }

    /// Successful moves so far (one token each).
    pub fn move_count(&self) -> usize {
        self.board.tokens().len()
    }

    pub fn tokens_remaining(&self, player: Player) -> Option<usize> {
        self.config
            .tokens_per_player
            .map(|budget| budget.saturating_sub(self.board.tokens_placed_by(player)))
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(self)
    }

    /// A known, distinct, uncaptured, same-color pair with a clear line.
    fn playable_pair(&self, a: PieceId, b: PieceId) -> Option<(&Piece, &Piece)> {
        let pa = self.board.piece(a)?;
        let pb = self.board.piece(b)?;
        let playable = a != b
            && !pa.is_captured()
            && !pb.is_captured()
            && pa.color() == pb.color()
            && self.board.is_line_clear(pa, pb, self.config.epsilon);
        playable.then_some((pa, pb))
    }

    /// Sampled token points that `apply_move` would accept for this pair,
    /// in order along the segment from `a` to `b`. Empty if the pair itself
    /// cannot be played.
    pub fn get_valid_placements(&self, a: PieceId, b: PieceId, resolution: usize) -> Vec<Point> {
        let Some((pa, pb)) = self.playable_pair(a, b) else {
            return Vec::new();
        };
        sampler::valid_placements(
            pa.position(),
            pb.position(),
            resolution,
            self.config.epsilon,
            self.config.occupancy_radius(),
            self.board.occupants(),
        )
    }

    /// Any point on `a`-`b` that `apply_move` would accept in free placement
    /// mode, searched over the whole segment rather than the samples.
    pub fn free_placement(&self, a: PieceId, b: PieceId) -> Option<Point> {
        let (pa, pb) = self.playable_pair(a, b)?;
        sampler::free_placement(
            pa.position(),
            pb.position(),
            self.config.epsilon,
            self.config.occupancy_radius(),
            self.board.occupants(),
        )
    }

    fn pair_has_placement(&self, a: PieceId, b: PieceId) -> bool {
        match self.config.placement_mode {
            PlacementMode::Sampled => {
                !self.get_valid_placements(a, b, self.config.resolution).is_empty()
            }
            PlacementMode::Free => self.free_placement(a, b).is_some(),
        }
    }

    /// Whether `player` could move if it were their turn.
    pub fn has_legal_move(&self, player: Player) -> bool {
        if self.tokens_remaining(player) == Some(0) {
            return false;
        }
        Color::all(self.config.num_colors).any(|color| {
            self.board
                .unobstructed_pairs(color, self.config.epsilon)
                .into_iter()
                .any(|(a, b)| self.pair_has_placement(a, b))
        })
    }

    /// Runs every rule check for `mv` without touching the game.
    /// Returns the color of the pair on success.
    pub fn check_move(&self, player: Player, mv: &Move) -> Result<Color, GameError> {
        let active = match self.phase {
            Phase::GameOver(_) => return Err(GameError::GameOver),
            Phase::InProgress(active) => active,
        };
        if player != active {
            return Err(InvalidMove::WrongTurn.into());
        }

        let (Some(a), Some(b)) = (self.board.piece(mv.a), self.board.piece(mv.b)) else {
            return Err(InvalidMove::UnknownPiece.into());
        };
        if a.is_captured() || b.is_captured() || a.id() == b.id() {
            return Err(InvalidMove::AlreadyCaptured.into());
        }
        if a.color() != b.color() {
            return Err(InvalidMove::ColorMismatch.into());
        }

        let eps = self.config.epsilon;
        if !self.board.is_line_clear(a, b, eps) {
            return Err(InvalidMove::ObstructedLine.into());
        }
        if !on_open_segment(a.position(), b.position(), mv.point, eps) {
            return Err(InvalidMove::InvalidPlacementPoint.into());
        }
        if self.config.placement_mode == PlacementMode::Sampled
            && !sampler::matches_sample(
                a.position(),
                b.position(),
                self.config.resolution,
                mv.point,
                eps,
            )
        {
            return Err(InvalidMove::InvalidPlacementPoint.into());
        }
        if !sampler::is_clear(mv.point, self.board.occupants(), self.config.occupancy_radius()) {
            return Err(InvalidMove::PositionOccupied.into());
        }

        Ok(a.color())
    }

    /// Validate and play a move for `player`.
    ///
    /// On success both pieces are captured, the token is placed and the turn
    /// advances; on failure nothing changes.
    pub fn apply_move(&mut self, player: Player, mv: Move) -> Result<CaptureOutcome, GameError> {
        let color = match self.check_move(player, &mv) {
            Ok(color) => color,
            Err(e) => {
                debug!(%player, %mv, error = %e, "move rejected");
                return Err(e);
            }
        };

        let token = self.board.capture(mv.a, mv.b, mv.point, player);
        debug!(%player, %mv, %color, "move accepted");

        self.advance_turn(player);

        Ok(CaptureOutcome {
            captured: [mv.a, mv.b],
            color,
            token,
            by: player,
        })
    }

    /// The opponent moves next if they can; otherwise the mover goes again;
    /// the game ends only when neither can move.
    fn advance_turn(&mut self, mover: Player) {
        let other = mover.opponent();
        if self.has_legal_move(other) {
            self.phase = Phase::InProgress(other);
        } else if self.has_legal_move(mover) {
            debug!(skipped = %other, "no legal move, turn passes back");
            self.phase = Phase::InProgress(mover);
        } else {
            self.finish();
        }
    }

    fn finish(&mut self) {
        if self.config.collect_remaining {
            let collected = self.board.collect_remaining();
            debug!(collected, "leftover pieces collected");
        }
        let result = self.standing();
        info!(
            ?result,
            moves = self.move_count(),
            player_one = self.board.tally(Player::One).total(),
            player_two = self.board.tally(Player::Two).total(),
            "game over"
        );
        self.phase = Phase::GameOver(result);
    }

    /// Who would win if the game ended with the current tallies.
    pub fn standing(&self) -> GameResult {
        let one = self.board.tally(Player::One);
        let two = self.board.tally(Player::Two);
        let ordering = match self.config.scoring {
            ScoringRule::TotalThenColors => compare_totals(one, two),
            ScoringRule::ColorMajorities => {
                let ppc = self.config.pieces_per_color;
                one.majorities(ppc)
                    .cmp(&two.majorities(ppc))
                    .then_with(|| compare_totals(one, two))
            }
        };
        match ordering {
            Ordering::Greater => GameResult::Winner(Player::One),
            Ordering::Less => GameResult::Winner(Player::Two),
            Ordering::Equal => GameResult::Draw,
        }
    }

    /// Board summary with both tallies, for logs and the CLI.
    pub fn display_board(&self) -> String {
        let mut result = self.board.summary();
        for player in Player::BOTH {
            let tally = self.board.tally(player);
            result.push_str(&format!(
                "{}: {} pieces in {} colors {:?}",
                player,
                tally.total(),
                tally.distinct_colors(),
                tally.counts()
            ));
            if let Some(left) = self.tokens_remaining(player) {
                result.push_str(&format!(", {} tokens left", left));
            }
            result.push('\n');
        }
        result
    }
}

fn compare_totals(one: &Tally, two: &Tally) -> Ordering {
    one.total()
        .cmp(&two.total())
        .then_with(|| one.distinct_colors().cmp(&two.distinct_colors()))
}

/// Scatter pieces over the disc inscribed in the bounds, keeping every pair
/// at least two radii apart, and return their normalized positions.
fn random_layout<R: Rng>(config: &GameConfig, rng: &mut R) -> Result<Vec<Vec<Point>>, ConfigError> {
    let normalizer = Normalizer::new(config.bounds);
    let center = config.bounds.center();
    let max_radius =
        (config.bounds.width.min(config.bounds.height) / 2.0 - config.piece_radius).max(0.0);
    let min_gap_sq = (2.0 * config.piece_radius).powi(2);

    let mut placed: Vec<Point> = Vec::with_capacity(config.num_colors * config.pieces_per_color);
    let mut rows = Vec::with_capacity(config.num_colors);
    for color in 0..config.num_colors {
        let mut row = Vec::with_capacity(config.pieces_per_color);
        for index in 0..config.pieces_per_color {
            let position = (0..MAX_LAYOUT_ATTEMPTS)
                .find_map(|_| {
                    let angle = rng.gen_range(0.0..std::f64::consts::TAU);
                    let radius = rng.gen_range(0.0..=max_radius);
                    let candidate = Point::new(
                        center.x + radius * angle.cos(),
                        center.y + radius * angle.sin(),
                    );
                    placed
                        .iter()
                        .all(|p| p.distance_squared(candidate) >= min_gap_sq)
                        .then_some(candidate)
                })
                .ok_or(ConfigError::LayoutFailed { color, index })?;
            placed.push(position);
            row.push(normalizer.normalize(position));
        }
        rows.push(row);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    /// Middle valid placement for a pair, as a bot would pick it.
    fn middle_placement(game: &GameState, a: u32, b: u32) -> Point {
        let placements = game.get_valid_placements(PieceId(a), PieceId(b), game.config().resolution);
        placements[placements.len() / 2]
    }

    fn play(game: &mut GameState, player: Player, a: u32, b: u32) -> CaptureOutcome {
        let point = middle_placement(game, a, b);
        game.apply_move(player, Move::new(PieceId(a), PieceId(b), point))
            .unwrap()
    }

    /// Two colors with two pieces each, crossing lines.
    fn cross_layout(config: GameConfig) -> GameState {
        GameState::from_layout(
            config,
            vec![
                vec![p(0.1, 0.5), p(0.9, 0.5)],
                vec![p(0.5, 0.1), p(0.5, 0.9)],
            ],
        )
        .unwrap()
    }

    /// Four colors with two pieces each, no piece on another pair's line.
    fn four_pairs(config: GameConfig) -> GameState {
        GameState::from_layout(
            config,
            vec![
                vec![p(0.1, 0.1), p(0.9, 0.15)],
                vec![p(0.1, 0.9), p(0.85, 0.8)],
                vec![p(0.2, 0.35), p(0.75, 0.4)],
                vec![p(0.25, 0.65), p(0.7, 0.6)],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_full_setup() {
        let game = GameState::new(GameConfig::default(), 42).unwrap();
        let snapshot = game.snapshot();

        assert_eq!(game.num_colors(), 7);
        assert_eq!(game.pieces_per_color(), 7);
        assert_eq!(snapshot.uncaptured().count(), 49);
        assert!(snapshot.tokens.is_empty());
        assert_eq!(game.current_player(), Some(Player::One));
        for piece in game.board().pieces() {
            let position = piece.position();
            assert!((0.0..=1.0).contains(&position.x) && (0.0..=1.0).contains(&position.y));
        }
    }

    #[test]
    fn test_full_setup_first_move() {
        let mut game = GameState::new(GameConfig::default(), 42).unwrap();
        let snapshot = game.snapshot();
        let (color, a, b) = snapshot
            .unobstructed_pairs()
            .find(|&(_, a, b)| !snapshot.valid_placements(a, b, 100).is_empty())
            .unwrap();
        let point = snapshot.valid_placements(a, b, 100)[0];

        let outcome = game.apply_move(Player::One, Move::new(a, b, point)).unwrap();

        assert_eq!(outcome.captured, [a, b]);
        assert_eq!(outcome.color, color);
        assert_eq!(outcome.by, Player::One);
        assert_eq!(outcome.token.position, point);
        assert_eq!(game.board().uncaptured_count(), 47);
        assert_eq!(game.board().tokens().len(), 1);
        assert_eq!(game.board().tally(Player::One).get(color), 2);
        assert_eq!(game.board().tally(Player::Two).total(), 0);
        assert_eq!(game.current_player(), Some(Player::Two));
    }

    #[test]
    fn test_same_seed_same_layout() {
        let a = GameState::new(GameConfig::default(), 7).unwrap();
        let b = GameState::new(GameConfig::default(), 7).unwrap();
        let c = GameState::new(GameConfig::default(), 8).unwrap();
        assert_eq!(a.board(), b.board());
        assert_ne!(a.board(), c.board());
    }

    #[test]
    fn test_random_layout_keeps_pieces_apart() {
        let config = GameConfig::default();
        let game = GameState::new(config.clone(), 3).unwrap();
        let min_gap = 2.0 * config.piece_radius / config.bounds.width;
        let pieces = game.board().pieces();
        for (i, a) in pieces.iter().enumerate() {
            for b in &pieces[i + 1..] {
                assert!(a.position().distance(b.position()) >= min_gap - 1e-12);
            }
        }
    }

    #[test]
    fn test_crowded_layout_fails() {
        let config = GameConfig {
            piece_radius: 200.0,
            ..GameConfig::default()
        };
        assert!(matches!(
            GameState::new(config, 1),
            Err(ConfigError::LayoutFailed { .. })
        ));
    }

    #[test]
    fn test_layout_shape_checked() {
        let result = GameState::from_layout(GameConfig::with_size(2, 2), vec![vec![p(0.1, 0.1)]]);
        assert!(matches!(result, Err(ConfigError::LayoutMismatch { .. })));
    }

    #[test]
    fn test_layout_outside_board_rejected() {
        let result = GameState::from_layout(
            GameConfig::with_size(2, 2),
            vec![
                vec![p(0.1, 0.5), p(0.9, 0.5)],
                vec![p(0.5, 0.1), p(0.5, 1.2)],
            ],
        );
        assert!(matches!(
            result,
            Err(ConfigError::OutOfBounds { color: 1, index: 1 })
        ));

        // The board edges themselves are fine
        let edges = GameState::from_layout(
            GameConfig::with_size(2, 2),
            vec![
                vec![p(0.0, 0.0), p(1.0, 0.0)],
                vec![p(0.0, 1.0), p(1.0, 1.0)],
            ],
        );
        assert!(edges.is_ok());
    }

    #[test]
    fn test_wrong_turn() {
        let mut game = cross_layout(GameConfig::with_size(2, 2));
        let mv = Move::new(PieceId(0), PieceId(1), p(0.3, 0.5));
        assert_eq!(
            game.apply_move(Player::Two, mv),
            Err(GameError::Invalid(InvalidMove::WrongTurn))
        );
        assert_eq!(game.board().uncaptured_count(), 4);
    }

    #[test]
    fn test_unknown_piece() {
        let mut game = cross_layout(GameConfig::with_size(2, 2));
        let mv = Move::new(PieceId(0), PieceId(99), p(0.3, 0.5));
        assert_eq!(
            game.apply_move(Player::One, mv),
            Err(GameError::Invalid(InvalidMove::UnknownPiece))
        );
    }

    #[test]
    fn test_same_piece_twice() {
        let mut game = cross_layout(GameConfig::with_size(2, 2));
        let mv = Move::new(PieceId(0), PieceId(0), p(0.3, 0.5));
        assert_eq!(
            game.apply_move(Player::One, mv),
            Err(GameError::Invalid(InvalidMove::AlreadyCaptured))
        );
    }

    #[test]
    fn test_captured_piece_cannot_be_reused() {
        let mut game = four_pairs(GameConfig::with_size(4, 2));
        play(&mut game, Player::One, 0, 1);

        let mv = Move::new(PieceId(1), PieceId(0), p(0.5, 0.125));
        assert_eq!(
            game.apply_move(Player::Two, mv),
            Err(GameError::Invalid(InvalidMove::AlreadyCaptured))
        );
        let mv = Move::new(PieceId(0), PieceId(2), p(0.1, 0.5));
        assert_eq!(
            game.apply_move(Player::Two, mv),
            Err(GameError::Invalid(InvalidMove::AlreadyCaptured))
        );
    }

    #[test]
    fn test_color_mismatch() {
        let mut game = cross_layout(GameConfig::with_size(2, 2));
        let mv = Move::new(PieceId(0), PieceId(2), p(0.3, 0.3));
        assert_eq!(
            game.apply_move(Player::One, mv),
            Err(GameError::Invalid(InvalidMove::ColorMismatch))
        );
    }

    #[test]
    fn test_obstructed_line() {
        let mut game = GameState::from_layout(
            GameConfig::with_size(1, 3),
            vec![vec![p(0.1, 0.5), p(0.5, 0.5), p(0.9, 0.5)]],
        )
        .unwrap();

        let mv = Move::new(PieceId(0), PieceId(2), p(0.3, 0.5));
        assert_eq!(
            game.apply_move(Player::One, mv),
            Err(GameError::Invalid(InvalidMove::ObstructedLine))
        );
        assert!(game.get_valid_placements(PieceId(0), PieceId(2), 10).is_empty());
        assert!(!game.get_valid_placements(PieceId(0), PieceId(1), 10).is_empty());
    }

    #[test]
    fn test_placement_off_the_line() {
        let mut game = cross_layout(GameConfig::with_size(2, 2));
        let mv = Move::new(PieceId(0), PieceId(1), p(0.3, 0.55));
        assert_eq!(
            game.apply_move(Player::One, mv),
            Err(GameError::Invalid(InvalidMove::InvalidPlacementPoint))
        );
        assert_eq!(game.board().uncaptured_count(), 4);
        assert!(game.board().tokens().is_empty());
        assert_eq!(game.current_player(), Some(Player::One));
    }

    #[test]
    fn test_placement_beyond_endpoint() {
        let mut game = cross_layout(GameConfig::with_size(2, 2));
        let mv = Move::new(PieceId(0), PieceId(1), p(0.95, 0.5));
        assert_eq!(
            game.apply_move(Player::One, mv),
            Err(GameError::Invalid(InvalidMove::InvalidPlacementPoint))
        );
    }

    #[test]
    fn test_position_occupied_by_token() {
        let mut game = cross_layout(GameConfig::with_size(2, 2));
        // Token just off the horizontal line
        game.apply_move(Player::One, Move::new(PieceId(2), PieceId(3), p(0.5, 0.52)))
            .unwrap();

        let mv = Move::new(PieceId(0), PieceId(1), p(0.5, 0.5));
        assert_eq!(
            game.apply_move(Player::Two, mv),
            Err(GameError::Invalid(InvalidMove::PositionOccupied))
        );
        assert_eq!(game.board().tokens().len(), 1);

        // Further along the same line is fine
        game.apply_move(Player::Two, Move::new(PieceId(0), PieceId(1), p(0.3, 0.5)))
            .unwrap();
    }

    #[test]
    fn test_position_occupied_by_endpoint() {
        let mut game = cross_layout(GameConfig::with_size(2, 2));
        let mv = Move::new(PieceId(0), PieceId(1), p(0.11, 0.5));
        assert_eq!(
            game.apply_move(Player::One, mv),
            Err(GameError::Invalid(InvalidMove::PositionOccupied))
        );
    }

    #[test]
    fn test_token_on_line_obstructs() {
        let mut game = GameState::from_layout(
            GameConfig::with_size(2, 2),
            vec![
                vec![p(0.1, 0.5), p(0.9, 0.5)],
                vec![p(0.1, 0.2), p(0.9, 0.8)],
            ],
        )
        .unwrap();
        // (0.5, 0.5) lies on both lines
        game.apply_move(Player::One, Move::new(PieceId(2), PieceId(3), p(0.5, 0.5)))
            .unwrap();

        assert!(game.is_game_over());
        let mv = Move::new(PieceId(0), PieceId(1), p(0.3, 0.5));
        assert_eq!(game.apply_move(Player::Two, mv), Err(GameError::GameOver));
        assert_eq!(game.result(), Some(GameResult::Winner(Player::One)));
    }

    #[test]
    fn test_sampled_placement_mode() {
        let config = GameConfig {
            placement_mode: PlacementMode::Sampled,
            resolution: 3,
            ..GameConfig::with_size(2, 2)
        };
        let mut game = cross_layout(config);

        let off_grid = Move::new(PieceId(0), PieceId(1), p(0.33, 0.5));
        assert_eq!(
            game.apply_move(Player::One, off_grid),
            Err(GameError::Invalid(InvalidMove::InvalidPlacementPoint))
        );
        let on_grid = Move::new(PieceId(0), PieceId(1), p(0.3, 0.5));
        assert!(game.apply_move(Player::One, on_grid).is_ok());
    }

    /// Red's only sample sits too close to a green piece, but the rest of
    /// the red line is open.
    fn crowded_midpoint(placement_mode: PlacementMode) -> GameState {
        let config = GameConfig {
            placement_mode,
            resolution: 1,
            ..GameConfig::with_size(2, 2)
        };
        GameState::from_layout(
            config,
            vec![
                vec![p(0.1, 0.5), p(0.3, 0.5)],
                vec![p(0.2, 0.52), p(0.2, 0.54)],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_free_mode_legality_ignores_samples() {
        let mut game = crowded_midpoint(PlacementMode::Free);
        assert_eq!(game.phase(), Phase::InProgress(Player::One));
        assert!(game.has_legal_move(Player::One));
        assert!(game.get_valid_placements(PieceId(0), PieceId(1), 1).is_empty());

        let found = game.free_placement(PieceId(0), PieceId(1)).unwrap();
        assert!(game.check_move(Player::One, &Move::new(PieceId(0), PieceId(1), found)).is_ok());
        // The green pair is shorter than the clearance around its endpoints
        assert_eq!(game.free_placement(PieceId(2), PieceId(3)), None);

        game.apply_move(Player::One, Move::new(PieceId(0), PieceId(1), p(0.15, 0.5)))
            .unwrap();
        assert_eq!(game.phase(), Phase::GameOver(GameResult::Winner(Player::One)));
    }

    #[test]
    fn test_sampled_mode_legality_uses_samples() {
        let game = crowded_midpoint(PlacementMode::Sampled);
        assert_eq!(game.phase(), Phase::GameOver(GameResult::Draw));
    }

    #[test]
    fn test_turns_alternate() {
        let mut game = four_pairs(GameConfig::with_size(4, 2));
        assert_eq!(game.current_player(), Some(Player::One));
        play(&mut game, Player::One, 0, 1);
        assert_eq!(game.current_player(), Some(Player::Two));
        play(&mut game, Player::Two, 2, 3);
        assert_eq!(game.current_player(), Some(Player::One));
        play(&mut game, Player::One, 4, 5);
        assert_eq!(game.current_player(), Some(Player::Two));
        play(&mut game, Player::Two, 6, 7);

        assert!(game.is_game_over());
        assert_eq!(game.current_player(), None);
        assert_eq!(game.move_count(), 4);
        // 4 pieces in 2 colors each
        assert_eq!(game.result(), Some(GameResult::Draw));
    }

    #[test]
    fn test_player_without_move_is_skipped() {
        let config = GameConfig {
            tokens_per_player: Some(2),
            ..GameConfig::with_size(4, 2)
        };
        let mut game = four_pairs(config);
        // Player Two has already spent both tokens
        let first = middle_placement(&game, 4, 5);
        game.board.capture(PieceId(4), PieceId(5), first, Player::Two);
        let second = middle_placement(&game, 6, 7);
        game.board.capture(PieceId(6), PieceId(7), second, Player::Two);
        assert!(!game.has_legal_move(Player::Two));

        play(&mut game, Player::One, 0, 1);
        assert_eq!(game.current_player(), Some(Player::One));
        assert_eq!(game.tokens_remaining(Player::One), Some(1));

        play(&mut game, Player::One, 2, 3);
        assert!(game.is_game_over());
        // 4 each, 2 colors each
        assert_eq!(game.result(), Some(GameResult::Draw));
    }

    #[test]
    fn test_token_budget_ends_game() {
        let config = GameConfig {
            tokens_per_player: Some(1),
            ..GameConfig::with_size(4, 2)
        };
        let mut game = four_pairs(config);
        play(&mut game, Player::One, 0, 1);
        play(&mut game, Player::Two, 2, 3);

        assert!(game.is_game_over());
        assert_eq!(game.board().uncaptured_count(), 4);
        assert_eq!(game.tokens_remaining(Player::One), Some(0));
    }

    #[test]
    fn test_all_pairs_obstructed_at_setup() {
        let mut game = GameState::from_layout(
            GameConfig::with_size(2, 2),
            vec![
                vec![p(0.1, 0.5), p(0.5, 0.5)],
                vec![p(0.3, 0.5), p(0.7, 0.5)],
            ],
        )
        .unwrap();

        assert!(game.is_game_over());
        assert_eq!(game.result(), Some(GameResult::Draw));
        let mv = Move::new(PieceId(0), PieceId(1), p(0.2, 0.5));
        assert_eq!(game.apply_move(Player::One, mv), Err(GameError::GameOver));
        assert!(game.snapshot().is_game_over());
    }

    #[test]
    fn test_game_over_when_remaining_pairs_obstructed() {
        let mut game = GameState::from_layout(
            GameConfig::with_size(3, 2),
            vec![
                vec![p(0.1, 0.5), p(0.5, 0.5)],
                vec![p(0.3, 0.5), p(0.7, 0.5)],
                vec![p(0.2, 0.1), p(0.2, 0.9)],
            ],
        )
        .unwrap();
        assert_eq!(game.current_player(), Some(Player::One));

        game.apply_move(Player::One, Move::new(PieceId(4), PieceId(5), p(0.2, 0.3)))
            .unwrap();

        assert_eq!(game.result(), Some(GameResult::Winner(Player::One)));
        assert_eq!(game.board().uncaptured_count(), 4);
    }

    #[test]
    fn test_total_then_colors_tiebreak() {
        let mut game = GameState::from_layout(
            GameConfig::with_size(3, 4),
            vec![
                vec![p(0.1, 0.1), p(0.3, 0.12), p(0.5, 0.1), p(0.7, 0.13)],
                vec![p(0.1, 0.5), p(0.3, 0.52), p(0.5, 0.5), p(0.7, 0.53)],
                vec![p(0.1, 0.9), p(0.3, 0.92), p(0.5, 0.9), p(0.7, 0.93)],
            ],
        )
        .unwrap();
        game.board.capture(PieceId(0), PieceId(1), p(0.2, 0.11), Player::One);
        game.board.capture(PieceId(2), PieceId(3), p(0.6, 0.115), Player::One);
        game.board.capture(PieceId(4), PieceId(5), p(0.2, 0.51), Player::Two);
        game.board.capture(PieceId(8), PieceId(9), p(0.2, 0.91), Player::Two);

        // 4 pieces each; Player Two has them in more colors
        assert_eq!(game.standing(), GameResult::Winner(Player::Two));

        game.config.scoring = ScoringRule::ColorMajorities;
        // Player One holds all four reds
        assert_eq!(game.standing(), GameResult::Winner(Player::One));
    }

    #[test]
    fn test_more_captures_wins() {
        let mut game = four_pairs(GameConfig::with_size(4, 2));
        assert_eq!(game.standing(), GameResult::Draw);
        game.board.capture(PieceId(0), PieceId(1), p(0.5, 0.125), Player::Two);
        assert_eq!(game.standing(), GameResult::Winner(Player::Two));
    }

    #[test]
    fn test_collect_remaining_at_game_end() {
        let config = GameConfig {
            tokens_per_player: Some(1),
            collect_remaining: true,
            ..GameConfig::with_size(4, 2)
        };
        let mut game = four_pairs(config);
        play(&mut game, Player::One, 0, 1);
        play(&mut game, Player::Two, 6, 7);

        assert!(game.is_game_over());
        assert_eq!(game.board().uncaptured_count(), 0);
        let one = game.board().tally(Player::One).total();
        let two = game.board().tally(Player::Two).total();
        assert_eq!(one + two, 8);
    }

    #[test]
    fn test_normalizer_accessors() {
        let game = cross_layout(GameConfig::with_size(2, 2));
        let physical = Point::new(850.0, 500.0);
        assert_eq!(game.normalize(physical), Point::new(0.5, 0.5));
        assert_eq!(game.unnormalize(Point::new(0.5, 0.5)), physical);
    }

    #[test]
    fn test_display_board() {
        let mut game = cross_layout(GameConfig {
            tokens_per_player: Some(3),
            ..GameConfig::with_size(2, 2)
        });
        play(&mut game, Player::One, 0, 1);
        let display = game.display_board();
        assert!(display.contains("Red     11"));
        assert!(display.contains("Green   .."));
        assert!(display.contains("Player 1: 2 pieces in 1 colors [2, 0], 2 tokens left"));
    }
}
