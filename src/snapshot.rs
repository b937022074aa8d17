//! Read-only view of a game handed to players.
//!
//! A `Snapshot` owns its data, so a bot can keep it, inspect it from another
//! thread, or serialize it without ever touching the live `GameState`.

use crate::board::{Color, PieceId, Player, Token};
use crate::config::PlacementMode;
use crate::game::GameState;
use crate::geometry::Point;
use crate::sampler;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieceView {
    pub id: PieceId,
    pub color: Color,
    pub position: Point,
    pub captured: bool,
    pub captured_by: Option<Player>,
}

/// The rule parameters a player needs to reason about placements.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RuleView {
    pub num_colors: usize,
    pub pieces_per_color: usize,
    pub epsilon: f64,
    pub occupancy_radius: f64,
    pub resolution: usize,
    pub placement_mode: PlacementMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub pieces_by_color: BTreeMap<Color, Vec<PieceView>>,
    /// Uncaptured pairs `(low id, high id)` with a clear line between them.
    pub unobstructed_pairs_by_color: BTreeMap<Color, BTreeSet<(PieceId, PieceId)>>,
    /// In placement order.
    pub tokens: Vec<Token>,
    /// `capture_counts[player][color]`
    pub capture_counts: [Vec<usize>; 2],
    /// `None` once the game is over.
    pub active_player: Option<Player>,
    /// `None` when tokens are unlimited.
    pub tokens_remaining: [Option<usize>; 2],
    pub rules: RuleView,
}

impl Snapshot {
    pub(crate) fn capture(state: &GameState) -> Self {
        let board = state.board();
        let config = state.config();

        let mut pieces_by_color: BTreeMap<Color, Vec<PieceView>> = Color::all(board.num_colors())
            .map(|color| (color, Vec::new()))
            .collect();
        for piece in board.pieces() {
            pieces_by_color
                .entry(piece.color())
                .or_default()
                .push(PieceView {
                    id: piece.id(),
                    color: piece.color(),
                    position: piece.position(),
                    captured: piece.is_captured(),
                    captured_by: piece.captured_by(),
                });
        }

        let unobstructed_pairs_by_color = Color::all(board.num_colors())
            .map(|color| {
                let pairs = board
                    .unobstructed_pairs(color, config.epsilon)
                    .into_iter()
                    .collect();
                (color, pairs)
            })
            .collect();

        Snapshot {
            pieces_by_color,
            unobstructed_pairs_by_color,
            tokens: board.tokens().to_vec(),
            capture_counts: [
                board.tally(Player::One).counts().to_vec(),
                board.tally(Player::Two).counts().to_vec(),
            ],
            active_player: state.current_player(),
            tokens_remaining: [
                state.tokens_remaining(Player::One),
                state.tokens_remaining(Player::Two),
            ],
            rules: RuleView {
                num_colors: config.num_colors,
                pieces_per_color: config.pieces_per_color,
                epsilon: config.epsilon,
                occupancy_radius: config.occupancy_radius(),
                resolution: config.resolution,
                placement_mode: config.placement_mode,
            },
        }
    }

    pub fn pieces(&self) -> impl Iterator<Item = &PieceView> {
        self.pieces_by_color.values().flatten()
    }

    pub fn piece(&self, id: PieceId) -> Option<&PieceView> {
        self.pieces().find(|p| p.id == id)
    }

    pub fn uncaptured(&self) -> impl Iterator<Item = &PieceView> {
        self.pieces().filter(|p| !p.captured)
    }

    pub fn captures(&self, player: Player, color: Color) -> usize {
        self.capture_counts[player.index()]
            .get(color.index())
            .copied()
            .unwrap_or(0)
    }

    /// Pieces and tokens a new token must stay clear of.
    pub fn occupants(&self) -> impl Iterator<Item = Point> + '_ {
        self.uncaptured()
            .map(|p| p.position)
            .chain(self.tokens.iter().map(|t| t.position))
    }

    /// Whether `a` and `b` form an uncaptured same-color pair with a clear line.
    pub fn is_unobstructed(&self, a: PieceId, b: PieceId) -> bool {
        let key = if a <= b { (a, b) } else { (b, a) };
        self.piece(a)
            .and_then(|p| self.unobstructed_pairs_by_color.get(&p.color))
            .is_some_and(|pairs| pairs.contains(&key))
    }

    /// All unobstructed pairs, color by color.
    pub fn unobstructed_pairs(&self) -> impl Iterator<Item = (Color, PieceId, PieceId)> + '_ {
        self.unobstructed_pairs_by_color
            .iter()
            .flat_map(|(&color, pairs)| pairs.iter().map(move |&(a, b)| (color, a, b)))
    }

    /// Same answer as `GameState::get_valid_placements` for the state this
    /// snapshot was taken from.
    pub fn valid_placements(&self, a: PieceId, b: PieceId, resolution: usize) -> Vec<Point> {
        if !self.is_unobstructed(a, b) {
            return Vec::new();
        }
        let (Some(pa), Some(pb)) = (self.piece(a), self.piece(b)) else {
            return Vec::new();
        };
        sampler::valid_placements(
            pa.position,
            pb.position,
            resolution,
            self.rules.epsilon,
            self.rules.occupancy_radius,
            self.occupants(),
        )
    }

    /// Same answer as `GameState::free_placement`: a point anywhere on the
    /// segment that free placement mode would accept.
    pub fn free_placement(&self, a: PieceId, b: PieceId) -> Option<Point> {
        if !self.is_unobstructed(a, b) {
            return None;
        }
        let (pa, pb) = (self.piece(a)?, self.piece(b)?);
        sampler::free_placement(
            pa.position,
            pb.position,
            self.rules.epsilon,
            self.rules.occupancy_radius,
            self.occupants(),
        )
    }

    pub fn is_game_over(&self) -> bool {
        self.active_player.is_none()
    }
}
