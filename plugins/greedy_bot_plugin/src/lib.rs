use lacuna_arena::{Bot, Color, Move, PieceId, PlacementMode, Player, Point, Snapshot};
use std::time::Duration;

/// A greedy bot that chases color majorities
pub struct GreedyBotPlugin {
    name: String,
    seat: Option<Player>,
}

impl Default for GreedyBotPlugin {
    fn default() -> Self {
        Self {
            name: "GreedyPlugin".to_string(),
            seat: None,
        }
    }
}

impl GreedyBotPlugin {
    fn evaluate_capture(&self, snapshot: &Snapshot, me: Player, color: Color) -> i32 {
        let half = snapshot.rules.pieces_per_color / 2;
        let mine = snapshot.captures(me, color);
        let theirs = snapshot.captures(me.opponent(), color);

        if mine > half || theirs > half {
            // Color already decided, captures there only matter for totals
            return 0;
        }
        if mine + 2 > half {
            return 100; // Secures the majority
        }
        // Deny colors the opponent is close to winning
        10 + theirs as i32 - mine as i32
    }

    /// Sampled spots, or any open spot when the samples are all crowded.
    fn placements(snapshot: &Snapshot, a: PieceId, b: PieceId) -> Vec<Point> {
        let placements = snapshot.valid_placements(a, b, snapshot.rules.resolution);
        if placements.is_empty() && snapshot.rules.placement_mode == PlacementMode::Free {
            return snapshot.free_placement(a, b).into_iter().collect();
        }
        placements
    }

    fn length(snapshot: &Snapshot, a: PieceId, b: PieceId) -> f64 {
        match (snapshot.piece(a), snapshot.piece(b)) {
            (Some(pa), Some(pb)) => pa.position.distance(pb.position),
            _ => 0.0,
        }
    }
}

impl Bot for GreedyBotPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_move(&mut self, snapshot: &Snapshot, _time_limit: Duration) -> Option<Move> {
        let me = snapshot.active_player.or(self.seat)?;

        // Find the pair with the best evaluation, longer lines first on ties
        let (_, _, a, b) = snapshot
            .unobstructed_pairs()
            .filter(|&(_, a, b)| !Self::placements(snapshot, a, b).is_empty())
            .map(|(color, a, b)| {
                (
                    self.evaluate_capture(snapshot, me, color),
                    Self::length(snapshot, a, b),
                    a,
                    b,
                )
            })
            .max_by(|x, y| x.0.cmp(&y.0).then(x.1.total_cmp(&y.1)))?;

        let placements = Self::placements(snapshot, a, b);
        let point = placements[placements.len() / 2];
        Some(Move::new(a, b, point))
    }

    fn game_start(&mut self, player: Player) {
        self.seat = Some(player);
    }

    fn game_end(&mut self) {
        self.seat = None;
    }
}

// Export the bot plugin using the macro
lacuna_arena::export_bot!(GreedyBotPlugin);
