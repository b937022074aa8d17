//! Example of how to write your own bot against the snapshot API

use lacuna_arena::*;
use std::time::Duration;

/// A custom bot that drops its token as close to the board center as it can
pub struct CenterBot {
    name: String,
}

impl CenterBot {
    pub fn new(name: String) -> Self {
        CenterBot { name }
    }

    fn distance_to_center(point: Point) -> f64 {
        point.distance(Point::new(0.5, 0.5))
    }

    /// Every legal spot on a pair, falling back to an open point between
    /// the samples when free placement allows it.
    fn spots(snapshot: &Snapshot, a: PieceId, b: PieceId) -> Vec<Point> {
        let spots = snapshot.valid_placements(a, b, snapshot.rules.resolution);
        if spots.is_empty() && snapshot.rules.placement_mode == PlacementMode::Free {
            return snapshot.free_placement(a, b).into_iter().collect();
        }
        spots
    }
}

impl Bot for CenterBot {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_move(&mut self, snapshot: &Snapshot, _time_limit: Duration) -> Option<Move> {
        // Find best move according to our heuristic
        snapshot
            .unobstructed_pairs()
            .flat_map(|(_, a, b)| {
                Self::spots(snapshot, a, b)
                    .into_iter()
                    .map(move |point| Move::new(a, b, point))
            })
            .min_by(|x, y| {
                Self::distance_to_center(x.point).total_cmp(&Self::distance_to_center(y.point))
            })
    }

    fn game_start(&mut self, player: Player) {
        println!("{} starting as {}", self.name, player);
    }
}

fn main() {
    println!("Custom Bot Example\n");

    let bot1 = Box::new(CenterBot::new("CenterBot".to_string()));
    let bot2 = Box::new(GreedyBot::new("GreedyBot".to_string()));

    let config = MatchConfig {
        time_per_move: Duration::from_secs(1),
        ..MatchConfig::default()
    };

    let mut match_game = match Match::new(bot1, bot2, GameConfig::with_size(5, 5), 42, config) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Bad game config: {}", e);
            return;
        }
    };
    let result = match_game.play();

    println!("\nMatch completed!");
    if let Some(winner) = result.winner() {
        println!("Winner: {}", winner);
    } else {
        println!("Draw!");
    }
}
