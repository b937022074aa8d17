use crate::board::{Color, PieceId, Player};
use crate::config::PlacementMode;
use crate::game::Move;
use crate::geometry::Point;
use crate::snapshot::Snapshot;
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use std::time::Duration;
use tracing::debug;

/// Trait that all players must implement
pub trait Bot: Send {
    /// Get the name of the bot
    fn name(&self) -> &str;

    /// Choose a move for the active player in `snapshot`.
    /// The bot has a time limit to respond; `None` resigns.
    fn get_move(&mut self, snapshot: &Snapshot, time_limit: Duration) -> Option<Move>;

    /// Notified when the game starts
    fn game_start(&mut self, _player: Player) {}

    /// Notified when a move is made (by either player)
    fn notify_move(&mut self, _mv: Move) {}

    /// Notified when the game ends
    fn game_end(&mut self) {}
}

/// A pair that can actually be played, with the placements it allows.
struct Candidate {
    color: Color,
    a: PieceId,
    b: PieceId,
    length_sq: f64,
    placements: Vec<Point>,
}

impl Candidate {
    fn middle(&self) -> Move {
        Move::new(self.a, self.b, self.placements[self.placements.len() / 2])
    }

    fn first(&self) -> Move {
        Move::new(self.a, self.b, self.placements[0])
    }
}

/// Every unobstructed pair with at least one valid placement. In free
/// placement mode a pair whose samples are all crowded still counts when
/// some other point on it is open.
fn candidates(snapshot: &Snapshot) -> Vec<Candidate> {
    let resolution = snapshot.rules.resolution;
    let free = snapshot.rules.placement_mode == PlacementMode::Free;
    snapshot
        .unobstructed_pairs()
        .filter_map(|(color, a, b)| {
            let mut placements = snapshot.valid_placements(a, b, resolution);
            if placements.is_empty() && free {
                placements.extend(snapshot.free_placement(a, b));
            }
            if placements.is_empty() {
                return None;
            }
            let pa = snapshot.piece(a)?.position;
            let pb = snapshot.piece(b)?.position;
            Some(Candidate {
                color,
                a,
                b,
                length_sq: pa.distance_squared(pb),
                placements,
            })
        })
        .collect()
}

/// Colors ordered by how much the active player leads in them, best first.
/// A color somebody already holds the majority of is ranked last.
fn greedy_color_order(snapshot: &Snapshot) -> Vec<Color> {
    let Some(me) = snapshot.active_player else {
        return Vec::new();
    };
    let ppc = snapshot.rules.pieces_per_color;
    let decided_at = ppc / 2 + 1;
    let score = |color: Color| -> i64 {
        let mine = snapshot.captures(me, color);
        let theirs = snapshot.captures(me.opponent(), color);
        if mine < decided_at && theirs < decided_at {
            mine as i64 - theirs as i64
        } else {
            -(ppc as i64)
        }
    };
    let mut colors: Vec<Color> = Color::all(snapshot.rules.num_colors).collect();
    // stable sort keeps color index order among equal scores
    colors.sort_by_key(|&color| std::cmp::Reverse(score(color)));
    colors
}

/// Picks a random playable pair and a random placement along it.
pub struct RandomBot {
    name: String,
    rng: ChaCha8Rng,
}

impl RandomBot {
    pub fn new(name: String) -> Self {
        RandomBot {
            name,
            rng: ChaCha8Rng::from_entropy(),
        }
    }

    pub fn with_seed(name: String, seed: u64) -> Self {
        RandomBot {
            name,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    fn pick(&mut self, snapshot: &Snapshot) -> Option<Move> {
        let candidates = candidates(snapshot);
        let candidate = candidates.choose(&mut self.rng)?;
        let point = *candidate.placements.choose(&mut self.rng)?;
        Some(Move::new(candidate.a, candidate.b, point))
    }
}

impl Bot for RandomBot {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_move(&mut self, snapshot: &Snapshot, _time_limit: Duration) -> Option<Move> {
        self.pick(snapshot)
    }
}

/// Takes the longest playable line, token in the middle.
pub struct MaxDistanceBot {
    name: String,
    fallback: RandomBot,
}

impl MaxDistanceBot {
    pub fn new(name: String) -> Self {
        MaxDistanceBot {
            fallback: RandomBot::new(format!("{} (fallback)", name)),
            name,
        }
    }
}

impl Bot for MaxDistanceBot {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_move(&mut self, snapshot: &Snapshot, time_limit: Duration) -> Option<Move> {
        let best = candidates(snapshot)
            .into_iter()
            .max_by(|x, y| x.length_sq.total_cmp(&y.length_sq));
        match best {
            Some(candidate) => Some(candidate.middle()),
            None => {
                debug!(bot = %self.name, "no candidate, doing random move");
                self.fallback.get_move(snapshot, time_limit)
            }
        }
    }
}

/// Works the colors it leads in, taking the longest line in the first
/// color that has one.
pub struct GreedyBot {
    name: String,
    fallback: RandomBot,
}

impl GreedyBot {
    pub fn new(name: String) -> Self {
        GreedyBot {
            fallback: RandomBot::new(format!("{} (fallback)", name)),
            name,
        }
    }
}

impl Bot for GreedyBot {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_move(&mut self, snapshot: &Snapshot, time_limit: Duration) -> Option<Move> {
        let candidates = candidates(snapshot);
        for color in greedy_color_order(snapshot) {
            let best = candidates
                .iter()
                .filter(|c| c.color == color)
                .max_by(|x, y| x.length_sq.total_cmp(&y.length_sq));
            if let Some(candidate) = best {
                return Some(candidate.middle());
            }
        }
        debug!(bot = %self.name, "no candidate, doing random move");
        self.fallback.get_move(snapshot, time_limit)
    }
}

/// The greedy strategy turned upside down: worst colors first, shortest
/// line, token at the first free spot. Useful as a weak baseline.
pub struct MinDistanceBot {
    name: String,
    fallback: RandomBot,
}

impl MinDistanceBot {
    pub fn new(name: String) -> Self {
        MinDistanceBot {
            fallback: RandomBot::new(format!("{} (fallback)", name)),
            name,
        }
    }
}

impl Bot for MinDistanceBot {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_move(&mut self, snapshot: &Snapshot, time_limit: Duration) -> Option<Move> {
        let candidates = candidates(snapshot);
        for color in greedy_color_order(snapshot).into_iter().rev() {
            let worst = candidates
                .iter()
                .filter(|c| c.color == color)
                .min_by(|x, y| x.length_sq.total_cmp(&y.length_sq));
            if let Some(candidate) = worst {
                return Some(candidate.first());
            }
        }
        debug!(bot = %self.name, "no candidate, doing random move");
        self.fallback.get_move(snapshot, time_limit)
    }
}
