use crate::board::Player;
use crate::bot::Bot;
use crate::config::{ConfigError, GameConfig};
use crate::game::{GameResult, GameState, Move, Phase};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct MatchConfig {
    pub time_per_move: Duration,
    /// Rejected moves a bot may replace before it forfeits.
    pub max_retries: usize,
    /// Print the board after every move.
    pub verbose: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        MatchConfig {
            time_per_move: Duration::from_secs(5),
            max_retries: 2,
            verbose: false,
        }
    }
}

/// How a single game ended. Forfeits record the seat of the bot at fault.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchResult {
    Win {
        winner_name: String,
        player: Player,
        moves: usize,
    },
    Draw {
        moves: usize,
    },
    Timeout {
        violator: String,
        winner: String,
        seat: Player,
    },
    IllegalMove {
        violator: String,
        winner: String,
        seat: Player,
        reason: String,
    },
    Resigned {
        violator: String,
        winner: String,
        seat: Player,
    },
}

impl MatchResult {
    pub fn winner(&self) -> Option<&str> {
        match self {
            MatchResult::Win { winner_name, .. } => Some(winner_name),
            MatchResult::Timeout { winner, .. } => Some(winner),
            MatchResult::IllegalMove { winner, .. } => Some(winner),
            MatchResult::Resigned { winner, .. } => Some(winner),
            MatchResult::Draw { .. } => None,
        }
    }

    /// The seat that won, whatever the reason.
    pub fn winning_seat(&self) -> Option<Player> {
        match self {
            MatchResult::Win { player, .. } => Some(*player),
            MatchResult::Timeout { seat, .. }
            | MatchResult::IllegalMove { seat, .. }
            | MatchResult::Resigned { seat, .. } => Some(seat.opponent()),
            MatchResult::Draw { .. } => None,
        }
    }
}

/// One game between two bots. The first bot plays as Player 1.
pub struct Match {
    config: MatchConfig,
    state: GameState,
    first: Box<dyn Bot>,
    second: Box<dyn Bot>,
}

impl Match {
    pub fn new(
        first: Box<dyn Bot>,
        second: Box<dyn Bot>,
        game: GameConfig,
        seed: u64,
        config: MatchConfig,
    ) -> Result<Self, ConfigError> {
        Ok(Self::from_state(first, second, GameState::new(game, seed)?, config))
    }

    pub fn from_state(
        first: Box<dyn Bot>,
        second: Box<dyn Bot>,
        state: GameState,
        config: MatchConfig,
    ) -> Self {
        Match {
            config,
            state,
            first,
            second,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    fn bot(&self, player: Player) -> &dyn Bot {
        match player {
            Player::One => self.first.as_ref(),
            Player::Two => self.second.as_ref(),
        }
    }

    pub fn play(&mut self) -> MatchResult {
        self.first.game_start(Player::One);
        self.second.game_start(Player::Two);

        info!(
            first = self.first.name(),
            second = self.second.name(),
            "match starting"
        );
        if self.config.verbose {
            println!("Initial board:");
            println!("{}", self.state.display_board());
        }

        let result = self.run();

        self.first.game_end();
        self.second.game_end();
        info!(?result, "match finished");
        result
    }

    fn run(&mut self) -> MatchResult {
        loop {
            let result = match self.state.phase() {
                Phase::InProgress(player) => match self.play_turn(player) {
                    Some(forfeit) => return forfeit,
                    None => continue,
                },
                Phase::GameOver(result) => result,
            };

            let moves = self.state.move_count();
            return match result {
                GameResult::Winner(player) => MatchResult::Win {
                    winner_name: self.bot(player).name().to_string(),
                    player,
                    moves,
                },
                GameResult::Draw => MatchResult::Draw { moves },
            };
        }
    }

    /// Ask the active bot for a move and apply it, re-prompting after a
    /// rejection. Returns a result only when the bot forfeits.
    fn play_turn(&mut self, player: Player) -> Option<MatchResult> {
        let snapshot = self.state.snapshot();
        let time_limit = self.config.time_per_move;
        let violator = self.bot(player).name().to_string();
        let winner = self.bot(player.opponent()).name().to_string();
        let mut attempt = 0;

        loop {
            let bot = match player {
                Player::One => &mut self.first,
                Player::Two => &mut self.second,
            };
            let start = Instant::now();
            let mv = bot.get_move(&snapshot, time_limit);
            let elapsed = start.elapsed();

            if elapsed > time_limit {
                warn!(bot = %violator, ?elapsed, limit = ?time_limit, "timeout");
                return Some(MatchResult::Timeout {
                    violator,
                    winner,
                    seat: player,
                });
            }

            let Some(mv) = mv else {
                warn!(bot = %violator, "returned no move");
                return Some(MatchResult::Resigned {
                    violator,
                    winner,
                    seat: player,
                });
            };

            match self.state.apply_move(player, mv) {
                Ok(outcome) => {
                    debug!(bot = %violator, %mv, color = %outcome.color, ?elapsed, "move played");
                    self.notify(mv);
                    if self.config.verbose {
                        println!("{} plays {}", violator, mv);
                        println!("{}", self.state.display_board());
                    }
                    return None;
                }
                Err(e) if attempt < self.config.max_retries => {
                    attempt += 1;
                    warn!(bot = %violator, %mv, error = %e, attempt, "illegal move, asking again");
                }
                Err(e) => {
                    warn!(bot = %violator, %mv, error = %e, "illegal move");
                    return Some(MatchResult::IllegalMove {
                        violator,
                        winner,
                        seat: player,
                        reason: e.to_string(),
                    });
                }
            }
        }
    }

    fn notify(&mut self, mv: Move) {
        self.first.notify_move(mv);
        self.second.notify_move(mv);
    }
}

/// Builds a fresh bot for each game from a seed.
pub type BotFactory = Box<dyn Fn(u64) -> Box<dyn Bot>>;

/// Two games on the same layout with the seats swapped.
/// A bot wins the pairing only by winning both games.
#[derive(Debug, Clone)]
pub struct Pairing {
    pub first: String,
    pub second: String,
    pub games: [MatchResult; 2],
}

impl Pairing {
    pub fn play(
        first: (&str, &BotFactory),
        second: (&str, &BotFactory),
        game: &GameConfig,
        seed: u64,
        config: &MatchConfig,
    ) -> Result<Self, ConfigError> {
        let (first_name, first_factory) = first;
        let (second_name, second_factory) = second;
        let bot_seed = seed.wrapping_add(1);

        let opening = Match::new(
            first_factory(bot_seed),
            second_factory(bot_seed),
            game.clone(),
            seed,
            config.clone(),
        )?
        .play();
        let swapped = Match::new(
            second_factory(bot_seed),
            first_factory(bot_seed),
            game.clone(),
            seed,
            config.clone(),
        )?
        .play();

        let pairing = Pairing {
            first: first_name.to_string(),
            second: second_name.to_string(),
            games: [opening, swapped],
        };
        info!(
            first = first_name,
            second = second_name,
            winner = pairing.winner().unwrap_or("draw"),
            "pairing finished"
        );
        Ok(pairing)
    }

    pub fn winner(&self) -> Option<&str> {
        match (self.games[0].winning_seat(), self.games[1].winning_seat()) {
            (Some(Player::One), Some(Player::Two)) => Some(&self.first),
            (Some(Player::Two), Some(Player::One)) => Some(&self.second),
            _ => None,
        }
    }
}

pub struct Tournament {
    bots: Vec<(String, BotFactory)>,
    config: MatchConfig,
    game: GameConfig,
    rounds: usize,
    seed: u64,
}

impl Tournament {
    pub fn new(config: MatchConfig, game: GameConfig, rounds: usize, seed: u64) -> Self {
        Tournament {
            bots: Vec::new(),
            config,
            game,
            rounds,
            seed,
        }
    }

    /// Names identify bots in the results and should be unique.
    pub fn add_bot(&mut self, name: String, factory: BotFactory) {
        self.bots.push((name, factory));
    }

    /// Every pair of bots plays `rounds` pairings, each on a fresh layout.
    pub fn run_round_robin(&self) -> Result<TournamentResults, ConfigError> {
        let names = self.bots.iter().map(|(name, _)| name.clone()).collect();
        let mut results = TournamentResults::new(names);
        let mut seed = self.seed;

        for i in 0..self.bots.len() {
            for j in (i + 1)..self.bots.len() {
                let (first_name, first) = &self.bots[i];
                let (second_name, second) = &self.bots[j];
                for round in 0..self.rounds {
                    debug!(first = %first_name, second = %second_name, round, seed, "pairing");
                    let pairing = Pairing::play(
                        (first_name.as_str(), first),
                        (second_name.as_str(), second),
                        &self.game,
                        seed,
                        &self.config,
                    )?;
                    seed = seed.wrapping_add(2);

                    let winner = pairing.winner().map(|name| name == first_name.as_str());
                    match winner {
                        Some(true) => results.record(i, j, Outcome::Win),
                        Some(false) => results.record(i, j, Outcome::Loss),
                        None => results.record(i, j, Outcome::Draw),
                    }
                }
            }
        }

        Ok(results)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Win,
    Draw,
    Loss,
}

/// Pairing record of one bot against another.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Record {
    pub wins: usize,
    pub draws: usize,
    pub losses: usize,
}

#[derive(Debug)]
pub struct TournamentResults {
    names: Vec<String>,
    /// `records[i][j]` is bot `i`'s record against bot `j`.
    records: Vec<Vec<Record>>,
}

impl TournamentResults {
    pub fn new(names: Vec<String>) -> Self {
        let n = names.len();
        TournamentResults {
            names,
            records: vec![vec![Record::default(); n]; n],
        }
    }

    fn record(&mut self, i: usize, j: usize, outcome: Outcome) {
        match outcome {
            Outcome::Win => {
                self.records[i][j].wins += 1;
                self.records[j][i].losses += 1;
            }
            Outcome::Loss => {
                self.records[i][j].losses += 1;
                self.records[j][i].wins += 1;
            }
            Outcome::Draw => {
                self.records[i][j].draws += 1;
                self.records[j][i].draws += 1;
            }
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn get(&self, bot: &str, opponent: &str) -> Option<Record> {
        let i = self.names.iter().position(|n| n == bot)?;
        let j = self.names.iter().position(|n| n == opponent)?;
        (i != j).then(|| self.records[i][j])
    }

    /// Win/draw/loss matrix, one row per bot.
    pub fn table(&self) -> String {
        let cell = |i: usize, j: usize| {
            if i == j {
                "-".to_string()
            } else {
                let r = self.records[i][j];
                format!("W:{},D:{},L:{}", r.wins, r.draws, r.losses)
            }
        };
        let width = (0..self.names.len())
            .flat_map(|i| (0..self.names.len()).map(move |j| (i, j)))
            .map(|(i, j)| cell(i, j).len())
            .chain(self.names.iter().map(|n| n.len()))
            .max()
            .unwrap_or(1);

        let mut out = format!("| {:<width$} |", "");
        for name in &self.names {
            out.push_str(&format!(" {:<width$} |", name));
        }
        out.push('\n');
        for (i, name) in self.names.iter().enumerate() {
            out.push_str(&format!("| {:<width$} |", name));
            for j in 0..self.names.len() {
                out.push_str(&format!(" {:<width$} |", cell(i, j)));
            }
            out.push('\n');
        }
        out
    }

    pub fn display(&self) {
        println!("\nTournament Results:");
        println!("==================");
        print!("{}", self.table());
    }
}
