use clap::{Parser, Subcommand, ValueEnum};
use lacuna_arena::*;
use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lacuna-arena", about = "Lacuna bot arena")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Play a single game between two bots
    Play {
        #[arg(long, value_enum, default_value_t = BotKind::Greedy)]
        first: BotKind,
        #[arg(long, value_enum, default_value_t = BotKind::Random)]
        second: BotKind,
        #[arg(long, default_value_t = 7)]
        seed: u64,
        /// TOML game config; the classic rules are used when omitted
        #[arg(long)]
        config: Option<PathBuf>,
        /// Plugin library that replaces the second bot
        #[arg(long)]
        plugin: Option<PathBuf>,
        /// Print the final snapshot as JSON
        #[arg(long)]
        json: bool,
        #[arg(long, default_value_t = 2000)]
        time_per_move_ms: u64,
        #[arg(long, short)]
        verbose: bool,
    },
    /// Round robin between all built-in bots
    Tournament {
        #[arg(long, default_value_t = 20)]
        rounds: usize,
        #[arg(long, default_value_t = 1)]
        seed: u64,
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum BotKind {
    Random,
    MaxDistance,
    Greedy,
    MinDistance,
}

impl BotKind {
    const ALL: [BotKind; 4] = [
        BotKind::Random,
        BotKind::MaxDistance,
        BotKind::Greedy,
        BotKind::MinDistance,
    ];

    fn label(self) -> &'static str {
        match self {
            BotKind::Random => "RandomBot",
            BotKind::MaxDistance => "MaxDistanceBot",
            BotKind::Greedy => "GreedyBot",
            BotKind::MinDistance => "MinDistanceBot",
        }
    }

    fn build(self, seed: u64) -> Box<dyn Bot> {
        let name = self.label().to_string();
        match self {
            BotKind::Random => Box::new(RandomBot::with_seed(name, seed)),
            BotKind::MaxDistance => Box::new(MaxDistanceBot::new(name)),
            BotKind::Greedy => Box::new(GreedyBot::new(name)),
            BotKind::MinDistance => Box::new(MinDistanceBot::new(name)),
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<GameConfig, ConfigError> {
    match path {
        Some(path) => GameConfig::load(path),
        None => Ok(GameConfig::lacuna()),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match Cli::parse().command {
        Command::Play {
            first,
            second,
            seed,
            config,
            plugin,
            json,
            time_per_move_ms,
            verbose,
        } => {
            let rules = load_config(config.as_ref())?;
            let second_bot: Box<dyn Bot> = match plugin {
                Some(path) => Box::new(PluginBot::load(&path).inspect_err(
                    |e| tracing::warn!(path = %path.display(), error = %e, "plugin failed to load"),
                )?),
                None => second.build(seed.wrapping_add(1)),
            };
            let match_config = MatchConfig {
                time_per_move: Duration::from_millis(time_per_move_ms),
                verbose,
                ..MatchConfig::default()
            };

            println!("Lacuna Arena");
            println!("========================================\n");
            let mut game = Match::new(first.build(seed), second_bot, rules, seed, match_config)?;
            let result = game.play();

            println!("\n========================================");
            println!("Match Result:");
            match &result {
                MatchResult::Win {
                    winner_name,
                    player,
                    moves,
                } => {
                    println!("  {} wins as {} after {} moves", winner_name, player, moves);
                }
                MatchResult::Draw { moves } => {
                    println!("  Draw after {} moves", moves);
                }
                MatchResult::Timeout { violator, winner, .. } => {
                    println!("  {} wins by timeout (opponent: {})", winner, violator);
                }
                MatchResult::IllegalMove {
                    violator,
                    winner,
                    reason,
                    ..
                } => {
                    println!(
                        "  {} wins by illegal move (opponent: {}, {})",
                        winner, violator, reason
                    );
                }
                MatchResult::Resigned { violator, winner, .. } => {
                    println!("  {} wins by resignation (opponent: {})", winner, violator);
                }
            }
            println!("========================================");
            println!("{}", game.state().display_board());

            if json {
                println!("{}", serde_json::to_string_pretty(&game.state().snapshot())?);
            }
        }
        Command::Tournament {
            rounds,
            seed,
            config,
        } => {
            let rules = load_config(config.as_ref())?;
            let mut tournament = Tournament::new(MatchConfig::default(), rules, rounds, seed);
            for kind in BotKind::ALL {
                tournament.add_bot(
                    kind.label().to_string(),
                    Box::new(move |seed| kind.build(seed)),
                );
            }
            let results = tournament.run_round_robin()?;
            results.display();
        }
    }

    Ok(())
}
