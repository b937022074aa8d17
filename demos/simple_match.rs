use lacuna_arena::*;
use std::time::Duration;

fn main() {
    println!("Simple Lacuna Match Demo\n");

    // Create two bots
    let bot1 = Box::new(RandomBot::new("Random Alice".to_string()));
    let bot2 = Box::new(GreedyBot::new("Greedy Bob".to_string()));

    // Configure match with shorter time limits
    let config = MatchConfig {
        time_per_move: Duration::from_millis(500),
        verbose: true,
        ..MatchConfig::default()
    };

    // The classic rules on a board laid out from seed 7
    let mut match_game = match Match::new(bot1, bot2, GameConfig::lacuna(), 7, config) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Bad game config: {}", e);
            return;
        }
    };
    let result = match_game.play();

    // Print summary
    println!("\n{}", "=".repeat(60));
    match &result {
        MatchResult::Win {
            winner_name,
            player,
            moves,
        } => {
            println!("{} won as {} after {} moves!", winner_name, player, moves);
        }
        MatchResult::Draw { moves } => {
            println!("Draw after {} moves", moves);
        }
        MatchResult::Timeout { violator, winner, .. } => {
            println!("{} wins! {} timed out", winner, violator);
        }
        MatchResult::IllegalMove {
            violator,
            winner,
            reason,
            ..
        } => {
            println!("{} wins! {} made an illegal move: {}", winner, violator, reason);
        }
        MatchResult::Resigned { violator, winner, .. } => {
            println!("{} wins! {} resigned", winner, violator);
        }
    }
    println!("{}", "=".repeat(60));
    println!("{}", match_game.state().display_board());
}
