use std::path::PathBuf;

use arena::prelude::*;
use clap::{Parser, Subcommand};

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Plays the hero arena from the terminal.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Arena server URL (overrides ARENA_BASE_URL)
    #[arg(long)]
    base_url: Option<String>,

    /// Credentials file (overrides ARENA_CREDENTIALS_PATH)
    #[arg(long)]
    credentials: Option<PathBuf>,
}

#[derive(Debug, PartialEq, Eq, Subcommand)]
enum Command {
    /// Show the player and hero roster (the default)
    Status,
    /// Create a hero
    Create {
        title: String,
        /// Free-text description; the remaining words are joined
        #[arg(num_args = 1.., required = true)]
        description: Vec<String>,
    },
    /// Send a hero into a fight
    Fight { hero_id: String },
    /// List a hero's past fights
    History { hero_id: String },
}

impl Cli {
    fn config(&self) -> Result<ClientConfig, ArenaError> {
        let mut config = ClientConfig::from_env()?;
        if let Some(url) = &self.base_url {
            config.base_url = url.clone();
        }
        if let Some(path) = &self.credentials {
            config.credentials_path = path.clone();
        }
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

fn print_status(state: &SessionState) {
    match &state.player {
        Some(player) => println!("player {} ({})", player.handle(), player.id),
        None => println!("no player ({})", state.status),
    }
    if state.roster.is_empty() {
        println!("no heroes yet; try `arena-cli create <title> <description>`");
    }
    for hero in &state.roster {
        println!("  {:<12} {:>5}  {} [{}]", hero.id, hero.rating, hero.title, hero.country);
    }
}

fn print_fight(fight: &Fight) {
    println!(
        "{}  {} ({}) vs {} ({})  {}",
        fight.timestamp.format("%Y-%m-%d %H:%M"),
        fight.attacker.title,
        fight.attacker.rating,
        fight.defender.title,
        fight.defender.rating,
        fight.outcome,
    );
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    arena::init_tracing();

    let config = cli.config()?;
    tracing::info!(base_url = %config.base_url, "connecting to arena");
    let client = ArenaClient::builder().config(config).build()?;
    client.bootstrap().await?;

    match cli.command.unwrap_or(Command::Status) {
        Command::Status => print_status(&client.snapshot().await),
        Command::Create { title, description } => {
            let hero = client.create_hero(&title, &description.join(" ")).await?;
            println!("created {} ({}), rating {}", hero.title, hero.id, hero.rating);
        }
        Command::Fight { hero_id } => {
            let report = client.start_fight(&HeroId::new(hero_id)).await?;
            print_fight(&report.fight);
            match report.rating_after {
                Some(rating) => println!("rating {:+} → {rating}", report.rating_delta),
                None => println!("rating {:+}", report.rating_delta),
            }
            if !report.fight.narrative.is_empty() {
                println!("\n{}", report.fight.narrative);
            }
        }
        Command::History { hero_id } => {
            let hero = HeroId::new(hero_id);
            let fights = client.history(&hero).collect(50).await?;
            if fights.is_empty() {
                println!("{hero} has not fought yet");
            }
            for fight in &fights {
                print_fight(fight);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("arena-cli").chain(args.iter().copied()))
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_without_subcommand_has_no_command() {
        assert_eq!(parse(&[]).unwrap().command, None);
        assert_eq!(parse(&["status"]).unwrap().command, Some(Command::Status));
    }

    #[test]
    fn test_parse_create_collects_description_words() {
        let cli = parse(&["create", "Musashi", "A", "wandering", "swordsman"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Command::Create {
                title: "Musashi".into(),
                description: vec!["A".into(), "wandering".into(), "swordsman".into()],
            })
        );
    }

    #[test]
    fn test_parse_fight_and_history() {
        assert_eq!(
            parse(&["fight", "h1"]).unwrap().command,
            Some(Command::Fight { hero_id: "h1".into() })
        );
        assert_eq!(
            parse(&["history", "h1"]).unwrap().command,
            Some(Command::History { hero_id: "h1".into() })
        );
    }

    #[test]
    fn test_parse_invalid_is_error() {
        assert!(parse(&["create", "Musashi"]).is_err());
        assert!(parse(&["fight"]).is_err());
        assert!(parse(&["dance"]).is_err());
    }

    #[test]
    fn test_parse_overrides_reach_config() {
        let cli = parse(&["--base-url", "https://arena.example.com", "--credentials", "/tmp/a.json"])
            .unwrap();
        let config = cli.config().unwrap();
        assert_eq!(config.base_url, "https://arena.example.com");
        assert_eq!(config.credentials_path, PathBuf::from("/tmp/a.json"));
    }
}
