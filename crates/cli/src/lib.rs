pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "pizzeria",
    about = "Pizzeria operator CLI",
    long_about = "Recommend party orders, inspect the menu, manage the database, and run an order smoke test.",
    after_help = "Examples:\n  pizzeria recommend --adults 3 --children 2\n  pizzeria menu\n  pizzeria smoke"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Recommend how many large pizzas a party needs")]
    Recommend {
        #[arg(long, default_value_t = 0, allow_negative_numbers = true, help = "Adults in the party")]
        adults: i64,
        #[arg(long, default_value_t = 0, allow_negative_numbers = true, help = "Children in the party")]
        children: i64,
    },
    #[command(about = "List the pizzas on the menu with their toppings")]
    Menu,
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Load the deterministic demo catalog and verify it")]
    Seed,
    #[command(about = "Place and cancel a demo order with per-check timing details")]
    Smoke,
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Recommend { adults, children } => commands::recommend::run(adults, children),
        Command::Menu => commands::menu::run(),
        Command::Migrate => commands::migrate::run(),
        Command::Seed => commands::seed::run(),
        Command::Smoke => commands::smoke::run(),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{Cli, Command};

    #[test]
    fn recommend_accepts_negative_counts_for_validation() {
        let args = ["pizzeria", "recommend", "--adults", "-1", "--children", "2"];
        let cli = Cli::try_parse_from(args).expect("parse");

        assert!(matches!(cli.command, Command::Recommend { adults: -1, children: 2 }));
    }

    #[test]
    fn recommend_defaults_to_empty_party() {
        let cli = Cli::try_parse_from(["pizzeria", "recommend"]).expect("parse");

        assert!(matches!(cli.command, Command::Recommend { adults: 0, children: 0 }));
    }
}
