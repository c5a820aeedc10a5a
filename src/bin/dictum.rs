use std::{error::Error, time::Duration};

use clap::{Parser, Subcommand};
use dictum::{
    ConnectionConfig, Database, DictConnection, MatchingStrategy, protocol::DEFAULT_PORT,
};

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Dictionary server to query
    #[arg(long, default_value = "dict.org")]
    host: String,
    /// Server port
    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,
    /// Connect and read timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,
    #[command(subcommand)]
    command: Lookup,
}

#[derive(Debug, Subcommand)]
enum Lookup {
    /// List the databases offered by the server
    Databases,
    /// List the matching strategies supported by the server
    Strategies,
    /// Find words matching a pattern
    Match {
        word: String,
        #[arg(long, default_value = "prefix")]
        strategy: String,
        #[arg(long, default_value = "*")]
        database: String,
    },
    /// Print every definition of a word
    Define {
        word: String,
        #[arg(long, default_value = "*")]
        database: String,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let cli = Cli::parse();
    let mut config = ConnectionConfig::new(cli.host).port(cli.port);
    if let Some(secs) = cli.timeout {
        config = config
            .connect_timeout(Duration::from_secs(secs))
            .read_timeout(Duration::from_secs(secs));
    }

    let mut connection = DictConnection::connect_with(&config)?;

    match cli.command {
        Lookup::Databases => {
            let mut databases: Vec<Database> = connection.databases()?.into_values().collect();
            databases.sort_by(|a, b| a.name().cmp(b.name()));
            for database in databases {
                println!("{database}");
            }
        }
        Lookup::Strategies => {
            for strategy in connection.strategies()? {
                println!("{strategy}");
            }
        }
        Lookup::Match {
            word,
            strategy,
            database,
        } => {
            let words = connection.matches(
                &word,
                &MatchingStrategy::named(strategy),
                &Database::named(database),
            )?;
            for word in words {
                println!("{word}");
            }
        }
        Lookup::Define { word, database } => {
            let definitions = connection.define(&word, &Database::named(database))?;
            if definitions.is_empty() {
                eprintln!("no definitions found for '{word}'");
            }
            for definition in definitions {
                println!("{definition}");
            }
        }
    }

    connection.close();
    Ok(())
}
