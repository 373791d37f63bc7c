use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::Result;
use tokio::io::{AsyncBufReadExt, BufReader};

use pokecache::config::Config;
use pokecache::logging;
use pokecache::pokeapi::{PokeApiClient, Upstream};
use pokecache::pokemon::{
  CreatePokemon, ErrorBody, Pagination, Pokemon, PokemonService, ServiceOptions, ServiceResult,
  UpdatePokemon,
};

#[derive(Parser, Debug)]
#[command(name = "pokecache")]
#[command(about = "A caching facade over the PokeAPI pokemon resource")]
#[command(version)]
struct Args {
  /// Path to config file (default: ./pokecache.yaml, then $XDG_CONFIG_HOME/pokecache/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  #[command(flatten)]
  Op(Operation),
  /// Run operations read from stdin, one per line, against a single cache
  Shell,
}

#[derive(Subcommand, Debug)]
enum Operation {
  /// List a page of pokemon
  List {
    #[arg(long, default_value_t = 10)]
    limit: u32,
    #[arg(long, default_value_t = 1)]
    page: u32,
  },
  /// Get a pokemon by id
  Get { id: u64 },
  /// Create a local pokemon
  Create {
    #[arg(long)]
    name: String,
    #[arg(long = "type")]
    pokemon_type: String,
    #[arg(long)]
    hp: Option<u32>,
    #[arg(long = "sprite")]
    sprites: Vec<String>,
  },
  /// Update fields of a pokemon
  Update {
    id: u64,
    #[arg(long)]
    name: Option<String>,
    #[arg(long = "type")]
    pokemon_type: Option<String>,
    #[arg(long)]
    hp: Option<u32>,
    #[arg(long = "sprite")]
    sprites: Vec<String>,
  },
  /// Remove a pokemon from the cache
  Remove { id: u64 },
}

/// One line of shell input
#[derive(Parser, Debug)]
#[command(no_binary_name = true)]
struct ShellLine {
  #[command(subcommand)]
  op: Operation,
}

enum Outcome {
  One(Pokemon),
  Page(Arc<Vec<Pokemon>>),
  Message(String),
}

fn non_empty(sprites: Vec<String>) -> Option<Vec<String>> {
  if sprites.is_empty() {
    None
  } else {
    Some(sprites)
  }
}

async fn execute<U: Upstream>(service: &PokemonService<U>, op: Operation) -> ServiceResult<Outcome> {
  match op {
    Operation::List { limit, page } => {
      let pagination = Pagination::new(limit, page)?;
      service.find_all(&pagination).await.map(Outcome::Page)
    }
    Operation::Get { id } => service.find_one(id).await.map(Outcome::One),
    Operation::Create {
      name,
      pokemon_type,
      hp,
      sprites,
    } => {
      let draft = CreatePokemon {
        name,
        pokemon_type,
        hit_points: hp,
        sprites: non_empty(sprites),
      };
      service.create(draft).await.map(Outcome::One)
    }
    Operation::Update {
      id,
      name,
      pokemon_type,
      hp,
      sprites,
    } => {
      let patch = UpdatePokemon {
        name,
        pokemon_type,
        hit_points: hp,
        sprites: non_empty(sprites),
      };
      service.update(id, patch).await.map(Outcome::One)
    }
    Operation::Remove { id } => service.remove(id).await.map(Outcome::Message),
  }
}

fn print_outcome(outcome: &Outcome) -> Result<()> {
  match outcome {
    Outcome::One(pokemon) => println!("{}", serde_json::to_string_pretty(pokemon)?),
    Outcome::Page(pokemons) => println!("{}", serde_json::to_string_pretty(pokemons.as_slice())?),
    Outcome::Message(message) => println!("{}", message),
  }
  Ok(())
}

async fn shell<U: Upstream>(service: &PokemonService<U>) -> Result<()> {
  let mut lines = BufReader::new(tokio::io::stdin()).lines();

  while let Some(line) = lines.next_line().await? {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
      continue;
    }
    if matches!(line, "quit" | "exit") {
      break;
    }

    let parsed = match ShellLine::try_parse_from(line.split_whitespace()) {
      Ok(parsed) => parsed,
      Err(e) => {
        eprintln!("{}", e);
        continue;
      }
    };

    match execute(service, parsed.op).await {
      Ok(outcome) => print_outcome(&outcome)?,
      Err(e) => println!("{}", serde_json::to_string(&ErrorBody::from(&e))?),
    }
  }

  Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Load configuration
  let config = Config::load(args.config.as_deref())?;
  let _log_guard = logging::init(&config.log)?;

  let client = PokeApiClient::new(&config.pokeapi)?;
  let service = PokemonService::new(client, ServiceOptions::from(&config));

  match args.command {
    Command::Shell => shell(&service).await,
    Command::Op(op) => {
      let outcome = execute(&service, op).await?;
      print_outcome(&outcome)
    }
  }
}
