// Re-runs logged Spacey Snake turns through the current decision cascade
//
//   replay <log_file> (--all | --turns 3,7 | --validate 3:up,7:left|down)
//          [--game <id>] [--config <path>] [--verbose]

use std::env;
use std::process;

use spacey_snake::config::Config;
use spacey_snake::replay::ReplayEngine;
use spacey_snake::types::Direction;

enum Mode {
    All,
    Turns(Vec<i32>),
    Validate(Vec<(i32, Vec<Direction>)>),
}

struct Options {
    log_file: String,
    config_path: String,
    game: Option<String>,
    verbose: bool,
    mode: Mode,
}

const USAGE: &str = "\
replay <log_file> MODE [OPTIONS]

MODE (pick one):
  --all                    re-decide every logged turn
  --turns 3,7,12           re-decide only these turns
  --validate 3:up,7:left   check logged moves; 'left|down' accepts either

OPTIONS:
  --game <id>              skip entries from other games
  --config <path>          decision constants (default: Snake.toml)
  --verbose                print every turn, not just mismatches
  --help";

fn parse_turn(s: &str) -> Result<i32, String> {
    s.trim()
        .parse::<i32>()
        .map_err(|e| format!("bad turn '{}': {}", s, e))
}

fn parse_expectation(item: &str) -> Result<(i32, Vec<Direction>), String> {
    let (turn, moves) = item
        .split_once(':')
        .ok_or_else(|| format!("bad expectation '{}', want turn:move", item))?;
    let moves = moves
        .split('|')
        .map(|m| Direction::parse(m.trim()))
        .collect::<Result<Vec<_>, _>>()?;
    Ok((parse_turn(turn)?, moves))
}

fn parse_args(args: &[String]) -> Result<Options, String> {
    let mut rest = args.iter().skip(1);
    let log_file = rest.next().ok_or("missing log file")?.clone();

    let mut config_path = "Snake.toml".to_string();
    let mut game = None;
    let mut verbose = false;
    let mut mode = None;

    while let Some(flag) = rest.next() {
        let mut value = || {
            rest.next()
                .cloned()
                .ok_or_else(|| format!("{} needs a value", flag))
        };
        match flag.as_str() {
            "--all" => mode = Some(Mode::All),
            "--turns" => {
                let turns = value()?
                    .split(',')
                    .map(parse_turn)
                    .collect::<Result<Vec<_>, _>>()?;
                mode = Some(Mode::Turns(turns));
            }
            "--validate" => {
                let expected = value()?
                    .split(',')
                    .map(|item| parse_expectation(item.trim()))
                    .collect::<Result<Vec<_>, _>>()?;
                mode = Some(Mode::Validate(expected));
            }
            "--game" => game = Some(value()?),
            "--config" => config_path = value()?,
            "--verbose" => verbose = true,
            other => return Err(format!("unknown option '{}'", other)),
        }
    }

    Ok(Options {
        log_file,
        config_path,
        game,
        verbose,
        mode: mode.ok_or("one of --all, --turns or --validate is required")?,
    })
}

fn fail(message: String) -> ! {
    eprintln!("replay: {}", message);
    process::exit(1);
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.iter().any(|a| a == "--help") {
        println!("{}", USAGE);
        return;
    }
    let options = parse_args(&args).unwrap_or_else(|e| {
        eprintln!("{}\n", USAGE);
        fail(e)
    });

    let config = Config::from_file(&options.config_path).unwrap_or_else(|e| {
        eprintln!("{}; replaying with built-in defaults", e);
        Config::default_hardcoded()
    });
    let engine = ReplayEngine::new(config, options.verbose);

    let mut entries = engine
        .load_log_file(&options.log_file)
        .unwrap_or_else(|e| fail(e));
    if let Some(game) = &options.game {
        entries.retain(|e| &e.game_id == game);
    }
    if entries.is_empty() {
        fail(format!("no entries to replay in {}", options.log_file));
    }
    println!("{}: {} entries\n", options.log_file, entries.len());

    match options.mode {
        Mode::All => engine.print_report(&engine.replay_all(&entries)),
        Mode::Turns(turns) => match engine.replay_turns(&entries, &turns) {
            Ok(results) => engine.print_report(&results),
            Err(e) => fail(e),
        },
        Mode::Validate(expected) => match engine.validate_expected_moves(&entries, &expected) {
            Ok(()) => println!("{} expected move(s) matched", expected.len()),
            Err(e) => fail(e),
        },
    }
}
