use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

use clap::{Arg, ArgAction, Command};
use idmap::config::{self, load_config};
use idmap::{normalize_key, IdentifierMap, LogLevel, Logger};

fn build_command() -> Command {
    Command::new("idmap-cli")
        .about("Look up identifiers in a tab-delimited id map")
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("Path to KEY=VALUE config file (MAP_FILE, LOG_LEVEL, LOG_CONSOLE, HOST_NAME)"),
        )
        .arg(
            Arg::new("map")
                .long("map")
                .short('m')
                .help("Path to the id map file (overrides MAP_FILE)"),
        )
        .arg(
            Arg::new("normalize")
                .long("normalize")
                .help("Trim and uppercase identifiers before lookup")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("keys")
                .long("keys")
                .help("Print every loaded identifier and exit")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("ids")
                .help("Identifiers to look up; reads stdin when omitted")
                .num_args(0..)
                .index(1),
        )
}

fn format_result(id: &str, values: &[String]) -> String {
    let mut line = id.to_string();
    for value in values {
        line.push('\t');
        line.push_str(value);
    }
    line
}

fn lookup(map: &IdentifierMap, raw: &str, normalize: bool) -> String {
    if normalize {
        let id = normalize_key(raw);
        format_result(&id, map.get(&id))
    } else {
        format_result(raw, map.get(raw))
    }
}

// Client tool reports failures on stderr and exits non-zero rather than panicking
fn main() {
    let matches = build_command().get_matches();

    let settings = match matches.get_one::<String>("config") {
        Some(path) => match load_config(path) {
            Ok(settings) => settings,
            Err(e) => {
                eprintln!("{}", e);
                std::process::exit(1);
            }
        },
        None => HashMap::new(),
    };

    let log_level = LogLevel::from_str(settings.get("LOG_LEVEL").map_or("WARN", |v| v.as_str()));
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(log_level.as_tracing())
        .init();

    let map_path = match matches.get_one::<String>("map") {
        Some(path) => path.clone(),
        None => match config::require(&settings, "MAP_FILE") {
            Ok(path) => path.to_string(),
            Err(e) => {
                eprintln!("{} (pass --map or set MAP_FILE)", e);
                std::process::exit(1);
            }
        },
    };

    let mut map = match IdentifierMap::load(&map_path) {
        Ok(map) => map,
        Err(e) => {
            eprintln!("Failed to load id map: {}", e);
            std::process::exit(1);
        }
    };

    if config::flag(&settings, "LOG_CONSOLE", false) {
        let host = settings
            .get("HOST_NAME")
            .cloned()
            .unwrap_or_else(|| "idmap-cli".to_string());
        map = map.with_sink(Arc::new(Logger::new(host, log_level, true)));
    }

    let normalize = matches.get_flag("normalize");

    if matches.get_flag("keys") {
        let mut keys: Vec<&str> = map.keys().into_iter().collect();
        keys.sort_unstable();
        for key in keys {
            println!("{}", key);
        }
        return;
    }

    if let Some(ids) = matches.get_many::<String>("ids") {
        for id in ids {
            println!("{}", lookup(&map, id, normalize));
        }
        return;
    }

    if let Err(e) = interactive(&map, normalize) {
        eprintln!("Error reading stdin: {}", e);
        std::process::exit(1);
    }
}

fn interactive(map: &IdentifierMap, normalize: bool) -> io::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    print!("?> ");
    stdout.flush()?;

    for line in stdin.lock().lines() {
        let line = line?;
        if !line.trim().is_empty() {
            println!("{}", lookup(map, &line, normalize));
        }
        print!("?> ");
        stdout.flush()?;
    }
    println!();
    Ok(())
}
