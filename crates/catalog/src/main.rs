use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{SystemTime, UNIX_EPOCH};

use games_catalog::{add_games, resolve_root, AddGamesOptions, ROOT_ENV_VAR};
use tracing::error;
use tracing_subscriber::EnvFilter;

struct CliArgs {
    root: Option<PathBuf>,
    night: Option<String>,
    dry_run: bool,
}

fn main() -> ExitCode {
    init_tracing();
    let args = match parse_args(env::args().skip(1).collect()) {
        Ok(Some(args)) => args,
        Ok(None) => {
            println!("{}", usage_text());
            return ExitCode::SUCCESS;
        }
        Err(message) => {
            eprintln!("{message}\n\n{}", usage_text());
            return ExitCode::FAILURE;
        }
    };

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!(error = %message, "add_games_failed");
            ExitCode::FAILURE
        }
    }
}

fn run(args: CliArgs) -> Result<(), String> {
    let cwd = env::current_dir().map_err(|error| format!("cannot read current dir: {error}"))?;
    let root = resolve_root(args.root, env::var(ROOT_ENV_VAR).ok(), &cwd)
        .map_err(|error| error.to_string())?;
    let options = AddGamesOptions {
        root,
        night: args.night,
        dry_run: args.dry_run,
        created_date: today_utc(),
    };
    let report = add_games(&options).map_err(|error| error.to_string())?;

    for entry in &report.added {
        println!("added {} path:{}", entry.id, entry.path);
    }
    let mode = if options.dry_run { " (dry run)" } else { "" };
    println!(
        "add_games: {} new, {} total in {}{mode}",
        report.added.len(),
        report.total,
        report.index_path.display()
    );
    Ok(())
}

fn parse_args(args: Vec<String>) -> Result<Option<CliArgs>, String> {
    let mut parsed = CliArgs {
        root: None,
        night: None,
        dry_run: false,
    };
    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(None),
            "--root" => {
                let value = iter.next().ok_or("missing value for --root")?;
                parsed.root = Some(PathBuf::from(value));
            }
            "--night" => {
                parsed.night = Some(iter.next().ok_or("missing value for --night")?);
            }
            "--dry-run" => parsed.dry_run = true,
            other => return Err(format!("unknown argument '{other}'")),
        }
    }
    Ok(Some(parsed))
}

fn usage_text() -> &'static str {
    "add_games - append new game builds to games-index.json\n\n\
     Usage:\n  add_games [--root <dir>] [--night <night>] [--dry-run]\n\n\
     Root: --root, else ARCADE_ROOT, else the nearest ancestor holding games-index.json or games/"
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn today_utc() -> String {
    let days = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs() / 86_400)
        .unwrap_or(0);
    let (year, month, day) = civil_from_days(days as i64);
    format!("{year:04}-{month:02}-{day:02}")
}

/// Days since 1970-01-01 to a proleptic Gregorian date.
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn civil_dates_match_known_days() {
        assert_eq!(civil_from_days(0), (1970, 1, 1));
        assert_eq!(civil_from_days(11_016), (2000, 2, 29));
        assert_eq!(civil_from_days(20_745), (2026, 10, 19));
    }

    #[test]
    fn args_parse_flags_and_reject_unknowns() {
        let parsed = parse_args(vec![
            "--night".to_string(),
            "night-3".to_string(),
            "--dry-run".to_string(),
        ])
        .expect("parse")
        .expect("not help");
        assert_eq!(parsed.night.as_deref(), Some("night-3"));
        assert!(parsed.dry_run);
        assert!(parsed.root.is_none());

        assert!(parse_args(vec!["--help".to_string()]).expect("help").is_none());
        assert!(parse_args(vec!["--bogus".to_string()]).is_err());
        assert!(parse_args(vec!["--root".to_string()]).is_err());
    }
}
