use std::env;
use std::io;
use std::process::ExitCode;

use harness_cli::{run, CommandKind, CommonOptions, PlaytestOptions};

fn main() -> ExitCode {
    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::from(1)
        }
    }
}

fn run_cli() -> Result<(), String> {
    let args = env::args().skip(1).collect::<Vec<_>>();
    if args.is_empty() {
        return Err(usage_text());
    }
    if args[0] == "-h" || args[0] == "--help" {
        println!("{}", usage_text());
        return Ok(());
    }

    let mut options = CommonOptions::default();
    let mut index = 0usize;
    while index < args.len() {
        match args[index].as_str() {
            "--port" => {
                options.port = parse_value(&args, index, "--port", "u16")?;
                index += 2;
            }
            "--timeout-ms" => {
                options.timeout_ms = parse_value(&args, index, "--timeout-ms", "u64")?;
                index += 2;
            }
            "--retry-ms" => {
                options.retry_ms = parse_value(&args, index, "--retry-ms", "u64")?;
                index += 2;
            }
            "--include-telemetry" => {
                options.include_telemetry = true;
                index += 1;
            }
            _ => break,
        }
    }

    let command = args
        .get(index)
        .ok_or_else(|| "missing subcommand".to_string())?
        .as_str();
    let command_args = &args[(index + 1)..];

    let kind = match command {
        "wait-ready" => no_arguments(command, command_args, CommandKind::WaitReady)?,
        "barrier" => no_arguments(command, command_args, CommandKind::Barrier)?,
        "state" => no_arguments(command, command_args, CommandKind::State)?,
        "smoke" => no_arguments(command, command_args, CommandKind::Smoke)?,
        "send" => {
            if command_args.is_empty() {
                return Err("send requires a command payload".to_string());
            }
            CommandKind::Send {
                command: command_args.join(" "),
            }
        }
        "script" => {
            let path = command_args
                .first()
                .ok_or_else(|| "script requires a file path".to_string())?
                .clone();
            let mut barrier = false;
            for arg in &command_args[1..] {
                if arg == "--barrier" {
                    barrier = true;
                } else {
                    return Err(format!(
                        "unknown script argument '{arg}' (expected --barrier)"
                    ));
                }
            }
            CommandKind::Script { path, barrier }
        }
        "playtest" => CommandKind::Playtest(parse_playtest_options(command_args)?),
        other => return Err(format!("unknown subcommand '{other}'")),
    };

    run(kind, options, &mut io::stdout())
}

fn no_arguments(command: &str, args: &[String], kind: CommandKind) -> Result<CommandKind, String> {
    if args.is_empty() {
        Ok(kind)
    } else {
        Err(format!("{command} takes no arguments"))
    }
}

fn parse_value<T: std::str::FromStr>(
    args: &[String],
    index: usize,
    flag: &str,
    expected: &str,
) -> Result<T, String> {
    let value = args
        .get(index + 1)
        .ok_or_else(|| format!("missing value for {flag}"))?;
    value
        .parse::<T>()
        .map_err(|_| format!("invalid {flag} value '{value}' (expected {expected})"))
}

fn parse_playtest_options(args: &[String]) -> Result<PlaytestOptions, String> {
    let mut options = PlaytestOptions::default();
    let mut index = 0usize;
    while index < args.len() {
        match args[index].as_str() {
            "--iterations" => {
                options.iterations = parse_value(args, index, "--iterations", "u32")?;
            }
            "--seconds" => {
                options.seconds = parse_value(args, index, "--seconds", "u64")?;
            }
            "--seed" => {
                options.seed = Some(parse_value(args, index, "--seed", "u64")?);
            }
            other => {
                return Err(format!(
                    "unknown playtest argument '{other}' (expected --iterations, --seconds or --seed)"
                ))
            }
        }
        index += 2;
    }
    Ok(options)
}

fn usage_text() -> String {
    const COMMON: &str =
        "[--port <u16>] [--timeout-ms <u64>] [--retry-ms <u64>] [--include-telemetry]";
    [
        "harness_cli - automation client for the in-game harness".to_string(),
        String::new(),
        "Usage:".to_string(),
        format!("  harness_cli {COMMON} wait-ready"),
        format!("  harness_cli {COMMON} send <command...>"),
        format!("  harness_cli {COMMON} script <file> [--barrier]"),
        format!("  harness_cli {COMMON} barrier"),
        format!("  harness_cli {COMMON} state"),
        format!("  harness_cli {COMMON} smoke"),
        format!(
            "  harness_cli {COMMON} playtest [--iterations <u32>] [--seconds <u64>] [--seed <u64>]"
        ),
        String::new(),
        "Defaults:".to_string(),
        "  --port 46001".to_string(),
        "  --timeout-ms 5000".to_string(),
        "  --retry-ms 100".to_string(),
        "  playtest --iterations 3 --seconds 10".to_string(),
    ]
    .join("\n")
}
