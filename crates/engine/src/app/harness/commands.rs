use std::collections::HashMap;
use std::path::PathBuf;

use harness_proto::HarnessAction;
use thiserror::Error;
use tracing::warn;

use crate::app::{GrantResource, SceneDebugCommand};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum HarnessCommand {
    Help,
    GetState,
    GetPhase,
    Execute {
        action: HarnessAction,
        duration_ms: u64,
    },
    Scene(SceneDebugCommand),
    Reset,
    Screenshot {
        path: PathBuf,
    },
    Telemetry {
        enabled: bool,
    },
    Status,
    Sync,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}. usage: {usage}")]
pub(crate) struct CommandParseError {
    reason: String,
    usage: String,
}

impl CommandParseError {
    fn new(reason: impl Into<String>, usage: &str) -> Self {
        Self {
            reason: reason.into(),
            usage: usage.to_string(),
        }
    }
}

type ParseFn = dyn Fn(&[String]) -> Result<HarnessCommand, CommandParseError> + Send + Sync;

pub(crate) struct CommandSpec {
    name: String,
    help: String,
    arg_schema: String,
    parse: Box<ParseFn>,
}

type BuiltinParse = fn(&[String]) -> Result<HarnessCommand, CommandParseError>;

const BUILTIN_COMMANDS: &[(&str, &str, &str, BuiltinParse)] = &[
    ("help", "List commands", "", parse_help),
    ("get_state", "Reply with the state snapshot as JSON", "", parse_get_state),
    ("get_phase", "Reply with the current phase token", "", parse_get_phase),
    (
        "execute",
        "Hold a synthetic input for a wall-clock duration",
        "<action:up+left+fire|click:x,y> <duration_ms:u64>",
        parse_execute,
    ),
    ("force_start", "Skip menus and start playing", "", parse_force_start),
    ("god_mode", "Toggle player invulnerability", "<on|off>", parse_god_mode),
    (
        "grant",
        "Grant a resource to the player",
        "<gold|ammo|health|score> <amount:u32>",
        parse_grant,
    ),
    ("set_health", "Set player health", "<value:i32>", parse_set_health),
    (
        "spawn_enemy",
        "Spawn an enemy in the current room",
        "<melee|ranged|patrol> [x:f32 y:f32]",
        parse_spawn_enemy,
    ),
    ("shop_buy", "Buy a shop item by name", "<item:string>", parse_shop_buy),
    ("reset", "Hard-reset the game to the title screen", "", parse_reset),
    (
        "screenshot",
        "Save the next rendered frame as PNG",
        "<path:string>",
        parse_screenshot,
    ),
    ("telemetry", "Toggle per-tick frame telemetry", "<on|off>", parse_telemetry),
    ("status", "Report harness transport status", "", parse_status),
    ("sync", "Barrier acknowledgement", "", parse_sync),
    ("quit", "Quit app", "", parse_quit),
];

pub(crate) struct HarnessCommandRegistry {
    specs: Vec<CommandSpec>,
    lookup_by_lower_name: HashMap<String, usize>,
}

impl HarnessCommandRegistry {
    pub(crate) fn new() -> Self {
        Self {
            specs: Vec::new(),
            lookup_by_lower_name: HashMap::new(),
        }
    }

    pub(crate) fn with_builtins() -> Self {
        let mut registry = Self::new();
        for (name, help, arg_schema, parse) in BUILTIN_COMMANDS {
            if let Err(error) = registry.register(*name, *help, *arg_schema, *parse) {
                warn!(error = %error, "harness_builtin_registration_failed");
            }
        }
        registry
    }

    pub(crate) fn register<F>(
        &mut self,
        name: impl Into<String>,
        help: impl Into<String>,
        arg_schema: impl Into<String>,
        parse: F,
    ) -> Result<(), String>
    where
        F: Fn(&[String]) -> Result<HarnessCommand, CommandParseError> + Send + Sync + 'static,
    {
        let name = name.into();
        if name.trim().is_empty() {
            return Err("command name cannot be empty".to_string());
        }
        if self.lookup_by_lower_name.contains_key(&name.to_ascii_lowercase()) {
            return Err(format!("duplicate command registration: {name}"));
        }
        self.insert_spec(name, help.into(), arg_schema.into(), Box::new(parse));
        Ok(())
    }

    fn insert_spec(&mut self, name: String, help: String, arg_schema: String, parse: Box<ParseFn>) {
        self.lookup_by_lower_name
            .insert(name.to_ascii_lowercase(), self.specs.len());
        self.specs.push(CommandSpec {
            name,
            help,
            arg_schema,
            parse,
        });
    }

    pub(crate) fn lookup(&self, input_name: &str) -> Option<&CommandSpec> {
        let index = self.lookup_by_lower_name.get(&input_name.to_ascii_lowercase())?;
        self.specs.get(*index)
    }

    /// One `name [args] - help` line per command, in registration order.
    pub(crate) fn help_lines(&self) -> Vec<String> {
        self.specs
            .iter()
            .map(|spec| {
                if spec.arg_schema.is_empty() {
                    format!("{} - {}", spec.name, spec.help)
                } else {
                    format!("{} {} - {}", spec.name, spec.arg_schema, spec.help)
                }
            })
            .collect()
    }

    /// `Ok(None)` for blank lines; `Err` carries the full `error: ...` reply.
    pub(crate) fn parse_line(&self, raw_line: &str) -> Result<Option<HarnessCommand>, String> {
        let trimmed = raw_line.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        let tokens =
            tokenize_line(trimmed).map_err(|reason| format!("error: {reason}. usage: help"))?;
        let Some((command_name, args)) = tokens.split_first() else {
            return Ok(None);
        };
        let Some(spec) = self.lookup(command_name) else {
            return Err(format!(
                "error: unknown command '{command_name}'. try: help"
            ));
        };

        (spec.parse)(args)
            .map(Some)
            .map_err(|error| format!("error: {error}"))
    }
}

pub(crate) fn tokenize_line(line: &str) -> Result<Vec<String>, String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut seen_token_content = false;

    for ch in line.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                seen_token_content = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if seen_token_content {
                    tokens.push(std::mem::take(&mut current));
                    seen_token_content = false;
                }
            }
            _ => {
                current.push(ch);
                seen_token_content = true;
            }
        }
    }

    if in_quotes {
        return Err("unterminated quoted string".to_string());
    }
    if seen_token_content {
        tokens.push(current);
    }
    Ok(tokens)
}

fn parse_help(args: &[String]) -> Result<HarnessCommand, CommandParseError> {
    require_no_args(args, "help")?;
    Ok(HarnessCommand::Help)
}

fn parse_get_state(args: &[String]) -> Result<HarnessCommand, CommandParseError> {
    require_no_args(args, "get_state")?;
    Ok(HarnessCommand::GetState)
}

fn parse_get_phase(args: &[String]) -> Result<HarnessCommand, CommandParseError> {
    require_no_args(args, "get_phase")?;
    Ok(HarnessCommand::GetPhase)
}

fn parse_execute(args: &[String]) -> Result<HarnessCommand, CommandParseError> {
    const USAGE: &str = "execute <action> <duration_ms>";
    if args.len() != 2 {
        return Err(CommandParseError::new(
            "expected <action> <duration_ms>",
            USAGE,
        ));
    }
    let action = HarnessAction::parse(&args[0]).map_err(|error| {
        CommandParseError::new(format!("invalid action '{}': {error}", args[0]), USAGE)
    })?;
    let duration_ms = args[1].parse::<u64>().map_err(|_| {
        CommandParseError::new(
            format!("invalid duration '{}' (expected u64 milliseconds)", args[1]),
            USAGE,
        )
    })?;
    Ok(HarnessCommand::Execute {
        action,
        duration_ms,
    })
}

fn parse_force_start(args: &[String]) -> Result<HarnessCommand, CommandParseError> {
    require_no_args(args, "force_start")?;
    Ok(HarnessCommand::Scene(SceneDebugCommand::ForceStart))
}

fn parse_god_mode(args: &[String]) -> Result<HarnessCommand, CommandParseError> {
    let enabled = parse_single_toggle(args, "god_mode <on|off>")?;
    Ok(HarnessCommand::Scene(SceneDebugCommand::GodMode { enabled }))
}

fn parse_grant(args: &[String]) -> Result<HarnessCommand, CommandParseError> {
    const USAGE: &str = "grant <gold|ammo|health|score> <amount>";
    if args.len() != 2 {
        return Err(CommandParseError::new("expected <resource> <amount>", USAGE));
    }
    let resource = GrantResource::from_token(&args[0]).ok_or_else(|| {
        CommandParseError::new(
            format!(
                "unknown resource '{}' (expected gold|ammo|health|score)",
                args[0]
            ),
            USAGE,
        )
    })?;
    let amount = args[1].parse::<u32>().map_err(|_| {
        CommandParseError::new(format!("invalid amount '{}' (expected u32)", args[1]), USAGE)
    })?;
    Ok(HarnessCommand::Scene(SceneDebugCommand::Grant {
        resource,
        amount,
    }))
}

fn parse_set_health(args: &[String]) -> Result<HarnessCommand, CommandParseError> {
    const USAGE: &str = "set_health <value>";
    if args.len() != 1 {
        return Err(CommandParseError::new(
            "expected exactly one argument <value>",
            USAGE,
        ));
    }
    let value = args[0].parse::<i32>().map_err(|_| {
        CommandParseError::new(format!("invalid health '{}' (expected i32)", args[0]), USAGE)
    })?;
    Ok(HarnessCommand::Scene(SceneDebugCommand::SetHealth { value }))
}

fn parse_spawn_enemy(args: &[String]) -> Result<HarnessCommand, CommandParseError> {
    const USAGE: &str = "spawn_enemy <kind> [x y]";
    if args.len() != 1 && args.len() != 3 {
        return Err(CommandParseError::new("expected <kind> or <kind> <x> <y>", USAGE));
    }
    let kind = args[0].to_ascii_lowercase();
    let position = if args.len() == 3 {
        Some((
            parse_coordinate(&args[1], "x", USAGE)?,
            parse_coordinate(&args[2], "y", USAGE)?,
        ))
    } else {
        None
    };
    Ok(HarnessCommand::Scene(SceneDebugCommand::SpawnEnemy {
        kind,
        position,
    }))
}

fn parse_shop_buy(args: &[String]) -> Result<HarnessCommand, CommandParseError> {
    if args.len() != 1 {
        return Err(CommandParseError::new(
            "expected exactly one argument <item>",
            "shop_buy <item>",
        ));
    }
    Ok(HarnessCommand::Scene(SceneDebugCommand::ShopBuy {
        item: args[0].to_ascii_lowercase(),
    }))
}

fn parse_reset(args: &[String]) -> Result<HarnessCommand, CommandParseError> {
    require_no_args(args, "reset")?;
    Ok(HarnessCommand::Reset)
}

fn parse_screenshot(args: &[String]) -> Result<HarnessCommand, CommandParseError> {
    if args.len() != 1 || args[0].is_empty() {
        return Err(CommandParseError::new(
            "expected exactly one argument <path>",
            "screenshot <path>",
        ));
    }
    Ok(HarnessCommand::Screenshot {
        path: PathBuf::from(&args[0]),
    })
}

fn parse_telemetry(args: &[String]) -> Result<HarnessCommand, CommandParseError> {
    let enabled = parse_single_toggle(args, "telemetry <on|off>")?;
    Ok(HarnessCommand::Telemetry { enabled })
}

fn parse_status(args: &[String]) -> Result<HarnessCommand, CommandParseError> {
    require_no_args(args, "status")?;
    Ok(HarnessCommand::Status)
}

fn parse_sync(args: &[String]) -> Result<HarnessCommand, CommandParseError> {
    require_no_args(args, "sync")?;
    Ok(HarnessCommand::Sync)
}

fn parse_quit(args: &[String]) -> Result<HarnessCommand, CommandParseError> {
    require_no_args(args, "quit")?;
    Ok(HarnessCommand::Quit)
}

fn parse_single_toggle(args: &[String], usage: &str) -> Result<bool, CommandParseError> {
    if args.len() != 1 {
        return Err(CommandParseError::new(
            "expected exactly one argument <on|off>",
            usage,
        ));
    }
    match args[0].to_ascii_lowercase().as_str() {
        "on" | "1" | "true" => Ok(true),
        "off" | "0" | "false" => Ok(false),
        other => Err(CommandParseError::new(
            format!("invalid toggle '{other}' (expected on|off)"),
            usage,
        )),
    }
}

fn parse_coordinate(raw: &str, axis: &str, usage: &str) -> Result<f32, CommandParseError> {
    raw.parse::<f32>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| {
            CommandParseError::new(
                format!("invalid {axis} coordinate '{raw}' (expected f32)"),
                usage,
            )
        })
}

fn require_no_args(args: &[String], usage: &str) -> Result<(), CommandParseError> {
    if args.is_empty() {
        Ok(())
    } else {
        Err(CommandParseError::new("unexpected extra arguments", usage))
    }
}

#[cfg(test)]
mod tests {
    use harness_proto::HeldKey;

    use super::*;

    fn parse(line: &str) -> Result<Option<HarnessCommand>, String> {
        HarnessCommandRegistry::with_builtins().parse_line(line)
    }

    #[test]
    fn help_lists_commands_in_registration_order() {
        let lines = HarnessCommandRegistry::with_builtins().help_lines();
        assert_eq!(lines.len(), BUILTIN_COMMANDS.len());
        assert_eq!(lines[0], "help - List commands");
        assert_eq!(lines[1], "get_state - Reply with the state snapshot as JSON");
        assert_eq!(
            lines[3],
            "execute <action:up+left+fire|click:x,y> <duration_ms:u64> - Hold a synthetic input for a wall-clock duration"
        );
        assert_eq!(lines.last().map(String::as_str), Some("quit - Quit app"));
    }

    #[test]
    fn names_are_case_insensitive_and_blank_lines_ignored() {
        assert_eq!(parse("GET_PHASE"), Ok(Some(HarnessCommand::GetPhase)));
        assert_eq!(parse("   "), Ok(None));
    }

    #[test]
    fn unknown_command_reports_clear_error() {
        assert_eq!(
            parse("jump"),
            Err("error: unknown command 'jump'. try: help".to_string())
        );
    }

    #[test]
    fn bad_args_report_usage_hint() {
        assert_eq!(
            parse("set_health lots"),
            Err(
                "error: invalid health 'lots' (expected i32). usage: set_health <value>"
                    .to_string()
            )
        );
        assert_eq!(
            parse("sync now"),
            Err("error: unexpected extra arguments. usage: sync".to_string())
        );
        assert_eq!(
            parse("grant gems 5"),
            Err(
                "error: unknown resource 'gems' (expected gold|ammo|health|score). usage: grant <gold|ammo|health|score> <amount>"
                    .to_string()
            )
        );
    }

    #[test]
    fn execute_parses_action_and_duration() {
        let parsed = parse("execute up+fire 500").expect("parse").expect("command");
        let HarnessCommand::Execute {
            action,
            duration_ms,
        } = parsed
        else {
            panic!("expected execute, got {parsed:?}");
        };
        assert_eq!(action.keys, vec![HeldKey::Up, HeldKey::Fire]);
        assert_eq!(duration_ms, 500);

        let error = parse("execute fly 100").expect_err("unknown token");
        assert!(error.starts_with("error: invalid action 'fly'"), "{error}");
        assert!(error.ends_with("usage: execute <action> <duration_ms>"), "{error}");
    }

    #[test]
    fn scene_commands_map_to_debug_commands() {
        assert_eq!(
            parse("force_start"),
            Ok(Some(HarnessCommand::Scene(SceneDebugCommand::ForceStart)))
        );
        assert_eq!(
            parse("god_mode ON"),
            Ok(Some(HarnessCommand::Scene(SceneDebugCommand::GodMode {
                enabled: true
            })))
        );
        assert_eq!(
            parse("grant gold 40"),
            Ok(Some(HarnessCommand::Scene(SceneDebugCommand::Grant {
                resource: GrantResource::Gold,
                amount: 40
            })))
        );
        assert_eq!(
            parse("set_health -5"),
            Ok(Some(HarnessCommand::Scene(SceneDebugCommand::SetHealth {
                value: -5
            })))
        );
        assert_eq!(
            parse("spawn_enemy Ranged 10.5 -2"),
            Ok(Some(HarnessCommand::Scene(SceneDebugCommand::SpawnEnemy {
                kind: "ranged".to_string(),
                position: Some((10.5, -2.0)),
            })))
        );
        assert_eq!(
            parse("shop_buy max_health"),
            Ok(Some(HarnessCommand::Scene(SceneDebugCommand::ShopBuy {
                item: "max_health".to_string()
            })))
        );
    }

    #[test]
    fn spawn_enemy_rejects_partial_coordinates() {
        assert!(parse("spawn_enemy melee 3").is_err());
        assert!(parse("spawn_enemy melee 3 inf").is_err());
        assert_eq!(
            parse("spawn_enemy patrol"),
            Ok(Some(HarnessCommand::Scene(SceneDebugCommand::SpawnEnemy {
                kind: "patrol".to_string(),
                position: None,
            })))
        );
    }

    #[test]
    fn screenshot_accepts_quoted_paths() {
        assert_eq!(
            parse("screenshot \"out dir/shot.png\""),
            Ok(Some(HarnessCommand::Screenshot {
                path: PathBuf::from("out dir/shot.png")
            }))
        );
    }

    #[test]
    fn telemetry_toggle_validates_value() {
        assert_eq!(
            parse("telemetry off"),
            Ok(Some(HarnessCommand::Telemetry { enabled: false }))
        );
        assert_eq!(
            parse("telemetry maybe"),
            Err(
                "error: invalid toggle 'maybe' (expected on|off). usage: telemetry <on|off>"
                    .to_string()
            )
        );
    }

    #[test]
    fn register_rejects_duplicates_case_insensitively() {
        let mut registry = HarnessCommandRegistry::with_builtins();
        assert!(registry
            .register("SYNC", "again", "", |_| Ok(HarnessCommand::Sync))
            .is_err());
        assert!(registry.register(" ", "blank", "", |_| Ok(HarnessCommand::Sync)).is_err());
        registry
            .register("ping", "Barrier alias", "", |_| Ok(HarnessCommand::Sync))
            .expect("register");
        assert_eq!(registry.parse_line("ping"), Ok(Some(HarnessCommand::Sync)));
    }

    #[test]
    fn tokenizer_handles_quotes_and_errors() {
        assert_eq!(
            tokenize_line("shop_buy \"max health\" x").expect("tokens"),
            vec!["shop_buy", "max health", "x"]
        );
        assert_eq!(tokenize_line("a \"\" b").expect("tokens"), vec!["a", "", "b"]);
        assert!(tokenize_line("screenshot \"oops").is_err());
        assert_eq!(
            parse("screenshot \"oops"),
            Err("error: unterminated quoted string. usage: help".to_string())
        );
    }
}
