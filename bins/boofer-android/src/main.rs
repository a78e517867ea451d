//! Boofer Android CLI
//!
//! Inspect the notification channel table, exercise the settings bridge and
//! check Firestore rule files before deploy.

use anyhow::Result;
use boofer_android::prelude::*;
use boofer_android::registry::validate_definitions;
use boofer_android::signing::SigningProperties;
use boofer_cli::output::{format_count, yes_no, Status};
use boofer_core::config::Config;
use boofer_core::error::{exit_codes, Error, ErrorCode};
use boofer_rules::prelude::*;
use boofer_telemetry::{metrics, Timer, TelemetryConfig};
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "boofer-android")]
#[command(about = "Android shell and Firestore rules tools for Boofer")]
#[command(version)]
struct Cli {
    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase output verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Print collected counters as JSON on exit
    #[arg(long, global = true)]
    metrics: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the notification channel table
    Channels {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Register the channel table against an in-memory OS store
    Register {
        /// Android API level to simulate
        #[arg(long, default_value = "34")]
        sdk: u32,
        /// Register a second time to show the upsert is idempotent
        #[arg(long)]
        twice: bool,
    },

    /// Show the settings intent for a platform
    #[command(name = "settings-intent")]
    SettingsIntent {
        /// Android API level
        #[arg(long, default_value = "34")]
        sdk: u32,
        /// App package (defaults to the configured one)
        #[arg(long)]
        package: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Send a method call through the settings channel
    Invoke {
        /// Method name
        method: String,
        /// Android API level
        #[arg(long, default_value = "34")]
        sdk: u32,
    },

    /// Firestore rules tools
    Rules {
        #[command(subcommand)]
        action: RulesAction,
    },

    /// Check release signing properties
    Signing {
        /// Path to key.properties (defaults to the configured one)
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum RulesAction {
    /// Classify rule files and check them for deploy
    Check {
        /// Rule files (defaults to the configured production file)
        files: Vec<PathBuf>,
        /// Target environment: development, staging, production
        #[arg(long)]
        env: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Evaluate one request against a rule set
    Eval {
        /// Document path, e.g. /conversations/c1
        #[arg(long)]
        path: String,
        /// Operation: get, list, create, update, delete
        #[arg(long, default_value = "get")]
        op: String,
        /// Authenticated user id; omit for an unauthenticated request
        #[arg(long)]
        uid: Option<String>,
        /// Stored document as JSON
        #[arg(long)]
        resource: Option<String>,
        /// Rule set: production or testing
        #[arg(long, default_value = "production")]
        ruleset: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        owo_colors::set_override(false);
    }

    let config = Config::load(cli.config.as_deref())?;

    let telemetry = TelemetryConfig {
        log_level: config.schema.logging.level.clone(),
        show_target: config.schema.logging.show_target,
        ..TelemetryConfig::default()
    }
    .with_verbosity(cli.verbose, cli.quiet);
    boofer_telemetry::init_with_config(telemetry)?;

    let exit_code = match cli.command {
        Commands::Channels { json } => run_channels(json),
        Commands::Register { sdk, twice } => match target_platform(sdk, &config) {
            Ok(platform) => run_register(platform, twice),
            Err(e) => fail(&e),
        },
        Commands::SettingsIntent { sdk, package, json } => match target_platform(sdk, &config) {
            Ok(platform) => {
                let package = package.unwrap_or_else(|| config.schema.app.package_name.clone());
                run_settings_intent(platform, &package, json)
            }
            Err(e) => fail(&e),
        },
        Commands::Invoke { method, sdk } => match target_platform(sdk, &config) {
            Ok(platform) => run_invoke(&method, platform, &config),
            Err(e) => fail(&e),
        },
        Commands::Rules { action } => match action {
            RulesAction::Check { files, env, json } => run_rules_check(files, env, json, &config),
            RulesAction::Eval {
                path,
                op,
                uid,
                resource,
                ruleset,
            } => run_rules_eval(&path, &op, uid.as_deref(), resource.as_deref(), &ruleset),
        },
        Commands::Signing { file } => {
            let file = file.unwrap_or_else(|| PathBuf::from(&config.schema.app.key_properties));
            run_signing(&file)
        }
    };

    if cli.metrics {
        eprintln!("{}", metrics().export_json());
    }

    std::process::exit(exit_code);
}

/// Print an error and map it to its exit code
fn fail(error: &Error) -> i32 {
    Status::error(&error.to_string());
    error.exit_code()
}

/// Platform for `--sdk`; levels below the configured `app.min_sdk` are rejected
fn target_platform(sdk: u32, config: &Config) -> boofer_core::Result<Platform> {
    let platform = Platform::new(sdk);
    let min_sdk = config.schema.app.min_sdk;
    if sdk < min_sdk {
        return Err(
            Error::invalid_input(format!("{platform} is below the app's minimum SDK {min_sdk}"))
                .with_suggestion(format!("Use --sdk {min_sdk} or higher, or lower app.min_sdk")),
        );
    }
    if !platform.is_supported() {
        Status::warning(&format!(
            "{platform} is older than API {}, which Firebase Messaging needs",
            Platform::MIN_SUPPORTED
        ));
    }
    Ok(platform)
}

fn print_json(value: &impl serde::Serialize) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{json}");
            exit_codes::SUCCESS
        }
        Err(e) => fail(&Error::from(e)),
    }
}

fn run_channels(json: bool) -> i32 {
    let registry = ChannelRegistry::default();

    if json {
        return print_json(&registry.definitions());
    }

    Status::header(&format!(
        "Notification channels ({})",
        format_count(registry.definitions().len(), "channel", "channels")
    ));
    println!(
        "  {:<16} {:<8} {:<6} {:<9} {:<7} {:<5} {}",
        "id".bold(),
        "level".bold(),
        "lights".bold(),
        "vibration".bold(),
        "sound".bold(),
        "badge".bold(),
        "bypass dnd".bold()
    );
    for channel in registry.definitions() {
        println!(
            "  {:<16} {:<8} {:<6} {:<9} {:<7} {:<5} {}",
            channel.id,
            channel.importance.to_string(),
            yes_no(channel.lights_enabled),
            yes_no(channel.vibration_enabled),
            if channel.is_silent() { "silent" } else { "default" },
            yes_no(channel.show_badge),
            yes_no(channel.bypass_dnd),
        );
    }

    let validation = validate_definitions(registry.definitions());
    for warning in validation.warnings() {
        Status::warning(&warning.to_string());
    }
    exit_codes::SUCCESS
}

fn run_register(platform: Platform, twice: bool) -> i32 {
    let _timer = Timer::start("channels.register");
    let registry = ChannelRegistry::default();
    let store = InMemoryChannelStore::new();

    let rounds = if twice { 2 } else { 1 };
    for round in 1..=rounds {
        let outcome = registry.register(&store, platform);
        metrics().increment("channels.register_calls");
        match outcome {
            RegistrationOutcome::Skipped { platform } => {
                Status::info(&format!("{platform} has no notification channels; nothing registered"));
                return exit_codes::SUCCESS;
            }
            RegistrationOutcome::Registered { count } => {
                Status::success(&format!(
                    "Round {round}: submitted {}",
                    format_count(count, "channel", "channels")
                ));
            }
            RegistrationOutcome::Failed { reason } => {
                Status::warning(&format!("Registration failed: {reason}"));
                return exit_codes::FAILURE;
            }
        }
    }

    let ids = store.channel_ids();
    Status::info(&format!("Store holds {}: {}", format_count(ids.len(), "channel", "channels"), ids.join(", ")));
    exit_codes::SUCCESS
}

fn run_settings_intent(platform: Platform, package: &str, json: bool) -> i32 {
    let target = resolve_settings_intent(platform.sdk_int);
    let intent = SettingsIntent::for_target(target, package);

    if json {
        return print_json(&intent);
    }

    Status::header(&format!("Settings intent for {platform}"));
    Status::field("action", &intent.action);
    if let Some(data) = &intent.data {
        Status::field("data", data);
    }
    for (key, value) in &intent.extras {
        Status::field("extra", &format!("{key}={value}"));
    }
    exit_codes::SUCCESS
}

fn run_invoke(method: &str, platform: Platform, config: &Config) -> i32 {
    let bridge = SettingsBridge::new(
        config.schema.app.package_name.clone(),
        platform,
        RecordingNavigator::new(),
    );
    let channel = MethodChannel::new(config.schema.app.settings_channel.clone(), bridge);
    metrics().increment("bridge.calls");

    match channel.invoke(&MethodCall::new(method)) {
        Ok(MethodResult::Success(value)) => {
            Status::success(&format!("{}#{} -> {}", channel.name(), method, value));
            for intent in channel.handler().navigator().started() {
                Status::field("started", &intent.action);
            }
            exit_codes::SUCCESS
        }
        Ok(MethodResult::NotImplemented) => {
            Status::warning(&format!("{}#{} -> not implemented", channel.name(), method));
            exit_codes::NOT_IMPLEMENTED
        }
        Err(e) => fail(&e),
    }
}

fn run_rules_check(files: Vec<PathBuf>, env: Option<String>, json: bool, config: &Config) -> i32 {
    let files = if files.is_empty() {
        vec![PathBuf::from(&config.schema.rules.production)]
    } else {
        files
    };
    let env = env.unwrap_or_else(|| config.schema.rules.environment.clone());
    let environment = match env.parse::<Environment>() {
        Ok(environment) => environment,
        Err(e) => return fail(&e),
    };

    let staged = match DeploymentGuard::new(environment).check_files(&files) {
        Ok(staged) => staged,
        Err(e) => {
            metrics().increment("rules.deploys_blocked");
            return fail(&e);
        }
    };

    if json {
        return print_json(&staged);
    }

    for ruleset in &staged {
        Status::header(&format!("{} ({})", ruleset.name, ruleset.kind));
        for finding in &ruleset.findings {
            println!("  line {:<4} {:<20} {}", finding.line, finding.kind.to_string(), finding.text.dimmed());
        }
    }
    Status::success(&format!("Rules may be deployed to {environment}"));
    exit_codes::SUCCESS
}

fn run_rules_eval(path: &str, op: &str, uid: Option<&str>, resource: Option<&str>, ruleset_name: &str) -> i32 {
    let kind = match ruleset_name {
        "production" => RulesetKind::Production,
        "testing" | "temporary-testing" => RulesetKind::TemporaryTesting,
        other => {
            return fail(&Error::invalid_input(format!("Unknown rule set: {other}"))
                .with_suggestion("Use production or testing"));
        }
    };

    let request = match build_request(path, op, uid, resource) {
        Ok(request) => request,
        Err(e) => return fail(&e),
    };
    let rules = match ruleset(kind) {
        Ok(rules) => rules,
        Err(e) => return fail(&e),
    };

    let decision = rules.evaluate(&request);
    tracing::info!(path = %request.path, operation = %request.operation, ?decision, "Rules evaluated");
    match &decision {
        Decision::Allow => {
            Status::success(&format!("{} {} allowed by {} rules", request.operation, request.path, kind));
            exit_codes::SUCCESS
        }
        Decision::Deny { reason } => {
            metrics().increment("rules.denied");
            fail(
                &Error::new(
                    ErrorCode::AccessDenied,
                    format!("{} {} denied by {} rules", request.operation, request.path, kind),
                )
                .with_context(reason.to_string()),
            )
        }
    }
}

fn build_request(path: &str, op: &str, uid: Option<&str>, resource: Option<&str>) -> boofer_core::Result<AccessRequest> {
    let mut request = AccessRequest::new(DocumentPath::parse(path)?, op.parse()?);
    if let Some(uid) = uid {
        request = request.as_user(uid);
    }
    if let Some(resource) = resource {
        request = request.with_resource(serde_json::from_str(resource)?);
    }
    Ok(request)
}

fn run_signing(file: &Path) -> i32 {
    match SigningProperties::load(file) {
        Ok(None) => {
            Status::info(&format!("{} not found; release builds will be unsigned", file.display()));
            exit_codes::SUCCESS
        }
        Ok(Some(properties)) => {
            let missing = properties.missing_keys();
            if missing.is_empty() {
                Status::success(&format!("{} is complete", file.display()));
                let dir = file.parent().unwrap_or_else(|| Path::new("."));
                if let Some(store) = properties.store_file(dir) {
                    Status::field("keystore", &store.display().to_string());
                }
                exit_codes::SUCCESS
            } else {
                Status::error(&format!("{} is missing: {}", file.display(), missing.join(", ")));
                exit_codes::CONFIG_ERROR
            }
        }
        Err(e) => fail(&e),
    }
}
