//! LRO Waiter CLI
//!
//! Entry point for the `lro-wait` command-line tool.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::{Parser, Subcommand};
use lro_waiter::timeout::TimeoutConfig;
use lro_waiter::{
    create_storage_waiter, query_storage_op, storage_operation_wait_time,
    storage_operation_wait_time_with_response, ClientSettings, Config, EffectiveConfig,
    OperationDescriptor, WaitError,
};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "lro-wait")]
#[command(about = "Wait for long-running storage operations to finish", version)]
struct Cli {
    /// Path to a config file (TOML), layered over ~/.config/lro-waiter/config.toml
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// Bearer token sent with every status query
    #[arg(long, env = "LRO_ACCESS_TOKEN", hide_env_values = true, global = true)]
    access_token: Option<String>,

    /// Delay between status queries in milliseconds (0 selects backoff)
    #[arg(long, global = true)]
    poll_interval_ms: Option<u64>,

    /// Log every poll to stderr
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Wait until an operation reaches a terminal state
    Wait {
        /// Operation descriptor JSON file, or "-" for stdin
        descriptor: String,

        /// Label used in progress and error messages
        #[arg(long, default_value = "operation")]
        activity: String,

        /// Overall wait timeout (default from config)
        #[arg(long)]
        timeout_seconds: Option<u64>,

        /// User agent for status queries (default from config)
        #[arg(long)]
        user_agent: Option<String>,

        /// Decode and print the operation's response payload
        #[arg(long)]
        with_response: bool,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Query an operation's status once and print it
    Query {
        /// Operation descriptor JSON file, or "-" for stdin
        descriptor: String,

        /// User agent for the status query (default from config)
        #[arg(long)]
        user_agent: Option<String>,
    },

    /// Show the effective configuration
    Config {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let Cli {
        config,
        access_token,
        poll_interval_ms,
        verbose,
        command,
    } = Cli::parse();

    init_logging(verbose);

    let overrides = poll_interval_ms.map(|ms| json!({ "poll_interval_ms": ms }));
    let host_path = EffectiveConfig::default_host_path();
    let effective = match EffectiveConfig::build(host_path.as_deref(), config.as_deref(), overrides) {
        Ok(c) => c,
        Err(e) => fail(&WaitError::Config(e), false),
    };

    match command {
        Commands::Wait {
            descriptor,
            activity,
            timeout_seconds,
            user_agent,
            with_response,
            json,
        } => {
            let (client, settings) = load_client(&effective, access_token, json);
            let timeouts = TimeoutConfig::from_config(
                Some(timeout_seconds.unwrap_or(settings.timeout_seconds)),
                Some(settings.request_timeout_seconds),
            );
            if let Err(e) = timeouts.validate() {
                eprintln!("Error: {}", e);
                process::exit(2);
            }
            let user_agent = user_agent.unwrap_or(settings.user_agent);
            run_wait(
                &client,
                &descriptor,
                &activity,
                &user_agent,
                timeouts.wait(),
                with_response,
                json,
            );
        }
        Commands::Query {
            descriptor,
            user_agent,
        } => {
            let (client, settings) = load_client(&effective, access_token, false);
            let user_agent = user_agent.unwrap_or(settings.user_agent);
            run_query(&client, &descriptor, &user_agent);
        }
        Commands::Config { json } => {
            run_config(&effective, json);
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_millis()
        .init();
}

fn load_client(
    effective: &EffectiveConfig,
    access_token: Option<String>,
    json_output: bool,
) -> (Config, ClientSettings) {
    let settings = match effective.settings() {
        Ok(s) => s,
        Err(e) => fail(&WaitError::Config(e), json_output),
    };
    let mut client = match Config::from_settings(&settings) {
        Ok(c) => c,
        Err(e) => fail(&WaitError::Transport(e), json_output),
    };
    if let Some(token) = access_token.filter(|t| !t.is_empty()) {
        client = client.with_access_token(token);
    }
    (client, settings)
}

fn read_descriptor(source: &str, json_output: bool) -> OperationDescriptor {
    let bytes = if source == "-" {
        let mut buf = Vec::new();
        io::stdin().read_to_end(&mut buf).map(|_| buf)
    } else {
        fs::read(source)
    };

    let bytes = match bytes {
        Ok(b) => b,
        Err(e) => {
            eprintln!("Error reading descriptor {}: {}", source, e);
            process::exit(1);
        }
    };

    match OperationDescriptor::from_slice(&bytes) {
        Ok(d) => d,
        Err(e) => fail(&WaitError::InvalidDescriptor(e), json_output),
    }
}

fn run_wait(
    config: &Config,
    source: &str,
    activity: &str,
    user_agent: &str,
    timeout: Duration,
    with_response: bool,
    json_output: bool,
) {
    let descriptor = read_descriptor(source, json_output);

    let response = if with_response {
        match storage_operation_wait_time_with_response::<Value>(
            config,
            &descriptor,
            activity,
            user_agent,
            timeout,
        ) {
            Ok(value) => Some(value),
            Err(e) => fail(&e, json_output),
        }
    } else {
        if let Err(e) = storage_operation_wait_time(config, &descriptor, activity, user_agent, timeout) {
            fail(&e, json_output);
        }
        None
    };

    if json_output {
        let mut output = json!({
            "activity": activity,
            "status": "done",
            "synchronous": descriptor.is_synchronous() && !with_response,
        });
        if let Some(value) = response {
            output["response"] = value;
        }
        print_json(&output);
    } else {
        if descriptor.is_synchronous() && !with_response {
            println!("{}: completed synchronously, nothing to wait for", activity);
        } else {
            println!("{}: done", activity);
        }
        if let Some(value) = response {
            print_json(&value);
        }
    }
}

fn run_query(config: &Config, source: &str, user_agent: &str) {
    let descriptor = read_descriptor(source, false);

    let waiter = match create_storage_waiter(config, &descriptor, "query", user_agent) {
        Ok(w) => w,
        Err(e) => fail(&e, false),
    };

    match query_storage_op(Some(&waiter)) {
        Ok(status) => print_json(&status),
        Err(e) => fail(&e, false),
    }
}

fn run_config(effective: &EffectiveConfig, json_output: bool) {
    if json_output {
        match effective.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                process::exit(1);
            }
        }
        return;
    }

    println!("Sources:");
    for source in &effective.sources {
        match (&source.path, &source.digest) {
            (Some(path), Some(digest)) => {
                println!("  {:?}: {} (sha256 {})", source.origin, path, &digest[..12.min(digest.len())])
            }
            _ => println!("  {:?}", source.origin),
        }
    }

    println!();
    println!("Settings:");
    if let Value::Object(map) = &effective.config {
        for (key, value) in map {
            println!("  {} = {}", key, value);
        }
    }

    if !effective.redactions.is_empty() {
        println!();
        println!("Redacted: {}", effective.redactions.join(", "));
    }
}

fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            process::exit(1);
        }
    }
}

fn fail(err: &WaitError, json_output: bool) -> ! {
    if json_output {
        let output = json!({
            "status": "failed",
            "error": err.to_string(),
            "exit_code": err.exit_code(),
        });
        println!("{}", output);
    } else {
        eprintln!("Error: {}", err);
    }
    process::exit(err.exit_code());
}
