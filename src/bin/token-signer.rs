use std::io::{self, Read, Write};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use token_signer::config::signer_config::SignerConfig;
use token_signer::utils::config_loader;
use token_signer::utils::constants::{DEFAULT_CONFIG_PATH, ENV_CONFIG, ENV_LOG_LEVEL, ENV_SECRET_KEY};
use token_signer::utils::logging::{self, LogLevel};
use token_signer::{BadData, PayloadFormat, Serializer, Signer, TimedSerializer, TimestampSigner};
use tracing::{debug, info, warn};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// YAML config; `token-signer.yaml` is used when present.
    #[arg(short, long, env = ENV_CONFIG)]
    config: Option<String>,
    #[arg(long, env = ENV_LOG_LEVEL, value_enum)]
    log_level: Option<LogLevel>,
    /// Overrides `signer.secret_key` from the config.
    #[arg(long, env = ENV_SECRET_KEY, hide_env_values = true)]
    secret_key: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Clone, Copy)]
struct TimeOpts {
    /// Embed or expect a signing timestamp.
    #[arg(long)]
    timed: bool,
    /// Reject timed tokens older than this many seconds.
    #[arg(long, requires = "timed")]
    max_age: Option<u64>,
}

#[derive(Subcommand)]
enum Command {
    /// Sign a value (read from stdin when omitted).
    Sign {
        value: Option<String>,
        #[arg(long)]
        timed: bool,
    },
    /// Verify a token and print the original value.
    Unsign {
        token: Option<String>,
        #[command(flatten)]
        time: TimeOpts,
    },
    /// Verify a token; the exit code tells the result.
    Validate {
        token: Option<String>,
        #[command(flatten)]
        time: TimeOpts,
    },
    /// Sign a JSON document.
    Dumps {
        json: Option<String>,
        #[arg(long)]
        timed: bool,
    },
    /// Verify a signed JSON document and print it.
    Loads {
        token: Option<String>,
        #[command(flatten)]
        time: TimeOpts,
    },
}

/// Everything the commands need, built from the config and the CLI.
struct Signing {
    signer: Signer,
    format: PayloadFormat,
    max_age: Option<u64>,
}

impl Signing {
    fn build(config: Option<&SignerConfig>, secret_key: Option<&str>) -> Result<Self> {
        let signer = match (config, secret_key) {
            (Some(cfg), Some(secret)) => cfg.build_signer_with_secret(secret)?,
            (Some(cfg), None) => cfg.build_signer()?,
            (None, Some(secret)) => Signer::new(secret),
            (None, None) => bail!(
                "no secret key: pass --secret-key, set {} or provide a config file",
                ENV_SECRET_KEY
            ),
        };

        Ok(Self {
            signer,
            format: config.map(|c| c.payload.into()).unwrap_or_default(),
            max_age: config.and_then(|c| c.max_age_seconds),
        })
    }

    fn timed(&self) -> TimestampSigner {
        TimestampSigner::new(self.signer.clone())
    }

    fn max_age(&self, time: TimeOpts) -> Option<u64> {
        time.max_age.or(self.max_age)
    }

    fn unsign(&self, token: &str, time: TimeOpts) -> Result<Vec<u8>, BadData> {
        if time.timed {
            let (value, signed_at) = self
                .timed()
                .unsign_with_timestamp(token, self.max_age(time))?;
            debug!(%signed_at, "timestamp verified");
            Ok(value)
        } else {
            self.signer.unsign(token)
        }
    }

    fn loads(&self, token: &str, time: TimeOpts) -> Result<Value, BadData> {
        if time.timed {
            TimedSerializer::from_signer(self.timed(), self.format).loads(token, self.max_age(time))
        } else {
            Serializer::from_signer(self.signer.clone(), self.format).loads(token)
        }
    }
}

fn input(arg: Option<String>) -> Result<String> {
    match arg {
        Some(value) => Ok(value),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("cannot read stdin")?;
            Ok(buf.trim_end_matches(['\n', '\r']).to_owned())
        }
    }
}

fn print_bytes(bytes: &[u8]) -> Result<()> {
    let mut stdout = io::stdout().lock();
    stdout.write_all(bytes)?;
    stdout.write_all(b"\n")?;
    Ok(())
}

fn rejected(err: &BadData) -> ExitCode {
    warn!(error = %err, signature_error = err.is_signature_error(), "token rejected");
    ExitCode::FAILURE
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // -------------------------------
    // 1. Load YAML config
    // -------------------------------

    let args = Args::parse();
    let service_config = match &args.config {
        Some(path) => Some(config_loader::run(path).await?),
        None => config_loader::run_optional(DEFAULT_CONFIG_PATH).await?,
    };
    logging::run(service_config.as_ref().map(|c| &c.settings), args.log_level);

    // -------------------------------
    // 2. Build signer
    // -------------------------------

    let signing = Signing::build(
        service_config.as_ref().map(|c| &c.signer),
        args.secret_key.as_deref(),
    )?;
    debug!(signer = ?signing.signer, "signer ready");

    // -------------------------------
    // 3. Run command
    // -------------------------------

    let code = match args.command {
        Command::Sign { value, timed } => {
            let value = input(value)?;
            let token = if timed {
                signing.timed().sign(&value)
            } else {
                signing.signer.sign(&value)
            };
            print_bytes(&token)?;
            ExitCode::SUCCESS
        }
        Command::Unsign { token, time } => match signing.unsign(&input(token)?, time) {
            Ok(value) => {
                print_bytes(&value)?;
                ExitCode::SUCCESS
            }
            Err(e) => rejected(&e),
        },
        Command::Validate { token, time } => match signing.unsign(&input(token)?, time) {
            Ok(_) => {
                info!("token valid");
                ExitCode::SUCCESS
            }
            Err(e) => rejected(&e),
        },
        Command::Dumps { json, timed } => {
            let value: Value = serde_json::from_str(&input(json)?).context("input is not JSON")?;
            let token = if timed {
                TimedSerializer::from_signer(signing.timed(), signing.format).dumps(&value)?
            } else {
                Serializer::from_signer(signing.signer.clone(), signing.format).dumps(&value)?
            };
            print_bytes(token.as_bytes())?;
            ExitCode::SUCCESS
        }
        Command::Loads { token, time } => match signing.loads(&input(token)?, time) {
            Ok(value) => {
                print_bytes(value.to_string().as_bytes())?;
                ExitCode::SUCCESS
            }
            Err(e) => rejected(&e),
        },
    };

    Ok(code)
}
