use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::Level;

use koi_predict::{
    AppConfig, ArtifactLoadError, ArtifactStore, CollectError, ConfigError, FeatureRecord, InputForm,
    MissingMedianPolicy, PredictError,
};

#[derive(Parser)]
#[command(author, version, about = "Predict whether a Kepler Object of Interest is a confirmed exoplanet", long_about = None)]
struct Cli {
    /// TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Directory holding model.json, medians.json and label_encoders.json
    #[arg(long, global = true)]
    artifacts: Option<PathBuf>,
    /// Refuse numeric features that have no stored median
    #[arg(long, global = true)]
    strict_medians: bool,
    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the input form
    Form,
    /// Collect one record and predict
    Predict {
        /// Feature value, repeatable
        #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_assignment)]
        sets: Vec<(String, String)>,
        /// JSON object with feature values
        #[arg(long, value_name = "FILE")]
        input: Option<PathBuf>,
        /// Prompt for every field not given otherwise
        #[arg(long)]
        interactive: bool,
        /// Print the verdict as JSON
        #[arg(long)]
        json: bool,
    },
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got `{raw}`"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("empty feature name in `{raw}`"));
    }
    Ok((name.to_string(), value.to_string()))
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
}

fn resolve_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::from_file(path)
            .with_context(|| format!("failed loading config {}", path.display()))?,
        None => AppConfig::default(),
    };
    if let Some(dir) = &cli.artifacts {
        config.artifact_dir = dir.clone();
    }
    if cli.strict_medians {
        config.missing_median = MissingMedianPolicy::Strict;
    }
    config.validate()?;
    Ok(config)
}

fn print_form(form: &InputForm) {
    println!("{}", form.title());
    println!("{}", form.instructions());
    println!();
    for field in form.fields() {
        println!("  {:<48} {} ({})", field.label, field.name, field.kind);
    }
    println!();
    println!("[{}]", koi_predict::collector::SUBMIT_LABEL);
}

fn prompt_answers(
    form: &InputForm,
    given: &FeatureRecord,
    answers: &[(String, String)],
) -> Result<Vec<(String, String)>> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut stderr = io::stderr();
    let mut prompted = Vec::new();

    writeln!(stderr, "{}\n{}", form.title(), form.instructions())?;
    for field in form.fields() {
        if given.contains(&field.name) || answers.iter().any(|(name, _)| *name == field.name) {
            continue;
        }
        write!(stderr, "{} [{}]: ", field.label, field.kind)?;
        stderr.flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        prompted.push((field.name.clone(), line.context("failed reading stdin")?));
    }
    Ok(prompted)
}

fn run_predict(
    store: &ArtifactStore,
    form: &InputForm,
    sets: Vec<(String, String)>,
    input: Option<PathBuf>,
    interactive: bool,
    json: bool,
) -> Result<()> {
    let base: FeatureRecord = match &input {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed reading input {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("failed parsing input record {}", path.display()))?
        }
        None => FeatureRecord::new(),
    };

    let mut answers = sets;
    if interactive {
        let prompted = prompt_answers(form, &base, &answers)?;
        answers.extend(prompted);
    }

    let record = form.collect_into(base, answers)?;
    let verdict = store.predict(record)?;

    if json {
        let mut value = serde_json::to_value(verdict)?;
        value["message"] = verdict.message().into();
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("{verdict}");
    }
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let config = resolve_config(&cli)?;
    let store = ArtifactStore::load(&config.artifact_paths())?;
    let form = store
        .input_form(config.missing_median)
        .context("failed building the input form")?;

    match cli.command {
        Commands::Form => {
            print_form(&form);
            Ok(())
        }
        Commands::Predict {
            sets,
            input,
            interactive,
            json,
        } => run_predict(&store, &form, sets, input, interactive, json),
    }
}

/// Config and artifact problems stop the process before any request;
/// everything else aborts only the current one.
fn exit_code(err: &anyhow::Error) -> ExitCode {
    let startup = err.downcast_ref::<ArtifactLoadError>().is_some()
        || err.downcast_ref::<ConfigError>().is_some()
        || matches!(
            err.downcast_ref::<CollectError>(),
            Some(CollectError::MissingMedian(_))
        );
    if startup {
        ExitCode::from(2)
    } else {
        ExitCode::FAILURE
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<PredictError>() {
                Some(predict_err) if !predict_err.is_validation() => {
                    tracing::error!(error = %predict_err, "prediction failed");
                    eprintln!("{}", predict_err.user_message());
                }
                _ => eprintln!("error: {err:#}"),
            }
            exit_code(&err)
        }
    }
}
