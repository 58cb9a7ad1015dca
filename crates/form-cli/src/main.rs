use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use greentic_form_renderer::{
    ConfigPolicy, ErrorSet, Form, FormRuntimeConfig, FormSpec, SubmitOutcome, ValueSet,
    example_values,
};
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "greentic-form")]
#[command(about = "Render and submit declarative forms from a spec file", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the form for the given values.
    Render {
        #[arg(long, value_name = "SPEC")]
        spec: PathBuf,
        #[arg(long, value_name = "VALUES_JSON")]
        values: Option<PathBuf>,
        #[arg(long, value_name = "ERRORS_JSON")]
        errors: Option<PathBuf>,
        #[arg(long, value_name = "CONFIG")]
        config: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = Format::Html)]
        format: Format,
    },
    /// Validate the values and print the submitted data or the errors.
    Submit {
        #[arg(long, value_name = "SPEC")]
        spec: PathBuf,
        #[arg(long, value_name = "VALUES_JSON")]
        values: PathBuf,
        #[arg(long, value_name = "CONFIG")]
        config: Option<PathBuf>,
    },
    /// Print a value-set built from defaults and first options.
    ExampleValues {
        #[arg(long, value_name = "SPEC")]
        spec: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Html,
    Json,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("spec load failed ({0}): {1}")]
    Spec(PathBuf, #[source] anyhow::Error),
    #[error("values load failed ({0}): {1}")]
    Values(PathBuf, #[source] anyhow::Error),
    #[error("config load failed ({0}): {1}")]
    Config(PathBuf, #[source] anyhow::Error),
    #[error("form configuration invalid: {0}")]
    Form(#[source] anyhow::Error),
    #[error("validation failed")]
    Validation,
    #[error("output failed: {0}")]
    Output(#[source] anyhow::Error),
}

impl CliError {
    fn exit_code(&self) -> i32 {
        match self {
            CliError::Validation => 2,
            CliError::Spec(_, _) => 1,
            CliError::Values(_, _) => 1,
            CliError::Config(_, _) => 1,
            CliError::Form(_) => 1,
            CliError::Output(_) => 1,
        }
    }
}

fn main() {
    init_logging();
    let cli = Cli::parse();
    let exit_code = match run(cli) {
        Ok(_) => 0,
        Err(err) => {
            if !matches!(err, CliError::Validation) {
                eprintln!("error: {err}");
            }
            err.exit_code()
        }
    };
    process::exit(exit_code);
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("GREENTIC_FORM_LOG")
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Render {
            spec,
            values,
            errors,
            config,
            format,
        } => handle_render(&spec, values.as_deref(), errors.as_deref(), config.as_deref(), format),
        Command::Submit {
            spec,
            values,
            config,
        } => handle_submit(&spec, &values, config.as_deref()),
        Command::ExampleValues { spec } => handle_example_values(&spec),
    }
}

fn handle_render(
    spec_path: &Path,
    values_path: Option<&Path>,
    errors_path: Option<&Path>,
    config_path: Option<&Path>,
    format: Format,
) -> Result<(), CliError> {
    let spec = load_spec(spec_path)?;
    let config = load_config(config_path)?;
    let values = match values_path {
        Some(path) => load_json::<ValueSet>(path)?,
        None => ValueSet::new(),
    };
    let errors = match errors_path {
        Some(path) => load_json::<ErrorSet>(path)?,
        None => ErrorSet::new(),
    };

    let form = Form::from_spec(spec)
        .config(config)
        .values(values)
        .errors(errors)
        .on_submit(|_| {})
        .build()
        .map_err(|err| CliError::Form(err.into()))?;

    match format {
        Format::Html => println!("{}", form.render_html()),
        Format::Json => print_json(&form.render())?,
    }
    Ok(())
}

fn handle_submit(
    spec_path: &Path,
    values_path: &Path,
    config_path: Option<&Path>,
) -> Result<(), CliError> {
    let spec = load_spec(spec_path)?;
    let config = load_config(config_path)?;
    let values = load_json::<ValueSet>(values_path)?;

    let mut form = Form::from_spec(spec)
        .config(config)
        .values(values)
        .on_submit(|data| tracing::info!(values = data.len(), "form submitted"))
        .build()
        .map_err(|err| CliError::Form(err.into()))?;

    match form.submit() {
        SubmitOutcome::Submitted { data } => print_json(&json!({ "ok": true, "data": data })),
        SubmitOutcome::Invalid { errors } => {
            print_json(&json!({ "ok": false, "errors": errors }))?;
            Err(CliError::Validation)
        }
        SubmitOutcome::Cancelled => Err(CliError::Form(anyhow::anyhow!("submit cancelled"))),
    }
}

fn handle_example_values(spec_path: &Path) -> Result<(), CliError> {
    let spec = load_spec(spec_path)?;
    print_json(&example_values(&spec.fields))
}

fn load_spec(path: &Path) -> Result<FormSpec, CliError> {
    FormSpec::load(path).map_err(|err| CliError::Spec(path.to_path_buf(), err.into()))
}

fn load_config(path: Option<&Path>) -> Result<FormRuntimeConfig, CliError> {
    match path {
        Some(path) => FormRuntimeConfig::load(path)
            .map_err(|err| CliError::Config(path.to_path_buf(), err.into())),
        None => Ok(FormRuntimeConfig {
            policy: ConfigPolicy::from_env(),
            ..FormRuntimeConfig::default()
        }),
    }
}

fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read {}", path.display()))
        .map_err(|err| CliError::Values(path.to_path_buf(), err))?;
    serde_json::from_str(&contents).map_err(|err| CliError::Values(path.to_path_buf(), err.into()))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), CliError> {
    let text = serde_json::to_string_pretty(value).map_err(|err| CliError::Output(err.into()))?;
    println!("{text}");
    Ok(())
}
