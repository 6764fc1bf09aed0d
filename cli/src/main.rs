use clap::{Parser, ValueEnum};
use miette::{IntoDiagnostic, Result, WrapErr};
use sift::{Engine, EngineOptions, Error, Policy, Value, render_error, values::DumpStyle};
use sift_core::evaluator::{ExecutionError, Outputs, RuntimeError};
use std::io::{Read, Write};
use std::process::ExitCode;
use std::time::{Duration, Instant};

/// Sift - filter JSON with jq-style programs
#[derive(Parser, Debug)]
#[command(name = "sift", version)]
#[command(about = "Run a filter over one JSON document read from stdin", long_about = None)]
struct Args {
    /// How outputs are written
    #[arg(long, value_enum, default_value_t = Mode::Stream)]
    mode: Mode,

    /// One line per value instead of pretty printing
    #[arg(short, long)]
    compact: bool,

    /// Write strings without quotes
    #[arg(short, long)]
    raw_output: bool,

    /// Use `null` as the input instead of reading stdin
    #[arg(short, long)]
    null_input: bool,

    /// Bind `$NAME` to the string VALUE
    #[arg(long, num_args = 2, value_names = ["NAME", "VALUE"])]
    arg: Vec<String>,

    /// Bind `$NAME` to the JSON text JSON
    #[arg(long, num_args = 2, value_names = ["NAME", "JSON"])]
    argjson: Vec<String>,

    /// Give up after SECS seconds, checked between outputs (0 for no limit)
    #[arg(long, value_name = "SECS", default_value_t = 0.0)]
    timeout: f64,

    /// Compile the filter and exit
    #[arg(long)]
    validate: bool,

    /// Print the parsed filter (for debugging)
    #[arg(long)]
    debug_parse: bool,

    /// Print the resolved program (for debugging)
    #[arg(long)]
    debug_program: bool,

    /// Out of range array indices yield null instead of failing
    #[arg(long)]
    lenient_index: bool,

    /// Maximum depth of user function calls
    #[arg(long, value_name = "N")]
    max_depth: Option<usize>,

    /// The filter program
    filter: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Every output, as it is produced
    Stream,
    /// The first output, or null
    First,
    /// All outputs in one array
    All,
    /// Like `all`, but a single output is written as is and none as null
    Unwrap,
}

impl Mode {
    fn policy(self) -> Option<Policy> {
        match self {
            Mode::Stream => None,
            Mode::First => Some(Policy::First),
            Mode::All => Some(Policy::All),
            Mode::Unwrap => Some(Policy::Unwrap),
        }
    }
}

/// Why a run stopped early. Each kind has its own exit status.
#[derive(Debug)]
enum Failure {
    Usage(miette::Report),
    Input(Error),
    Compile(Error),
    Eval(Error),
}

impl Failure {
    fn exit_code(&self) -> u8 {
        match self {
            Failure::Usage(_) | Failure::Input(_) => 2,
            Failure::Compile(_) => 3,
            Failure::Eval(_) => 5,
        }
    }

    fn report(&self) {
        match self {
            Failure::Usage(report) => eprintln!("{:?}", report),
            Failure::Input(err) | Failure::Compile(err) => render_error(err),
            Failure::Eval(err) => eprintln!("sift: error: {}", err),
        }
    }
}

impl From<miette::Report> for Failure {
    fn from(report: miette::Report) -> Self {
        Failure::Usage(report)
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    init_logging();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(failure) => {
            failure.report();
            ExitCode::from(failure.exit_code())
        }
    }
}

fn init_logging() {
    use tracing_subscriber::{EnvFilter, fmt};

    // Use RUST_LOG to control log level. `debug` builtin output is logged
    // under `sift::debug` and shown by default.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,sift::debug=info"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn engine_options(args: &Args) -> EngineOptions {
    let mut options = EngineOptions::default();
    options.execution.strict_indexing = !args.lenient_index;
    if let Some(max_depth) = args.max_depth {
        options.execution.max_depth = max_depth;
    }
    options
}

/// `--arg` and `--argjson` pairs, in command line order per flag.
fn bindings(args: &Args, engine: &Engine) -> Result<(Vec<String>, Vec<Value>), Failure> {
    let mut names = Vec::new();
    let mut values = Vec::new();
    for pair in args.arg.chunks(2) {
        if let [name, value] = pair {
            names.push(name.clone());
            values.push(Value::string(value.as_str()));
        }
    }
    for pair in args.argjson.chunks(2) {
        if let [name, text] = pair {
            let value = engine
                .parse_json(text)
                .map_err(|err| miette::miette!("Invalid JSON for --argjson {}: {}", name, err.message()))?;
            names.push(name.clone());
            values.push(value);
        }
    }
    Ok((names, values))
}

fn run(args: &Args) -> Result<(), Failure> {
    let engine = Engine::new(engine_options(args));
    let (names, values) = bindings(args, &engine)?;

    if args.debug_parse {
        match sift_core::parser::parse(&args.filter) {
            Ok(ast) => eprintln!("=== Parsed Filter ===\n{:#?}\n", ast),
            Err(err) => return Err(Failure::Compile(err.into())),
        }
    }

    let params: Vec<&str> = names.iter().map(String::as_str).collect();
    let filter = engine
        .compile_with_params(&args.filter, &params)
        .map_err(Failure::Compile)?;

    if args.debug_program {
        eprintln!("=== Program ===\n{:#?}\n", filter.program());
    }

    if args.validate {
        return Ok(());
    }

    let input = if args.null_input {
        Value::Null
    } else {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .into_diagnostic()
            .wrap_err("Failed to read stdin")?;
        engine.parse_json(&text).map_err(Failure::Input)?
    };

    let outputs = filter.run_with(input, &values).map_err(Failure::Eval)?;
    let outputs = WithDeadline::new(outputs, args.timeout);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match args.mode.policy() {
        Some(policy) => {
            let value = policy.apply(outputs).map_err(Failure::Eval)?;
            write_value(&mut out, &value, args)?;
        }
        None => {
            for output in outputs {
                let value = output.map_err(|err| Failure::Eval(err.into()))?;
                write_value(&mut out, &value, args)?;
            }
        }
    }
    out.flush().into_diagnostic()?;
    Ok(())
}

fn write_value(out: &mut impl Write, value: &Value, args: &Args) -> Result<(), Failure> {
    let text = match value {
        Value::String(s) if args.raw_output => s.to_string(),
        _ => {
            let style = if args.compact {
                DumpStyle::Compact
            } else {
                DumpStyle::pretty()
            };
            value
                .dump(style)
                .map_err(|err| Failure::Eval(Error::Runtime(err.0)))?
        }
    };
    writeln!(out, "{}", text).into_diagnostic()?;
    Ok(())
}

/// Outputs that fail once a deadline has passed. The deadline is checked
/// before each pull; a pull that never returns is not interrupted.
struct WithDeadline<'p> {
    outputs: Outputs<'p>,
    deadline: Option<(Instant, f64)>,
    expired: bool,
}

impl<'p> WithDeadline<'p> {
    fn new(outputs: Outputs<'p>, seconds: f64) -> Self {
        let deadline = (seconds > 0.0)
            .then(|| Duration::try_from_secs_f64(seconds).ok())
            .flatten()
            .map(|limit| (Instant::now() + limit, seconds));
        Self {
            outputs,
            deadline,
            expired: false,
        }
    }
}

impl Iterator for WithDeadline<'_> {
    type Item = Result<Value, ExecutionError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.expired {
            return None;
        }
        if let Some((deadline, seconds)) = self.deadline {
            if Instant::now() >= deadline {
                self.expired = true;
                tracing::warn!(seconds, "Filter timed out");
                return Some(Err(RuntimeError::Message(format!(
                    "Timed out after {} seconds",
                    seconds
                ))
                .into()));
            }
        }
        self.outputs.next()
    }
}
