use figz::render::{FigzError, RenderOptions};
use std::io::{Read, Write};
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Figz(FigzError),
    Json(serde_json::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Figz(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<FigzError> for CliError {
    fn from(value: FigzError) -> Self {
        Self::Figz(value)
    }
}

impl From<figz::Error> for CliError {
    fn from(value: figz::Error) -> Self {
        Self::Figz(value.into())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    Render,
    Dump,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    out: Option<String>,
    page: Option<usize>,
    pretty: bool,
    debug_magnets: bool,
    debug_control_points: bool,
}

fn usage() -> &'static str {
    "figz-cli\n\
\n\
USAGE:\n\
  figz-cli [render] [--page <n>] [--debug-magnets] [--debug-control-points] [--out <path>] [<path>|-]\n\
  figz-cli dump [--pretty] [--out <path>] [<path>|-]\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', input is read from stdin.\n\
  - render prints a TikZ picture to stdout by default; use --out to write a file.\n\
  - Without --page, the document root's direct children are drawn.\n\
  - dump prints the decoded scene graph as JSON.\n\
  - RUST_LOG controls diagnostics on stderr (default: warn).\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "render" => args.command = Command::Render,
            "dump" => args.command = Command::Dump,
            "--pretty" => args.pretty = true,
            "--debug-magnets" => args.debug_magnets = true,
            "--debug-control-points" => args.debug_control_points = true,
            "--page" => {
                let Some(page) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.page = Some(page.parse::<usize>().map_err(|_| CliError::Usage(usage()))?);
            }
            "--out" | "-o" => {
                let Some(out) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.out = Some(out.clone());
            }
            "-" => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some("-".to_string());
            }
            other if other.starts_with('-') => return Err(CliError::Usage(usage())),
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    Ok(args)
}

fn read_input(input: Option<&str>) -> Result<Vec<u8>, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = Vec::new();
            std::io::stdin().read_to_end(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read(path)?),
    }
}

fn write_text(text: &str, out: Option<&str>) -> Result<(), CliError> {
    match out {
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            stdout.flush()?;
            Ok(())
        }
        Some(path) => {
            std::fs::write(path, text)?;
            Ok(())
        }
    }
}

fn render_options(args: &Args) -> RenderOptions {
    let mut options = RenderOptions::from_env();
    options.page = args.page;
    options.compile.debug_magnets |= args.debug_magnets;
    options.compile.debug_control_points |= args.debug_control_points;
    options
}

fn run(args: Args) -> Result<(), CliError> {
    let bytes = read_input(args.input.as_deref())?;
    let document = figz::decode_document(&bytes)?;
    tracing::debug!(
        version = document.version,
        records = document.graph.len(),
        "decoded document"
    );

    // Output is fully built before the destination is touched.
    let text = match args.command {
        Command::Render => figz::render::render_document(&document, &render_options(&args))?,
        Command::Dump => {
            let mut json = if args.pretty {
                serde_json::to_string_pretty(&document)?
            } else {
                serde_json::to_string(&document)?
            };
            json.push('\n');
            json
        }
    };
    write_text(&text, args.out.as_deref())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    init_tracing();

    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = run(args) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
