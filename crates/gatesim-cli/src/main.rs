mod config;

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::{Parser as ClapParser, Subcommand};
use env_logger::Env;
use gatesim::{Module, analyze, simulate};
use log::info;
use miette::{IntoDiagnostic, Result, miette};

use config::Config;

#[derive(ClapParser)]
#[command(
    name = "gatesim",
    about = "Simulate and analyze single-bit gate-level circuits"
)]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file (defaults to ./gatesim.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one clock tick per input vector and print the outputs
    Simulate {
        /// Circuit description
        circuit: PathBuf,

        /// Input vector file, one line per tick
        #[arg(long)]
        vectors: Option<PathBuf>,

        /// Write output lines here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print the extremal paths and the logic cone of every output
    Analyze {
        /// Circuit description
        circuit: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    let config = Config::load(cli.config.as_deref())?;
    match cli.command {
        Command::Simulate {
            circuit,
            vectors,
            output,
        } => {
            let module = load_module(&circuit)?;
            let vectors = vectors.unwrap_or(config.simulate.vectors);
            let output = output.or(config.simulate.output);

            let reader = File::open(&vectors)
                .map(BufReader::new)
                .map_err(|err| miette!("cannot open {}: {err}", vectors.display()))?;
            let mut writer: Box<dyn Write> = match &output {
                Some(path) => Box::new(BufWriter::new(
                    File::create(path)
                        .map_err(|err| miette!("cannot create {}: {err}", path.display()))?,
                )),
                None => Box::new(BufWriter::new(io::stdout().lock())),
            };
            let ticks = simulate(module, reader, &mut writer)
                .map_err(|err| miette!("{}: {err}", vectors.display()))?;
            writer.flush().into_diagnostic()?;
            info!("simulated {ticks} ticks from {}", vectors.display());
        }
        Command::Analyze { circuit } => {
            let module = load_module(&circuit)?;
            let analysis = analyze(&module).into_diagnostic()?;
            print!("{}", analysis.report(&module));
        }
    }
    Ok(())
}

fn load_module(path: &Path) -> Result<Module> {
    let source = fs::read_to_string(path)
        .map_err(|err| miette!("cannot read {}: {err}", path.display()))?;
    let module =
        gatesim::parse(&source).map_err(|err| miette!("{}: {err}", path.display()))?;
    info!(
        "loaded module `{}`: {} inputs, {} outputs, {} flip-flops",
        module.name(),
        module.input_size(),
        module.output_size(),
        module.state_size()
    );
    Ok(module)
}
