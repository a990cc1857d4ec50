use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use mpi_bindgen::{
    c::{self, CAbi},
    config::GeneratorConfig,
    diagnostics::emit_error,
    errors::BindingResult,
    fortran::{self, FortranLang, prototype::load_prototypes},
    output::OutputFile,
    prototype::Prototype,
    template::SourceTemplate,
};
use std::{io, path::PathBuf, process};
use tracing::{Level, info};

/// Generate MPI C and Fortran bindings from templates and prototype lists
#[derive(Parser)]
#[command(name = "mpi-bindgen")]
#[command(version, about, long_about = None)]
struct Cli {
    /// File the generated code is written to
    #[arg(short, long)]
    output: PathBuf,

    /// TOML file overriding the generator defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log more (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// C bindings generated from source templates
    C {
        #[command(subcommand)]
        command: CCommands,
    },

    /// Fortran 2008 bindings generated from a JSON prototype list
    Fortran {
        /// JSON prototype list
        #[arg(long)]
        prototypes: PathBuf,

        /// Pass buffers as TS 29113 array descriptors
        #[arg(long)]
        ts: bool,

        #[command(subcommand)]
        command: FortranCommands,
    },
}

#[derive(Subcommand)]
enum CCommands {
    /// Standard ABI header declaring every function of the templates
    Header {
        /// Produce the header installed for applications
        #[arg(long)]
        external: bool,

        /// Directory the template paths are relative to
        #[arg(long)]
        srcdir: Option<PathBuf>,

        /// Source templates
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// One C source file for a template
    Source {
        #[arg(value_enum)]
        abi: AbiArg,

        /// Source template
        file: PathBuf,
    },
}

#[derive(Subcommand)]
enum FortranCommands {
    /// Fortran subroutines or their C trampolines
    Code {
        #[arg(value_enum)]
        lang: LangArg,
    },

    /// Generic interface blocks of the mpi_f08 module
    Interface,
}

#[derive(Clone, Copy, ValueEnum)]
enum AbiArg {
    Ompi,
    Standard,
}

#[derive(Clone, Copy, ValueEnum)]
enum LangArg {
    Fortran,
    C,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> BindingResult<()> {
    let config = match &cli.config {
        Some(path) => GeneratorConfig::load(path)?,
        None => GeneratorConfig::default(),
    };
    let mut out = OutputFile::new();

    match cli.command {
        Commands::C { command } => match command {
            CCommands::Header {
                external,
                srcdir,
                files,
            } => {
                let prototypes = files
                    .iter()
                    .map(|file| {
                        SourceTemplate::load(file, srcdir.as_deref())
                            .map(|template| template.prototype)
                    })
                    .collect::<BindingResult<Vec<Prototype>>>()?;
                c::generate_header(&prototypes, external, &mut out)?;
            }
            CCommands::Source { abi, file } => {
                let template = SourceTemplate::load(&file, None)?;
                let abi = match abi {
                    AbiArg::Ompi => CAbi::Ompi,
                    AbiArg::Standard => CAbi::Standard,
                };
                c::generate_source(&template, abi, &config, &mut out)?;
            }
        },
        Commands::Fortran {
            prototypes,
            ts,
            command,
        } => {
            let config = config.with_ts(ts);
            let prototypes = load_prototypes(&prototypes)?;
            match command {
                FortranCommands::Code { lang } => {
                    let lang = match lang {
                        LangArg::Fortran => FortranLang::Fortran,
                        LangArg::C => FortranLang::C,
                    };
                    fortran::generate_code(&prototypes, lang, &config, &mut out);
                }
                FortranCommands::Interface => {
                    fortran::generate_interface(&prototypes, &config, &mut out);
                }
            }
        }
    }

    out.publish(&cli.output)?;
    info!(path = %cli.output.display(), "wrote bindings");
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(error) = run(cli) {
        emit_error(error);
        process::exit(1);
    }
}
