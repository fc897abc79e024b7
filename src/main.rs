use anyhow::Context;
use argh::FromArgs;
use entitygen::catalog::Catalog;
use entitygen::config::AppConfig;
use entitygen::generator::{self, FsSink, Host, Notice, NoticeKind, Outcome};
use entitygen::logging::init_tracing;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;

#[derive(FromArgs, PartialEq, Debug)]
/// Generate Doctrine entity classes from a schema catalog export
struct Args {
    #[argh(positional)]
    /// catalog JSON file
    catalog: PathBuf,

    #[argh(option, short = 'n')]
    /// entity namespace (skips the prompt)
    namespace: Option<String>,

    #[argh(option, short = 'o')]
    /// output directory (default: ~/mysql-workbench/<schema>)
    output: Option<PathBuf>,

    #[argh(option, short = 's')]
    /// schema to generate (default: first schema)
    schema: Option<String>,

    #[argh(switch, short = 'y')]
    /// accept the default namespace without prompting
    yes: bool,

    #[argh(switch, short = 'v')]
    /// enable debug logging
    verbose: bool,
}

/// Terminal stand-in for the host tool's dialogs.
struct ConsoleHost {
    preset: Option<String>,
    accept_default: bool,
}

impl Host for ConsoleHost {
    fn request_text(&mut self, prompt: &str, default: &str) -> Option<String> {
        if let Some(preset) = self.preset.take() {
            return Some(preset);
        }
        if self.accept_default {
            return Some(default.to_string());
        }

        print!("{} [{}]: ", prompt, default);
        io::stdout().flush().ok()?;

        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => {
                let answer = line.trim();
                let answer = if answer.is_empty() { default } else { answer };
                Some(answer.to_string())
            }
        }
    }

    fn notify(&mut self, notice: Notice) {
        match notice.kind {
            NoticeKind::Info => println!("{}: {}", notice.title, notice.message),
            NoticeKind::Error => eprintln!("{}: {}", notice.title, notice.message),
        }
    }
}

fn main() {
    let args: Args = argh::from_env();
    match run(args) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(err) => {
            tracing::error!("entitygen failed: {err:?}");
            eprintln!("{err:#}");
            process::exit(1);
        }
    }
}

fn run(args: Args) -> anyhow::Result<bool> {
    let mut cfg = AppConfig::from_env().context("failed to load config")?;
    if args.verbose {
        cfg.log_level = "debug".to_string();
    }
    init_tracing(&cfg.log_level, args.verbose);

    if args.output.is_some() {
        cfg.output_dir = args.output;
    }
    if args.schema.is_some() {
        cfg.schema = args.schema;
    }

    let catalog = Catalog::from_path(&args.catalog)
        .with_context(|| format!("failed to load catalog {}", args.catalog.display()))?;

    let mut host = ConsoleHost {
        preset: args.namespace,
        accept_default: args.yes,
    };

    match generator::run(&mut host, &mut FsSink, &catalog, &cfg) {
        Outcome::Cancelled => {
            tracing::info!("cancelled");
            Ok(true)
        }
        Outcome::Generated(_) => Ok(true),
        Outcome::Failed(err) => {
            tracing::debug!(error = ?err, "generation failed");
            Ok(false)
        }
    }
}
