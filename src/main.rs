use anyhow::Result;
use clap::Parser;
use mailcheck::{cli, config, input, transcript};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "mailcheck", about = "Validate an email address format")]
pub struct Args {
    #[arg(
        short,
        long = "email",
        value_name = "ADDR",
        action = clap::ArgAction::Append,
        help = "Validate the given address without prompting (repeatable)"
    )]
    pub emails: Vec<String>,

    #[arg(long, help = "Name the rule an invalid address failed")]
    pub explain: bool,

    #[arg(
        long = "max-attempts",
        value_name = "N",
        env = "MAILCHECK_MAX_ATTEMPTS",
        help = "Give up after N attempts (default: unlimited)"
    )]
    pub max_attempts: Option<usize>,

    #[arg(long, help = "Do not load or save line-editor history")]
    pub no_history: bool,

    #[arg(long, help = "Write a JSONL session transcript to this directory")]
    pub transcripts_dir: Option<PathBuf>,

    #[arg(long, help = "Config file path")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Debug output (print effective settings)")]
    pub debug: bool,
}

fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let mut cfg = if let Some(config_path) = &args.config {
        config::Config::load_from(config_path)?
    } else {
        config::Config::load()?
    };

    // CLI flags override config files
    if args.explain {
        cfg.prompt.explain = true;
    }
    if args.max_attempts.is_some() {
        cfg.prompt.max_attempts = args.max_attempts;
    }
    if args.no_history {
        cfg.prompt.history = false;
    }
    if let Some(dir) = &args.transcripts_dir {
        cfg.transcript.enabled = true;
        cfg.transcript.dir = dir.clone();
    }

    if let Err(errors) = cfg.validate() {
        for error in &errors {
            eprintln!("Config error {}", error);
        }
        return Err(anyhow::anyhow!("Invalid configuration"));
    }

    let session_id = uuid::Uuid::new_v4().to_string();
    let transcript = if cfg.transcript.enabled {
        Some(transcript::Transcript::create_in(
            &cfg.transcript.dir,
            &session_id,
        )?)
    } else {
        None
    };

    let ctx = cli::Context::new(cfg, session_id, transcript);

    if args.debug {
        eprintln!("[DEBUG] Session: {}", ctx.session_id);
        if let Some(t) = ctx.transcript.borrow().as_ref() {
            eprintln!("[DEBUG] Transcript: {:?}", t.path);
        }
        eprintln!(
            "[DEBUG] Settings:\n{}",
            toml::to_string_pretty(&ctx.config)?
        );
    }

    let mut stdout = std::io::stdout();

    let ok = if !args.emails.is_empty() {
        cli::run_once(&ctx, &args.emails, &mut stdout)?
    } else if std::io::stdin().is_terminal() {
        let mut source = input::EditorSource::new(ctx.config.history_path())?;
        cli::run_interactive(&ctx, &mut source, &mut stdout)?
    } else {
        let mut source = input::ReaderSource::new(std::io::stdin().lock());
        cli::run_interactive(&ctx, &mut source, &mut stdout)?
    };

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
