use clap::Parser;
use color_eyre::Result;
use std::io::{self, Read};
use std::path::PathBuf;

use toastq::config::{self, Position, QueueConfig};
use toastq::error::ToastError;
use toastq::script;

/// Toast queue replay tool
#[derive(Parser, Debug)]
#[command(
    version,
    about = "Replay toast notification scripts against a bounded, self-expiring queue"
)]
struct Args {
    /// Script with one JSON command per line (if not provided, reads from stdin)
    script: Option<PathBuf>,

    /// Run against the real clock instead of a simulated one
    #[arg(long)]
    realtime: bool,

    /// Maximum number of queued toasts (overrides config)
    #[arg(long)]
    capacity: Option<usize>,

    /// Default toast lifetime in milliseconds (overrides config)
    #[arg(long)]
    lifetime_ms: Option<u64>,

    /// Stack anchor: top-left, top-right, bottom-left or bottom-right (overrides config)
    #[arg(long)]
    position: Option<String>,
}

fn main() -> Result<()> {
    init_logging();
    color_eyre::install()?;

    // Load config early so CLI flags can override it
    let config_result = config::load_config();
    if let Some(warning) = &config_result.warning {
        eprintln!("Warning: {}", warning);
    }

    let args = Args::parse();
    let queue_config = apply_overrides(config_result.config.queue, &args);
    let settings = queue_config.settings()?;
    log::info!(
        "Queue capacity {}, lifetime {:?}, position {}",
        settings.capacity,
        settings.default_lifetime,
        settings.position
    );

    let source = read_script(args.script.as_ref())?;
    let commands = script::parse_script(&source)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let written = if args.realtime {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        rt.block_on(script::replay_realtime(&commands, settings, &mut out))?
    } else {
        script::replay_simulated(&commands, settings, &mut out)?
    };

    log::debug!("Replay finished, {} frames written", written);
    Ok(())
}

/// Logs go to stderr so stdout stays one JSON frame per line
fn init_logging() {
    use std::io::Write;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .format(|buf, record| {
            let datetime = chrono::Local::now();
            writeln!(
                buf,
                "[{}] [{}] {}",
                datetime.format("%Y-%m-%dT%H:%M:%S%.3f"),
                record.level(),
                record.args()
            )
        })
        .init();
}

fn apply_overrides(mut queue: QueueConfig, args: &Args) -> QueueConfig {
    if let Some(capacity) = args.capacity {
        queue.capacity = capacity;
    }
    if let Some(lifetime_ms) = args.lifetime_ms {
        queue.default_lifetime_ms = lifetime_ms;
    }
    if let Some(position) = &args.position {
        queue.position = Position::parse_lenient(position);
    }
    queue
}

fn read_script(path: Option<&PathBuf>) -> Result<String, ToastError> {
    match path {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => {
            let mut source = String::new();
            io::stdin().read_to_string(&mut source)?;
            Ok(source)
        }
    }
}
