use clap::Parser;
use kit_hooks::cli::{Cli, Commands};
use kit_hooks::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = Config::load(&cli.config).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
        eprintln!("Using default configuration");
        Config::default()
    });
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }

    // Initialize telemetry
    let _telemetry = kit_hooks::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Dispatch(args) => {
            tracing::debug!(input = ?args.input, "Dispatching events");
            args.execute(&config).await?;
        }
        Commands::Targets(args) => {
            args.execute(&config).await?;
        }
        Commands::Status => {
            let dispatcher = kit_hooks::hooks::dispatcher(&config)?;
            println!("kit-hooks status");
            println!("  Data dir: {}", config.data_dir.display());
            println!("  Hooks ({}):", dispatcher.len());
            for name in dispatcher.hook_names() {
                println!("    - {name}");
            }
        }
        Commands::Config => {
            println!("Current configuration:");
            println!("  Data dir: {}", config.data_dir.display());
            println!(
                "  Telemetry: level={}, format={:?}, metrics_port={:?}",
                config.telemetry.log_level, config.telemetry.log_format, config.telemetry.metrics_port
            );
            for name in kit_hooks::hooks::HOOK_NAMES {
                let options = config.hook_options(name);
                let state = if options.enabled() { "enabled" } else { "disabled" };
                println!("  [{name}] {state}");
                for (key, value) in options.iter().filter(|(k, _)| k.as_str() != "enabled") {
                    println!("    {key} = {value}");
                }
            }
        }
    }

    Ok(())
}
