mod cli;

use std::path::Path;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use vh_av::{Encoder, ToolRegistry};
use vh_core::config::Config;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG if set, otherwise pick defaults from the verbose flag.
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "vidhost=trace,vh_server=trace,vh_av=trace,vh_db=debug,vh_core=debug,tower_http=debug"
                .to_string()
        } else {
            "vidhost=info,vh_server=info,vh_av=info,vh_db=info,vh_core=info,tower_http=info"
                .to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Start { host, port } => {
            let mut config = Config::load_or_default(cli.config.as_deref());
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }

            tracing::info!("Starting vidhost");
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(vh_server::start(config))?;
            Ok(())
        }
        Commands::Encode {
            input,
            output,
            height,
        } => {
            require_input(&input)?;
            let encoder = load_encoder(cli.config.as_deref())?;
            encoder.scale_and_encode(&input, &output, height)?;
            println!("{}", output.display());
            Ok(())
        }
        Commands::Segment {
            input,
            output_dir,
            height,
        } => {
            require_input(&input)?;
            let encoder = load_encoder(cli.config.as_deref())?;
            let playlist = encoder.scale_and_segment(&input, &output_dir, height)?;
            println!("{}", playlist.display());
            Ok(())
        }
        Commands::Thumbnail { input, output } => {
            require_input(&input)?;
            let encoder = load_encoder(cli.config.as_deref())?;
            encoder.extract_thumbnail(&input, &output)?;
            println!("{}", output.display());
            Ok(())
        }
        Commands::CheckTools => check_tools(cli.config.as_deref()),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("vidhost {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Encoder using the ffmpeg found via config or `PATH`.
fn load_encoder(config_path: Option<&Path>) -> Result<Encoder> {
    let config = Config::load_or_default(config_path);
    let tools = ToolRegistry::discover(&config.tools);
    Ok(Encoder::from_registry(&tools)?)
}

fn require_input(input: &Path) -> Result<()> {
    if !input.exists() {
        anyhow::bail!("Input file does not exist: {:?}", input);
    }
    Ok(())
}

fn check_tools(config_path: Option<&Path>) -> Result<()> {
    println!("Checking external tools...\n");

    let config = Config::load_or_default(config_path);
    let tools = ToolRegistry::discover(&config.tools).check_all();
    let mut all_ok = true;

    for tool in &tools {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({})", version);
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    println!();
    if all_ok {
        println!("All required tools are available!");
    } else {
        println!("ffmpeg is missing. Uploads will be stored but not transcoded.");
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let contents = std::fs::read_to_string(p)?;
            Config::from_json(&contents)?
        }
        None => {
            println!("No config file specified, using defaults");
            Config::default()
        }
    };

    let warnings = config.validate();
    if warnings.is_empty() {
        println!("✓ Configuration is valid");
    } else {
        for w in &warnings {
            println!("⚠ {w}");
        }
    }
    println!("  Server: {}:{}", config.server.host, config.server.port);
    println!("  Database: {}", config.server.db_path.display());
    println!(
        "  Media: {} (served at {})",
        config.media.root.display(),
        config.media.url_prefix
    );
    println!(
        "  Transcode on upload: {} ({})",
        config.transcode.on_upload,
        config
            .transcode
            .tiers
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    Ok(())
}
