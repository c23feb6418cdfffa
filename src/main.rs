use anyhow::Result;
use feishu_authlink::{config::Config, AuthLinkLauncher, SystemTabOpener};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    match args[1].as_str() {
        "open" | "link" => {
            if args.len() < 3 {
                eprintln!("Usage: feishu-authlink {} <page-url>", args[1]);
                std::process::exit(1);
            }

            let config = Config::load()?;
            let launcher = AuthLinkLauncher::new(&config, SystemTabOpener)?;

            if args[1] == "open" {
                let auth_url = launcher.launch(&args[2])?;
                println!("✅ Opened authorization link:");
                println!("   {}", auth_url);
            } else {
                // Compose only, for piping or manual copy
                println!("{}", launcher.auth_link(&args[2])?);
            }
        }

        "config" => handle_config_command(&args[2..])?,

        _ => {
            eprintln!("Unknown command: {}", args[1]);
            print_usage();
            std::process::exit(1);
        }
    }

    Ok(())
}

fn print_usage() {
    eprintln!("feishu-authlink v{}", feishu_authlink::VERSION);
    eprintln!("Usage:");
    eprintln!("  feishu-authlink open <page-url>    Open the authorization link in the browser");
    eprintln!("  feishu-authlink link <page-url>    Print the authorization link only");
    eprintln!("  feishu-authlink config [--app-id <id>] [--redirect-uri <uri>]");
}

/// Read the config file, or set field(s) if provided. Creates the file
/// on first run, as the original tool does.
fn handle_config_command(flags: &[String]) -> Result<()> {
    let mut app_id = None;
    let mut redirect_uri = None;

    let mut iter = flags.iter();
    while let Some(flag) = iter.next() {
        match flag.as_str() {
            "--app-id" => {
                app_id = Some(next_value(&mut iter, "--app-id")?);
            }
            "--redirect-uri" => {
                redirect_uri = Some(next_value(&mut iter, "--redirect-uri")?);
            }
            _ => {
                eprintln!("Unknown flag: {}", flag);
                std::process::exit(1);
            }
        }
    }

    let path = Config::default_file_path();
    println!("Configuration file on: {}", path.display());

    let mut config = if path.exists() {
        Config::load_from(&path)?
    } else {
        Config::default()
    };

    let dirty = !path.exists() || app_id.is_some() || redirect_uri.is_some();
    if let Some(app_id) = app_id {
        config.feishu.app_id = app_id;
    }
    if let Some(redirect_uri) = redirect_uri {
        config.feishu.redirect_uri = redirect_uri;
    }
    if dirty {
        config.store(&path)?;
    }

    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

fn next_value(iter: &mut std::slice::Iter<'_, String>, flag: &str) -> Result<String> {
    iter.next()
        .map(|value| value.clone())
        .ok_or_else(|| anyhow::anyhow!("{} requires a value", flag))
}
