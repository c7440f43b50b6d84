//! CLI argument parsing and help text

use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Run the HTTP catalog server
    Serve { port: Option<u16> },
    /// Print the languages the catalog offers
    Languages,
    /// Load a language into the panel and print its transcript
    Show { language: Option<String> },
    /// Load a language and save its audio
    Download {
        language: Option<String>,
        out_dir: PathBuf,
    },
    Help,
    Version,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CliArgs {
    pub command: Command,
    /// Overrides `SHOWCASE_API_URL` for client commands
    pub api_url: Option<String>,
}

/// Parse `std::env::args()`-style input (program name first)
pub fn parse_args(args: &[String]) -> Result<CliArgs, String> {
    let mut server = false;
    let mut port = None;
    let mut api_url = None;
    let mut out_dir = None;
    let mut positionals: Vec<&str> = Vec::new();

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                return Ok(CliArgs {
                    command: Command::Help,
                    api_url,
                })
            }
            "-v" | "--version" => {
                return Ok(CliArgs {
                    command: Command::Version,
                    api_url,
                })
            }
            "--server" => server = true,
            "--port" => {
                let value = iter.next().ok_or("--port needs a value")?;
                port = Some(
                    value
                        .parse::<u16>()
                        .map_err(|_| format!("invalid port '{}'", value))?,
                );
            }
            "--api-url" => {
                api_url = Some(iter.next().ok_or("--api-url needs a value")?.clone());
            }
            "--out" => {
                out_dir = Some(PathBuf::from(iter.next().ok_or("--out needs a value")?));
            }
            flag if flag.starts_with('-') => return Err(format!("unknown option '{}'", flag)),
            value => positionals.push(value),
        }
    }

    if server {
        if let Some(extra) = positionals.first() {
            return Err(format!("unexpected argument '{}' in server mode", extra));
        }
        return Ok(CliArgs {
            command: Command::Serve { port },
            api_url,
        });
    }

    let language = positionals.get(1).map(|l| l.to_string());
    if positionals.len() > 2 {
        return Err(format!("unexpected argument '{}'", positionals[2]));
    }

    let command = match positionals.first().copied() {
        None => Command::Help,
        Some("languages") => match language {
            None => Command::Languages,
            Some(extra) => return Err(format!("unexpected argument '{}'", extra)),
        },
        Some("show") => Command::Show { language },
        Some("download") => Command::Download {
            language,
            out_dir: out_dir.unwrap_or_else(|| PathBuf::from(".")),
        },
        Some(other) => return Err(format!("unknown command '{}'", other)),
    };

    Ok(CliArgs { command, api_url })
}

pub fn print_help() {
    let version = env!("CARGO_PKG_VERSION");
    println!("Voice Showcase v{}", version);
    println!("Audio catalog server and headless client for the voice demo page");
    println!();
    println!("USAGE:");
    println!("    showcase_server --server [--port <PORT>]");
    println!("    showcase_server [--api-url <URL>] <COMMAND> [LANGUAGE]");
    println!();
    println!("COMMANDS:");
    println!("    languages             List the languages the catalog offers");
    println!("    show [LANGUAGE]       Print the entry for a language (default: english)");
    println!("    download [LANGUAGE]   Save the audio for a language (see --out)");
    println!();
    println!("OPTIONS:");
    println!("    --server              Start HTTP server mode");
    println!("    --port <PORT>         Server port (default: 8000, or PORT)");
    println!("    --api-url <URL>       Catalog base URL for client commands");
    println!("    --out <DIR>           Download directory (default: current directory)");
    println!("    -h, --help            Print this help message");
    println!("    -v, --version         Print version information");
    println!();
    println!("SERVER ENDPOINTS:");
    println!("    GET    /api/audio             - List audio entries");
    println!("    GET    /api/audio/<language>  - Audio entry for a language");
    println!("    POST   /api/audio             - Create an entry (API key)");
    println!("    PUT    /api/audio/<language>  - Update an entry (API key)");
    println!("    DELETE /api/audio/<language>  - Delete an entry (API key)");
    println!("    GET    /health                - Health check");
    println!("    GET    /stats                 - Catalog statistics");
    println!();
    println!("ENVIRONMENT VARIABLES:");
    println!("    HOST, PORT                       - Bind address (default: 0.0.0.0:8000)");
    println!("    CATALOG_FILE                     - JSON snapshot for the catalog");
    println!("    STATIC_DIR                       - Directory served for the demo page");
    println!("    SHOWCASE_API_KEY_FILE            - Path to API keys file");
    println!(
        "    RATE_LIMIT_MODE                  - Rate limit mode (auto/per-key/per-ip/disabled)"
    );
    println!("    REQUEST_TIMEOUT_SECONDS          - Request timeout in seconds (default: 30)");
    println!("    SHOWCASE_API_URL                 - Catalog base URL for client commands");
    println!("    SHOWCASE_LOG_DIR                 - Log directory override");
    println!("    RUST_LOG                         - Console log filter");
    println!();
    println!("Settings can also be placed in a .env file in the working directory.");
}

pub fn print_version() {
    println!("Voice Showcase v{}", env!("CARGO_PKG_VERSION"));
}
