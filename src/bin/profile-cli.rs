use std::path::PathBuf;

use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde_json::Value;

use visitor_profile::config;
use visitor_profile::device;
use visitor_profile::geo::GeoResolver;

#[derive(Parser)]
#[command(name = "profile-cli")]
#[command(about = "Command-line client for the visitor profile service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a visitor form to a running server
    Submit {
        #[arg(long)]
        name: String,
        #[arg(long)]
        age: String,
        /// Pretend to be behind a proxy reporting this client address
        #[arg(long)]
        forwarded_for: Option<String>,
        #[arg(long)]
        user_agent: Option<String>,
    },
    /// Check server status
    Status,
    /// Classify a user-agent string locally
    Classify { user_agent: String },
    /// Resolve an address locally using the configured providers
    Locate {
        /// Address to resolve; omit to use this machine's public IP
        #[arg(default_value = "")]
        ip: String,
        #[arg(short, long = "config")]
        config_path: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let _ = dotenv::dotenv();

    match cli.command {
        Commands::Submit {
            name,
            age,
            forwarded_for,
            user_agent,
        } => {
            let mut headers = HeaderMap::new();
            if let Some(ip) = forwarded_for {
                headers.insert("x-forwarded-for", HeaderValue::from_str(&ip)?);
            }
            if let Some(ua) = user_agent {
                headers.insert(USER_AGENT, HeaderValue::from_str(&ua)?);
            }

            let res = reqwest::Client::new()
                .post(format!("{}/api/client-info", cli.url))
                .headers(headers)
                .json(&serde_json::json!({ "name": name, "age": age }))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Status => {
            let res = reqwest::Client::new()
                .get(format!("{}/api/status", cli.url))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Classify { user_agent } => {
            let info = device::classify(&user_agent);
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
        Commands::Locate { ip, config_path } => {
            let config = config::load(config_path.as_deref())?;
            for warning in config::config_warnings(&config) {
                eprintln!("Warning: {}", warning);
            }
            let resolver = GeoResolver::from_config(&config)?;
            let location = resolver.resolve(&ip).await;
            println!("{}", serde_json::to_string_pretty(&location)?);
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    if !status.is_success() {
        eprintln!("Error: server returned status {}", status);
    }

    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}
