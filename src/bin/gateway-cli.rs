use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Invoke a running gateway-shim", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a gateway event through the forwarding pipeline
    Invoke {
        #[arg(long)]
        stage: String,
        #[arg(long)]
        path: String,
        #[arg(long, default_value = "GET")]
        method: String,
        /// Raw body, normally JSON
        #[arg(long)]
        body: Option<String>,
    },
    /// Show the rule an event would match, without forwarding
    Describe {
        #[arg(long)]
        stage: String,
        #[arg(long)]
        path: String,
        #[arg(long, default_value = "GET")]
        method: String,
    },
    /// Evaluate an authorization token
    Authorize {
        #[arg(long)]
        token: String,
        #[arg(long, default_value = "arn:aws:execute-api:local:gateway-shim/*")]
        method_arn: String,
    },
    /// Check the server is up
    Health,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let (endpoint, payload) = match cli.command {
        Commands::Invoke {
            stage,
            path,
            method,
            body,
        } => (
            "invoke/router",
            json!({
                "requestContext": { "stage": stage },
                "path": path,
                "httpMethod": method,
                "body": body,
            }),
        ),
        Commands::Describe {
            stage,
            path,
            method,
        } => (
            "invoke/describe",
            json!({
                "requestContext": { "stage": stage },
                "path": path,
                "httpMethod": method,
            }),
        ),
        Commands::Authorize { token, method_arn } => (
            "invoke/authorizer",
            json!({
                "type": "TOKEN",
                "authorizationToken": token,
                "methodArn": method_arn,
            }),
        ),
        Commands::Health => {
            let res = client.get(format!("{}/healthz", cli.url)).send().await?;
            println!("{} {}", res.status(), res.text().await?);
            return Ok(());
        }
    };

    let res = client
        .post(format!("{}/{}", cli.url, endpoint))
        .json(&payload)
        .send()
        .await?;
    print_response(res).await?;

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: gateway returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
