//! vegq — vegvisir probe client.
//!
//! Resolves a demo service through the middleware and invokes its first
//! method. Exit code 0 means the server answered `UNIMPLEMENTED` — the
//! expected result from a stub-only host such as `vegd`; any other status
//! exits 1.

use clap::Parser;
use tonic::Code;

use vegvisir::demo::proto::horn_client::HornClient;
use vegvisir::demo::proto::seats_client::SeatsClient;
use vegvisir::demo::{self, proto};
use vegvisir::{ClientFactory, Config, Middleware};

/// Vegvisir probe client — checks how a demo service answers.
#[derive(Parser)]
#[command(name = "vegq")]
#[command(version)]
#[command(about = "Vegvisir demo service probe")]
struct Args {
    /// Demo service to probe ("seats" or "horn").
    #[arg(default_value = "seats")]
    service: String,

    /// Path to configuration file.
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let middleware = match &args.config {
        Some(path) => Middleware::from_config(&Config::load(Some(path))?)?,
        None => Middleware::from_env(),
    };

    let code = match args.service.as_str() {
        "seats" => {
            let handle =
                ClientFactory::create(&demo::seats_descriptor(), &middleware, SeatsClient::new)
                    .await?;
            let mut client = handle.into_stub();
            match client.r#move(proto::MoveRequest::default()).await {
                Ok(_) => Code::Ok,
                Err(status) => status.code(),
            }
        }
        "horn" => {
            let handle =
                ClientFactory::create(&demo::horn_descriptor(), &middleware, HornClient::new)
                    .await?;
            let mut client = handle.into_stub();
            match client.honk(proto::HonkRequest::default()).await {
                Ok(_) => Code::Ok,
                Err(status) => status.code(),
            }
        }
        other => return Err(format!("unknown demo service '{other}'").into()),
    };

    println!("{}: {code:?}", args.service);
    std::process::exit(if code == Code::Unimplemented { 0 } else { 1 });
}
