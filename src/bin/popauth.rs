use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};

use popauth::use_cases::{DevicePopManager, PublicKeyExportFormat};

#[derive(Parser, Debug)]
#[command(name = "popauth")]
#[command(about = "Device proof-of-possession key tool", version)]
pub struct Cli {
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Directory where the device key is persisted
    #[arg(long, default_value = "popauth-keys")]
    pub keys_dir: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a fresh device key and print its JWK thumbprint
    Generate,

    /// Print the JWK thumbprint of the existing device key
    Thumbprint,

    /// Mint a signed HTTP request over the device key
    Mint {
        /// Request URL; its authority and path become the u and p claims
        #[arg(long)]
        url: url::Url,

        /// HTTP method for the m claim
        #[arg(long)]
        method: Option<String>,

        /// Server nonce for the nonce claim
        #[arg(long)]
        nonce: Option<String>,

        /// Access token for the at claim
        #[arg(long)]
        access_token: Option<String>,

        /// Opaque client claims string
        #[arg(long)]
        client_claims: Option<String>,

        /// Unix timestamp for the ts claim. Defaults to now
        #[arg(long)]
        timestamp: Option<i64>,
    },

    /// Verify a signed HTTP request (read from stdin) and print its claims
    Verify,

    /// Print the req_cnf value for token requests
    ReqCnf,

    /// Export the public half of the device key
    PublicKey {
        #[arg(long, default_value = "pem")]
        format: FormatArg,
    },

    /// Delete the device key
    Clear,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FormatArg {
    Pem,
    Base64,
    Jwk,
}

impl From<FormatArg> for PublicKeyExportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Pem => PublicKeyExportFormat::SubjectPublicKeyInfoPem,
            FormatArg::Base64 => PublicKeyExportFormat::SubjectPublicKeyInfoBase64,
            FormatArg::Jwk => PublicKeyExportFormat::Jwk,
        }
    }
}

fn manager(keys_dir: PathBuf) -> anyhow::Result<DevicePopManager> {
    popauth::file_backed_pop_manager(keys_dir).context("failed to open the key store")
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.verbosity)
        .init();

    let manager = manager(cli.keys_dir)?;

    match cli.command {
        Commands::Generate => {
            let thumbprint = manager
                .generate_asymmetric_key()
                .context("failed to generate the device key")?;
            println!("{thumbprint}");
        }
        Commands::Thumbprint => {
            let thumbprint = manager
                .get_asymmetric_key_thumbprint()
                .context("no device key; run generate first")?;
            println!("{thumbprint}");
        }
        Commands::Mint {
            url,
            method,
            nonce,
            access_token,
            client_claims,
            timestamp,
        } => {
            let params = popauth::model::ShrParameters {
                home_account_id: String::new(),
                http_method: method,
                url,
                nonce,
                client_claims,
            };
            let token = match timestamp {
                Some(ts) => manager.mint_signed_http_request(&params, access_token.as_deref(), ts),
                None => manager.mint_signed_http_request_now(&params, access_token.as_deref()),
            }
            .context("failed to mint the signed HTTP request")?;
            println!("{token}");
        }
        Commands::Verify => {
            let mut token = String::new();
            io::stdin().read_to_string(&mut token)?;
            let claims = manager
                .verify_signed_http_request(token.trim())
                .context("verification failed")?;
            println!("{}", serde_json::to_string_pretty(&claims)?);
        }
        Commands::ReqCnf => {
            let req_cnf = manager
                .get_request_confirmation()
                .context("no device key; run generate first")?;
            println!("{req_cnf}");
        }
        Commands::PublicKey { format } => {
            let exported = manager
                .get_public_key(format.into())
                .context("no device key; run generate first")?;
            println!("{exported}");
        }
        Commands::Clear => {
            if manager.clear_asymmetric_key()? {
                println!("device key removed");
            } else {
                println!("no device key to remove");
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_cmd::Command;

    #[test]
    fn test_cli_version_parameter() {
        let mut cmd = Command::cargo_bin("popauth").unwrap();
        let assert = cmd.arg("--version").assert();
        assert.success();
    }
}
