//! # proof-stamp CLI
//!
//! Offline inspection and verification of shared proof tokens.

use anyhow::{bail, Context};
use bitcoin::hex::DisplayHex;
use clap::Parser;
use proof_stamp::{
    share_url_for_token, signed_message_hash, token_from_url, verify, Codec, CodecConfig,
    DecodeError,
};

/// Inspect and verify signed-statement proofs.
#[derive(Parser, Debug)]
#[command(name = "proof-stamp", version, about)]
struct Cli {
    /// Print machine-readable JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    /// Longest message accepted, in bytes. The token limit follows from it.
    #[arg(long, global = true, default_value_t = CodecConfig::default().max_message_len)]
    max_message_len: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Decode a token and print its fields without verifying.
    Decode {
        /// Token or share link.
        input: String,
    },
    /// Decode and verify a token or share link.
    Verify {
        /// Token or share link.
        input: String,
    },
    /// Print the personal-message digest of a statement.
    Hash {
        message: String,
    },
    /// Build a share link for a token.
    Link {
        /// Base URL of the verifying site.
        #[arg(long)]
        base: String,
        token: String,
    },
}

/// Accepts either a bare token or a link carrying one.
fn extract_token(input: &str) -> Result<String, DecodeError> {
    if input.contains("://") {
        return token_from_url(input).ok_or(DecodeError::MissingField("token"));
    }
    Ok(input.trim().to_owned())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let codec = Codec::new(CodecConfig {
        max_message_len: cli.max_message_len,
    });

    match cli.command {
        Commands::Decode { input } => {
            let token = extract_token(&input)?;
            let decoded = codec
                .decode_with_warnings(&token)
                .context("this proof link is invalid or corrupted")?;
            for warning in &decoded.warnings {
                tracing::warn!(%warning, "decoded with warnings");
            }

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&decoded.proof)?);
            } else {
                let proof = &decoded.proof;
                println!("message:   {}", proof.message());
                println!("signer:    {}", proof.signer());
                println!("signature: {}", proof.signature());
                match proof.signed_at() {
                    Some(t) => println!("signed at: {}", t.to_rfc3339()),
                    None => println!("signed at: unknown"),
                }
            }
        }
        Commands::Verify { input } => {
            let token = extract_token(&input)?;
            let proof = codec
                .decode(&token)
                .context("this proof link is invalid or corrupted")?;
            let result = verify(&proof);

            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "proof": proof,
                        "result": result,
                    }))?
                );
            } else if result.valid {
                println!("valid: {} signed {:?}", proof.signer(), proof.message());
            } else if let Some(reason) = result.reason {
                println!("invalid: {reason}");
                if let Some(recovered) = result.recovered_signer {
                    println!("recovered signer: {recovered}");
                }
            }

            if !result.valid {
                bail!("proof did not verify");
            }
        }
        Commands::Hash { message } => {
            let digest = signed_message_hash(message.as_bytes());
            println!("0x{}", digest.to_lower_hex_string());
        }
        Commands::Link { base, token } => {
            // validate before handing the token to anyone else
            codec
                .decode(&token)
                .context("refusing to build a link for an invalid token")?;
            println!("{}", share_url_for_token(&base, token.trim())?);
        }
    }

    Ok(())
}
