//! env-vault 命令行入口
//!
//! 用法：
//!   env-vault generate-key
//!   env-vault encrypt --file .env.dev [VARIABLE...]
//!   env-vault decrypt --file .env.dev [--reveal]
//!
//! secret key 先从进程环境变量查找，找不到再读基础 `.env` 文件。
//! 所有实际逻辑都委托给库。

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use env_vault::config::{DEFAULT_BASE_FILE, DEFAULT_ENV_DIR, DEFAULT_KEY_NAME};
use env_vault::sanitize::{mask_value, sanitize_string};
use env_vault::{
    EnvFileSecrets, EnvironmentEncryptionCoordinator, KeyStorage, Layered, ProcessEnv, logging,
};

#[derive(Parser)]
#[command(name = "env-vault")]
#[command(version)]
#[command(about = "Encrypt credentials stored in .env files", long_about = None)]
struct Cli {
    #[command(flatten)]
    location: Location,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct Location {
    /// Directory holding the environment files
    #[arg(long, global = true, env = "ENV_VAULT_DIR", default_value = DEFAULT_ENV_DIR)]
    dir: PathBuf,

    /// Base file holding the secret key
    #[arg(long, global = true, env = "ENV_VAULT_BASE_FILE", default_value = DEFAULT_BASE_FILE)]
    base_file: String,

    /// Name of the secret key variable
    #[arg(long, global = true, env = "ENV_VAULT_KEY_NAME", default_value = DEFAULT_KEY_NAME)]
    key_name: String,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a secret key and store it in the base file
    GenerateKey,

    /// Encrypt variables of an environment file in place
    Encrypt {
        /// Environment file name inside --dir
        #[arg(short, long)]
        file: String,

        /// Variable names (or current values) to encrypt; all when omitted
        variables: Vec<String>,
    },

    /// Print the variables of an environment file, decrypting envelopes
    Decrypt {
        /// Environment file name inside --dir
        #[arg(short, long)]
        file: String,

        /// Print decrypted values instead of masking them
        #[arg(long)]
        reveal: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", sanitize_string(&format!("{e:#}")));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let Location {
        dir,
        base_file,
        key_name,
    } = cli.location;

    let base_path = dir.join(&base_file);
    let file_secrets = EnvFileSecrets::load(&base_path)
        .await
        .with_context(|| format!("loading {}", base_path.display()))?;
    let secrets = Layered::new().with(ProcessEnv).with(file_secrets);
    let coordinator = EnvironmentEncryptionCoordinator::with_secrets(Arc::new(secrets));

    match cli.command {
        Command::GenerateKey => {
            match coordinator
                .generate_and_store_secret_key(&dir, &base_file, &key_name)
                .await?
            {
                KeyStorage::Stored => println!("Stored {key_name} in {}", base_path.display()),
                KeyStorage::AlreadyExists => {
                    println!("{key_name} already exists in {}", base_path.display())
                }
            }
        }
        Command::Encrypt { file, variables } => {
            let summary = coordinator
                .orchestrate_environment_encryption(&dir, &file, &key_name, &variables)
                .await?;
            println!(
                "{}/{} variable(s) encrypted in {}",
                summary.encrypted.len(),
                summary.considered,
                dir.join(&file).display()
            );
        }
        Command::Decrypt { file, reveal } => {
            let values = coordinator
                .manager()
                .decrypt_environment_variables(&dir, &file, &key_name)
                .await?;
            for (key, value) in values {
                if reveal {
                    println!("{key}={value}");
                } else {
                    println!("{key}={}", mask_value(&value));
                }
            }
        }
    }

    Ok(())
}
