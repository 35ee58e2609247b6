#![deny(missing_docs)]
//! A command-line interface for the filesafe service.

use clap::{Parser, Subcommand};
use log::{error, info};
use std::path::{Path, PathBuf};
use std::process;

use filesafe_core::config::{self, MailConfig, OtpConfig};
use filesafe_core::error::Error;
use filesafe_core::gateway;
use filesafe_core::keystore::KeyMaterial;
use filesafe_core::mailer::{self, OtpSender, SmtpMailer};
use filesafe_core::totp;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(
    after_help = "EXAMPLES:\n  \n# Encrypt a file into the downloads directory\nfilesafe-cli encrypt ./report.pdf\n\n# Decrypt an artifact back in place\nfilesafe-cli decrypt ./uploads/report.pdf.encrypted\n\n# Email a one-time code\nfilesafe-cli send-otp user@example.com"
)]
struct Cli {
    /// Path to the symmetric key file. Created on first use if absent.
    #[arg(long, global = true)]
    key_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt a file, writing the artifact to the downloads directory
    Encrypt {
        /// Path of the file to encrypt
        path: String,

        /// Directory to write the encrypted artifact into
        #[arg(short, long, value_name = "DIR")]
        output_dir: Option<PathBuf>,
    },
    /// Decrypt an encrypted artifact back to its original bytes
    Decrypt {
        /// Path of the artifact to decrypt
        path: String,
    },
    /// Derive a one-time code and email it to the recipient
    SendOtp {
        /// Recipient email address
        email: String,
    },
}

fn main() {
    dotenvy::dotenv().ok();
    env_logger::init();
    let cli = Cli::parse();

    let base = config::data_dir();
    let key_path = cli
        .key_file
        .clone()
        .unwrap_or_else(|| config::key_file(&base));

    match &cli.command {
        Commands::Encrypt { path, output_dir } => {
            let key = load_key(&key_path);
            let dir = output_dir
                .clone()
                .unwrap_or_else(|| config::download_dir(&base));
            match gateway::encrypt_file(&key, path, &dir) {
                Ok(file_name) => {
                    println!("Encrypted '{}' to '{}'", path, dir.join(file_name).display());
                }
                Err(e) => fail(&e),
            }
        }
        Commands::Decrypt { path } => {
            let key = load_key(&key_path);
            match gateway::decrypt_file(&key, path) {
                Ok(output) => {
                    println!("Decrypted '{}' to '{}'", path, output.display());
                }
                Err(e) => fail(&e),
            }
        }
        Commands::SendOtp { email } => {
            if let Err(e) = mailer::validate_email(email) {
                fail(&e);
            }
            let otp_config = OtpConfig::from_env().unwrap_or_else(|e| fail(&e));
            let secret = totp::decode_secret(&otp_config.secret).unwrap_or_else(|e| fail(&e));
            let code = totp::totp_now(&secret, otp_config.step, otp_config.digits);
            info!("derived a {}-digit code for {email}", otp_config.digits);

            let mail_config = MailConfig::from_env().unwrap_or_else(|e| fail(&e));
            match SmtpMailer::new(mail_config).send(&code, email) {
                Ok(()) => println!("Generated OTP: {code} sent to {email}"),
                Err(e) => fail(&e),
            }
        }
    }
}

fn load_key(path: &Path) -> KeyMaterial {
    KeyMaterial::load_or_generate(path).unwrap_or_else(|e| {
        error!("Failed to load the encryption key: {e}");
        process::exit(1);
    })
}

fn fail(e: &Error) -> ! {
    error!("{e}");
    process::exit(1);
}
