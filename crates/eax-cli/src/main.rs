//! Command-line interface for `omac-eax`.

#![forbid(unsafe_code)]

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use block_core::Aes;
use clap::{Args, Parser, Subcommand};
use eax_aead::{Eax, EaxError};
use omac_core::Cmac;
use rand::{CryptoRng, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// CMAC / EAX CLI.
#[derive(Parser)]
#[command(
    name = "eax",
    version,
    author,
    about = "CMAC tagging and EAX authenticated encryption over AES"
)]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG).
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the hex CMAC of a file.
    Mac {
        /// AES key as 32, 48 or 64 hex characters.
        #[arg(long, value_name = "HEX")]
        key_hex: String,
        /// File to authenticate.
        #[arg(long, value_name = "FILE")]
        input: PathBuf,
        /// Truncate the tag to this many bytes.
        #[arg(long, default_value_t = 16)]
        tag_len: usize,
    },
    /// Encrypt and authenticate a file.
    Seal {
        #[command(flatten)]
        params: AeadParams,
        /// Plaintext input path.
        #[arg(long, value_name = "FILE")]
        input: PathBuf,
        /// Output path for ciphertext followed by the tag.
        #[arg(long, value_name = "FILE")]
        output: PathBuf,
    },
    /// Verify and decrypt a sealed file. Nothing is written if verification fails.
    Open {
        #[command(flatten)]
        params: AeadParams,
        /// Sealed input path (ciphertext followed by the tag).
        #[arg(long, value_name = "FILE")]
        input: PathBuf,
        /// Output plaintext path.
        #[arg(long, value_name = "FILE")]
        output: PathBuf,
    },
    /// Run the built-in CMAC and EAX reference vectors.
    Check,
    /// Run a local demo: random key and nonce, seal random data, open it back.
    Demo {
        /// Optional RNG seed for reproducibility.
        #[arg(long)]
        seed: Option<u64>,
        /// Length of the random message.
        #[arg(long, default_value_t = 48)]
        len: usize,
    },
}

/// Parameters shared by `seal` and `open`.
#[derive(Args)]
struct AeadParams {
    /// AES key as 32, 48 or 64 hex characters.
    #[arg(long, value_name = "HEX")]
    key_hex: String,
    /// Nonce as hex; must never repeat under the same key.
    #[arg(long, value_name = "HEX")]
    nonce_hex: String,
    /// Associated data as hex (authenticated, not encrypted).
    #[arg(long, value_name = "HEX", default_value = "")]
    aad_hex: String,
    /// Tag length in bytes (1 to 16).
    #[arg(long, default_value_t = 16)]
    tag_len: usize,
}

impl AeadParams {
    fn build(&self) -> Result<(Eax<Aes>, Vec<u8>, Vec<u8>)> {
        let cipher = parse_key_hex(&self.key_hex)?;
        let eax = Eax::new(cipher, self.tag_len).context("configure EAX")?;
        let nonce = hex::decode(self.nonce_hex.trim()).context("decode nonce hex")?;
        let aad = hex::decode(self.aad_hex.trim()).context("decode associated data hex")?;
        Ok((eax, nonce, aad))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Commands::Mac {
            key_hex,
            input,
            tag_len,
        } => cmd_mac(&key_hex, &input, tag_len),
        Commands::Seal {
            params,
            input,
            output,
        } => cmd_seal(&params, &input, &output),
        Commands::Open {
            params,
            input,
            output,
        } => cmd_open(&params, &input, &output),
        Commands::Check => cmd_check(),
        Commands::Demo { seed, len } => cmd_demo(seed, len),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "eax=debug" } else { "eax=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_mac(key_hex: &str, input: &Path, tag_len: usize) -> Result<()> {
    let cipher = parse_key_hex(key_hex)?;
    let mut mac = Cmac::new(cipher).context("configure CMAC")?;
    if tag_len == 0 || tag_len > mac.block_size() {
        bail!("tag length must be between 1 and {}", mac.block_size());
    }
    let mut file = fs::File::open(input).with_context(|| format!("open {}", input.display()))?;
    let absorbed = std::io::copy(&mut file, &mut mac)
        .with_context(|| format!("read {}", input.display()))?;
    debug!(bytes = absorbed, tag_len, "computed CMAC");
    let tag = mac.finalize();
    println!("{}", hex::encode(&tag[..tag_len]));
    Ok(())
}

fn cmd_seal(params: &AeadParams, input: &Path, output: &Path) -> Result<()> {
    let (mut eax, nonce, aad) = params.build()?;
    warn_on_short_nonce(&eax, &nonce);
    let plaintext = fs::read(input).with_context(|| format!("read {}", input.display()))?;
    let sealed = eax.encrypt(&nonce, &plaintext, &aad);
    fs::write(output, &sealed).with_context(|| format!("write {}", output.display()))?;
    info!(
        plaintext = plaintext.len(),
        sealed = sealed.len(),
        tag_len = eax.tag_len(),
        "sealed"
    );
    Ok(())
}

fn cmd_open(params: &AeadParams, input: &Path, output: &Path) -> Result<()> {
    let (mut eax, nonce, aad) = params.build()?;
    let sealed = fs::read(input).with_context(|| format!("read {}", input.display()))?;
    let plaintext = match eax.decrypt(&nonce, &sealed, &aad) {
        Ok(plaintext) => plaintext,
        Err(EaxError::AuthenticationFailed) => {
            warn!(sealed = sealed.len(), "authentication failed");
            bail!("{}: message authentication failed", input.display());
        }
        Err(err) => return Err(err).context("open"),
    };
    fs::write(output, &plaintext).with_context(|| format!("write {}", output.display()))?;
    info!(plaintext = plaintext.len(), "opened");
    Ok(())
}

// NIST SP 800-38B AES-128 CMAC examples.
const CMAC_KEY: &str = "2b7e151628aed2a6abf7158809cf4f3c";
const CMAC_MESSAGE: &str = "6bc1bee22e409f96e93d7e117393172aae2d8a571e03ac9c9eb76fac45af8e51\
                            30c81c46a35ce411e5fbc1191a0a52eff69f2445df4f9b17ad2b417be66c3710";
const CMAC_VECTORS: [(usize, &str); 4] = [
    (0, "bb1d6929e95937287fa37d129b756746"),
    (16, "070a16b46b4d4144f79bdd9dd04a287c"),
    (40, "dfa66747de9ae63030ca32611497c827"),
    (64, "51f0bebf7e3b9d92fc49741779363cfe"),
];

// EAX paper vectors: (msg, key, nonce, header, ciphertext || tag).
const EAX_VECTORS: [(&str, &str, &str, &str, &str); 3] = [
    (
        "",
        "233952dee4d5ed5f9b9c6d6ff80ff478",
        "62ec67f9c3a4a407fcb2a8c49031a8b3",
        "6bfb914fd07eae6b",
        "e037830e8389f27b025a2d6527e79d01",
    ),
    (
        "f7fb",
        "91945d3f4dcbee0bf45ef52255f095a4",
        "becaf043b0a23d843194ba972c66debd",
        "fa3bfd4806eb53fa",
        "19dd5c4c9331049d0bdab0277408f67967e5",
    ),
    (
        "ca40d7446e545ffaed3bd12a740a659ffbbb3ceab7",
        "8395fcf1e95bebd697bd010bc766aac3",
        "22e7add93cfc6393c57ec0b3c17d6b44",
        "126735fcc320d25a",
        "cb8920f87a6c75cff39627b56e3ed197c552d295a7cfc46afc253b4652b1af3795b124ab6e",
    ),
];

fn cmd_check() -> Result<()> {
    let message = hex::decode(CMAC_MESSAGE).context("decode CMAC message")?;
    let mut mac = Cmac::new(parse_key_hex(CMAC_KEY)?).context("configure CMAC")?;
    for (len, expected) in CMAC_VECTORS {
        mac.reset();
        mac.update(&message[..len]);
        let actual = hex::encode(mac.finalize());
        if actual != expected {
            bail!("CMAC mismatch for {len}-byte message: got {actual}, expected {expected}");
        }
        debug!(len, "CMAC vector ok");
    }

    for (i, (msg, key, nonce, header, sealed)) in EAX_VECTORS.iter().enumerate() {
        let mut eax = Eax::new(parse_key_hex(key)?, 16).context("configure EAX")?;
        let nonce = hex::decode(nonce).context("decode nonce")?;
        let header = hex::decode(header).context("decode header")?;
        let msg = hex::decode(msg).context("decode message")?;
        let actual = hex::encode(eax.encrypt(&nonce, &msg, &header));
        if actual != *sealed {
            bail!("EAX vector {} mismatch: got {actual}, expected {sealed}", i + 1);
        }
        let sealed = hex::decode(sealed).context("decode ciphertext")?;
        let opened = eax
            .decrypt(&nonce, &sealed, &header)
            .with_context(|| format!("open EAX vector {}", i + 1))?;
        if opened != msg {
            bail!("EAX vector {} did not round-trip", i + 1);
        }
        debug!(vector = i + 1, "EAX vector ok");
    }

    println!(
        "ok: {} CMAC and {} EAX vectors",
        CMAC_VECTORS.len(),
        EAX_VECTORS.len()
    );
    Ok(())
}

fn cmd_demo(seed: Option<u64>, len: usize) -> Result<()> {
    let mut rng = seeded_rng(seed);
    let mut key = [0u8; 16];
    let mut nonce = [0u8; 16];
    let mut aad = [0u8; 8];
    let mut plaintext = vec![0u8; len];
    rng.fill_bytes(&mut key);
    rng.fill_bytes(&mut nonce);
    rng.fill_bytes(&mut aad);
    rng.fill_bytes(&mut plaintext);

    let mut eax = Eax::aes(&key, 16).context("configure EAX")?;
    let sealed = eax.encrypt(&nonce, &plaintext, &aad);
    let opened = eax
        .decrypt(&nonce, &sealed, &aad)
        .context("open demo message")?;

    println!("demo key: {}", hex::encode(key));
    println!("nonce: {}", hex::encode(nonce));
    println!("aad: {}", hex::encode(aad));
    println!("plaintext: {}", hex::encode(&plaintext));
    println!("sealed: {}", hex::encode(&sealed));
    println!("opened: {}", hex::encode(&opened));
    if opened != plaintext {
        bail!("demo roundtrip failed");
    }

    let mut tampered = sealed;
    if let Some(byte) = tampered.first_mut() {
        *byte ^= 0x01;
    }
    if eax.decrypt(&nonce, &tampered, &aad).is_ok() {
        bail!("demo tampered message was accepted");
    }
    println!("tampered: rejected");
    Ok(())
}

fn parse_key_hex(hex_str: &str) -> Result<Aes> {
    let bytes = hex::decode(hex_str.trim()).context("decode key hex")?;
    Aes::new(&bytes).context("AES key must be 16, 24 or 32 bytes (32, 48 or 64 hex characters)")
}

fn warn_on_short_nonce(eax: &Eax<Aes>, nonce: &[u8]) {
    if nonce.len() < eax.nonce_size() {
        warn!(
            nonce = nonce.len(),
            recommended = eax.nonce_size(),
            "nonce shorter than one block"
        );
    }
}

fn seeded_rng(seed: Option<u64>) -> impl RngCore + CryptoRng {
    match seed {
        Some(value) => {
            let mut seed_bytes = [0u8; 32];
            seed_bytes[..8].copy_from_slice(&value.to_le_bytes());
            ChaCha20Rng::from_seed(seed_bytes)
        }
        None => {
            let mut seed_bytes = [0u8; 32];
            rand::rngs::OsRng.fill_bytes(&mut seed_bytes);
            ChaCha20Rng::from_seed(seed_bytes)
        }
    }
}
