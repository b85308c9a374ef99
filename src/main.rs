//! argon2-keygen 命令行入口
//!
//! 用法：
//!   argon2-keygen [OPTIONS] key --length <N>
//!   argon2-keygen [OPTIONS] cipher --algorithm <NAME> --key-bits <K> [--iv-bits <V>]
//!   argon2-keygen [OPTIONS] mac --key-bits <K>
//!
//! 派生结果以十六进制输出到 stdout，日志输出到 stderr。
//! 未提供 `--salt` 时随机生成一个 salt 并一并输出。

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use zeroize::Zeroizing;

use argon2_keygen::{
    Argon2ParametersGenerator, Argon2Settings, Argon2Variant, Argon2Version, KeyAlgorithm,
    MemoryCostType, generate_salt,
};

#[derive(Parser)]
#[command(name = "argon2-keygen", version, about = "Derive key material from a password with Argon2")]
struct Cli {
    /// argon2d | argon2i | argon2id
    #[arg(long, default_value = "argon2id")]
    variant: Argon2Variant,

    /// 16 / 0x10 or 19 / 0x13
    #[arg(long = "argon2-version", default_value = "19")]
    argon2_version: Argon2Version,

    /// Salt as hex; random when omitted
    #[arg(long)]
    salt: Option<String>,

    /// Secret (pepper) as hex
    #[arg(long)]
    secret: Option<String>,

    /// Additional associated data as hex
    #[arg(long)]
    additional: Option<String>,

    #[arg(long, default_value_t = 3)]
    iterations: u32,

    /// Memory cost, interpreted according to --memory-type
    #[arg(long, default_value_t = 65536)]
    memory: u32,

    /// kb | pow2
    #[arg(long, default_value = "kb")]
    memory_type: MemoryCostType,

    #[arg(long, default_value_t = 1)]
    parallelism: u32,

    /// Password; prompted for when omitted
    #[arg(long)]
    password: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Raw derived key
    Key {
        #[arg(long, default_value_t = 32)]
        length: usize,
    },
    /// Key bound to a cipher algorithm, optionally with an IV
    Cipher {
        #[arg(long)]
        algorithm: KeyAlgorithm,
        #[arg(long, default_value_t = 256)]
        key_bits: usize,
        /// Defaults to the algorithm's nominal IV size; 0 disables the IV
        #[arg(long)]
        iv_bits: Option<usize>,
    },
    /// MAC key
    Mac {
        #[arg(long, default_value_t = 256)]
        key_bits: usize,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn decode_hex(label: &str, value: Option<&str>) -> Result<Zeroizing<Vec<u8>>> {
    let bytes = match value {
        Some(value) => hex::decode(value).with_context(|| format!("invalid hex for --{label}"))?,
        None => Vec::new(),
    };
    Ok(Zeroizing::new(bytes))
}

fn main() -> Result<()> {
    let mut cli = Cli::parse();
    init_logging(cli.verbose);

    // ---------- 准备派生输入 ----------
    let salt = match cli.salt.as_deref() {
        Some(value) => decode_hex("salt", Some(value))?,
        None => {
            let salt = generate_salt();
            println!("salt: {}", hex::encode(salt));
            Zeroizing::new(salt.to_vec())
        }
    };
    let secret = decode_hex("secret", cli.secret.as_deref())?;
    let additional = decode_hex("additional", cli.additional.as_deref())?;

    let password = match cli.password.take() {
        Some(password) => Zeroizing::new(password),
        None => Zeroizing::new(
            rpassword::prompt_password("Password: ").context("failed to read password")?,
        ),
    };

    let settings = Argon2Settings {
        variant: cli.variant,
        version: cli.argon2_version,
        salt: &salt,
        secret: &secret,
        additional: &additional,
        iterations: cli.iterations,
        memory: cli.memory,
        parallelism: cli.parallelism,
        memory_cost_type: cli.memory_type,
    };

    // ---------- 初始化生成器 ----------
    let mut generator = Argon2ParametersGenerator::new();
    generator
        .init(password.as_bytes(), &settings)
        .context("invalid Argon2 parameters")?;

    // ---------- 派生并输出 ----------
    match cli.command {
        Command::Key { length } => {
            let key = generator
                .generate_derived_key(length)
                .context("key derivation failed")?;
            println!("key: {}", hex::encode(&*key));
        }
        Command::Cipher {
            algorithm,
            key_bits,
            iv_bits,
        } => {
            let iv_bits = iv_bits.unwrap_or(algorithm.nominal_iv_size() * 8);
            if iv_bits == 0 {
                let key = generator
                    .generate_derived_parameters(algorithm.name(), key_bits)
                    .context("key derivation failed")?;
                println!("key: {}", hex::encode(key.key()));
            } else {
                let params = generator
                    .generate_derived_parameters_with_iv(algorithm.name(), key_bits, iv_bits)
                    .context("key derivation failed")?;
                println!("key: {}", hex::encode(params.key().key()));
                println!("iv: {}", hex::encode(params.iv()));
            }
        }
        Command::Mac { key_bits } => {
            let key = generator
                .generate_derived_mac_parameters(key_bits)
                .context("key derivation failed")?;
            println!("mac-key: {}", hex::encode(key.key()));
        }
    }

    generator.clear();

    Ok(())
}
