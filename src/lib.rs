//! Argon2 口令密钥派生：把密码与派生设置转换为原始密钥、
//! 绑定算法的密钥、密钥 + IV 或 MAC 密钥。

pub mod algorithm;
pub mod crypto;
pub mod error;
pub mod generator;

pub use algorithm::KeyAlgorithm;
pub use crypto::kdf::{Argon2BytesGenerator, KdfEngine, generate_salt};
pub use crypto::keys::{
    CipherParameterFactory, DefaultParameterFactory, KeyParameter, KeyParameterWithIv,
};
pub use crypto::params::{
    Argon2Parameters, Argon2ParametersBuilder, Argon2Variant, Argon2Version, MemoryCostType,
};
pub use error::KdfError;
pub use generator::{Argon2ParametersGenerator, Argon2Settings};
