//! 密钥派生引擎（KDF）模块
//!
//! 本模块定义派生引擎的能力接口 `KdfEngine`，
//! 并提供基于 `argon2` crate 的默认实现 `Argon2BytesGenerator`。
//!
//! 约定：
//! - 引擎在构造时绑定一份密码与一份参数集，生命周期内不再改变
//! - 每次取字节都从头计算，同样的长度得到同样的输出
//! - `clear()` 之后引擎持有的密码 / salt / secret 均已清零

use argon2::{Argon2, Params};
use rand::{RngCore, rngs::OsRng};
use zeroize::{Zeroize, Zeroizing};

use crate::crypto::params::{Argon2Parameters, Argon2Variant, Argon2Version};
use crate::error::Result;

/// 随机 salt 长度（字节）
pub const SALT_SIZE: usize = 16;

/// 派生引擎能力接口
pub trait KdfEngine: Sized {
    /// 绑定 (密码, 参数集) 构造引擎
    fn init(password: &[u8], parameters: &Argon2Parameters) -> Result<Self>;

    /// 将派生结果写满 `out`
    fn generate_bytes(&self, out: &mut [u8]) -> Result<()>;

    /// 清零引擎内部的敏感状态
    fn clear(&mut self);

    /// 派生 `len` 字节（自动 zeroize）
    fn get_bytes(&self, len: usize) -> Result<Zeroizing<Vec<u8>>> {
        let mut out = Zeroizing::new(vec![0u8; len]);
        self.generate_bytes(&mut out)?;
        Ok(out)
    }
}

/// 基于 RustCrypto `argon2` 的派生引擎
pub struct Argon2BytesGenerator {
    variant: Argon2Variant,
    version: Argon2Version,
    params: Params,
    password: Zeroizing<Vec<u8>>,
    salt: Zeroizing<Vec<u8>>,
    secret: Zeroizing<Vec<u8>>,
}

impl KdfEngine for Argon2BytesGenerator {
    fn init(password: &[u8], parameters: &Argon2Parameters) -> Result<Self> {
        Ok(Self {
            variant: parameters.variant(),
            version: parameters.version(),
            params: parameters.argon2_params()?,
            password: Zeroizing::new(password.to_vec()),
            salt: Zeroizing::new(parameters.salt().to_vec()),
            secret: Zeroizing::new(parameters.secret().to_vec()),
        })
    }

    /// #### 错误
    /// - 输出长度小于 4 字节、salt 少于 8 字节等情况由 argon2 报错
    fn generate_bytes(&self, out: &mut [u8]) -> Result<()> {
        let argon2 = Argon2::new_with_secret(
            &self.secret,
            self.variant.algorithm(),
            self.version.version(),
            self.params.clone(),
        )?;

        argon2.hash_password_into(&self.password, &self.salt, out)?;

        tracing::trace!(variant = %self.variant, len = out.len(), "argon2 output generated");
        Ok(())
    }

    fn clear(&mut self) {
        self.password.zeroize();
        self.salt.zeroize();
        self.secret.zeroize();
    }
}

/// 生成用于 KDF 的随机 salt
///
/// 每次派生新密钥都应使用独立的 salt，严禁复用。
pub fn generate_salt() -> [u8; SALT_SIZE] {
    let mut salt = [0u8; SALT_SIZE];
    OsRng.fill_bytes(&mut salt);
    salt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_parameters(variant: Argon2Variant) -> Argon2Parameters {
        variant
            .builder()
            .with_salt(b"somesalt")
            .with_iterations(1)
            .with_memory_as_kb(64)
            .build()
            .unwrap()
    }

    #[test]
    fn get_bytes_returns_requested_length() {
        let engine = Argon2BytesGenerator::init(b"password", &fast_parameters(Argon2Variant::Argon2id))
            .unwrap();

        for len in [4, 16, 32, 48, 100] {
            assert_eq!(engine.get_bytes(len).unwrap().len(), len);
        }
    }

    #[test]
    fn output_is_repeatable() {
        let engine = Argon2BytesGenerator::init(b"password", &fast_parameters(Argon2Variant::Argon2d))
            .unwrap();

        let first = engine.get_bytes(32).unwrap();
        let second = engine.get_bytes(32).unwrap();
        assert_eq!(*first, *second);
    }

    #[test]
    fn variants_produce_different_output() {
        let d = Argon2BytesGenerator::init(b"password", &fast_parameters(Argon2Variant::Argon2d))
            .unwrap()
            .get_bytes(32)
            .unwrap();
        let i = Argon2BytesGenerator::init(b"password", &fast_parameters(Argon2Variant::Argon2i))
            .unwrap()
            .get_bytes(32)
            .unwrap();

        assert_ne!(*d, *i);
    }

    #[test]
    fn too_short_output_is_rejected_by_argon2() {
        let engine = Argon2BytesGenerator::init(b"password", &fast_parameters(Argon2Variant::Argon2id))
            .unwrap();

        assert!(engine.get_bytes(3).is_err());
    }

    #[test]
    fn clear_wipes_inputs() {
        let mut engine =
            Argon2BytesGenerator::init(b"password", &fast_parameters(Argon2Variant::Argon2id))
                .unwrap();
        engine.clear();

        assert!(engine.password.is_empty());
        assert!(engine.salt.is_empty());
        assert!(engine.secret.is_empty());
    }

    #[test]
    fn salts_are_random() {
        assert_ne!(generate_salt(), generate_salt());
    }
}
