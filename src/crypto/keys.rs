//! 派生密钥的承载类型与构造工厂
//!
//! - `KeyParameter`：一段密钥字节，可选绑定算法
//! - `KeyParameterWithIv`：密钥 + IV 组合
//! - `CipherParameterFactory`：按算法名把字节区间包装为上述类型
//!
//! 所有密钥 / IV 字节在析构时清零，`Debug` 输出不含明文。

use std::fmt;

use zeroize::Zeroizing;

use crate::algorithm::KeyAlgorithm;
use crate::error::{KdfError, Result};

/// 一段密钥字节
pub struct KeyParameter {
    algorithm: Option<KeyAlgorithm>,
    key: Zeroizing<Vec<u8>>,
}

impl KeyParameter {
    /// 不绑定算法的密钥（用于 MAC 等场景）
    pub fn new(key: &[u8]) -> Self {
        Self {
            algorithm: None,
            key: Zeroizing::new(key.to_vec()),
        }
    }

    pub fn with_algorithm(algorithm: KeyAlgorithm, key: &[u8]) -> Self {
        Self {
            algorithm: Some(algorithm),
            key: Zeroizing::new(key.to_vec()),
        }
    }

    pub fn algorithm(&self) -> Option<KeyAlgorithm> {
        self.algorithm
    }

    pub fn key(&self) -> &[u8] {
        &self.key
    }

    pub fn len(&self) -> usize {
        self.key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.key.is_empty()
    }
}

impl fmt::Debug for KeyParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyParameter")
            .field("algorithm", &self.algorithm)
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// 密钥 + IV
pub struct KeyParameterWithIv {
    key: KeyParameter,
    iv: Zeroizing<Vec<u8>>,
}

impl KeyParameterWithIv {
    pub fn new(key: KeyParameter, iv: &[u8]) -> Self {
        Self {
            key,
            iv: Zeroizing::new(iv.to_vec()),
        }
    }

    pub fn key(&self) -> &KeyParameter {
        &self.key
    }

    pub fn iv(&self) -> &[u8] {
        &self.iv
    }
}

impl fmt::Debug for KeyParameterWithIv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyParameterWithIv")
            .field("key", &self.key)
            .field("iv_len", &self.iv.len())
            .finish()
    }
}

/// 密钥参数构造工厂
pub trait CipherParameterFactory {
    /// 取 `bytes[offset..offset + length]` 作为 `algorithm` 的密钥
    fn create_key_parameter(
        &self,
        algorithm: &str,
        bytes: &[u8],
        offset: usize,
        length: usize,
    ) -> Result<KeyParameter>;

    /// 取 `bytes[iv_offset..iv_offset + iv_length]` 作为 IV，与 `key` 组合
    fn create_key_parameter_with_iv(
        &self,
        key: KeyParameter,
        bytes: &[u8],
        iv_offset: usize,
        iv_length: usize,
    ) -> Result<KeyParameterWithIv>;
}

/// 默认工厂：按 `KeyAlgorithm` 表识别算法名并校验密钥长度
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultParameterFactory;

impl CipherParameterFactory for DefaultParameterFactory {
    fn create_key_parameter(
        &self,
        algorithm: &str,
        bytes: &[u8],
        offset: usize,
        length: usize,
    ) -> Result<KeyParameter> {
        let alg = KeyAlgorithm::from_name(algorithm)
            .ok_or_else(|| KdfError::UnknownAlgorithm(algorithm.to_string()))?;

        if !alg.accepts_key_size(length) {
            return Err(KdfError::InvalidKeyLength {
                algorithm: alg.name().to_string(),
                length,
            });
        }

        let key = slice(bytes, offset, length)?;
        Ok(KeyParameter::with_algorithm(alg, key))
    }

    fn create_key_parameter_with_iv(
        &self,
        key: KeyParameter,
        bytes: &[u8],
        iv_offset: usize,
        iv_length: usize,
    ) -> Result<KeyParameterWithIv> {
        let iv = slice(bytes, iv_offset, iv_length)?;
        Ok(KeyParameterWithIv::new(key, iv))
    }
}

fn slice(bytes: &[u8], offset: usize, length: usize) -> Result<&[u8]> {
    offset
        .checked_add(length)
        .and_then(|end| bytes.get(offset..end))
        .ok_or(KdfError::OutOfRange {
            offset,
            length,
            available: bytes.len(),
        })
}
