//! 密钥所绑定的算法名称表。
//!
//! 只负责「算法名 -> 合法密钥长度 / 标称 IV 长度」的查询，
//! 不提供任何加解密实现。

use std::fmt;
use std::str::FromStr;

use crate::error::KdfError;

/// 可绑定到派生密钥上的算法。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAlgorithm {
    Aes,
    Aes256Gcm,
    ChaCha20,
    ChaCha20Poly1305,
    XChaCha20Poly1305,
}

impl KeyAlgorithm {
    pub const ALL: [KeyAlgorithm; 5] = [
        Self::Aes,
        Self::Aes256Gcm,
        Self::ChaCha20,
        Self::ChaCha20Poly1305,
        Self::XChaCha20Poly1305,
    ];

    /// 规范名称（大写）
    pub fn name(self) -> &'static str {
        match self {
            Self::Aes => "AES",
            Self::Aes256Gcm => "AES-256-GCM",
            Self::ChaCha20 => "CHACHA20",
            Self::ChaCha20Poly1305 => "CHACHA20-POLY1305",
            Self::XChaCha20Poly1305 => "XCHACHA20-POLY1305",
        }
    }

    /// 该算法接受的密钥长度（字节）
    pub fn key_sizes(self) -> &'static [usize] {
        match self {
            Self::Aes => &[16, 24, 32],
            Self::Aes256Gcm
            | Self::ChaCha20
            | Self::ChaCha20Poly1305
            | Self::XChaCha20Poly1305 => &[32],
        }
    }

    /// 标称 IV / nonce 长度（字节）
    pub fn nominal_iv_size(self) -> usize {
        match self {
            Self::Aes => 16,
            Self::Aes256Gcm | Self::ChaCha20 | Self::ChaCha20Poly1305 => 12,
            Self::XChaCha20Poly1305 => 24,
        }
    }

    pub fn accepts_key_size(self, len: usize) -> bool {
        self.key_sizes().contains(&len)
    }

    /// 按名称查找，大小写不敏感；`_` 与 `-` 等价。
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = name.trim().to_ascii_uppercase().replace('_', "-");
        Self::ALL.into_iter().find(|alg| alg.name() == normalized)
    }
}

impl fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for KeyAlgorithm {
    type Err = KdfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| KdfError::UnknownAlgorithm(s.to_string()))
    }
}
