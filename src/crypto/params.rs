//! Argon2 参数构建
//!
//! - `Argon2Variant::builder()` 根据变体选出对应的构建器
//! - 构建器通过链式 `with_*` 方法配置，`build()` 产出不可变的参数集
//! - 参数集与构建器中的 salt / secret / additional 均在清理或析构时清零
//!
//! 取值范围的校验（迭代次数、内存、并行度、additional 长度等）
//! 全部委托给 `argon2` crate，本模块不做重复校验。

use std::fmt;
use std::str::FromStr;

use argon2::{Algorithm, Argon2, AssociatedData, Params, Version};
use zeroize::{Zeroize, Zeroizing};

use crate::error::{KdfError, Result};

/// 默认迭代次数
pub const DEFAULT_ITERATIONS: u32 = 3;

/// 默认内存成本（以 2 的幂表示，2^12 KiB = 4 MiB）
pub const DEFAULT_MEMORY_POW2: u32 = 12;

/// 默认并行度
pub const DEFAULT_LANES: u32 = 1;

/// Argon2 变体
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Argon2Variant {
    Argon2d,
    Argon2i,
    Argon2id,
}

impl Argon2Variant {
    pub const ARGON2D_ID: u8 = 0;
    pub const ARGON2I_ID: u8 = 1;
    pub const ARGON2ID_ID: u8 = 2;

    pub fn to_u8(self) -> u8 {
        match self {
            Self::Argon2d => Self::ARGON2D_ID,
            Self::Argon2i => Self::ARGON2I_ID,
            Self::Argon2id => Self::ARGON2ID_ID,
        }
    }

    /// 由数值标识转换；未知标识返回 `InvalidVariant`。
    pub fn from_id(value: u8) -> Result<Self> {
        match value {
            Self::ARGON2D_ID => Ok(Self::Argon2d),
            Self::ARGON2I_ID => Ok(Self::Argon2i),
            Self::ARGON2ID_ID => Ok(Self::Argon2id),
            other => Err(KdfError::InvalidVariant(other.to_string())),
        }
    }

    /// 选出该变体对应的参数构建器
    pub fn builder(self) -> Argon2ParametersBuilder {
        Argon2ParametersBuilder::new(self)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Argon2d => "argon2d",
            Self::Argon2i => "argon2i",
            Self::Argon2id => "argon2id",
        }
    }

    pub(crate) fn algorithm(self) -> Algorithm {
        match self {
            Self::Argon2d => Algorithm::Argon2d,
            Self::Argon2i => Algorithm::Argon2i,
            Self::Argon2id => Algorithm::Argon2id,
        }
    }
}

impl fmt::Display for Argon2Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Argon2Variant {
    type Err = KdfError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "argon2d" | "d" => Ok(Self::Argon2d),
            "argon2i" | "i" => Ok(Self::Argon2i),
            "argon2id" | "id" => Ok(Self::Argon2id),
            _ => Err(KdfError::InvalidVariant(s.to_string())),
        }
    }
}

/// Argon2 版本号
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Argon2Version {
    /// 1.0（0x10）
    V10,
    /// 1.3（0x13）
    #[default]
    V13,
}

impl Argon2Version {
    pub fn to_u32(self) -> u32 {
        match self {
            Self::V10 => 0x10,
            Self::V13 => 0x13,
        }
    }

    pub fn from_u32(value: u32) -> Result<Self> {
        match value {
            0x10 => Ok(Self::V10),
            0x13 => Ok(Self::V13),
            other => Err(KdfError::InvalidVersion(format!("{other:#x}"))),
        }
    }

    pub(crate) fn version(self) -> Version {
        match self {
            Self::V10 => Version::V0x10,
            Self::V13 => Version::V0x13,
        }
    }
}

impl FromStr for Argon2Version {
    type Err = KdfError;

    /// 接受 `16` / `0x10` / `1.0` 与 `19` / `0x13` / `1.3`
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let parsed = match s {
            "1.0" => Some(0x10),
            "1.3" => Some(0x13),
            _ => match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
                Some(hex) => u32::from_str_radix(hex, 16).ok(),
                None => s.parse::<u32>().ok(),
            },
        };

        match parsed {
            Some(value) => Self::from_u32(value),
            None => Err(KdfError::InvalidVersion(s.to_string())),
        }
    }
}

/// 内存成本的编码方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryCostType {
    /// `memory` 直接表示 KiB
    Kb,
    /// `memory` 表示指数，实际内存为 2^memory KiB
    PowerOfTwo,
}

impl MemoryCostType {
    pub const KB_ID: u8 = 0;
    pub const POWER_OF_TWO_ID: u8 = 1;

    pub fn to_u8(self) -> u8 {
        match self {
            Self::Kb => Self::KB_ID,
            Self::PowerOfTwo => Self::POWER_OF_TWO_ID,
        }
    }

    /// 由数值标识转换；未知标识返回 `InvalidMemoryCostType`。
    pub fn from_id(value: u8) -> Result<Self> {
        match value {
            Self::KB_ID => Ok(Self::Kb),
            Self::POWER_OF_TWO_ID => Ok(Self::PowerOfTwo),
            other => Err(KdfError::InvalidMemoryCostType(other.to_string())),
        }
    }
}

impl FromStr for MemoryCostType {
    type Err = KdfError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "kb" | "kib" => Ok(Self::Kb),
            "pow2" | "power-of-two" => Ok(Self::PowerOfTwo),
            _ => Err(KdfError::InvalidMemoryCostType(s.to_string())),
        }
    }
}

/// Argon2 参数构建器
///
/// 链式调用按值传递，`build()` 不消耗构建器，
/// 调用方在构建完成后应执行 `clear()`。
pub struct Argon2ParametersBuilder {
    variant: Argon2Variant,
    version: Argon2Version,
    salt: Zeroizing<Vec<u8>>,
    secret: Zeroizing<Vec<u8>>,
    additional: Zeroizing<Vec<u8>>,
    iterations: u32,
    // None 表示 2 的幂溢出了 u32
    memory_kb: Option<u32>,
    lanes: u32,
}

impl Argon2ParametersBuilder {
    pub fn new(variant: Argon2Variant) -> Self {
        Self {
            variant,
            version: Argon2Version::default(),
            salt: Zeroizing::new(Vec::new()),
            secret: Zeroizing::new(Vec::new()),
            additional: Zeroizing::new(Vec::new()),
            iterations: DEFAULT_ITERATIONS,
            memory_kb: Some(1 << DEFAULT_MEMORY_POW2),
            lanes: DEFAULT_LANES,
        }
    }

    pub fn with_version(mut self, version: Argon2Version) -> Self {
        self.version = version;
        self
    }

    pub fn with_salt(mut self, salt: &[u8]) -> Self {
        replace_bytes(&mut self.salt, salt);
        self
    }

    pub fn with_secret(mut self, secret: &[u8]) -> Self {
        replace_bytes(&mut self.secret, secret);
        self
    }

    pub fn with_additional(mut self, additional: &[u8]) -> Self {
        replace_bytes(&mut self.additional, additional);
        self
    }

    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_memory_as_kb(mut self, memory: u32) -> Self {
        self.memory_kb = Some(memory);
        self
    }

    pub fn with_memory_power_of_two(mut self, exponent: u32) -> Self {
        self.memory_kb = 1u32.checked_shl(exponent);
        self
    }

    pub fn with_parallelism(mut self, lanes: u32) -> Self {
        self.lanes = lanes;
        self
    }

    /// 按当前配置生成不可变参数集
    ///
    /// #### 错误
    /// - 迭代次数、内存、并行度、additional、secret 超出范围时
    ///   返回 `KdfError::Argon2`
    pub fn build(&self) -> Result<Argon2Parameters> {
        let memory_kb = self.memory_kb.ok_or(argon2::Error::MemoryTooMuch)?;

        let parameters = Argon2Parameters {
            variant: self.variant,
            version: self.version,
            salt: self.salt.clone(),
            secret: self.secret.clone(),
            additional: self.additional.clone(),
            iterations: self.iterations,
            memory_kb,
            lanes: self.lanes,
        };

        // 提前交给 argon2 校验，错误在构建阶段就暴露出来
        let params = parameters.argon2_params()?;
        Argon2::new_with_secret(
            parameters.secret(),
            self.variant.algorithm(),
            self.version.version(),
            params,
        )?;

        Ok(parameters)
    }

    /// 清零构建器中的敏感数据
    pub fn clear(&mut self) {
        self.salt.zeroize();
        self.secret.zeroize();
        self.additional.zeroize();
    }
}

fn replace_bytes(target: &mut Zeroizing<Vec<u8>>, bytes: &[u8]) {
    target.zeroize();
    target.extend_from_slice(bytes);
}

/// 不可变的 Argon2 参数集
#[derive(Clone)]
pub struct Argon2Parameters {
    variant: Argon2Variant,
    version: Argon2Version,
    salt: Zeroizing<Vec<u8>>,
    secret: Zeroizing<Vec<u8>>,
    additional: Zeroizing<Vec<u8>>,
    iterations: u32,
    memory_kb: u32,
    lanes: u32,
}

impl Argon2Parameters {
    pub fn variant(&self) -> Argon2Variant {
        self.variant
    }

    pub fn version(&self) -> Argon2Version {
        self.version
    }

    pub fn salt(&self) -> &[u8] {
        &self.salt
    }

    pub fn secret(&self) -> &[u8] {
        &self.secret
    }

    pub fn additional(&self) -> &[u8] {
        &self.additional
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// 内存成本（KiB）
    pub fn memory_kb(&self) -> u32 {
        self.memory_kb
    }

    pub fn lanes(&self) -> u32 {
        self.lanes
    }

    /// 转换为 `argon2` crate 的参数（输出长度不固定）
    pub(crate) fn argon2_params(&self) -> Result<Params> {
        let mut builder = argon2::ParamsBuilder::new();
        builder
            .m_cost(self.memory_kb)
            .t_cost(self.iterations)
            .p_cost(self.lanes);

        if !self.additional.is_empty() {
            builder.data(AssociatedData::new(&self.additional)?);
        }

        Ok(builder.build()?)
    }

    /// 清零 salt / secret / additional
    pub fn clear(&mut self) {
        self.salt.zeroize();
        self.secret.zeroize();
        self.additional.zeroize();
    }
}

impl fmt::Debug for Argon2Parameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Argon2Parameters")
            .field("variant", &self.variant)
            .field("version", &self.version)
            .field("salt_len", &self.salt.len())
            .field("secret", &"[REDACTED]")
            .field("additional_len", &self.additional.len())
            .field("iterations", &self.iterations)
            .field("memory_kb", &self.memory_kb)
            .field("lanes", &self.lanes)
            .finish()
    }
}
