//! Argon2 密钥参数生成器
//!
//! 将密码与派生设置转换为：
//! - 原始派生密钥
//! - 绑定算法的密钥
//! - 密钥 + IV
//! - MAC 密钥
//!
//! 生命周期：
//! 1. `init` 复制密码、构建参数集、绑定派生引擎
//! 2. 任意次 `generate_*`
//! 3. `clear`（显式调用或析构时自动调用）清零密码并清理参数集与引擎
//!
//! 位数到字节数的换算一律为 `bits / 8`（截断），
//! 调用方应保证传入 8 的倍数。

use std::fmt;

use zeroize::{Zeroize, Zeroizing};

use crate::crypto::kdf::{Argon2BytesGenerator, KdfEngine};
use crate::crypto::keys::{
    CipherParameterFactory, DefaultParameterFactory, KeyParameter, KeyParameterWithIv,
};
use crate::crypto::params::{Argon2Parameters, Argon2Variant, Argon2Version, MemoryCostType};
use crate::error::{KdfError, Result};

/// `init` 的派生设置
#[derive(Clone, Copy)]
pub struct Argon2Settings<'a> {
    pub variant: Argon2Variant,
    pub version: Argon2Version,
    pub salt: &'a [u8],
    pub secret: &'a [u8],
    pub additional: &'a [u8],
    pub iterations: u32,
    /// 含义由 `memory_cost_type` 决定
    pub memory: u32,
    pub parallelism: u32,
    pub memory_cost_type: MemoryCostType,
}

impl fmt::Debug for Argon2Settings<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Argon2Settings")
            .field("variant", &self.variant)
            .field("version", &self.version)
            .field("salt_len", &self.salt.len())
            .field("secret", &"[REDACTED]")
            .field("additional_len", &self.additional.len())
            .field("iterations", &self.iterations)
            .field("memory", &self.memory)
            .field("parallelism", &self.parallelism)
            .field("memory_cost_type", &self.memory_cost_type)
            .finish()
    }
}

/// Argon2 密钥参数生成器
///
/// 非线程安全设计：`init` / `clear` 需要 `&mut self`，
/// 由借用规则保证派生调用不会与之并发。
pub struct Argon2ParametersGenerator<E = Argon2BytesGenerator, F = DefaultParameterFactory>
where
    E: KdfEngine,
    F: CipherParameterFactory,
{
    password: Zeroizing<Vec<u8>>,
    parameters: Option<Argon2Parameters>,
    engine: Option<E>,
    factory: F,
}

impl Argon2ParametersGenerator {
    pub fn new() -> Self {
        Self::with_factory(DefaultParameterFactory)
    }
}

impl Default for Argon2ParametersGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl<E, F> Argon2ParametersGenerator<E, F>
where
    E: KdfEngine,
    F: CipherParameterFactory,
{
    /// 使用自定义引擎类型与参数工厂
    pub fn with_factory(factory: F) -> Self {
        Self {
            password: Zeroizing::new(Vec::new()),
            parameters: None,
            engine: None,
            factory,
        }
    }

    /// 初始化生成器
    ///
    /// #### 参数
    /// - `password`：密码（内部复制一份，不引用调用方缓冲区）
    /// - `settings`：派生设置
    ///
    /// #### 错误
    /// - 参数超出 argon2 允许范围时返回 `KdfError::Argon2`
    ///
    /// 重复调用时，上一次的密码、参数集与引擎会先被清理。
    pub fn init(&mut self, password: &[u8], settings: &Argon2Settings<'_>) -> Result<()> {
        self.clear();

        let result = self.bind(password, settings);
        if result.is_err() {
            self.clear();
        }
        result
    }

    fn bind(&mut self, password: &[u8], settings: &Argon2Settings<'_>) -> Result<()> {
        // ---------- 复制密码 ----------
        self.password = Zeroizing::new(password.to_vec());

        // ---------- 选择构建器并配置 ----------
        let builder = settings
            .variant
            .builder()
            .with_version(settings.version)
            .with_salt(settings.salt)
            .with_secret(settings.secret)
            .with_additional(settings.additional)
            .with_iterations(settings.iterations)
            .with_parallelism(settings.parallelism);

        let mut builder = match settings.memory_cost_type {
            MemoryCostType::Kb => builder.with_memory_as_kb(settings.memory),
            MemoryCostType::PowerOfTwo => builder.with_memory_power_of_two(settings.memory),
        };

        // ---------- 构建参数集 ----------
        let built = builder.build();
        builder.clear();
        let parameters = built?;

        // ---------- 绑定派生引擎 ----------
        let engine = E::init(&self.password, &parameters)?;

        tracing::debug!(
            variant = %parameters.variant(),
            version = parameters.version().to_u32(),
            iterations = parameters.iterations(),
            memory_kb = parameters.memory_kb(),
            lanes = parameters.lanes(),
            "argon2 generator initialised"
        );

        self.parameters = Some(parameters);
        self.engine = Some(engine);

        Ok(())
    }

    /// 当前参数集（未初始化时为 `None`）
    pub fn parameters(&self) -> Option<&Argon2Parameters> {
        self.parameters.as_ref()
    }

    /// 派生 `length` 字节的原始密钥
    ///
    /// 长度的合法范围由派生引擎决定（argon2 要求至少 4 字节）。
    pub fn generate_derived_key(&self, length: usize) -> Result<Zeroizing<Vec<u8>>> {
        self.engine()?.get_bytes(length)
    }

    /// 派生绑定到 `algorithm` 的密钥
    ///
    /// `key_size_bits` 应为 8 的倍数，余数部分被截断。
    pub fn generate_derived_parameters(
        &self,
        algorithm: &str,
        key_size_bits: usize,
    ) -> Result<KeyParameter> {
        let key_size = key_size_bits / 8;
        let derived = self.generate_derived_key(key_size)?;

        self.factory
            .create_key_parameter(algorithm, &derived, 0, key_size)
    }

    /// 派生密钥 + IV
    ///
    /// 只调用一次 KDF，输出按 `key || iv` 切分，
    /// 两者均取自同一段派生结果。
    pub fn generate_derived_parameters_with_iv(
        &self,
        algorithm: &str,
        key_size_bits: usize,
        iv_size_bits: usize,
    ) -> Result<KeyParameterWithIv> {
        let key_size = key_size_bits / 8;
        let iv_size = iv_size_bits / 8;
        let derived = self.generate_derived_key(key_size + iv_size)?;

        let key = self
            .factory
            .create_key_parameter(algorithm, &derived, 0, key_size)?;

        self.factory
            .create_key_parameter_with_iv(key, &derived, key_size, iv_size)
    }

    /// 派生不绑定算法的 MAC 密钥
    pub fn generate_derived_mac_parameters(&self, key_size_bits: usize) -> Result<KeyParameter> {
        let key_size = key_size_bits / 8;
        let derived = self.generate_derived_key(key_size)?;

        Ok(KeyParameter::new(&derived[..key_size]))
    }

    /// 清零密码并清理参数集与引擎
    ///
    /// 可重复调用；未初始化时调用不做任何事。
    pub fn clear(&mut self) {
        // 原地清零，保留长度
        self.password.as_mut_slice().zeroize();

        if let Some(mut parameters) = self.parameters.take() {
            parameters.clear();
        }

        if let Some(mut engine) = self.engine.take() {
            engine.clear();
            tracing::debug!("argon2 generator cleared");
        }
    }

    fn engine(&self) -> Result<&E> {
        self.engine.as_ref().ok_or(KdfError::NotInitialized)
    }
}

impl<E, F> Drop for Argon2ParametersGenerator<E, F>
where
    E: KdfEngine,
    F: CipherParameterFactory,
{
    fn drop(&mut self) {
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::algorithm::KeyAlgorithm;

    fn fast_settings(variant: Argon2Variant) -> Argon2Settings<'static> {
        Argon2Settings {
            variant,
            version: Argon2Version::V13,
            salt: b"somesalt",
            secret: b"",
            additional: b"",
            iterations: 1,
            memory: 64,
            parallelism: 1,
            memory_cost_type: MemoryCostType::Kb,
        }
    }

    #[test]
    fn generate_before_init_fails() {
        let generator = Argon2ParametersGenerator::new();

        assert!(matches!(
            generator.generate_derived_key(32),
            Err(KdfError::NotInitialized)
        ));
        assert!(matches!(
            generator.generate_derived_mac_parameters(256),
            Err(KdfError::NotInitialized)
        ));
    }

    #[test]
    fn clear_zero_fills_password_in_place() {
        let mut generator = Argon2ParametersGenerator::new();
        generator
            .init(b"hunter2", &fast_settings(Argon2Variant::Argon2id))
            .unwrap();
        assert_eq!(generator.password.as_slice(), b"hunter2");

        generator.clear();
        assert_eq!(generator.password.len(), 7);
        assert!(generator.password.iter().all(|b| *b == 0));
        assert!(generator.parameters().is_none());

        // 第二次调用不应出错
        generator.clear();
        assert!(generator.password.iter().all(|b| *b == 0));
    }

    #[test]
    fn clear_without_init_is_noop() {
        let mut generator = Argon2ParametersGenerator::new();
        generator.clear();
        generator.clear();
        assert!(generator.password.is_empty());
    }

    #[test]
    fn generate_after_clear_fails() {
        let mut generator = Argon2ParametersGenerator::new();
        generator
            .init(b"pw", &fast_settings(Argon2Variant::Argon2i))
            .unwrap();
        generator.clear();

        assert!(matches!(
            generator.generate_derived_key(16),
            Err(KdfError::NotInitialized)
        ));
    }

    #[test]
    fn password_is_copied() {
        let mut password = b"changing".to_vec();
        let mut generator = Argon2ParametersGenerator::new();
        generator
            .init(&password, &fast_settings(Argon2Variant::Argon2id))
            .unwrap();
        let before = generator.generate_derived_key(32).unwrap();

        password.fill(0);
        let after = generator.generate_derived_key(32).unwrap();

        assert_eq!(*before, *after);
        assert_eq!(generator.password.as_slice(), b"changing");
    }

    #[test]
    fn failed_init_leaves_generator_uninitialised() {
        let mut generator = Argon2ParametersGenerator::new();
        generator
            .init(b"pw", &fast_settings(Argon2Variant::Argon2id))
            .unwrap();

        let mut bad = fast_settings(Argon2Variant::Argon2id);
        bad.iterations = 0;
        assert!(matches!(
            generator.init(b"pw", &bad),
            Err(KdfError::Argon2(_))
        ));
        assert!(generator.parameters().is_none());
        assert!(generator.password.iter().all(|b| *b == 0));
        assert!(matches!(
            generator.generate_derived_key(16),
            Err(KdfError::NotInitialized)
        ));
    }

    #[test]
    fn mac_key_is_not_bound_to_algorithm() {
        let mut generator = Argon2ParametersGenerator::new();
        generator
            .init(b"pw", &fast_settings(Argon2Variant::Argon2d))
            .unwrap();

        let mac = generator.generate_derived_mac_parameters(256).unwrap();
        assert_eq!(mac.len(), 32);
        assert_eq!(mac.algorithm(), None);

        let cipher = generator.generate_derived_parameters("AES", 256).unwrap();
        assert_eq!(cipher.algorithm(), Some(KeyAlgorithm::Aes));
        assert_eq!(cipher.key(), mac.key());
    }

    #[test]
    fn bit_sizes_are_truncated() {
        let mut generator = Argon2ParametersGenerator::new();
        generator
            .init(b"pw", &fast_settings(Argon2Variant::Argon2id))
            .unwrap();

        let mac = generator.generate_derived_mac_parameters(135).unwrap();
        assert_eq!(mac.len(), 16);
    }

    /// 记录 clear 次数的引擎，用于验证生命周期
    struct CountingEngine {
        inner: Argon2BytesGenerator,
        clears: Rc<Cell<usize>>,
    }

    thread_local! {
        static CLEARS: Rc<Cell<usize>> = Rc::new(Cell::new(0));
    }

    impl KdfEngine for CountingEngine {
        fn init(password: &[u8], parameters: &Argon2Parameters) -> Result<Self> {
            Ok(Self {
                inner: Argon2BytesGenerator::init(password, parameters)?,
                clears: CLEARS.with(Rc::clone),
            })
        }

        fn generate_bytes(&self, out: &mut [u8]) -> Result<()> {
            self.inner.generate_bytes(out)
        }

        fn clear(&mut self) {
            self.inner.clear();
            self.clears.set(self.clears.get() + 1);
        }
    }

    #[test]
    fn engine_is_cleared_on_reinit_and_drop() {
        let clears = CLEARS.with(Rc::clone);
        clears.set(0);

        {
            let mut generator: Argon2ParametersGenerator<CountingEngine> =
                Argon2ParametersGenerator::with_factory(DefaultParameterFactory);
            generator
                .init(b"first", &fast_settings(Argon2Variant::Argon2id))
                .unwrap();
            generator
                .init(b"second", &fast_settings(Argon2Variant::Argon2id))
                .unwrap();
            assert_eq!(clears.get(), 1);
        }

        assert_eq!(clears.get(), 2);
    }
}
