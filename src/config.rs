use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::Result;
use crate::graph::check_order;

/// 系列生成のパラメータ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// 窓長 n
    pub order: u32,
    /// 生成する系列の本数
    pub count: usize,
    /// 乱数シード。None ならエントロピーから初期化
    pub seed: Option<u64>,
    /// Rayon で並列生成するか
    pub parallel: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            order: 5,
            count: 100,
            seed: None,
            parallel: false,
        }
    }
}

impl GeneratorConfig {
    pub fn new(order: u32) -> Self {
        GeneratorConfig {
            order,
            ..Default::default()
        }
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn validate(&self) -> Result<()> {
        check_order(self.order)
    }

    /// シード指定があれば再現可能な乱数源を返す
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DeBruijnError;
    use rand::Rng;

    #[test]
    fn test_defaults() {
        let c = GeneratorConfig::default();
        assert_eq!(c.order, 5);
        assert_eq!(c.count, 100);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let c = GeneratorConfig::new(8).with_count(3).with_seed(9).with_parallel(true);
        assert_eq!(c, GeneratorConfig { order: 8, count: 3, seed: Some(9), parallel: true });
    }

    #[test]
    fn test_invalid_order() {
        assert_eq!(
            GeneratorConfig::new(1).validate(),
            Err(DeBruijnError::Configuration { order: 1 })
        );
    }

    #[test]
    fn test_seeded_rng_reproducible() {
        let c = GeneratorConfig::new(4).with_seed(123);
        let a: u64 = c.rng().gen();
        let b: u64 = c.rng().gen();
        assert_eq!(a, b);
    }
}
