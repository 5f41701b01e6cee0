// ==========================================
// 咖啡拼配分析系统 - 分析参数
// ==========================================
// 职责: 约束参数、搜索参数、库存策略、预算参数的强类型载体
// 来源: ConfigManager 读取（或直接构造）
// 红线: 进入引擎前必须 validate()
// ==========================================

use crate::config::error::{ConfigError, ConfigResult};
use crate::domain::blend::VolumeTarget;
use crate::domain::types::{LotOrdering, SearchMode};
use serde::{Deserialize, Serialize};

// ==========================================
// 默认值
// ==========================================
pub mod defaults {
    pub const QUALITY_MIN: f64 = 25.0;
    pub const QUALITY_MAX: f64 = 100.0;
    pub const PROFIT_FLOOR: f64 = 60.0;
    pub const PROFIT_TARGET_AVERAGE: f64 = 60.0;
    pub const VOLUME_TOLERANCE: f64 = 10.0;
    pub const IDEAL_COST_CEILING: f64 = 2000.0;

    pub const TARGET_VOLUMES: [f64; 4] = [1000.0, 750.0, 500.0, 250.0];
    pub const MIN_BLEND_LOTS: usize = 2;
    pub const DISCOVERY_MAX_LOTS: usize = 5;
    pub const COMBINATION_WARNING_THRESHOLD: u64 = 5_000_000;

    pub const STOCK_VOLUME_MIN: f64 = 750.0;
    pub const STOCK_VOLUME_MAX: f64 = 1000.0;
    pub const DESIRED_MARGIN: f64 = 150.0;
}

// ==========================================
// ConstraintConfig - 拼配准入约束
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintConfig {
    /// 市场价（R$/袋，必填）
    pub market_price: f64,

    /// 加权品质下限（%）
    pub quality_min: f64,

    /// 加权品质上限（%）
    pub quality_max: f64,

    /// 单袋利润下限（发现模式逐个拼配校验）
    pub profit_floor: f64,

    /// 平均单袋利润目标（分配模式事后评估）
    pub profit_target_average: f64,

    /// 目标袋数允许偏差（绝对值）
    pub volume_tolerance: f64,

    /// 理想成本上限（仅用于库存健康度，不参与准入）
    pub ideal_cost_ceiling: f64,
}

impl ConstraintConfig {
    /// 以市场价 + 默认参数构造
    pub fn with_market_price(market_price: f64) -> Self {
        Self {
            market_price,
            quality_min: defaults::QUALITY_MIN,
            quality_max: defaults::QUALITY_MAX,
            profit_floor: defaults::PROFIT_FLOOR,
            profit_target_average: defaults::PROFIT_TARGET_AVERAGE,
            volume_tolerance: defaults::VOLUME_TOLERANCE,
            ideal_cost_ceiling: defaults::IDEAL_COST_CEILING,
        }
    }

    /// 校验参数一致性
    ///
    /// # 规则
    /// 1. 所有数值必须有限
    /// 2. market_price > 0
    /// 3. 0 <= quality_min <= quality_max <= 100
    /// 4. volume_tolerance >= 0
    pub fn validate(&self) -> ConfigResult<()> {
        let fields = [
            ("market_price", self.market_price),
            ("quality_min", self.quality_min),
            ("quality_max", self.quality_max),
            ("profit_floor", self.profit_floor),
            ("profit_target_average", self.profit_target_average),
            ("volume_tolerance", self.volume_tolerance),
            ("ideal_cost_ceiling", self.ideal_cost_ceiling),
        ];
        for (key, value) in fields {
            if !value.is_finite() {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: value.to_string(),
                    message: "必须为有限数值".to_string(),
                });
            }
        }

        if self.market_price <= 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "market_price".to_string(),
                value: self.market_price.to_string(),
                message: "市场价必须大于 0".to_string(),
            });
        }

        if self.quality_min < 0.0 || self.quality_max > 100.0 || self.quality_min > self.quality_max {
            return Err(ConfigError::Inconsistent(format!(
                "品质区间非法: [{}, {}]，要求 0 <= min <= max <= 100",
                self.quality_min, self.quality_max
            )));
        }

        if self.volume_tolerance < 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "volume_tolerance".to_string(),
                value: self.volume_tolerance.to_string(),
                message: "允许偏差不能为负数".to_string(),
            });
        }

        Ok(())
    }
}

// ==========================================
// SearchConfig - 搜索参数
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    pub mode: SearchMode,

    /// 目标袋数（列表顺序即优先级）
    pub target_volumes: Vec<f64>,

    /// 最少组合批次数
    pub min_blend_lots: usize,

    /// 发现模式最多组合批次数（可控性上限）
    pub discovery_max_lots: usize,

    /// 分配模式最多组合批次数（None = 剩余批次数）
    #[serde(default)]
    pub allocation_max_lots: Option<usize>,

    pub lot_ordering: LotOrdering,

    /// 是否启用并行搜索（结果与串行一致）
    pub parallel: bool,

    /// 组合数预警阈值
    pub combination_warning_threshold: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            mode: SearchMode::Allocation,
            target_volumes: defaults::TARGET_VOLUMES.to_vec(),
            min_blend_lots: defaults::MIN_BLEND_LOTS,
            discovery_max_lots: defaults::DISCOVERY_MAX_LOTS,
            allocation_max_lots: None,
            lot_ordering: LotOrdering::LotIdAsc,
            parallel: true,
            combination_warning_threshold: defaults::COMBINATION_WARNING_THRESHOLD,
        }
    }
}

impl SearchConfig {
    /// 带优先级的目标列表
    pub fn targets(&self) -> Vec<VolumeTarget> {
        VolumeTarget::from_volumes(&self.target_volumes)
    }

    /// 当前模式下组合批次数上限（不超过 pool_size）
    pub fn max_lots_for(&self, pool_size: usize) -> usize {
        let cap = match self.mode {
            SearchMode::Discovery => self.discovery_max_lots,
            SearchMode::Allocation => self.allocation_max_lots.unwrap_or(pool_size),
        };
        cap.min(pool_size)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.min_blend_lots == 0 {
            return Err(ConfigError::InvalidValue {
                key: "min_blend_lots".to_string(),
                value: "0".to_string(),
                message: "至少需要 1 个批次".to_string(),
            });
        }

        if self.discovery_max_lots < self.min_blend_lots {
            return Err(ConfigError::Inconsistent(format!(
                "discovery_max_lots ({}) 小于 min_blend_lots ({})",
                self.discovery_max_lots, self.min_blend_lots
            )));
        }

        if let Some(max) = self.allocation_max_lots {
            if max < self.min_blend_lots {
                return Err(ConfigError::Inconsistent(format!(
                    "allocation_max_lots ({}) 小于 min_blend_lots ({})",
                    max, self.min_blend_lots
                )));
            }
        }

        for volume in &self.target_volumes {
            if !volume.is_finite() || *volume <= 0.0 {
                return Err(ConfigError::InvalidValue {
                    key: "target_volumes".to_string(),
                    value: volume.to_string(),
                    message: "目标袋数必须为正数".to_string(),
                });
            }
        }

        Ok(())
    }
}

// ==========================================
// StockPolicy - 库存策略
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockPolicy {
    /// 理想库存下限（袋）
    pub volume_min: f64,
    /// 理想库存上限（袋）
    pub volume_max: f64,
    /// 期望单袋利润（R$/袋）
    pub desired_margin: f64,
}

impl Default for StockPolicy {
    fn default() -> Self {
        Self {
            volume_min: defaults::STOCK_VOLUME_MIN,
            volume_max: defaults::STOCK_VOLUME_MAX,
            desired_margin: defaults::DESIRED_MARGIN,
        }
    }
}

impl StockPolicy {
    pub fn validate(&self) -> ConfigResult<()> {
        if !(self.volume_min.is_finite() && self.volume_max.is_finite())
            || self.volume_min > self.volume_max
        {
            return Err(ConfigError::Inconsistent(format!(
                "理想库存区间非法: [{}, {}]",
                self.volume_min, self.volume_max
            )));
        }
        Ok(())
    }
}

// ==========================================
// BudgetConfig - 搜索预算
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BudgetConfig {
    /// 最多评估候选组合数
    #[serde(default)]
    pub max_candidates: Option<u64>,

    /// 墙钟时间预算（毫秒）
    #[serde(default)]
    pub time_budget_ms: Option<u64>,
}

// ==========================================
// AnalysisSettings - 单次分析全部参数
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSettings {
    pub constraints: ConstraintConfig,
    pub search: SearchConfig,
    pub stock: StockPolicy,
    pub budget: BudgetConfig,
}

impl AnalysisSettings {
    /// 以市场价 + 默认参数构造
    pub fn with_market_price(market_price: f64) -> Self {
        Self {
            constraints: ConstraintConfig::with_market_price(market_price),
            search: SearchConfig::default(),
            stock: StockPolicy::default(),
            budget: BudgetConfig::default(),
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        self.constraints.validate()?;
        self.search.validate()?;
        self.stock.validate()?;
        Ok(())
    }
}
