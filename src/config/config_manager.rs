// ==========================================
// 咖啡拼配分析系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: 内存 key-value（global scope），来源为 JSON 文件 / 环境变量 / 显式设置
// ==========================================

use crate::config::analysis_config::{
    defaults, AnalysisSettings, BudgetConfig, ConstraintConfig, SearchConfig, StockPolicy,
};
use crate::config::error::{ConfigError, ConfigResult};
use crate::domain::types::{LotOrdering, SearchMode};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tracing::{debug, warn};

/// 环境变量覆写前缀
pub const ENV_PREFIX: &str = "COFFEE_BLEND_";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ConfigManager {
    values: Arc<RwLock<BTreeMap<String, String>>>,
}

impl ConfigManager {
    /// 创建空配置（全部走默认值）
    pub fn new() -> Self {
        Self::default()
    }

    /// 从 key-value 映射创建
    pub fn from_map(values: BTreeMap<String, String>) -> Self {
        Self {
            values: Arc::new(RwLock::new(values)),
        }
    }

    /// 从 JSON 对象字符串创建
    ///
    /// # 说明
    /// - 值可以是字符串/数值/布尔/数组（数组按逗号拼接）
    /// - null 视为未配置
    pub fn from_json_str(raw: &str) -> ConfigResult<Self> {
        let value: Value = serde_json::from_str(raw)?;
        let object = value.as_object().ok_or_else(|| {
            ConfigError::Inconsistent("配置文件顶层必须是 JSON 对象".to_string())
        })?;

        let mut values = BTreeMap::new();
        for (key, v) in object {
            if let Some(text) = json_value_to_config_string(v) {
                values.insert(key.clone(), text);
            }
        }

        debug!(keys = values.len(), "配置加载完成");
        Ok(Self::from_map(values))
    }

    /// 从 JSON 文件创建
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&raw)
    }

    /// 应用环境变量覆写（COFFEE_BLEND_<KEY>）
    pub fn with_env_overrides(self) -> ConfigResult<Self> {
        for key in config_keys::ALL {
            let env_name = format!("{}{}", ENV_PREFIX, key.to_uppercase());
            if let Ok(value) = std::env::var(&env_name) {
                debug!(env = %env_name, "环境变量覆写配置");
                self.set(key, &value)?;
            }
        }
        Ok(self)
    }

    /// 写入配置值
    pub fn set(&self, key: &str, value: &str) -> ConfigResult<()> {
        let mut guard = self
            .values
            .write()
            .map_err(|e| ConfigError::LockPoisoned(e.to_string()))?;
        guard.insert(key.to_string(), value.trim().to_string());
        Ok(())
    }

    /// 读取配置值（公开方法，供其他模块复用）
    pub fn get_global_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let guard = self
            .values
            .read()
            .map_err(|e| ConfigError::LockPoisoned(e.to_string()))?;
        Ok(guard
            .get(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty()))
    }

    /// 读取配置值，带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> ConfigResult<String> {
        Ok(self
            .get_global_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    /// 获取所有配置的快照（JSON格式，键有序）
    pub fn get_config_snapshot(&self) -> ConfigResult<String> {
        let guard = self
            .values
            .read()
            .map_err(|e| ConfigError::LockPoisoned(e.to_string()))?;
        Ok(serde_json::to_string(&json!(*guard))?)
    }

    /// 从配置快照恢复配置
    ///
    /// # 返回
    /// - Ok(usize): 恢复的配置项数量
    ///
    /// # 注意
    /// - 以 `__meta_` 开头的键为元信息，不回写
    pub fn restore_config_from_snapshot(&self, snapshot_json: &str) -> ConfigResult<usize> {
        let config_map: BTreeMap<String, String> = serde_json::from_str(snapshot_json)?;

        let mut guard = self
            .values
            .write()
            .map_err(|e| ConfigError::LockPoisoned(e.to_string()))?;

        let mut count = 0;
        for (key, value) in config_map {
            if key.starts_with("__meta_") {
                continue;
            }
            guard.insert(key, value);
            count += 1;
        }
        Ok(count)
    }

    // ==========================================
    // 类型化读取（解析失败告警并回退默认值）
    // ==========================================

    fn get_f64_or(&self, key: &str, default: f64) -> ConfigResult<f64> {
        let value = self.get_config_or_default(key, &default.to_string())?;
        Ok(value.parse::<f64>().unwrap_or_else(|_| {
            warn!(config_key = key, raw_value = %value, "配置值格式错误，使用默认值");
            default
        }))
    }

    fn get_usize_or(&self, key: &str, default: usize) -> ConfigResult<usize> {
        let value = self.get_config_or_default(key, &default.to_string())?;
        Ok(value.parse::<usize>().unwrap_or_else(|_| {
            warn!(config_key = key, raw_value = %value, "配置值格式错误，使用默认值");
            default
        }))
    }

    fn get_bool_or(&self, key: &str, default: bool) -> ConfigResult<bool> {
        let value = self.get_config_or_default(key, if default { "true" } else { "false" })?;
        Ok(match value.to_lowercase().as_str() {
            "1" | "true" | "yes" | "y" | "on" => true,
            "0" | "false" | "no" | "n" | "off" => false,
            _ => {
                warn!(config_key = key, raw_value = %value, "配置值格式错误，使用默认值");
                default
            }
        })
    }

    /// 可选正整数（未配置 / none / 0 → None）
    fn get_optional_u64(&self, key: &str) -> ConfigResult<Option<u64>> {
        let value = match self.get_global_config_value(key)? {
            Some(v) => v,
            None => return Ok(None),
        };
        if value.eq_ignore_ascii_case("none") {
            return Ok(None);
        }
        match value.parse::<u64>() {
            Ok(0) => Ok(None),
            Ok(n) => Ok(Some(n)),
            Err(_) => {
                warn!(config_key = key, raw_value = %value, "配置值格式错误，视为未配置");
                Ok(None)
            }
        }
    }

    /// 市场价（无默认值）
    pub fn get_market_price(&self) -> ConfigResult<Option<f64>> {
        match self.get_global_config_value(config_keys::MARKET_PRICE)? {
            None => Ok(None),
            Some(value) => value
                .parse::<f64>()
                .map(Some)
                .map_err(|_| ConfigError::InvalidValue {
                    key: config_keys::MARKET_PRICE.to_string(),
                    value,
                    message: "无法解析为数值".to_string(),
                }),
        }
    }

    /// 目标袋数列表（逗号分隔，顺序即优先级）
    pub fn get_target_volumes(&self) -> ConfigResult<Vec<f64>> {
        let default = defaults::TARGET_VOLUMES
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let value = self.get_config_or_default(config_keys::TARGET_VOLUMES, &default)?;

        let volumes: Vec<f64> = value
            .split(',')
            .filter_map(|s| s.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite() && *v > 0.0)
            .collect();

        if volumes.is_empty() {
            warn!(raw_value = %value, "目标袋数配置为空或格式错误，使用默认值");
            Ok(defaults::TARGET_VOLUMES.to_vec())
        } else {
            Ok(volumes)
        }
    }

    pub fn get_search_mode(&self) -> ConfigResult<SearchMode> {
        let value = self.get_config_or_default(config_keys::SEARCH_MODE, "ALLOCATION")?;
        Ok(SearchMode::parse(&value).unwrap_or_else(|| {
            warn!(raw_value = %value, "搜索模式配置无法识别，使用 ALLOCATION");
            SearchMode::Allocation
        }))
    }

    pub fn get_lot_ordering(&self) -> ConfigResult<LotOrdering> {
        let value = self.get_config_or_default(config_keys::LOT_ORDERING, "LOT_ID_ASC")?;
        Ok(LotOrdering::parse(&value).unwrap_or_else(|| {
            warn!(raw_value = %value, "批次排序口径无法识别，使用 LOT_ID_ASC");
            LotOrdering::LotIdAsc
        }))
    }

    // ==========================================
    // 参数组装
    // ==========================================

    /// 组装准入约束
    ///
    /// # 参数
    /// - market_price_override: 外部提供的市场价（优先于配置）
    ///
    /// # 返回
    /// - Err(MissingKey): 两处都没有市场价
    pub fn load_constraint_config(
        &self,
        market_price_override: Option<f64>,
    ) -> ConfigResult<ConstraintConfig> {
        let market_price = match market_price_override {
            Some(price) => price,
            None => self
                .get_market_price()?
                .ok_or_else(|| ConfigError::MissingKey(config_keys::MARKET_PRICE.to_string()))?,
        };

        let config = ConstraintConfig {
            market_price,
            quality_min: self.get_f64_or(config_keys::QUALITY_MIN, defaults::QUALITY_MIN)?,
            quality_max: self.get_f64_or(config_keys::QUALITY_MAX, defaults::QUALITY_MAX)?,
            profit_floor: self.get_f64_or(config_keys::PROFIT_FLOOR, defaults::PROFIT_FLOOR)?,
            profit_target_average: self.get_f64_or(
                config_keys::PROFIT_TARGET_AVERAGE,
                defaults::PROFIT_TARGET_AVERAGE,
            )?,
            volume_tolerance: self
                .get_f64_or(config_keys::VOLUME_TOLERANCE, defaults::VOLUME_TOLERANCE)?,
            ideal_cost_ceiling: self
                .get_f64_or(config_keys::IDEAL_COST_CEILING, defaults::IDEAL_COST_CEILING)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// 组装搜索参数
    pub fn load_search_config(&self) -> ConfigResult<SearchConfig> {
        let config = SearchConfig {
            mode: self.get_search_mode()?,
            target_volumes: self.get_target_volumes()?,
            min_blend_lots: self.get_usize_or(config_keys::MIN_BLEND_LOTS, defaults::MIN_BLEND_LOTS)?,
            discovery_max_lots: self
                .get_usize_or(config_keys::DISCOVERY_MAX_LOTS, defaults::DISCOVERY_MAX_LOTS)?,
            allocation_max_lots: self
                .get_optional_u64(config_keys::ALLOCATION_MAX_LOTS)?
                .map(|n| n as usize),
            lot_ordering: self.get_lot_ordering()?,
            parallel: self.get_bool_or(config_keys::PARALLEL_SEARCH, true)?,
            combination_warning_threshold: self
                .get_optional_u64(config_keys::COMBINATION_WARNING_THRESHOLD)?
                .unwrap_or(defaults::COMBINATION_WARNING_THRESHOLD),
        };
        config.validate()?;
        Ok(config)
    }

    /// 组装库存策略
    pub fn load_stock_policy(&self) -> ConfigResult<StockPolicy> {
        let policy = StockPolicy {
            volume_min: self.get_f64_or(config_keys::STOCK_VOLUME_MIN, defaults::STOCK_VOLUME_MIN)?,
            volume_max: self.get_f64_or(config_keys::STOCK_VOLUME_MAX, defaults::STOCK_VOLUME_MAX)?,
            desired_margin: self.get_f64_or(config_keys::DESIRED_MARGIN, defaults::DESIRED_MARGIN)?,
        };
        policy.validate()?;
        Ok(policy)
    }

    /// 组装搜索预算
    pub fn load_budget_config(&self) -> ConfigResult<BudgetConfig> {
        Ok(BudgetConfig {
            max_candidates: self.get_optional_u64(config_keys::MAX_CANDIDATES)?,
            time_budget_ms: self.get_optional_u64(config_keys::TIME_BUDGET_MS)?,
        })
    }

    /// 组装全部分析参数
    pub fn load_analysis_settings(
        &self,
        market_price_override: Option<f64>,
    ) -> ConfigResult<AnalysisSettings> {
        Ok(AnalysisSettings {
            constraints: self.load_constraint_config(market_price_override)?,
            search: self.load_search_config()?,
            stock: self.load_stock_policy()?,
            budget: self.load_budget_config()?,
        })
    }
}

/// 默认配置文件路径（<config_dir>/coffee-blend/config.json）
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("coffee-blend").join("config.json"))
}

/// JSON 值 → 配置字符串
fn json_value_to_config_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(json_value_to_config_string)
                .collect::<Vec<_>>()
                .join(","),
        ),
        Value::Object(_) => Some(value.to_string()),
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 准入约束
    pub const MARKET_PRICE: &str = "market_price";
    pub const QUALITY_MIN: &str = "quality_min";
    pub const QUALITY_MAX: &str = "quality_max";
    pub const PROFIT_FLOOR: &str = "profit_floor";
    pub const PROFIT_TARGET_AVERAGE: &str = "profit_target_average";
    pub const VOLUME_TOLERANCE: &str = "volume_tolerance";
    pub const IDEAL_COST_CEILING: &str = "ideal_cost_ceiling";

    // 搜索
    pub const SEARCH_MODE: &str = "search_mode";
    pub const TARGET_VOLUMES: &str = "target_volumes";
    pub const MIN_BLEND_LOTS: &str = "min_blend_lots";
    pub const DISCOVERY_MAX_LOTS: &str = "discovery_max_lots";
    pub const ALLOCATION_MAX_LOTS: &str = "allocation_max_lots";
    pub const LOT_ORDERING: &str = "lot_ordering";
    pub const PARALLEL_SEARCH: &str = "parallel_search";
    pub const COMBINATION_WARNING_THRESHOLD: &str = "combination_warning_threshold";

    // 预算
    pub const MAX_CANDIDATES: &str = "max_candidates";
    pub const TIME_BUDGET_MS: &str = "time_budget_ms";

    // 库存策略
    pub const STOCK_VOLUME_MIN: &str = "stock_volume_min";
    pub const STOCK_VOLUME_MAX: &str = "stock_volume_max";
    pub const DESIRED_MARGIN: &str = "desired_margin";

    pub const ALL: [&str; 20] = [
        MARKET_PRICE,
        QUALITY_MIN,
        QUALITY_MAX,
        PROFIT_FLOOR,
        PROFIT_TARGET_AVERAGE,
        VOLUME_TOLERANCE,
        IDEAL_COST_CEILING,
        SEARCH_MODE,
        TARGET_VOLUMES,
        MIN_BLEND_LOTS,
        DISCOVERY_MAX_LOTS,
        ALLOCATION_MAX_LOTS,
        LOT_ORDERING,
        PARALLEL_SEARCH,
        COMBINATION_WARNING_THRESHOLD,
        MAX_CANDIDATES,
        TIME_BUDGET_MS,
        STOCK_VOLUME_MIN,
        STOCK_VOLUME_MAX,
        DESIRED_MARGIN,
    ];
}
