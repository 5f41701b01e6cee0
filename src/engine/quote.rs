// ==========================================
// 咖啡拼配分析系统 - 市场价解析
// ==========================================
// 职责: 实时报价（可选协作方）→ 手工价兜底 → 分析用市场价
// 红线: 报价失败且无有效手工价时返回 UpstreamUnavailable，调用方不得启动搜索
// ==========================================

use crate::engine::error::{EngineError, EngineResult};
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use thiserror::Error;
use tracing::{info, warn};

/// 报价源错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QuoteError {
    #[error("报价源不可用: {0}")]
    Unavailable(String),

    #[error("报价源无数据")]
    NoData,
}

// ==========================================
// QuoteSource Trait
// ==========================================
// 实现者: FixedQuote（实时行情源由调用方注入）
#[async_trait]
pub trait QuoteSource: Send + Sync {
    fn name(&self) -> &str;

    /// 最新价格
    async fn latest_price(&self) -> Result<f64, QuoteError>;
}

// ==========================================
// FixedQuote - 固定报价（测试 / 离线）
// ==========================================
#[derive(Debug, Clone)]
pub struct FixedQuote {
    name: String,
    price: Option<f64>,
}

impl FixedQuote {
    pub fn new(price: f64) -> Self {
        Self {
            name: "fixed".to_string(),
            price: Some(price),
        }
    }

    /// 始终不可用的报价源
    pub fn unavailable() -> Self {
        Self {
            name: "fixed".to_string(),
            price: None,
        }
    }
}

#[async_trait]
impl QuoteSource for FixedQuote {
    fn name(&self) -> &str {
        &self.name
    }

    async fn latest_price(&self) -> Result<f64, QuoteError> {
        self.price.ok_or(QuoteError::NoData)
    }
}

// ==========================================
// ResolvedPrice - 解析后的市场价
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriceOrigin {
    Live,
    Manual,
}

impl fmt::Display for PriceOrigin {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PriceOrigin::Live => write!(f, "LIVE"),
            PriceOrigin::Manual => write!(f, "MANUAL"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResolvedPrice {
    pub price: f64,
    pub origin: PriceOrigin,
}

fn usable(price: f64) -> bool {
    price.is_finite() && price > 0.0
}

/// 解析市场价
///
/// # 规则
/// 1. 有报价源且返回有效价格（有限且 > 0）→ LIVE
/// 2. 否则使用有效手工价 → MANUAL
/// 3. 都没有 → UpstreamUnavailable
pub async fn resolve_market_price(
    source: Option<&dyn QuoteSource>,
    manual_fallback: Option<f64>,
) -> EngineResult<ResolvedPrice> {
    let mut upstream_failure = None;

    if let Some(source) = source {
        match source.latest_price().await {
            Ok(price) if usable(price) => {
                info!(source = source.name(), price, "使用实时报价");
                return Ok(ResolvedPrice {
                    price,
                    origin: PriceOrigin::Live,
                });
            }
            Ok(price) => {
                warn!(source = source.name(), price, "实时报价不可用，尝试手工价");
                upstream_failure = Some(format!("{} 返回无效价格 {}", source.name(), price));
            }
            Err(e) => {
                warn!(source = source.name(), error = %e, "实时报价失败，尝试手工价");
                upstream_failure = Some(format!("{}: {}", source.name(), e));
            }
        }
    }

    match manual_fallback {
        Some(price) if usable(price) => Ok(ResolvedPrice {
            price,
            origin: PriceOrigin::Manual,
        }),
        _ => Err(EngineError::UpstreamUnavailable(
            upstream_failure.unwrap_or_else(|| "未提供市场价".to_string()),
        )),
    }
}
