// ==========================================
// 咖啡拼配分析系统 - 领域类型定义
// ==========================================
// 职责: 搜索模式、排序口径、各类状态枚举
// 序列化格式: SCREAMING_SNAKE_CASE（与导出报表一致）
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 搜索模式 (Search Mode)
// ==========================================
// Discovery: 穷举全部合格组合，批次可重复出现
// Allocation: 按目标优先级独占分配，批次只用一次
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SearchMode {
    Discovery,  // 发现模式
    Allocation, // 分配模式
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchMode::Discovery => write!(f, "DISCOVERY"),
            SearchMode::Allocation => write!(f, "ALLOCATION"),
        }
    }
}

impl SearchMode {
    /// 从配置字符串解析（大小写不敏感）
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_uppercase().as_str() {
            "DISCOVERY" => Some(SearchMode::Discovery),
            "ALLOCATION" => Some(SearchMode::Allocation),
            _ => None,
        }
    }
}

// ==========================================
// 批次排序口径 (Lot Ordering)
// ==========================================
// 首个命中（first-fit）依赖枚举顺序，必须固定一种口径
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LotOrdering {
    LotIdAsc,   // 按批次号字节序升序（默认）
    InputOrder, // 保持输入顺序
}

impl fmt::Display for LotOrdering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LotOrdering::LotIdAsc => write!(f, "LOT_ID_ASC"),
            LotOrdering::InputOrder => write!(f, "INPUT_ORDER"),
        }
    }
}

impl LotOrdering {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_uppercase().as_str() {
            "LOT_ID_ASC" => Some(LotOrdering::LotIdAsc),
            "INPUT_ORDER" => Some(LotOrdering::InputOrder),
            _ => None,
        }
    }
}

// ==========================================
// 目标达成状态 (Target Status)
// ==========================================
// Unmet 是可报告状态，不是错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TargetStatus {
    Met,     // 找到合格组合
    Unmet,   // 无合格组合，跳过
    Aborted, // 搜索被取消/预算耗尽，未处理完
}

impl fmt::Display for TargetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetStatus::Met => write!(f, "MET"),
            TargetStatus::Unmet => write!(f, "UNMET"),
            TargetStatus::Aborted => write!(f, "ABORTED"),
        }
    }
}

// ==========================================
// 平均利润目标状态 (Profit Goal Status)
// ==========================================
// 仅分配模式事后评估，不剔除任何拼配
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProfitGoalStatus {
    Met,          // 平均利润达标
    Missed,       // 平均利润未达标
    NotEvaluated, // 无拼配结果或发现模式
}

impl fmt::Display for ProfitGoalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfitGoalStatus::Met => write!(f, "MET"),
            ProfitGoalStatus::Missed => write!(f, "MISSED"),
            ProfitGoalStatus::NotEvaluated => write!(f, "NOT_EVALUATED"),
        }
    }
}

// ==========================================
// 搜索结束方式 (Search Termination)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SearchTermination {
    Completed,       // 正常完成
    Cancelled,       // 调用方取消
    BudgetExhausted, // 组合数/时间预算耗尽
}

impl fmt::Display for SearchTermination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchTermination::Completed => write!(f, "COMPLETED"),
            SearchTermination::Cancelled => write!(f, "CANCELLED"),
            SearchTermination::BudgetExhausted => write!(f, "BUDGET_EXHAUSTED"),
        }
    }
}

// ==========================================
// 库存成本健康度 (Cost Health)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CostHealth {
    WithinCeiling, // 平均成本不高于理想上限
    AboveCeiling,  // 平均成本高于理想上限
}

impl fmt::Display for CostHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CostHealth::WithinCeiling => write!(f, "WITHIN_CEILING"),
            CostHealth::AboveCeiling => write!(f, "ABOVE_CEILING"),
        }
    }
}

// ==========================================
// 库存水位 (Stock Level)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockLevel {
    BelowIdeal,  // 低于理想区间
    WithinIdeal, // 理想区间内
    AboveIdeal,  // 高于理想区间
}

impl fmt::Display for StockLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StockLevel::BelowIdeal => write!(f, "BELOW_IDEAL"),
            StockLevel::WithinIdeal => write!(f, "WITHIN_IDEAL"),
            StockLevel::AboveIdeal => write!(f, "ABOVE_IDEAL"),
        }
    }
}

// ==========================================
// 市场头寸 (Market Position)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarketPosition {
    TargetReached, // 市价 >= 成本 + 期望利润
    InProfit,      // 有利润但未达期望
    BelowCost,     // 市价不高于成本
}

impl fmt::Display for MarketPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarketPosition::TargetReached => write!(f, "TARGET_REACHED"),
            MarketPosition::InProfit => write!(f, "IN_PROFIT"),
            MarketPosition::BelowCost => write!(f, "BELOW_COST"),
        }
    }
}
