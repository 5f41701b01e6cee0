// ==========================================
// 咖啡拼配分析系统 - 搜索预算与协作式取消
// ==========================================
// 职责: 组合数预算 / 墙钟预算 / 调用方取消
// 红线: 每次候选评估前调用 checkpoint()；一旦触发，对所有工作线程保持触发
// ==========================================

use crate::config::BudgetConfig;
use crate::domain::types::SearchTermination;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// 墙钟检查间隔（每 N 次评估读取一次时钟）
const CLOCK_CHECK_INTERVAL: u64 = 256;

const NOT_TRIPPED: u8 = 0;
const TRIPPED_CANCELLED: u8 = 1;
const TRIPPED_BUDGET: u8 = 2;

// ==========================================
// CancelToken - 取消令牌（可克隆，跨线程共享）
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

// ==========================================
// Interrupt - 中断原因
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Interrupt {
    Cancelled,
    BudgetExhausted,
}

impl Interrupt {
    pub fn termination(self) -> SearchTermination {
        match self {
            Interrupt::Cancelled => SearchTermination::Cancelled,
            Interrupt::BudgetExhausted => SearchTermination::BudgetExhausted,
        }
    }

    fn code(self) -> u8 {
        match self {
            Interrupt::Cancelled => TRIPPED_CANCELLED,
            Interrupt::BudgetExhausted => TRIPPED_BUDGET,
        }
    }

    fn from_code(code: u8) -> Option<Self> {
        match code {
            TRIPPED_CANCELLED => Some(Interrupt::Cancelled),
            TRIPPED_BUDGET => Some(Interrupt::BudgetExhausted),
            _ => None,
        }
    }
}

// ==========================================
// SearchBudget - 单次搜索预算
// ==========================================
#[derive(Debug)]
pub struct SearchBudget {
    token: CancelToken,
    max_candidates: Option<u64>,
    deadline: Option<Instant>,
    evaluated: AtomicU64,
    tripped: AtomicU8,
}

impl Default for SearchBudget {
    fn default() -> Self {
        Self::unlimited()
    }
}

impl SearchBudget {
    /// 无预算限制（仍可通过令牌取消）
    pub fn unlimited() -> Self {
        Self::new(CancelToken::new(), None, None)
    }

    pub fn new(token: CancelToken, max_candidates: Option<u64>, time_budget: Option<Duration>) -> Self {
        Self {
            token,
            max_candidates,
            deadline: time_budget.map(|d| Instant::now() + d),
            evaluated: AtomicU64::new(0),
            tripped: AtomicU8::new(NOT_TRIPPED),
        }
    }

    /// 由配置构造（墙钟从此刻开始计时）
    pub fn from_config(config: &BudgetConfig, token: CancelToken) -> Self {
        Self::new(
            token,
            config.max_candidates,
            config.time_budget_ms.map(Duration::from_millis),
        )
    }

    pub fn token(&self) -> &CancelToken {
        &self.token
    }

    /// 候选评估前的检查点
    ///
    /// # 返回
    /// - Ok(()): 可以评估下一个候选（计数 +1）
    /// - Err(Interrupt): 已取消 / 预算耗尽，调用方应停止
    pub fn checkpoint(&self) -> Result<(), Interrupt> {
        if let Some(interrupt) = self.interrupted() {
            return Err(interrupt);
        }

        if self.token.is_cancelled() {
            return Err(self.trip(Interrupt::Cancelled));
        }

        let n = self.evaluated.fetch_add(1, Ordering::Relaxed) + 1;

        if let Some(max) = self.max_candidates {
            if n > max {
                return Err(self.trip(Interrupt::BudgetExhausted));
            }
        }

        if let Some(deadline) = self.deadline {
            if (n == 1 || n % CLOCK_CHECK_INTERVAL == 0) && Instant::now() >= deadline {
                return Err(self.trip(Interrupt::BudgetExhausted));
            }
        }

        Ok(())
    }

    /// 已触发的中断（未触发为 None）
    pub fn interrupted(&self) -> Option<Interrupt> {
        Interrupt::from_code(self.tripped.load(Ordering::Acquire))
    }

    /// 已评估候选数（不超过组合数预算）
    pub fn candidates_evaluated(&self) -> u64 {
        let n = self.evaluated.load(Ordering::Relaxed);
        match self.max_candidates {
            Some(max) => n.min(max),
            None => n,
        }
    }

    /// 触发中断（首次触发的原因生效）
    fn trip(&self, interrupt: Interrupt) -> Interrupt {
        match self.tripped.compare_exchange(
            NOT_TRIPPED,
            interrupt.code(),
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Ok(_) => interrupt,
            Err(existing) => Interrupt::from_code(existing).unwrap_or(interrupt),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unlimited_budget_counts() {
        let budget = SearchBudget::unlimited();
        for _ in 0..10 {
            assert!(budget.checkpoint().is_ok());
        }
        assert_eq!(budget.candidates_evaluated(), 10);
        assert_eq!(budget.interrupted(), None);
    }

    #[test]
    fn test_candidate_budget_trips_and_stays_tripped() {
        let budget = SearchBudget::new(CancelToken::new(), Some(3), None);
        assert!(budget.checkpoint().is_ok());
        assert!(budget.checkpoint().is_ok());
        assert!(budget.checkpoint().is_ok());
        assert_eq!(budget.checkpoint(), Err(Interrupt::BudgetExhausted));
        assert_eq!(budget.checkpoint(), Err(Interrupt::BudgetExhausted));
        assert_eq!(budget.candidates_evaluated(), 3);
    }

    #[test]
    fn test_cancel_token_shared_across_clones() {
        let token = CancelToken::new();
        let budget = SearchBudget::new(token.clone(), None, None);
        assert!(budget.checkpoint().is_ok());

        token.cancel();
        assert_eq!(budget.checkpoint(), Err(Interrupt::Cancelled));
        assert_eq!(budget.interrupted(), Some(Interrupt::Cancelled));
    }

    #[test]
    fn test_zero_time_budget_trips_on_first_checkpoint() {
        let budget = SearchBudget::new(CancelToken::new(), None, Some(Duration::ZERO));
        assert_eq!(budget.checkpoint(), Err(Interrupt::BudgetExhausted));
    }

    #[test]
    fn test_first_reason_wins() {
        let token = CancelToken::new();
        let budget = SearchBudget::new(token.clone(), Some(1), None);
        assert!(budget.checkpoint().is_ok());
        assert_eq!(budget.checkpoint(), Err(Interrupt::BudgetExhausted));
        token.cancel();
        assert_eq!(budget.checkpoint(), Err(Interrupt::BudgetExhausted));
    }

    #[test]
    fn test_interrupt_maps_to_termination() {
        assert_eq!(
            Interrupt::Cancelled.termination(),
            SearchTermination::Cancelled
        );
        assert_eq!(
            Interrupt::BudgetExhausted.termination(),
            SearchTermination::BudgetExhausted
        );
    }
}
