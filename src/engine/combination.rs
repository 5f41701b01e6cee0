// ==========================================
// 咖啡拼配分析系统 - 组合枚举器
// ==========================================
// 职责: 按字典序枚举固定大小 r 的下标组合，并按袋数可达区间剪枝
// 红线: 只剪掉不可能命中任何目标窗口的分支，字典序第一个命中组合不变
// ==========================================
// 剪枝: 对每个后缀 i 预计算“从 i.. 中取 k 个”的袋数最小和 / 最大和
// 若 [partial + min, partial + max] 与所有目标窗口都不相交，则该分支无解
// ==========================================

use crate::engine::budget::{Interrupt, SearchBudget};
use std::ops::{ControlFlow, Range};

/// 可达区间比较的相对浮点容差（剪枝只放宽，不收紧）
///
/// 后缀和按袋数排序累加，partial 按枚举顺序累加，两者舍入误差随量级增长
const HULL_SLACK_RELATIVE: f64 = 1e-9;

// ==========================================
// WalkOutcome - 枚举结果
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub enum WalkOutcome<B> {
    /// 枚举完毕，访问者未要求停止
    Exhausted,
    /// 访问者返回 Break
    Stopped(B),
    /// 检查点中断（取消 / 预算耗尽）
    Interrupted(Interrupt),
    /// 调用方要求放弃（已有更靠前的分区命中）
    Preempted,
}

enum Halt<B> {
    Stop(B),
    Interrupt(Interrupt),
    Preempt,
}

impl<B> From<ControlFlow<Halt<B>>> for WalkOutcome<B> {
    fn from(flow: ControlFlow<Halt<B>>) -> Self {
        match flow {
            ControlFlow::Continue(()) => WalkOutcome::Exhausted,
            ControlFlow::Break(Halt::Stop(b)) => WalkOutcome::Stopped(b),
            ControlFlow::Break(Halt::Interrupt(i)) => WalkOutcome::Interrupted(i),
            ControlFlow::Break(Halt::Preempt) => WalkOutcome::Preempted,
        }
    }
}

// ==========================================
// CombinationWalker - 组合枚举器
// ==========================================
pub struct CombinationWalker<'a> {
    volumes: &'a [f64],
    r: usize,
    /// 目标袋数窗口 [lo, hi]
    windows: Vec<(f64, f64)>,
    /// min_sum[i][k]: 后缀 i.. 中取 k 个的最小袋数和（不足 k 个为 +inf）
    min_sum: Vec<Vec<f64>>,
    /// max_sum[i][k]: 后缀 i.. 中取 k 个的最大袋数和（不足 k 个为 -inf）
    max_sum: Vec<Vec<f64>>,
}

impl<'a> CombinationWalker<'a> {
    /// 构造枚举器
    ///
    /// # 参数
    /// - volumes: 候选批次袋数（规范顺序）
    /// - r: 组合大小（>= 1）
    /// - windows: 可接受的总袋数窗口（闭区间）
    pub fn new(volumes: &'a [f64], r: usize, windows: Vec<(f64, f64)>) -> Self {
        let (min_sum, max_sum) = suffix_bounds(volumes, r);
        Self {
            volumes,
            r,
            windows,
            min_sum,
            max_sum,
        }
    }

    /// 组合首元素的取值范围（用于并行切分）
    pub fn first_indices(&self) -> Range<usize> {
        let n = self.volumes.len();
        if self.r == 0 || self.r > n {
            0..0
        } else {
            0..(n - self.r + 1)
        }
    }

    /// 按字典序枚举全部组合
    pub fn walk<B, F>(&self, budget: &SearchBudget, mut visit: F) -> WalkOutcome<B>
    where
        F: FnMut(&[usize], f64) -> ControlFlow<B>,
    {
        if self.r == 0 {
            return WalkOutcome::Exhausted;
        }
        let mut stack = Vec::with_capacity(self.r);
        self.descend(0, 0.0, &mut stack, budget, &|| false, &mut visit)
            .into()
    }

    /// 只枚举首元素为 first 的组合（字典序）
    pub fn walk_from<B, F>(&self, first: usize, budget: &SearchBudget, visit: F) -> WalkOutcome<B>
    where
        F: FnMut(&[usize], f64) -> ControlFlow<B>,
    {
        self.walk_from_until(first, budget, &|| false, visit)
    }

    /// 同 walk_from，但每个候选进入检查点之前先询问 preempt
    ///
    /// preempt 返回 true 时立即放弃该分区（不计入预算），结果为 Preempted
    pub fn walk_from_until<B, F>(
        &self,
        first: usize,
        budget: &SearchBudget,
        preempt: &dyn Fn() -> bool,
        mut visit: F,
    ) -> WalkOutcome<B>
    where
        F: FnMut(&[usize], f64) -> ControlFlow<B>,
    {
        if !self.first_indices().contains(&first) {
            return WalkOutcome::Exhausted;
        }
        if !self.subtree_reachable(first, 0.0, self.r) {
            return WalkOutcome::Exhausted;
        }

        let mut stack = Vec::with_capacity(self.r);
        stack.push(first);
        let partial = 0.0 + self.volumes[first];
        self.descend(first + 1, partial, &mut stack, budget, preempt, &mut visit)
            .into()
    }

    fn descend<B, F>(
        &self,
        start: usize,
        partial: f64,
        stack: &mut Vec<usize>,
        budget: &SearchBudget,
        preempt: &dyn Fn() -> bool,
        visit: &mut F,
    ) -> ControlFlow<Halt<B>>
    where
        F: FnMut(&[usize], f64) -> ControlFlow<B>,
    {
        let remaining = self.r - stack.len();
        if remaining == 0 {
            if preempt() {
                return ControlFlow::Break(Halt::Preempt);
            }
            if let Err(interrupt) = budget.checkpoint() {
                return ControlFlow::Break(Halt::Interrupt(interrupt));
            }
            return match visit(stack, partial) {
                ControlFlow::Continue(()) => ControlFlow::Continue(()),
                ControlFlow::Break(b) => ControlFlow::Break(Halt::Stop(b)),
            };
        }

        let n = self.volumes.len();
        if start + remaining > n {
            return ControlFlow::Continue(());
        }

        for i in start..=(n - remaining) {
            // 后缀 i 整体不可达 → 之后的后缀是其子集，也不可达
            if !self.hull_hits(
                partial + self.min_sum[i][remaining],
                partial + self.max_sum[i][remaining],
            ) {
                break;
            }
            if !self.subtree_reachable(i, partial, remaining) {
                continue;
            }

            stack.push(i);
            let flow = self.descend(i + 1, partial + self.volumes[i], stack, budget, preempt, visit);
            stack.pop();
            if let ControlFlow::Break(halt) = flow {
                return ControlFlow::Break(halt);
            }
        }

        ControlFlow::Continue(())
    }

    /// 选中 i 之后，剩余 remaining-1 个从 i+1.. 中取，是否可能命中窗口
    fn subtree_reachable(&self, i: usize, partial: f64, remaining: usize) -> bool {
        let with_i = partial + self.volumes[i];
        self.hull_hits(
            with_i + self.min_sum[i + 1][remaining - 1],
            with_i + self.max_sum[i + 1][remaining - 1],
        )
    }

    fn hull_hits(&self, lo: f64, hi: f64) -> bool {
        if !(lo.is_finite() && hi.is_finite()) {
            return false;
        }
        self.windows.iter().any(|&(w_lo, w_hi)| {
            let slack = HULL_SLACK_RELATIVE * lo.abs().max(hi.abs()).max(w_hi.abs()).max(1.0);
            lo <= w_hi + slack && hi >= w_lo - slack
        })
    }
}

/// 预计算每个后缀取 k 个（k = 0..=r）的最小和 / 最大和
fn suffix_bounds(volumes: &[f64], r: usize) -> (Vec<Vec<f64>>, Vec<Vec<f64>>) {
    let n = volumes.len();
    let mut min_sum = vec![vec![f64::INFINITY; r + 1]; n + 1];
    let mut max_sum = vec![vec![f64::NEG_INFINITY; r + 1]; n + 1];
    min_sum[n][0] = 0.0;
    max_sum[n][0] = 0.0;

    // 后缀内袋数升序
    let mut sorted: Vec<f64> = Vec::with_capacity(n);
    for i in (0..n).rev() {
        let v = volumes[i];
        let pos = sorted.partition_point(|&x| x < v);
        sorted.insert(pos, v);

        min_sum[i][0] = 0.0;
        max_sum[i][0] = 0.0;
        let take = r.min(sorted.len());
        let mut low = 0.0;
        let mut high = 0.0;
        for k in 1..=take {
            low += sorted[k - 1];
            high += sorted[sorted.len() - k];
            min_sum[i][k] = low;
            max_sum[i][k] = high;
        }
    }

    (min_sum, max_sum)
}

/// 估算组合总数 Σ C(n, r)，r ∈ [r_min, r_max]（饱和到 u64::MAX）
pub fn estimate_combinations(n: usize, r_min: usize, r_max: usize) -> u64 {
    let mut total: u64 = 0;
    for r in r_min..=r_max.min(n) {
        total = total.saturating_add(binomial(n, r));
    }
    total
}

fn binomial(n: usize, r: usize) -> u64 {
    if r > n {
        return 0;
    }
    let r = r.min(n - r);
    let mut acc: u128 = 1;
    for k in 0..r {
        // acc * (n - k) / (k + 1) 恒为整数
        acc = match acc.checked_mul((n - k) as u128) {
            Some(v) => v / (k as u128 + 1),
            None => return u64::MAX,
        };
        if acc > u64::MAX as u128 {
            return u64::MAX;
        }
    }
    acc as u64
}
