// ==========================================
// 拼配搜索引擎 集成测试
// ==========================================
// 测试目标: 独占性、准入正确性、确定性、first-fit 与穷举参照一致
// ==========================================


use coffee_blend_engine::config::ConstraintConfig;
use coffee_blend_engine::domain::{
    LotOrdering, ProfitGoalStatus, SearchMode, SearchTermination, TargetStatus, VolumeTarget,
};
use coffee_blend_engine::engine::{BlendSearch, ConstraintEvaluator, SearchBudget, WeightedAggregator};
use coffee_blend_engine::logging;
use coffee_blend_engine::LotCatalog;
use std::collections::HashSet;
use test_helpers::*;

fn constraints() -> ConstraintConfig {
    ConstraintConfig::with_market_price(2200.0)
}

#[test]
fn test_aggregation_example_is_exact() {
    println!("\n=== 测试：两批次加权品质 ===");

    let lots = [lot("A", 100.0, 20.0, 1800.0), lot("B", 200.0, 50.0, 1800.0)];
    let metrics = WeightedAggregator::aggregate(lots.iter()).unwrap();

    assert_eq!(metrics.total_volume, 300.0);
    assert_eq!(metrics.weighted_quality, 40.0);
    assert_eq!(metrics.weighted_cost, 1800.0);
}

#[test]
fn test_allocation_blends_are_disjoint_and_cover_catalog() {
    logging::init_test();
    println!("\n=== 测试：分配模式批次独占 ===");

    for seed in [3_u64, 17, 42, 99] {
        let catalog = generated_catalog(seed, 12);
        let config = search_config(SearchMode::Allocation, &[1000.0, 750.0, 500.0, 250.0], true);
        let outcome = BlendSearch::new(config)
            .run(&catalog, &constraints(), &SearchBudget::unlimited())
            .unwrap();

        let mut seen = HashSet::new();
        for blend in outcome.ledger.blends() {
            for id in &blend.lot_ids {
                assert!(catalog.contains(id), "seed {}: 未知批次 {}", seed, id);
                assert!(seen.insert(id.clone()), "seed {}: 批次 {} 被重复使用", seed, id);
            }
        }

        let residual = outcome.ledger.residual(&catalog);
        assert_eq!(seen.len() + residual.lots.len(), catalog.len());
        for id in residual.lot_ids() {
            assert!(!seen.contains(id));
        }
        println!("seed {}: {} 个拼配，剩余 {} 批次", seed, outcome.ledger.len(), residual.lots.len());
    }
}

#[test]
fn test_every_blend_passes_admission() {
    println!("\n=== 测试：输出拼配全部满足准入 ===");

    let catalog = generated_catalog(7, 10);
    let constraints = constraints();
    for mode in [SearchMode::Discovery, SearchMode::Allocation] {
        let config = search_config(mode, &[1000.0, 750.0, 500.0, 250.0], true);
        let outcome = BlendSearch::new(config)
            .run(&catalog, &constraints, &SearchBudget::unlimited())
            .unwrap();

        for blend in outcome.ledger.blends() {
            let target = blend.target.unwrap_or(VolumeTarget {
                volume: blend.matched_volume,
                priority: 0,
            });
            let members = blend.lot_ids.iter().map(|id| catalog.get(id).unwrap());
            let metrics = WeightedAggregator::aggregate(members).unwrap();

            assert!(blend.lot_count() >= 2);
            assert_eq!(metrics, blend.metrics());
            assert!(ConstraintEvaluator::check(&metrics, &target, &constraints, mode).is_ok());
            assert_eq!(
                blend.profit_per_unit,
                ConstraintEvaluator::profit_per_unit(&metrics, &constraints)
            );
        }
    }
}

#[test]
fn test_allocation_matches_exhaustive_first_fit() {
    println!("\n=== 测试：分配模式与穷举参照一致 ===");

    let constraints = constraints();
    for seed in [1_u64, 5, 23, 64, 128] {
        let catalog = generated_catalog(seed, 11);
        let config = search_config(SearchMode::Allocation, &[1000.0, 750.0, 500.0, 250.0], true);
        let expected = reference_allocation(&catalog, &config, &constraints);

        let outcome = BlendSearch::new(config)
            .run(&catalog, &constraints, &SearchBudget::unlimited())
            .unwrap();

        let mut blends = outcome.ledger.blends().iter();
        for (report, expected_ids) in outcome.target_reports.iter().zip(&expected) {
            match expected_ids {
                Some(ids) => {
                    assert_eq!(report.status, TargetStatus::Met, "seed {}", seed);
                    let blend = blends.next().unwrap();
                    assert_eq!(&blend_ids(blend), ids, "seed {}", seed);
                    assert_eq!(blend.target.map(|t| t.volume), Some(report.target.volume));
                }
                None => assert_eq!(report.status, TargetStatus::Unmet, "seed {}", seed),
            }
        }
        assert!(blends.next().is_none());
    }
}

#[test]
fn test_discovery_matches_exhaustive_enumeration() {
    println!("\n=== 测试：发现模式与穷举参照一致 ===");

    let constraints = constraints();
    for seed in [2_u64, 11, 77] {
        let catalog = generated_catalog(seed, 10);
        let config = search_config(SearchMode::Discovery, &[1000.0, 750.0, 500.0, 250.0], true);
        let expected = reference_discovery(&catalog, &config, &constraints);

        let outcome = BlendSearch::new(config)
            .run(&catalog, &constraints, &SearchBudget::unlimited())
            .unwrap();
        let actual: Vec<(Vec<String>, f64)> = outcome
            .ledger
            .blends()
            .iter()
            .map(|b| (blend_ids(b), b.matched_volume))
            .collect();

        assert_eq!(actual, expected, "seed {}", seed);
        assert!(outcome.ledger.blends().iter().all(|b| b.target.is_none()));
        assert_eq!(outcome.profit_goal, ProfitGoalStatus::NotEvaluated);
    }
}

#[test]
fn test_repeated_runs_are_identical() {
    println!("\n=== 测试：重复执行结果一致 ===");

    let catalog = generated_catalog(31, 12);
    for mode in [SearchMode::Discovery, SearchMode::Allocation] {
        let run = |parallel: bool| {
            BlendSearch::new(search_config(mode, &[1000.0, 500.0, 250.0], parallel))
                .run(&catalog, &constraints(), &SearchBudget::unlimited())
                .unwrap()
        };

        let first = run(true);
        let second = run(true);
        let sequential = run(false);

        assert_eq!(first.ledger.blends(), second.ledger.blends());
        assert_eq!(first.ledger.blends(), sequential.ledger.blends());
        assert_eq!(first.target_reports, sequential.target_reports);
        assert_eq!(first.termination, SearchTermination::Completed);
    }
}

#[test]
fn test_discovery_reuses_lots_allocation_does_not() {
    println!("\n=== 测试：两种模式的批次复用差异 ===");

    let catalog = catalog(vec![
        lot("A", 250.0, 30.0, 1900.0),
        lot("B", 250.0, 30.0, 1900.0),
        lot("C", 250.0, 30.0, 1900.0),
    ]);

    let discovery = BlendSearch::new(search_config(SearchMode::Discovery, &[500.0], false))
        .run(&catalog, &constraints(), &SearchBudget::unlimited())
        .unwrap();
    let ids: Vec<Vec<String>> = discovery.ledger.blends().iter().map(blend_ids).collect();
    assert_eq!(
        ids,
        vec![
            vec!["A".to_string(), "B".to_string()],
            vec!["A".to_string(), "C".to_string()],
            vec!["B".to_string(), "C".to_string()],
        ]
    );
    // 发现模式不消耗库存
    assert_eq!(discovery.ledger.residual(&catalog).lots.len(), 3);

    let allocation = BlendSearch::new(search_config(SearchMode::Allocation, &[500.0, 500.0], false))
        .run(&catalog, &constraints(), &SearchBudget::unlimited())
        .unwrap();
    assert_eq!(allocation.ledger.len(), 1);
    assert_eq!(allocation.target_reports[0].status, TargetStatus::Met);
    assert_eq!(allocation.target_reports[1].status, TargetStatus::Unmet);
    assert_eq!(allocation.ledger.residual(&catalog).lot_ids(), vec!["C"]);
}

#[test]
fn test_volume_tolerance_boundary_is_inclusive() {
    println!("\n=== 测试：袋数偏差边界 ===");

    let inside = catalog(vec![lot("A", 240.0, 30.0, 1900.0), lot("B", 250.0, 30.0, 1900.0)]);
    let outside = catalog(vec![lot("A", 239.0, 30.0, 1900.0), lot("B", 250.0, 30.0, 1900.0)]);
    let search = BlendSearch::new(search_config(SearchMode::Allocation, &[500.0], false));

    let hit = search
        .run(&inside, &constraints(), &SearchBudget::unlimited())
        .unwrap();
    assert_eq!(hit.ledger.len(), 1);
    assert_eq!(hit.ledger.blends()[0].total_volume, 490.0);

    let miss = search
        .run(&outside, &constraints(), &SearchBudget::unlimited())
        .unwrap();
    assert!(miss.ledger.is_empty());
    assert_eq!(miss.target_reports[0].status, TargetStatus::Unmet);
}

#[test]
fn test_empty_catalog_yields_nothing() {
    println!("\n=== 测试：空目录 ===");

    let empty = LotCatalog::empty();
    for mode in [SearchMode::Discovery, SearchMode::Allocation] {
        let outcome = BlendSearch::new(search_config(mode, &[500.0], true))
            .run(&empty, &constraints(), &SearchBudget::unlimited())
            .unwrap();
        assert!(outcome.ledger.is_empty());
        assert!(outcome.ledger.residual(&empty).is_empty());
        assert_eq!(outcome.profit_goal, ProfitGoalStatus::NotEvaluated);
        assert!(outcome
            .target_reports
            .iter()
            .all(|r| r.status == TargetStatus::Unmet));
    }
}

#[test]
fn test_input_order_changes_first_fit() {
    println!("\n=== 测试：排序口径影响 first-fit ===");

    let lots = vec![
        lot("Z", 250.0, 30.0, 1900.0),
        lot("M", 250.0, 30.0, 1900.0),
        lot("A", 250.0, 30.0, 1900.0),
    ];
    let by_id = LotCatalog::new(lots.clone(), LotOrdering::LotIdAsc);
    let by_input = LotCatalog::new(lots, LotOrdering::InputOrder);
    let search = BlendSearch::new(search_config(SearchMode::Allocation, &[500.0], false));

    let first = search.run(&by_id, &constraints(), &SearchBudget::unlimited()).unwrap();
    let second = search.run(&by_input, &constraints(), &SearchBudget::unlimited()).unwrap();

    assert_eq!(blend_ids(&first.ledger.blends()[0]), vec!["A", "M"]);
    assert_eq!(blend_ids(&second.ledger.blends()[0]), vec!["Z", "M"]);
}
