#[path = "../support/mod.rs"]
mod support;

use plancharts::backend::BackendError;
use plancharts::plan::{Plan, PlanError, PlanNode};
use plancharts::sweep::{ParameterConfig, ParameterizedStatement, SweepError, SweepRunner};
use support::{failed_request, join, scan, scripted_failure, Call, ScriptedProvider};

const QUERY: &str = "SELECT * FROM a JOIN b ON a.id = b.a_id";

fn seed(statement: &str, count: usize) -> ParameterizedStatement {
    ParameterizedStatement::new(statement, count)
}

#[tokio::test]
async fn test_one_dimension_same_shape() {
    let provider = ScriptedProvider::new(|values| Ok(scan("t", values[0] as f64)));
    let runner = SweepRunner::new(
        provider.clone(),
        vec![seed("INSERT INTO t SELECT generate_series(1, $1)", 1)],
        QUERY,
    );

    let sweep = runner
        .run_1d(&ParameterConfig::new("rows", 1.0, 100.0, 3))
        .await
        .unwrap();

    assert_eq!(sweep.axis.values, vec![100, 10, 1]);
    assert_eq!(sweep.axis.boundaries.len(), 4);
    assert_eq!(sweep.classes.len(), 1);
    assert_eq!(sweep.classes[0].len(), 3);
    assert_eq!(sweep.assignments, vec![0, 0, 0]);
    assert_eq!(sweep.costs, vec![100.0, 10.0, 1.0]);
    assert_eq!(sweep.class_values(0), vec![100, 10, 1]);

    // One fresh backend per sample, each torn down.
    assert_eq!(provider.count(&Call::Start), 3);
    assert_eq!(provider.count(&Call::Shutdown), 3);
    assert_eq!(provider.count(&Call::Prepare), 3);
    assert_eq!(provider.count(&Call::Plan(QUERY.to_string())), 3);
}

#[tokio::test]
async fn test_one_dimension_changes_plan() {
    let provider = ScriptedProvider::new(|values| {
        let rows = values[0];
        if rows >= 1000 {
            Ok(join("Hash Join", rows as f64))
        } else {
            Ok(join("Nested Loop", rows as f64))
        }
    });
    let runner = SweepRunner::new(provider, vec![seed("seed $1", 1)], QUERY);

    let sweep = runner
        .run_1d(&ParameterConfig::new("rows", 1.0, 100_000.0, 6))
        .await
        .unwrap();

    assert_eq!(sweep.axis.values, vec![100_000, 10_000, 1000, 100, 10, 1]);
    assert_eq!(sweep.assignments, vec![0, 0, 0, 1, 1, 1]);
    assert_eq!(sweep.classes[0].representative().summary(), "Hash Join( Seq Scan, Hash( Seq Scan ) )");
    assert_eq!(sweep.classes[1].representative().summary(), "Nested Loop( Seq Scan, Seq Scan )");
    assert_eq!(sweep.class_values(1), vec![100, 10, 1]);
}

#[tokio::test]
async fn test_degenerate_axis_fails_before_any_sample() {
    let provider = ScriptedProvider::new(|_| Ok(scan("t", 1.0)));
    let runner = SweepRunner::new(provider.clone(), vec![seed("seed $1", 1)], QUERY);

    let err = runner
        .run_1d(&ParameterConfig::new("rows", 1.0, 1.4, 5))
        .await
        .unwrap_err();

    match err {
        SweepError::DegenerateAxis { name } => assert_eq!(name, "rows"),
        other => panic!("expected DegenerateAxis, got {:?}", other),
    }
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn test_degenerate_second_axis() {
    let provider = ScriptedProvider::new(|_| Ok(scan("t", 1.0)));
    let runner = SweepRunner::new(
        provider.clone(),
        vec![seed("seed $1", 1), seed("seed $1", 1)],
        QUERY,
    );

    let err = runner
        .run_2d(
            &ParameterConfig::new("x", 1.0, 10.0, 2),
            &ParameterConfig::new("y", 3.0, 3.0, 4),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, SweepError::DegenerateAxis { ref name } if name == "y"));
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn test_backend_torn_down_when_seeding_fails() {
    let provider =
        ScriptedProvider::new(|_| Ok(scan("t", 1.0))).failing_on("INSERT INTO b SELECT $1");
    let runner = SweepRunner::new(
        provider.clone(),
        vec![
            seed("CREATE TABLE b (id int)", 0),
            seed("INSERT INTO b SELECT $1", 1),
        ],
        QUERY,
    );

    let err = runner
        .run_1d(&ParameterConfig::new("rows", 1.0, 10.0, 2))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SweepError::Backend(BackendError::UnexpectedResponse { .. })
    ));
    // The sweep aborts at the first sample; its backend is still shut down.
    assert_eq!(
        provider.calls(),
        vec![
            Call::Start,
            Call::Execute("CREATE TABLE b (id int)".to_string(), vec![]),
            Call::Execute("INSERT INTO b SELECT $1".to_string(), vec![10]),
            Call::Shutdown,
        ]
    );
}

#[tokio::test]
async fn test_teardown_failure_after_successful_plan() {
    let provider = ScriptedProvider::new(|_| Ok(scan("t", 1.0))).failing_shutdown();
    let runner = SweepRunner::new(provider.clone(), vec![seed("CREATE TABLE t ()", 0)], QUERY);

    let err = runner.run_0d().await.unwrap_err();

    assert_eq!(failed_request(&err), Some("worker.shutdown"));
    assert_eq!(provider.count(&Call::Plan(QUERY.to_string())), 1);
    assert_eq!(provider.count(&Call::Shutdown), 1);
}

#[tokio::test]
async fn test_seeding_error_wins_over_teardown_error() {
    let provider = ScriptedProvider::new(|_| Ok(scan("t", 1.0)))
        .failing_on("INSERT INTO t SELECT $1")
        .failing_shutdown();
    let runner = SweepRunner::new(
        provider.clone(),
        vec![seed("INSERT INTO t SELECT $1", 1)],
        QUERY,
    );

    let err = runner
        .run_1d(&ParameterConfig::new("rows", 1.0, 10.0, 2))
        .await
        .unwrap_err();

    assert_eq!(failed_request(&err), Some("INSERT INTO t SELECT $1"));
    assert_eq!(
        provider.calls(),
        vec![
            Call::Start,
            Call::Execute("INSERT INTO t SELECT $1".to_string(), vec![10]),
            Call::Shutdown,
        ]
    );
}

#[tokio::test]
async fn test_backend_torn_down_when_maintenance_fails() {
    let provider = ScriptedProvider::new(|_| Ok(scan("t", 1.0))).failing_prepare();
    let runner = SweepRunner::new(provider.clone(), vec![seed("CREATE TABLE t ()", 0)], QUERY);

    let err = runner.run_0d().await.unwrap_err();

    assert_eq!(failed_request(&err), Some("ANALYZE"));
    assert_eq!(
        provider.calls(),
        vec![
            Call::Start,
            Call::Execute("CREATE TABLE t ()".to_string(), vec![]),
            Call::Prepare,
            Call::Shutdown,
        ]
    );
}

#[tokio::test]
async fn test_backend_torn_down_when_planning_fails() {
    let provider = ScriptedProvider::new(|values| {
        if values[0] < 10 {
            Err(scripted_failure("EXPLAIN (FORMAT JSON)"))
        } else {
            Ok(scan("t", values[0] as f64))
        }
    });
    let runner = SweepRunner::new(provider.clone(), vec![seed("seed $1", 1)], QUERY);

    let err = runner
        .run_1d(&ParameterConfig::new("rows", 1.0, 100.0, 3))
        .await
        .unwrap_err();

    assert_eq!(failed_request(&err), Some("EXPLAIN (FORMAT JSON)"));
    assert_eq!(provider.count(&Call::Start), 3);
    assert_eq!(provider.count(&Call::Shutdown), 3);
    assert_eq!(provider.calls().last(), Some(&Call::Shutdown));
}

#[tokio::test]
async fn test_unknown_attribute_aborts_sweep() {
    let provider = ScriptedProvider::new(|values| {
        let mut node = PlanNode::new("Seq Scan")
            .with_attr("Relation Name", "t")
            .with_estimates(0.0, values[0] as f64, values[0], 4);
        if values[0] < 10 {
            node = node.with_attr("Heap Fetches", 0);
        }
        Ok(Plan::new(node, "Seq Scan on t")?)
    });
    let runner = SweepRunner::new(provider.clone(), vec![seed("seed $1", 1)], QUERY);

    let err = runner
        .run_1d(&ParameterConfig::new("rows", 1.0, 100.0, 3))
        .await
        .unwrap_err();

    match err {
        SweepError::Plan(PlanError::UnknownAttribute { key, .. }) => {
            assert_eq!(key, "Heap Fetches")
        }
        other => panic!("expected UnknownAttribute, got {:?}", other),
    }
    assert_eq!(provider.count(&Call::Start), 3);
    assert_eq!(provider.count(&Call::Shutdown), 3);
}

#[tokio::test]
async fn test_two_dimensions() {
    // Hash join once the outer table is larger than the inner one.
    let provider = ScriptedProvider::new(|values| {
        let (a, b) = (values[0], values[1]);
        let cost = (a * b) as f64;
        if a > b {
            Ok(join("Hash Join", cost))
        } else {
            Ok(join("Nested Loop", cost))
        }
    });
    let runner = SweepRunner::new(
        provider.clone(),
        vec![
            seed("CREATE TABLE a (id int)", 0),
            seed("INSERT INTO a SELECT generate_series(1, $1)", 1),
            seed("INSERT INTO b SELECT generate_series(1, $1)", 1),
        ],
        QUERY,
    );

    let sweep = runner
        .run_2d(
            &ParameterConfig::new("a", 1.0, 100.0, 3),
            &ParameterConfig::new("b", 1.0, 10.0, 2),
        )
        .await
        .unwrap();

    assert_eq!(sweep.x.values, vec![100, 10, 1]);
    assert_eq!(sweep.y.values, vec![10, 1]);
    assert_eq!(sweep.x.boundaries.len(), 4);
    assert_eq!(sweep.y.boundaries.len(), 3);

    // First sample is (100, 10): a hash join, so class 0.
    assert_eq!(sweep.classes.len(), 2);
    assert_eq!(*sweep.classes[0].key(), (0, 0));
    assert_eq!(*sweep.classes[1].key(), (1, 0));

    // grid[j][i]: rows follow the second axis.
    assert_eq!(sweep.grid, vec![vec![0, 1, 1], vec![0, 0, 1]]);
    assert_eq!(sweep.class_at(1, 1), 0);
    assert_eq!(sweep.cost_at(0, 0), 1000.0);
    assert_eq!(sweep.cost_at(2, 1), 1.0);
    assert_eq!(sweep.costs, vec![vec![1000.0, 100.0, 10.0], vec![100.0, 10.0, 1.0]]);

    assert_eq!(sweep.class_coordinates(0), vec![(10, 1), (100, 1), (100, 10)]);
    assert_eq!(sweep.class_coordinates(1), vec![(1, 1), (1, 10), (10, 10)]);

    assert_eq!(provider.count(&Call::Start), 6);
    assert_eq!(provider.count(&Call::Shutdown), 6);
}

#[tokio::test]
async fn test_values_split_across_statements() {
    let provider = ScriptedProvider::new(|_| Ok(scan("t", 1.0)));
    let runner = SweepRunner::new(
        provider.clone(),
        vec![
            seed("INSERT INTO a SELECT generate_series(1, $1)", 1),
            seed("ANALYZE", 0),
            seed("INSERT INTO b SELECT generate_series(1, $1)", 1),
        ],
        QUERY,
    );

    runner
        .run_2d(
            &ParameterConfig::new("a", 1.0, 10.0, 2),
            &ParameterConfig::new("b", 2.0, 20.0, 2),
        )
        .await
        .unwrap();

    let executions = provider.executions();
    assert_eq!(executions.len(), 12);
    assert_eq!(
        executions[..3].to_vec(),
        vec![
            ("INSERT INTO a SELECT generate_series(1, $1)".to_string(), vec![10]),
            ("ANALYZE".to_string(), vec![]),
            ("INSERT INTO b SELECT generate_series(1, $1)".to_string(), vec![20]),
        ]
    );
    // Second sample keeps x and moves along y.
    assert_eq!(executions[3].1, vec![10]);
    assert_eq!(executions[5].1, vec![2]);
}

#[tokio::test]
async fn test_single_statement_takes_both_values() {
    let provider = ScriptedProvider::new(|_| Ok(scan("t", 1.0)));
    let runner = SweepRunner::new(
        provider.clone(),
        vec![seed("SELECT seed($1, $2)", 2)],
        QUERY,
    );

    runner
        .run_2d(
            &ParameterConfig::new("a", 1.0, 10.0, 2),
            &ParameterConfig::new("b", 1.0, 10.0, 2),
        )
        .await
        .unwrap();

    let values: Vec<Vec<u64>> = provider.executions().into_iter().map(|(_, v)| v).collect();
    assert_eq!(values, vec![vec![10, 10], vec![10, 1], vec![1, 10], vec![1, 1]]);
}

#[tokio::test]
async fn test_parameter_count_mismatch() {
    let provider = ScriptedProvider::new(|_| Ok(scan("t", 1.0)));
    let runner = SweepRunner::new(provider.clone(), vec![seed("CREATE TABLE t ()", 0)], QUERY);

    let err = runner
        .run_1d(&ParameterConfig::new("rows", 1.0, 10.0, 2))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SweepError::ParameterCountMismatch {
            declared: 0,
            swept: 1
        }
    ));
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn test_zero_dimensions() {
    let provider = ScriptedProvider::new(|values| {
        assert!(values.is_empty());
        Ok(scan("t", 42.0))
    });
    let runner = SweepRunner::new(
        provider.clone(),
        vec![seed("CREATE TABLE t (x int)", 0)],
        QUERY,
    );

    let plan = runner.run_0d().await.unwrap();

    assert_eq!(plan.cost(), 42.0);
    assert_eq!(
        provider.calls(),
        vec![
            Call::Start,
            Call::Execute("CREATE TABLE t (x int)".to_string(), vec![]),
            Call::Prepare,
            Call::Plan(QUERY.to_string()),
            Call::Shutdown,
        ]
    );
}
