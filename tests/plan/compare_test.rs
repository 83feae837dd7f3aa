use plancharts::plan::{plan_eq, PlanError, PlanNode};
use serde_json::json;

fn parse(value: serde_json::Value) -> PlanNode {
    PlanNode::from_json(&value).unwrap()
}

fn hash_join(rows: u64, cost: f64) -> PlanNode {
    parse(json!({
        "Node Type": "Hash Join",
        "Parallel Aware": false,
        "Join Type": "Inner",
        "Startup Cost": 1.0,
        "Total Cost": cost,
        "Plan Rows": rows,
        "Plan Width": 8,
        "Inner Unique": false,
        "Hash Cond": "(a.id = b.a_id)",
        "Plans": [
            {
                "Node Type": "Seq Scan",
                "Parent Relationship": "Outer",
                "Relation Name": "b",
                "Alias": "b",
                "Total Cost": cost / 2.0,
                "Plan Rows": rows
            },
            {
                "Node Type": "Hash",
                "Parent Relationship": "Inner",
                "Plans": [
                    {
                        "Node Type": "Seq Scan",
                        "Parent Relationship": "Outer",
                        "Relation Name": "a",
                        "Alias": "a",
                        "Plan Rows": rows * 2
                    }
                ]
            }
        ]
    }))
}

#[test]
fn test_reflexive() {
    let plan = hash_join(10, 100.0);
    assert!(plan_eq(&plan, &plan).unwrap());
}

#[test]
fn test_estimates_are_ignored() {
    let small = hash_join(10, 100.0);
    let large = hash_join(1_000_000, 98_765.4);
    assert!(plan_eq(&small, &large).unwrap());
    assert!(plan_eq(&large, &small).unwrap());
}

#[test]
fn test_different_join_condition() {
    let left = hash_join(10, 100.0);
    let mut value = json!({
        "Node Type": "Hash Join",
        "Parallel Aware": false,
        "Join Type": "Inner",
        "Inner Unique": false,
        "Hash Cond": "(a.id = b.other_id)",
    });
    value["Plans"] = json!([
        {"Node Type": "Seq Scan", "Parent Relationship": "Outer", "Relation Name": "b", "Alias": "b"},
        {"Node Type": "Hash", "Parent Relationship": "Inner", "Plans": [
            {"Node Type": "Seq Scan", "Parent Relationship": "Outer", "Relation Name": "a", "Alias": "a"}
        ]}
    ]);
    let right = parse(value);

    assert!(!plan_eq(&left, &right).unwrap());
    assert!(!plan_eq(&right, &left).unwrap());
}

#[test]
fn test_different_node_type() {
    let seq = PlanNode::new("Seq Scan").with_attr("Relation Name", "t");
    let index = PlanNode::new("Index Scan").with_attr("Relation Name", "t");
    assert!(!plan_eq(&seq, &index).unwrap());
}

#[test]
fn test_filter_present_on_one_side_only() {
    let plain = PlanNode::new("Seq Scan").with_attr("Relation Name", "t");
    let filtered = plain.clone().with_attr("Filter", "(x > 5)");
    assert!(!plan_eq(&plain, &filtered).unwrap());
    assert!(!plan_eq(&filtered, &plain).unwrap());
}

#[test]
fn test_child_count_differs() {
    let one = PlanNode::new("Append").with_child(PlanNode::new("Seq Scan"));
    let two = one.clone().with_child(PlanNode::new("Seq Scan"));
    assert!(!plan_eq(&one, &two).unwrap());
}

#[test]
fn test_child_order_matters() {
    let a = PlanNode::new("Seq Scan").with_attr("Relation Name", "a");
    let b = PlanNode::new("Seq Scan").with_attr("Relation Name", "b");
    let ab = PlanNode::new("Nested Loop")
        .with_child(a.clone())
        .with_child(b.clone());
    let ba = PlanNode::new("Nested Loop").with_child(b).with_child(a);
    assert!(!plan_eq(&ab, &ba).unwrap());
}

#[test]
fn test_empty_children_list_is_no_children() {
    let bare = parse(json!({"Node Type": "Result"}));
    let empty = parse(json!({"Node Type": "Result", "Plans": []}));
    assert!(plan_eq(&bare, &empty).unwrap());
}

#[test]
fn test_unknown_attribute_is_an_error() {
    let known = PlanNode::new("Seq Scan").with_attr("Relation Name", "t");
    let unknown = known.clone().with_attr("Heap Fetches", 0);

    match plan_eq(&known, &unknown) {
        Err(PlanError::UnknownAttribute { key, value }) => {
            assert_eq!(key, "Heap Fetches");
            assert_eq!(value, "0");
        }
        other => panic!("expected UnknownAttribute, got {:?}", other),
    }
}

#[test]
fn test_unknown_attribute_deep_in_tree() {
    let leaf = PlanNode::new("Seq Scan").with_attr("Relation Name", "t");
    let odd_leaf = leaf.clone().with_attr("Shared Hit Blocks", 3);
    let left = PlanNode::new("Materialize").with_child(leaf);
    let right = PlanNode::new("Materialize").with_child(odd_leaf);

    assert!(matches!(
        plan_eq(&left, &right),
        Err(PlanError::UnknownAttribute { .. })
    ));
}
