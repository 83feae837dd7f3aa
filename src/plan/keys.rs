//! Attribute keys understood in PostgreSQL `EXPLAIN (FORMAT JSON)` output.
//!
//! Every key a plan node may carry is either *discriminating* (it takes part
//! in structural identity) or *volatile* (planner estimates that drift from
//! run to run). The child list travels under [`CHILDREN_KEY`]. Anything else
//! is schema drift and must be rejected by the comparator.

/// JSON key holding a node's ordered child plans.
pub const CHILDREN_KEY: &str = "Plans";

/// How an attribute participates in plan equivalence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    /// Part of the plan's structural identity.
    Discriminating,
    /// Numeric estimate ignored for equivalence.
    Volatile,
}

/// Known plan node attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlanKey {
    // Node identity
    NodeType,
    Strategy,
    PartialMode,
    Operation,
    ParentRelationship,
    SubplanName,
    ParamsEvaluated,
    CustomPlanProvider,
    Command,
    Disabled,

    // Relations and sources
    RelationName,
    Schema,
    Alias,
    FunctionName,
    TableFunctionName,
    CteName,
    TuplestoreName,
    IndexName,
    ScanDirection,
    SamplingMethod,
    SamplingParameters,
    RepeatableSeed,
    SubplansRemoved,

    // Joins
    JoinType,
    InnerUnique,
    HashCond,
    MergeCond,
    JoinFilter,

    // Conditions
    Filter,
    IndexCond,
    RecheckCond,
    TidCond,
    OrderBy,
    OneTimeFilter,
    RunCondition,
    Window,
    CacheKey,
    CacheMode,

    // Sorting and grouping
    SortKey,
    PresortedKey,
    GroupKey,
    GroupingSets,

    // Parallelism
    ParallelAware,
    AsyncCapable,
    WorkersPlanned,
    SingleCopy,

    // Modify table
    ConflictResolution,
    ConflictArbiterIndexes,
    ConflictFilter,

    Output,

    // Estimates
    StartupCost,
    TotalCost,
    PlanRows,
    PlanWidth,
    PlannedPartitions,
    EstimatedCapacity,
    EstimatedDistinctLookupKeys,
    EstimatedLookups,
    EstimatedHitPercent,
}

use AttributeKind::{Discriminating, Volatile};

const KNOWN: &[(PlanKey, &str, AttributeKind)] = &[
    (PlanKey::NodeType, "Node Type", Discriminating),
    (PlanKey::Strategy, "Strategy", Discriminating),
    (PlanKey::PartialMode, "Partial Mode", Discriminating),
    (PlanKey::Operation, "Operation", Discriminating),
    (PlanKey::ParentRelationship, "Parent Relationship", Discriminating),
    (PlanKey::SubplanName, "Subplan Name", Discriminating),
    (PlanKey::ParamsEvaluated, "Params Evaluated", Discriminating),
    (PlanKey::CustomPlanProvider, "Custom Plan Provider", Discriminating),
    (PlanKey::Command, "Command", Discriminating),
    (PlanKey::Disabled, "Disabled", Discriminating),
    (PlanKey::RelationName, "Relation Name", Discriminating),
    (PlanKey::Schema, "Schema", Discriminating),
    (PlanKey::Alias, "Alias", Discriminating),
    (PlanKey::FunctionName, "Function Name", Discriminating),
    (PlanKey::TableFunctionName, "Table Function Name", Discriminating),
    (PlanKey::CteName, "CTE Name", Discriminating),
    (PlanKey::TuplestoreName, "Tuplestore Name", Discriminating),
    (PlanKey::IndexName, "Index Name", Discriminating),
    (PlanKey::ScanDirection, "Scan Direction", Discriminating),
    (PlanKey::SamplingMethod, "Sampling Method", Discriminating),
    (PlanKey::SamplingParameters, "Sampling Parameters", Discriminating),
    (PlanKey::RepeatableSeed, "Repeatable Seed", Discriminating),
    (PlanKey::SubplansRemoved, "Subplans Removed", Discriminating),
    (PlanKey::JoinType, "Join Type", Discriminating),
    (PlanKey::InnerUnique, "Inner Unique", Discriminating),
    (PlanKey::HashCond, "Hash Cond", Discriminating),
    (PlanKey::MergeCond, "Merge Cond", Discriminating),
    (PlanKey::JoinFilter, "Join Filter", Discriminating),
    (PlanKey::Filter, "Filter", Discriminating),
    (PlanKey::IndexCond, "Index Cond", Discriminating),
    (PlanKey::RecheckCond, "Recheck Cond", Discriminating),
    (PlanKey::TidCond, "TID Cond", Discriminating),
    (PlanKey::OrderBy, "Order By", Discriminating),
    (PlanKey::OneTimeFilter, "One-Time Filter", Discriminating),
    (PlanKey::RunCondition, "Run Condition", Discriminating),
    (PlanKey::Window, "Window", Discriminating),
    (PlanKey::CacheKey, "Cache Key", Discriminating),
    (PlanKey::CacheMode, "Cache Mode", Discriminating),
    (PlanKey::SortKey, "Sort Key", Discriminating),
    (PlanKey::PresortedKey, "Presorted Key", Discriminating),
    (PlanKey::GroupKey, "Group Key", Discriminating),
    (PlanKey::GroupingSets, "Grouping Sets", Discriminating),
    (PlanKey::ParallelAware, "Parallel Aware", Discriminating),
    (PlanKey::AsyncCapable, "Async Capable", Discriminating),
    (PlanKey::WorkersPlanned, "Workers Planned", Discriminating),
    (PlanKey::SingleCopy, "Single Copy", Discriminating),
    (PlanKey::ConflictResolution, "Conflict Resolution", Discriminating),
    (PlanKey::ConflictArbiterIndexes, "Conflict Arbiter Indexes", Discriminating),
    (PlanKey::ConflictFilter, "Conflict Filter", Discriminating),
    (PlanKey::Output, "Output", Discriminating),
    (PlanKey::StartupCost, "Startup Cost", Volatile),
    (PlanKey::TotalCost, "Total Cost", Volatile),
    (PlanKey::PlanRows, "Plan Rows", Volatile),
    (PlanKey::PlanWidth, "Plan Width", Volatile),
    // Hashed aggregates (13+)
    (PlanKey::PlannedPartitions, "Planned Partitions", Volatile),
    // Memoize sizing (18+)
    (PlanKey::EstimatedCapacity, "Estimated Capacity", Volatile),
    (PlanKey::EstimatedDistinctLookupKeys, "Estimated Distinct Lookup Keys", Volatile),
    (PlanKey::EstimatedLookups, "Estimated Lookups", Volatile),
    (PlanKey::EstimatedHitPercent, "Estimated Hit Percent", Volatile),
];

impl PlanKey {
    /// Look up a key by its JSON name.
    pub fn from_name(name: &str) -> Option<PlanKey> {
        KNOWN
            .iter()
            .find(|(_, known, _)| *known == name)
            .map(|(key, _, _)| *key)
    }

    /// The JSON name PostgreSQL uses for this key.
    pub fn name(self) -> &'static str {
        KNOWN
            .iter()
            .find(|(key, _, _)| *key == self)
            .map(|(_, name, _)| *name)
            .unwrap_or_default()
    }

    pub fn kind(self) -> AttributeKind {
        KNOWN
            .iter()
            .find(|(key, _, _)| *key == self)
            .map(|(_, _, kind)| *kind)
            .unwrap_or(Discriminating)
    }

    /// All discriminating keys, in declaration order.
    pub fn discriminating() -> impl Iterator<Item = PlanKey> {
        KNOWN
            .iter()
            .filter(|(_, _, kind)| *kind == Discriminating)
            .map(|(key, _, _)| *key)
    }

    /// All volatile keys, in declaration order.
    pub fn volatile() -> impl Iterator<Item = PlanKey> {
        KNOWN
            .iter()
            .filter(|(_, _, kind)| *kind == Volatile)
            .map(|(key, _, _)| *key)
    }
}

/// Whether `name` is an attribute key, or the child link, that the comparator
/// understands.
pub fn is_known_key(name: &str) -> bool {
    name == CHILDREN_KEY || PlanKey::from_name(name).is_some()
}
