//! Incremental grouping of plans into structural equivalence classes.

use crate::plan::{Plan, PlanResult};

/// One sample placed in a class.
#[derive(Debug, Clone)]
pub struct Member<K> {
    /// Where the sample sits in the sweep.
    pub key: K,
    pub plan: Plan,
}

/// Samples whose plans share one shape.
///
/// The first member is the representative every later plan is compared with.
/// A class is never empty.
#[derive(Debug, Clone)]
pub struct EquivalenceClass<K> {
    members: Vec<Member<K>>,
}

impl<K> EquivalenceClass<K> {
    fn new(key: K, plan: Plan) -> Self {
        Self {
            members: vec![Member { key, plan }],
        }
    }

    /// Key of the sample that founded the class.
    pub fn key(&self) -> &K {
        &self.members[0].key
    }

    pub fn representative(&self) -> &Plan {
        &self.members[0].plan
    }

    /// Members in insertion order, representative first.
    pub fn members(&self) -> &[Member<K>] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Ordered registry of equivalence classes.
///
/// Each incoming plan is compared against every representative in creation
/// order, so a call costs one comparison per existing class. Sweeps rarely
/// produce more than a handful of shapes.
#[derive(Debug, Clone)]
pub struct EquivalenceClasses<K> {
    classes: Vec<EquivalenceClass<K>>,
}

impl<K> Default for EquivalenceClasses<K> {
    fn default() -> Self {
        Self {
            classes: Vec::new(),
        }
    }
}

impl<K> EquivalenceClasses<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a plan in the first class whose representative has the same
    /// shape, or open a new class for it. Returns the class index.
    ///
    /// # Errors
    ///
    /// Propagates comparison errors (unknown plan attributes). The registry is
    /// left unchanged in that case.
    pub fn add(&mut self, key: K, plan: Plan) -> PlanResult<usize> {
        for (i, class) in self.classes.iter_mut().enumerate() {
            if plan.same_shape(class.representative())? {
                class.members.push(Member { key, plan });
                return Ok(i);
            }
        }

        self.classes.push(EquivalenceClass::new(key, plan));
        Ok(self.classes.len() - 1)
    }

    pub fn classes(&self) -> &[EquivalenceClass<K>] {
        &self.classes
    }

    pub fn into_classes(self) -> Vec<EquivalenceClass<K>> {
        self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
