//! Policy bindings lent to a generation by the optimizer.

use dino_evolve_core::Policy;

use crate::GenerationError;

/// Anything that can lend a policy and a fitness handle to a generation.
pub trait Candidate {
    /// Policy consulted every tick while the agent is alive.
    fn policy(&mut self) -> &mut dyn Policy;

    /// Fitness accumulator written in place during the generation.
    fn fitness_mut(&mut self) -> &mut f32;
}

/// Candidate borrowing optimizer-owned data for the duration of a generation.
pub struct CohortMember<'a> {
    policy: &'a mut dyn Policy,
    fitness: &'a mut f32,
}

impl<'a> CohortMember<'a> {
    /// Pairs a policy with the fitness handle it reports into.
    pub fn new(policy: &'a mut dyn Policy, fitness: &'a mut f32) -> Self {
        Self { policy, fitness }
    }
}

impl std::fmt::Debug for CohortMember<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CohortMember")
            .field("fitness", &self.fitness)
            .finish_non_exhaustive()
    }
}

impl Candidate for CohortMember<'_> {
    fn policy(&mut self) -> &mut dyn Policy {
        &mut *self.policy
    }

    fn fitness_mut(&mut self) -> &mut f32 {
        &mut *self.fitness
    }
}

/// Ordered set of candidates taking part in one generation.
///
/// Member `i` controls the agent with identifier `i`.
#[derive(Clone, Debug, PartialEq)]
pub struct Cohort<C> {
    members: Vec<C>,
}

impl<C> Cohort<C> {
    /// Wraps already assembled candidates.
    #[must_use]
    pub fn new(members: Vec<C>) -> Self {
        Self { members }
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Reports whether the cohort has no member.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Iterator over the members in binding order.
    pub fn iter(&self) -> impl Iterator<Item = &C> {
        self.members.iter()
    }

    /// Mutable iterator over the members in binding order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut C> {
        self.members.iter_mut()
    }

    /// Consumes the cohort, yielding its members in binding order.
    #[must_use]
    pub fn into_members(self) -> Vec<C> {
        self.members
    }

    pub(crate) fn member_mut(&mut self, index: usize) -> Option<&mut C> {
        self.members.get_mut(index)
    }
}

impl<'a> Cohort<CohortMember<'a>> {
    /// Zips parallel policy and fitness handle lists into a cohort.
    pub fn from_parts(
        policies: Vec<&'a mut dyn Policy>,
        fitness: Vec<&'a mut f32>,
    ) -> Result<Self, GenerationError> {
        if policies.len() != fitness.len() {
            return Err(GenerationError::CohortMismatch {
                policies: policies.len(),
                handles: fitness.len(),
            });
        }

        Ok(policies
            .into_iter()
            .zip(fitness)
            .map(|(policy, fitness)| CohortMember::new(policy, fitness))
            .collect())
    }
}

impl<C> FromIterator<C> for Cohort<C> {
    fn from_iter<I: IntoIterator<Item = C>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<C> IntoIterator for Cohort<C> {
    type Item = C;
    type IntoIter = std::vec::IntoIter<C>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.into_iter()
    }
}
