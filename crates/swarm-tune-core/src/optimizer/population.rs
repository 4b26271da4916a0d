use crate::metrics::CostRecord;
use crate::params::{ParameterBounds, ParameterVector};
use rand::Rng;

/// Candidate vectors plus the costs known for a prefix of them.
///
/// Slots `0..records.len()` are evaluated; the rest are waiting for a
/// simulation run. After [`Population::rank`] the evaluated prefix is in
/// ascending cost order, so slot 0 holds the best vector.
#[derive(Clone, Debug, PartialEq)]
pub struct Population {
    members: Vec<ParameterVector>,
    records: Vec<CostRecord>,
}

impl Population {
    pub fn new(members: Vec<ParameterVector>) -> Self {
        Self {
            records: Vec::with_capacity(members.len()),
            members,
        }
    }

    /// Draw `size` independent vectors from `bounds`.
    pub fn sample<R: Rng + ?Sized>(size: usize, bounds: &ParameterBounds, rng: &mut R) -> Self {
        Self::new((0..size).map(|_| bounds.sample(rng)).collect())
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> &[ParameterVector] {
        &self.members
    }

    pub fn records(&self) -> &[CostRecord] {
        &self.records
    }

    /// Slots that still need a cost.
    pub fn unevaluated(&self) -> &[ParameterVector] {
        &self.members[self.records.len()..]
    }

    /// Append costs for the next unevaluated slots, in slot order.
    pub fn extend_records<I>(&mut self, records: I)
    where
        I: IntoIterator<Item = CostRecord>,
    {
        let room = self.members.len() - self.records.len();
        self.records.extend(records.into_iter().take(room));
    }

    /// Sort the evaluated slots by ascending total cost. Ties keep slot order.
    pub fn rank(&mut self) {
        let n = self.records.len();
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| self.records[a].total.total_cmp(&self.records[b].total));

        let members: Vec<ParameterVector> = order.iter().map(|&i| self.members[i]).collect();
        let records: Vec<CostRecord> = order.iter().map(|&i| self.records[i]).collect();
        self.members[..n].copy_from_slice(&members);
        self.records = records;
    }

    pub fn best(&self) -> Option<(&ParameterVector, &CostRecord)> {
        self.members.first().zip(self.records.first())
    }

    /// Keep the first `parents` slots, blend `children` offspring from
    /// consecutive parent pairs and resample every remaining slot.
    ///
    /// Offspring of pair `k` sit at `parents + k` and
    /// `parents + children / 2 + k`, each with its own blend factor.
    /// Only the parents keep their costs.
    pub fn breed<R: Rng + ?Sized>(
        &mut self,
        parents: usize,
        children: usize,
        bounds: &ParameterBounds,
        rng: &mut R,
    ) {
        let pairs = children / 2;
        let phis: Vec<f64> = (0..pairs * 2).map(|_| rng.random::<f64>()).collect();
        for (k, phi) in phis.into_iter().enumerate() {
            let pair = k % pairs;
            let child = self.members[2 * pair].blend(&self.members[2 * pair + 1], phi);
            self.members[parents + k] = child;
        }
        for slot in &mut self.members[parents + pairs * 2..] {
            *slot = bounds.sample(rng);
        }
        self.records.truncate(parents);
    }
}
