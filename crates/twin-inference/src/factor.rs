//! Dense potentials over binary variables.
//!
//! A factor's scope is kept sorted. Entry `i` assigns `vars[k]` to bit `k`
//! of `i`.

use serde::Serialize;

use crate::network::CausalNetwork;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Factor {
    vars: Vec<usize>,
    values: Vec<f64>,
}

impl Factor {
    /// All-ones factor over `vars`.
    pub fn unit(mut vars: Vec<usize>) -> Self {
        vars.sort_unstable();
        vars.dedup();
        let values = vec![1.0; 1 << vars.len()];
        Self { vars, values }
    }

    /// `P(node | parents)` as a factor over the node's family.
    pub fn family(network: &CausalNetwork, node: usize) -> Self {
        let parents = network.parents(node);
        let mut vars = parents.to_vec();
        vars.push(node);
        let mut factor = Self::unit(vars);

        let node_pos = factor.position(node);
        let parent_pos: Vec<Option<usize>> = parents.iter().map(|p| factor.position(*p)).collect();
        for (index, value) in factor.values.iter_mut().enumerate() {
            let child_on = node_pos.is_some_and(|p| index >> p & 1 == 1);
            let assignment = parent_pos
                .iter()
                .enumerate()
                .filter(|(_, pos)| pos.is_some_and(|p| index >> p & 1 == 1))
                .fold(0, |acc, (bit, _)| acc | 1 << bit);
            *value = network.probability(node, child_on, assignment);
        }
        factor
    }

    pub fn vars(&self) -> &[usize] {
        &self.vars
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }

    fn position(&self, var: usize) -> Option<usize> {
        self.vars.binary_search(&var).ok()
    }

    /// Pointwise product over the union of both scopes.
    pub fn product(&self, other: &Factor) -> Factor {
        let mut vars = self.vars.clone();
        vars.extend_from_slice(&other.vars);
        let mut result = Self::unit(vars);

        let left = result.positions_of(&self.vars);
        let right = result.positions_of(&other.vars);
        for (index, value) in result.values.iter_mut().enumerate() {
            *value = self.values[project(index, &left)] * other.values[project(index, &right)];
        }
        result
    }

    /// Sum out every variable not in `keep`.
    pub fn marginalize(&self, keep: &[usize]) -> Factor {
        let kept: Vec<usize> = keep
            .iter()
            .copied()
            .filter(|v| self.position(*v).is_some())
            .collect();
        let mut result = Self::unit(kept);
        result.values.iter_mut().for_each(|v| *v = 0.0);

        let positions = self.positions_of(&result.vars);
        for (index, value) in self.values.iter().enumerate() {
            result.values[project(index, &positions)] += value;
        }
        result
    }

    /// Zero every entry inconsistent with `var = value`.
    pub fn observe(&mut self, var: usize, value: bool) {
        let Some(pos) = self.position(var) else {
            return;
        };
        for (index, entry) in self.values.iter_mut().enumerate() {
            if (index >> pos & 1 == 1) != value {
                *entry = 0.0;
            }
        }
    }

    /// Scale to unit mass. A zero factor is left untouched.
    pub fn normalize(&mut self) {
        let total = self.total();
        if total > 0.0 && total.is_finite() {
            self.values.iter_mut().for_each(|v| *v /= total);
        }
    }

    fn positions_of(&self, vars: &[usize]) -> Vec<usize> {
        vars.iter().filter_map(|v| self.position(*v)).collect()
    }
}

/// Re-index `index` onto the sub-scope whose bit `k` lives at `positions[k]`.
fn project(index: usize, positions: &[usize]) -> usize {
    positions
        .iter()
        .enumerate()
        .fold(0, |acc, (k, &p)| acc | ((index >> p & 1) << k))
}
