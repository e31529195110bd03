//! Dense storage of situation instances, indexed by graph ordinal.

use serde::Serialize;

use twin_core::SituationInstance;
use twin_graph::SituationGraph;

#[derive(Debug, Clone, Serialize)]
pub struct InstanceArena {
    instances: Vec<SituationInstance>,
}

impl InstanceArena {
    /// One fresh instance per node, in ordinal order.
    pub fn from_graph(graph: &SituationGraph, default_threshold: f64) -> Self {
        let instances = graph
            .nodes()
            .iter()
            .map(|node| node.instance(default_threshold))
            .collect();
        Self { instances }
    }

    pub fn get(&self, ordinal: usize) -> Option<&SituationInstance> {
        self.instances.get(ordinal)
    }

    pub fn get_mut(&mut self, ordinal: usize) -> Option<&mut SituationInstance> {
        self.instances.get_mut(ordinal)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SituationInstance> {
        self.instances.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut SituationInstance> {
        self.instances.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn reset(&mut self) {
        self.instances.iter_mut().for_each(SituationInstance::reset);
    }
}
