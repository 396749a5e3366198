//! Dependency graph builder
//!
//! Resources are declared one at a time, then [`GraphBuilder::build`] derives
//! the edges from deferred references and `depends_on`, and orders the nodes
//! so that every resource comes after everything it depends on.

use crate::error::{EngineError, Result};
use stackflow_core::{OutputRef, ResourceNode, Stack};
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use tracing::debug;

#[derive(Debug, Default)]
pub struct GraphBuilder {
    nodes: Vec<ResourceNode>,
    index: HashMap<String, usize>,
    exports: BTreeMap<String, OutputRef>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder holding every resource and output of a parsed stack
    pub fn from_stack(stack: Stack) -> Result<Self> {
        let mut builder = Self::new();
        for resource in stack.resources {
            builder.add_node(resource)?;
        }
        for (name, reference) in stack.outputs {
            builder.export(name, reference)?;
        }
        Ok(builder)
    }

    /// Declare a resource. On error the builder is left unchanged.
    pub fn add_node(&mut self, node: ResourceNode) -> Result<()> {
        if self.index.contains_key(node.name()) {
            return Err(EngineError::DuplicateName(node.name().to_string()));
        }
        if node.dependencies().contains(node.name()) {
            return Err(EngineError::SelfReference(node.name().to_string()));
        }

        debug!(
            resource = node.name(),
            kind = node.kind(),
            mode = %node.mode(),
            "Declared resource"
        );
        self.index.insert(node.name().to_string(), self.nodes.len());
        self.nodes.push(node);
        Ok(())
    }

    /// Declare a stack output resolved once `reference` is available
    pub fn export(&mut self, name: impl Into<String>, reference: OutputRef) -> Result<()> {
        let name = name.into();
        if self.exports.contains_key(&name) {
            return Err(EngineError::DuplicateExport(name));
        }
        self.exports.insert(name, reference);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&ResourceNode> {
        self.index.get(name).map(|&i| &self.nodes[i])
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Validate references and produce the evaluation order.
    ///
    /// Kahn's algorithm; among resources that are ready at the same time the
    /// one declared first goes first.
    pub fn build(self) -> Result<EvaluationOrder> {
        let deps = self.resolve_edges()?;
        let count = self.nodes.len();

        let mut pending: Vec<usize> = deps.iter().map(Vec::len).collect();
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); count];
        for (node, node_deps) in deps.iter().enumerate() {
            for &dep in node_deps {
                dependents[dep].push(node);
            }
        }

        let mut ready: BTreeSet<usize> = (0..count).filter(|&i| pending[i] == 0).collect();
        let mut order = Vec::with_capacity(count);
        while let Some(node) = ready.pop_first() {
            order.push(node);
            for &dependent in &dependents[node] {
                pending[dependent] -= 1;
                if pending[dependent] == 0 {
                    ready.insert(dependent);
                }
            }
        }

        if order.len() < count {
            let cycle = find_cycle(&deps, &pending);
            return Err(EngineError::CycleDetected(
                cycle
                    .into_iter()
                    .map(|i| self.nodes[i].name().to_string())
                    .collect(),
            ));
        }

        let mut requested: HashMap<String, BTreeSet<String>> = HashMap::new();
        for reference in self
            .nodes
            .iter()
            .flat_map(ResourceNode::references)
            .chain(self.exports.values())
        {
            requested
                .entry(reference.node.clone())
                .or_default()
                .insert(reference.field.clone());
        }

        debug!(
            resources = count,
            edges = deps.iter().map(Vec::len).sum::<usize>(),
            exports = self.exports.len(),
            "Built evaluation order"
        );

        let mut slots: Vec<Option<ResourceNode>> = self.nodes.into_iter().map(Some).collect();
        let nodes = order.into_iter().filter_map(|i| slots[i].take()).collect();

        Ok(EvaluationOrder {
            nodes,
            requested,
            exports: self.exports,
        })
    }

    /// Dependency indices per node, rejecting references to undeclared resources
    fn resolve_edges(&self) -> Result<Vec<Vec<usize>>> {
        let mut deps = Vec::with_capacity(self.nodes.len());
        for node in &self.nodes {
            let mut node_deps = Vec::new();
            for dep in node.dependencies() {
                let &index = self
                    .index
                    .get(dep)
                    .ok_or_else(|| EngineError::UnknownReference {
                        node: node.name().to_string(),
                        target: dep.to_string(),
                    })?;
                node_deps.push(index);
            }
            node_deps.sort_unstable();
            deps.push(node_deps);
        }

        for (name, reference) in &self.exports {
            if !self.index.contains_key(&reference.node) {
                return Err(EngineError::UnknownReference {
                    node: format!("output {}", name),
                    target: reference.node.clone(),
                });
            }
        }

        Ok(deps)
    }
}

/// One cycle among the nodes Kahn's algorithm could not emit.
///
/// Every such node still waits on another such node, so following the first
/// unfinished dependency from any of them must revisit a node.
fn find_cycle(deps: &[Vec<usize>], pending: &[usize]) -> Vec<usize> {
    let Some(start) = (0..pending.len()).find(|&i| pending[i] > 0) else {
        return Vec::new();
    };

    let mut path = Vec::new();
    let mut position: HashMap<usize, usize> = HashMap::new();
    let mut current = start;
    loop {
        if let Some(&at) = position.get(&current) {
            return path.split_off(at);
        }
        position.insert(current, path.len());
        path.push(current);
        match deps[current].iter().find(|&&d| pending[d] > 0) {
            Some(&next) => current = next,
            None => return path,
        }
    }
}

/// Resources in dependency order.
///
/// Consumed once by the evaluator; build the graph again to re-run it.
#[derive(Debug)]
pub struct EvaluationOrder {
    pub(crate) nodes: VecDeque<ResourceNode>,
    pub(crate) requested: HashMap<String, BTreeSet<String>>,
    pub(crate) exports: BTreeMap<String, OutputRef>,
}

impl EvaluationOrder {
    /// Names of the resources not yet taken, in order
    pub fn names(&self) -> Vec<&str> {
        self.nodes.iter().map(ResourceNode::name).collect()
    }

    /// Output fields of `node` that other resources or stack outputs read
    pub fn requested_outputs(&self, node: &str) -> Vec<String> {
        self.requested
            .get(node)
            .map(|fields| fields.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn exports(&self) -> &BTreeMap<String, OutputRef> {
        &self.exports
    }
}

impl Iterator for EvaluationOrder {
    type Item = ResourceNode;

    fn next(&mut self) -> Option<Self::Item> {
        self.nodes.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.nodes.len(), Some(self.nodes.len()))
    }
}

impl ExactSizeIterator for EvaluationOrder {}
