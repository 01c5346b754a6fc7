//! Per-category step dependency graph
//!
//! Edges run from a dependency to the step that needs it, so a topological
//! order is a valid order to complete the workflow in.

use crate::category::WorkflowCategory;
use crate::error::CatalogError;
use crate::step::StepDefinition;
use petgraph::algo::{is_cyclic_directed, tarjan_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Dfs, Reversed};
use petgraph::Direction;
use std::collections::HashMap;

/// Validated dependency DAG of one category
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    graph: DiGraph<String, ()>,
    index: HashMap<String, NodeIndex>,
    topo_order: Vec<String>,
}

impl DependencyGraph {
    /// Build and validate the graph for `steps`
    ///
    /// # Errors
    ///
    /// - [`CatalogError::EmptyStepId`] / [`CatalogError::DuplicateStep`] for bad ids
    /// - [`CatalogError::SelfDependency`] if a step lists itself
    /// - [`CatalogError::UnknownDependency`] for dangling references
    /// - [`CatalogError::DependencyCycle`] if the dependencies form a cycle
    pub fn build(
        category: WorkflowCategory,
        steps: &[StepDefinition],
    ) -> Result<Self, CatalogError> {
        let mut graph = DiGraph::with_capacity(steps.len(), steps.len());
        let mut index = HashMap::with_capacity(steps.len());

        // Node indices follow catalog order
        for step in steps {
            if step.id.trim().is_empty() {
                return Err(CatalogError::EmptyStepId(category));
            }
            if index.contains_key(&step.id) {
                return Err(CatalogError::DuplicateStep {
                    category,
                    step: step.id.clone(),
                });
            }
            let node = graph.add_node(step.id.clone());
            index.insert(step.id.clone(), node);
        }

        for step in steps {
            let to = index[&step.id];
            for dependency in &step.dependencies {
                if dependency == &step.id {
                    return Err(CatalogError::SelfDependency {
                        category,
                        step: step.id.clone(),
                    });
                }
                let from = *index.get(dependency).ok_or_else(|| CatalogError::UnknownDependency {
                    category,
                    step: step.id.clone(),
                    dependency: dependency.clone(),
                })?;
                graph.update_edge(from, to, ());
            }
        }

        if is_cyclic_directed(&graph) {
            let mut members: Vec<NodeIndex> = tarjan_scc(&graph)
                .into_iter()
                .filter(|scc| scc.len() > 1)
                .flatten()
                .collect();
            members.sort();
            return Err(CatalogError::DependencyCycle {
                category,
                steps: members.into_iter().map(|n| graph[n].clone()).collect(),
            });
        }

        let topo_order = toposort(&graph, None)
            .map_err(|cycle| CatalogError::DependencyCycle {
                category,
                steps: vec![graph[cycle.node_id()].clone()],
            })?
            .into_iter()
            .map(|n| graph[n].clone())
            .collect();

        Ok(Self {
            graph,
            index,
            topo_order,
        })
    }

    /// Step ids in an order that satisfies every dependency
    #[must_use]
    pub fn topological_order(&self) -> &[String] {
        &self.topo_order
    }

    /// Steps without dependencies, in catalog order
    #[must_use]
    pub fn entry_steps(&self) -> Vec<&str> {
        self.graph
            .node_indices()
            .filter(|n| {
                self.graph
                    .neighbors_directed(*n, Direction::Incoming)
                    .next()
                    .is_none()
            })
            .map(|n| self.graph[n].as_str())
            .collect()
    }

    /// Steps that list `step_id` as a direct dependency, in catalog order
    #[must_use]
    pub fn dependents(&self, step_id: &str) -> Vec<&str> {
        let Some(&node) = self.index.get(step_id) else {
            return Vec::new();
        };
        let mut nodes: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(node, Direction::Outgoing)
            .collect();
        nodes.sort();
        nodes.into_iter().map(|n| self.graph[n].as_str()).collect()
    }

    /// Every step `step_id` depends on, directly or transitively, in catalog order
    #[must_use]
    pub fn transitive_dependencies(&self, step_id: &str) -> Vec<&str> {
        let Some(&start) = self.index.get(step_id) else {
            return Vec::new();
        };
        let reversed = Reversed(&self.graph);
        let mut dfs = Dfs::new(reversed, start);
        let mut nodes = Vec::new();
        while let Some(n) = dfs.next(reversed) {
            if n != start {
                nodes.push(n);
            }
        }
        nodes.sort();
        nodes.into_iter().map(|n| self.graph[n].as_str()).collect()
    }

    /// Check if the graph contains `step_id`
    #[inline]
    #[must_use]
    pub fn contains(&self, step_id: &str) -> bool {
        self.index.contains_key(step_id)
    }

    /// Number of steps
    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of dependency edges
    #[inline]
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}
