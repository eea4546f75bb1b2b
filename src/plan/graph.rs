// src/plan/graph.rs

use petgraph::algo::has_path_connecting;
use petgraph::graphmap::DiGraphMap;

use super::Step;
use crate::errors::{PipelineError, Result};
use crate::task::TaskId;

/// Build the precedence graph of a composition.
///
/// Edge direction: earlier -> later. In a series every task of one child
/// gets an edge to every task of the next child; parallel children get no
/// edges between them. Returns all tasks of `step`.
fn add_step(graph: &mut DiGraphMap<TaskId, ()>, step: &Step) -> Result<Vec<TaskId>> {
    match step {
        Step::Task(id) => {
            if graph.contains_node(*id) {
                return Err(PipelineError::PlanOrder(format!(
                    "task '{id}' appears more than once"
                )));
            }
            graph.add_node(*id);
            Ok(vec![*id])
        }
        Step::Parallel(children) => {
            let mut all = Vec::new();
            for child in children {
                all.extend(add_step(graph, child)?);
            }
            Ok(all)
        }
        Step::Series(children) => {
            let mut all: Vec<TaskId> = Vec::new();
            let mut previous: Vec<TaskId> = Vec::new();
            for child in children {
                let current = add_step(graph, child)?;
                for &before in &previous {
                    for &after in &current {
                        graph.add_edge(before, after, ());
                    }
                }
                all.extend(current.iter().copied());
                previous = current;
            }
            Ok(all)
        }
    }
}

/// Check that a composition respects its tasks' declared artifacts.
///
/// Rejects the composition when:
/// - a task reads an artifact that some task in the same composition writes,
///   but not every such writer is ordered before the reader
/// - a task writes an artifact that a clean in the same composition deletes,
///   but the clean is not ordered before the writer
///
/// Artifacts no task in the composition writes are assumed to be on disk.
pub fn validate_step(step: &Step) -> Result<()> {
    let mut graph: DiGraphMap<TaskId, ()> = DiGraphMap::new();
    let tasks = add_step(&mut graph, step)?;

    let precedes = |a: TaskId, b: TaskId| has_path_connecting(&graph, a, b, None);

    for &reader in &tasks {
        for artifact in reader.inputs() {
            for &writer in tasks.iter().filter(|t| t.outputs().contains(&artifact)) {
                if writer != reader && !precedes(writer, reader) {
                    return Err(PipelineError::PlanOrder(format!(
                        "'{reader}' reads {artifact:?} but '{writer}', which writes it, is not ordered before it"
                    )));
                }
            }
        }
    }

    for &clean in &tasks {
        for artifact in clean.clears() {
            for &writer in tasks.iter().filter(|t| t.outputs().contains(&artifact)) {
                if !precedes(clean, writer) {
                    return Err(PipelineError::PlanOrder(format!(
                        "'{writer}' writes {artifact:?} but is not ordered after '{clean}', which clears it"
                    )));
                }
            }
        }
    }

    Ok(())
}
