use std::cmp::Reverse;
use std::fmt;
use std::hash::Hash;
use std::time::Instant;

use fxhash::FxHashMap;
use priority_queue::PriorityQueue;

mod burrow;
mod config;
mod corridor;
mod error;
mod slot;
mod token;

pub use burrow::{Configuration, Location, Move, UNFOLDED_ROWS};
pub use config::{Settings, SolverConfig, SolverConfigBuilder};
pub use corridor::Corridor;
pub use error::{IllegalMove, ParseError, SearchError};
pub use slot::Slot;
pub use token::{Kind, Token};

/// A node in the search graph.
///
/// `G` is read-only context shared by every state, `S` labels the step
/// that leads from one state to the next.
pub trait State<G, S>: Clone + Eq + Hash {
    /// Successors as `(step cost, step, state)`. Costs must not be negative.
    fn next_states(&self, global: &G) -> Option<Vec<(i64, S, Self)>>
    where
        Self: Sized;

    /// Lower bound on the remaining cost. Return 0 for a plain uniform cost search.
    fn heuristic(&self, global: &G) -> i64;

    fn is_valid(&self, global: &G) -> bool;
    fn is_solved(&self, global: &G) -> bool;

    fn stringify(&self, global: &G) -> String;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Progress {
    Running,
    Solved,
    Exhausted,
    OutOfBudget,
}

#[derive(Debug)]
struct Visit<L, S> {
    cost: i64,
    parent: Option<(L, S)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Solution<L, S> {
    pub cost: i64,
    pub state: L,
    pub steps: Vec<S>,
    pub states_checked: usize,
}

/// Best first search: always expands the cheapest known state next, so the
/// first solved state popped is an optimal one.
#[derive(Debug)]
pub struct Solver<G, L, S>
where
    L: State<G, S>,
{
    global: G,
    initial: L,
    config: SolverConfig,
    to_check: PriorityQueue<L, Reverse<i64>>,
    visited: FxHashMap<L, Visit<L, S>>,
    solution: Option<L>,
    progress: Progress,
    states_checked: usize,
    time_spent: f32,
}

impl<G, L, S> Solver<G, L, S>
where
    L: State<G, S>,
    S: Clone,
{
    pub fn new(global: G, initial: L) -> Solver<G, L, S> {
        let mut to_check = PriorityQueue::new();
        to_check.push(initial.clone(), Reverse(initial.heuristic(&global)));

        let mut visited = FxHashMap::default();
        visited.insert(
            initial.clone(),
            Visit {
                cost: 0,
                parent: None,
            },
        );

        Solver {
            global,
            initial,
            config: SolverConfig::default(),
            to_check,
            visited,
            solution: None,
            progress: Progress::Running,
            states_checked: 0,
            time_spent: 0.0,
        }
    }

    pub fn set_config(&mut self, config: SolverConfig) -> &mut Self {
        self.config = config;
        self
    }

    pub fn states_checked(&self) -> usize {
        self.states_checked
    }

    pub fn time_spent(&self) -> f32 {
        self.time_spent
    }

    pub fn get_solution(&self) -> Option<L> {
        self.solution.clone()
    }

    pub fn solution_cost(&self) -> Option<i64> {
        self.solution
            .as_ref()
            .and_then(|state| self.visited.get(state))
            .map(|visit| visit.cost)
    }

    pub fn stringify(&self, state: &L) -> String {
        state.stringify(&self.global)
    }

    /// Steps leading from `initial` to `solved`, following the cheapest known parents.
    pub fn path(&self, initial: &L, solved: &L) -> Option<Vec<S>> {
        let mut steps = Vec::new();
        let mut current = solved;

        while current != initial {
            let (parent, step) = self.visited.get(current)?.parent.as_ref()?;
            steps.push(step.clone());
            current = parent;
        }

        steps.reverse();
        Some(steps)
    }

    fn over_budget(&self, start: &Instant) -> bool {
        if let Some(max_states) = self.config.max_states {
            if self.states_checked >= max_states {
                return true;
            }
        }
        if let Some(max_seconds) = self.config.max_seconds {
            if self.time_spent + start.elapsed().as_secs_f32() >= max_seconds {
                return true;
            }
        }
        false
    }

    fn step(&mut self, start: &Instant) -> Option<L> {
        if self.over_budget(start) {
            self.progress = Progress::OutOfBudget;
            return None;
        }

        let Some((current, _)) = self.to_check.pop() else {
            self.progress = Progress::Exhausted;
            return None;
        };
        self.states_checked += 1;

        let cost = self.visited.get(&current).map_or(0, |visit| visit.cost);

        if current.is_solved(&self.global) {
            tracing::info!(
                "solved at cost {cost} after {} states",
                self.states_checked
            );
            self.progress = Progress::Solved;
            self.solution = Some(current.clone());
            return Some(current);
        }

        // Dead ends are simply dropped
        for (step_cost, step, next_state) in current
            .next_states(&self.global)
            .into_iter()
            .flatten()
        {
            debug_assert!(step_cost >= 0, "negative step cost {step_cost}");
            if !next_state.is_valid(&self.global) {
                continue;
            }

            // Only keep a layout if this is the cheapest way to reach it so far
            let next_cost = cost + step_cost;
            if let Some(visit) = self.visited.get(&next_state) {
                if visit.cost <= next_cost {
                    continue;
                }
            }

            let priority = next_cost + next_state.heuristic(&self.global);
            self.visited.insert(
                next_state.clone(),
                Visit {
                    cost: next_cost,
                    parent: Some((current.clone(), step)),
                },
            );
            self.to_check.push(next_state, Reverse(priority));
        }

        Some(current)
    }
}

impl<G, L, S> Solver<G, L, S>
where
    L: State<G, S> + fmt::Debug,
    S: Clone,
{
    /// Run until the first solution, the frontier runs dry, or the budget is spent.
    pub fn solve(&mut self) -> Result<Solution<L, S>, SearchError> {
        for _ in self.by_ref() {}

        match self.progress {
            Progress::Solved => {
                let (state, cost) = match (self.get_solution(), self.solution_cost()) {
                    (Some(state), Some(cost)) => (state, cost),
                    _ => unreachable!("solved without a solution"),
                };
                let steps = self.path(&self.initial, &state).unwrap_or_default();

                Ok(Solution {
                    cost,
                    state,
                    steps,
                    states_checked: self.states_checked,
                })
            }
            Progress::OutOfBudget => Err(SearchError::BudgetExceeded {
                states: self.states_checked,
                seconds: self.time_spent,
            }),
            Progress::Exhausted => Err(SearchError::Unsolvable {
                states: self.states_checked,
            }),
            Progress::Running => unreachable!("search stopped while still running"),
        }
    }
}

// Yields every state as it is checked, the solution (if any) last
impl<G, L, S> Iterator for Solver<G, L, S>
where
    L: State<G, S> + fmt::Debug,
    S: Clone,
{
    type Item = L;

    fn next(&mut self) -> Option<Self::Item> {
        if self.progress != Progress::Running {
            return None;
        }

        let start = Instant::now();
        let state = self.step(&start);
        self.time_spent += start.elapsed().as_secs_f32();

        let interval = self.config.progress_interval;
        if let Some(state) = state.as_ref() {
            if interval != 0 && self.states_checked % interval == 0 {
                tracing::debug!("{}, state:\n{}", self, self.stringify(state));
            }
        }

        state
    }
}

impl<G, L, S> fmt::Display for Solver<G, L, S>
where
    L: State<G, S>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Solver<checked={}, queued={}, seen={}, time={:.3}s>",
            self.states_checked,
            self.to_check.len(),
            self.visited.len(),
            self.time_spent
        )
    }
}

#[cfg(test)]
mod test_solver {
    use super::*;

    // A small weighted graph; node 3 is the goal, node 5 a dead end
    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    struct Node(u32);

    struct Graph {
        edges: Vec<(u32, u32, i64)>,
        goal: Option<u32>,
    }

    impl State<Graph, (u32, u32)> for Node {
        fn next_states(&self, graph: &Graph) -> Option<Vec<(i64, (u32, u32), Node)>> {
            let next_states = graph
                .edges
                .iter()
                .filter(|(from, _, _)| *from == self.0)
                .map(|(from, to, cost)| (*cost, (*from, *to), Node(*to)))
                .collect::<Vec<_>>();

            if next_states.is_empty() {
                None
            } else {
                Some(next_states)
            }
        }

        fn heuristic(&self, _graph: &Graph) -> i64 {
            0
        }

        fn is_valid(&self, _graph: &Graph) -> bool {
            true
        }

        fn is_solved(&self, graph: &Graph) -> bool {
            graph.goal == Some(self.0)
        }

        fn stringify(&self, _graph: &Graph) -> String {
            format!("node {}", self.0)
        }
    }

    fn diamond() -> Graph {
        Graph {
            edges: vec![(0, 1, 1), (1, 3, 10), (0, 2, 3), (2, 3, 3), (0, 5, 0), (3, 0, 0)],
            goal: Some(3),
        }
    }

    #[test]
    fn test_cheapest_path_wins() {
        let mut solver = Solver::new(diamond(), Node(0));
        let solution = solver.solve().unwrap();

        assert_eq!(solution.cost, 6);
        assert_eq!(solution.state, Node(3));
        assert_eq!(solution.steps, vec![(0, 2), (2, 3)]);
        assert_eq!(solver.path(&Node(0), &Node(3)), Some(vec![(0, 2), (2, 3)]));
    }

    #[test]
    fn test_iterator_stops_after_solution() {
        let mut solver = Solver::new(diamond(), Node(0));
        let checked = solver.by_ref().collect::<Vec<_>>();

        assert_eq!(checked.last(), Some(&Node(3)));
        assert_eq!(solver.get_solution(), Some(Node(3)));
        assert_eq!(solver.solution_cost(), Some(6));
        assert_eq!(solver.next(), None);
        assert_eq!(solver.states_checked(), checked.len());
    }

    #[test]
    fn test_each_state_checked_once() {
        // Two ways into node 2, the cheaper one found second
        let graph = Graph {
            edges: vec![(0, 2, 5), (0, 1, 1), (1, 2, 1), (2, 3, 1)],
            goal: Some(3),
        };

        let mut solver = Solver::new(graph, Node(0));
        let checked = solver.by_ref().collect::<Vec<_>>();

        assert_eq!(checked, vec![Node(0), Node(1), Node(2), Node(3)]);
        assert_eq!(solver.solution_cost(), Some(3));
    }

    #[test]
    fn test_unsolvable() {
        let graph = Graph {
            edges: vec![(0, 1, 1), (1, 0, 1)],
            goal: None,
        };

        let mut solver = Solver::new(graph, Node(0));
        assert_eq!(solver.solve(), Err(SearchError::Unsolvable { states: 2 }));
        assert_eq!(solver.get_solution(), None);
    }

    #[test]
    fn test_budget_exceeded() {
        // An endless chain
        let graph = Graph {
            edges: (0..1000).map(|n| (n, n + 1, 1)).collect(),
            goal: None,
        };

        let mut solver = Solver::new(graph, Node(0));
        solver.set_config(
            SolverConfigBuilder::default()
                .max_states(50)
                .build()
                .unwrap(),
        );

        assert!(matches!(
            solver.solve(),
            Err(SearchError::BudgetExceeded { states: 50, .. })
        ));
    }

    #[test]
    fn test_time_budget_exceeded() {
        let graph = Graph {
            edges: (0..1000).map(|n| (n, n + 1, 1)).collect(),
            goal: None,
        };

        let mut solver = Solver::new(graph, Node(0));
        solver.set_config(
            SolverConfigBuilder::default()
                .max_seconds(0.0)
                .build()
                .unwrap(),
        );

        assert!(matches!(
            solver.solve(),
            Err(SearchError::BudgetExceeded { states: 0, .. })
        ));
        assert_eq!(solver.next(), None);
    }

    #[test]
    fn test_display() {
        let solver = Solver::new(diamond(), Node(0));
        assert_eq!(
            solver.to_string(),
            "Solver<checked=0, queued=1, seen=1, time=0.000s>"
        );
        assert_eq!(solver.stringify(&Node(2)), "node 2");
    }
}
