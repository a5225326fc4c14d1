//! Use cases: the agent reasoning loop and the team coordinator.

pub mod run_agent;
pub mod run_team;
pub(crate) mod shared;
#[cfg(test)]
pub(crate) mod test_support;
