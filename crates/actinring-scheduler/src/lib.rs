//! Path-stack DFS connectivity oracle for the actin-ring Monte Carlo sampler.
#![forbid(unsafe_code)]

mod dfs;

pub use dfs::DfsConnectivityOracle;
