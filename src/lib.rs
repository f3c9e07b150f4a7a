//! Team optimizer for roster-based champion games: picks the fixed-size team with
//! the best combination of power, pairwise synergies and category diversity.

pub mod cli;
pub mod data;
pub mod host;
pub mod logging;
pub mod optimizer;
pub mod session;
