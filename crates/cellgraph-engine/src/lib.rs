//! cellgraph_engine - dependency graph, formulas and recalculation order.

pub mod engine;
