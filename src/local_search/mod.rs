//! Neighborhood operators for improving tour plans.
//!
//! - [`two_opt_move`] — Intra-route reconnection of two random 2-node sections
//! - [`cross_exchange`] — Inter-route exchange of depot-free sub-chains
//! - [`lambda_interchange`] — Inter-route λ=1 edge interchange at matching positions
//! - [`SequentialInsertion`] — Placement of outliers and relocation of customers
//!
//! Every operator builds its candidates on copies, checks all constraints,
//! and only then consults the savings oracle.

mod cross_exchange;
mod lambda_interchange;
mod neighborhood;
mod sections;
mod sequential_insertion;
mod two_opt;

pub use cross_exchange::cross_exchange;
pub use lambda_interchange::{interior_edge_starts, lambda_interchange};
pub use neighborhood::{AcceptancePolicy, MoveOutcome, Neighborhood, NeighborhoodMove, Selection};
pub use sections::{random_tour_section, random_tour_sections, SamplingBudget};
pub use sequential_insertion::{
    sequential_insertion, InsertionOutcome, RelocationLedger, SequentialInsertion,
};
pub use two_opt::two_opt_move;
