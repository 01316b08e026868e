//! Multi-entity consolidation.
//!
//! Produces one consolidated trial balance for a parent and its
//! subsidiaries:
//! - Aggregation by consolidation method and ownership
//! - Inter-company eliminations
//! - Minority (non-controlling) interest
//! - Summary totals and the balance identity
//!
//! Groups are configuration owned by a tenant. Generated data is derived
//! and recomputed on every request.

pub mod aggregator;
pub mod elimination;
pub mod engine;
pub mod error;
pub mod group;
pub mod minority;
pub mod store;
pub mod suggest;
pub mod summary;
pub mod types;
pub mod warning;


pub use aggregator::{Aggregate, AggregateBucket, SubsidiaryInput, aggregate};
pub use elimination::{EliminationTotals, apply_eliminations};
pub use engine::{ConsolidationEngine, ConsolidationService};
pub use error::{ConsolidationError, EliminationDefect, GroupDefect};
pub use group::SubsidiaryUpdate;
pub use minority::{carries_minority_interest, compute_minority_interests};
pub use store::{GroupStore, InMemoryGroupStore};
pub use suggest::suggest_eliminations;
pub use summary::{check_balance, summarize};
pub use types::{
    BalanceCheck, ConsolidatedData, ConsolidatedTrialBalanceItem, ConsolidationGroup,
    ConsolidationMethod, ConsolidationSummary, EliminationType, EntityContribution, GroupingRef,
    InterCompanyElimination, MinorityInterest, SubsidiaryConfig,
};
pub use warning::ConsolidationWarning;
