//! Integration test suite for Vesta.
//!
//! Scenario tests drive a complete escrow over in-memory collaborators and
//! check lock records, the aggregate curve and reward payouts against values
//! computed independently in the tests.

pub mod helpers;
