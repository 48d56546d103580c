//! # Scenario tests that require a look inside the crate.
//!
//! * `schedule`: pricing problems on a graph with a day-off and a working node per day.
//! * `rostering`: a small rostering problem driven through column generation by hand, with a
//!   mocked linear program solver.
