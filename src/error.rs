//! # Error reporting
//!
//! One error enum per subsystem. Misuse of a model (mixing handles of two models, adding a
//! constraint that can never hold, stranding a group without columns) is reported through these
//! types instead of terminating the process; the caller decides whether it is fatal.
//!
//! Algorithmic infeasibility of the Lagrangian pricing heuristic is *not* an error, it is
//! communicated through an empty solution list.
use thiserror::Error;

/// Problems with the structure of a `SortedDag`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DagError {
    /// Edges may only go from a lower to a higher node index.
    #[error("graph needs to be topologically sorted: edge {from} -> {to}")]
    NotTopological {
        /// Tail of the edge.
        from: usize,
        /// Head of the edge.
        to: usize,
    },
    /// A node index does not exist in the graph.
    #[error("node {index} is out of range for a graph with {len} nodes")]
    NodeOutOfRange {
        /// The requested node.
        index: usize,
        /// Number of nodes in the graph.
        len: usize,
    },
    /// The sink can't be reached from the source.
    #[error("there is no path from the first to the last node")]
    NoPath,
}

/// Errors of the exact shortest path algorithms.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// The lower resource bound exceeds the upper bound.
    #[error("invalid resource bounds: {lower} > {upper}")]
    InvalidBounds {
        /// Requested minimum resource.
        lower: i64,
        /// Requested maximum resource.
        upper: i64,
    },
    /// Run lengths need `max >= 1` and `min <= max`.
    #[error("invalid consecutive bounds: min {min}, max {max}")]
    InvalidConsecutiveBounds {
        /// Requested minimum run length.
        min: i64,
        /// Requested maximum run length.
        max: i64,
    },
    /// Resources are accumulated along the path and may never become negative.
    #[error("negative resource encountered along path at node {node}")]
    NegativeResource {
        /// Node at which the accumulated resource became negative.
        node: usize,
    },
    /// No path satisfies the resource (and run length) bounds.
    #[error("could not find a feasible path")]
    NoFeasiblePath,
    /// Every window needs at least five nodes.
    #[error("can not split a graph with {len} nodes into {num_splits} windows")]
    InvalidSplit {
        /// Requested number of windows.
        num_splits: usize,
        /// Number of nodes in the graph.
        len: usize,
    },
    /// The stitched windowed solution violates the bounds it was supposed to respect.
    #[error("windowed solution is not feasible: {0}")]
    WindowedInfeasible(String),
    /// The graph itself is malformed.
    #[error(transparent)]
    Dag(#[from] DagError),
}

/// Errors when building or querying an `IntegerProgram`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// A variable, sum or dual variable was created by a different model.
    #[error("{0} comes from a different model")]
    ForeignHandle(&'static str),
    /// A constraint without variables whose constant lies outside of the bounds.
    #[error("a constraint that is always false may not be added: {lower} <= {value} <= {upper}")]
    AlwaysFalse {
        /// Lower bound of the constraint.
        lower: f64,
        /// The constant.
        value: f64,
        /// Upper bound of the constraint.
        upper: f64,
    },
    /// Bounds that no value satisfies.
    #[error("lower bound can not be higher than the upper bound: {lower} > {upper}")]
    EmptyBounds {
        /// Requested lower bound.
        lower: f64,
        /// Requested upper bound.
        upper: f64,
    },
    /// A boolean variable can only be bounded by 0 or 1.
    #[error("bounds of a boolean variable need to be 0 or 1, got [{lower}, {upper}]")]
    BooleanBound {
        /// Requested lower bound.
        lower: f64,
        /// Requested upper bound.
        upper: f64,
    },
    /// A convex helper variable was used with a negative coefficient or a finite lower bound.
    #[error("can not keep variable {variable} convex: {reason}")]
    NotConvex {
        /// Index of the helper variable.
        variable: usize,
        /// How it was misused.
        reason: &'static str,
    },
    /// A variable in a product is not bounded to `{0, 1}`.
    #[error("variables in a pseudo-boolean expression need to be in {{0, 1}}, variable {0} is not")]
    NotPseudoBoolean(usize),
    /// `start_exists` was called inside an exists block.
    #[error("nested exists blocks are not allowed")]
    NestedExists,
    /// `next_exists` or `end_exists` was called outside of an exists block.
    #[error("not inside an exists block")]
    NotInExists,
    /// A variable index beyond the variables of the model.
    #[error("variable {0} does not exist")]
    UnknownVariable(usize),
    /// A row index beyond the rows of the model.
    #[error("row {0} does not exist")]
    UnknownRow(usize),
    /// The dual variable belongs to a constraint that was folded into a bound.
    #[error("dual variable is not available")]
    UnavailableDual,
    /// A consecutive constraint window that doesn't fit the sums.
    #[error("invalid consecutive window {window} for {len} sums")]
    InvalidWindow {
        /// Requested window length.
        window: usize,
        /// Number of sums.
        len: usize,
    },
}

/// Errors of the column generation master problems.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ColumnGenerationError {
    /// A column passed to a set partitioning problem is not a valid member column.
    #[error("invalid column: {0}")]
    InvalidColumn(&'static str),
    /// A column without a member row.
    #[error("columns with no member (e.g. slack columns) should be added to the pool directly")]
    MemberlessColumn,
    /// Columns can only be fixed to nonnegative values.
    #[error("can not fix column to negative value {0}")]
    NegativeFix(i64),
    /// Only integral columns can be fixed.
    #[error("can not fix a real-valued column")]
    NonIntegralColumn,
    /// A fixed column has to stay integral.
    #[error("can not make a fixed column real-valued")]
    FixedContinuous,
    /// The active columns of a member carry (almost) no value, normalizing would blow up.
    #[error("member {member} has a column sum of {sum}")]
    MemberSumTooSmall {
        /// The member.
        member: usize,
        /// Total value of its active columns.
        sum: f64,
    },
    /// A fix does not correspond to the fractional solution, a column violating it was added.
    #[error("fix state of member {member} constraint {constraint} is {fix} but the fractional solution is {value}")]
    StaleFixState {
        /// The member.
        member: usize,
        /// The side constraint.
        constraint: usize,
        /// The fixed value.
        fix: u8,
        /// Coverage in the fractional solution.
        value: f64,
    },
    /// Fixing would leave the member without any viable column.
    #[error("fixing constraint {constraint} to {value} would leave member {member} without columns")]
    StrandedMember {
        /// The member.
        member: usize,
        /// The side constraint.
        constraint: usize,
        /// The value the constraint would be fixed to.
        value: u8,
    },
    /// A constraint was already fixed to the opposite value.
    #[error("constraint {constraint} of member {member} is already fixed")]
    AlreadyFixed {
        /// The member.
        member: usize,
        /// The side constraint.
        constraint: usize,
    },
    /// Rounding needs at least one active column with a positive value per member.
    #[error("member {0} has no column with a positive value")]
    NoPositiveColumn(usize),
    /// Every row needs an active column, slack columns included.
    #[error("row {0} is not used by any active column")]
    UnusedRow(usize),
    /// Column values are assumed to be nonnegative.
    #[error("column {0} has a negative lower bound")]
    NegativeColumnBound(usize),
    /// An index beyond the rows, members or constraints of a problem.
    #[error("index {index} is out of range for {len} {what}")]
    OutOfRange {
        /// What was indexed.
        what: &'static str,
        /// The requested index.
        index: usize,
        /// Number of elements.
        len: usize,
    },
    /// Building the restricted master problem failed.
    #[error(transparent)]
    Model(#[from] ModelError),
}
