use core::fmt::Display;
use std::error::Error;

macro_rules! define_errors {
    ($(($err_name: ident, $err_descr: expr)),+) => {
        $(
            #[doc = $err_descr]
            #[derive(Debug,Clone)]
            pub struct $err_name {
                #[doc = "Error message associated with "]
                #[doc = stringify!($err_name)]
                #[doc = " error type."]
                pub message: String,
            }

            impl $err_name {
                pub fn new<S: Into<String>>(message: S) -> Self {
                    $err_name { message: message.into() }
                }
            }

            impl Display for $err_name {
                fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                    write!(f, "{}", self.message)
                }
            }

            impl Error for $err_name {}
        )+
    }
}

define_errors!(
    (CalcError, "General calculation error, e.g. a geometry pair this build cannot yet resolve"),
    (
        BoundaryError,
        "Raised when an agent's position cannot be reconciled with the simulation domain"
    ),
    (DivisionError, "Errors related to a cell's division process"),
    (
        IndexError,
        "Raised when information is not present at the expected place (spatial index, strings dictionary, ...)"
    ),
    (
        RequestError,
        "Raised when asking a peer FrontOfficer or the Director for something it cannot supply"
    ),
    (
        ConsistencyError,
        "Raised on a fatal bookkeeping mismatch: a strings dictionary collision, a lineage record closed out of order, ..."
    )
);

/// The umbrella error type threaded through `Director`/`FrontOfficer`
/// round execution and the rasterisation pipeline.
#[derive(Debug, Clone)]
pub enum SimulationError {
    Calc(CalcError),
    Boundary(BoundaryError),
    Division(DivisionError),
    Index(IndexError),
    Request(RequestError),
    Consistency(ConsistencyError),
    Io(String),
}

impl Display for SimulationError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            SimulationError::Calc(e) => write!(f, "calculation error: {e}"),
            SimulationError::Boundary(e) => write!(f, "boundary error: {e}"),
            SimulationError::Division(e) => write!(f, "division error: {e}"),
            SimulationError::Index(e) => write!(f, "index error: {e}"),
            SimulationError::Request(e) => write!(f, "request error: {e}"),
            SimulationError::Consistency(e) => write!(f, "consistency error: {e}"),
            SimulationError::Io(msg) => write!(f, "I/O error: {msg}"),
        }
    }
}

impl Error for SimulationError {}

macro_rules! impl_from_leaf {
    ($leaf:ty, $variant:ident) => {
        impl From<$leaf> for SimulationError {
            fn from(e: $leaf) -> Self {
                SimulationError::$variant(e)
            }
        }
    };
}

impl_from_leaf!(CalcError, Calc);
impl_from_leaf!(BoundaryError, Boundary);
impl_from_leaf!(DivisionError, Division);
impl_from_leaf!(IndexError, Index);
impl_from_leaf!(RequestError, Request);
impl_from_leaf!(ConsistencyError, Consistency);

impl From<std::io::Error> for SimulationError {
    fn from(e: std::io::Error) -> Self {
        SimulationError::Io(e.to_string())
    }
}
