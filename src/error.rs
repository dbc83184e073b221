use std::fmt;

/// Why a sequence of simplices is not a valid filtration.
#[derive(Debug, Clone, PartialEq)]
pub enum FiltrationDefect {
    EmptySimplex,
    /// Vertices must be strictly increasing.
    UnsortedVertices,
    /// The same simplex occurs earlier in the sequence.
    Duplicate { first: usize },
    /// A codimension one face does not occur anywhere in the sequence.
    MissingFace { face: Vec<usize> },
    /// A codimension one face occurs at `face_index`, after the simplex itself.
    FaceAfterCoface { face: Vec<usize>, face_index: usize },
    ValueCountMismatch { values: usize, simplices: usize },
    NonFiniteValue,
    /// The filtration value is smaller than that of the previous simplex.
    DecreasingValue { previous: f64, value: f64 },
}

impl fmt::Display for FiltrationDefect {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::EmptySimplex => write!(f, "simplex has no vertices"),
            Self::UnsortedVertices => write!(f, "vertices are not strictly increasing"),
            Self::Duplicate { first } => write!(f, "simplex already occurs at index {first}"),
            Self::MissingFace { face } => write!(f, "face {face:?} is missing"),
            Self::FaceAfterCoface { face, face_index } => {
                write!(f, "face {face:?} occurs later, at index {face_index}")
            }
            Self::ValueCountMismatch { values, simplices } => {
                write!(f, "{values} filtration values for {simplices} simplices")
            }
            Self::NonFiniteValue => write!(f, "filtration value is not finite"),
            Self::DecreasingValue { previous, value } => {
                write!(f, "filtration value {value} is smaller than the previous value {previous}")
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SteenroderError {
    #[error("invalid filtration at index {index}: {defect}")]
    InvalidFiltration { index: usize, defect: FiltrationDefect },

    #[error("dimension mismatch: expected {expected}, found {found} ({context})")]
    DimensionMismatch {
        expected: usize,
        found: usize,
        context: &'static str,
    },

    #[error("filtration values were requested but the filtration has none")]
    MissingFiltrationValues,

    #[error("simplex {0:?} does not occur in the filtration")]
    UnknownSimplex(Vec<usize>),

    #[error("bar ({birth}, {death:?}) does not occur in the barcode of this filtration")]
    UnknownBar { birth: usize, death: Option<usize> },

    #[error("computation cancelled after {columns} columns")]
    Cancelled { columns: usize },
}

pub type Result<T> = std::result::Result<T, SteenroderError>;

impl SteenroderError {
    pub(crate) fn invalid(index: usize, defect: FiltrationDefect) -> Self {
        Self::InvalidFiltration { index, defect }
    }
}
