mod sparse_matrix;

pub use sparse_matrix::SparseMatrix;
