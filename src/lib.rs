//! A generalized suffix tree over a growing collection of byte sequences, together with
//! the mining passes used to extract frequent, closed and class-signature substrings.
//!
//! ```
//! use sigstring::SuffixTree;
//!
//! let mut tree = SuffixTree::new();
//! tree.insert_sequence(b"banana").unwrap();
//! tree.insert_sequence(b"ananas").unwrap();
//! let hits = tree.query_substring(b"ana").count();
//! assert_eq!(hits, 4);
//! ```
pub mod builder;
pub mod classes;
pub mod exporters;
pub mod mining;
pub mod navigation;
pub mod node;
pub mod sequences;
pub mod structs;
pub mod tree;
pub mod utils;

pub mod errors {
    use thiserror::Error;

    use crate::sequences::SequenceId;

    #[derive(Error, Debug)]
    pub enum Error {
        #[error("unable to allocate tree storage: {0}")]
        Allocation(#[from] std::collections::TryReserveError),

        #[error("the class table is empty")]
        EmptyClassTable,

        #[error("class #{0} has a null population")]
        EmptyClass(usize),

        #[error("sequence #{sequence} lies outside the classes population ({total} sequences)")]
        UnclassifiedSequence { sequence: SequenceId, total: usize },
    }

    pub type Result<T> = std::result::Result<T, Error>;
}

pub use classes::ClassTable;
pub use mining::{mine_closed, mine_frequent, mine_signatures, mine_signatures_pruned, mine_signatures_with};
pub use mining::{Signature, SignatureThresholds, Substring};
pub use navigation::{Occurrences, Position, SuffixChain};
pub use node::{Edge, Node, NodeId, NodeKind, Occurrence, OccurrenceList};
pub use sequences::{SequenceId, SequenceStore};
pub use tree::SuffixTree;
