pub mod clean;
pub mod detector;
pub mod record;
pub mod report;
pub mod search;
pub mod similarity;
pub mod stats;
pub mod tokenizer;
pub mod vector;

pub use detector::{detect_near_duplicates, CancelFlag, DetectError, Document, SimilarityReport};
pub use record::Record;
pub use similarity::{cosine_similarity, text_similarity};
pub use vector::TermVector;
