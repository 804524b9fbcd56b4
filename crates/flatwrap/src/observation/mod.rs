//! Fixed-length observation vectors.
//!
//! The simulation's own translator turns a native observation into a flat
//! list of features. This module pins the length of that list per agent the
//! first time it is seen and rejects any later vector of a different length.

mod vectorizer;

pub use vectorizer::ObservationVectorizer;
