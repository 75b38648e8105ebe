//! The multi-level geohash trie.
//!
//! Level table `L` maps a cell of length `L` to its children one level
//! deeper (edges) or to the content ids of items that terminate in it
//! (leaves). Both kinds share the table; [`codec::TrieCodec`] tells them
//! apart by length.
//!
//! ```text
//! level2      "s0"   -> {"s00", "s01", ...}
//! level3      "s00"  -> {"s000", "s001", "9f3c..."}   edges and a leaf
//! level4      "s000" -> {"a41b...", ...}              leaves
//! content     "9f3c..." -> {"{\"file\":...}"}
//! ```

pub mod codec;
pub mod reader;
pub mod writer;

pub use codec::TrieCodec;
pub use reader::{TrieReader, TrieWalk, TrieWalkStats};
pub use writer::{TrieWriter, WriteReport};
