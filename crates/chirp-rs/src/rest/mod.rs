//! Generic request plumbing shared by every endpoint.
//!
//! | Module | What it does |
//! |--------|--------------|
//! | [`args`] | Split variadic call arguments into items plus trailing options |
//! | [`identifier`] | Resolve ids, screen names, URLs and objects into options |
//! | [`parallel`] | Ordered concurrent fan-out with ignorable failures |
//! | [`hydrate`] | Build domain objects from records and response envelopes |
//! | [`cursor`] | Walk `next_cursor`-paged listings |

pub mod args;
pub mod cursor;
pub mod hydrate;
pub mod identifier;
pub mod parallel;

pub use args::{Argument, Arguments};
pub use cursor::{Cursor, END_CURSOR, START_CURSOR};
pub use hydrate::{Hydrate, object_list, single_object};
pub use identifier::{
    CompoundKey, Identified, Identifier, KeyField, extract_id, merge_identifier,
    merge_identifier_in_place, merge_identifiers, merge_identifiers_in_place,
};
pub use parallel::{parallel_map, parallel_map_bounded};
