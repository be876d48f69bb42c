//! PropYouLike Verify
//!
//! Post-build gates over the generated output directory. Gates run in a
//! fixed order and the first failure aborts the chain:
//!
//! 1. `PRESENCE`: legal pages, sitemap, builder hubs, project pages
//! 2. `STRUCTURE`: non-empty title and meta description
//! 3. `CANONICAL`: canonical link and `og:url` match the directory name
//! 4. `STRUCTURED_DATA`: JSON-LD parses and carries the required types

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod gates;
pub mod report;
pub mod scan;

pub use error::{GateError, GateResult};
pub use gates::{
    CANONICAL, CanonicalGate, DistContext, Gate, GateChain, GateConfig, PRESENCE, PresenceGate,
    STRUCTURE, STRUCTURED_DATA, StructureGate, StructuredDataGate,
};
pub use report::{GateCheck, GateReport};
pub use scan::{DistPage, PageRole, PageScan, decode_entities, discover};
