//! Satellite radiances from BUFR.
//!
//! BUFR decoding itself happens outside this crate. [`ReadBufr`] walks the
//! decoded subsets of a [`SubsetSource`], keeps the ones whose `SAID` and
//! `SIID` match the requested satellite and sensor, and flattens their
//! replicated channels into a [`RadianceTable`].
//!
//! ```no_run
//! use bufr::{DumpSource, ReadBufr};
//!
//! let source = DumpSource::open("gdas.1bamua.tm00.jsonl")?;
//! let table = ReadBufr::new(source).read_radiance("amsua", "n19")?;
//! println!("{} rows, channels {:?}", table.len(), table.channels());
//! # Ok::<(), bufr::BufrError>(())
//! ```

pub mod codes;
pub mod error;
pub mod radiance;
pub mod source;

pub use codes::BufrCodes;
pub use error::{BufrError, BufrResult};
pub use radiance::{RadianceRow, RadianceTable, ReadBufr};
pub use source::{DumpSource, MemorySource, Subset, SubsetSource, Value};
