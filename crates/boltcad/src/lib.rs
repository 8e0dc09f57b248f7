#![warn(missing_docs)]

//! boltcad: parametric fasteners for 3D printing
//!
//! Completes catalog sizes into full bolt, nut and passage dimensions and
//! records ISO metric threads, heads and clearance holes as construction
//! trees ready for a CSG kernel.
//!
//! # Example
//!
//! ```rust,no_run
//! use boltcad::{complete, threaded_bolt, Catalog, HeadStyle, Overrides, PrintSettings};
//!
//! let catalog = Catalog::iso_metric();
//! let settings = PrintSettings::default();
//! let index = catalog.find("M3").unwrap();
//! let dims = complete(&catalog, index, &Overrides::default(), &settings).unwrap();
//!
//! let bolt = threaded_bolt(&dims, HeadStyle::Allen, Some(12.0), true, &settings).unwrap();
//! std::fs::write("m3_bolt.json", bolt.to_document().to_json().unwrap()).unwrap();
//! ```

pub mod bounds;
pub mod catalog;
pub mod dims;
pub mod error;
pub mod helix;
pub mod part;
pub mod profile;
pub mod settings;
pub mod shapes;

pub use bounds::Aabb3;
pub use catalog::{Catalog, RawSpec};
pub use dims::{complete, complete_raw, guess, Overrides, ScrewDims, ThreadGeometry};
pub use error::{FastenerError, Result};
pub use helix::{build_slices, rotations_for, Slice, SliceSequence};
pub use part::{Part, Scene};
pub use profile::{build_profile, ThreadKind, ThreadProfile};
pub use settings::PrintSettings;
pub use shapes::{
    passage, plain_bolt, threaded_bolt, threaded_nut, BevelEnds, CoreOptions, Fit, HeadStyle,
    Orientation,
};

// Re-export IR types for downstream consumers
pub use boltcad_ir;
