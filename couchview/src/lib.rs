//! couchview compiles declarative view definitions into the map functions
//! executed by a document database, in either JavaScript or Erlang, and
//! extracts documents or IDs from the rows such views return.
//!
//! For the command line interface, see the `couchview-cli` crate.

mod config;
mod erlang;
mod error;
mod javascript;
mod js;
mod options;
mod query;
mod results;
mod view;

pub use config::{
    load_definitions, load_from_file, DesignDefinition, SupportedFormat, ViewDefinition,
};
pub use error::Error;
pub use js::evaluate_map_function;
pub use options::{EmitValue, Key, Language, ViewOptions};
pub use query::{QueryOptions, Stale};
pub use results::{Row, RowEnvelope, ViewResult};
pub use view::{ViewSpec, DISCRIMINATOR_FIELD};

