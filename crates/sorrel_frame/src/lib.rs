//! An embeddable, schema-typed columnar table engine.
pub mod chunked;
pub mod column;
pub mod dataframe;
pub mod datatype;
pub mod errors;
pub mod row;
pub mod rower;
pub mod schema;

mod parallel;
