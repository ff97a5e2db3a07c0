pub mod api;
pub mod parser;

pub use api::{EcbAPI, EcbError, Feed};
pub use parser::parse_ecb_xml;
