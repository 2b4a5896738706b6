//! HTTP request domain types

mod descriptor;
mod header;
mod method;

pub use descriptor::RequestDescriptor;
pub use header::{Header, Headers};
pub use method::HttpMethod;
