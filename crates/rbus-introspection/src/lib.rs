//! rbus-introspection: remote DBus introspection dumps
//!
//! This crate provides:
//! - Parsing of `gdbus introspect --recurse` text into an interface -> path map
//! - Transports running the introspection tool over SSH or locally
//! - XML summaries of per-path introspection documents
//! - The dump loop writing one XML file per interface

pub mod dumper;
pub mod parser;
pub mod transport;
pub mod xml;

pub use dumper::{output_file_for, InterfaceDumper};
pub use parser::{is_block_opener, tokenize, IntrospectionMapper};
pub use transport::{
    IntrospectMode, IntrospectionTarget, IntrospectionTransport, LocalTransport, SshTransport,
};
pub use xml::parse_introspection_xml;

/// Prelude for convenient imports
pub mod prelude {
    pub use super::{
        InterfaceDumper, IntrospectionMapper, IntrospectionTarget, IntrospectionTransport,
        LocalTransport, SshTransport,
    };
}
