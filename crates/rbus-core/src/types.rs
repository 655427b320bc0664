//! Common types used across rbus

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Bus type for DBus connections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BusType {
    #[default]
    System,
    Session,
}

impl BusType {
    /// `gdbus` flag selecting this bus
    pub fn gdbus_flag(&self) -> &'static str {
        match self {
            BusType::System => "--system",
            BusType::Session => "--session",
        }
    }
}

impl std::fmt::Display for BusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BusType::System => write!(f, "system"),
            BusType::Session => write!(f, "session"),
        }
    }
}

/// Classification of a block-opening line in a recursive introspection dump
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Node,
    Interface,
    Other,
}

/// One brace-terminated line split into its keyword, value and trailing brace
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LineToken {
    pub keyword: String,
    pub value: String,
    pub brace: String,
}

impl LineToken {
    pub fn kind(&self) -> TokenKind {
        match self.keyword.as_str() {
            "node" => TokenKind::Node,
            "interface" => TokenKind::Interface,
            _ => TokenKind::Other,
        }
    }
}

/// Interface name to the object path that implements it.
///
/// Ordered so that logs and output are stable between runs; the order has no
/// other meaning.
pub type InterfaceMap = BTreeMap<String, String>;

/// One interface definition written to disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DumpRecord {
    pub interface: String,
    pub path: String,
    pub file: PathBuf,
    /// Members declared in the saved document; empty if it could not be summarised
    #[serde(default)]
    pub methods: Vec<String>,
    #[serde(default)]
    pub signals: Vec<String>,
    #[serde(default)]
    pub properties: Vec<String>,
}

/// Everything written by a dump run, in write order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DumpReport {
    pub records: Vec<DumpRecord>,
}

impl DumpReport {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Interfaces declared by one introspection document
#[derive(Debug, Clone, Default)]
pub struct ObjectInfo {
    pub interfaces: Vec<InterfaceInfo>,
}

impl ObjectInfo {
    pub fn interface(&self, name: &str) -> Option<&InterfaceInfo> {
        self.interfaces.iter().find(|iface| iface.name == name)
    }
}

/// Member names of one DBus interface
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterfaceInfo {
    pub name: String,
    pub methods: Vec<String>,
    pub signals: Vec<String>,
    pub properties: Vec<String>,
}
