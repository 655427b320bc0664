//! Per-interface XML dump
//!
//! Fetches the recursive tree once, maps every interface to its object path,
//! then introspects each path in XML mode and writes the document verbatim to
//! `<output_dir>/<interface>.xml`. Everything runs one request at a time and
//! the first failed fetch or write ends the run; files written before it stay
//! on disk. Summarising a saved document is best effort and never fails a run.

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use rbus_core::{DumpRecord, DumpReport, InterfaceInfo, InterfaceMap, Result};

use crate::parser::IntrospectionMapper;
use crate::transport::IntrospectionTransport;
use crate::xml::parse_introspection_xml;

/// File an interface definition is written to.
///
/// The interface name is used as-is, so two runs into the same directory
/// overwrite each other's files.
pub fn output_file_for(output_dir: &Path, interface: &str) -> PathBuf {
    output_dir.join(format!("{}.xml", interface))
}

pub struct InterfaceDumper<T> {
    transport: T,
    output_dir: PathBuf,
    mapper: IntrospectionMapper,
}

impl<T: IntrospectionTransport> InterfaceDumper<T> {
    pub fn new(transport: T, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            transport,
            output_dir: output_dir.into(),
            mapper: IntrospectionMapper::new(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Fetch the whole tree dump, then map interfaces to paths.
    pub async fn build_map(&self) -> Result<InterfaceMap> {
        let tree = self.transport.tree().await?;
        debug!(bytes = tree.len(), "Fetched introspection tree");
        self.mapper.build_interface_map_from_str(&tree)
    }

    /// Write one XML file per entry of `map`, stopping at the first error.
    pub async fn dump_all(&self, map: &InterfaceMap) -> Result<DumpReport> {
        tokio::fs::create_dir_all(&self.output_dir).await?;

        let mut report = DumpReport::default();
        for (interface, path) in map {
            let xml = self.transport.introspect_xml(path).await?;
            let file = output_file_for(&self.output_dir, interface);
            tokio::fs::write(&file, &xml).await?;

            let members = summarise(&xml, interface, path);
            info!(
                interface = %interface,
                file = %file.display(),
                methods = members.methods.len(),
                signals = members.signals.len(),
                properties = members.properties.len(),
                "Wrote interface definition"
            );

            report.records.push(DumpRecord {
                interface: interface.clone(),
                path: path.clone(),
                file,
                methods: members.methods,
                signals: members.signals,
                properties: members.properties,
            });
        }

        Ok(report)
    }

    /// Map the tree and dump every interface.
    pub async fn run(&self) -> Result<DumpReport> {
        let map = self.build_map().await?;
        info!("Found {} interfaces", map.len());
        self.dump_all(&map).await
    }
}

/// Members `interface` declares in `xml`, or none if the document can't tell us.
fn summarise(xml: &str, interface: &str, path: &str) -> InterfaceInfo {
    let summary = match parse_introspection_xml(xml, path) {
        Ok(summary) => summary,
        Err(e) => {
            warn!(
                interface = %interface,
                path = %path,
                error = %e,
                "Could not summarise saved document"
            );
            return InterfaceInfo::default();
        }
    };

    match summary.interface(interface) {
        Some(iface) => iface.clone(),
        None => {
            warn!(
                interface = %interface,
                path = %path,
                "Saved document does not declare the interface"
            );
            InterfaceInfo::default()
        }
    }
}
