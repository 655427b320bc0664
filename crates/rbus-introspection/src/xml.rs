//! Introspection XML summary
//!
//! The dumper persists the raw XML untouched; this walk only exists so the
//! run can report which members each saved document declares.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use rbus_core::{Error, InterfaceInfo, ObjectInfo, Result};

/// Collect the interfaces and member names of a `<node>` document fetched for `path`.
pub fn parse_introspection_xml(xml: &str, path: &str) -> Result<ObjectInfo> {
    let mut reader = Reader::from_str(xml);

    let mut interfaces = Vec::new();
    let mut current_interface: Option<InterfaceInfo> = None;

    loop {
        let (element, self_closing) = match reader.read_event() {
            Ok(Event::Start(e)) => (e, false),
            Ok(Event::Empty(e)) => (e, true),
            Ok(Event::End(e)) => {
                if e.name().as_ref() == b"interface" {
                    interfaces.extend(current_interface.take());
                }
                continue;
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::xml(format!("{}: {}", path, e))),
            _ => continue,
        };

        let name = attribute(&element, b"name");
        match element.name().as_ref() {
            b"interface" => {
                let iface = InterfaceInfo {
                    name: name.unwrap_or_default(),
                    ..Default::default()
                };
                if self_closing {
                    interfaces.push(iface);
                } else {
                    current_interface = Some(iface);
                }
            }
            b"method" => {
                if let (Some(iface), Some(name)) = (current_interface.as_mut(), name) {
                    iface.methods.push(name);
                }
            }
            b"signal" => {
                if let (Some(iface), Some(name)) = (current_interface.as_mut(), name) {
                    iface.signals.push(name);
                }
            }
            b"property" => {
                if let (Some(iface), Some(name)) = (current_interface.as_mut(), name) {
                    iface.properties.push(name);
                }
            }
            _ => {}
        }
    }

    Ok(ObjectInfo { interfaces })
}

fn attribute(element: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    element
        .attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .map(|attr| String::from_utf8_lossy(&attr.value).to_string())
}
