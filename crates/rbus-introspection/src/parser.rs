//! Recursive introspection text parser
//!
//! `gdbus introspect --recurse` prints a tree where every object path opens
//! with `node <path> {` and every interface with `interface <name> {`, nested
//! by indentation. Only those block openers matter here: each interface is
//! attributed to the most recent `node` line above it.
//!
//! Lines that do not end in `{` (member listings, `methods:` headers, closing
//! `};`, blanks) are dropped before classification. A brace-terminated line
//! with any other keyword is treated as corrupt input and aborts the scan.

use tracing::{debug, info};

use rbus_core::{Error, InterfaceMap, LineToken, Result, TokenKind};

/// True for lines that open a block, i.e. end in `{` once trailing whitespace is gone.
pub fn is_block_opener(line: &str) -> bool {
    line.trim_end().ends_with('{')
}

/// Split a line into keyword, value and the remainder.
///
/// Words are whitespace separated; indentation is ignored. Missing fields
/// come back empty, and everything after the value is kept in `brace`.
pub fn tokenize(line: &str) -> LineToken {
    let mut words = line.split_whitespace();
    let keyword = words.next().unwrap_or_default().to_string();
    let value = words.next().unwrap_or_default().to_string();
    let brace = words.collect::<Vec<_>>().join(" ");

    LineToken {
        keyword,
        value,
        brace,
    }
}

/// Builds the interface -> object path map from a recursive dump
#[derive(Debug, Clone, Copy, Default)]
pub struct IntrospectionMapper;

impl IntrospectionMapper {
    pub fn new() -> Self {
        Self
    }

    /// Scan `lines` and map every interface to its enclosing node's path.
    ///
    /// An interface seen more than once keeps the path of its last
    /// occurrence. An interface that appears before any node maps to `""`.
    pub fn build_interface_map<I, S>(&self, lines: I) -> Result<InterfaceMap>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut current_path = String::new();
        let mut map = InterfaceMap::new();

        for line in lines {
            let line = line.as_ref();
            if !is_block_opener(line) {
                continue;
            }

            let token = tokenize(line);
            match token.kind() {
                TokenKind::Node => {
                    debug!(path = %token.value, "Entering node");
                    current_path = token.value;
                }
                TokenKind::Interface => {
                    info!(
                        interface = %token.value,
                        path = %current_path,
                        "Resolved interface"
                    );
                    if let Some(previous) = map.insert(token.value, current_path.clone()) {
                        debug!(
                            previous = %previous,
                            path = %current_path,
                            "Interface path replaced"
                        );
                    }
                }
                TokenKind::Other => {
                    return Err(Error::MalformedLine {
                        keyword: token.keyword,
                        value: token.value,
                        brace: token.brace,
                    });
                }
            }
        }

        debug!("Mapped {} interfaces", map.len());
        Ok(map)
    }

    /// Same as [`build_interface_map`](Self::build_interface_map) over a buffered dump.
    pub fn build_interface_map_from_str(&self, text: &str) -> Result<InterfaceMap> {
        self.build_interface_map(text.lines())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLUEZ_TREE: &str = r#"node / {
  interface org.freedesktop.DBus.ObjectManager {
    methods:
      GetManagedObjects(out a{oa{sa{sv}}} objects);
    signals:
      InterfacesAdded(o object,
                      a{sa{sv}} interfaces);
    properties:
  };
  node /org {
    interface org.freedesktop.DBus.Introspectable {
      methods:
        Introspect(out s xml);
      signals:
      properties:
    };
    node /org/bluez {
      interface org.bluez.AgentManager1 {
        methods:
          RegisterAgent(in  o agent,
                        in  s capability);
        signals:
        properties:
      };
      interface org.freedesktop.DBus.Introspectable {
        methods:
          Introspect(out s xml);
      };
      node /org/bluez/hci0 {
        interface org.bluez.Adapter1 {
          methods:
            StartDiscovery();
          signals:
          properties:
            readonly s Address = 'DC:A6:32:00:00:01';
            readwrite b Powered = true;
        };
      };
    };
  };
};
"#;

    fn map_of(pairs: &[(&str, &str)]) -> InterfaceMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_block_opener_filter() {
        assert!(is_block_opener("node /org/bluez {"));
        assert!(is_block_opener("    interface org.bluez.Adapter1 {   "));
        assert!(!is_block_opener(""));
        assert!(!is_block_opener("    methods:"));
        assert!(!is_block_opener("  };"));
        assert!(!is_block_opener("readonly a{sv} ServiceData = {};"));
    }

    #[test]
    fn test_tokenize() {
        let token = tokenize("      interface org.bluez.Adapter1 {");
        assert_eq!(token.keyword, "interface");
        assert_eq!(token.value, "org.bluez.Adapter1");
        assert_eq!(token.brace, "{");

        let short = tokenize("node {");
        assert_eq!(short.keyword, "node");
        assert_eq!(short.value, "{");
        assert_eq!(short.brace, "");

        let long = tokenize("foo bar baz {");
        assert_eq!(long.brace, "baz {");
    }

    #[test]
    fn test_sibling_nodes() {
        let map = IntrospectionMapper::new()
            .build_interface_map(["node /a {", "interface X {", "node /b {", "interface Y {"])
            .unwrap();
        assert_eq!(map, map_of(&[("X", "/a"), ("Y", "/b")]));
    }

    #[test]
    fn test_last_occurrence_wins() {
        let map = IntrospectionMapper::new()
            .build_interface_map(["node /a {", "interface X {", "node /b {", "interface X {"])
            .unwrap();
        assert_eq!(map, map_of(&[("X", "/b")]));
    }

    #[test]
    fn test_interface_before_any_node() {
        let map = IntrospectionMapper::new()
            .build_interface_map(["interface X {", "node /a {", "interface Y {"])
            .unwrap();
        assert_eq!(map.get("X").map(String::as_str), Some(""));
        assert_eq!(map.get("Y").map(String::as_str), Some("/a"));
    }

    #[test]
    fn test_unknown_keyword_is_fatal() {
        let err = IntrospectionMapper::new()
            .build_interface_map(["node /a {", "interface X {", "foo bar {"])
            .unwrap_err();
        match err {
            Error::MalformedLine {
                keyword,
                value,
                brace,
            } => {
                assert_eq!(keyword, "foo");
                assert_eq!(value, "bar");
                assert_eq!(brace, "{");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_non_brace_lines_never_fail() {
        let map = IntrospectionMapper::new()
            .build_interface_map(["", "foo bar", "methods:", "node /a {", "  };", "interface X {"])
            .unwrap();
        assert_eq!(map, map_of(&[("X", "/a")]));
    }

    #[test]
    fn test_generated_well_formed_sequences() {
        // Every sequence of up to 8 lines drawn from 2 nodes and 2 interfaces,
        // checked against a straightforward last-write-wins model.
        let alphabet = [
            ("node", "/org/bluez"),
            ("node", "/org/bluez/hci0"),
            ("interface", "org.bluez.Adapter1"),
            ("interface", "org.bluez.Device1"),
        ];
        let mapper = IntrospectionMapper::new();

        for len in 0..=8u32 {
            for mut code in 0..alphabet.len().pow(len) {
                let mut lines = Vec::new();
                let mut expected = InterfaceMap::new();
                let mut current = String::new();

                for depth in 0..len as usize {
                    let (keyword, value) = alphabet[code % alphabet.len()];
                    code /= alphabet.len();

                    lines.push(format!("{}{} {} {{", "  ".repeat(depth), keyword, value));
                    if keyword == "node" {
                        current = value.to_string();
                    } else {
                        expected.insert(value.to_string(), current.clone());
                    }
                }

                let map = mapper
                    .build_interface_map(&lines)
                    .unwrap_or_else(|e| panic!("{lines:?} rejected: {e}"));
                assert_eq!(map, expected, "input: {lines:?}");
            }
        }
    }

    #[test]
    fn test_empty_input() {
        let map = IntrospectionMapper::new().build_interface_map_from_str("").unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn test_gdbus_tree() {
        let map = IntrospectionMapper::new()
            .build_interface_map_from_str(BLUEZ_TREE)
            .unwrap();
        assert_eq!(
            map,
            map_of(&[
                ("org.freedesktop.DBus.ObjectManager", "/"),
                ("org.freedesktop.DBus.Introspectable", "/org/bluez"),
                ("org.bluez.AgentManager1", "/org/bluez"),
                ("org.bluez.Adapter1", "/org/bluez/hci0"),
            ])
        );
    }
}
