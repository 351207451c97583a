//! Errors raised while loading graph descriptions.

use std::path::PathBuf;

/// A malformed or inconsistent input description. Always fatal: the mapper
/// never starts searching on a graph that failed to load.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The description file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// The file that failed to open.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The description is not valid JSON for its format.
    #[error("failed to parse {what}: {message}")]
    Parse {
        /// Which description was being parsed.
        what: &'static str,
        /// The parser message.
        message: String,
    },

    /// An adjacency or table entry refers past the end of a node list.
    #[error("{what} index {index} out of range ({len} available)")]
    OutOfRange {
        /// The kind of entity referenced.
        what: &'static str,
        /// The offending index.
        index: u32,
        /// The number of entities that exist.
        len: usize,
    },

    /// Two operations claim the same output value.
    #[error("value {value} is produced by both `{first}` and `{second}`")]
    DuplicateDriver {
        /// The value index.
        value: u32,
        /// The first producer.
        first: String,
        /// The second producer.
        second: String,
    },

    /// An MRRG edge appears in one node's fan-out but not the other's fan-in,
    /// or the reverse.
    #[error("MRRG edge `{from}` -> `{to}` is listed on one end only")]
    InconsistentEdge {
        /// Name of the driving node.
        from: String,
        /// Name of the driven node.
        to: String,
    },

    /// A fixed-mapping entry names a routing node.
    #[error("operation `{op}` is fixed to `{node}`, which is not a function node")]
    FixedNotFunction {
        /// The DFG operation name.
        op: String,
        /// The MRRG node name.
        node: String,
    },

    /// A fixed-mapping entry names a function node that cannot execute the op.
    #[error("operation `{op}` is fixed to `{node}`, which does not support opcode {opcode}")]
    FixedUnsupported {
        /// The DFG operation name.
        op: String,
        /// The MRRG node name.
        node: String,
        /// The operation's opcode.
        opcode: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_out_of_range() {
        let err = LoadError::OutOfRange {
            what: "routing node",
            index: 9,
            len: 4,
        };
        assert_eq!(err.to_string(), "routing node index 9 out of range (4 available)");
    }

    #[test]
    fn display_inconsistent_edge() {
        let err = LoadError::InconsistentEdge {
            from: "0:alu".to_string(),
            to: "r0".to_string(),
        };
        assert_eq!(err.to_string(), "MRRG edge `0:alu` -> `r0` is listed on one end only");
    }
}
