use std::fmt;

/// Machine-readable error codes for scripted callers and hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    SceneParseError,
    BlockNotFound,
    EdgeNotFound,
    MissingEdgeId,
    MalformedEdgeXml,
    MalformedEdgeRecord,
    InvalidEdgeEndpoints,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1001",
            Self::SceneParseError => "E1002",
            Self::BlockNotFound => "E2001",
            Self::EdgeNotFound => "E2002",
            Self::MissingEdgeId => "E3001",
            Self::MalformedEdgeXml => "E3002",
            Self::MalformedEdgeRecord => "E3003",
            Self::InvalidEdgeEndpoints => "E3004",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::SceneParseError => "Scene file parse error",
            Self::BlockNotFound => "Block not found",
            Self::EdgeNotFound => "Edge not found",
            Self::MissingEdgeId => "Persisted edge has no id",
            Self::MalformedEdgeXml => "Malformed arrowline XML",
            Self::MalformedEdgeRecord => "Malformed arrowline record",
            Self::InvalidEdgeEndpoints => "Persisted edge has invalid endpoints",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in treeline.toml and retry."),
            Self::SceneParseError => Some("Check the scene JSON against the documented layout."),
            Self::BlockNotFound => Some("List blocks with `treeline order` to find valid ids."),
            Self::EdgeNotFound => Some("List edges with `treeline edges` to find valid ids."),
            Self::MissingEdgeId
            | Self::MalformedEdgeXml
            | Self::MalformedEdgeRecord
            | Self::InvalidEdgeEndpoints => {
                Some("The saved scene is corrupted; restore it from a known-good copy.")
            }
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
