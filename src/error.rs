use std::fmt;

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    Xml(roxmltree::Error),
    Netlist(String),
    Settings(String),
    Font(String),
    Pdf(String),
    Worker(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {e}"),
            Error::Xml(e) => write!(f, "XML parse error: {e}"),
            Error::Netlist(msg) => write!(f, "Invalid netlist: {msg}"),
            Error::Settings(msg) => write!(f, "Invalid settings: {msg}"),
            Error::Font(msg) => write!(f, "Font error: {msg}"),
            Error::Pdf(msg) => write!(f, "PDF error: {msg}"),
            Error::Worker(msg) => write!(f, "Build worker failed: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Xml(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<roxmltree::Error> for Error {
    fn from(e: roxmltree::Error) -> Self {
        Error::Xml(e)
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Settings(e.to_string())
    }
}
