//! On-disk formats and their comment syntax.

use std::fmt;
use std::str::FromStr;

use hotbind_common::ConfigError;

/// File format of a bound config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Json,
    Toml,
    Yaml,
    Ini,
    Xml,
}

/// Line comment syntax used for generated headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentStyle {
    pub prefix: &'static str,
    pub suffix: &'static str,
}

impl CommentStyle {
    /// Render one line of text as a comment.
    pub fn line(&self, text: &str) -> String {
        let text = text.trim_end();
        match (text.is_empty(), self.suffix.is_empty()) {
            (true, true) => self.prefix.to_string(),
            (true, false) => format!("{} {}", self.prefix, self.suffix),
            (false, true) => format!("{} {text}", self.prefix),
            (false, false) => format!("{} {text} {}", self.prefix, self.suffix),
        }
    }
}

impl Format {
    pub const ALL: [Format; 5] = [
        Format::Json,
        Format::Toml,
        Format::Yaml,
        Format::Ini,
        Format::Xml,
    ];

    /// Extension appended to names that do not carry one.
    pub fn extension(self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Toml => "toml",
            Format::Yaml => "yaml",
            Format::Ini => "ini",
            Format::Xml => "xml",
        }
    }

    pub fn comment_style(self) -> CommentStyle {
        match self {
            Format::Json => CommentStyle {
                prefix: "//",
                suffix: "",
            },
            Format::Toml | Format::Yaml => CommentStyle {
                prefix: "#",
                suffix: "",
            },
            Format::Ini => CommentStyle {
                prefix: ";",
                suffix: "",
            },
            Format::Xml => CommentStyle {
                prefix: "<!--",
                suffix: "-->",
            },
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for Format {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Format::Json),
            "toml" => Ok(Format::Toml),
            "yaml" | "yml" => Ok(Format::Yaml),
            "ini" => Ok(Format::Ini),
            "xml" => Ok(Format::Xml),
            other => Err(ConfigError::UnsupportedFormat(other.to_string())),
        }
    }
}
