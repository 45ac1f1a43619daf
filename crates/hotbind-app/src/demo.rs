//! The settings type the demo binary binds.

use hotbind_config::{FieldDoc, Settings};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoSettings {
    pub port: u16,
    pub greeting: String,
    pub verbose: bool,
}

impl Default for DemoSettings {
    fn default() -> Self {
        Self {
            port: 8080,
            greeting: "hello".to_string(),
            verbose: false,
        }
    }
}

impl Settings for DemoSettings {
    fn field_docs() -> &'static [FieldDoc] {
        const DOCS: &[FieldDoc] = &[
            FieldDoc::new("port", "Port the demo pretends to listen on"),
            FieldDoc::new("greeting", "Printed on every reload"),
            FieldDoc::new("verbose", "Log the full settings on every reload"),
        ];
        DOCS
    }

    fn after_load(&mut self) {
        if self.greeting.trim().is_empty() {
            self.greeting = Self::default().greeting;
        }
    }
}

/// One-line summary used in log output.
pub fn summary(settings: &DemoSettings) -> String {
    format!("{} on port {}", settings.greeting, settings.port)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_greeting_falls_back_to_default() {
        let mut settings = DemoSettings {
            greeting: "   ".to_string(),
            ..DemoSettings::default()
        };
        settings.after_load();
        assert_eq!(settings.greeting, "hello");
    }

    #[test]
    fn every_field_is_documented() {
        let names: Vec<_> = DemoSettings::field_docs().iter().map(|d| d.name).collect();
        assert_eq!(names, ["port", "greeting", "verbose"]);
    }

    #[test]
    fn summary_mentions_port() {
        assert_eq!(summary(&DemoSettings::default()), "hello on port 8080");
    }
}
