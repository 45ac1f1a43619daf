//! Comment headers describing a settings type's fields.
//!
//! Built once per `(type, format)` pair from [`Settings::field_docs`] and
//! cached for the rest of the process.

use std::any::TypeId;
use std::sync::{Arc, OnceLock};

use dashmap::DashMap;

use crate::format::Format;
use crate::settings::Settings;

type HeaderCache = DashMap<(TypeId, Format), Option<Arc<str>>>;

fn cache() -> &'static HeaderCache {
    static CACHE: OnceLock<HeaderCache> = OnceLock::new();
    CACHE.get_or_init(DashMap::new)
}

/// Header for `T` in `format`, or `None` when `T` documents no fields.
pub fn header_for<T: Settings>(format: Format) -> Option<Arc<str>> {
    cache()
        .entry((TypeId::of::<T>(), format))
        .or_insert_with(|| build::<T>(format).map(Arc::from))
        .clone()
}

fn build<T: Settings>(format: Format) -> Option<String> {
    let docs = T::field_docs();
    if docs.is_empty() {
        return None;
    }

    let style = format.comment_style();
    let width = docs.iter().map(|d| d.name.len()).max().unwrap_or(0);

    let mut lines = vec![
        style.line(short_type_name::<T>()),
        style.line("Edits to this file are picked up while the application runs."),
        style.line(""),
    ];
    for doc in docs {
        lines.push(style.line(&format!("{:<width$}  {}", doc.name, doc.description)));
    }

    let mut header = lines.join("\n");
    header.push('\n');
    Some(header)
}

fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// Place `header` above `body`, keeping an XML declaration on the first line.
pub(crate) fn inject(header: &str, body: &str, format: Format) -> String {
    if format == Format::Xml && body.trim_start().starts_with("<?xml") {
        let body = body.trim_start();
        if let Some((decl, rest)) = body.split_once('\n') {
            return format!("{decl}\n{header}{rest}");
        }
    }
    format!("{header}\n{body}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::FieldDoc;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Default, Serialize, Deserialize)]
    struct Documented {
        port: u16,
        hostname: String,
    }

    impl Settings for Documented {
        fn field_docs() -> &'static [FieldDoc] {
            const DOCS: &[FieldDoc] = &[
                FieldDoc::new("port", "TCP port to listen on"),
                FieldDoc::new("hostname", "Name announced to peers"),
            ];
            DOCS
        }
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    struct Undocumented {
        port: u16,
    }

    impl Settings for Undocumented {}

    #[test]
    fn header_lists_every_documented_field() {
        let header = header_for::<Documented>(Format::Toml).unwrap();
        assert!(header.starts_with("# Documented\n"));
        assert!(header.contains("# port      TCP port to listen on"));
        assert!(header.contains("# hostname  Name announced to peers"));
        assert!(header.lines().all(|l| l.starts_with('#')));
    }

    #[test]
    fn header_uses_format_comment_marker() {
        let json = header_for::<Documented>(Format::Json).unwrap();
        assert!(json.lines().all(|l| l.starts_with("//")));

        let ini = header_for::<Documented>(Format::Ini).unwrap();
        assert!(ini.lines().all(|l| l.starts_with(';')));

        let xml = header_for::<Documented>(Format::Xml).unwrap();
        assert!(xml.lines().all(|l| l.starts_with("<!--") && l.ends_with("-->")));
    }

    #[test]
    fn header_is_cached_per_type_and_format() {
        let a = header_for::<Documented>(Format::Yaml).unwrap();
        let b = header_for::<Documented>(Format::Yaml).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn undocumented_type_has_no_header() {
        assert!(header_for::<Undocumented>(Format::Toml).is_none());
    }

    #[test]
    fn inject_keeps_xml_declaration_first() {
        let out = inject(
            "<!-- h -->\n",
            "<?xml version=\"1.0\"?>\n<root/>",
            Format::Xml,
        );
        assert_eq!(out, "<?xml version=\"1.0\"?>\n<!-- h -->\n<root/>");
    }

    #[test]
    fn inject_separates_header_from_body() {
        assert_eq!(inject("# h\n", "a = 1\n", Format::Toml), "# h\n\na = 1\n");
    }

    #[test]
    fn short_type_name_strips_path_and_generics() {
        assert_eq!(short_type_name::<Documented>(), "Documented");
        assert_eq!(short_type_name::<Vec<u8>>(), "Vec");
    }
}
