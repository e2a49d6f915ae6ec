//! # Evidence Report
//!
//! Serializable snapshot of a prepared document: host context, and per object
//! the collected criteria, cached error and scan diagnostics.

use crate::document::Document;
use crate::object::TestObject;
use crate::sources::SourceKind;
use crate::types::{EvaluationCriteria, ScanDiagnostics};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Write;

#[derive(Debug, Clone, Serialize)]
pub struct EvidenceReport {
    pub scan_id: String,
    pub host: HostContext,
    pub generated_at: DateTime<Utc>,
    pub objects: Vec<ObjectEvidence>,
}

/// Host the evidence was collected on
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostContext {
    pub hostname: String,
    /// Operating system and architecture
    pub os_info: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ObjectEvidence {
    pub object: String,
    pub kind: Option<SourceKind>,
    pub chain: bool,
    pub prepared: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub criteria: Vec<EvaluationCriteria>,
    #[serde(skip_serializing_if = "ScanDiagnostics::is_clean")]
    pub diagnostics: ScanDiagnostics,
}

impl HostContext {
    pub fn from_system() -> Self {
        Self {
            hostname: hostname::get()
                .unwrap_or_else(|_| std::ffi::OsString::from("unknown"))
                .to_string_lossy()
                .to_string(),
            os_info: format!("{} {}", std::env::consts::OS, std::env::consts::ARCH),
        }
    }

    pub fn new(hostname: impl Into<String>, os_info: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            os_info: os_info.into(),
        }
    }
}

impl From<&TestObject> for ObjectEvidence {
    fn from(object: &TestObject) -> Self {
        Self {
            object: object.identifier().to_string(),
            kind: object.kind(),
            chain: object.is_chain(),
            prepared: object.is_prepared(),
            error: object.last_error().map(|err| err.to_string()),
            criteria: object.criteria(),
            diagnostics: object.diagnostics(),
        }
    }
}

impl EvidenceReport {
    pub fn from_document(document: &Document) -> Self {
        Self::with_host(document, HostContext::from_system())
    }

    pub fn with_host(document: &Document, host: HostContext) -> Self {
        Self {
            scan_id: uuid::Uuid::new_v4().to_string(),
            host,
            generated_at: Utc::now(),
            objects: document.objects.iter().map(ObjectEvidence::from).collect(),
        }
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn failed_objects(&self) -> impl Iterator<Item = &ObjectEvidence> {
        self.objects.iter().filter(|o| o.error.is_some())
    }

    pub fn total_criteria(&self) -> usize {
        self.objects.iter().map(|o| o.criteria.len()).sum()
    }

    /// Human readable summary, one line per object
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Scan {} on {} ({}) at {}",
            self.scan_id,
            self.host.hostname,
            self.host.os_info,
            self.generated_at.to_rfc3339()
        );

        for object in &self.objects {
            let kind = object.kind.map(|k| k.as_str()).unwrap_or("none");
            let status = match (&object.error, object.chain) {
                (Some(err), _) => format!("FAILED: {}", err),
                (None, true) => "chain member".to_string(),
                (None, false) => format!("{} criteria", object.criteria.len()),
            };
            let _ = writeln!(out, "  {} [{}] {}", object.object, kind, status);
            if !object.diagnostics.is_clean() {
                let _ = writeln!(
                    out,
                    "    {} path(s) skipped during scan",
                    object.diagnostics.total()
                );
            }
        }

        let _ = write!(
            out,
            "{} object(s), {} criteria, {} failed",
            self.objects.len(),
            self.total_criteria(),
            self.failed_objects().count()
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScribeConfig;
    use crate::inventory::StaticPackageInventory;

    fn prepared_document() -> Document {
        let mut document = Document::from_json_str(
            r#"{"objects":[
                {"object":"lit","raw":{"identifiers":[{"identifier":"policy","value":"v2"}]}},
                {"object":"member","raw":{"identifiers":[{"identifier":"x","value":"1"}],"chain":true}}
            ]}"#,
        )
        .unwrap();
        document
            .run(&ScribeConfig::default(), &StaticPackageInventory::new())
            .unwrap();
        document
    }

    #[test]
    fn test_report_json_shape() {
        let report = EvidenceReport::with_host(
            &prepared_document(),
            HostContext::new("testhost", "linux x86_64"),
        );
        let value: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();

        assert_eq!(value["host"]["hostname"], "testhost");
        assert_eq!(value["objects"][0]["object"], "lit");
        assert_eq!(value["objects"][0]["kind"], "raw");
        assert_eq!(value["objects"][0]["criteria"][0]["test_value"], "v2");
        assert!(value["objects"][0].get("error").is_none());
        assert!(value["objects"][0].get("diagnostics").is_none());
        assert_eq!(value["objects"][1]["chain"], true);
        assert!(uuid::Uuid::parse_str(&report.scan_id).is_ok());
    }

    #[test]
    fn test_summary() {
        let report = EvidenceReport::with_host(
            &prepared_document(),
            HostContext::new("testhost", "linux x86_64"),
        );
        let summary = report.summary();
        assert!(summary.contains("lit [raw] 1 criteria"));
        assert!(summary.contains("member [raw] chain member"));
        assert!(summary.ends_with("2 object(s), 2 criteria, 0 failed"));
    }

    #[test]
    fn test_host_from_system() {
        let host = HostContext::from_system();
        assert!(!host.hostname.is_empty());
        assert!(host.os_info.contains(std::env::consts::OS));
    }
}
