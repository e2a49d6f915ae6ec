//! # Test Objects
//!
//! A test object pairs an identifier with exactly one source check and owns
//! its lifecycle: validate, mark chain, fire chains, prepare once, query.

pub mod error;

pub use error::ObjectError;

use crate::logging::codes;
use crate::sources::{
    FileContentSource, FileNameSource, GenericSource, ObjectResolver, PackageSource,
    PrepareContext, RawSource, SourceKind,
};
use crate::types::{EvaluationCriteria, ScanDiagnostics, Variable};
use crate::{log_debug, log_error};
use serde::Deserialize;
use std::sync::Arc;

/// Active source check of an object
#[derive(Debug, Clone, PartialEq)]
pub enum SourceCheck {
    Package(PackageSource),
    FileContent(FileContentSource),
    FileName(FileNameSource),
    Raw(RawSource),
}

impl SourceCheck {
    pub fn kind(&self) -> SourceKind {
        self.as_source().kind()
    }

    pub fn as_source(&self) -> &dyn GenericSource {
        match self {
            SourceCheck::Package(source) => source,
            SourceCheck::FileContent(source) => source,
            SourceCheck::FileName(source) => source,
            SourceCheck::Raw(source) => source,
        }
    }

    pub fn as_source_mut(&mut self) -> &mut dyn GenericSource {
        match self {
            SourceCheck::Package(source) => source,
            SourceCheck::FileContent(source) => source,
            SourceCheck::FileName(source) => source,
            SourceCheck::Raw(source) => source,
        }
    }
}

impl From<PackageSource> for SourceCheck {
    fn from(source: PackageSource) -> Self {
        SourceCheck::Package(source)
    }
}

impl From<FileContentSource> for SourceCheck {
    fn from(source: FileContentSource) -> Self {
        SourceCheck::FileContent(source)
    }
}

impl From<FileNameSource> for SourceCheck {
    fn from(source: FileNameSource) -> Self {
        SourceCheck::FileName(source)
    }
}

impl From<RawSource> for SourceCheck {
    fn from(source: RawSource) -> Self {
        SourceCheck::Raw(source)
    }
}

/// Object as written in a document
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ObjectDefinition {
    object: String,
    package: Option<PackageSource>,
    filecontent: Option<FileContentSource>,
    filename: Option<FileNameSource>,
    raw: Option<RawSource>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(from = "ObjectDefinition")]
pub struct TestObject {
    identifier: String,
    source: Option<SourceCheck>,
    /// Every kind populated in the definition, in precedence order
    declared: Vec<SourceKind>,
    is_chain: bool,
    /// Document variables already substituted into the source
    expanded: bool,
    prepared: bool,
    last_error: Option<Arc<ObjectError>>,
}

impl From<ObjectDefinition> for TestObject {
    fn from(definition: ObjectDefinition) -> Self {
        let mut populated: Vec<SourceCheck> = Vec::new();
        if let Some(source) = definition.package.filter(PackageSource::is_populated) {
            populated.push(source.into());
        }
        if let Some(source) = definition.filecontent.filter(FileContentSource::is_populated) {
            populated.push(source.into());
        }
        if let Some(source) = definition.filename.filter(FileNameSource::is_populated) {
            populated.push(source.into());
        }
        if let Some(source) = definition.raw.filter(RawSource::is_populated) {
            populated.push(source.into());
        }

        let declared = populated.iter().map(SourceCheck::kind).collect();
        Self {
            identifier: definition.object,
            source: populated.into_iter().next(),
            declared,
            is_chain: false,
            expanded: false,
            prepared: false,
            last_error: None,
        }
    }
}

impl TestObject {
    pub fn new(identifier: impl Into<String>, source: impl Into<SourceCheck>) -> Self {
        let source = source.into();
        Self {
            identifier: identifier.into(),
            declared: vec![source.kind()],
            source: Some(source),
            is_chain: false,
            expanded: false,
            prepared: false,
            last_error: None,
        }
    }

    /// Object without any source check; never valid
    pub fn empty(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            source: None,
            declared: Vec::new(),
            is_chain: false,
            expanded: false,
            prepared: false,
            last_error: None,
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Active check, by precedence Package, FileContent, FileName, Raw
    pub fn source(&self) -> Option<&SourceCheck> {
        self.source.as_ref()
    }

    pub fn kind(&self) -> Option<SourceKind> {
        self.source.as_ref().map(SourceCheck::kind)
    }

    pub fn declared(&self) -> &[SourceKind] {
        &self.declared
    }

    pub fn is_chain(&self) -> bool {
        self.is_chain
    }

    pub fn is_prepared(&self) -> bool {
        self.prepared
    }

    /// Result of the most recent preparation attempt
    pub fn last_error(&self) -> Option<&Arc<ObjectError>> {
        self.last_error.as_ref()
    }

    fn declares_chain(&self) -> bool {
        self.source
            .as_ref()
            .is_some_and(|check| check.as_source().is_chain())
    }

    /// Check identifier, source uniqueness, source configuration and chain references
    pub fn validate(&self, resolver: &dyn ObjectResolver) -> Result<(), ObjectError> {
        if self.identifier.is_empty() {
            return Err(ObjectError::MissingIdentifier);
        }

        let check = match (&self.source, self.declared.len()) {
            (Some(check), 1) => check,
            _ => {
                return Err(ObjectError::NoValidInterface {
                    object: self.identifier.clone(),
                    declared: self.declared.clone(),
                })
            }
        };

        let source = check.as_source();
        source.validate().map_err(|source| ObjectError::Source {
            object: self.identifier.clone(),
            source,
        })?;

        for reference in source.chain_dependencies() {
            match resolver.find_object(reference) {
                None => {
                    return Err(ObjectError::UnresolvedChain {
                        object: self.identifier.clone(),
                        reference: reference.clone(),
                    })
                }
                Some(target) if !target.declares_chain() => {
                    return Err(ObjectError::NotChainMember {
                        object: self.identifier.clone(),
                        reference: reference.clone(),
                    })
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    /// Substitute document variables into the active source, once
    pub fn expand_variables(&mut self, variables: &[Variable]) {
        if self.expanded {
            return;
        }
        self.expanded = true;
        if let Some(check) = self.source.as_mut() {
            check.as_source_mut().expand_variables(variables);
        }
    }

    pub fn mark_chain(&mut self) {
        self.is_chain = self.declares_chain();
    }

    /// Evidence of every chain dependency, without modifying this object
    pub fn chain_criteria(&self, resolver: &dyn ObjectResolver) -> Vec<EvaluationCriteria> {
        match &self.source {
            Some(check) => check.as_source().fire_chains(resolver),
            None => Vec::new(),
        }
    }

    pub fn merge_chain_criteria(&mut self, extra: Vec<EvaluationCriteria>) {
        if extra.is_empty() {
            return;
        }
        if let Some(check) = self.source.as_mut() {
            check.as_source_mut().merge_criteria(extra);
        }
    }

    /// Resolve and merge chain dependencies through an external resolver
    pub fn fire_chains(&mut self, resolver: &dyn ObjectResolver) {
        let extra = self.chain_criteria(resolver);
        self.merge_chain_criteria(extra);
    }

    /// Prepare the active source once
    ///
    /// Chain members and already prepared objects return `Ok` without doing
    /// anything. A failure is cached and returned only by the attempt that
    /// produced it; later calls consult [`TestObject::last_error`].
    pub fn prepare(&mut self, context: &PrepareContext<'_>) -> Result<(), Arc<ObjectError>> {
        if self.is_chain || self.prepared {
            return Ok(());
        }
        self.prepared = true;
        self.expand_variables(context.variables);

        let result = match self.source.as_mut() {
            None => Err(ObjectError::NoInterface {
                object: self.identifier.clone(),
            }),
            Some(check) => check
                .as_source_mut()
                .prepare(context)
                .map_err(|source| ObjectError::Source {
                    object: self.identifier.clone(),
                    source,
                }),
        };

        match result {
            Ok(()) => {
                log_debug!("Object prepared", "object" => &self.identifier);
                self.last_error = None;
                Ok(())
            }
            Err(err) => {
                log_error!(
                    codes::lifecycle::PREPARATION_FAILED,
                    "Object preparation failed",
                    "object" => &self.identifier,
                    "error" => &err
                );
                let err = Arc::new(err);
                self.last_error = Some(Arc::clone(&err));
                Err(err)
            }
        }
    }

    /// Own evidence followed by merged chain evidence
    pub fn criteria(&self) -> Vec<EvaluationCriteria> {
        self.source
            .as_ref()
            .map(|check| check.as_source().criteria())
            .unwrap_or_default()
    }

    pub fn diagnostics(&self) -> ScanDiagnostics {
        self.source
            .as_ref()
            .map(|check| check.as_source().diagnostics())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScribeConfig;
    use crate::inventory::StaticPackageInventory;
    use crate::sources::{RawIdentifier, SourceError};
    use assert_matches::assert_matches;
    use std::fs;
    use tempfile::TempDir;

    struct Objects(Vec<TestObject>);

    impl ObjectResolver for Objects {
        fn find_object(&self, identifier: &str) -> Option<&TestObject> {
            self.0.iter().find(|o| o.identifier() == identifier)
        }

        fn variables(&self) -> &[Variable] {
            &[]
        }
    }

    fn raw(identifier: &str, value: &str) -> RawSource {
        RawSource::new(vec![RawIdentifier::new(identifier, value)])
    }

    #[test]
    fn test_precedence_and_declared() {
        let object: TestObject = serde_json::from_str(
            r#"{"object":"both",
                "raw":{"identifiers":[{"identifier":"a","value":"1"}]},
                "package":{"name":"openssl"}}"#,
        )
        .unwrap();

        assert_eq!(object.kind(), Some(SourceKind::Package));
        assert_eq!(object.declared(), [SourceKind::Package, SourceKind::Raw]);

        let err = object.validate(&Objects(Vec::new())).unwrap_err();
        assert_matches!(err, ObjectError::NoValidInterface { .. });
        assert_eq!(
            err.to_string(),
            "both: no valid source interface (declared package, raw)"
        );
    }

    #[test]
    fn test_empty_variant_not_populated() {
        let object: TestObject =
            serde_json::from_str(r#"{"object":"x","filecontent":{"path":""}}"#).unwrap();
        assert!(object.source().is_none());

        let err = object.validate(&Objects(Vec::new())).unwrap_err();
        assert_eq!(err.to_string(), "x: no valid source interface (none declared)");
    }

    #[test]
    fn test_missing_identifier() {
        let object = TestObject::new("", raw("a", "1"));
        assert_eq!(
            object.validate(&Objects(Vec::new())).unwrap_err().to_string(),
            "an object in document has no identifier"
        );
    }

    #[test]
    fn test_source_error_wrapped() {
        let object = TestObject::new("sshd", FileContentSource::new("/etc", "f", "("));
        let err = object.validate(&Objects(Vec::new())).unwrap_err();
        assert_matches!(
            &err,
            ObjectError::Source { object, source: SourceError::InvalidPattern { .. } } if object == "sshd"
        );
        assert_eq!(err.object(), Some("sshd"));
    }

    #[test]
    fn test_chain_references_validated() {
        let resolver = Objects(vec![
            TestObject::new("member", raw("policy", "v2").as_chain()),
            TestObject::new("plain", raw("policy", "v1")),
        ]);

        let ok = TestObject::new("keys", FileNameSource::new("/etc", "x").with_import("member"));
        assert!(ok.validate(&resolver).is_ok());

        let missing = TestObject::new("keys", FileNameSource::new("/etc", "x").with_import("nope"));
        assert_matches!(
            missing.validate(&resolver),
            Err(ObjectError::UnresolvedChain { reference, .. }) if reference == "nope"
        );

        let not_member =
            TestObject::new("keys", FileNameSource::new("/etc", "x").with_import("plain"));
        assert_matches!(
            not_member.validate(&resolver),
            Err(ObjectError::NotChainMember { .. })
        );
    }

    #[test]
    fn test_fire_chains_merges_member_evidence() {
        let resolver = Objects(vec![TestObject::new("member", raw("policy", "v2").as_chain())]);
        let mut object =
            TestObject::new("keys", FileNameSource::new("/etc", "x").with_import("member"));

        object.fire_chains(&resolver);
        assert_eq!(object.criteria(), vec![EvaluationCriteria::new("policy", "v2")]);
    }

    #[test]
    fn test_chain_member_never_prepared() {
        let config = ScribeConfig::default();
        let inventory = StaticPackageInventory::new();
        let context = PrepareContext::new(&config, &inventory, &[]);

        let mut object = TestObject::new("member", FileContentSource::new("/nonexistent", "(", "x"));
        object.is_chain = true;
        assert!(object.prepare(&context).is_ok());
        assert!(!object.is_prepared());
        assert!(object.last_error().is_none());
    }

    #[test]
    fn test_prepare_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("app.conf");
        fs::write(&file, "key=one\n").unwrap();

        let config = ScribeConfig::default();
        let inventory = StaticPackageInventory::new();
        let variables = vec![Variable::new("root", tmp.path().to_string_lossy())];
        let context = PrepareContext::new(&config, &inventory, &variables);

        let mut object =
            TestObject::new("app", FileContentSource::new("${root}", "app", r"^key=(\w+)"));
        object.prepare(&context).unwrap();
        let first = object.criteria();
        assert_eq!(first.len(), 1);

        // Changes on disk are not observed by a second call
        fs::write(&file, "key=one\nkey=two\n").unwrap();
        object.prepare(&context).unwrap();
        assert_eq!(object.criteria(), first);
        assert!(object.is_prepared());
    }

    #[test]
    fn test_failure_cached_and_returned_once() {
        let config = ScribeConfig::default();
        let context_inventory = crate::inventory::CommandPackageInventory::new(
            crate::inventory::CommandExecutor::new(),
        );
        let context = PrepareContext::new(&config, &context_inventory, &[]);

        let mut object = TestObject::new("openssl", PackageSource::new("openssl"));
        let err = object.prepare(&context).unwrap_err();
        assert!(err.to_string().starts_with("openssl: "));

        assert!(object.prepare(&context).is_ok());
        assert_matches!(
            object.last_error().map(|e| e.as_ref()),
            Some(ObjectError::Source { .. })
        );
    }

    #[test]
    fn test_prepare_without_interface() {
        let config = ScribeConfig::default();
        let inventory = StaticPackageInventory::new();
        let context = PrepareContext::new(&config, &inventory, &[]);

        let mut object = TestObject::empty("x");
        let err = object.prepare(&context).unwrap_err();
        assert_eq!(err.to_string(), "x: object has no valid interface");
        assert!(object.criteria().is_empty());
    }

    #[test]
    fn test_variables_expanded_once() {
        let mut object = TestObject::new("lit", raw("policy", "${ver}"));
        object.expand_variables(&[Variable::new("ver", "${next}")]);
        object.expand_variables(&[Variable::new("next", "v3")]);
        assert_eq!(object.criteria(), vec![EvaluationCriteria::new("policy", "${next}")]);

        // Preparation reuses the earlier expansion
        let config = ScribeConfig::default();
        let inventory = StaticPackageInventory::new();
        let variables = vec![Variable::new("next", "v4")];
        object.prepare(&PrepareContext::new(&config, &inventory, &variables)).unwrap();
        assert_eq!(object.criteria(), vec![EvaluationCriteria::new("policy", "${next}")]);
    }

    #[test]
    fn test_mark_chain() {
        let mut member = TestObject::new("member", raw("a", "1").as_chain());
        assert!(!member.is_chain());
        member.mark_chain();
        assert!(member.is_chain());
    }
}
