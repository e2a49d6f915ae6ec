//! # Document
//!
//! A document owns the variable set and every test object. It resolves chain
//! references between objects and drives preparation, serially or across
//! scoped worker threads.

pub mod error;

pub use error::DocumentError;

use crate::config::ScribeConfig;
use crate::inventory::PackageInventory;
use crate::logging::codes;
use crate::object::TestObject;
use crate::sources::{ObjectResolver, PrepareContext};
use crate::types::{EvaluationCriteria, Variable};
use crate::{log_debug, log_error, log_info};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::thread;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Document {
    pub variables: Vec<Variable>,
    pub objects: Vec<TestObject>,

    #[serde(skip)]
    chains_fired: bool,
}

/// One object that failed preparation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectFailure {
    pub object: String,
    pub message: String,
}

/// Outcome of a document preparation pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PreparationSummary {
    pub prepared: usize,
    pub skipped_chain: usize,
    pub failed: Vec<ObjectFailure>,
}

impl PreparationSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    fn merge(&mut self, other: PreparationSummary) {
        self.prepared += other.prepared;
        self.skipped_chain += other.skipped_chain;
        self.failed.extend(other.failed);
    }
}

impl Document {
    pub fn new(variables: Vec<Variable>, objects: Vec<TestObject>) -> Self {
        Self {
            variables,
            objects,
            chains_fired: false,
        }
    }

    pub fn from_json_str(content: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let document = Self::from_json_str(&content)?;
        log_debug!(
            "Document loaded",
            "path" => path.display(),
            "objects" => document.objects.len(),
            "variables" => document.variables.len()
        );
        Ok(document)
    }

    pub fn object(&self, identifier: &str) -> Option<&TestObject> {
        self.objects.iter().find(|o| o.identifier() == identifier)
    }

    pub fn criteria(&self, identifier: &str) -> Option<Vec<EvaluationCriteria>> {
        self.object(identifier).map(TestObject::criteria)
    }

    /// Substitute document variables into every object, chain members included
    fn expand_variables(&mut self) {
        for object in &mut self.objects {
            object.expand_variables(&self.variables);
        }
    }

    /// Validate every object, reject duplicate identifiers and mark chain members
    pub fn validate(&mut self) -> Result<(), DocumentError> {
        self.expand_variables();
        for object in &self.objects {
            if let Err(err) = object.validate(&*self) {
                log_error!(
                    codes::lifecycle::VALIDATION_FAILED,
                    "Object validation failed",
                    "error" => &err
                );
                return Err(err.into());
            }
        }

        let mut seen = HashSet::new();
        for object in &self.objects {
            if !seen.insert(object.identifier()) {
                return Err(DocumentError::DuplicateObject {
                    object: object.identifier().to_string(),
                });
            }
        }

        for object in &mut self.objects {
            object.mark_chain();
        }
        Ok(())
    }

    /// Merge chain member evidence into every importing object
    ///
    /// Evidence is collected from the unmodified objects first and merged
    /// afterwards, so import order never affects the result. Runs once.
    pub fn fire_chains(&mut self) {
        if self.chains_fired {
            return;
        }
        self.chains_fired = true;
        self.expand_variables();

        let resolver: &Self = self;
        let collected: Vec<Vec<EvaluationCriteria>> = resolver
            .objects
            .iter()
            .map(|object| object.chain_criteria(resolver))
            .collect();

        for (object, extra) in self.objects.iter_mut().zip(collected) {
            object.merge_chain_criteria(extra);
        }
    }

    /// Fire chains and prepare every object
    ///
    /// Individual object failures are reported in the summary and cached on
    /// the object; they never abort the rest of the document.
    pub fn prepare(
        &mut self,
        config: &ScribeConfig,
        inventory: &dyn PackageInventory,
    ) -> Result<PreparationSummary, DocumentError> {
        self.fire_chains();

        let context = PrepareContext::new(config, inventory, &self.variables);
        let objects = &mut self.objects;
        let threads = config.max_threads.min(objects.len()).max(1);

        log_info!(
            "Preparing document",
            "objects" => objects.len(),
            "threads" => threads,
            "mode" => format!("{:?}", config.traversal_mode)
        );

        if threads == 1 {
            return Ok(prepare_objects(objects, &context));
        }

        let chunk_size = (objects.len() + threads - 1) / threads;
        let mut summary = PreparationSummary::default();
        let mut panicked = None;

        thread::scope(|scope| {
            let handles: Vec<_> = objects
                .chunks_mut(chunk_size)
                .map(|chunk| scope.spawn(move || prepare_objects(chunk, &context)))
                .collect();

            for (worker, handle) in handles.into_iter().enumerate() {
                match handle.join() {
                    Ok(partial) => summary.merge(partial),
                    Err(_) => {
                        log_error!(
                            codes::lifecycle::WORKER_PANICKED,
                            "Preparation worker panicked",
                            "worker" => worker
                        );
                        panicked.get_or_insert(worker);
                    }
                }
            }
        });

        match panicked {
            Some(worker) => Err(DocumentError::WorkerPanicked { worker }),
            None => Ok(summary),
        }
    }

    /// Validate then prepare
    pub fn run(
        &mut self,
        config: &ScribeConfig,
        inventory: &dyn PackageInventory,
    ) -> Result<PreparationSummary, DocumentError> {
        self.validate()?;
        self.prepare(config, inventory)
    }
}

impl ObjectResolver for Document {
    fn find_object(&self, identifier: &str) -> Option<&TestObject> {
        self.object(identifier)
    }

    fn variables(&self) -> &[Variable] {
        &self.variables
    }
}

fn prepare_objects(objects: &mut [TestObject], context: &PrepareContext<'_>) -> PreparationSummary {
    let mut summary = PreparationSummary::default();
    for object in objects {
        if object.is_chain() {
            summary.skipped_chain += 1;
            continue;
        }
        if object.is_prepared() {
            continue;
        }
        match object.prepare(context) {
            Ok(()) => summary.prepared += 1,
            Err(err) => summary.failed.push(ObjectFailure {
                object: object.identifier().to_string(),
                message: err.to_string(),
            }),
        }
    }
    summary
}
