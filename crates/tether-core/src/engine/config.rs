use super::scoring_function::ScoringFunction;
use crate::core::models::model::Model;
use crate::core::restraints::restraint::Restraint;
use crate::core::utils::naming::unique_name;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Restraint '{restraint}' belongs to a different model")]
    ModelMismatch { restraint: String },
}

pub(crate) const DEFAULT_NAME: &str = "ScoringFunction%1%";

/// Assembles a [`ScoringFunction`].
///
/// The model may be left unset when at least one restraint is supplied; it is
/// then taken from the first restraint.
#[derive(Debug, Default)]
pub struct ScoringFunctionBuilder {
    model: Option<Arc<Model>>,
    name: Option<String>,
    restraints: Vec<Arc<dyn Restraint>>,
}

impl ScoringFunctionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn model(mut self, model: &Arc<Model>) -> Self {
        self.model = Some(Arc::clone(model));
        self
    }
    /// `%1%` is expanded to a unique counter.
    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }
    pub fn restraint(mut self, restraint: Arc<dyn Restraint>) -> Self {
        self.restraints.push(restraint);
        self
    }
    pub fn restraints<I>(mut self, restraints: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn Restraint>>,
    {
        self.restraints.extend(restraints);
        self
    }

    pub fn build(self) -> Result<ScoringFunction, ConfigError> {
        let model = self
            .model
            .or_else(|| self.restraints.first().map(|r| Arc::clone(r.model())))
            .ok_or(ConfigError::MissingParameter("model"))?;
        if let Some(foreign) = self
            .restraints
            .iter()
            .find(|r| !Arc::ptr_eq(r.model(), &model))
        {
            return Err(ConfigError::ModelMismatch {
                restraint: foreign.name().to_string(),
            });
        }
        let name = unique_name(self.name.as_deref().unwrap_or(DEFAULT_NAME));
        Ok(ScoringFunction::from_parts(name, model, self.restraints))
    }
}
