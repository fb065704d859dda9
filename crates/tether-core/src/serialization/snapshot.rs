use super::error::SerializationError;
use crate::core::models::ids::{ParticleIndex, ParticleKey};
use crate::core::models::model::{Model, ParticleData};
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

/// A typed scalar, as stored in restraint parameters and model attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum ScalarValue {
    Float(f64),
    Int(i64),
    String(String),
}

/// The reconstructible state of one restraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestraintSnapshot {
    pub type_id: String,
    pub name: String,
    pub weight: f64,
    pub parameters: Vec<ScalarValue>,
    pub inputs: Vec<u64>,
}

impl RestraintSnapshot {
    fn malformed(&self, reason: String) -> SerializationError {
        SerializationError::MalformedSnapshot {
            type_id: self.type_id.clone(),
            reason,
        }
    }

    /// Checks the number of parameters and inputs a factory expects.
    pub fn check_shape(&self, parameters: usize, inputs: usize) -> Result<(), SerializationError> {
        if self.parameters.len() != parameters {
            return Err(self.malformed(format!(
                "expected {} parameters, found {}",
                parameters,
                self.parameters.len()
            )));
        }
        if self.inputs.len() != inputs {
            return Err(self.malformed(format!(
                "expected {} input particles, found {}",
                inputs,
                self.inputs.len()
            )));
        }
        Ok(())
    }

    pub fn float(&self, position: usize) -> Result<f64, SerializationError> {
        match self.parameters.get(position) {
            Some(ScalarValue::Float(value)) => Ok(*value),
            other => Err(self.malformed(format!(
                "parameter {} should be a float, found {:?}",
                position, other
            ))),
        }
    }

    pub fn int(&self, position: usize) -> Result<i64, SerializationError> {
        match self.parameters.get(position) {
            Some(ScalarValue::Int(value)) => Ok(*value),
            other => Err(self.malformed(format!(
                "parameter {} should be an int, found {:?}",
                position, other
            ))),
        }
    }

    pub fn string(&self, position: usize) -> Result<&str, SerializationError> {
        match self.parameters.get(position) {
            Some(ScalarValue::String(value)) => Ok(value),
            other => Err(self.malformed(format!(
                "parameter {} should be a string, found {:?}",
                position, other
            ))),
        }
    }

    /// Resolves every input id against `model`, in order.
    pub fn resolve_inputs(&self, model: &Model) -> Result<Vec<ParticleIndex>, SerializationError> {
        self.inputs
            .iter()
            .map(|&id| {
                model
                    .particle(id)
                    .map_err(|_| SerializationError::DanglingReference(id))
            })
            .collect()
    }
}

/// One member of a scoring function snapshot.
///
/// The first time a restraint instance is written it is emitted in full under
/// a session-local id; every later reference to the same instance is written
/// as a `Shared` marker carrying only that id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "record", rename_all = "snake_case")]
pub enum RestraintRecord {
    Instance {
        id: u32,
        snapshot: RestraintSnapshot,
    },
    Shared {
        id: u32,
    },
}

impl RestraintRecord {
    pub fn id(&self) -> u32 {
        match self {
            Self::Instance { id, .. } | Self::Shared { id } => *id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringFunctionSnapshot {
    pub type_id: String,
    pub name: String,
    pub members: Vec<RestraintRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeRecord {
    pub particle: u64,
    pub key: String,
    pub value: ScalarValue,
}

/// Particles (with their slot identities) and attribute values of a model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSnapshot {
    pub name: String,
    #[serde(default)]
    pub closed: bool,
    pub particles: SlotMap<ParticleKey, ParticleData>,
    pub attributes: Vec<AttributeRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> RestraintSnapshot {
        RestraintSnapshot {
            type_id: "tests::Example".to_string(),
            name: "example".to_string(),
            weight: 1.0,
            parameters: vec![
                ScalarValue::Float(2.5),
                ScalarValue::Int(3),
                ScalarValue::String("label".to_string()),
            ],
            inputs: vec![],
        }
    }

    #[test]
    fn typed_parameter_accessors_read_matching_kinds() {
        let snapshot = snapshot();
        assert_eq!(snapshot.float(0).unwrap(), 2.5);
        assert_eq!(snapshot.int(1).unwrap(), 3);
        assert_eq!(snapshot.string(2).unwrap(), "label");
    }

    #[test]
    fn typed_parameter_accessors_reject_wrong_kind_or_position() {
        let snapshot = snapshot();
        assert!(matches!(
            snapshot.float(1),
            Err(SerializationError::MalformedSnapshot { .. })
        ));
        assert!(matches!(
            snapshot.int(5),
            Err(SerializationError::MalformedSnapshot { .. })
        ));
    }

    #[test]
    fn check_shape_compares_parameter_and_input_counts() {
        let snapshot = snapshot();
        assert!(snapshot.check_shape(3, 0).is_ok());
        assert!(snapshot.check_shape(2, 0).is_err());
        assert!(snapshot.check_shape(3, 1).is_err());
    }

    #[test]
    fn resolve_inputs_reports_first_missing_id() {
        let model = Model::new("m");
        let p = model.add_particle("p").unwrap();
        let mut snapshot = snapshot();
        snapshot.inputs = vec![p.id(), p.id() + 1];
        assert!(matches!(
            snapshot.resolve_inputs(&model),
            Err(SerializationError::DanglingReference(id)) if id == p.id() + 1
        ));
    }

    #[test]
    fn scalar_values_encode_with_kind_tags() {
        let json = serde_json::to_string(&ScalarValue::Float(1.5)).unwrap();
        assert_eq!(json, r#"{"kind":"float","value":1.5}"#);
    }

    #[test]
    fn records_encode_with_record_tags() {
        let json = serde_json::to_string(&RestraintRecord::Shared { id: 4 }).unwrap();
        assert_eq!(json, r#"{"record":"shared","id":4}"#);
    }
}
