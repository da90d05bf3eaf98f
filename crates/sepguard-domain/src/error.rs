use sepguard_policy::PolicyError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error("unknown test: {name}\nAvailable tests:\n{}", available.join("\n"))]
    UnknownCheck { name: String, available: Vec<String> },

    #[error("{check_id} needs the base policy, old policy, mapping file and public policy")]
    MissingCompatInputs { check_id: &'static str },
}
