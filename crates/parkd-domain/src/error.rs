use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Parking spot not found: {0}")]
    SpotNotFound(String),

    #[error("Parking spot already exists: {0}")]
    SpotAlreadyExists(String),

    #[error("Parking spot is already occupied: {0}")]
    SpotAlreadyOccupied(String),

    #[error("Parking spot is already free: {0}")]
    SpotAlreadyFree(String),

    #[error("Invalid spot name: {0}")]
    InvalidSpotName(String),

    #[error("Invalid spot ID: {0}")]
    InvalidSpotId(String),

    #[error("Invalid device ID: {0}")]
    InvalidDeviceId(String),

    #[error("Device is not registered: {0}")]
    UnregisteredDevice(String),

    #[error("Device is already occupying a spot: {0}")]
    DeviceAlreadyOccupying(String),

    #[error("Device is not the occupant of this spot: {0}")]
    DeviceNotOccupant(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("Repository error: {0}")]
    RepositoryError(#[from] anyhow::Error),
}

pub type DomainResult<T> = Result<T, DomainError>;

/// Outcome class the transport layer translates to its own status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    Validation,
    Internal,
}

impl DomainError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::SpotNotFound(_) => ErrorKind::NotFound,

            DomainError::SpotAlreadyExists(_)
            | DomainError::SpotAlreadyOccupied(_)
            | DomainError::SpotAlreadyFree(_) => ErrorKind::Conflict,

            DomainError::InvalidSpotName(_)
            | DomainError::InvalidSpotId(_)
            | DomainError::InvalidDeviceId(_)
            | DomainError::UnregisteredDevice(_)
            | DomainError::DeviceAlreadyOccupying(_)
            | DomainError::DeviceNotOccupant(_)
            | DomainError::RateLimited(_) => ErrorKind::Validation,

            DomainError::RepositoryError(_) => ErrorKind::Internal,
        }
    }
}
