use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Invalid argument '{field}': {reason}")]
    InvalidArgument { field: String, reason: String },

    #[error("Seat {seat} on bus '{bus_id}' is occupied")]
    SeatOccupied { bus_id: String, seat: u32 },

    #[error("Seat {seat} is outside bus '{bus_id}' capacity of {seats}")]
    SeatOutOfRange { bus_id: String, seat: u32, seats: u32 },

    #[error("Bus '{bus_id}' not found")]
    BusNotFound { bus_id: String },

    #[error("Passenger {passenger} was not created by this registry")]
    UnknownPassenger { passenger: String },

    #[error("Passenger {passenger} is already registered on bus '{bus_id}'")]
    AlreadyRegistered { passenger: String, bus_id: String },

    #[error("Bus '{bus_id}' has no registered passengers")]
    NoPassengers { bus_id: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Argument,
    Booking,
    Lookup,
    Config,
    System,
}

impl RegistryError {
    pub fn invalid_argument(field: &str, reason: impl Into<String>) -> Self {
        RegistryError::InvalidArgument {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            RegistryError::InvalidArgument { .. } => ErrorCategory::Argument,
            RegistryError::SeatOccupied { .. }
            | RegistryError::SeatOutOfRange { .. }
            | RegistryError::AlreadyRegistered { .. } => ErrorCategory::Booking,
            RegistryError::BusNotFound { .. }
            | RegistryError::UnknownPassenger { .. }
            | RegistryError::NoPassengers { .. } => ErrorCategory::Lookup,
            RegistryError::ConfigError { .. } => ErrorCategory::Config,
            RegistryError::IoError(_) | RegistryError::SerializationError(_) => {
                ErrorCategory::System
            }
        }
    }

    /// Process exit code for the CLI.
    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::Config => 1,
            ErrorCategory::Argument => 2,
            ErrorCategory::Booking => 3,
            ErrorCategory::Lookup => 4,
            ErrorCategory::System => 5,
        }
    }
}

pub type Result<T> = std::result::Result<T, RegistryError>;
