#[derive(thiserror::Error, Debug)]
pub enum ReadError {
    #[error("not found")]
    NotFound,
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error>),
}

#[derive(thiserror::Error, Debug)]
pub enum CreateError {
    #[error("conflict")]
    Conflict,
    #[error("parent not found")]
    ParentNotFound,
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error>),
}

impl From<UpdateError> for CreateError {
    fn from(value: UpdateError) -> Self {
        match value {
            UpdateError::NotFound => CreateError::ParentNotFound,
            UpdateError::Conflict => CreateError::Conflict,
            UpdateError::Storage(storage) => CreateError::Storage(storage),
            UpdateError::Other(other) => CreateError::Other(other),
        }
    }
}

impl From<ReadError> for CreateError {
    fn from(value: ReadError) -> Self {
        match value {
            ReadError::NotFound => CreateError::ParentNotFound,
            ReadError::Storage(storage) => CreateError::Storage(storage),
            ReadError::Other(other) => CreateError::Other(other),
        }
    }
}

impl From<DeleteError> for CreateError {
    fn from(value: DeleteError) -> Self {
        match value {
            DeleteError::NotFound => CreateError::ParentNotFound,
            DeleteError::Completed => CreateError::Conflict,
            DeleteError::Storage(storage) => CreateError::Storage(storage),
            DeleteError::Other(other) => CreateError::Other(other),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum UpdateError {
    #[error("not found")]
    NotFound,
    #[error("conflict")]
    Conflict,
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error>),
}

impl From<ReadError> for UpdateError {
    fn from(value: ReadError) -> Self {
        match value {
            ReadError::NotFound => UpdateError::NotFound,
            ReadError::Storage(storage) => UpdateError::Storage(storage),
            ReadError::Other(other) => UpdateError::Other(other),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum DeleteError {
    #[error("not found")]
    NotFound,
    #[error("workout already completed")]
    Completed,
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error>),
}

impl From<ReadError> for DeleteError {
    fn from(value: ReadError) -> Self {
        match value {
            ReadError::NotFound => DeleteError::NotFound,
            ReadError::Storage(storage) => DeleteError::Storage(storage),
            ReadError::Other(other) => DeleteError::Other(other),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid document: {0}")]
    Serialization(String),
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error>),
}

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("{0} already exists")]
    Conflict(String),
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error>),
}
