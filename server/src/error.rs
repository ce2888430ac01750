pub trait ErrorKind {
    fn kind(&self) -> &'static str;
}

impl ErrorKind for argon2::password_hash::Error {
    fn kind(&self) -> &'static str {
        match self {
            Self::Password => "InvalidPassword",
            Self::Crypto => "CryptoError",
            Self::Algorithm | Self::Version => "UnsupportedPasswordHash",
            Self::SaltInvalid(_) => "InvalidSalt",
            // Everything else means a stored PHC string that doesn't parse
            _ => "MalformedPasswordHash",
        }
    }
}

impl ErrorKind for diesel::result::DatabaseErrorKind {
    fn kind(&self) -> &'static str {
        match self {
            Self::CheckViolation => "CheckViolation",
            Self::ForeignKeyViolation => "ForeignKeyViolation",
            Self::NotNullViolation => "NotNullViolation",
            Self::UniqueViolation => "UniqueViolation",
            _ => "UnknownDatabaseError",
        }
    }
}

impl ErrorKind for diesel::result::Error {
    fn kind(&self) -> &'static str {
        match self {
            Self::DatabaseError(err, _) => err.kind(),
            Self::DeserializationError(_) => "DeserializationError",
            Self::NotFound => "NotFound",
            Self::QueryBuilderError(_) => "QueryBuilderError",
            Self::RollbackTransaction => "RollbackTransaction",
            Self::SerializationError(_) => "SerializationError",
            _ => "UnknownQueryError",
        }
    }
}

impl ErrorKind for crate::api::ApiError {
    fn kind(&self) -> &'static str {
        match self {
            Self::AlreadyExists(_) => "AlreadyExists",
            Self::FailedConnection(_) => "FailedConnection",
            Self::FailedQuery(err) => err.kind(),
            Self::FormRejection(_) => "FormRejection",
            Self::NotFound(_) => "NotFound",
            Self::Password(err) => err.kind(),
            Self::PathRejection(_) => "PathRejection",
            Self::QueryRejection(_) => "QueryRejection",
        }
    }
}
