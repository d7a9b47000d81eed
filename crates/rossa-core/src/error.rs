//! Error types for the Rossa core library.

/// Errors that can occur while loading, expanding, or running a
/// parameter document.
///
/// All error variants are marked with `#[non_exhaustive]` to allow
/// adding new error types without breaking changes.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The document has no `main` loop.
    #[error("No main loop found")]
    MissingMainLoop,

    /// A loop level with several children has children that are loops themselves.
    #[error("Outer loops must not consist of parallel loops (at '{level}')")]
    ParallelOuterLoops {
        /// Name of the level holding the parallel loops
        level: String,
    },

    /// A loop level has neither child loops nor tests.
    #[error("No inner loops found below '{level}', the main loop needs at least one test")]
    NoInnerLoops {
        /// Name of the level without children
        level: String,
    },

    /// Members of one zip group have a different number of values.
    #[error("Mismatch in zip group '{group}': members have {lengths:?} values")]
    ZipLengthMismatch {
        /// Zip group name
        group: String,
        /// Value counts of the group members, in key order
        lengths: Vec<usize>,
    },

    /// A setup or teardown entry names a template that does not exist.
    #[error("Template '{name}' not found in parameters")]
    TemplateNotFound {
        /// Template name that was looked up
        name: String,
    },

    /// Document validation error
    #[error("Validation error: {message}")]
    Validation {
        /// Field or aspect that failed validation
        field: Option<String>,
        /// What went wrong
        message: String,
    },

    /// The document file extension is not one of the supported formats.
    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),

    /// A plugin requested by the document is not registered.
    #[error("Plugin not found: {name}")]
    PluginNotFound {
        /// Plugin name that was not found
        name: String,
    },

    /// A plugin failed while applying or measuring.
    #[error("Plugin '{plugin}' failed: {message}")]
    Plugin {
        /// Plugin name
        plugin: String,
        /// Human-readable error message
        message: String,
        /// Source error if available
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// I/O error (file operations)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// TOML deserialization error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Convenience `Result` type alias for Rossa operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns whether this error comes from the document itself.
    ///
    /// Document errors are fixed by editing the parameter file; all other
    /// errors come from the environment (files, plugins).
    pub fn is_document_error(&self) -> bool {
        match self {
            Error::MissingMainLoop => true,
            Error::ParallelOuterLoops { .. } => true,
            Error::NoInnerLoops { .. } => true,
            Error::ZipLengthMismatch { .. } => true,
            Error::TemplateNotFound { .. } => true,
            Error::Validation { .. } => true,
            Error::UnsupportedFormat(_) => false,
            Error::PluginNotFound { .. } => false,
            Error::Plugin { .. } => false,
            Error::Io(_) => false,
            Error::Serialization(_) => false,
            Error::Yaml(_) => false,
            Error::Toml(_) => false,
        }
    }

    /// Creates a new validation error.
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Error::Validation {
            field: None,
            message: message.into(),
        }
    }

    /// Creates a new validation error with a field name.
    pub fn validation_field<F, M>(field: F, message: M) -> Self
    where
        F: Into<String>,
        M: Into<String>,
    {
        Error::Validation {
            field: Some(field.into()),
            message: message.into(),
        }
    }

    /// Creates a new plugin error.
    pub fn plugin<P, M>(plugin: P, message: M) -> Self
    where
        P: Into<String>,
        M: Into<String>,
    {
        Error::Plugin {
            plugin: plugin.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new plugin error with a source error.
    pub fn plugin_with_source<P, M, E>(plugin: P, message: M, source: E) -> Self
    where
        P: Into<String>,
        M: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Plugin {
            plugin: plugin.into(),
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}
