use super::ConfigError;

/// Validated construction from a config struct.
///
/// Every stage in the crate is built through a plain config struct that lists
/// exactly the recognized fields; `try_new` validates all of them before any
/// runtime state exists.
pub trait KernelLifecycle: Sized {
    /// Config consumed by [`KernelLifecycle::try_new`].
    type Config;

    /// Validate `config` and build the stage.
    fn try_new(config: Self::Config) -> Result<Self, ConfigError>;

    /// Build one stage per config, failing on the first invalid one.
    fn try_new_all<I>(configs: I) -> Result<Vec<Self>, ConfigError>
    where
        I: IntoIterator<Item = Self::Config>,
    {
        configs.into_iter().map(Self::try_new).collect()
    }
}
