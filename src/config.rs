use crate::error::{Error, Result};
use crate::executor::PanicStrategy;

const MIN_STACK_SIZE: usize = 64 * 1024;

/// Where the scheduler's worker thread comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadMode {
    /// Spawn and own a dedicated thread at construction.
    Owned,
    /// Wait for a caller to donate a thread via `run_on_current_thread`.
    Donated,
}

impl Default for ThreadMode {
    fn default() -> Self {
        ThreadMode::Owned
    }
}

impl ThreadMode {
    pub fn from_bind_own_thread(bind_own_thread: bool) -> Self {
        if bind_own_thread {
            ThreadMode::Owned
        } else {
            ThreadMode::Donated
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub thread_mode: ThreadMode,
    pub thread_name: String,
    pub stack_size: Option<usize>,
    pub panic_strategy: PanicStrategy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            thread_mode: ThreadMode::default(),
            thread_name: "sequential-worker".to_string(),
            stack_size: Some(2 * 1024 * 1024),
            panic_strategy: PanicStrategy::default(),
        }
    }
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    pub fn validate(&self) -> Result<()> {
        if self.thread_name.is_empty() {
            return Err(Error::config("thread_name must not be empty"));
        }
        if self.thread_name.contains('\0') {
            return Err(Error::config("thread_name must not contain NUL bytes"));
        }

        if let Some(size) = self.stack_size {
            if size < MIN_STACK_SIZE {
                return Err(Error::config(format!(
                    "stack_size must be at least {} bytes",
                    MIN_STACK_SIZE
                )));
            }
        }

        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn thread_mode(mut self, mode: ThreadMode) -> Self {
        self.config.thread_mode = mode;
        self
    }

    pub fn bind_own_thread(mut self, bind: bool) -> Self {
        self.config.thread_mode = ThreadMode::from_bind_own_thread(bind);
        self
    }

    pub fn thread_name<S: Into<String>>(mut self, name: S) -> Self {
        self.config.thread_name = name.into();
        self
    }

    pub fn stack_size(mut self, size: usize) -> Self {
        self.config.stack_size = Some(size);
        self
    }

    pub fn panic_strategy(mut self, strategy: PanicStrategy) -> Self {
        self.config.panic_strategy = strategy;
        self
    }

    pub fn build(self) -> Result<Config> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.thread_mode, ThreadMode::Owned);
        assert_eq!(config.panic_strategy, PanicStrategy::LogAndContinue);
    }

    #[test]
    fn test_builder() {
        let config = Config::builder()
            .bind_own_thread(false)
            .thread_name("ui-loop")
            .stack_size(256 * 1024)
            .panic_strategy(PanicStrategy::Isolate)
            .build()
            .unwrap();

        assert_eq!(config.thread_mode, ThreadMode::Donated);
        assert_eq!(config.thread_name, "ui-loop");
        assert_eq!(config.stack_size, Some(256 * 1024));
        assert_eq!(config.panic_strategy, PanicStrategy::Isolate);
    }

    #[test]
    fn test_rejects_bad_thread_name() {
        assert!(Config::builder().thread_name("").build().is_err());
        assert!(Config::builder().thread_name("a\0b").build().is_err());
    }

    #[test]
    fn test_rejects_tiny_stack() {
        let err = Config::builder().stack_size(1024).build().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
