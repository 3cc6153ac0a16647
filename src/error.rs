pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("a worker thread is already bound to this scheduler")]
    AlreadyBound,

    #[error("scheduler has been disposed")]
    Disposed,

    #[error("scheduler does not own its worker thread")]
    NotOwned,

    #[error("cannot join the worker thread from the worker thread itself")]
    JoinFromWorker,

    #[error("config error: {0}")]
    Config(String),

    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("worker panic: {0}")]
    WorkerPanic(String),

    #[error("task failed: {0}")]
    TaskFailed(String),

    #[error("task was cancelled before it started")]
    Cancelled,

    #[error("task was dropped without being executed")]
    Abandoned,

    #[error("timed out waiting for task completion")]
    Timeout,
}

impl Error {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    pub fn task_failed<S: Into<String>>(msg: S) -> Self {
        Error::TaskFailed(msg.into())
    }

    /// Whether this error reports a lifecycle precondition violated by the caller.
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            Error::AlreadyBound | Error::Disposed | Error::NotOwned | Error::JoinFromWorker
        )
    }
}
