use camino::Utf8PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AprioriError {
    #[error("failed to start {program}: {message}")]
    Spawn { program: Utf8PathBuf, message: String },

    #[error("io error talking to {program}: {message}")]
    Io { program: Utf8PathBuf, message: String },

    /// The miner exited with a status other than success or "no frequent itemsets".
    #[error("{program} exited with status {code}")]
    ExitStatus { program: Utf8PathBuf, code: i32 },

    #[error("{program} was terminated by a signal")]
    Killed { program: Utf8PathBuf },

    #[error("rule cache {path}: {message}")]
    Cache { path: Utf8PathBuf, message: String },
}
