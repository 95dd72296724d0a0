use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A source file submitted for execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteFile {
    /// File name; the server picks one when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// File contents.
    pub content: String,
    /// Content encoding understood by the server (`utf8`, `base64`, `hex`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
}

impl ExecuteFile {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            name: None,
            content: content.into(),
            encoding: None,
        }
    }

    pub fn named(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::new(content)
        }
    }
}

/// Body of `POST /execute`.
///
/// The client forwards this as-is. Nothing is validated locally; a request
/// the server does not accept comes back as [`ExecuteResponse::Rejected`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteRequest {
    /// Language name or alias.
    pub language: String,
    /// SemVer selector, `*` for the latest installed version.
    pub version: String,
    /// Files to write before running; the first one is the entry point.
    pub files: Vec<ExecuteFile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdin: Option<String>,
    /// Compile stage timeout in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compile_timeout: Option<i64>,
    /// Run stage timeout in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_timeout: Option<i64>,
    /// Compile stage memory limit in bytes, `-1` for no limit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compile_memory_limit: Option<i64>,
    /// Run stage memory limit in bytes, `-1` for no limit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_memory_limit: Option<i64>,
}

impl ExecuteRequest {
    pub fn new(
        language: impl Into<String>,
        version: impl Into<String>,
        files: Vec<ExecuteFile>,
    ) -> Self {
        Self {
            language: language.into(),
            version: version.into(),
            files,
            args: None,
            stdin: None,
            compile_timeout: None,
            run_timeout: None,
            compile_memory_limit: None,
            run_memory_limit: None,
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = Some(args);
        self
    }

    pub fn with_stdin(mut self, stdin: impl Into<String>) -> Self {
        self.stdin = Some(stdin.into());
        self
    }

    pub fn with_timeouts(mut self, compile_timeout: i64, run_timeout: i64) -> Self {
        self.compile_timeout = Some(compile_timeout);
        self.run_timeout = Some(run_timeout);
        self
    }

    pub fn with_memory_limits(mut self, compile_memory_limit: i64, run_memory_limit: i64) -> Self {
        self.compile_memory_limit = Some(compile_memory_limit);
        self.run_memory_limit = Some(run_memory_limit);
        self
    }
}

/// Output of one stage (compile or run) of an execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageResult {
    #[serde(default)]
    pub stdout: String,
    #[serde(default)]
    pub stderr: String,
    /// Exit code, `None` when the process was killed by a signal.
    #[serde(default)]
    pub code: Option<i64>,
    /// Signal name such as `SIGKILL`, if the process was killed.
    #[serde(default)]
    pub signal: Option<String>,
    /// Interleaved stdout and stderr. The outer `Option` records whether the
    /// key was present at all, so an explicit `null` survives re-encoding.
    #[serde(default, with = "explicit_null", skip_serializing_if = "Option::is_none")]
    pub output: Option<Option<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StageResult {
    /// Interleaved output, if the server sent a non-null one.
    pub fn output(&self) -> Option<&str> {
        self.output.as_ref().and_then(|output| output.as_deref())
    }
}

/// Result of a completed execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecuteResult {
    pub run: StageResult,
    /// Present only for languages with a compile stage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compile: Option<StageResult>,
    pub language: String,
    pub version: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Error body returned by the server for requests it refuses to run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiMessage {
    pub message: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// What `POST /execute` can answer with.
///
/// A refusal such as an unknown language is part of a well-formed response,
/// so it is data rather than an error. JSON of any other shape, e.g. an error
/// page from a proxy in front of the server, lands in `Other` untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExecuteResponse {
    Completed(ExecuteResult),
    Rejected(ApiMessage),
    Other(Value),
}

impl ExecuteResponse {
    pub fn completed(&self) -> Option<&ExecuteResult> {
        match self {
            ExecuteResponse::Completed(result) => Some(result),
            ExecuteResponse::Rejected(_) | ExecuteResponse::Other(_) => None,
        }
    }

    pub fn into_completed(self) -> Option<ExecuteResult> {
        match self {
            ExecuteResponse::Completed(result) => Some(result),
            ExecuteResponse::Rejected(_) | ExecuteResponse::Other(_) => None,
        }
    }
}

mod explicit_null {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S, T>(value: &Option<Option<T>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Serialize,
    {
        match value {
            Some(inner) => inner.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}
