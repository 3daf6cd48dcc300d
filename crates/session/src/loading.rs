use serde::Serialize;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    Primary,
    Fallback,
}

/// Where the session is in bringing the globe up.
///
/// While in `LoadingData { source }` the host is expected to fetch that
/// source and report back.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum LoadState {
    Idle,
    LoadingAssets,
    LoadingData { source: DataSource },
    Ready,
    Failed,
}

impl LoadState {
    pub fn is_terminal(self) -> bool {
        matches!(self, LoadState::Ready | LoadState::Failed)
    }

    pub fn requested_source(self) -> Option<DataSource> {
        match self {
            LoadState::LoadingData { source } => Some(source),
            _ => None,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum LoadInput {
    Start,
    AssetsLoaded,
    AssetsFailed,
    /// A payload parsed into at least one usable record.
    DataLoaded,
    /// Fetch failed, payload unparsable, or every record was dropped.
    DataFailed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    UnexpectedInput { state: LoadState, input: LoadInput },
    Disposed,
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::UnexpectedInput { state, input } => {
                write!(f, "load input {input:?} is not valid in state {state:?}")
            }
            LoadError::Disposed => write!(f, "session already disposed"),
        }
    }
}

impl std::error::Error for LoadError {}

/// The single transition function of the load state machine.
///
/// Primary data failure gets exactly one retry against the fallback source.
pub fn transition(state: LoadState, input: LoadInput) -> Result<LoadState, LoadError> {
    use LoadInput as I;
    use LoadState as S;

    let next = match (state, input) {
        (S::Idle, I::Start) => S::LoadingAssets,
        (S::LoadingAssets, I::AssetsLoaded) => S::LoadingData {
            source: DataSource::Primary,
        },
        (S::LoadingAssets, I::AssetsFailed) => S::Failed,
        (S::LoadingData { .. }, I::DataLoaded) => S::Ready,
        (
            S::LoadingData {
                source: DataSource::Primary,
            },
            I::DataFailed,
        ) => S::LoadingData {
            source: DataSource::Fallback,
        },
        (
            S::LoadingData {
                source: DataSource::Fallback,
            },
            I::DataFailed,
        ) => S::Failed,
        (state, input) => return Err(LoadError::UnexpectedInput { state, input }),
    };
    Ok(next)
}
