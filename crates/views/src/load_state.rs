use shared::error::ApiError;

/// Lifecycle of one fetch as seen by a screen.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState<T> {
    Idle,
    Loading,
    Loaded(T),
    Failed(ApiError),
}

impl<T> Default for LoadState<T> {
    fn default() -> Self {
        Self::Idle
    }
}

impl<T> LoadState<T> {
    pub fn start(&mut self) {
        *self = Self::Loading;
    }

    pub fn finish<E: Into<ApiError>>(&mut self, outcome: Result<T, E>) {
        *self = match outcome {
            Ok(value) => Self::Loaded(value),
            Err(err) => Self::Failed(err.into()),
        };
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn loaded(&self) -> Option<&T> {
        match self {
            Self::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ApiError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::error::{ApiException, FailureKind};

    #[test]
    fn failed_load_keeps_no_data() {
        let mut state: LoadState<Vec<u8>> = LoadState::default();
        state.start();
        assert!(state.is_loading());

        state.finish(Err::<Vec<u8>, _>(ApiException::new(FailureKind::Server, "down")));
        assert_eq!(state.loaded(), None);
        assert_eq!(state.error().map(|err| err.kind), Some(FailureKind::Server));

        state.finish(Ok::<_, ApiException>(vec![1, 2]));
        assert_eq!(state.loaded(), Some(&vec![1, 2]));
    }
}
