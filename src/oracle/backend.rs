//! `OracleBackend` is the seam between the chunk worker (C4) and the real
//! HTTPS-backed `OracleClient` (C3). Tests exercise the worker/pipeline
//! against a scriptable fake instead of a live LLM endpoint.

use crate::model::Classification;
use async_trait::async_trait;

#[async_trait]
pub trait OracleBackend: Send + Sync {
    /// Classify one utterance. Never fails — after retries are exhausted
    /// this resolves via the local fallback path (§4.3).
    async fn classify(&self, text: &str) -> Classification;
}

#[cfg(test)]
pub mod fake {
    use super::*;
    use crate::oracle::keyword::local_keyword;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    pub enum Scripted {
        Success { keyword: String, category_id: i32 },
        Fallback,
    }

    /// Scriptable `OracleBackend`: pops one `Scripted` outcome per call, or
    /// falls back to local classification once the script is exhausted.
    pub struct FakeOracleBackend {
        script: Mutex<VecDeque<Scripted>>,
        fallback_category_id: i32,
        pub calls: Mutex<Vec<String>>,
    }

    impl FakeOracleBackend {
        pub fn new(fallback_category_id: i32) -> Self {
            Self {
                script: Mutex::new(VecDeque::new()),
                fallback_category_id,
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn push(&self, outcome: Scripted) {
            self.script.lock().unwrap().push_back(outcome);
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl OracleBackend for FakeOracleBackend {
        async fn classify(&self, text: &str) -> Classification {
            self.calls.lock().unwrap().push(text.to_string());
            let next = self.script.lock().unwrap().pop_front();
            match next {
                Some(Scripted::Success { keyword, category_id }) => Classification {
                    keyword,
                    category_id,
                    is_fallback: false,
                },
                Some(Scripted::Fallback) | None => Classification {
                    keyword: local_keyword(text),
                    category_id: self.fallback_category_id,
                    is_fallback: true,
                },
            }
        }
    }
}
