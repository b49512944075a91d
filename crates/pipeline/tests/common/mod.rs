use std::io::Write;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use driveline_gemini::{Oracle, OracleError, Priority};
use flate2::write::GzEncoder;
use flate2::Compression;
use serde_json::Value;

/// Oracle double answering every call with one canned JSON value and
/// recording the calls it served.
pub struct CannedOracle {
    response: Value,
    fail: bool,
    calls: Mutex<Vec<(String, String)>>,
}

impl CannedOracle {
    /// An oracle answering every call with `response`.
    pub fn returning(response: Value) -> Arc<Self> {
        Arc::new(Self {
            response,
            fail: false,
            calls: Mutex::new(Vec::new()),
        })
    }

    /// An oracle failing every call with a 500 API error.
    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            response: Value::Null,
            fail: true,
            calls: Mutex::new(Vec::new()),
        })
    }

    /// How many calls the oracle has served so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Every `(prompt, mode)` pair served so far, in call order. The mode
    /// is the priority name for `invoke` and `flash:<cap>` for
    /// `invoke_flash`.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }

    fn answer(&self, prompt: &str, mode: String) -> Result<Value, OracleError> {
        self.calls.lock().unwrap().push((prompt.to_string(), mode));
        if self.fail {
            return Err(OracleError::Api {
                status: 500,
                body: "canned failure".to_string(),
            });
        }
        Ok(self.response.clone())
    }
}

#[async_trait]
impl Oracle for CannedOracle {
    async fn invoke(&self, prompt: &str, priority: Priority) -> Result<Value, OracleError> {
        self.answer(prompt, priority.as_str().to_string())
    }

    async fn invoke_flash(
        &self,
        prompt: &str,
        max_output_tokens: u32,
    ) -> Result<Value, OracleError> {
        self.answer(prompt, format!("flash:{max_output_tokens}"))
    }
}

/// Gzip a JSON payload the way vehicle clients upload timeseries blobs.
pub fn gzip_payload(json: &str) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(json.as_bytes()).unwrap();
    encoder.finish().unwrap()
}
