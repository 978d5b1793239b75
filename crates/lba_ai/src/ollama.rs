use lba_core::error::AppError;

/// Base-URL holder for the local Ollama backend serving both the embedding
/// and generation endpoints.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    base_url: String,
}

impl OllamaClient {
    /// Create a client. Strictly limited to `http://127.0.0.1` so document
    /// text never leaves the machine by misconfiguration.
    pub fn new(base_url: &str) -> Result<Self, AppError> {
        let base_url = base_url.trim_end_matches('/').to_string();

        let valid = if base_url == "http://127.0.0.1" {
            true
        } else if let Some(rest) = base_url.strip_prefix("http://127.0.0.1:") {
            // The remainder must be a bare, valid port. Anything else (paths,
            // userinfo, lookalike hosts) is rejected.
            !rest.is_empty()
                && rest.bytes().all(|b| b.is_ascii_digit())
                && rest.parse::<u32>().map(|p| (1..=65535).contains(&p)).unwrap_or(false)
        } else {
            false
        };

        if !valid {
            return Err(AppError::new(
                "BACKEND_REMOTE_NOT_ALLOWED",
                "Ollama base URL must be localhost (127.0.0.1)",
            )
            .with_details(format!("base_url={base_url}")));
        }

        Ok(Self { base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn health_check(&self) -> Result<(), AppError> {
        let url = format!("{}/api/tags", self.base_url);
        let resp = ureq::get(&url)
            .timeout(std::time::Duration::from_millis(800))
            .call();

        match resp {
            Ok(r) if r.status() == 200 => Ok(()),
            Ok(r) => Err(
                AppError::new("BACKEND_UNHEALTHY", "Ollama health check failed")
                    .with_details(format!("status={}", r.status())),
            ),
            Err(e) => Err(AppError::new(
                "BACKEND_UNREACHABLE",
                "Failed to reach Ollama on 127.0.0.1",
            )
            .with_details(e.to_string())
            .with_retryable(true)),
        }
    }
}
