//! Best-effort wallet HTTP API client
//!
//! The shell consumes the daemon's API only incidentally: the wallets-folder
//! lookup feeds the "reveal in file manager" menu actions. Callers swallow
//! failures and fall back to a filesystem path guess.

use std::time::Duration;

use serde::Deserialize;

use wshell_core::prelude::*;
use wshell_core::ApiOrigin;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Response of `GET /api/v1/wallets/folderName`
#[derive(Debug, Clone, Deserialize)]
pub struct WalletFolder {
    /// Filesystem path of the daemon's wallet directory
    pub address: String,
}

/// Thin client over the daemon's local HTTP API
#[derive(Debug, Clone)]
pub struct WalletApiClient {
    http: reqwest::Client,
}

impl WalletApiClient {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }

    /// Fetch the daemon's wallet folder path.
    pub async fn wallet_folder(&self, origin: &ApiOrigin) -> Result<WalletFolder> {
        let endpoint = origin.api_endpoint("/api/v1/wallets/folderName")?;
        debug!("fetching wallet folder from {}", endpoint);

        let response = self
            .http
            .get(endpoint)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| Error::protocol(format!("wallet folder request failed: {e}")))?;
        let response = response
            .error_for_status()
            .map_err(|e| Error::protocol(format!("wallet folder request failed: {e}")))?;

        let folder: WalletFolder = response
            .json()
            .await
            .map_err(|e| Error::protocol(format!("wallet folder response malformed: {e}")))?;
        Ok(folder)
    }
}

impl Default for WalletApiClient {
    fn default() -> Self {
        Self::new()
    }
}
