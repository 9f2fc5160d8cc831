#[derive(Debug)]
pub enum StoreError {
    TokenNotFound(String),
    ConfigNotFound(String),
    ApiError(reqwest::Error),
    Http {
        status: u16,
        message: String,
    },
    NotFound {
        table: &'static str,
        id: String,
    },
    InvalidRecord {
        table: &'static str,
        id: String,
        message: String,
    },
    Serialization(serde_json::Error),
    IoError(std::io::Error),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::NotFound { .. } | StoreError::Http { status: 404, .. }
        )
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        StoreError::ApiError(err)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err)
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::IoError(err)
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::TokenNotFound(msg) => {
                writeln!(f, "Record Store Authentication Error")?;
                writeln!(f, "─────────────────────────────────")?;
                write!(f, "🔑 {msg}\n\n")?;
                writeln!(f, "🔧 QUICK FIXES:")?;
                writeln!(f, "   → Set token directly: export DUGOUT_STORE_TOKEN=your_token")?;
                writeln!(f, "   → Or add it to .env (loaded automatically)")?;
                write!(f, "   → Or run setup: dugout init")
            }
            StoreError::ConfigNotFound(msg) => {
                writeln!(f, "Record Store Configuration Error")?;
                writeln!(f, "────────────────────────────────")?;
                write!(f, "📂 {msg}\n\n")?;
                writeln!(f, "🔧 QUICK FIXES:")?;
                writeln!(
                    f,
                    "   → Set environment variables: export DUGOUT_STORE_BASE_URL=... DUGOUT_STORE_WORKSPACE=..."
                )?;
                writeln!(f, "   → Or create dugout.toml in the working directory")?;
                write!(f, "   → Or run setup: dugout init")
            }
            StoreError::ApiError(err) => {
                writeln!(f, "Record Store Connection Error")?;
                writeln!(f, "─────────────────────────────")?;
                write!(f, "🌐 {err}\n\n")?;
                writeln!(f, "🔧 TROUBLESHOOTING:")?;
                writeln!(f, "   → Check the store is reachable: curl -I $DUGOUT_STORE_BASE_URL")?;
                writeln!(f, "   → Verify DNS and proxy settings")?;
                write!(f, "   → Confirm the base URL in dugout.toml")
            }
            StoreError::Http { status, message } => {
                writeln!(f, "Record Store API Error")?;
                writeln!(f, "──────────────────────")?;
                write!(f, "🌐 HTTP {status}: {message}\n\n")?;
                match status {
                    401 => {
                        writeln!(f, "🔧 AUTHENTICATION FAILED:")?;
                        writeln!(f, "   → Token is invalid or expired")?;
                        write!(f, "   → Refresh it: export DUGOUT_STORE_TOKEN=your_new_token")
                    }
                    403 => {
                        writeln!(f, "🔧 PERMISSION DENIED:")?;
                        writeln!(f, "   → Token lacks access to this workspace")?;
                        write!(f, "   → Check DUGOUT_STORE_WORKSPACE matches the token's grant")
                    }
                    404 => {
                        writeln!(f, "🔧 RESOURCE NOT FOUND:")?;
                        writeln!(f, "   → The record or table does not exist in this workspace")?;
                        write!(f, "   → Verify the id and workspace configuration")
                    }
                    429 => {
                        writeln!(f, "🔧 RATE LIMITED:")?;
                        writeln!(f, "   → The client throttles itself, so this usually means another writer")?;
                        write!(f, "   → Lower store.rate_limit.requests_per_second in dugout.toml")
                    }
                    500..=599 => {
                        writeln!(f, "🔧 STORE-SIDE FAILURE:")?;
                        writeln!(f, "   → The record store itself errored; nothing was written")?;
                        write!(f, "   → Retry manually once the store recovers")
                    }
                    _ => {
                        writeln!(f, "🔧 TROUBLESHOOTING:")?;
                        write!(f, "   → Inspect the response message above")
                    }
                }
            }
            StoreError::NotFound { table, id } => {
                write!(f, "❓ No {table} record with id {id}")
            }
            StoreError::InvalidRecord { table, id, message } => {
                writeln!(f, "Malformed Record")?;
                writeln!(f, "────────────────")?;
                write!(f, "🗂️  {table} {id}: {message}\n\n")?;
                writeln!(f, "🔧 POSSIBLE CAUSES:")?;
                writeln!(f, "   → Record written by an incompatible client version")?;
                write!(f, "   → Manual edit in the store console")
            }
            StoreError::Serialization(err) => {
                write!(f, "📋 Failed to encode/decode record payload: {err}")
            }
            StoreError::IoError(err) => {
                write!(f, "📁 File system error: {err}")
            }
        }
    }
}

impl std::error::Error for StoreError {}
