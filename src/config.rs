//! Server configuration from environment variables.

/// Runtime settings for the web binary.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Secret for admin login. Admin login is disabled when unset.
    pub admin_token: Option<String>,
    /// Cookie signing key material (at least 64 bytes). Random per process when unset.
    pub session_key: Option<Vec<u8>>,
    pub static_dir: String,
    /// Mark the session cookie `Secure`. Only enable behind HTTPS.
    pub cookie_secure: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_static_dir() -> String {
    "static".to_string()
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Shortest key accepted for signing session cookies.
pub const MIN_SESSION_KEY_LEN: usize = 64;

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            admin_token: None,
            session_key: None,
            static_dir: default_static_dir(),
            cookie_secure: false,
        }
    }
}

impl AppConfig {
    /// Read HOST, PORT, ADMIN_TOKEN, SESSION_KEY, STATIC_DIR and COOKIE_SECURE.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset, empty or unparsable values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let session_key = get("SESSION_KEY").and_then(|k| {
            if k.len() >= MIN_SESSION_KEY_LEN {
                Some(k.into_bytes())
            } else {
                log::warn!(
                    "SESSION_KEY shorter than {} bytes, using a random key",
                    MIN_SESSION_KEY_LEN
                );
                None
            }
        });

        Self {
            host: get("HOST").unwrap_or_else(default_host),
            port: get("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or_else(default_port),
            admin_token: get("ADMIN_TOKEN"),
            session_key,
            static_dir: get("STATIC_DIR").unwrap_or_else(default_static_dir),
            cookie_secure: get("COOKIE_SECURE").is_some_and(|v| parse_flag(&v)),
        }
    }
}
