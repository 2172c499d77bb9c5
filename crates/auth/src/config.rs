use std::time::Duration;

/// Default access-token lifetime: 15 minutes.
const DEFAULT_ACCESS_TOKEN_TTL_SECS: u64 = 15 * 60;
/// Default refresh-token (and session) lifetime: 60 days.
const DEFAULT_REFRESH_TOKEN_TTL_SECS: u64 = 60 * 24 * 60 * 60;
/// Default base for links mailed by forgot-password.
const DEFAULT_RESET_LINK_BASE: &str = "http://localhost:9000";

/// Argon2 cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordCost {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for PasswordCost {
    fn default() -> Self {
        Self {
            memory_kib: argon2::Params::DEFAULT_M_COST,
            iterations: argon2::Params::DEFAULT_T_COST,
            parallelism: argon2::Params::DEFAULT_P_COST,
        }
    }
}

/// Secrets, lifetimes and cost parameters of the auth core.
#[derive(Clone)]
pub struct AuthConfig {
    /// HMAC secret for access and password-reset tokens.
    pub access_secret: String,
    /// HMAC secret for refresh tokens.
    pub refresh_secret: String,
    pub access_token_ttl: Duration,
    /// Refresh-token lifetime; also the session's cache TTL and durable expiry.
    pub refresh_token_ttl: Duration,
    /// Scheme and authority prefixed to mailed reset links.
    pub reset_link_base: String,
    pub password_cost: PasswordCost,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("access_token_ttl", &self.access_token_ttl)
            .field("refresh_token_ttl", &self.refresh_token_ttl)
            .field("reset_link_base", &self.reset_link_base)
            .field("password_cost", &self.password_cost)
            .finish_non_exhaustive()
    }
}

impl AuthConfig {
    /// Load auth configuration from environment variables.
    ///
    /// | Env Var                     | Required | Default                  |
    /// |-----------------------------|----------|--------------------------|
    /// | `SECRET_KEY_ACCESS_TOKEN`   | **yes**  | --                       |
    /// | `SECRET_KEY_REFRESH_TOKEN`  | **yes**  | --                       |
    /// | `ACCESS_TOKEN_TTL_SECS`     | no       | `900`                    |
    /// | `REFRESH_TOKEN_TTL_SECS`    | no       | `5184000`                |
    /// | `RESET_LINK_BASE`           | no       | `http://localhost:9000`  |
    /// | `ARGON2_MEMORY_KIB`         | no       | `19456`                  |
    /// | `ARGON2_ITERATIONS`         | no       | `2`                      |
    /// | `ARGON2_PARALLELISM`        | no       | `1`                      |
    ///
    /// # Panics
    ///
    /// Panics if a secret is missing or empty, if both secrets are equal, if
    /// a numeric variable does not parse, or if a token TTL is zero or longer
    /// than [`MAX_TOKEN_TTL_SECS`].
    pub fn from_env() -> Self {
        let access_secret = std::env::var("SECRET_KEY_ACCESS_TOKEN")
            .expect("SECRET_KEY_ACCESS_TOKEN must be set in the environment");
        let refresh_secret = std::env::var("SECRET_KEY_REFRESH_TOKEN")
            .expect("SECRET_KEY_REFRESH_TOKEN must be set in the environment");
        assert!(!access_secret.is_empty(), "SECRET_KEY_ACCESS_TOKEN must not be empty");
        assert!(!refresh_secret.is_empty(), "SECRET_KEY_REFRESH_TOKEN must not be empty");
        assert!(
            access_secret != refresh_secret,
            "SECRET_KEY_ACCESS_TOKEN and SECRET_KEY_REFRESH_TOKEN must differ"
        );

        let defaults = PasswordCost::default();

        Self {
            access_secret,
            refresh_secret,
            access_token_ttl: token_ttl(
                "ACCESS_TOKEN_TTL_SECS",
                env_or("ACCESS_TOKEN_TTL_SECS", DEFAULT_ACCESS_TOKEN_TTL_SECS),
            ),
            refresh_token_ttl: token_ttl(
                "REFRESH_TOKEN_TTL_SECS",
                env_or("REFRESH_TOKEN_TTL_SECS", DEFAULT_REFRESH_TOKEN_TTL_SECS),
            ),
            reset_link_base: std::env::var("RESET_LINK_BASE")
                .unwrap_or_else(|_| DEFAULT_RESET_LINK_BASE.to_string())
                .trim_end_matches('/')
                .to_string(),
            password_cost: PasswordCost {
                memory_kib: env_or("ARGON2_MEMORY_KIB", defaults.memory_kib),
                iterations: env_or("ARGON2_ITERATIONS", defaults.iterations),
                parallelism: env_or("ARGON2_PARALLELISM", defaults.parallelism),
            },
        }
    }
}

/// Upper bound for token TTLs (ten years).
pub const MAX_TOKEN_TTL_SECS: u64 = 10 * 365 * 24 * 60 * 60;

fn token_ttl(name: &str, secs: u64) -> Duration {
    assert!(
        (1..=MAX_TOKEN_TTL_SECS).contains(&secs),
        "{name} must be between 1 and {MAX_TOKEN_TTL_SECS} seconds, got {secs}"
    );
    Duration::from_secs(secs)
}

fn env_or<T>(name: &str, default: T) -> T
where
    T: std::str::FromStr,
    T::Err: std::fmt::Debug,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .unwrap_or_else(|e| panic!("{name} must be a valid number: {e:?}")),
        Err(_) => default,
    }
}
