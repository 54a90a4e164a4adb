//! Runtime environment of the Pokemon manager (development or production).

// strum's `EnumIs` generates undocumented `is_*` methods
#![allow(missing_docs)]

use std::sync::OnceLock;

use log::warn;
use strum_macros::{AsRefStr, Display, EnumIs, EnumString};

use crate::helpers::env::optional_env_var;

/// Name of the environment variable selecting the [`ServiceEnv`].
pub const SERVICE_ENV_VAR: &str = "POKEMON_ENV";

/// Environment in which the Pokemon manager is running.
///
/// Selected through the [`POKEMON_ENV`](SERVICE_ENV_VAR) environment variable; see
/// [`current`](ServiceEnv::current).
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, AsRefStr, Display, EnumIs, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum ServiceEnv {
    /// Local development. Error responses include the full internal error chain.
    Development,

    /// Deployed service. Error responses only contain the HTTP status and user-facing details.
    #[default]
    Production,
}

impl ServiceEnv {
    /// Returns the environment the service is running in.
    ///
    /// The value is read from [`POKEMON_ENV`](SERVICE_ENV_VAR) on first call, then cached for the
    /// lifetime of the process. A missing or unrecognized value (matching is case-insensitive)
    /// means [`Production`](ServiceEnv::Production).
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use log::info;
    /// use pokemon_manager::service_env::ServiceEnv;
    ///
    /// info!("Pokemon manager running in {}", ServiceEnv::current());
    ///
    /// if ServiceEnv::current().exposes_internal_errors() {
    ///     info!("Error responses will include internal errors");
    /// }
    /// ```
    pub fn current() -> Self {
        static CURRENT_ENV: OnceLock<ServiceEnv> = OnceLock::new();

        if let Some(simulated) = simulated_env() {
            return simulated;
        }

        *CURRENT_ENV.get_or_init(ServiceEnv::from_env)
    }

    /// Reads the environment from [`POKEMON_ENV`](SERVICE_ENV_VAR) without caching it.
    pub fn from_env() -> Self {
        match optional_env_var(SERVICE_ENV_VAR) {
            Ok(Some(value)) => value.parse().unwrap_or_else(|_| {
                warn!("Unknown {} value {:?}; using {}", SERVICE_ENV_VAR, value, Self::default());
                Self::default()
            }),
            Ok(None) => Self::default(),
            Err(err) => {
                warn!(
                    "Invalid {} environment variable ({}); using {}",
                    SERVICE_ENV_VAR,
                    err,
                    Self::default()
                );
                Self::default()
            },
        }
    }

    /// Whether error responses should carry the internal error chain (and backtrace, if any).
    pub fn exposes_internal_errors(self) -> bool {
        self.is_development()
    }

    /// Runs `f` while [`current`](ServiceEnv::current) returns `env` on this thread.
    #[cfg(test)]
    pub async fn test<F>(env: ServiceEnv, f: F)
    where
        F: std::future::Future<Output = ()>,
    {
        let previous = SIMULATED_ENV.with(|simulated| simulated.replace(Some(env)));
        f.await;
        SIMULATED_ENV.with(|simulated| simulated.set(previous));
    }
}

#[cfg(test)]
thread_local! {
    static SIMULATED_ENV: std::cell::Cell<Option<ServiceEnv>> = const { std::cell::Cell::new(None) };
}

#[cfg(test)]
fn simulated_env() -> Option<ServiceEnv> {
    SIMULATED_ENV.with(std::cell::Cell::get)
}

#[cfg(not(test))]
fn simulated_env() -> Option<ServiceEnv> {
    None
}
