use std::fmt;

/// Environment variable Cloud Foundry sets on every running application
/// instance. Its presence is how cloud mode is detected.
pub const VCAP_APPLICATION_VAR: &str = "VCAP_APPLICATION";

/// Where the client is running, which decides how collaborators are wired.
///
/// `Cloud` resolves real service bindings and talks to the authorization
/// server, destination API, and connectivity proxy. `Local` substitutes
/// deterministic stand-ins so calls go straight to the named URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Cloud,
    Local,
}

impl Environment {
    /// Detect the environment from the process environment: an app running
    /// on Cloud Foundry always has `VCAP_APPLICATION` set.
    ///
    /// Resolved once at client construction; never re-read per call.
    pub fn from_env() -> Self {
        if std::env::var_os(VCAP_APPLICATION_VAR).is_some() {
            Environment::Cloud
        } else {
            Environment::Local
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, Environment::Local)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Cloud => "cloud",
            Environment::Local => "local",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
