use secrecy::SecretString;

/// `SecurityContext` carries the principal resolved for one request.
///
/// Built by the authentication middleware from the chain result and stored in
/// the request's extensions. Downstream layers (CSRF validation, business
/// handlers) read it from there explicitly; nothing is kept in thread-local
/// or global state.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct SecurityContext {
    /// Authenticated username. `None` for anonymous requests.
    principal: Option<String>,
    /// Id of the authenticator that accepted the credentials.
    authenticator_id: Option<String>,
    /// Original bearer token, if the request carried one. Never serialized/persisted.
    /// Wrapped in `SecretString` so `Debug` redacts the value automatically.
    #[serde(skip)]
    bearer_token: Option<SecretString>,
}

impl SecurityContext {
    /// Create a new `SecurityContext` builder
    #[must_use]
    pub fn builder() -> SecurityContextBuilder {
        SecurityContextBuilder::default()
    }

    /// Create an anonymous `SecurityContext` with no principal
    #[must_use]
    pub fn anonymous() -> Self {
        SecurityContextBuilder::default().build()
    }

    /// Authenticated username, if any.
    #[must_use]
    pub fn principal(&self) -> Option<&str> {
        self.principal.as_deref()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.principal.is_some()
    }

    #[must_use]
    pub fn authenticator_id(&self) -> Option<&str> {
        self.authenticator_id.as_deref()
    }

    /// Get the original bearer token.
    #[must_use]
    pub fn bearer_token(&self) -> Option<&SecretString> {
        self.bearer_token.as_ref()
    }
}

#[derive(Default)]
pub struct SecurityContextBuilder {
    principal: Option<String>,
    authenticator_id: Option<String>,
    bearer_token: Option<SecretString>,
}

impl SecurityContextBuilder {
    #[must_use]
    pub fn principal(mut self, username: &str) -> Self {
        self.principal = Some(username.to_owned());
        self
    }

    #[must_use]
    pub fn authenticator_id(mut self, id: &str) -> Self {
        self.authenticator_id = Some(id.to_owned());
        self
    }

    #[must_use]
    pub fn bearer_token(mut self, token: impl Into<SecretString>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    #[must_use]
    pub fn build(self) -> SecurityContext {
        SecurityContext {
            principal: self.principal,
            authenticator_id: self.authenticator_id,
            bearer_token: self.bearer_token,
        }
    }
}
