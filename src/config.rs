//! Connection configuration for SharePoint sites.

use crate::error::{Error, Result};

/// Settings required to connect to a SharePoint site.
///
/// All three identifiers are mandatory: the site URL, the Azure AD tenant,
/// and the application (client) id of the registration used for the
/// device-code login.
#[derive(Debug, Clone)]
pub struct ConnectConfig {
    /// Full URL of the site, e.g. `https://contoso.sharepoint.com/sites/analytics`.
    pub site_url: String,
    /// Azure AD tenant, e.g. `contoso.onmicrosoft.com` or a tenant GUID.
    pub tenant: String,
    /// Application (client) id of the Azure AD app registration.
    pub app_id: String,
    /// Optional connection settings.
    pub options: ConnectOptions,
}

impl ConnectConfig {
    pub fn new(site_url: &str, tenant: &str, app_id: &str) -> Self {
        Self {
            site_url: site_url.to_string(),
            tenant: tenant.to_string(),
            app_id: app_id.to_string(),
            options: ConnectOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ConnectOptions) -> Self {
        self.options = options;
        self
    }

    /// Check that required fields are present and that no disallowed
    /// option is set.
    pub(crate) fn validate(&self) -> Result<()> {
        if self.site_url.trim().is_empty() {
            return Err(Error::Configuration(
                "site_url must be a non-empty URL".to_string(),
            ));
        }
        if self.tenant.trim().is_empty() {
            return Err(Error::Configuration(
                "tenant must be a non-empty tenant name or GUID".to_string(),
            ));
        }
        if self.app_id.trim().is_empty() {
            return Err(Error::Configuration(
                "app_id must be a non-empty application id".to_string(),
            ));
        }
        if self.options.scopes.is_some() {
            return Err(Error::SecurityPolicy(
                "the authorization scope is fixed to the minimal read/write grant \
                 and cannot be overridden"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

/// Optional connection settings, fully enumerated.
///
/// There is deliberately no opaque pass-through to the authentication
/// layer; every supported setting is a named field here.
#[derive(Debug, Clone, Default)]
pub struct ConnectOptions {
    /// Override the Azure AD authority host, e.g. for national clouds.
    /// Defaults to `https://login.microsoftonline.com`.
    pub authority_host: Option<String>,
    /// Override the Graph service root, e.g. for national clouds.
    /// Defaults to `https://graph.microsoft.com/v1.0`.
    pub graph_base: Option<String>,
    /// Rejected whenever set: the token scope is fixed by this crate.
    /// The field exists so that an attempted override is a detectable
    /// policy error rather than a silently ignored setting.
    pub scopes: Option<Vec<String>>,
}
