//! URL builders handed to the XBlock runtime.
//!
//! Blocks rendered outside a request still need to link back to their
//! handlers and packaged resources. [`RuntimeUrls`] holds the two URL
//! templates and is created once at startup.

/// Handler URL for authenticated requests.
pub const HANDLER_URL_TEMPLATE: &str = "/courses/{course_id}/xblock/{usage_id}/handler/{handler}";

/// Handler URL reachable by third parties without a session.
pub const NOAUTH_HANDLER_URL_TEMPLATE: &str =
    "/courses/{course_id}/xblock/{usage_id}/handler_noauth/{handler}";

/// URL of a resource packaged with an XBlock.
pub const LOCAL_RESOURCE_URL_TEMPLATE: &str = "/xblock/resource/{block_type}/{uri}";

/// The handler and local resource URL templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeUrls {
    handler_url: String,
    noauth_handler_url: String,
    local_resource_url: String,
}

impl Default for RuntimeUrls {
    fn default() -> Self {
        Self {
            handler_url: HANDLER_URL_TEMPLATE.to_string(),
            noauth_handler_url: NOAUTH_HANDLER_URL_TEMPLATE.to_string(),
            local_resource_url: LOCAL_RESOURCE_URL_TEMPLATE.to_string(),
        }
    }
}

impl RuntimeUrls {
    /// The authenticated handler URL template.
    pub fn handler_url_template(&self) -> &str {
        &self.handler_url
    }

    /// The local resource URL template.
    pub fn local_resource_url_template(&self) -> &str {
        &self.local_resource_url
    }

    /// Builds the URL of `handler` on a block.
    ///
    /// A non-empty `suffix` is appended as an extra path segment, with any
    /// leading slash stripped.
    pub fn handler_url(
        &self,
        course_id: &str,
        usage_id: &str,
        handler: &str,
        suffix: Option<&str>,
        thirdparty: bool,
    ) -> String {
        let template = if thirdparty {
            &self.noauth_handler_url
        } else {
            &self.handler_url
        };
        let mut url = template
            .replace("{course_id}", course_id)
            .replace("{usage_id}", usage_id)
            .replace("{handler}", handler);
        let suffix = suffix.map(|s| s.trim_start_matches('/'));
        if let Some(suffix) = suffix.filter(|s| !s.is_empty()) {
            url.push('/');
            url.push_str(suffix);
        }
        url
    }

    /// Builds the URL of a resource packaged with `block_type`.
    pub fn local_resource_url(&self, block_type: &str, uri: &str) -> String {
        self.local_resource_url
            .replace("{block_type}", block_type)
            .replace("{uri}", uri.trim_start_matches('/'))
    }
}
