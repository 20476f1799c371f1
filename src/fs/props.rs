//! Properties applied to newly written objects.

use serde::{Deserialize, Serialize};

use crate::store::{Acl, PutObjectRequest, UploadRequest};

/// Optional overrides applied to every object the filesystem writes.
///
/// An unset field never touches the outgoing request, so the store default
/// (or a value already set on the request) wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadedFileProperties {
    /// Canned ACL
    pub acl: Option<Acl>,
    /// Cache-Control header
    pub cache_control: Option<String>,
    /// Content-Type header
    pub content_type: Option<String>,
    /// Content-Encoding header
    pub content_encoding: Option<String>,
}

/// Copy the set fields of a property set onto a request with matching fields.
macro_rules! apply_props {
    ($props:expr, $req:expr) => {{
        let props = $props;
        let req = $req;
        if let Some(acl) = props.acl {
            req.acl = Some(acl);
        }
        if let Some(cache_control) = &props.cache_control {
            req.cache_control = Some(cache_control.clone());
        }
        if let Some(content_type) = &props.content_type {
            req.content_type = Some(content_type.clone());
        }
        if let Some(content_encoding) = &props.content_encoding {
            req.content_encoding = Some(content_encoding.clone());
        }
    }};
}

impl UploadedFileProperties {
    pub fn with_acl(mut self, acl: Acl) -> Self {
        self.acl = Some(acl);
        self
    }

    pub fn with_cache_control(mut self, value: impl Into<String>) -> Self {
        self.cache_control = Some(value.into());
        self
    }

    pub fn with_content_type(mut self, value: impl Into<String>) -> Self {
        self.content_type = Some(value.into());
        self
    }

    pub fn with_content_encoding(mut self, value: impl Into<String>) -> Self {
        self.content_encoding = Some(value.into());
        self
    }

    /// Apply to an initial object-creation request.
    pub fn apply_to_put(&self, req: &mut PutObjectRequest) {
        apply_props!(self, req);
    }

    /// Apply to a streamed upload request.
    pub fn apply_to_upload(&self, req: &mut UploadRequest) {
        apply_props!(self, req);
    }
}

/// Content type guessed from the path's extension, if it has a known one.
pub(crate) fn guess_content_type(path: &str) -> Option<String> {
    let name = super::path::base(path);
    if !name.contains('.') || path.ends_with('/') {
        return None;
    }
    mime_guess::from_path(name)
        .first_raw()
        .map(str::to_string)
}
