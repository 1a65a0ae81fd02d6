//! Request URL assembly.
//!
//! # Design
//! The host is parsed on its own first so that anything which would spill
//! into another URL component (`/`, `?`, `#`, `:`, whitespace) is rejected
//! instead of silently reshaping the URL. Paths must be absolute or empty.
//! Parameters are serialized as `application/x-www-form-urlencoded` in key
//! order, which the `BTreeMap` already provides.

use std::collections::BTreeMap;

use url::{Host, ParseError, Url};

use crate::error::UrlError;

/// The pieces a `Fetch` turns into a request URL.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Target<'a> {
    pub scheme: &'a str,
    pub host: &'a str,
    pub port: Option<u16>,
    pub path: &'a str,
    pub params: &'a BTreeMap<String, String>,
}

impl Target<'_> {
    pub fn assemble(&self) -> Result<Url, UrlError> {
        let host = Host::parse(self.host)?;
        if !self.path.is_empty() && !self.path.starts_with('/') {
            return Err(UrlError::RelativePath(self.path.to_string()));
        }

        let mut url = Url::parse(&format!("{}://{host}", self.scheme))?;
        url.set_port(self.port).map_err(|()| UrlError::Host(ParseError::InvalidPort))?;
        url.set_path(self.path);
        if !self.params.is_empty() {
            let mut query = url.query_pairs_mut();
            for (name, value) in self.params {
                query.append_pair(name, value);
            }
        }
        Ok(url)
    }

    /// Unencoded rendering of the components, used when assembly fails.
    pub fn describe(&self) -> String {
        let mut out = format!("{}://{}", self.scheme, self.host);
        if let Some(port) = self.port {
            out.push_str(&format!(":{port}"));
        }
        out.push_str(self.path);
        for (i, (name, value)) in self.params.iter().enumerate() {
            out.push(if i == 0 { '?' } else { '&' });
            out.push_str(name);
            out.push('=');
            out.push_str(value);
        }
        out
    }
}
