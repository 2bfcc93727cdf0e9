//! Remote entity documents
//!
//! A Navajo server returns the raw definition of a script when it is called
//! through the `Generic` endpoint with the script as `rpc_name`; the entity is
//! not executed. Each fetch is one blocking POST.

use quick_xml::escape::escape;

use super::{parse_document, DocumentSource, Element};
use crate::error::Result;

pub const DEFAULT_URL: &str = "http://localhost:9090/navajo/Generic";
pub const DEFAULT_APPLICATION: &str = "TARONGA";

#[derive(Debug, Clone)]
pub struct RpcSource {
    client: reqwest::blocking::Client,
    url: String,
    username: String,
    password: String,
    application: String,
}

impl RpcSource {
    pub fn new(
        url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        application: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            url: url.into(),
            username: username.into(),
            password: password.into(),
            application: application.into(),
        }
    }

    /// The `tml` envelope requesting the definition of `path`
    pub fn request_body(&self, path: &str) -> String {
        format!(
            r#"<tml documentImplementation="SAXP"><header application="{}"><transaction rpc_usr="{}" rpc_pwd="{}" rpc_name="{}"/></header></tml>"#,
            escape(&self.application),
            escape(&self.username),
            escape(&self.password),
            escape(path),
        )
    }
}

impl DocumentSource for RpcSource {
    fn fetch(&mut self, path: &str) -> Result<Element> {
        tracing::debug!(path, url = %self.url, "requesting entity document");
        let response = self
            .client
            .post(&self.url)
            .header("Content-Type", "text/xml; charset=utf-8")
            .body(self.request_body(path))
            .send()?
            .error_for_status()?;
        let body = response.text()?;
        parse_document(path, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_is_a_tml_transaction() {
        let source = RpcSource::new(DEFAULT_URL, "admin", "p&ss", DEFAULT_APPLICATION);
        let body = source.request_body("club/Member");

        let envelope = parse_document("request", &body).unwrap();
        assert_eq!(envelope.tag, "tml");
        assert_eq!(envelope.attr("documentImplementation"), Some("SAXP"));

        let header = &envelope.children[0];
        assert_eq!(header.attr("application"), Some("TARONGA"));
        let transaction = &header.children[0];
        assert_eq!(transaction.attr("rpc_usr"), Some("admin"));
        assert_eq!(transaction.attr("rpc_pwd"), Some("p&ss"));
        assert_eq!(transaction.attr("rpc_name"), Some("club/Member"));
    }

    #[test]
    fn test_request_body_escapes_markup_in_credentials() {
        let source = RpcSource::new(DEFAULT_URL, "a\"b", "<x y='z'>", DEFAULT_APPLICATION);
        let body = source.request_body("club/Member");

        assert!(!body.contains("<x y"));
        assert!(body.contains("rpc_usr=\"a&quot;b\""));

        let envelope = parse_document("request", &body).unwrap();
        let transaction = &envelope.children[0].children[0];
        assert_eq!(transaction.attr("rpc_usr"), Some("a\"b"));
        assert_eq!(transaction.attr("rpc_pwd"), Some("<x y='z'>"));
    }
}
