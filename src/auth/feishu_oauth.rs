/// Feishu/Lark Open Platform OAuth kickoff
/// Composes the authen/v1 consent link that starts the authorization flow
const AUTH_URL: &str = "https://open.feishu.cn/open-apis/authen/v1/index";

pub const DEFAULT_APP_ID: &str = "cli_a267ad07c4b85013"; // Public app ID

/// One authorization kickoff. Built per invocation and dropped once the
/// link has been handed to the browser.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    pub redirect_uri: String,
    pub app_id: String,
    pub document_url: String,
}

impl AuthorizationRequest {
    pub fn new(
        redirect_uri: impl Into<String>,
        app_id: impl Into<String>,
        document_url: impl Into<String>,
    ) -> Self {
        Self {
            redirect_uri: redirect_uri.into(),
            app_id: app_id.into(),
            document_url: document_url.into(),
        }
    }

    /// Percent-encoded document URL, carried through the flow as the
    /// `state` parameter
    pub fn encoded_document_url(&self) -> String {
        urlencoding::encode(&self.document_url).into_owned()
    }

    /// Build authorization URL
    pub fn auth_url(&self) -> String {
        format!(
            "{}?redirect_uri={}&app_id={}&state={}",
            AUTH_URL,
            urlencoding::encode(&self.redirect_uri),
            self.app_id,
            self.encoded_document_url(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn request_for(document_url: &str) -> AuthorizationRequest {
        AuthorizationRequest::new(
            "https://example.com/callback",
            DEFAULT_APP_ID,
            document_url,
        )
    }

    #[test]
    fn test_auth_url_composition() {
        let request = request_for("https://abc.feishu.cn/docs/XYZ123");

        assert_eq!(
            request.auth_url(),
            "https://open.feishu.cn/open-apis/authen/v1/index\
             ?redirect_uri=https%3A%2F%2Fexample.com%2Fcallback\
             &app_id=cli_a267ad07c4b85013\
             &state=https%3A%2F%2Fabc.feishu.cn%2Fdocs%2FXYZ123"
        );
    }

    #[test]
    fn test_state_round_trips() {
        let document_url = "https://abc.larksuite.com/wiki/ABC?from=share&lang=en#top";
        let request = request_for(document_url);

        let parsed = Url::parse(&request.auth_url()).unwrap();
        let state = parsed
            .query_pairs()
            .find(|(key, _)| key == "state")
            .map(|(_, value)| value.into_owned())
            .unwrap();

        assert_eq!(state, document_url);
    }

    #[test]
    fn test_app_id_is_literal() {
        for document_url in ["https://a.feishu.cn/docs/1", "https://b.feishu.cn/wiki/2"] {
            let request = request_for(document_url);
            let parsed = Url::parse(&request.auth_url()).unwrap();
            let app_id = parsed
                .query_pairs()
                .find(|(key, _)| key == "app_id")
                .map(|(_, value)| value.into_owned())
                .unwrap();

            assert_eq!(app_id, DEFAULT_APP_ID);
        }
    }

    #[test]
    fn test_auth_url_endpoint() {
        let request = request_for("https://abc.feishu.cn/docx/Token42");
        let parsed = Url::parse(&request.auth_url()).unwrap();

        assert_eq!(parsed.host_str(), Some("open.feishu.cn"));
        assert_eq!(parsed.path(), "/open-apis/authen/v1/index");
    }

    #[test]
    fn test_encoded_document_url_has_no_reserved_chars() {
        let request = request_for("https://abc.feishu.cn/docs/X?a=1&b=2");
        let encoded = request.encoded_document_url();

        assert!(!encoded.contains('&'));
        assert!(!encoded.contains('?'));
        assert!(!encoded.contains('/'));
    }
}
