/// Single-shot authorization launch: compose the consent link for the
/// page the user is on and hand it to a new browser tab.
use anyhow::{bail, Context, Result};
use tracing::info;
use url::Url;

use crate::auth::AuthorizationRequest;
use crate::config::Config;
use crate::matcher::PageFilter;

/// Capability to open a URL in a new browser tab. Injected so the
/// launcher stays testable without a browser host.
#[cfg_attr(test, mockall::automock)]
pub trait TabOpener {
    fn open_tab(&self, url: &str) -> Result<()>;
}

/// Opens the URL with the system default browser
pub struct SystemTabOpener;

impl TabOpener for SystemTabOpener {
    fn open_tab(&self, url: &str) -> Result<()> {
        opener::open(url).with_context(|| format!("failed to open browser for {url}"))
    }
}

pub struct AuthLinkLauncher<O: TabOpener> {
    filter: PageFilter,
    app_id: String,
    redirect_uri: String,
    opener: O,
}

impl<O: TabOpener> AuthLinkLauncher<O> {
    pub fn new(config: &Config, opener: O) -> Result<Self> {
        let filter = PageFilter::new(&config.launcher.match_patterns)
            .context("invalid match_patterns in config")?;

        Ok(Self {
            filter,
            app_id: config.feishu.app_id.clone(),
            redirect_uri: config.feishu.redirect_uri.clone(),
            opener,
        })
    }

    /// Compose the authorization link for a page without opening anything
    pub fn auth_link(&self, page_url: &str) -> Result<String> {
        let parsed =
            Url::parse(page_url).with_context(|| format!("invalid page URL: {page_url}"))?;

        if !self.filter.matches(&parsed) {
            bail!("page URL does not match any registered pattern: {page_url}");
        }
        if self.redirect_uri.is_empty() {
            bail!(
                "redirect_uri is not configured; \
                 run `feishu-authlink config --redirect-uri <uri>` first"
            );
        }

        let request = AuthorizationRequest::new(&self.redirect_uri, &self.app_id, page_url);
        Ok(request.auth_url())
    }

    /// The full action: compose the link, log it, open the tab
    pub fn launch(&self, page_url: &str) -> Result<String> {
        let auth_url = self.auth_link(page_url)?;
        info!("authorization link: {}", auth_url);

        self.opener.open_tab(&auth_url)?;

        Ok(auth_url)
    }
}
