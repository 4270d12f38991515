//! Files compiled into the binary.
//!
//! - `serve` - dev server assets (reload.js)

mod template;

pub use template::{Template, TemplateVars};

pub mod serve {
    use super::{Template, TemplateVars};

    /// URL the reload client is served from. Never collides with build output.
    pub const RELOAD_JS_PATH: &str = "/__assetline/reload.js";

    /// Variables for reload.js.
    pub struct ReloadVars {
        pub ws_port: u16,
    }

    impl TemplateVars for ReloadVars {
        fn apply(&self, content: &str) -> String {
            content.replace("__ASSETLINE_WS_PORT__", &self.ws_port.to_string())
        }
    }

    /// Live reload client with WebSocket port injection.
    pub const RELOAD_JS: Template<ReloadVars> = Template::new(include_str!("serve/reload.js"));

    /// `<script>` tag injected into served HTML.
    pub fn reload_script_tag() -> String {
        format!(r#"<script src="{RELOAD_JS_PATH}"></script>"#)
    }
}
