// src/config/model.rs

use std::time::Duration;

use serde::Deserialize;

use crate::types::Strategy;

/// Top-level configuration as read from a TOML file.
///
/// Every section is optional; the defaults reproduce the stock project layout:
///
/// ```toml
/// [paths]
/// src = "src"
/// dev = "dev"
///
/// [server]
/// dev_port = 8080
///
/// [tools]
/// woff = "ttf2woff {input} {output}"
/// js_lint = "eslint -c eslint.json {input}"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub paths: PathsSection,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub tunnel: TunnelSection,

    #[serde(default)]
    pub sprite: SpriteSection,

    #[serde(default)]
    pub css: CssSection,

    #[serde(default)]
    pub tools: ToolsSection,

    #[serde(default)]
    pub report: ReportSection,
}

/// Validated configuration.
///
/// Only constructed through `TryFrom<RawConfigFile>`, which also parses the
/// duration strings once so the rest of the crate can use them directly.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub paths: PathsSection,
    pub server: ServerSection,
    pub tunnel: TunnelSection,
    pub sprite: SpriteSection,
    pub css: CssSection,
    pub tools: ToolsSection,
    pub report: ReportSection,
    /// Parsed `[tunnel].startup_timeout`.
    pub tunnel_startup_timeout: Duration,
    /// Parsed `[report].delay`.
    pub report_delay: Duration,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        raw: RawConfigFile,
        tunnel_startup_timeout: Duration,
        report_delay: Duration,
    ) -> Self {
        Self {
            paths: raw.paths,
            server: raw.server,
            tunnel: raw.tunnel,
            sprite: raw.sprite,
            css: raw.css,
            tools: raw.tools,
            report: raw.report,
            tunnel_startup_timeout,
            report_delay,
        }
    }
}

/// `[paths]` section: the four roots of the path registry.
///
/// Only the roots are configurable; everything below them is fixed by
/// [`crate::registry`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsSection {
    pub src: String,
    pub dev: String,
    pub build: String,
    pub library: String,
}

impl Default for PathsSection {
    fn default() -> Self {
        Self {
            src: "src".to_string(),
            dev: "dev".to_string(),
            build: "build".to_string(),
            library: "library".to_string(),
        }
    }
}

/// `[server]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSection {
    pub host: String,
    /// Port for the `serve` and `lib` servers.
    pub dev_port: u16,
    /// Port for the `build` server.
    pub build_port: u16,
    /// Inject the reload client into served pages.
    pub live_reload: bool,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            dev_port: 8080,
            build_port: 5000,
            live_reload: true,
        }
    }
}

/// `[tunnel]` section.
///
/// The tunnel is an external command that exposes the local port publicly and
/// prints its public URL on stdout; `url_pattern` must capture that URL in
/// its first group.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TunnelSection {
    pub enabled: bool,
    pub cmd: String,
    pub url_pattern: String,
    pub startup_timeout: String,
}

impl Default for TunnelSection {
    fn default() -> Self {
        Self {
            enabled: true,
            cmd: "ngrok http {port} --log stdout --log-format logfmt".to_string(),
            url_pattern: r"url=(https://\S+)".to_string(),
            startup_timeout: "30s".to_string(),
        }
    }
}

/// `[sprite]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpriteSection {
    /// Gap between packed images, in base-density pixels.
    pub padding: u32,
}

impl Default for SpriteSection {
    fn default() -> Self {
        Self { padding: 20 }
    }
}

/// `[css]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CssSection {
    pub browsers: BrowserFloor,
}

/// Oldest major browser versions the vendor prefixer targets.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BrowserFloor {
    pub android: Option<u32>,
    pub chrome: Option<u32>,
    pub edge: Option<u32>,
    pub firefox: Option<u32>,
    pub ie: Option<u32>,
    pub ios_saf: Option<u32>,
    pub opera: Option<u32>,
    pub safari: Option<u32>,
    pub samsung: Option<u32>,
}

impl Default for BrowserFloor {
    fn default() -> Self {
        Self {
            android: None,
            chrome: Some(60),
            edge: Some(16),
            firefox: Some(60),
            ie: Some(11),
            ios_saf: Some(11),
            opera: None,
            safari: Some(11),
            samsung: None,
        }
    }
}

/// `[tools]` section: shell command templates for delegated transformations.
///
/// Placeholders `{input}` and `{output}` are replaced with shell-quoted paths.
/// Optional tools that are not set are skipped.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolsSection {
    pub woff: String,
    pub woff2: String,
    pub eot: String,
    pub js_transpile: Option<String>,
    pub js_lint: Option<String>,
    pub css_lint: Option<String>,
    pub svg_optimize: Option<String>,
    pub image_optimize: Option<String>,
}

impl Default for ToolsSection {
    fn default() -> Self {
        Self {
            woff: "ttf2woff {input} {output}".to_string(),
            woff2: "ttf2woff2 < {input} > {output}".to_string(),
            eot: "ttf2eot < {input} > {output}".to_string(),
            js_transpile: None,
            js_lint: None,
            css_lint: None,
            svg_optimize: None,
            image_optimize: None,
        }
    }
}

/// `[report]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportSection {
    pub enabled: bool,
    pub endpoint: String,
    pub api_key: Option<String>,
    pub strategies: Vec<Strategy>,
    /// Fixed wait after each scored page.
    pub delay: String,
}

impl Default for ReportSection {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "https://www.googleapis.com/pagespeedonline/v5/runPagespeed".to_string(),
            api_key: None,
            strategies: vec![Strategy::Desktop, Strategy::Mobile],
            delay: "1s".to_string(),
        }
    }
}

/// Parse a simple duration string like `"3s"`, `"250ms"`, `"1m"`, `"2h"`.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| "duration missing unit suffix".to_string())?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;
    let unit = unit_part.trim().to_lowercase();

    let secs = |per_unit: u64| {
        value
            .checked_mul(per_unit)
            .map(Duration::from_secs)
            .ok_or_else(|| format!("duration '{}' is too large", s))
    };

    match unit.as_str() {
        "ms" => Ok(Duration::from_millis(value)),
        "s" => Ok(Duration::from_secs(value)),
        "m" => secs(60),
        "h" => secs(60 * 60),
        _ => Err(format!(
            "unsupported duration unit '{}'; expected ms, s, m, or h",
            unit
        )),
    }
}
