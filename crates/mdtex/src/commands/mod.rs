//! CLI command implementations.

pub(crate) mod render;
pub(crate) mod serve;
pub(crate) mod watch;

pub(crate) use render::RenderArgs;
pub(crate) use serve::ServeArgs;
pub(crate) use watch::WatchArgs;

use clap::Args;
use mdtex_config::CliSettings;

/// Rendering flags shared by `render` and `watch`.
#[derive(Args, Debug, Default)]
pub(crate) struct RenderFlags {
    /// Escape raw HTML in the source instead of passing it through.
    #[arg(long)]
    no_raw_html: bool,

    /// Turn single newlines into line breaks.
    #[arg(long)]
    breaks: bool,

    /// Leave math delimiters inside fenced code blocks alone.
    #[arg(long)]
    skip_code_fences: bool,
}

impl RenderFlags {
    /// CLI settings for these flags. Unset flags leave config values alone.
    pub(crate) fn cli_settings(&self) -> CliSettings {
        CliSettings {
            allow_raw_html: self.no_raw_html.then_some(false),
            line_breaks: self.breaks.then_some(true),
            skip_code_fences: self.skip_code_fences.then_some(true),
            ..CliSettings::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_flags_leave_config_alone() {
        let settings = RenderFlags::default().cli_settings();
        assert!(settings.allow_raw_html.is_none());
        assert!(settings.line_breaks.is_none());
        assert!(settings.skip_code_fences.is_none());
    }

    #[test]
    fn test_flags_map_to_settings() {
        let flags = RenderFlags {
            no_raw_html: true,
            breaks: true,
            skip_code_fences: true,
        };
        let settings = flags.cli_settings();
        assert_eq!(settings.allow_raw_html, Some(false));
        assert_eq!(settings.line_breaks, Some(true));
        assert_eq!(settings.skip_code_fences, Some(true));
    }
}
