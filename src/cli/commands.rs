use crate::dialect::DialectTag;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Generate Gradle build files from YAML configuration
#[derive(Parser, Debug)]
#[command(
    name = "gradlecfg",
    about = "Generate Gradle build files from YAML configuration",
    version,
    author,
    long_about = "gradlecfg reads a YAML build description written in either the flat or the \
                  declarative dialect, resolves shorthand library names to Maven coordinates, \
                  and renders an app-module build.gradle. The update action guards hand edits \
                  in the live manifest behind a diff and a backup.\n\n\
                  Examples:\n  \
                  gradlecfg -c build-config.yaml -s\n  \
                  gradlecfg -c build-config.yaml -g\n  \
                  gradlecfg -c build-config.yaml -u --safe\n  \
                  gradlecfg -c build-config.yaml -u --safe --force\n  \
                  gradlecfg --self-check"
)]
pub struct CliArgs {
    #[arg(
        short = 'c',
        long,
        value_name = "FILE",
        required_unless_present_any = ["self_check", "show_config"],
        help = "Path to the YAML configuration document"
    )]
    pub config: Option<PathBuf>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "auto",
        help = "Configuration dialect (auto-detected by default)"
    )]
    pub format: DialectArg,

    #[arg(
        long,
        value_name = "DIR",
        help = "Project root (defaults to the directory holding the configuration)"
    )]
    pub project_dir: Option<PathBuf>,

    #[arg(short = 'g', long, help = "Write the generated manifest beside the live one")]
    pub generate: bool,

    #[arg(short = 'u', long, help = "Update the live manifest")]
    pub update: bool,

    #[arg(short = 's', long, help = "Print the configuration summary")]
    pub summary: bool,

    #[arg(long, help = "Diff against the live manifest and refuse destructive updates")]
    pub safe: bool,

    #[arg(long, help = "With --safe, replace the live manifest even when it differs")]
    pub force: bool,

    #[arg(long, help = "Run the built-in self-check and exit")]
    pub self_check: bool,

    #[arg(long, help = "Print the effective tool configuration and exit")]
    pub show_config: bool,

    #[arg(
        short = 'o',
        long,
        value_enum,
        default_value = "human",
        help = "Summary output format"
    )]
    pub output: OutputFormatArg,

    #[arg(long, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

impl CliArgs {
    /// True when any action flag was given
    pub fn has_action(&self) -> bool {
        self.generate || self.update || self.summary
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialectArg {
    Auto,
    Flat,
    Declarative,
}

impl DialectArg {
    /// `None` means auto-detect
    pub fn forced(self) -> Option<DialectTag> {
        match self {
            DialectArg::Auto => None,
            DialectArg::Flat => Some(DialectTag::Flat),
            DialectArg::Declarative => Some(DialectTag::Declarative),
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_args_verify() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let args = CliArgs::parse_from(["gradlecfg", "-c", "build.yaml"]);
        assert_eq!(args.config, Some(PathBuf::from("build.yaml")));
        assert_eq!(args.format, DialectArg::Auto);
        assert_eq!(args.output, OutputFormatArg::Human);
        assert!(!args.has_action());
        assert!(!args.safe);
        assert!(!args.force);
        assert!(args.project_dir.is_none());
    }

    #[test]
    fn test_actions_combine() {
        let args = CliArgs::parse_from([
            "gradlecfg", "-c", "build.yaml", "-s", "-g", "-u", "--safe", "--force",
        ]);
        assert!(args.summary);
        assert!(args.generate);
        assert!(args.update);
        assert!(args.safe);
        assert!(args.force);
        assert!(args.has_action());
    }

    #[test]
    fn test_format_override() {
        let args = CliArgs::parse_from(["gradlecfg", "-c", "b.yaml", "-f", "declarative"]);
        assert_eq!(args.format.forced(), Some(DialectTag::Declarative));
        let args = CliArgs::parse_from(["gradlecfg", "-c", "b.yaml", "--format", "flat"]);
        assert_eq!(args.format.forced(), Some(DialectTag::Flat));
        assert_eq!(DialectArg::Auto.forced(), None);
    }

    #[test]
    fn test_invalid_format_rejected() {
        assert!(CliArgs::try_parse_from(["gradlecfg", "-c", "b.yaml", "-f", "toml"]).is_err());
    }

    #[test]
    fn test_config_required_without_self_check() {
        assert!(CliArgs::try_parse_from(["gradlecfg", "-s"]).is_err());
        let args = CliArgs::try_parse_from(["gradlecfg", "--self-check"]).unwrap();
        assert!(args.self_check);
        assert!(args.config.is_none());
    }

    #[test]
    fn test_output_format() {
        let args = CliArgs::parse_from(["gradlecfg", "-c", "b.yaml", "-s", "--output", "json"]);
        assert_eq!(args.output, OutputFormatArg::Json);
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(CliArgs::try_parse_from(["gradlecfg", "--self-check", "-v", "-q"]).is_err());
    }

    #[test]
    fn test_log_level_flag() {
        let args = CliArgs::parse_from(["gradlecfg", "--self-check", "--log-level", "debug"]);
        assert_eq!(args.log_level, Some("debug".to_string()));
    }
}
