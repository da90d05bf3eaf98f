//! CLI entry point for sepguard.
//!
//! This module is intentionally thin: it handles argument parsing, I/O, and exit codes.
//! All business logic lives in the `sepguard-app` crate.

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand, ValueEnum};
use sepguard_app::{
    ApexInput, CompatPaths, DumpInput, FreezeInput, OutputFormat, PropPrefixInput, SuiteInput,
    SuiteOutput, dump_domains, list_checks, render_report, run_apex_tests, run_freeze_test,
    run_property_prefix_check, run_sepolicy_tests, run_treble_tests, sort_file_contexts,
    verdict_exit_code,
};
use sepguard_domain::Suite;
use sepguard_settings::Overrides;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser, Debug)]
#[command(
    name = "sepguard",
    version,
    about = "Conformance checks for compiled SELinux policy and path labels"
)]
struct Cli {
    /// Path to sepguard config TOML. A missing file means defaults.
    #[arg(long, global = true, default_value = "sepguard.toml")]
    config: Utf8PathBuf,

    /// Override profile (default|strict).
    #[arg(long, global = true)]
    profile: Option<String>,

    /// Output format for reports.
    #[arg(long, global = true, value_enum, default_value_t = Format::Text)]
    format: Format,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Text,
    Json,
}

impl From<Format> for OutputFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Text => OutputFormat::Text,
            Format::Json => OutputFormat::Json,
        }
    }
}

#[derive(clap::Args, Debug)]
struct PolicyArgs {
    /// Policy dump of the device under test.
    #[arg(short = 'p', long)]
    policy: Utf8PathBuf,

    /// Path-label (file_contexts) files. Repeatable.
    #[arg(short = 'f', long = "file_contexts", alias = "file-contexts", required = true)]
    file_contexts: Vec<Utf8PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the partition, pseudo-filesystem, property, and domain checks.
    SepolicyTests {
        #[command(flatten)]
        policy: PolicyArgs,

        /// Run only these checks. Repeatable.
        #[arg(short = 't', long = "test")]
        tests: Vec<String>,
    },

    /// Run the vendor/system split checks.
    TrebleTests {
        #[command(flatten)]
        policy: PolicyArgs,

        /// Run only these checks. Repeatable.
        #[arg(short = 't', long = "test")]
        tests: Vec<String>,

        /// Current platform-only policy dump.
        #[arg(short = 'b', long = "basepolicy")]
        base_policy: Option<Utf8PathBuf>,

        /// Current platform-only public policy CIL.
        #[arg(short = 'u', long = "base-pub-policy")]
        base_pub_policy: Option<Utf8PathBuf>,

        /// Previous release's policy dump.
        #[arg(short = 'o', long = "oldpolicy")]
        old_policy: Option<Utf8PathBuf>,

        /// Compatibility mapping CIL.
        #[arg(short = 'm', long)]
        mapping: Option<Utf8PathBuf>,

        /// Device launched before the vendor/system split.
        #[arg(long)]
        fake_treble: bool,
    },

    /// Check an APEX's path labels against the device policy.
    ApexTests {
        /// Policy dump of the device under test.
        #[arg(short = 'p', long)]
        policy: Utf8PathBuf,

        /// Output of `deapexer list -Z`.
        #[arg(short = 'f', long = "file_contexts", alias = "file-contexts")]
        file_contexts: Utf8PathBuf,

        /// Also require every label to be a known type.
        #[arg(long)]
        all: bool,
    },

    /// Fail if the public policy changed after the vendor API freeze.
    FreezeTest {
        /// Public CIL built from the current tree.
        #[arg(short = 'c', long)]
        current: Utf8PathBuf,

        /// Frozen prebuilt public CIL.
        #[arg(short = 'p', long)]
        prebuilt: Utf8PathBuf,
    },

    /// Check property_contexts entries against allowed name and context prefixes.
    PropPrefix {
        #[arg(long)]
        property_contexts: Utf8PathBuf,

        /// Allowed property prefixes. Empty allows any property.
        #[arg(long, num_args = 0..)]
        allowed_property_prefix: Vec<String>,

        /// Allowed context prefixes. Empty allows any context.
        #[arg(long, num_args = 0..)]
        allowed_context_prefix: Vec<String>,

        /// Fail when violations are found.
        #[arg(long)]
        strict: bool,
    },

    /// Print file_contexts lines in specificity order, least specific first.
    FcSort {
        /// Input file_contexts files. Repeatable.
        #[arg(short = 'i', long = "input", required = true)]
        inputs: Vec<Utf8PathBuf>,

        /// Where to write the sorted lines (stdout if not specified).
        #[arg(short = 'o', long)]
        output: Option<Utf8PathBuf>,
    },

    /// Print how every domain was classified.
    DumpDomains {
        #[command(flatten)]
        policy: PolicyArgs,
    },

    /// List the checks of a suite.
    ListChecks {
        #[arg(long, value_enum, default_value_t = SuiteArg::Sepolicy)]
        suite: SuiteArg,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SuiteArg {
    Sepolicy,
    Treble,
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    match run(&cli) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("sepguard error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sepguard=warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn run(cli: &Cli) -> anyhow::Result<i32> {
    let format = OutputFormat::from(cli.format);
    match &cli.cmd {
        Commands::SepolicyTests { policy, tests } => {
            let cfg_text = read_config(&cli.config)?;
            let output = run_sepolicy_tests(SuiteInput {
                policy: &policy.policy,
                file_contexts: &policy.file_contexts,
                config_text: &cfg_text,
                overrides: overrides(cli, None),
                tests: selection(tests),
                compat: CompatPaths::default(),
            })?;
            emit_suite(&output, format)
        }
        Commands::TrebleTests {
            policy,
            tests,
            base_policy,
            base_pub_policy,
            old_policy,
            mapping,
            fake_treble,
        } => {
            let cfg_text = read_config(&cli.config)?;
            let output = run_treble_tests(SuiteInput {
                policy: &policy.policy,
                file_contexts: &policy.file_contexts,
                config_text: &cfg_text,
                overrides: overrides(cli, fake_treble.then_some(true)),
                tests: selection(tests),
                compat: CompatPaths {
                    base_policy: base_policy.clone(),
                    old_policy: old_policy.clone(),
                    mapping: mapping.clone(),
                    public_policy: base_pub_policy.clone(),
                },
            })?;
            emit_suite(&output, format)
        }
        Commands::ApexTests {
            policy,
            file_contexts,
            all,
        } => {
            let report = run_apex_tests(ApexInput {
                policy,
                file_contexts,
                all: *all,
            })?;
            print!("{}", render_report(&report, format)?);
            Ok(verdict_exit_code(report.verdict()))
        }
        Commands::FreezeTest { current, prebuilt } => {
            let cfg_text = read_config(&cli.config)?;
            let report = run_freeze_test(FreezeInput {
                current,
                prebuilt,
                config_text: &cfg_text,
            })?;
            print!("{}", render_report(&report, format)?);
            Ok(verdict_exit_code(report.verdict()))
        }
        Commands::PropPrefix {
            property_contexts,
            allowed_property_prefix,
            allowed_context_prefix,
            strict,
        } => {
            let output = run_property_prefix_check(PropPrefixInput {
                property_contexts,
                allowed_property_prefixes: allowed_property_prefix,
                allowed_context_prefixes: allowed_context_prefix,
                strict: *strict,
            })?;
            print!("{}", render_report(&output.report, format)?);
            Ok(output.exit_code())
        }
        Commands::FcSort { inputs, output } => {
            let sorted = sort_file_contexts(inputs)?;
            match output {
                Some(path) => write_text_file(path, &sorted).context("write sorted file_contexts")?,
                None => print!("{sorted}"),
            }
            Ok(0)
        }
        Commands::DumpDomains { policy } => {
            let cfg_text = read_config(&cli.config)?;
            let dump = dump_domains(
                DumpInput {
                    policy: &policy.policy,
                    file_contexts: &policy.file_contexts,
                    config_text: &cfg_text,
                },
                format,
            )?;
            print!("{dump}");
            Ok(0)
        }
        Commands::ListChecks { suite } => {
            let suite = match suite {
                SuiteArg::Sepolicy => Suite::Sepolicy,
                SuiteArg::Treble => Suite::Treble,
            };
            print!("{}", list_checks(suite));
            Ok(0)
        }
    }
}

fn emit_suite(output: &SuiteOutput, format: OutputFormat) -> anyhow::Result<i32> {
    print!("{}", render_report(&output.report, format)?);
    tracing::info!(
        profile = %output.resolved_config.effective.profile,
        violations = output.report.len(),
        "suite finished"
    );
    Ok(verdict_exit_code(output.report.verdict()))
}

/// Missing config file is allowed (defaults apply); an unreadable one is not.
fn read_config(path: &Utf8Path) -> anyhow::Result<String> {
    if !path.exists() {
        tracing::debug!(path = %path, "no config file; using defaults");
        return Ok(String::new());
    }
    std::fs::read_to_string(path).with_context(|| format!("read config: {path}"))
}

fn overrides(cli: &Cli, fake_treble: Option<bool>) -> Overrides {
    Overrides {
        profile: cli.profile.clone(),
        fake_treble,
    }
}

fn selection(tests: &[String]) -> Option<Vec<String>> {
    (!tests.is_empty()).then(|| tests.to_vec())
}

fn write_text_file(path: &Utf8Path, text: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_str().is_empty()
    {
        std::fs::create_dir_all(parent).with_context(|| format!("create directory: {parent}"))?;
    }
    std::fs::write(path, text).with_context(|| format!("write text: {path}"))?;
    Ok(())
}
