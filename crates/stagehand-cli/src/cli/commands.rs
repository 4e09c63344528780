use anyhow::Context;
use tracing::warn;

use stagehand_core::{
    CacheError, DeployConfig, DeployError, Deployer, ResourceScanner, ScanError, Translator,
    TranslatorConfig,
};

use super::args::{Cli, Command, DeployArgs, ScanArgs};
use crate::exit_codes;

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Deploy(args) => deploy(args).await,
        Command::Scan(args) => scan(args).await,
    }
}

async fn deploy(args: DeployArgs) -> anyhow::Result<i32> {
    let translator = Translator::new(TranslatorConfig::new(args.locale_dir, args.language))
        .context("failed to load locale")?;

    let config = DeployConfig::new(args.server_path, args.extensions);
    let deployer = Deployer::new(config);

    match deployer.run_cycle().await {
        Ok(report) => {
            if report.flagged_cleanup {
                warn!("{}", translator.t("deployer.cleanup_flagged", &[]));
            }
            println!(
                "{}",
                translator.t(
                    "deployer.cycle_ok",
                    &[
                        ("injected", &report.injected.to_string()),
                        ("eligible", &report.eligible.to_string()),
                    ],
                )
            );
            Ok(exit_codes::SUCCESS)
        }
        Err(e) => {
            println!(
                "{}",
                translator.t("deployer.cycle_failed", &[("reason", &e.to_string())])
            );
            Ok(exit_code_for(&e))
        }
    }
}

async fn scan(args: ScanArgs) -> anyhow::Result<i32> {
    // Scanning never touches the cache, so the server base path is unused.
    let scanner = ResourceScanner::new(DeployConfig::new(".", args.extensions));
    let extensions = match scanner.list().await {
        Ok(extensions) => extensions,
        Err(e @ ScanError::RootMissing { .. }) => {
            eprintln!("{e}");
            return Ok(exit_codes::PRECONDITION_FAILED);
        }
        Err(e) => return Err(e.into()),
    };
    for ext in &extensions {
        println!("{}", ext.name);
    }
    eprintln!("{} eligible extension(s)", extensions.len());
    Ok(exit_codes::SUCCESS)
}

fn exit_code_for(err: &DeployError) -> i32 {
    match err {
        DeployError::Cache(CacheError::NotFound { .. }) => exit_codes::PRECONDITION_FAILED,
        DeployError::Scan(ScanError::RootMissing { .. }) => exit_codes::PRECONDITION_FAILED,
        DeployError::Injection(_) => exit_codes::INJECTION_FAILED,
        _ => exit_codes::INTERNAL_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::path::PathBuf;
    use stagehand_core::{InjectionError, InjectionFailure};

    #[test]
    fn deploy_args_parse() {
        let cli = Cli::try_parse_from([
            "stagehand",
            "deploy",
            "--server-path",
            "/srv/data",
            "--extensions",
            "/opt/ext",
            "--language",
            "fr",
        ])
        .unwrap();

        let Command::Deploy(args) = cli.cmd else {
            panic!("expected deploy subcommand");
        };
        assert_eq!(args.server_path, PathBuf::from("/srv/data"));
        assert_eq!(args.extensions, PathBuf::from("/opt/ext"));
        assert_eq!(args.language, "fr");
        assert_eq!(args.locale_dir, PathBuf::from("locale"));
    }

    #[test]
    fn scan_defaults_to_local_extensions_dir() {
        let cli = Cli::try_parse_from(["stagehand", "scan"]).unwrap();
        let Command::Scan(args) = cli.cmd else {
            panic!("expected scan subcommand");
        };
        assert_eq!(args.extensions, PathBuf::from("./extensions"));
    }

    #[tokio::test]
    async fn scan_on_missing_root_exits_with_precondition_code() {
        let tmp = tempfile::TempDir::new().unwrap();
        let args = ScanArgs {
            extensions: tmp.path().join("no-such-dir"),
        };
        let code = scan(args).await.unwrap();
        assert_eq!(code, exit_codes::PRECONDITION_FAILED);
    }

    #[test]
    fn exit_codes_map_error_taxonomy() {
        let not_found = DeployError::Cache(CacheError::NotFound {
            path: PathBuf::from("/x/resources"),
        });
        assert_eq!(exit_code_for(&not_found), exit_codes::PRECONDITION_FAILED);

        let injection = DeployError::Injection(InjectionError::Failed {
            failures: vec![InjectionFailure {
                extension: "radio".into(),
                message: "disk full".into(),
            }],
        });
        assert_eq!(exit_code_for(&injection), exit_codes::INJECTION_FAILED);
    }
}
