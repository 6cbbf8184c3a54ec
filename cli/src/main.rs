mod args;

use anyhow::Result;
use args::{parse_error_exit_code, Args, LogFormat, OutputFormat};
use clap::Parser;
use promoter::{backend, Promoter};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is fine; CI passes everything through the environment
    dotenvy::dotenv().ok();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            return ExitCode::from(parse_error_exit_code(&err));
        }
    };
    init_tracing(args.log_format);

    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", report_failure(&err));
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::from_default_env().add_directive(Level::INFO.into());
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Pretty => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

/// Log the full error chain and return it for the plain stderr line.
fn report_failure(err: &anyhow::Error) -> String {
    let chain = format!("{err:#}");
    error!("{chain}");
    chain
}

async fn run(args: &Args) -> Result<()> {
    let config = args.promotion_config();
    // Fail before any AWS client exists
    config.validate()?;

    info!(
        "Promoting {} into {} ({})",
        config.image(),
        config.parameter_name(),
        config.environment_label()
    );

    let clients = backend::load_aws_clients(&args.registry_region).await;
    let promoter = Promoter::new(Arc::new(clients.parameters), Arc::new(clients.registry));

    let outcome = promoter.promote(&config).await?;

    match args.output {
        OutputFormat::Text => {
            if outcome.updated {
                println!(
                    "{}: {} -> {}",
                    outcome.parameter_name, outcome.previous_version, outcome.new_version
                );
            } else {
                println!(
                    "{}: {} (dry run, would set {})",
                    outcome.parameter_name, outcome.previous_version, outcome.new_version
                );
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcome)?),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use promoter::PromotionConfig;
    use std::io;
    use std::sync::Mutex;

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_failure_is_logged_with_full_chain() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let err = anyhow::Error::new(
            PromotionConfig::new("svc", "", "/env/svc/version")
                .validate()
                .unwrap_err(),
        )
        .context("Promotion aborted");

        let message = tracing::subscriber::with_default(subscriber, || report_failure(&err));

        assert_eq!(
            message,
            "Promotion aborted: Missing environment variables: IMAGE_VERSION"
        );
        let logged = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(logged.contains("ERROR"));
        assert!(logged.contains(&message));
    }
}
