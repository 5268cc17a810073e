mod cli;

use std::error::Error as StdError;
use std::process::ExitCode;

use clap::Parser;
use eyre::{eyre, WrapErr};

use btc_probe_core::config::load_env_file;
use btc_probe_core::rpc::HttpRpcClient;
use btc_probe_core::{run_probe, ProbeError, ProbeStep, RpcConfig};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_level(true)
        .init();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err:?}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: cli::Cli) -> eyre::Result<()> {
    // Everything up to client construction is local; no request is sent
    // until the probe starts.
    load_env_file(args.env_file.as_deref()).context("load env file")?;
    let config = RpcConfig::from_env().context("read RPC connection settings from environment")?;
    let rpc = HttpRpcClient::from_config(&config).context("create Bitcoin RPC client")?;
    tracing::info!(url = %rpc.url(), "using Bitcoin Core RPC endpoint");

    let mut stdout = std::io::stdout();
    run_probe(&rpc, &args.targets(), &mut stdout)
        .await
        .map_err(|err| report_probe_error(rpc.url(), err))?;

    tracing::debug!("probe completed");
    Ok(())
}

/// Attach a connection hint when the very first call fails, since that is
/// where bad hosts, ports and credentials show up.
fn report_probe_error(rpc_url: &str, err: ProbeError) -> eyre::Report {
    if err.step != ProbeStep::ChainInfo {
        return eyre::Report::new(err);
    }
    let message = format_rpc_connect_error(rpc_url, &error_chain(&err));
    eyre!(message).wrap_err("while attempting to connect to Bitcoin Core RPC")
}

fn error_chain(err: &dyn StdError) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}

fn format_rpc_connect_error(rpc_url: &str, source_error: &str) -> String {
    let mut lines = vec![
        format!("could not connect to RPC endpoint `{rpc_url}`"),
        format!("RPC error: {source_error}"),
    ];

    if source_error.contains("dns error") || source_error.contains("failed to lookup address") {
        lines.push(
            "hint: hostname resolution failed; verify BITCOIN_IP and your DNS/network".into(),
        );
    } else if source_error.contains("Connection refused") || source_error.contains("tcp connect") {
        lines.push(
            "hint: nothing is listening; verify BITCOIN_IP, BITCOIN_RPC_PORT and that bitcoind runs with -server".into(),
        );
    } else if source_error.contains("401") || source_error.contains("403") {
        lines.push(
            "hint: authentication failed; verify BITCOIN_USERNAME and BITCOIN_PASSWORD (rpcuser/rpcpassword or rpcauth)".into(),
        );
    } else if source_error.contains("timed out") {
        lines.push(
            "hint: the node did not answer in time; check rpcallowip/rpcbind and firewalls".into(),
        );
    } else if source_error.contains("error sending request for url") {
        lines.push("hint: request could not be sent; verify the endpoint address and network reachability".into());
    }

    lines.join("\n")
}
