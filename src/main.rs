// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-CaptureFlow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of capture-flow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! capture-flow CLI entrypoint.
//!
//! By default this serves MCP over streamable HTTP at `http://127.0.0.1:<port>/mcp` until
//! interrupted. Use `--stdio` to serve MCP over stdio instead (intended for tool integrations).

use std::error::Error;
use std::sync::Arc;

use axum::Router;
use capture_flow::logging::{init_logging, LogConfig, LogFormat};
use capture_flow::mcp::CaptureFlowMcp;
use capture_flow::service::ConversationService;
use capture_flow::source::EvidenceSource;
use capture_flow::store::{CaptureStore, MemoryStore, SessionFolder, WriteDurability};
use rmcp::transport::{
    streamable_http_server::session::local::LocalSessionManager, StreamableHttpServerConfig,
    StreamableHttpService,
};
use tracing::{error, info};

const DEFAULT_MCP_HTTP_PORT: u16 = 27436;

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [<store-dir>] [--durable-writes] [--mcp-http-port <port>] [-v|-vv] [--log-json]\n  {program} [--store <dir>] [--durable-writes] [--mcp-http-port <port>] [-v|-vv] [--log-json]\n  {program} --memory [--mcp-http-port <port>] [-v|-vv] [--log-json]\n  {program} [<store-dir>|--store <dir>] [--durable-writes] --stdio [-v|-vv] [--log-json]\n  {program} --memory --stdio [-v|-vv] [--log-json]\n\nDefault mode serves MCP over streamable HTTP at `http://127.0.0.1:<port>/mcp`.\n--mcp-http-port selects the port (0 = ephemeral; default {DEFAULT_MCP_HTTP_PORT}).\n\nIf store-dir/--store is omitted, the current working directory is used.\n--memory keeps sessions in memory only and cannot be combined with a store dir.\n\n--durable-writes opts into slower, best-effort durable persistence (fsync/sync where supported).\n\nLogs go to stderr; CAPTURE_FLOW_LOG overrides the -v level with a tracing filter."
    );
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliOptions {
    stdio: bool,
    memory: bool,
    store_dir: Option<String>,
    mcp_http_port: Option<u16>,
    durable_writes: bool,
    verbosity: u8,
    log_json: bool,
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut options = CliOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--stdio" => {
                if options.stdio {
                    return Err(());
                }
                options.stdio = true;
            }
            "--memory" => {
                if options.memory {
                    return Err(());
                }
                options.memory = true;
            }
            "--store" => {
                if options.store_dir.is_some() {
                    return Err(());
                }
                let dir = args.next().ok_or(())?;
                options.store_dir = Some(dir);
            }
            "--mcp-http-port" => {
                if options.mcp_http_port.is_some() {
                    return Err(());
                }
                let raw = args.next().ok_or(())?;
                let port: u16 = raw.parse().map_err(|_| ())?;
                options.mcp_http_port = Some(port);
            }
            "--durable-writes" => {
                if options.durable_writes {
                    return Err(());
                }
                options.durable_writes = true;
            }
            "--log-json" => {
                if options.log_json {
                    return Err(());
                }
                options.log_json = true;
            }
            "-v" => options.verbosity = options.verbosity.saturating_add(1),
            "-vv" => options.verbosity = options.verbosity.saturating_add(2),
            _ if arg.starts_with('-') => return Err(()),
            _ => {
                if options.store_dir.is_some() {
                    return Err(());
                }
                options.store_dir = Some(arg);
            }
        }
    }

    if options.memory && (options.store_dir.is_some() || options.durable_writes) {
        return Err(());
    }

    if options.stdio && options.mcp_http_port.is_some() {
        return Err(());
    }

    Ok(options)
}

fn open_store(options: &CliOptions) -> Arc<dyn CaptureStore> {
    if options.memory {
        return Arc::new(MemoryStore::new());
    }
    let dir = options.store_dir.clone().unwrap_or_else(|| ".".to_owned());
    let folder = if options.durable_writes {
        SessionFolder::new(dir).with_durability(WriteDurability::Durable)
    } else {
        SessionFolder::new(dir)
    };
    Arc::new(folder)
}

fn main() {
    let result = (|| -> Result<(), Box<dyn Error>> {
        let mut args = std::env::args();
        let program = args.next().unwrap_or_else(|| "capture-flow".to_owned());

        let options = match parse_options(args) {
            Ok(options) => options,
            Err(()) => {
                print_usage(&program);
                std::process::exit(2);
            }
        };

        let format = if options.log_json { LogFormat::Json } else { LogFormat::Compact };
        init_logging(&LogConfig::from_verbosity(options.verbosity).with_format(format))?;

        let service = ConversationService::new(open_store(&options), Arc::new(EvidenceSource));
        let mcp = CaptureFlowMcp::new(Arc::new(service));

        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;

        if options.stdio {
            info!(memory = options.memory, "serving MCP over stdio");
            runtime.block_on(mcp.serve_stdio())?;
            return Ok(());
        }

        let mcp_http_port = options.mcp_http_port.unwrap_or(DEFAULT_MCP_HTTP_PORT);

        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::bind(("127.0.0.1", mcp_http_port)).await?;
            info!(addr = %listener.local_addr()?, "serving MCP over streamable HTTP at /mcp");

            let config = StreamableHttpServerConfig {
                stateful_mode: true,
                ..StreamableHttpServerConfig::default()
            };
            let shutdown_token = config.cancellation_token.clone();
            let server_shutdown = shutdown_token.clone();

            let session_manager = Arc::new(LocalSessionManager::default());
            let mcp_service = {
                let mcp = mcp.clone();
                StreamableHttpService::new(move || Ok(mcp.clone()), session_manager, config)
            };

            let router = Router::new().nest_service("/mcp", mcp_service);
            let server_handle = tokio::spawn(async move {
                let serve = axum::serve(listener, router).with_graceful_shutdown(async move {
                    server_shutdown.cancelled().await;
                });
                if let Err(err) = serve.await {
                    error!(%err, "MCP HTTP server error");
                }
            });

            tokio::signal::ctrl_c().await?;
            info!("shutting down");
            shutdown_token.cancel();
            let _ = server_handle.await;
            Ok::<(), Box<dyn Error>>(())
        })?;

        Ok(())
    })();

    if let Err(err) = result {
        eprintln!("capture-flow: {err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_options, CliOptions};

    fn args(values: &[&str]) -> impl Iterator<Item = String> {
        values.iter().map(|value| (*value).to_owned()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn parses_empty_args() {
        let options = parse_options(std::iter::empty()).expect("parse options");
        assert_eq!(options, CliOptions::default());
    }

    #[test]
    fn parses_stdio_flag() {
        let options = parse_options(args(&["--stdio"])).expect("parse options");
        assert!(options.stdio);
        assert!(!options.memory);
        assert!(options.store_dir.is_none());
        assert_eq!(options.mcp_http_port, None);
    }

    #[test]
    fn parses_store_dir() {
        let options = parse_options(args(&["--store", "some/dir"])).expect("parse options");
        assert_eq!(options.store_dir.as_deref(), Some("some/dir"));

        let options = parse_options(args(&["some/dir", "--stdio"])).expect("parse options");
        assert_eq!(options.store_dir.as_deref(), Some("some/dir"));
        assert!(options.stdio);
    }

    #[test]
    fn parses_mcp_http_port() {
        let options = parse_options(args(&["--mcp-http-port", "1234"])).expect("parse options");
        assert_eq!(options.mcp_http_port, Some(1234));
        assert!(!options.stdio);
    }

    #[test]
    fn verbosity_accumulates() {
        let options = parse_options(args(&["-v", "--log-json", "-vv"])).expect("parse options");
        assert_eq!(options.verbosity, 3);
        assert!(options.log_json);
    }

    #[test]
    fn rejects_mcp_http_port_with_stdio() {
        parse_options(args(&["--stdio", "--mcp-http-port", "0"])).unwrap_err();
    }

    #[test]
    fn rejects_memory_with_a_store() {
        parse_options(args(&["--memory", "--store", "."])).unwrap_err();
        parse_options(args(&["dir", "--memory"])).unwrap_err();
        parse_options(args(&["--memory", "--durable-writes"])).unwrap_err();
    }

    #[test]
    fn rejects_unknown_args() {
        parse_options(args(&["--nope"])).unwrap_err();
        parse_options(args(&["-vvv"])).unwrap_err();
    }

    #[test]
    fn rejects_duplicate_flags() {
        parse_options(args(&["--stdio", "--stdio"])).unwrap_err();
        parse_options(args(&["--memory", "--memory"])).unwrap_err();
        parse_options(args(&["--store", ".", "--store", "other"])).unwrap_err();
        parse_options(args(&["one", "two"])).unwrap_err();
    }

    #[test]
    fn rejects_missing_values() {
        parse_options(args(&["--store"])).unwrap_err();
        parse_options(args(&["--mcp-http-port"])).unwrap_err();
        parse_options(args(&["--mcp-http-port", "http"])).unwrap_err();
    }
}
