//! CLI module for classydoc

mod args;

pub use args::{Args, Command};

use crate::classify::{ClassReport, Classifier};
use crate::config::{Config, OutputFormat};
use crate::discovery::{DiscoveryIndex, DiscoveryScanner};
use crate::error::{Error, Result};
use crate::output::{SiteConfig, SiteGenerator, INDEX_FILENAME};
use crate::registry::ClassRegistry;
use indicatif::{ProgressBar, ProgressStyle};
use log::warn;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::Path;
use std::process::ExitCode;

/// Run the CLI application
pub fn run() -> ExitCode {
    let args = Args::parse_args();

    match execute(args) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn execute(args: Args) -> Result<()> {
    match args.command {
        Command::Classify {
            classes,
            registry,
            output,
            config,
            format,
            serve,
            port,
            verbose,
        } => {
            // Load config file if it exists
            let mut cfg = if let Some(config_path) = &config {
                Config::load_or_default(config_path)
            } else {
                Config::load_or_default(Path::new("classydoc.toml"))
            };

            // Merge CLI arguments (CLI takes precedence)
            cfg.merge_cli(Some(output), Some(format));

            if verbose {
                println!("Registry: {}", registry.display());
                println!("Output: {}", cfg.output.directory.display());
                println!("Format: {:?}", cfg.output.format);
                println!("Bases: {:?}", cfg.eligibility.bases);
                println!("Module types: {:?}", cfg.eligibility.module_types);
            }

            let graph = ClassRegistry::load(&registry)?;
            println!(
                "Loaded registry: {} classes in {} modules",
                graph.class_count(),
                graph.module_count()
            );

            let classifier = Classifier::new(&graph, &cfg);

            // Explicit class paths skip discovery entirely
            let (index, paths) = if classes.is_empty() {
                let scanner = DiscoveryScanner::new(&graph, &cfg);
                let (index, paths) = scanner.discover();
                println!(
                    "Discovered {} classes across {} applications",
                    index.class_count(),
                    index.apps.len()
                );
                (index, paths)
            } else {
                (DiscoveryIndex::default(), classes)
            };

            let single = paths.len() == 1;
            let results = classify_all(&classifier, &paths, verbose);

            let mut reports: Vec<ClassReport> = Vec::new();
            for (path, outcome) in results {
                match outcome {
                    Ok(Some(report)) => reports.push(report),
                    Ok(None) => {
                        println!("Skipping {}: not eligible for documentation", path);
                    }
                    Err(e) if single => return Err(e),
                    Err(e) => {
                        warn!("failed to classify {}: {}", path, e);
                    }
                }
            }

            println!("Classified {} of {} classes", reports.len(), paths.len());

            match cfg.output.format {
                OutputFormat::Html => {
                    let site_config = SiteConfig {
                        output_dir: cfg.output.directory.clone(),
                        project_name: project_name(&cfg, &registry),
                        known_apps: cfg.known_apps.clone(),
                        copy_assets: true,
                    };

                    let generator = SiteGenerator::new(site_config)?;
                    let generation = generator.generate(&reports, &index, !single)?;

                    println!("{}", generation.summary());
                    println!("Documentation written to: {}", cfg.output.directory.display());
                }
                OutputFormat::Json => {
                    std::fs::create_dir_all(&cfg.output.directory)?;
                    let json = serde_json::to_string_pretty(&reports)?;
                    let output_path = cfg.output.directory.join("classify.json");
                    std::fs::write(&output_path, json)?;
                    println!("JSON written to: {}", output_path.display());
                }
            }

            if serve {
                serve_directory(&cfg.output.directory, port)?;
            }

            Ok(())
        }

        Command::Serve { path, port } => {
            if !path.exists() {
                return Err(Error::other(format!(
                    "Path does not exist: {}",
                    path.display()
                )));
            }

            serve_directory(&path, port)
        }

        Command::Version => {
            println!("classydoc {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Classify every path, with a progress bar in verbose mode.
///
/// Verbose runs sequentially so the bar tracks real progress;
/// otherwise the batch is classified in parallel.
fn classify_all(
    classifier: &Classifier<'_>,
    paths: &[String],
    verbose: bool,
) -> Vec<(String, Result<Option<ClassReport>>)> {
    if !verbose {
        return classifier.classify_batch(paths);
    }

    let progress = ProgressBar::new(paths.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );

    let results = paths
        .iter()
        .map(|path| {
            progress.set_message(path.clone());
            progress.inc(1);
            (path.clone(), classifier.walk_and_assemble(path))
        })
        .collect();

    progress.finish_with_message("Classification complete");
    results
}

/// Project name from config, falling back to the registry file stem
fn project_name(cfg: &Config, registry_path: &Path) -> String {
    if cfg.project.name == "Untitled Project" || cfg.project.name.is_empty() {
        registry_path
            .file_stem()
            .and_then(|n| n.to_str())
            .unwrap_or("Project")
            .to_string()
    } else {
        cfg.project.name.clone()
    }
}

/// Simple HTTP server for serving the generated docs.
///
/// Probes successive ports when the requested one is busy.
fn serve_directory(root: &Path, port: u16) -> Result<()> {
    let (listener, port) = bind_listener(port)?;

    println!(
        "Serving {} on http://localhost:{}/{}",
        root.display(),
        port,
        INDEX_FILENAME
    );
    println!("Press Ctrl+C to stop");

    for stream in listener.incoming() {
        match stream {
            Ok(stream) => {
                let root = root.to_path_buf();
                std::thread::spawn(move || {
                    if let Err(e) = handle_request(stream, &root) {
                        eprintln!("Request error: {}", e);
                    }
                });
            }
            Err(e) => eprintln!("Connection error: {}", e),
        }
    }

    Ok(())
}

/// Bind the first free port at or after the requested one
fn bind_listener(port: u16) -> Result<(TcpListener, u16)> {
    let last = port.saturating_add(100);
    for candidate in port..=last {
        if let Ok(listener) = TcpListener::bind(("127.0.0.1", candidate)) {
            return Ok((listener, candidate));
        }
    }

    Err(Error::other(format!(
        "No free port between {} and {}",
        port, last
    )))
}

/// Handle a single HTTP request
fn handle_request(mut stream: TcpStream, root: &Path) -> Result<()> {
    let mut buffer = [0; 4096];
    let n = stream.read(&mut buffer)?;
    let request = String::from_utf8_lossy(&buffer[..n]);

    let request_line = request.lines().next().unwrap_or("");
    let parts: Vec<&str> = request_line.split_whitespace().collect();

    if parts.len() < 2 {
        send_response(&mut stream, 400, "Bad Request", "text/plain", b"Bad Request")?;
        return Ok(());
    }

    let method = parts[0];
    let path = parts[1];

    if method != "GET" {
        send_response(
            &mut stream,
            405,
            "Method Not Allowed",
            "text/plain",
            b"Method Not Allowed",
        )?;
        return Ok(());
    }

    let url_path = decode_url_path(path);
    let file_path = if url_path == "/" {
        root.join(INDEX_FILENAME)
    } else {
        root.join(url_path.trim_start_matches('/'))
    };

    // Prevent path traversal outside the docs directory
    let canonical = match file_path.canonicalize() {
        Ok(p) => p,
        Err(_) => {
            send_response(&mut stream, 404, "Not Found", "text/plain", b"Not Found")?;
            return Ok(());
        }
    };

    let root_canonical = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
    if !canonical.starts_with(&root_canonical) {
        send_response(&mut stream, 403, "Forbidden", "text/plain", b"Forbidden")?;
        return Ok(());
    }

    match std::fs::read(&canonical) {
        Ok(content) => {
            let content_type = guess_content_type(&canonical);
            send_response(&mut stream, 200, "OK", content_type, &content)?;
            println!("200 {} {}", method, path);
        }
        Err(_) => {
            send_response(&mut stream, 404, "Not Found", "text/plain", b"Not Found")?;
            println!("404 {} {}", method, path);
        }
    }

    Ok(())
}

/// Send an HTTP response
fn send_response(
    stream: &mut TcpStream,
    status_code: u16,
    status_text: &str,
    content_type: &str,
    body: &[u8],
) -> Result<()> {
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status_code,
        status_text,
        content_type,
        body.len()
    );

    stream.write_all(response.as_bytes())?;
    stream.write_all(body)?;
    stream.flush()?;

    Ok(())
}

/// Guess content type from file extension
fn guess_content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") | Some("htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js") => "application/javascript; charset=utf-8",
        Some("json") => "application/json; charset=utf-8",
        Some("txt") => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}

/// Strip the query string and decode percent-encoded characters
fn decode_url_path(s: &str) -> String {
    let path = s.split('?').next().unwrap_or(s);

    let mut result = String::new();
    let mut chars = path.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '%' {
            let hex: String = chars.by_ref().take(2).collect();
            if let Ok(byte) = u8::from_str_radix(&hex, 16) {
                result.push(byte as char);
            } else {
                result.push('%');
                result.push_str(&hex);
            }
        } else {
            result.push(c);
        }
    }

    result
}
